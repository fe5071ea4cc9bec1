pub mod embedding_client;
pub mod embeddings;
