//! Scoped retrieval over the chunk store: cosine ranking and full-text match.

pub mod lexical;
pub mod vector;
