pub mod chunks;
pub mod database;
