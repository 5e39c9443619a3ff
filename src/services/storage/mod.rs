pub mod cache;
pub mod kv;
pub mod manager;
