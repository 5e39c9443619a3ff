pub mod render;
pub mod storage;
