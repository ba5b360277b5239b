pub mod game_store;
pub mod models;
pub mod storage;
