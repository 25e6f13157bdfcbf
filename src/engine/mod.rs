pub mod models;
pub mod layout;
pub mod grid;
pub mod bot_strategy;
pub mod session;
