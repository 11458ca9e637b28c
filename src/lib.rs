pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod relay;
pub mod ui;

pub type Result<T> = std::result::Result<T, error::ClaudeChatError>;
