use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaudeChatError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub use crate::Result;
