use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RttyError {
    #[error("Unsupported character {character:?} at position {position}")]
    UnsupportedCharacter { character: char, position: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding cancelled")]
    Cancelled,
}

impl RttyError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        RttyError::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RttyError>;
