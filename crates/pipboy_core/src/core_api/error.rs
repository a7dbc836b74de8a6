use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    DuplicateItemId,
    DatabaseUninitialized,
    ItemNotFound,
    InvalidMutation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Parse, message)
    }

    /// A rejected inventory or sheet action. The message is shown to the player as-is.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::InvalidMutation, reason)
    }

    pub fn item_not_found(id: &str) -> Self {
        Self::new(
            CoreErrorCode::ItemNotFound,
            format!("item {id} is not in the game database"),
        )
    }
}
