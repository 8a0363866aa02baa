//! Error types for the game shell
//!
//! The simulation itself never fails; errors come from the host surface and
//! from storage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// The host could not provide a drawing surface; fatal at startup.
    #[error("No render context available")]
    NoRenderContext,

    /// A key-value store rejected a read or write.
    #[error("Storage error for '{key}': {details}")]
    Storage { key: String, details: String },

    /// Stored JSON could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GameError {
    pub fn storage(key: &str, details: impl ToString) -> Self {
        GameError::Storage {
            key: key.to_string(),
            details: details.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(GameError::NoRenderContext.to_string(), "No render context available");
        let e = GameError::storage("score", "quota exceeded");
        assert_eq!(e.to_string(), "Storage error for 'score': quota exceeded");
        let parse: GameError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(parse.to_string().starts_with("Parse error"));
    }
}
