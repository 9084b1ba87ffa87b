//! Parser error type.

use rhea_ir::Token;
use thiserror::Error;

/// Parse failure carrying the offending token; fatal for the file.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParserError {
    /// The token the parser was looking at, when one exists.
    pub token: Option<Token>,
    pub message: String,
}

impl ParserError {
    pub fn new(token: Option<Token>, message: impl Into<String>) -> Self {
        ParserError {
            token,
            message: message.into(),
        }
    }
}
