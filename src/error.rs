//! Error kinds raised by the engine.
//!
//! Pattern mismatches and expander-returns-falsy are normal flow
//! (`Option`, not `Error`). Only a lexer stall or an unknown configuration
//! pack name are treated as fatal engine bugs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexer made no progress at byte offset {offset}")]
    LexerStall { offset: usize },

    #[error("unknown configuration pack: {name}")]
    UnknownConfiguration { name: String },
}
