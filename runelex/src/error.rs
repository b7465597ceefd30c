//! Crate-level errors.
//!
//! These are distinct from the in-stream `ERROR` [`TokenItem`](crate::token::TokenItem)s
//! described by `TokenKind::ERROR`: that channel carries ordinary lexing
//! diagnostics (bad UTF-8, malformed literals, ...) as data flowing
//! through the token queue, and the stream keeps going. `LexError` covers
//! the narrower set of conditions that are a caller's or embedder's
//! contract violation rather than something present in the input text.

use crate::pos::Pos;

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("line {line_number} registered out of order: current line count is {current}")]
    LineOutOfOrder { line_number: usize, current: usize },

    #[error("line start position {pos} is not strictly greater than the previous line start {previous}")]
    NonMonotonicLineStart { pos: Pos, previous: Pos },

    #[error("cannot construct a SourceFile with an empty display name")]
    EmptyInput,

    #[error("I/O error reading source: {0}")]
    Io(#[from] std::io::Error),
}
