use std::fmt;

/// A signed integer tag identifying what a [`TokenItem`](super::TokenItem)
/// represents.
///
/// Two kinds are reserved by the engine itself: [`TokenKind::EOF`] and
/// [`TokenKind::ERROR`]. All non-negative values are free for a client
/// lexer to assign meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenKind(pub i32);

impl TokenKind {
    /// End of input. Terminal: once observed from a well-formed initial
    /// state, every subsequent call keeps returning it.
    pub const EOF: TokenKind = TokenKind(-1);

    /// A lexing error. Non-terminal: other tokens, including further
    /// `ERROR`s, may follow.
    pub const ERROR: TokenKind = TokenKind(-2);

    /// True for any client-defined kind, i.e. any non-negative value.
    pub fn is_client_kind(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TokenKind::EOF => write!(f, "EOF"),
            TokenKind::ERROR => write!(f, "ERROR"),
            TokenKind(n) => write!(f, "TokenKind({n})"),
        }
    }
}
