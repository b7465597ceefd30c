//! The public entry point: construct a lexer over a [`SourceFile`] and
//! an initial state function, then pull tokens one at a time.

use std::io::Read;

use crate::source::SourceFile;
use crate::state::{LexerState, StateFn};
use crate::token::TokenItem;

pub struct Lexer<R: Read + 'static> {
    state: LexerState<R>,
}

impl<R: Read + 'static> Lexer<R> {
    /// Builds a lexer over `file`, entering `initial` on the first call
    /// to [`next_token`](Self::next_token). Registers line 1 at position
    /// 0 on `file` before returning.
    pub fn new(file: SourceFile<R>, initial: StateFn<R>) -> Self {
        let mut file = file;
        file.add_line(0, 1)
            .expect("a freshly constructed SourceFile has no lines registered yet");
        Lexer {
            state: LexerState::new(file, initial),
        }
    }

    /// Drives the state loop until one token is available, then returns
    /// it.
    pub fn next_token(&mut self) -> TokenItem {
        self.state.next_token()
    }

    pub fn file(&self) -> &SourceFile<R> {
        self.state.file()
    }
}

impl<R: Read + 'static> Iterator for Lexer<R> {
    type Item = TokenItem;

    /// Yields tokens up to and including the first `EOF`, then stops.
    fn next(&mut self) -> Option<TokenItem> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}
