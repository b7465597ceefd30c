//! State functions and the long-lived record they operate on.

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;

use crate::pos::Pos;
use crate::queue::TokenQueue;
use crate::rune::Rune;
use crate::rune_source::RuneSource;
use crate::source::SourceFile;
use crate::token::{TokenItem, TokenKind, Value};
use crate::undo::UndoRing;

/// A state function: represents both "where we are" in the recogniser and
/// "what to do next". Returning `None` means "go back to the initial
/// state"; returning `Some(g)` means "call `g` next".
///
/// Implemented as a shared, interior-mutable closure (`Rc<RefCell<...>>`)
/// rather than a plain boxed `FnMut` so that the driver can re-invoke the
/// *same* initial state value on every `None` return without consuming
/// it, matching the "function value" semantics of the original
/// state-function design (design note "State-as-value").
pub struct StateFn<R>(Rc<RefCell<dyn FnMut(&mut LexerState<R>) -> Option<StateFn<R>>>>);

impl<R> Clone for StateFn<R> {
    fn clone(&self) -> Self {
        StateFn(Rc::clone(&self.0))
    }
}

impl<R: Read + 'static> StateFn<R> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&mut LexerState<R>) -> Option<StateFn<R>> + 'static,
    {
        StateFn(Rc::new(RefCell::new(f)))
    }

    fn call(&self, lx: &mut LexerState<R>) -> Option<StateFn<R>> {
        let handle = self.clone();
        let mut guard = handle.0.borrow_mut();
        (guard)(lx)
    }
}

/// The long-lived record a lexer drives: rune source, undo ring, token
/// queue, source file, the current and initial state functions, and a
/// token-start position for helper transitions to remember where the
/// current logical token began.
pub struct LexerState<R> {
    file: SourceFile<R>,
    rune_source: RuneSource,
    undo: UndoRing,
    queue: TokenQueue,
    state: Option<StateFn<R>>,
    initial: StateFn<R>,
    token_start: Pos,
}

impl<R: Read + 'static> LexerState<R> {
    pub fn new(file: SourceFile<R>, initial: StateFn<R>) -> Self {
        LexerState {
            file,
            rune_source: RuneSource::new(),
            undo: UndoRing::new(),
            queue: TokenQueue::new(),
            state: None,
            initial,
            token_start: crate::pos::NO_POS,
        }
    }

    pub fn file(&self) -> &SourceFile<R> {
        &self.file
    }

    pub fn next_rune(&mut self) -> Rune {
        self.rune_source
            .next_rune(&mut self.file, &mut self.undo, &mut self.queue)
    }

    pub fn undo_rune(&mut self) {
        self.rune_source.undo_rune(&mut self.undo)
    }

    pub fn peek_rune(&mut self) -> Rune {
        self.rune_source
            .peek_rune(&mut self.file, &mut self.undo, &mut self.queue)
    }

    pub fn current_rune(&self) -> Rune {
        self.rune_source.current_rune(&self.undo)
    }

    pub fn current_pos(&self) -> Pos {
        self.rune_source.current_pos(&self.undo)
    }

    pub fn emit(&mut self, pos: Pos, kind: TokenKind, value: Value) {
        self.queue.push(TokenItem { kind, pos, value });
    }

    /// Emits an `ERROR` token carrying `message`.
    pub fn error(&mut self, pos: Pos, message: impl Into<String>) {
        self.emit(pos, TokenKind::ERROR, Value::String(message.into()));
    }

    /// Replaces the initial state, modelling a context switch (e.g.
    /// shifting between "text" and "action" inside a templating
    /// language).
    pub fn init(&mut self, new_initial: StateFn<R>) {
        self.initial = new_initial;
    }

    pub fn start_token(&mut self, pos: Pos) {
        self.token_start = pos;
    }

    pub fn token_pos(&self) -> Pos {
        self.token_start
    }

    /// Drives state functions until the queue holds at least one token,
    /// then pops and returns it.
    pub fn next_token(&mut self) -> TokenItem {
        while self.queue.count() == 0 {
            let current = match self.state.clone() {
                Some(sf) => sf,
                None => self.initial.clone(),
            };
            self.state = current.call(self);
        }
        self.queue.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use std::io::Cursor;

    fn empty_file() -> SourceFile<Cursor<&'static [u8]>> {
        SourceFile::new("t", Cursor::new(b"".as_slice())).unwrap()
    }

    /// S6: a state function that floods the queue with 10 000 tokens
    /// before returning must still yield them in order, one per
    /// `next_token` call, followed by a stable `EOF`.
    #[test]
    fn s6_queue_growth_under_continuous_emission() {
        const N: i64 = 10_000;
        let initial = StateFn::new(move |lx: &mut LexerState<Cursor<&'static [u8]>>| {
            for i in 0..N {
                lx.emit(i, TokenKind(0), Value::None);
            }
            lx.emit(N, TokenKind::EOF, Value::None);
            None
        });
        let mut file = empty_file();
        file.add_line(0, 1).unwrap();
        let mut state = LexerState::new(file, initial);

        for i in 0..N {
            let tok = state.next_token();
            assert_eq!(tok.pos, i);
            assert_eq!(tok.kind, TokenKind(0));
        }
        let eof = state.next_token();
        assert!(eof.is_eof());
        assert_eq!(eof.pos, N);
    }

    /// At-EOF stability: once the initial state keeps re-emitting `EOF`,
    /// every subsequent call returns it at the same position.
    #[test]
    fn eof_is_stable_across_repeated_calls() {
        let initial = StateFn::new(|lx: &mut LexerState<Cursor<&'static [u8]>>| {
            lx.emit(lx.current_pos(), TokenKind::EOF, Value::None);
            None
        });
        let mut file = empty_file();
        file.add_line(0, 1).unwrap();
        let mut state = LexerState::new(file, initial);

        for _ in 0..5 {
            let tok = state.next_token();
            assert!(tok.is_eof());
            assert_eq!(tok.pos, crate::pos::NO_POS);
        }
    }
}
