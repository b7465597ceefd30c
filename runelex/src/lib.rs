//! `runelex`: a reusable streaming lexer toolkit.
//!
//! The crate provides the scanning engine on which hand-written lexers
//! for arbitrary textual languages are built: a buffered UTF-8
//! [`RuneSource`] with bounded push-back via an [`UndoRing`], a
//! state-function driver (see [`StateFn`]/[`LexerState`]) that fuses
//! state with action, a [`TokenQueue`] decoupling state functions from
//! the consumer, and a [`SourceFile`] line/position registry. A
//! reusable [`states`] library of number, string, and character state
//! functions is provided as a representative client of that core.
//!
//! ```
//! use runelex::lexer::Lexer;
//! use runelex::source::SourceFile;
//! use runelex::states::number_state;
//! use runelex::state::{LexerState, StateFn};
//! use runelex::token::{TokenKind, Value};
//! use std::io::Cursor;
//!
//! const T_INT: TokenKind = TokenKind(1);
//! const T_FLOAT: TokenKind = TokenKind(2);
//!
//! fn initial<R: std::io::Read + 'static>() -> StateFn<R> {
//!     StateFn::new(|lx: &mut LexerState<R>| {
//!         match lx.next_rune() {
//!             runelex::rune::Rune::Eof => lx.emit(lx.current_pos(), TokenKind::EOF, Value::None),
//!             runelex::rune::Rune::Scalar(c) if c.is_ascii_digit() => {
//!                 return Some(number_state(T_INT, T_FLOAT, '.'));
//!             }
//!             runelex::rune::Rune::Scalar(c) => lx.emit(lx.current_pos(), TokenKind(0), Value::Rune(c)),
//!         }
//!         None
//!     })
//! }
//!
//! let file = SourceFile::new("example", Cursor::new(b"42".as_slice())).unwrap();
//! let mut lexer = Lexer::new(file, initial());
//! let token = lexer.next_token();
//! assert_eq!(token.kind, T_INT);
//! ```

pub mod error;
pub mod lexer;
pub mod pos;
pub mod queue;
pub mod rune;
pub mod rune_source;
pub mod source;
pub mod state;
pub mod states;
pub mod token;
pub mod undo;

pub use error::LexError;
pub use lexer::Lexer;
pub use pos::Pos;
pub use rune::Rune;
pub use state::{LexerState, StateFn};
pub use token::{TokenItem, TokenKind, Value};
