//! Quoted-character lexer: like the string lexer but expects exactly one
//! character between delimiters.

use std::io::Read;

use crate::rune::Rune;
use crate::state::{LexerState, StateFn};
use crate::token::{TokenKind, Value};

use super::string::{decode_escape, recover_to_delimiter_or_line_end};

/// Builds a quoted-character state function. Entry contract matches
/// [`quoted_string_state`](super::quoted_string_state)'s.
pub fn quoted_character_state<R: Read + 'static>(kind: TokenKind) -> StateFn<R> {
    StateFn::new(move |lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        character_step(lx, kind);
        None
    })
}

fn character_step<R: Read + 'static>(lx: &mut LexerState<R>, kind: TokenKind) {
    let start_pos = lx.current_pos();
    lx.start_token(start_pos);
    let quote = match lx.current_rune() {
        Rune::Scalar(q) => q,
        Rune::Eof => unreachable!("quoted_character_state entered at EOF"),
    };

    let first = match lx.next_rune() {
        Rune::Scalar(c) if c == quote => {
            lx.error(start_pos, "empty character literal");
            return;
        }
        Rune::Scalar('\n') => {
            lx.undo_rune();
            lx.error(start_pos, "unterminated character literal");
            return;
        }
        Rune::Eof => {
            lx.error(start_pos, "unterminated character literal");
            return;
        }
        Rune::Scalar('\\') => match decode_escape(lx, quote) {
            Ok(ch) => ch,
            Err((pos, message)) => {
                lx.error(pos, message);
                recover_to_delimiter_or_line_end(lx, quote);
                return;
            }
        },
        Rune::Scalar(c) => c,
    };

    match lx.next_rune() {
        Rune::Scalar(c) if c == quote => {
            lx.emit(start_pos, kind, Value::Rune(first));
        }
        Rune::Scalar('\n') => {
            lx.undo_rune();
            lx.error(start_pos, "unterminated character literal");
        }
        Rune::Eof => {
            lx.error(start_pos, "unterminated character literal");
        }
        _ => {
            lx.error(start_pos, "character literal contains more than one character");
            recover_to_delimiter_or_line_end(lx, quote);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::source::SourceFile;
    use std::io::Cursor;

    const T_CHAR: TokenKind = TokenKind(4);

    fn test_initial<R: Read + 'static>() -> StateFn<R> {
        StateFn::new(|lx: &mut LexerState<R>| -> Option<StateFn<R>> {
            match lx.next_rune() {
                Rune::Eof => lx.emit(lx.current_pos(), TokenKind::EOF, Value::None),
                Rune::Scalar('\'') => return Some(quoted_character_state(T_CHAR)),
                Rune::Scalar(c) => lx.emit(lx.current_pos(), TokenKind(0), Value::Rune(c)),
            }
            None
        })
    }

    fn lex_all(input: &'static str) -> Vec<crate::token::TokenItem> {
        let file = SourceFile::new("t", Cursor::new(input.as_bytes())).unwrap();
        let mut lexer = Lexer::new(file, test_initial());
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let eof = tok.is_eof();
            out.push(tok);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_char_literal() {
        let toks = lex_all("'a'");
        assert_eq!(toks.len(), 2);
        match &toks[0].value {
            Value::Rune(c) => assert_eq!(*c, 'a'),
            other => panic!("expected Rune value, got {other:?}"),
        }
    }

    #[test]
    fn empty_literal_is_error() {
        let toks = lex_all("''");
        assert!(toks[0].is_error());
        assert_eq!(toks[0].value.as_str(), Some("empty character literal"));
    }

    #[test]
    fn too_many_characters_is_error() {
        let toks = lex_all("'ab'");
        assert!(toks[0].is_error());
        assert_eq!(
            toks[0].value.as_str(),
            Some("character literal contains more than one character")
        );
    }

    #[test]
    fn escaped_char_literal() {
        let toks = lex_all("'\\n'");
        match &toks[0].value {
            Value::Rune(c) => assert_eq!(*c, '\n'),
            other => panic!("expected Rune value, got {other:?}"),
        }
    }
}
