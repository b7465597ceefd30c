//! Quoted-string lexer: C-like escape handling shared with the
//! character lexer.

use std::io::Read;

use crate::pos::Pos;
use crate::rune::Rune;
use crate::state::{LexerState, StateFn};
use crate::token::{TokenKind, Value};

/// Builds a quoted-string state function. Entry contract: the opening
/// delimiter has been consumed into `current_rune`; the same rune closes
/// the literal.
pub fn quoted_string_state<R: Read + 'static>(kind: TokenKind) -> StateFn<R> {
    StateFn::new(move |lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        string_step(lx, kind);
        None
    })
}

fn string_step<R: Read + 'static>(lx: &mut LexerState<R>, kind: TokenKind) {
    let start_pos = lx.current_pos();
    lx.start_token(start_pos);
    let quote = match lx.current_rune() {
        Rune::Scalar(q) => q,
        Rune::Eof => unreachable!("quoted_string_state entered at EOF"),
    };

    let mut value = String::new();
    loop {
        match lx.next_rune() {
            Rune::Scalar(c) if c == quote => {
                lx.emit(start_pos, kind, Value::String(value));
                return;
            }
            Rune::Scalar('\n') => {
                lx.undo_rune();
                lx.error(start_pos, "unterminated string");
                return;
            }
            Rune::Eof => {
                lx.error(start_pos, "unterminated string");
                return;
            }
            Rune::Scalar('\\') => match decode_escape(lx, quote) {
                Ok(ch) => value.push(ch),
                Err((pos, message)) => {
                    lx.error(pos, message);
                    recover_to_delimiter_or_line_end(lx, quote);
                    return;
                }
            },
            Rune::Scalar(c) => value.push(c),
        }
    }
}

/// Skips input until either `quote` is found (and consumed) or the line
/// or file ends, then returns control to the caller's initial state.
pub(super) fn recover_to_delimiter_or_line_end<R: Read + 'static>(
    lx: &mut LexerState<R>,
    quote: char,
) {
    loop {
        match lx.next_rune() {
            Rune::Scalar(c) if c == quote => return,
            Rune::Scalar('\n') => {
                lx.undo_rune();
                return;
            }
            Rune::Eof => return,
            _ => continue,
        }
    }
}

/// Decodes one C-like escape sequence. The leading backslash must
/// already be consumed into `current_rune`. On error, returns the
/// position to blame (the backslash) and a message.
pub(super) fn decode_escape<R: Read + 'static>(
    lx: &mut LexerState<R>,
    quote: char,
) -> Result<char, (Pos, String)> {
    let esc_pos = lx.current_pos();
    match lx.next_rune() {
        Rune::Scalar('a') => Ok('\u{07}'),
        Rune::Scalar('b') => Ok('\u{08}'),
        Rune::Scalar('f') => Ok('\u{0C}'),
        Rune::Scalar('n') => Ok('\n'),
        Rune::Scalar('r') => Ok('\r'),
        Rune::Scalar('t') => Ok('\t'),
        Rune::Scalar('v') => Ok('\u{0B}'),
        Rune::Scalar('\\') => Ok('\\'),
        Rune::Scalar(c) if c == quote => Ok(c),
        Rune::Scalar('x') => decode_hex_byte(lx, esc_pos),
        Rune::Scalar('u') => decode_hex_scalar(lx, esc_pos, 4),
        Rune::Scalar('U') => decode_hex_scalar(lx, esc_pos, 8),
        Rune::Scalar(c @ '0'..='7') => decode_octal_byte(lx, esc_pos, c),
        _ => Err((esc_pos, "unknown escape sequence".to_string())),
    }
}

fn decode_hex_byte<R: Read + 'static>(
    lx: &mut LexerState<R>,
    esc_pos: Pos,
) -> Result<char, (Pos, String)> {
    let mut value: u32 = 0;
    for _ in 0..2 {
        match lx.next_rune() {
            Rune::Scalar(c) if c.is_ascii_hexdigit() => {
                value = value * 16 + c.to_digit(16).expect("validated hex digit");
            }
            _ => return Err((esc_pos, "non-hex digit in hex escape sequence".to_string())),
        }
    }
    Ok(char::from_u32(value).expect("a single byte is always a valid Unicode scalar"))
}

fn decode_hex_scalar<R: Read + 'static>(
    lx: &mut LexerState<R>,
    esc_pos: Pos,
    digits: u32,
) -> Result<char, (Pos, String)> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        match lx.next_rune() {
            Rune::Scalar(c) if c.is_ascii_hexdigit() => {
                value = value * 16 + c.to_digit(16).expect("validated hex digit");
            }
            _ => {
                return Err((
                    esc_pos,
                    "non-hex digit in unicode escape sequence".to_string(),
                ));
            }
        }
    }
    char::from_u32(value).ok_or_else(|| {
        (
            esc_pos,
            "invalid Unicode code point in escape sequence".to_string(),
        )
    })
}

fn decode_octal_byte<R: Read + 'static>(
    lx: &mut LexerState<R>,
    esc_pos: Pos,
    first: char,
) -> Result<char, (Pos, String)> {
    let mut value = first.to_digit(8).expect("validated octal digit");
    for _ in 0..2 {
        match lx.next_rune() {
            Rune::Scalar(c @ '0'..='7') => {
                value = value * 8 + c.to_digit(8).expect("validated octal digit");
            }
            _ => {
                return Err((
                    esc_pos,
                    "non-octal digit in octal escape sequence".to_string(),
                ));
            }
        }
    }
    Ok(char::from_u32(value).expect("a three-digit octal escape is always a valid Unicode scalar"))
}
