//! Number lexer: integers in bases 2, 8, 10, 16 via `number_state`, plus
//! the general bases-2..36 `integer_state`.

use std::io::Read;

use crate::pos::Pos;
use crate::rune::Rune;
use crate::state::{LexerState, StateFn};
use crate::token::{TokenKind, Value};

use super::{consume_if, consume_run};

/// Bits of precision used for every float emitted by [`number_state`].
pub const FLOAT_PRECISION_BITS: u32 = 256;

/// Builds a number-literal state function. Entry contract: the first
/// character of the candidate number — a digit, or `decimal_separator`
/// followed by a digit — has already been consumed into `current_rune`.
pub fn number_state<R: Read + 'static>(
    int_kind: TokenKind,
    float_kind: TokenKind,
    decimal_separator: char,
) -> StateFn<R> {
    StateFn::new(move |lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        number_step(lx, int_kind, float_kind, decimal_separator);
        None
    })
}

/// Builds a state function decoding a maximal run of digits valid in
/// `base` (2..=36, letters `a..z`/`A..Z` used case-insensitively for
/// digits 10..35). Entry contract matches `number_state`'s.
pub fn integer_state<R: Read + 'static>(kind: TokenKind, base: u32) -> StateFn<R> {
    assert!(
        (2..=36).contains(&base),
        "integer_state base must be within 2..=36, got {base}"
    );
    StateFn::new(move |lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        integer_step(lx, kind, base);
        None
    })
}

fn number_step<R: Read + 'static>(
    lx: &mut LexerState<R>,
    int_kind: TokenKind,
    float_kind: TokenKind,
    ds: char,
) {
    let start_pos = lx.current_pos();
    lx.start_token(start_pos);

    match lx.current_rune() {
        Rune::Scalar(c) if c == ds => {
            let mut text = String::from("0.");
            consume_run(lx, &mut text, |d| d.is_ascii_digit());
            finish_float(lx, text, float_kind, start_pos);
        }
        Rune::Scalar('0') => {
            if consume_if(lx, |c| c == 'x' || c == 'X').is_some() {
                lex_prefixed_integer(lx, 16, int_kind, start_pos);
            } else if consume_if(lx, |c| c == 'b' || c == 'B').is_some() {
                lex_prefixed_integer(lx, 2, int_kind, start_pos);
            } else {
                let mut digits = String::from("0");
                consume_run(lx, &mut digits, |d| d.is_ascii_digit());
                lex_decimal_like(lx, digits, ds, int_kind, float_kind, start_pos);
            }
        }
        Rune::Scalar(c) if c.is_ascii_digit() => {
            let mut digits = String::new();
            digits.push(c);
            consume_run(lx, &mut digits, |d| d.is_ascii_digit());
            lex_decimal_like(lx, digits, ds, int_kind, float_kind, start_pos);
        }
        _ => unreachable!("number_state entered without a leading digit or decimal separator"),
    }
}

fn lex_prefixed_integer<R: Read + 'static>(
    lx: &mut LexerState<R>,
    base: i32,
    int_kind: TokenKind,
    start_pos: Pos,
) {
    let mut text = String::new();
    if base == 16 {
        consume_run(lx, &mut text, |c| c.is_ascii_hexdigit());
    } else {
        consume_run(lx, &mut text, |c| c == '0' || c == '1');
    }
    if text.is_empty() {
        lx.error(start_pos, format!("malformed base {base} literal"));
        return;
    }
    let value = rug::Integer::parse_radix(&text, base)
        .expect("digit run was validated against the chosen base");
    lx.emit(start_pos, int_kind, Value::Integer(rug::Integer::from(value)));
}

fn lex_decimal_like<R: Read + 'static>(
    lx: &mut LexerState<R>,
    digits: String,
    ds: char,
    int_kind: TokenKind,
    float_kind: TokenKind,
    start_pos: Pos,
) {
    let mut text = digits.clone();

    if consume_if(lx, |c| c == ds).is_some() {
        text.push('.');
        consume_run(lx, &mut text, |d| d.is_ascii_digit());
        finish_float(lx, text, float_kind, start_pos);
        return;
    }

    if consume_if(lx, |c| c == 'e' || c == 'E').is_some() {
        match consume_exponent_tail(lx, &mut text) {
            Ok(()) => emit_float(lx, &text, float_kind, start_pos),
            Err(bad_pos) => lx.error(bad_pos, "malformed floating-point literal exponent"),
        }
        return;
    }

    if digits.starts_with('0') && digits.len() > 1 {
        emit_octal_or_error(lx, &digits, int_kind, start_pos);
    } else {
        emit_decimal_integer(lx, &digits, int_kind, start_pos);
    }
}

fn finish_float<R: Read + 'static>(
    lx: &mut LexerState<R>,
    mut text: String,
    float_kind: TokenKind,
    start_pos: Pos,
) {
    if consume_if(lx, |c| c == 'e' || c == 'E').is_some() {
        match consume_exponent_tail(lx, &mut text) {
            Ok(()) => emit_float(lx, &text, float_kind, start_pos),
            Err(bad_pos) => lx.error(bad_pos, "malformed floating-point literal exponent"),
        }
    } else {
        emit_float(lx, &text, float_kind, start_pos);
    }
}

/// Consumes `'+'|'-'`? then a required digit run, assuming the leading
/// `'e'`/`'E'` has already been consumed. Returns the position of the
/// first non-digit encountered when no digit follows at all.
fn consume_exponent_tail<R: Read + 'static>(
    lx: &mut LexerState<R>,
    text: &mut String,
) -> Result<(), Pos> {
    text.push('e');
    if let Some(sign) = consume_if(lx, |c| c == '+' || c == '-') {
        text.push(sign);
    }
    let mut any = false;
    loop {
        match lx.next_rune() {
            Rune::Scalar(c) if c.is_ascii_digit() => {
                text.push(c);
                any = true;
            }
            _ => {
                let bad_pos = lx.current_pos();
                lx.undo_rune();
                return if any { Ok(()) } else { Err(bad_pos) };
            }
        }
    }
}

/// Inserts a `0` after a bare trailing decimal point (`"10."` ->
/// `"10.0"`, `"10.e3"` -> `"10.0e3"`) so `rug::Float::parse` always sees
/// a digit on both sides of the point.
fn canonicalize_decimal_point(text: &str) -> String {
    match text.find('.') {
        None => text.to_string(),
        Some(idx) => {
            let after = &text[idx + 1..];
            if after.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                text.to_string()
            } else {
                format!("{}.0{}", &text[..idx], after)
            }
        }
    }
}

fn emit_float<R: Read + 'static>(
    lx: &mut LexerState<R>,
    text: &str,
    float_kind: TokenKind,
    start_pos: Pos,
) {
    let canon = canonicalize_decimal_point(text);
    let incomplete = rug::Float::parse(&canon).unwrap_or_else(|e| {
        panic!("internal invariant violated: float literal '{canon}' failed to parse after validation: {e}")
    });
    let value = rug::Float::with_val(FLOAT_PRECISION_BITS, incomplete);
    lx.emit(start_pos, float_kind, Value::Float(value));
}

fn emit_decimal_integer<R: Read + 'static>(
    lx: &mut LexerState<R>,
    digits: &str,
    int_kind: TokenKind,
    start_pos: Pos,
) {
    let value = rug::Integer::parse_radix(digits, 10)
        .expect("digit run contains only ASCII decimal digits");
    lx.emit(start_pos, int_kind, Value::Integer(rug::Integer::from(value)));
}

fn emit_octal_or_error<R: Read + 'static>(
    lx: &mut LexerState<R>,
    digits: &str,
    int_kind: TokenKind,
    start_pos: Pos,
) {
    for (i, c) in digits.char_indices() {
        if c as u32 >= '8' as u32 {
            let bad_pos = start_pos + i as Pos;
            lx.error(
                bad_pos,
                format!("invalid character U+{:04X} '{c}' in base 8 literal", c as u32),
            );
            return;
        }
    }
    let value =
        rug::Integer::parse_radix(digits, 8).expect("digits were validated as octal above");
    lx.emit(start_pos, int_kind, Value::Integer(rug::Integer::from(value)));
}

fn is_consumable_digit(c: char, base: u32) -> bool {
    if c.is_ascii_digit() {
        return true;
    }
    if base > 10 {
        if let Some(d) = c.to_digit(36) {
            return d < base;
        }
    }
    false
}

fn integer_step<R: Read + 'static>(lx: &mut LexerState<R>, kind: TokenKind, base: u32) {
    let start_pos = lx.current_pos();
    lx.start_token(start_pos);

    let mut raw = String::new();
    if let Rune::Scalar(c) = lx.current_rune() {
        raw.push(c);
    }
    consume_run(lx, &mut raw, |c| is_consumable_digit(c, base));

    if raw.is_empty() {
        lx.error(start_pos, format!("malformed base {base} literal"));
        return;
    }

    if base < 10 {
        for (i, c) in raw.char_indices() {
            if let Some(d) = c.to_digit(10) {
                if d >= base {
                    let bad_pos = start_pos + i as Pos;
                    lx.error(
                        bad_pos,
                        format!("invalid character {c} in base {base} literal"),
                    );
                    return;
                }
            }
        }
    }

    match rug::Integer::parse_radix(&raw, base as i32) {
        Ok(parsed) => lx.emit(start_pos, kind, Value::Integer(rug::Integer::from(parsed))),
        Err(_) => lx.error(start_pos, format!("malformed base {base} literal")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::source::SourceFile;
    use crate::token::Value;
    use std::io::Cursor;

    const T_INT: TokenKind = TokenKind(1);
    const T_FLOAT: TokenKind = TokenKind(2);
    const T_RAW: TokenKind = TokenKind(0);

    fn test_initial<R: Read + 'static>() -> StateFn<R> {
        StateFn::new(|lx: &mut LexerState<R>| -> Option<StateFn<R>> {
            match lx.next_rune() {
                Rune::Eof => lx.emit(lx.current_pos(), TokenKind::EOF, Value::None),
                Rune::Scalar(c) if c.is_ascii_digit() => {
                    return Some(number_state(T_INT, T_FLOAT, '.'));
                }
                Rune::Scalar(c) if c == '.' => {
                    if matches!(lx.peek_rune(), Rune::Scalar(d) if d.is_ascii_digit()) {
                        return Some(number_state(T_INT, T_FLOAT, '.'));
                    }
                    lx.emit(lx.current_pos(), T_RAW, Value::Rune(c));
                }
                Rune::Scalar(c) => lx.emit(lx.current_pos(), T_RAW, Value::Rune(c)),
            }
            None
        })
    }

    fn lex_all(input: &'static str) -> Vec<(TokenKind, Pos, Option<String>)> {
        let file = SourceFile::new("t", Cursor::new(input.as_bytes())).unwrap();
        let mut lexer = Lexer::new(file, test_initial());
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let desc = match &tok.value {
                Value::String(s) => Some(s.clone()),
                Value::Rune(c) => Some(c.to_string()),
                Value::Integer(i) => Some(i.to_string()),
                Value::Float(f) => Some(f.to_string()),
                Value::None => None,
            };
            let eof = tok.is_eof();
            out.push((tok.kind, tok.pos, desc));
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn s1_mixed_integers() {
        let toks = lex_all("0x24 12 0666");
        let ints: Vec<_> = toks
            .iter()
            .filter(|(k, _, _)| *k == T_INT)
            .map(|(_, pos, v)| (*pos, v.clone().unwrap()))
            .collect();
        assert_eq!(
            ints,
            vec![(0, "36".to_string()), (5, "12".to_string()), (8, "438".to_string())]
        );
        assert_eq!(toks.last().unwrap().0, TokenKind::EOF);
        assert_eq!(toks.last().unwrap().1, 12);
    }

    #[test]
    fn s5_base_8_invalid_digit() {
        let toks = lex_all("08");
        assert_eq!(toks[0].0, TokenKind::ERROR);
        assert_eq!(toks[0].1, 1);
        assert_eq!(
            toks[0].2.as_deref(),
            Some("invalid character U+0038 '8' in base 8 literal")
        );
    }

    #[test]
    fn s4_malformed_float_exponent() {
        let toks = lex_all("1eB:.e7:1ee");
        let kinds: Vec<TokenKind> = toks.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::ERROR,
                T_RAW,
                T_RAW,
                T_RAW,
                T_RAW,
                T_INT,
                T_RAW,
                TokenKind::ERROR,
                T_RAW,
                TokenKind::EOF,
            ]
        );
        assert_eq!(toks[0].1, 2);
        assert_eq!(toks[5].2.as_deref(), Some("7"));
        assert_eq!(toks[7].1, 10);
    }

    #[test]
    fn float_round_trip_values() {
        let toks = lex_all("10. 0.5 10.e3");
        let floats: Vec<_> = toks
            .iter()
            .filter(|(k, _, _)| *k == T_FLOAT)
            .map(|(_, _, v)| v.clone().unwrap())
            .collect();
        assert_eq!(floats.len(), 3);
    }
}
