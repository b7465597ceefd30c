//! Thin demonstration binary for `runelex`.
//!
//! Builds a toy lexer out of the reusable state library (numbers, quoted
//! strings, quoted characters) plus a handful of inline rules for
//! identifiers and punctuation, then prints the resulting token stream.
//! This is not a production CLI: there is no subcommand framework, just a
//! single file-or-inline-snippet mode, mirroring `tester`'s own shape.

use std::env;
use std::fs;
use std::io::{Cursor, Read};

use log::info;

use runelex::source::SourceFile;
use runelex::state::{LexerState, StateFn};
use runelex::states::{number_state, quoted_character_state, quoted_string_state};
use runelex::token::{TokenKind, Value};
use runelex::{Lexer, Rune};

const T_IDENT: TokenKind = TokenKind(0);
const T_INT: TokenKind = TokenKind(1);
const T_FLOAT: TokenKind = TokenKind(2);
const T_STRING: TokenKind = TokenKind(3);
const T_CHAR: TokenKind = TokenKind(4);
const T_PUNCT: TokenKind = TokenKind(5);

const DEFAULT_SNIPPET: &str = r#"name = "runelex"; count = 0x2A; ratio = 3.5e1; c = 'x';"#;

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn toy_initial<R: Read + 'static>() -> StateFn<R> {
    StateFn::new(|lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        loop {
            match lx.next_rune() {
                Rune::Eof => {
                    lx.emit(lx.current_pos(), TokenKind::EOF, Value::None);
                    return None;
                }
                Rune::Scalar(c) if c.is_whitespace() => continue,
                Rune::Scalar(c) if c.is_ascii_digit() => return Some(number_state(T_INT, T_FLOAT, '.')),
                Rune::Scalar('"') => return Some(quoted_string_state(T_STRING)),
                Rune::Scalar('\'') => return Some(quoted_character_state(T_CHAR)),
                Rune::Scalar(c) if is_ident_start(c) => return Some(identifier_state()),
                Rune::Scalar(c) => {
                    lx.emit(lx.current_pos(), T_PUNCT, Value::Rune(c));
                    return None;
                }
            }
        }
    })
}

/// A small inline state function showing that a client can mix its own
/// rules alongside the reusable library; not itself part of `runelex`.
fn identifier_state<R: Read + 'static>() -> StateFn<R> {
    StateFn::new(|lx: &mut LexerState<R>| -> Option<StateFn<R>> {
        let start = lx.current_pos();
        let mut text = String::new();
        if let Rune::Scalar(c) = lx.current_rune() {
            text.push(c);
        }
        loop {
            match lx.next_rune() {
                Rune::Scalar(c) if is_ident_continue(c) => text.push(c),
                _ => {
                    lx.undo_rune();
                    break;
                }
            }
        }
        lx.emit(start, T_IDENT, Value::String(text));
        None
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::None => String::new(),
        Value::Rune(c) => c.to_string(),
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
    }
}

fn run<R: Read + 'static>(file: SourceFile<R>) {
    let mut lexer = Lexer::new(file, toy_initial());
    println!("pos  | kind      | fragment");
    loop {
        let token = lexer.next_token();
        let kind_label = match token.kind {
            TokenKind::EOF => "EOF",
            TokenKind::ERROR => "ERROR",
            T_IDENT => "IDENT",
            T_INT => "INT",
            T_FLOAT => "FLOAT",
            T_STRING => "STRING",
            T_CHAR => "CHAR",
            T_PUNCT => "PUNCT",
            _ => "?",
        };
        println!("{:<4} | {:<9} | {}", token.pos, kind_label, describe(&token.value));
        if token.is_eof() {
            break;
        }
    }
}

fn main() {
    env_logger::init();

    match env::args().nth(1) {
        Some(path) => {
            info!("lexing {path}");
            let bytes = fs::read(&path).expect("failed to read input file");
            let file = SourceFile::new(path, Cursor::new(bytes)).expect("path is non-empty");
            run(file);
        }
        None => {
            info!("no file given, lexing built-in snippet");
            let file = SourceFile::new(
                "<inline>",
                Cursor::new(DEFAULT_SNIPPET.as_bytes().to_vec()),
            )
            .expect("\"<inline>\" is non-empty");
            run(file);
        }
    }
}
