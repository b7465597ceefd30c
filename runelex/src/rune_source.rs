//! Buffered UTF-8 decoder with sentinel byte, BOM/NUL filtering, and a
//! latching I/O error policy.

use std::io::Read;

use crate::pos::Pos;
use crate::queue::TokenQueue;
use crate::rune::Rune;
use crate::source::SourceFile;
use crate::token::{TokenKind, Value};
use crate::undo::UndoRing;

/// Longest a single UTF-8 encoded scalar value can be.
pub const UTF8_MAX: usize = 4;

/// Default size of the internal fill buffer.
pub const DEFAULT_READ_BUFFER: usize = 4096;

/// Cap on consecutive zero-progress fills before the source gives up and
/// latches a "no-progress" I/O error, guarding against a misbehaving
/// reader that never reaches a real EOF.
pub const MAX_ZERO_PROGRESS_READS: usize = 100;

/// A byte value that can never start a valid UTF-8 sequence, used to mark
/// the unfilled tail of the buffer so the fast path's `< 0x80` check and
/// the multi-byte decoder both fail safely past `write`.
const SENTINEL_BYTE: u8 = 0xFF;

struct IoState {
    latched: bool,
    clean_eof: bool,
    message: Option<String>,
}

impl IoState {
    fn fresh() -> Self {
        IoState {
            latched: false,
            clean_eof: false,
            message: None,
        }
    }
}

/// Streaming UTF-8 rune decoder sitting between a [`SourceFile`]'s byte
/// reader and the undo ring / token queue.
pub struct RuneSource {
    buf: Vec<u8>,
    read: usize,
    write: usize,
    /// Rune-index position of the next not-yet-decoded rune.
    next_pos: Pos,
    /// Current line number, kept in step with `SourceFile::add_line`.
    line: usize,
    io: IoState,
    zero_progress_streak: usize,
}

impl RuneSource {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_READ_BUFFER)
    }

    fn with_capacity(capacity: usize) -> Self {
        let mut buf = vec![0u8; capacity + 1];
        buf[0] = SENTINEL_BYTE;
        RuneSource {
            buf,
            read: 0,
            write: 0,
            next_pos: 0,
            line: 1,
            io: IoState::fresh(),
            zero_progress_streak: 0,
        }
    }

    /// Advance the cursor, returning a replayed entry from the undo ring
    /// if one is pending, otherwise decoding (or re-decoding EOF) fresh.
    pub fn next_rune<R: Read>(
        &mut self,
        file: &mut SourceFile<R>,
        undo: &mut UndoRing,
        queue: &mut TokenQueue,
    ) -> Rune {
        if undo.has_pending() {
            return undo.advance().1;
        }
        self.decode_and_push(file, undo, queue)
    }

    pub fn undo_rune(&self, undo: &mut UndoRing) {
        undo.retreat();
    }

    /// Equivalent to `next_rune` followed by `undo_rune`, except at EOF
    /// which is simply returned without needing to push anything back.
    pub fn peek_rune<R: Read>(
        &mut self,
        file: &mut SourceFile<R>,
        undo: &mut UndoRing,
        queue: &mut TokenQueue,
    ) -> Rune {
        let r = self.next_rune(file, undo, queue);
        if r != Rune::Eof {
            undo.retreat();
        }
        r
    }

    pub fn current_rune(&self, undo: &UndoRing) -> Rune {
        undo.current().1
    }

    pub fn current_pos(&self, undo: &UndoRing) -> Pos {
        undo.current().0
    }

    fn decode_and_push<R: Read>(
        &mut self,
        file: &mut SourceFile<R>,
        undo: &mut UndoRing,
        queue: &mut TokenQueue,
    ) -> Rune {
        loop {
            if self.write - self.read < UTF8_MAX && !self.io.latched {
                self.fill(file);
            }

            if self.read >= self.write {
                let (_, last) = undo.current();
                if last != Rune::Eof {
                    undo.push(self.next_pos, Rune::Eof);
                }
                if self.io.latched && !self.io.clean_eof {
                    if let Some(message) = self.io.message.take() {
                        log::debug!("rune source latched I/O error: {message}");
                        queue.push_error(self.next_pos, format!("I/O error: {message}"));
                    }
                }
                return Rune::Eof;
            }

            let byte = self.buf[self.read];

            if byte == 0 {
                let pos = self.next_pos;
                self.read += 1;
                self.next_pos += 1;
                queue.push_error(pos, "embedded NUL byte".to_string());
                continue;
            }

            if byte < 0x80 {
                self.read += 1;
                let pos = self.next_pos;
                self.next_pos += 1;
                let ch = byte as char;
                if ch == '\n' {
                    self.line += 1;
                    file.add_line(self.next_pos, self.line)
                        .expect("rune source registers lines strictly in order");
                }
                undo.push(pos, Rune::Scalar(ch));
                return Rune::Scalar(ch);
            }

            match decode_one(&self.buf[self.read..self.write]) {
                Ok((ch, len)) => {
                    let pos = self.next_pos;
                    self.read += len;
                    self.next_pos += len as Pos;
                    if ch == '\u{FEFF}' {
                        if pos == 0 {
                            log::trace!("skipping byte order mark at position 0");
                        } else {
                            queue.push_error(pos, "byte order mark found mid-file".to_string());
                        }
                        continue;
                    }
                    undo.push(pos, Rune::Scalar(ch));
                    return Rune::Scalar(ch);
                }
                Err(bad_len) => {
                    let pos = self.next_pos;
                    let consumed = bad_len.max(1);
                    self.read += consumed;
                    self.next_pos += consumed as Pos;
                    queue.push_error(pos, "invalid UTF-8 byte sequence".to_string());
                    continue;
                }
            }
        }
    }

    fn fill<R: Read>(&mut self, file: &mut SourceFile<R>) {
        if self.io.latched {
            return;
        }
        if self.read > 0 {
            self.buf.copy_within(self.read..self.write, 0);
            self.write -= self.read;
            self.read = 0;
        }

        let mut progressed = false;
        while self.write - self.read < UTF8_MAX && !self.io.latched {
            if self.write + 1 >= self.buf.len() {
                let new_len = self.buf.len() * 2;
                self.buf.resize(new_len, 0);
            }
            let tail_end = self.buf.len() - 1;
            match file.read_into(&mut self.buf[self.write..tail_end]) {
                Ok(0) => {
                    self.io.latched = true;
                    self.io.clean_eof = true;
                    break;
                }
                Ok(n) => {
                    self.write += n;
                    progressed = true;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.io.latched = true;
                    self.io.clean_eof = false;
                    self.io.message = Some(e.to_string());
                    break;
                }
            }
        }

        if progressed {
            self.zero_progress_streak = 0;
        } else if !self.io.latched {
            self.zero_progress_streak += 1;
            log::trace!(
                "buffer fill made no progress ({} consecutive)",
                self.zero_progress_streak
            );
            if self.zero_progress_streak >= MAX_ZERO_PROGRESS_READS {
                self.io.latched = true;
                self.io.clean_eof = false;
                self.io.message =
                    Some("no progress reading input stream after repeated empty reads".into());
            }
        }

        self.buf[self.write] = SENTINEL_BYTE;
    }
}

impl Default for RuneSource {
    fn default() -> Self {
        Self::new()
    }
}

trait TokenQueueExt {
    fn push_error(&mut self, pos: Pos, message: String);
}

impl TokenQueueExt for TokenQueue {
    fn push_error(&mut self, pos: Pos, message: String) {
        self.push(crate::token::TokenItem {
            kind: TokenKind::ERROR,
            pos,
            value: Value::String(message),
        });
    }
}

/// Decodes one UTF-8 scalar value from the start of `bytes`, which must
/// not include the sentinel byte past the filled region. Returns the
/// number of *available* bytes that should be consumed on failure (at
/// least one) so the caller always makes progress.
fn decode_one(bytes: &[u8]) -> Result<(char, usize), usize> {
    let b0 = bytes[0];
    let len = if b0 & 0x80 == 0 {
        1
    } else if b0 & 0xE0 == 0xC0 {
        2
    } else if b0 & 0xF0 == 0xE0 {
        3
    } else if b0 & 0xF8 == 0xF0 {
        4
    } else {
        return Err(1);
    };
    if bytes.len() < len {
        return Err(bytes.len().max(1));
    }
    for &b in &bytes[1..len] {
        if b & 0xC0 != 0x80 {
            return Err(1);
        }
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => Ok((s.chars().next().expect("validated one-scalar slice"), len)),
        Err(_) => Err(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drive(text: &'static str) -> (Vec<Rune>, Vec<Pos>) {
        let mut file = SourceFile::new("t", Cursor::new(text.as_bytes())).unwrap();
        file.add_line(0, 1).unwrap();
        let mut source = RuneSource::new();
        let mut undo = UndoRing::new();
        let mut queue = TokenQueue::new();
        let mut runes = Vec::new();
        let mut positions = Vec::new();
        loop {
            let r = source.next_rune(&mut file, &mut undo, &mut queue);
            positions.push(source.current_pos(&undo));
            let eof = r == Rune::Eof;
            runes.push(r);
            if eof {
                break;
            }
        }
        (runes, positions)
    }

    #[test]
    fn ascii_and_multibyte_positions() {
        let (runes, positions) = drive("aéb");
        assert_eq!(
            runes,
            vec![
                Rune::Scalar('a'),
                Rune::Scalar('é'),
                Rune::Scalar('b'),
                Rune::Eof,
            ]
        );
        assert_eq!(positions, vec![0, 1, 3, 4]);
    }

    #[test]
    fn undo_then_peek_replays_same_rune() {
        let mut file = SourceFile::new("t", Cursor::new("aéb".as_bytes())).unwrap();
        file.add_line(0, 1).unwrap();
        let mut source = RuneSource::new();
        let mut undo = UndoRing::new();
        let mut queue = TokenQueue::new();

        source.next_rune(&mut file, &mut undo, &mut queue);
        source.next_rune(&mut file, &mut undo, &mut queue);
        source.next_rune(&mut file, &mut undo, &mut queue);
        source.undo_rune(&mut undo);
        let peeked = source.peek_rune(&mut file, &mut undo, &mut queue);
        assert_eq!(peeked, Rune::Scalar('b'));
        // peek leaves the cursor exactly where it was before the peek: on
        // the rune the prior undo_rune exposed ('é', not the peeked 'b').
        assert_eq!(source.current_pos(&undo), 1);
    }

    #[test]
    fn embedded_nul_reports_error_and_continues() {
        let mut file = SourceFile::new("t", Cursor::new(&b"a\0b"[..])).unwrap();
        file.add_line(0, 1).unwrap();
        let mut source = RuneSource::new();
        let mut undo = UndoRing::new();
        let mut queue = TokenQueue::new();

        let mut runes = Vec::new();
        loop {
            let r = source.next_rune(&mut file, &mut undo, &mut queue);
            let eof = r == Rune::Eof;
            runes.push(r);
            if eof {
                break;
            }
        }
        assert_eq!(
            runes,
            vec![Rune::Scalar('a'), Rune::Scalar('b'), Rune::Eof]
        );
        assert_eq!(queue.count(), 1);
        let err = queue.pop();
        assert!(err.is_error());
    }

    #[test]
    fn bom_at_start_is_silent_mid_file_is_error() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("a".as_bytes());
        bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        bytes.extend_from_slice("b".as_bytes());

        let mut file = SourceFile::new("t", Cursor::new(bytes)).unwrap();
        file.add_line(0, 1).unwrap();
        let mut source = RuneSource::new();
        let mut undo = UndoRing::new();
        let mut queue = TokenQueue::new();

        let mut runes = Vec::new();
        loop {
            let r = source.next_rune(&mut file, &mut undo, &mut queue);
            let eof = r == Rune::Eof;
            runes.push(r);
            if eof {
                break;
            }
        }
        assert_eq!(
            runes,
            vec![Rune::Scalar('a'), Rune::Scalar('b'), Rune::Eof]
        );
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn repeated_eof_calls_are_stable() {
        let mut file = SourceFile::new("t", Cursor::new(&b""[..])).unwrap();
        file.add_line(0, 1).unwrap();
        let mut source = RuneSource::new();
        let mut undo = UndoRing::new();
        let mut queue = TokenQueue::new();

        for _ in 0..3 {
            let r = source.next_rune(&mut file, &mut undo, &mut queue);
            assert_eq!(r, Rune::Eof);
            assert_eq!(source.current_pos(&undo), 0);
        }
    }
}
