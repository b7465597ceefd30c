//! Source position representation.

/// A rune index into an input stream, or the sentinel [`NO_POS`].
///
/// Positions are rune-indexed, not byte-indexed: the first rune of a file
/// is position `0`, the second is `1`, and so on, regardless of how many
/// UTF-8 bytes each rune occupies. Positions are monotonically
/// non-decreasing as a stream is consumed.
pub type Pos = i64;

/// Sentinel value meaning "no position is available", e.g. before any
/// rune has been read, or after push-back has exhausted the undo history.
pub const NO_POS: Pos = -1;
