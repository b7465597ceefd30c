//! The value produced by the rune source on every step.

/// A single step of the rune source: either a valid Unicode scalar or a
/// sentinel.
///
/// `Invalid` never escapes the rune source or undo ring to a caller; it
/// only occupies ring slots that have not yet been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rune {
    /// A decoded Unicode scalar value.
    Scalar(char),
    /// End of input has been reached.
    Eof,
    /// Placeholder for an undo-ring slot that has never held a real entry.
    Invalid,
}

impl Rune {
    /// True for anything other than [`Rune::Invalid`].
    pub fn is_defined(self) -> bool {
        !matches!(self, Rune::Invalid)
    }
}
