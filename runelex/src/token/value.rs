/// The payload carried by a [`TokenItem`](super::TokenItem).
///
/// `ERROR` tokens always carry `String`. Other kinds carry whatever the
/// emitting state function chose. Marked `#[non_exhaustive]` so a client
/// that needs a bespoke payload wraps this enum rather than extending it
/// in place.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Value {
    None,
    Rune(char),
    String(String),
    Integer(rug::Integer),
    Float(rug::Float),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
