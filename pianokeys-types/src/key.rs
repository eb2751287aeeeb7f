use serde::{Deserialize, Serialize};

/// One key of the virtual piano layout, as the character the target
/// application expects (`'q'`, `'Q'`, `'!'`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(char);

impl KeyId {
    pub const fn new(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl From<char> for KeyId {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
