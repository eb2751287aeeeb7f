//! Note number to virtual-piano key.

use pianokeys_types::KeyId;

/// Note number of the first mapped key (C3).
pub const BASE_NOTE: i32 = 48;

/// Number of keys on the virtual piano, C3 through C8.
pub const KEY_COUNT: usize = 61;

/// The virtual piano layout, one entry per semitone starting at [`BASE_NOTE`].
/// Uppercase letters and symbols are the shifted (black) keys.
pub const VIRTUAL_PIANO_KEYS: [char; KEY_COUNT] = [
    '1', '!', '2', '@', '3', '4', '$', '5', '%', '6', '^', '7', //
    '8', '*', '9', '(', '0', 'q', 'Q', 'w', 'W', 'e', 'E', 'r', //
    't', 'T', 'y', 'Y', 'u', 'i', 'I', 'o', 'O', 'p', 'P', 'a', //
    's', 'S', 'd', 'D', 'f', 'g', 'G', 'h', 'H', 'j', 'J', 'k', //
    'l', 'L', 'z', 'Z', 'x', 'c', 'C', 'v', 'V', 'b', 'B', 'n', //
    'm',
];

/// Fixed mapping from note numbers to keys. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMapper {
    keys: [KeyId; KEY_COUNT],
}

impl NoteMapper {
    pub fn new(keys: [KeyId; KEY_COUNT]) -> Self {
        Self { keys }
    }

    pub fn virtual_piano() -> Self {
        Self::new(VIRTUAL_PIANO_KEYS.map(KeyId::new))
    }

    /// `Some` iff `BASE_NOTE <= note < BASE_NOTE + KEY_COUNT`. Notes outside
    /// the range are silently unmapped.
    pub fn map(&self, note: i32) -> Option<KeyId> {
        let index = note.checked_sub(BASE_NOTE)?;
        let index = usize::try_from(index).ok()?;
        self.keys.get(index).copied()
    }

    pub fn keys(&self) -> &[KeyId] {
        &self.keys
    }

    /// Highest note with a key.
    pub fn top_note(&self) -> i32 {
        BASE_NOTE + KEY_COUNT as i32 - 1
    }
}

impl Default for NoteMapper {
    fn default() -> Self {
        Self::virtual_piano()
    }
}
