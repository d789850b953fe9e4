//! Caret offset conversion between the browser and Rust
//!
//! Browsers report selection offsets in UTF-16 code units; the engine works
//! in UTF-8 byte offsets.

/// Byte offset for a UTF-16 offset, clamped to the end of `text`
///
/// An offset falling between the two halves of a surrogate pair resolves to
/// the start of that character.
pub fn utf16_to_byte(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// UTF-16 offset for a byte offset, clamped to the end of `text`
///
/// A byte offset inside a multi-byte character counts up to that
/// character's start.
pub fn byte_to_utf16(text: &str, byte_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if byte + ch.len_utf8() > byte_offset {
            return units;
        }
        units += ch.len_utf16();
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_identity() {
        let text = "@evento:Sess";
        for i in 0..=text.len() {
            assert_eq!(utf16_to_byte(text, i), i);
            assert_eq!(byte_to_utf16(text, i), i);
        }
    }

    #[test]
    fn test_accented_text() {
        // "Olá" is 3 UTF-16 units, 4 bytes
        let text = "Olá @evento:";
        assert_eq!(utf16_to_byte(text, 3), 4);
        assert_eq!(utf16_to_byte(text, 12), text.len());
        assert_eq!(byte_to_utf16(text, text.len()), 12);
        assert_eq!(byte_to_utf16(text, 4), 3);
    }

    #[test]
    fn test_surrogate_pairs() {
        // U+1F600 is 2 UTF-16 units, 4 bytes
        let text = "a😀b";
        assert_eq!(utf16_to_byte(text, 1), 1);
        assert_eq!(utf16_to_byte(text, 2), 1);
        assert_eq!(utf16_to_byte(text, 3), 5);
        assert_eq!(byte_to_utf16(text, 5), 3);
        assert_eq!(byte_to_utf16(text, 3), 1);
    }

    #[test]
    fn test_past_end_is_clamped() {
        assert_eq!(utf16_to_byte("abc", 99), 3);
        assert_eq!(byte_to_utf16("ção", 99), 3);
        assert_eq!(utf16_to_byte("", 5), 0);
    }
}
