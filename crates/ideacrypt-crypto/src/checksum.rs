//! CRC-32 checksums
//!
//! Used twice by the protocol: as entropy while expanding passphrases and as
//! the integrity tag stored in front of every plaintext. The tag travels as
//! 8 lowercase hex characters, never as raw bytes.

/// Length of the textual checksum (`%08x`).
pub const CRC_HEX_LEN: usize = 8;

/// CRC-32 (polynomial `0xEDB88320`) of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// CRC-32 over the concatenation of `parts`, without materializing it.
pub fn crc32_concat(parts: &[&[u8]]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// CRC-32 of `data` as 8 lowercase hex characters.
pub fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32(data))
}

/// Check `data` against a textual checksum tag.
pub fn matches_hex(data: &[u8], tag: &[u8]) -> bool {
    crc32_hex(data).as_bytes() == tag
}

/// Check `data` against a numeric checksum.
pub fn matches(data: &[u8], crc: u32) -> bool {
    crc32(data) == crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_check_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32_hex(b""), "00000000");
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        let hex = crc32_hex(b"hello");
        assert_eq!(hex, "3610a686");
        assert_eq!(hex.len(), CRC_HEX_LEN);
    }

    #[test]
    fn concat_matches_contiguous() {
        assert_eq!(crc32_concat(&[b"1234", b"", b"56789"]), crc32(b"123456789"));
    }

    #[test]
    fn matches_hex_detects_mismatch() {
        assert!(matches_hex(b"hello", b"3610a686"));
        assert!(!matches_hex(b"hellp", b"3610a686"));
        assert!(!matches_hex(b"hello", b"3610A686"));
    }

    #[test]
    fn matches_numeric() {
        assert!(matches(b"123456789", 0xCBF4_3926));
        assert!(!matches(b"123456780", 0xCBF4_3926));
    }
}
