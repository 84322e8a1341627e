//! Versioned passphrase expansion
//!
//! Turns an arbitrary-length passphrase into 128 bits of IDEA key material.
//! Three schemes exist. Every envelope carries the scheme number in its
//! version field so a receiver always expands with the sender's scheme.
//!
//! All schemes share the same shape: stretch the passphrase with its own
//! CRC-32 hex digest, append the decimal length, then draw the key words from
//! CRC-32 values over slices of the stretched buffer.
//!
//! # Security
//!
//! CRC-32 is not a KDF. The expansion exists for interoperability with
//! deployed peers, not to resist brute force of weak passphrases.

use std::fmt;

use zeroize::Zeroizing;

use crate::{
    checksum::{crc32, crc32_concat, crc32_hex},
    error::CryptoError,
    idea::{KEY_WORDS, KeyMaterial},
};

/// Passphrases at least this long are stretched less.
const LONG_PASSPHRASE: usize = 64;

/// Key expansion scheme, as carried in the envelope's major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyVersion {
    /// Legacy scheme: suffix checksums at quarter boundaries.
    V1 = 1,
    /// Checksums over four disjoint, index-prefixed quarters.
    V2 = 2,
    /// Eight suffix checksums folded to 16 bits each.
    V3 = 3,
}

impl KeyVersion {
    /// Every supported version, oldest first.
    pub const ALL: [KeyVersion; 3] = [KeyVersion::V1, KeyVersion::V2, KeyVersion::V3];

    /// Newest supported version.
    pub const LATEST: KeyVersion = KeyVersion::V3;

    /// Numeric form used on the wire.
    pub fn number(self) -> u32 {
        self as u32
    }

    /// Parse a wire version number.
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Expand `passphrase` into key material.
    ///
    /// The empty passphrase yields all-zero material in every version.
    pub fn expand(self, passphrase: &str) -> KeyMaterial {
        let bytes = passphrase.as_bytes();
        if bytes.is_empty() {
            return KeyMaterial::zero();
        }

        match self {
            Self::V1 => expand_v1(bytes),
            Self::V2 => expand_v2(bytes),
            Self::V3 => expand_v3(bytes),
        }
    }

    /// Public fingerprint of `passphrase` under this version.
    ///
    /// 8 lowercase hex characters. Safe to publish: it identifies the key
    /// without revealing it.
    pub fn fingerprint(self, passphrase: &str) -> String {
        fingerprint(&self.expand(passphrase))
    }
}

impl TryFrom<u32> for KeyVersion {
    type Error = CryptoError;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        Self::from_number(version).ok_or(CryptoError::UnsupportedVersion { version })
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Fingerprint of already expanded key material.
pub fn fingerprint(material: &KeyMaterial) -> String {
    crc32_hex(&material.fingerprint_bytes())
}

/// Append the buffer's own digest `rounds` times.
fn stretch_append(buf: &mut Vec<u8>, rounds: usize) {
    for _ in 0..rounds {
        let digest = crc32_hex(buf);
        buf.extend_from_slice(digest.as_bytes());
    }
}

/// Prepend the buffer's own digest `rounds` times.
fn stretch_prepend(buf: &mut Vec<u8>, rounds: usize) {
    for _ in 0..rounds {
        let digest = crc32_hex(buf);
        buf.extend_from_slice(digest.as_bytes());
        buf.rotate_right(digest.len());
    }
}

fn append_length(buf: &mut Vec<u8>) {
    let len = buf.len().to_string();
    buf.extend_from_slice(len.as_bytes());
}

fn expand_v1(passphrase: &[u8]) -> KeyMaterial {
    let mut buf = Zeroizing::new(passphrase.to_vec());
    if buf.len() < LONG_PASSPHRASE {
        stretch_append(&mut buf, 8);
    }
    append_length(&mut buf);

    let quarter = buf.len() / 4;
    let mut crcs = [0u32; 4];
    for (i, crc) in crcs.iter_mut().enumerate() {
        *crc = crc32(&buf[i * quarter..]);
    }
    KeyMaterial::from_crcs(crcs)
}

fn expand_v2(passphrase: &[u8]) -> KeyMaterial {
    let mut buf = Zeroizing::new(passphrase.to_vec());
    stretch_append(&mut buf, 16);
    append_length(&mut buf);

    let len = buf.len();
    let quarter = len / 4;
    let mut crcs = [0u32; 4];
    for (i, crc) in crcs.iter_mut().enumerate() {
        let start = i * quarter;
        // Last quarter absorbs the remainder
        let end = if i == 3 { len } else { start + quarter };
        let index = [b'1' + i as u8];
        *crc = crc32_concat(&[&index[..], &buf[start..end]]);
    }
    KeyMaterial::from_crcs(crcs)
}

fn expand_v3(passphrase: &[u8]) -> KeyMaterial {
    let mut buf = Zeroizing::new(passphrase.to_vec());
    let rounds = if buf.len() >= LONG_PASSPHRASE { 8 } else { 32 };
    stretch_prepend(&mut buf, rounds);
    append_length(&mut buf);

    let eighth = buf.len() / KEY_WORDS;
    let mut words = [0u16; KEY_WORDS];
    for (i, word) in words.iter_mut().enumerate() {
        let crc = crc32(&buf[i * eighth..]);
        *word = ((crc >> 16) ^ (crc & 0xffff)) as u16;
    }
    KeyMaterial::from_words(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_matches_legacy_words() {
        let material = KeyVersion::V1.expand("hunter2");
        assert_eq!(
            material.words(),
            &[0x96D3, 0x6FC2, 0x8E40, 0x4C16, 0x1DE9, 0x7B33, 0xEEA2, 0x8A6B]
        );
    }

    #[test]
    fn fingerprints_short_passphrase() {
        assert_eq!(KeyVersion::V1.fingerprint("hunter2"), "000d7c43");
        assert_eq!(KeyVersion::V2.fingerprint("hunter2"), "f0dd9743");
        assert_eq!(KeyVersion::V3.fingerprint("hunter2"), "0d2c9061");
    }

    #[test]
    fn fingerprints_single_byte() {
        assert_eq!(KeyVersion::V1.fingerprint("a"), "cc812706");
        assert_eq!(KeyVersion::V2.fingerprint("a"), "2c285427");
        assert_eq!(KeyVersion::V3.fingerprint("a"), "c705a1bb");
    }

    #[test]
    fn fingerprints_long_passphrase() {
        let long = "x".repeat(64);
        assert_eq!(KeyVersion::V1.fingerprint(&long), "2b6538fa");
        assert_eq!(KeyVersion::V2.fingerprint(&long), "01c6e3ec");
        assert_eq!(KeyVersion::V3.fingerprint(&long), "f0f8bb32");
    }

    #[test]
    fn v3_words() {
        let material = KeyVersion::V3.expand("hunter2");
        assert_eq!(
            material.words(),
            &[0xE451, 0xFE8E, 0x5929, 0xBE02, 0x25F5, 0x83BC, 0xBD23, 0x7D3C]
        );
    }

    #[test]
    fn empty_passphrase_is_zero_key() {
        for version in KeyVersion::ALL {
            assert_eq!(version.expand(""), KeyMaterial::zero());
            assert_eq!(version.fingerprint(""), "ecbb4b55");
        }
    }

    #[test]
    fn versions_are_distinct() {
        let fps: Vec<String> = KeyVersion::ALL.iter().map(|v| v.fingerprint("hunter2")).collect();
        assert_ne!(fps[0], fps[1]);
        assert_ne!(fps[1], fps[2]);
        assert_ne!(fps[0], fps[2]);
    }

    #[test]
    fn version_numbers_roundtrip() {
        for version in KeyVersion::ALL {
            assert_eq!(KeyVersion::from_number(version.number()), Some(version));
        }
        assert_eq!(KeyVersion::from_number(0), None);
        assert_eq!(KeyVersion::from_number(4), None);
        assert_eq!(KeyVersion::V2.to_string(), "2");
    }

    #[test]
    fn try_from_rejects_unknown() {
        assert_eq!(KeyVersion::try_from(3), Ok(KeyVersion::V3));
        assert_eq!(KeyVersion::try_from(9), Err(CryptoError::UnsupportedVersion { version: 9 }));
    }

    #[test]
    fn latest_is_last() {
        assert_eq!(KeyVersion::ALL.last(), Some(&KeyVersion::LATEST));
    }
}
