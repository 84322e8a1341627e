//! Buffer encryption
//!
//! Pads, tags, encrypts and encodes a single message.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────┬──────────────┬───────────┐
//! │ pad (1..=8) │ CRC hex (8)  │ plaintext │
//! └─────────────┴──────────────┴───────────┘
//!   byte 0: bits 7-5 = pad length - 1, bits 4-0 random
//! ```
//!
//! The buffer is always a whole number of 8-byte blocks. It is encrypted with
//! IDEA in CBC mode, the chain register starting at zero for every message,
//! and transported as standard base64 with padding.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

use crate::{
    checksum::{CRC_HEX_LEN, crc32_hex, matches_hex},
    error::CryptoError,
    idea::{BLOCK_SIZE, Block, KeyMaterial, KeySchedule, read_block, write_block},
};

/// Largest padding length (one whole block).
pub const PAD_MAX: usize = BLOCK_SIZE;

/// Smallest decodable ciphertext: one padding byte plus the tag, rounded up.
pub const MIN_CIPHERTEXT_LEN: usize = 2 * BLOCK_SIZE;

/// Padding length for a plaintext of `len` bytes.
///
/// Always in `1..=8`. Together with the 8-byte tag this makes the buffer a
/// multiple of the block size.
pub fn pad_len(len: usize) -> usize {
    BLOCK_SIZE - len % BLOCK_SIZE
}

/// Encrypt `plaintext` and return the base64 ciphertext.
///
/// `padding` supplies the random filler bytes. Only the first
/// [`pad_len`] bytes are used, and the top three bits of the first one are
/// overwritten with the padding length.
pub fn encrypt_buffer(material: &KeyMaterial, plaintext: &[u8], padding: [u8; PAD_MAX]) -> String {
    let pad = pad_len(plaintext.len());
    let tag = crc32_hex(plaintext);

    let mut buf = Zeroizing::new(Vec::with_capacity(pad + CRC_HEX_LEN + plaintext.len()));
    buf.extend_from_slice(&padding[..pad]);
    buf.extend_from_slice(tag.as_bytes());
    buf.extend_from_slice(plaintext);
    buf[0] = (buf[0] & 0x1f) | (((pad - 1) as u8) << 5);
    debug_assert_eq!(buf.len() % BLOCK_SIZE, 0);

    let schedule = KeySchedule::forward(material);
    let mut chain: Block = [0; 4];
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let block = xor(read_block(chunk), chain);
        chain = schedule.apply(block);
        write_block(chain, chunk);
    }

    STANDARD.encode(&*buf)
}

/// Decode and decrypt a base64 ciphertext produced by [`encrypt_buffer`].
///
/// # Errors
///
/// - [`CryptoError::InvalidEncoding`] for malformed base64
/// - [`CryptoError::InvalidLength`] if the data is not whole blocks or is
///   shorter than [`MIN_CIPHERTEXT_LEN`]
/// - [`CryptoError::ChecksumMismatch`] for a wrong key or corrupted data
pub fn decrypt_buffer(material: &KeyMaterial, ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
    let mut buf = Zeroizing::new(STANDARD.decode(ciphertext)?);
    if buf.len() % BLOCK_SIZE != 0 || buf.len() < MIN_CIPHERTEXT_LEN {
        return Err(CryptoError::InvalidLength { len: buf.len() });
    }

    let schedule = KeySchedule::inverse(material);
    let mut chain: Block = [0; 4];
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let cipher = read_block(chunk);
        write_block(xor(schedule.apply(cipher), chain), chunk);
        chain = cipher;
    }

    let pad = usize::from(buf[0] >> 5) + 1;
    let (tag, plaintext) = buf[pad..].split_at(CRC_HEX_LEN);
    if !matches_hex(plaintext, tag) {
        return Err(CryptoError::ChecksumMismatch);
    }

    Ok(plaintext.to_vec())
}

fn xor(a: Block, b: Block) -> Block {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyVersion;

    const FIXED_PAD: [u8; PAD_MAX] = [0xAB; PAD_MAX];

    fn payload() -> &'static [u8] {
        b"alice\x015f5e1000\x01hello"
    }

    #[test]
    fn pad_len_range() {
        assert_eq!(pad_len(0), 8);
        assert_eq!(pad_len(1), 7);
        assert_eq!(pad_len(7), 1);
        assert_eq!(pad_len(8), 8);
        assert_eq!(pad_len(20), 4);
    }

    #[test]
    fn known_ciphertext() {
        let material = KeyVersion::V1.expand("hunter2");
        let encrypted = encrypt_buffer(&material, payload(), FIXED_PAD);
        assert_eq!(encrypted, "h/eo/+6jSdM9smKnk6+4ZZaidsB8y5cUH3d790BRP1M=");
    }

    #[test]
    fn known_ciphertext_empty_plaintext() {
        let material = KeyVersion::V1.expand("hunter2");
        let encrypted = encrypt_buffer(&material, b"", FIXED_PAD);
        assert_eq!(encrypted, "Thsy7xlvMfs0NkbSMdPBtQ==");
        assert_eq!(decrypt_buffer(&material, &encrypted), Ok(Vec::new()));
    }

    #[test]
    fn decrypt_known_ciphertext() {
        let material = KeyVersion::V1.expand("hunter2");
        let plaintext =
            decrypt_buffer(&material, "h/eo/+6jSdM9smKnk6+4ZZaidsB8y5cUH3d790BRP1M=").unwrap();
        assert_eq!(plaintext, payload());
    }

    #[test]
    fn wrong_key_fails_checksum() {
        let encrypted = encrypt_buffer(&KeyVersion::V1.expand("hunter2"), payload(), FIXED_PAD);
        let result = decrypt_buffer(&KeyVersion::V1.expand("hunter3"), &encrypted);
        assert_eq!(result, Err(CryptoError::ChecksumMismatch));
    }

    #[test]
    fn padding_bytes_are_randomizable() {
        let material = KeyVersion::V3.expand("hunter2");
        let a = encrypt_buffer(&material, payload(), [0x00; PAD_MAX]);
        let b = encrypt_buffer(&material, payload(), [0x1F; PAD_MAX]);
        assert_ne!(a, b);
        assert_eq!(decrypt_buffer(&material, &a).unwrap(), payload());
        assert_eq!(decrypt_buffer(&material, &b).unwrap(), payload());
    }

    #[test]
    fn rejects_bad_base64() {
        let material = KeyVersion::V3.expand("k");
        let result = decrypt_buffer(&material, "not base64!");
        assert!(matches!(result, Err(CryptoError::InvalidEncoding { .. })));
    }

    #[test]
    fn rejects_partial_block() {
        let material = KeyVersion::V3.expand("k");
        let ciphertext = STANDARD.encode([0u8; 12]);
        assert_eq!(decrypt_buffer(&material, &ciphertext), Err(CryptoError::InvalidLength { len: 12 }));
    }

    #[test]
    fn rejects_single_block() {
        let material = KeyVersion::V3.expand("k");
        let ciphertext = STANDARD.encode([0u8; 8]);
        assert_eq!(decrypt_buffer(&material, &ciphertext), Err(CryptoError::InvalidLength { len: 8 }));
    }

    #[test]
    fn rejects_empty() {
        let material = KeyVersion::V3.expand("k");
        assert_eq!(decrypt_buffer(&material, ""), Err(CryptoError::InvalidLength { len: 0 }));
    }
}
