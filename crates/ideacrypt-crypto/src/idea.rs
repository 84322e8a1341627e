//! IDEA block cipher
//!
//! 64-bit blocks handled as four big-endian 16-bit words, 128-bit keys handled
//! as eight 16-bit words, 8.5 rounds driven by a 52-word key schedule.
//!
//! # Arithmetic
//!
//! - Addition modulo 2^16
//! - XOR
//! - Multiplication modulo 2^16 + 1, where the word `0` stands for 2^16
//!
//! Decryption runs the same round function with the algebraically inverted
//! schedule, so [`KeySchedule::apply`] serves both directions.

use zeroize::Zeroize;

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 8;

/// Number of full rounds.
pub const ROUNDS: usize = 8;

/// Subkeys per schedule: six per round plus four for the output transform.
pub const SCHEDULE_LEN: usize = 6 * ROUNDS + 4;

/// Number of 16-bit words of key material.
pub const KEY_WORDS: usize = 8;

/// Multiplication modulus (2^16 + 1, prime).
const MODULUS: u64 = 0x1_0001;

/// One cipher block as big-endian words.
pub type Block = [u16; 4];

/// Expanded passphrase: the 128-bit IDEA user key.
///
/// Produced by [`crate::KeyVersion::expand`]. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    words: [u16; KEY_WORDS],
}

impl KeyMaterial {
    /// Wrap raw key words.
    pub fn from_words(words: [u16; KEY_WORDS]) -> Self {
        Self { words }
    }

    /// All-zero material (what an empty passphrase expands to).
    pub fn zero() -> Self {
        Self { words: [0; KEY_WORDS] }
    }

    /// Split four 32-bit checksums into high/low word pairs.
    pub fn from_crcs(crcs: [u32; 4]) -> Self {
        let mut words = [0u16; KEY_WORDS];
        for (pair, crc) in words.chunks_exact_mut(2).zip(crcs) {
            pair[0] = (crc >> 16) as u16;
            pair[1] = (crc & 0xffff) as u16;
        }
        Self { words }
    }

    /// Key words, most significant first.
    pub fn words(&self) -> &[u16; KEY_WORDS] {
        &self.words
    }

    /// Serialization hashed by key fingerprints.
    ///
    /// Words are written big-endian in reverse order (word 7 first, word 0
    /// last). Fingerprints already published by peers depend on this order.
    pub fn fingerprint_bytes(&self) -> [u8; 2 * KEY_WORDS] {
        let mut bytes = [0u8; 2 * KEY_WORDS];
        for (dst, word) in bytes.chunks_exact_mut(2).zip(self.words.iter().rev()) {
            dst.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

/// IDEA key schedule (52 subkeys).
///
/// Built either in forward form for encryption or in inverse form for
/// decryption. Zeroized on drop.
#[derive(Clone)]
pub struct KeySchedule {
    subkeys: [u16; SCHEDULE_LEN],
}

impl KeySchedule {
    /// Encryption schedule.
    ///
    /// Subkeys are taken eight at a time from the 128-bit key, which is
    /// rotated left by 25 bits between groups.
    pub fn forward(material: &KeyMaterial) -> Self {
        let mut key = material.words().iter().fold(0u128, |acc, &w| (acc << 16) | u128::from(w));

        let mut subkeys = [0u16; SCHEDULE_LEN];
        for group in subkeys.chunks_mut(KEY_WORDS) {
            for (i, slot) in group.iter_mut().enumerate() {
                *slot = (key >> (112 - 16 * i)) as u16;
            }
            key = key.rotate_left(25);
        }
        key.zeroize();

        Self { subkeys }
    }

    /// Decryption schedule, the algebraic inverse of [`Self::forward`].
    pub fn inverse(material: &KeyMaterial) -> Self {
        let forward = Self::forward(material);
        let z = &forward.subkeys;
        let mut dk = [0u16; SCHEDULE_LEN];

        dk[0] = mul_inv(z[48]);
        dk[1] = z[49].wrapping_neg();
        dk[2] = z[50].wrapping_neg();
        dk[3] = mul_inv(z[51]);
        dk[4] = z[46];
        dk[5] = z[47];

        // Middle rounds swap the two additive subkeys
        for round in 1..ROUNDS {
            let src = 48 - 6 * round;
            let dst = 6 * round;
            dk[dst] = mul_inv(z[src]);
            dk[dst + 1] = z[src + 2].wrapping_neg();
            dk[dst + 2] = z[src + 1].wrapping_neg();
            dk[dst + 3] = mul_inv(z[src + 3]);
            dk[dst + 4] = z[src - 2];
            dk[dst + 5] = z[src - 1];
        }

        dk[48] = mul_inv(z[0]);
        dk[49] = z[1].wrapping_neg();
        dk[50] = z[2].wrapping_neg();
        dk[51] = mul_inv(z[3]);

        Self { subkeys: dk }
    }

    /// Run one block through the cipher.
    pub fn apply(&self, block: Block) -> Block {
        let [mut x1, mut x2, mut x3, mut x4] = block;

        for k in self.subkeys.chunks_exact(6).take(ROUNDS) {
            let y1 = mul(x1, k[0]);
            let y2 = x2.wrapping_add(k[1]);
            let y3 = x3.wrapping_add(k[2]);
            let y4 = mul(x4, k[3]);

            let t = mul(y1 ^ y3, k[4]);
            let u = mul((y2 ^ y4).wrapping_add(t), k[5]);
            let t = t.wrapping_add(u);

            x1 = y1 ^ u;
            x4 = y4 ^ t;
            x2 = y3 ^ u;
            x3 = y2 ^ t;
        }

        // Output transform undoes the final middle swap
        let k = &self.subkeys[6 * ROUNDS..];
        [mul(x1, k[0]), x3.wrapping_add(k[1]), x2.wrapping_add(k[2]), mul(x4, k[3])]
    }
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.subkeys.zeroize();
    }
}

/// Read a block from 8 bytes.
pub fn read_block(bytes: &[u8]) -> Block {
    debug_assert_eq!(bytes.len(), BLOCK_SIZE);
    [
        u16::from_be_bytes([bytes[0], bytes[1]]),
        u16::from_be_bytes([bytes[2], bytes[3]]),
        u16::from_be_bytes([bytes[4], bytes[5]]),
        u16::from_be_bytes([bytes[6], bytes[7]]),
    ]
}

/// Write a block into 8 bytes.
pub fn write_block(block: Block, bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), BLOCK_SIZE);
    for (dst, word) in bytes.chunks_exact_mut(2).zip(block) {
        dst.copy_from_slice(&word.to_be_bytes());
    }
}

/// Multiplication modulo 2^16 + 1 with `0` representing 2^16.
fn mul(a: u16, b: u16) -> u16 {
    let a = if a == 0 { 0x1_0000 } else { u64::from(a) };
    let b = if b == 0 { 0x1_0000 } else { u64::from(b) };
    // 2^16 reduces back to the zero word
    ((a * b) % MODULUS) as u16
}

/// Multiplicative inverse modulo 2^16 + 1 (Fermat).
fn mul_inv(x: u16) -> u16 {
    // 1 and 2^16 (the zero word) are their own inverses
    if x <= 1 {
        return x;
    }

    let mut result: u64 = 1;
    let mut base = u64::from(x);
    let mut exp = MODULUS - 2;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % MODULUS;
        }
        base = base * base % MODULUS;
        exp >>= 1;
    }
    result as u16
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn test_material() -> KeyMaterial {
        KeyMaterial::from_words([1, 2, 3, 4, 5, 6, 7, 8])
    }

    #[test]
    fn reference_vector() {
        let schedule = KeySchedule::forward(&test_material());
        assert_eq!(schedule.apply([0, 1, 2, 3]), [0x11FB, 0xED2B, 0x0198, 0x6DE5]);
    }

    #[test]
    fn reference_vector_inverse() {
        let schedule = KeySchedule::inverse(&test_material());
        assert_eq!(schedule.apply([0x11FB, 0xED2B, 0x0198, 0x6DE5]), [0, 1, 2, 3]);
    }

    #[test]
    fn forward_schedule_layout() {
        let schedule = KeySchedule::forward(&test_material());

        // First group is the raw key
        assert_eq!(&schedule.subkeys[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        // Second group is the key rotated left by 25 bits
        assert_eq!(
            &schedule.subkeys[8..16],
            &[0x0400, 0x0600, 0x0800, 0x0A00, 0x0C00, 0x0E00, 0x1000, 0x0200]
        );
        assert_eq!(&schedule.subkeys[48..], &[0x0080, 0x00C0, 0x0100, 0x0140]);
    }

    #[test]
    fn mul_treats_zero_as_two_pow_16() {
        // 2^16 * 2^16 = (-1)(-1) = 1 mod 2^16 + 1
        assert_eq!(mul(0, 0), 1);
        // 2^16 * 1 = 2^16 -> zero word
        assert_eq!(mul(0, 1), 0);
        assert_eq!(mul(2, 3), 6);
    }

    #[test]
    fn mul_inv_edges() {
        assert_eq!(mul_inv(0), 0);
        assert_eq!(mul_inv(1), 1);
        assert_eq!(mul_inv(0xFFFF), 0x8000);
    }

    #[test]
    fn block_bytes_big_endian() {
        let mut bytes = [0u8; BLOCK_SIZE];
        write_block([0x0102, 0x0304, 0x0506, 0x0708], &mut bytes);
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(read_block(&bytes), [0x0102, 0x0304, 0x0506, 0x0708]);
    }

    #[test]
    fn from_crcs_splits_high_first() {
        let material = KeyMaterial::from_crcs([0x1234_5678, 0x9ABC_DEF0, 0, 0xFFFF_0001]);
        assert_eq!(
            material.words(),
            &[0x1234, 0x5678, 0x9ABC, 0xDEF0, 0, 0, 0xFFFF, 0x0001]
        );
    }

    #[test]
    fn fingerprint_bytes_reverse_word_order() {
        let bytes = test_material().fingerprint_bytes();
        assert_eq!(bytes, [0, 8, 0, 7, 0, 6, 0, 5, 0, 4, 0, 3, 0, 2, 0, 1]);
    }

    #[test]
    fn debug_hides_key_words() {
        assert_eq!(format!("{:?}", test_material()), "KeyMaterial(..)");
    }

    proptest! {
        #[test]
        fn mul_inv_is_inverse(x in 2u16..=u16::MAX) {
            prop_assert_eq!(mul(x, mul_inv(x)), 1);
        }

        #[test]
        fn inverse_schedule_undoes_forward(words in any::<[u16; 8]>(), block in any::<[u16; 4]>()) {
            let material = KeyMaterial::from_words(words);
            let encrypted = KeySchedule::forward(&material).apply(block);
            prop_assert_eq!(KeySchedule::inverse(&material).apply(encrypted), block);
        }
    }
}
