//! ideacrypt Cryptographic Primitives
//!
//! Building blocks for the `|*E*|IDEA|` chat encryption protocol. Pure
//! functions with deterministic outputs. Callers provide the random padding
//! bytes so that encryption is reproducible under test.
//!
//! # Key Lifecycle
//!
//! A pre-shared passphrase is expanded into 128 bits of key material by one of
//! three versioned expansion schemes. The material is turned into an IDEA key
//! schedule (forward for encryption, inverse for decryption) that lives only
//! for a single buffer operation.
//!
//! ```text
//! Passphrase
//!        │
//!        ▼
//! KeyVersion::expand → KeyMaterial (8 × u16)
//!        │                    │
//!        ▼                    ▼
//! KeySchedule (52 × u16)   Fingerprint (CRC-32 hex)
//!        │
//!        ▼
//! CBC over [pad | CRC tag | plaintext] → base64
//! ```
//!
//! # Security
//!
//! Integrity only:
//! - The CRC-32 tag detects corruption and wrong-key decryption, it does not
//!   authenticate. A deliberate forger who fixes up the CRC is not detected.
//! - The chain register starts at zero for every message, so identical
//!   plaintext prefixes under one key produce identical leading ciphertext
//!   blocks. Kept for wire compatibility with existing peers.
//!
//! No forward secrecy:
//! - Keys are long-lived pre-shared passphrases.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod checksum;
pub mod derivation;
pub mod engine;
pub mod error;
pub mod idea;

pub use derivation::KeyVersion;
pub use engine::{PAD_MAX, decrypt_buffer, encrypt_buffer, pad_len};
pub use error::CryptoError;
pub use idea::{BLOCK_SIZE, KeyMaterial, KeySchedule};
