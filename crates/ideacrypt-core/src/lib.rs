//! ideacrypt Core
//!
//! Pre-shared-key encryption for chat lines. Owns the key tables and turns
//! plaintext into `|*E*|IDEA|...|` envelopes and back.
//!
//! # Architecture
//!
//! Synchronous and free of I/O. Time and randomness come from an injected
//! [`Environment`], so tests are deterministic and hosts decide where entropy
//! comes from. Mutation requires `&mut IdeaCrypt`; a multithreaded host wraps
//! the handle in a single lock.
//!
//! # Components
//!
//! - [`IdeaCrypt`]: Encrypt/decrypt handle owning a [`KeyStore`]
//! - [`KeyStore`]: Known keys by fingerprint, default keys by address
//! - [`CryptoConfig`]: Host-loaded settings
//! - [`DecryptError`]: User-facing decryption failure reasons

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod crypt;
pub mod env;
pub mod error;
pub mod key_store;

pub use config::CryptoConfig;
pub use crypt::{DecryptedMessage, IdeaCrypt};
pub use env::Environment;
pub use error::{ConfigError, DecryptError, EncryptError};
pub use ideacrypt_crypto::KeyVersion;
pub use key_store::KeyStore;
