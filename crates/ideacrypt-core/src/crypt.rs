//! Message encryption handle.
//!
//! [`IdeaCrypt`] ties the key store, key expansion, buffer cipher and wire
//! codec together:
//!
//! ```text
//! encrypt: nick + clock + text → pack → pad/tag/IDEA-CBC → base64 → envelope
//! decrypt: envelope → parse → fingerprint lookup → expand → decrypt → unpack
//! ```
//!
//! Decryption failures are reported as [`DecryptError`] values and never
//! touch the key store.

use ideacrypt_crypto::{KeyVersion, decrypt_buffer, derivation, encrypt_buffer};
use ideacrypt_proto::{Envelope, InnerPayload, is_envelope};

use crate::{
    env::Environment,
    error::{DecryptError, EncryptError},
    key_store::KeyStore,
};

/// A successfully decrypted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// Message text
    pub message: String,
    /// Nick the sender put inside the ciphertext
    pub nick: String,
    /// Seconds between the sender's timestamp and the local clock
    pub age_secs: u64,
    /// Key version the sender used
    pub version: KeyVersion,
}

/// Encrypts and decrypts chat lines using the keys it owns.
///
/// Dropping the handle (or calling [`Self::shutdown`]) clears every key.
#[derive(Debug)]
pub struct IdeaCrypt<E: Environment> {
    env: E,
    keys: KeyStore,
    version: KeyVersion,
}

impl<E: Environment> IdeaCrypt<E> {
    /// Handle with an empty key store, encrypting with the newest version.
    pub fn new(env: E) -> Self {
        Self::with_version(env, KeyVersion::LATEST)
    }

    /// Handle with an empty key store, encrypting with `version`.
    pub fn with_version(env: E, version: KeyVersion) -> Self {
        Self { env, keys: KeyStore::new(), version }
    }

    /// Key tables.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Mutable key tables.
    pub fn keys_mut(&mut self) -> &mut KeyStore {
        &mut self.keys
    }

    /// Environment this handle draws time and randomness from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Version used for outgoing messages.
    pub fn key_version(&self) -> KeyVersion {
        self.version
    }

    /// Switch the outgoing version, returning the previous one.
    ///
    /// Incoming messages are always decrypted with the version they declare.
    pub fn set_key_version(&mut self, version: KeyVersion) -> KeyVersion {
        let previous = std::mem::replace(&mut self.version, version);
        if previous != version {
            tracing::info!(%previous, current = %version, "key expansion version changed");
        }
        previous
    }

    /// Encrypt `message` from `nick` with an explicit passphrase.
    ///
    /// # Errors
    ///
    /// [`EncryptError::Protocol`] if the nick or message contains the payload
    /// separator.
    pub fn encrypt_message(&self, passphrase: &str, nick: &str, message: &str) -> Result<String, EncryptError> {
        let payload = InnerPayload::new(nick, self.env.wall_clock_secs(), message).pack()?;

        let material = self.version.expand(passphrase);
        let fingerprint = derivation::fingerprint(&material);
        let ciphertext = encrypt_buffer(&material, &payload, self.env.padding());

        Ok(Envelope::new(self.version.number(), &fingerprint, &ciphertext).to_string())
    }

    /// Encrypt `message` with the default key of `address`.
    ///
    /// # Errors
    ///
    /// - [`EncryptError::NoKey`] if `address` has no default key
    /// - [`EncryptError::Protocol`] as for [`Self::encrypt_message`]
    pub fn encrypt_message_to(&self, address: &str, nick: &str, message: &str) -> Result<String, EncryptError> {
        let passphrase = self
            .keys
            .lookup_default_key(address)
            .ok_or_else(|| EncryptError::NoKey { address: address.to_string() })?;
        self.encrypt_message(passphrase, nick, message)
    }

    /// Decrypt an envelope line with the known keys.
    ///
    /// # Errors
    ///
    /// One [`DecryptError`] per pipeline stage, checked in order: format,
    /// algorithm, version, key, cipher, contents.
    pub fn decrypt_message(&self, line: &str) -> Result<DecryptedMessage, DecryptError> {
        let envelope = Envelope::parse(line).ok_or(DecryptError::InvalidFormat)?;

        if !envelope.is_supported_algorithm() {
            tracing::debug!(algorithm = envelope.algorithm, "unsupported algorithm");
            return Err(DecryptError::UnknownAlgorithm);
        }

        let version = match (KeyVersion::from_number(envelope.version_major), envelope.version_minor) {
            (Some(version), 0) => version,
            _ => {
                tracing::debug!(
                    major = envelope.version_major,
                    minor = envelope.version_minor,
                    "unsupported version"
                );
                return Err(DecryptError::UnknownVersion);
            },
        };

        let passphrase = self.keys.lookup_known_key(envelope.fingerprint).ok_or_else(|| {
            tracing::debug!(fingerprint = envelope.fingerprint, "no key for fingerprint");
            DecryptError::UnknownKey
        })?;

        let material = version.expand(passphrase);
        let plaintext = decrypt_buffer(&material, envelope.payload).map_err(|err| {
            tracing::warn!(fingerprint = envelope.fingerprint, error = %err, "decryption failed");
            DecryptError::DecryptionFailed
        })?;

        let payload = InnerPayload::unpack(&plaintext).map_err(|err| {
            tracing::warn!(error = %err, "malformed payload");
            DecryptError::InvalidContents
        })?;

        Ok(DecryptedMessage {
            age_secs: payload.age_at(self.env.wall_clock_secs()),
            message: payload.message,
            nick: payload.nick,
            version,
        })
    }

    /// Whether `line` looks like an IDEA envelope.
    pub fn is_envelope(&self, line: &str) -> bool {
        is_envelope(line)
    }

    /// Clear every key. The handle stays usable.
    pub fn shutdown(&mut self) {
        self.keys.delete_all_keys();
        tracing::info!("cleared all keys");
    }
}
