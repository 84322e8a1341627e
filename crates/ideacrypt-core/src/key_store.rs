//! Known and default key tables.
//!
//! Known keys are found by fingerprint when decrypting. Default keys are found
//! by target address (channel or nick) when encrypting. A passphrase is
//! registered under its fingerprint for every key version, so a peer may use
//! any version and still be understood.

use std::collections::HashMap;

use ideacrypt_crypto::KeyVersion;
use zeroize::Zeroizing;

/// In-memory key tables.
///
/// # Invariants
///
/// - Every default-key passphrase is also a known key under all versions
/// - At most one default key per address (compared ASCII case-insensitively)
/// - Passphrases are zeroized when removed or when the store is dropped
#[derive(Default)]
pub struct KeyStore {
    /// Fingerprint -> passphrase
    known: HashMap<String, Zeroizing<String>>,

    /// Lowercased address -> passphrase
    defaults: HashMap<String, Zeroizing<String>>,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `passphrase` under its fingerprint for every key version.
    ///
    /// Idempotent: an already registered fingerprint keeps its entry.
    pub fn add_known_key(&mut self, passphrase: &str) {
        for version in KeyVersion::ALL {
            let fingerprint = version.fingerprint(passphrase);
            if self.known.contains_key(&fingerprint) {
                continue;
            }
            tracing::debug!(%fingerprint, %version, "added known key");
            self.known.insert(fingerprint, Zeroizing::new(passphrase.to_string()));
        }
    }

    /// Passphrase registered under `fingerprint` (case-sensitive).
    pub fn lookup_known_key(&self, fingerprint: &str) -> Option<&str> {
        self.known.get(fingerprint).map(|passphrase| passphrase.as_str())
    }

    /// Remove every entry holding `passphrase`.
    ///
    /// Default keys using the passphrase are removed as well. Returns `false`
    /// if the passphrase was not known.
    pub fn delete_known_key(&mut self, passphrase: &str) -> bool {
        let before = self.known.len();
        self.known.retain(|_, stored| stored.as_str() != passphrase);
        let removed = before - self.known.len();
        if removed == 0 {
            return false;
        }

        self.defaults.retain(|address, stored| {
            let keep = stored.as_str() != passphrase;
            if !keep {
                tracing::debug!(%address, "dropped default key with its known key");
            }
            keep
        });

        tracing::debug!(entries = removed, "dropped known key");
        true
    }

    /// Remove all known keys.
    ///
    /// Default keys are removed too, since they would no longer decrypt.
    pub fn delete_all_known_keys(&mut self) {
        tracing::debug!(known = self.known.len(), defaults = self.defaults.len(), "dropped all known keys");
        self.known.clear();
        self.defaults.clear();
    }

    /// Set or clear the default key for `address`.
    ///
    /// `Some` replaces any previous default and registers the passphrase as a
    /// known key. `None` removes the default.
    pub fn add_default_key(&mut self, address: &str, passphrase: Option<&str>) {
        let Some(passphrase) = passphrase else {
            self.delete_default_key(address);
            return;
        };

        self.add_known_key(passphrase);
        tracing::debug!(%address, "set default key");
        self.defaults.insert(normalize(address), Zeroizing::new(passphrase.to_string()));
    }

    /// Default passphrase for `address` (case-insensitive).
    pub fn lookup_default_key(&self, address: &str) -> Option<&str> {
        self.defaults.get(&normalize(address)).map(|passphrase| passphrase.as_str())
    }

    /// Remove the default key for `address`.
    ///
    /// The passphrase stays known. Returns `false` if no default was set.
    pub fn delete_default_key(&mut self, address: &str) -> bool {
        let removed = self.defaults.remove(&normalize(address)).is_some();
        if removed {
            tracing::debug!(%address, "dropped default key");
        }
        removed
    }

    /// Remove all default keys, keeping the known keys.
    pub fn delete_all_default_keys(&mut self) {
        tracing::debug!(defaults = self.defaults.len(), "dropped all default keys");
        self.defaults.clear();
    }

    /// Remove everything.
    pub fn delete_all_keys(&mut self) {
        self.delete_all_known_keys();
    }

    /// Number of fingerprint entries.
    pub fn known_key_count(&self) -> usize {
        self.known.len()
    }

    /// Number of addresses with a default key.
    pub fn default_key_count(&self) -> usize {
        self.defaults.len()
    }

    /// Addresses with a default key, lowercased, in no particular order.
    pub fn default_targets(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }

    /// Whether the store holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.defaults.is_empty()
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("known", &self.known.len())
            .field("defaults", &self.defaults.len())
            .finish()
    }
}

fn normalize(address: &str) -> String {
    address.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_registered_for_every_version() {
        let mut store = KeyStore::new();
        store.add_known_key("hunter2");

        assert_eq!(store.known_key_count(), 3);
        assert_eq!(store.lookup_known_key("000d7c43"), Some("hunter2"));
        assert_eq!(store.lookup_known_key("f0dd9743"), Some("hunter2"));
        assert_eq!(store.lookup_known_key("0d2c9061"), Some("hunter2"));
    }

    #[test]
    fn add_known_key_is_idempotent() {
        let mut store = KeyStore::new();
        store.add_known_key("hunter2");
        store.add_known_key("hunter2");
        assert_eq!(store.known_key_count(), 3);
    }

    #[test]
    fn fingerprint_lookup_is_case_sensitive() {
        let mut store = KeyStore::new();
        store.add_known_key("hunter2");
        assert_eq!(store.lookup_known_key("0D2C9061"), None);
    }

    #[test]
    fn delete_known_key() {
        let mut store = KeyStore::new();
        store.add_known_key("hunter2");
        store.add_known_key("other");

        assert!(store.delete_known_key("hunter2"));
        assert_eq!(store.lookup_known_key("0d2c9061"), None);
        assert_eq!(store.known_key_count(), 3);
        assert!(!store.delete_known_key("hunter2"));
    }

    #[test]
    fn delete_known_key_cascades_to_defaults() {
        let mut store = KeyStore::new();
        store.add_default_key("#rust", Some("hunter2"));
        store.add_default_key("#go", Some("other"));

        assert!(store.delete_known_key("hunter2"));
        assert_eq!(store.lookup_default_key("#rust"), None);
        assert_eq!(store.lookup_default_key("#go"), Some("other"));
    }

    #[test]
    fn default_key_is_case_insensitive() {
        let mut store = KeyStore::new();
        store.add_default_key("#Rust", Some("hunter2"));

        assert_eq!(store.lookup_default_key("#rust"), Some("hunter2"));
        assert_eq!(store.lookup_default_key("#RUST"), Some("hunter2"));
        assert_eq!(store.default_targets().collect::<Vec<_>>(), vec!["#rust"]);
    }

    #[test]
    fn default_key_replaces_and_registers_known() {
        let mut store = KeyStore::new();
        store.add_default_key("alice", Some("first"));
        store.add_default_key("ALICE", Some("second"));

        assert_eq!(store.default_key_count(), 1);
        assert_eq!(store.lookup_default_key("alice"), Some("second"));
        assert_eq!(store.lookup_known_key(&KeyVersion::V3.fingerprint("first")), Some("first"));
        assert_eq!(store.lookup_known_key(&KeyVersion::V1.fingerprint("second")), Some("second"));
    }

    #[test]
    fn add_default_none_clears() {
        let mut store = KeyStore::new();
        store.add_default_key("alice", Some("secret"));
        store.add_default_key("alice", None);

        assert_eq!(store.lookup_default_key("alice"), None);
        assert_eq!(store.lookup_known_key(&KeyVersion::V3.fingerprint("secret")), Some("secret"));
    }

    #[test]
    fn delete_default_key() {
        let mut store = KeyStore::new();
        store.add_default_key("alice", Some("secret"));

        assert!(store.delete_default_key("Alice"));
        assert!(!store.delete_default_key("alice"));
        assert_eq!(store.known_key_count(), 3);
    }

    #[test]
    fn delete_all_variants() {
        let mut store = KeyStore::new();
        store.add_default_key("alice", Some("secret"));
        store.add_known_key("other");

        store.delete_all_default_keys();
        assert_eq!(store.default_key_count(), 0);
        assert_eq!(store.known_key_count(), 6);

        store.add_default_key("alice", Some("secret"));
        store.delete_all_known_keys();
        assert!(store.is_empty());

        store.add_default_key("bob", Some("x"));
        store.delete_all_keys();
        assert!(store.is_empty());
    }

    #[test]
    fn debug_hides_passphrases() {
        let mut store = KeyStore::new();
        store.add_default_key("alice", Some("topsecret"));
        let debug = format!("{store:?}");
        assert!(!debug.contains("topsecret"));
        assert_eq!(debug, "KeyStore { known: 3, defaults: 1 }");
    }
}
