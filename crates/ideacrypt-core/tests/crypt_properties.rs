//! Property-based tests for the message encryption handle
//!
//! Uses a seeded RNG environment so every failing case replays exactly.

use std::sync::{Arc, Mutex};

use ideacrypt_core::{DecryptError, Environment, IdeaCrypt, KeyVersion};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Deterministic environment: fixed clock, seeded padding.
#[derive(Clone)]
struct SeededEnv {
    now: u64,
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SeededEnv {
    fn new(seed: u64, now: u64) -> Self {
        Self { now, rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
    }
}

impl Environment for SeededEnv {
    fn wall_clock_secs(&self) -> u64 {
        self.now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap().fill_bytes(buffer);
    }
}

fn arbitrary_version() -> impl Strategy<Value = KeyVersion> {
    prop_oneof![Just(KeyVersion::V1), Just(KeyVersion::V2), Just(KeyVersion::V3)]
}

/// Text that can be packed (no 0x01 separator)
fn packable() -> impl Strategy<Value = String> {
    "[^\u{1}]{0,100}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn roundtrip_any_message(
        seed in any::<u64>(),
        version in arbitrary_version(),
        passphrase in ".{0,40}",
        nick in packable(),
        message in packable(),
    ) {
        let mut crypt = IdeaCrypt::with_version(SeededEnv::new(seed, 1_700_000_000), version);
        crypt.keys_mut().add_known_key(&passphrase);

        let line = crypt.encrypt_message(&passphrase, &nick, &message).unwrap();
        prop_assert!(crypt.is_envelope(&line));

        let decrypted = crypt.decrypt_message(&line).unwrap();
        prop_assert_eq!(decrypted.message, message);
        prop_assert_eq!(decrypted.nick, nick);
        prop_assert_eq!(decrypted.age_secs, 0);
        prop_assert_eq!(decrypted.version, version);
    }

    #[test]
    fn age_is_clock_distance(sent in 0u64..u64::from(u32::MAX), skew in 0u64..100_000, ahead in any::<bool>()) {
        let sender = IdeaCrypt::new(SeededEnv::new(1, sent));
        let line = sender.encrypt_message("shared", "bob", "ping").unwrap();

        let now = if ahead { sent + skew } else { sent.saturating_sub(skew) };
        let mut receiver = IdeaCrypt::new(SeededEnv::new(2, now));
        receiver.keys_mut().add_known_key("shared");

        prop_assert_eq!(receiver.decrypt_message(&line).unwrap().age_secs, sent.abs_diff(now));
    }

    #[test]
    fn other_key_is_unknown(seed in any::<u64>(), a in "[a-z]{1,16}", b in "[A-Z]{1,16}") {
        let mut crypt = IdeaCrypt::new(SeededEnv::new(seed, 0));
        crypt.keys_mut().add_known_key(&b);

        let line = crypt.encrypt_message(&a, "n", "m").unwrap();
        prop_assert_eq!(crypt.decrypt_message(&line), Err(DecryptError::UnknownKey));
    }

    #[test]
    fn decrypt_never_panics(line in ".{0,200}") {
        let mut crypt = IdeaCrypt::new(SeededEnv::new(0, 0));
        crypt.keys_mut().add_known_key("k");
        let _ = crypt.decrypt_message(&line);
    }
}

#[test]
fn padding_differs_between_messages() {
    let crypt = IdeaCrypt::new(SeededEnv::new(42, 0));
    let first = crypt.encrypt_message("k", "n", "same").unwrap();
    let second = crypt.encrypt_message("k", "n", "same").unwrap();
    assert_ne!(first, second);
}
