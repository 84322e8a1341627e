//! Fuzz target for the full message pipeline (pack → encrypt → envelope →
//! parse → lookup → decrypt → unpack)
//!
//! # Strategy
//!
//! - Valid messages: arbitrary nick and text under an arbitrary passphrase
//!   and key version
//! - Attacks: the wire line is truncated, bit-flipped or decrypted without
//!   the key
//!
//! # Invariants
//!
//! - Messages without the field separator always round-trip
//! - Messages containing the separator are refused, never sent
//! - Mangled lines never panic and never decrypt to a different message

#![no_main]

use arbitrary::Arbitrary;
use ideacrypt_core::{Environment, IdeaCrypt, KeyVersion};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    passphrase: String,
    nick: String,
    message: String,
    version: u8,
    now: u32,
    padding: [u8; 8],
    attack: Attack,
}

#[derive(Debug, Clone, Arbitrary)]
enum Attack {
    None,
    Truncate(u16),
    FlipByte { index: u16, mask: u8 },
    WrongKey(String),
}

#[derive(Clone)]
struct FuzzEnv {
    now: u64,
    padding: [u8; 8],
}

impl Environment for FuzzEnv {
    fn wall_clock_secs(&self) -> u64 {
        self.now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for (byte, pad) in buffer.iter_mut().zip(self.padding.iter().cycle()) {
            *byte = *pad;
        }
    }
}

fuzz_target!(|scenario: Scenario| {
    let version = KeyVersion::ALL[usize::from(scenario.version) % KeyVersion::ALL.len()];
    let env = FuzzEnv { now: u64::from(scenario.now), padding: scenario.padding };
    let mut crypt = IdeaCrypt::with_version(env, version);

    let line = match crypt.encrypt_message(&scenario.passphrase, &scenario.nick, &scenario.message) {
        Ok(line) => line,
        Err(_) => {
            assert!(scenario.nick.contains('\x01') || scenario.message.contains('\x01'));
            return;
        },
    };

    match scenario.attack {
        Attack::None => {
            crypt.keys_mut().add_known_key(&scenario.passphrase);
            let decrypted = crypt.decrypt_message(&line).expect("own message must decrypt");
            assert_eq!(decrypted.message, scenario.message);
            assert_eq!(decrypted.nick, scenario.nick);
            assert_eq!(decrypted.version, version);
            assert_eq!(decrypted.age_secs, 0);
        },
        Attack::Truncate(at) => {
            crypt.keys_mut().add_known_key(&scenario.passphrase);
            let cut = usize::from(at) % line.len();
            if let Some(prefix) = line.get(..cut) {
                if let Ok(decrypted) = crypt.decrypt_message(prefix) {
                    assert_eq!(decrypted.message, scenario.message);
                }
            }
        },
        Attack::FlipByte { index, mask } => {
            crypt.keys_mut().add_known_key(&scenario.passphrase);
            let mut bytes = line.into_bytes();
            let index = usize::from(index) % bytes.len();
            bytes[index] ^= mask;
            if let Ok(mangled) = String::from_utf8(bytes) {
                let _ = crypt.decrypt_message(&mangled);
            }
        },
        Attack::WrongKey(other) => {
            if other != scenario.passphrase {
                crypt.keys_mut().add_known_key(&other);
                let _ = crypt.decrypt_message(&line);
            }
        },
    }
});
