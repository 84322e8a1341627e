//! Fuzz target for decrypt_buffer
//!
//! Feeds arbitrary base64-ish text through the CBC decryption path with a
//! fixed key.
//!
//! # Invariants
//!
//! - Never panics: bad base64, short or misaligned input and checksum
//!   failures are all errors
//! - Anything that decrypts re-encrypts to a ciphertext that decrypts to the
//!   same plaintext

#![no_main]

use ideacrypt_crypto::{KeyVersion, PAD_MAX, decrypt_buffer, encrypt_buffer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(ciphertext) = std::str::from_utf8(data) else {
        return;
    };

    let material = KeyVersion::V3.expand("fuzz");
    let Ok(plaintext) = decrypt_buffer(&material, ciphertext) else {
        return;
    };

    let again = encrypt_buffer(&material, &plaintext, [0x5a; PAD_MAX]);
    assert_eq!(decrypt_buffer(&material, &again).expect("re-encrypted buffer must decrypt"), plaintext);
});
