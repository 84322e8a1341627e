//! Fuzz target for Envelope::parse
//!
//! # Invariants
//!
//! - Parsing never panics on arbitrary input
//! - A parsed envelope re-serializes to a line that parses to the same fields
//!   (minor version is normalized to 0)
//! - `is_envelope` agrees with `parse` plus the algorithm check

#![no_main]

use ideacrypt_proto::{Envelope, is_envelope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = Envelope::parse(line);
    assert_eq!(
        is_envelope(line),
        parsed.as_ref().is_some_and(Envelope::is_supported_algorithm)
    );

    let Some(envelope) = parsed else {
        return;
    };

    // Fields containing the separator cannot exist after a split
    assert!(!envelope.fingerprint.contains('|'));
    assert!(!envelope.payload.contains('|'));

    if envelope.is_supported_algorithm() {
        let rebuilt = Envelope::new(envelope.version_major, envelope.fingerprint, envelope.payload).to_string();
        let reparsed = Envelope::parse(&rebuilt).expect("rebuilt envelope must parse");
        assert_eq!(reparsed.version_major, envelope.version_major);
        assert_eq!(reparsed.version_minor, 0);
        assert_eq!(reparsed.fingerprint, envelope.fingerprint);
        assert_eq!(reparsed.payload, envelope.payload);
    }
});
