//! Environment abstraction for deterministic testing.
//!
//! Decouples message encryption from system resources (wall clock,
//! randomness). Tests inject fixed clocks and seeded RNGs so envelopes are
//! reproducible byte for byte.

use ideacrypt_crypto::PAD_MAX;

/// Abstract environment providing time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Seconds since the Unix epoch.
    ///
    /// Stamped into every outgoing payload and compared against incoming
    /// ones. Not required to be monotonic.
    fn wall_clock_secs(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Random filler for one message's padding.
    fn padding(&self) -> [u8; PAD_MAX] {
        let mut bytes = [0u8; PAD_MAX];
        self.random_bytes(&mut bytes);
        bytes
    }
}
