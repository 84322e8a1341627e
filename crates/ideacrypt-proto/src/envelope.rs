//! Wire envelope
//!
//! ```text
//! |*E*|IDEA|3.0|0d2c9061|kYhS8a+A1v1p3isAON7xDCru84u12TA4qtCRwG3dkKk=|
//!  ─┬─ ──┬─ ─┬─ ───┬──── ──────────────────┬─────────────────────────
//!   │    │   │     │                       └ base64 ciphertext
//!   │    │   │     └ key fingerprint (CRC-32 hex)
//!   │    │   └ major.minor (major selects key expansion)
//!   │    └ algorithm
//!   └ marker
//! ```
//!
//! Every inbound chat line is probed with [`Envelope::parse`], so parsing
//! borrows from the line and allocates nothing.

use std::fmt;

/// Literal marker in the second field.
pub const MARKER: &str = "*E*";

/// The only supported algorithm tag.
pub const ALGORITHM: &str = "IDEA";

/// Field delimiter.
const DELIMITER: char = '|';

/// Parsed wire envelope borrowing from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Algorithm tag (only [`ALGORITHM`] is decryptable)
    pub algorithm: &'a str,
    /// Major version, selects the key expansion scheme
    pub version_major: u32,
    /// Minor version, always `0` when emitted
    pub version_minor: u32,
    /// Public key fingerprint
    pub fingerprint: &'a str,
    /// Base64 ciphertext
    pub payload: &'a str,
}

impl<'a> Envelope<'a> {
    /// Envelope for IDEA ciphertext at `version_major.0`.
    pub fn new(version_major: u32, fingerprint: &'a str, payload: &'a str) -> Self {
        Self { algorithm: ALGORITHM, version_major, version_minor: 0, fingerprint, payload }
    }

    /// Parse a chat line.
    ///
    /// Returns `None` unless the line splits on `|` into exactly six fields
    /// (one trailing delimiter is tolerated), the first field is empty, the
    /// second is [`MARKER`] and the version field contains a `.`.
    ///
    /// Version numbers are parsed leniently: leading decimal digits, anything
    /// else counts as `0`. The algorithm is not checked here so callers can
    /// report an unknown algorithm separately from a malformed line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let body = line.strip_suffix(DELIMITER).unwrap_or(line);

        let mut fields = body.split(DELIMITER);
        let leading = fields.next()?;
        let marker = fields.next()?;
        let algorithm = fields.next()?;
        let version = fields.next()?;
        let fingerprint = fields.next()?;
        let payload = fields.next()?;
        if fields.next().is_some() {
            return None;
        }

        if !leading.is_empty() || marker != MARKER {
            return None;
        }

        let (major, minor) = version.split_once('.')?;

        Some(Self {
            algorithm,
            version_major: leading_number(major),
            version_minor: leading_number(minor),
            fingerprint,
            payload,
        })
    }

    /// Whether the algorithm tag is the supported one.
    pub fn is_supported_algorithm(&self) -> bool {
        self.algorithm == ALGORITHM
    }
}

impl fmt::Display for Envelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{MARKER}|{}|{}.{}|{}|{}|",
            self.algorithm, self.version_major, self.version_minor, self.fingerprint, self.payload
        )
    }
}

/// Fast detector for IDEA envelopes.
///
/// True when [`Envelope::parse`] succeeds and the algorithm is [`ALGORITHM`].
pub fn is_envelope(line: &str) -> bool {
    Envelope::parse(line).is_some_and(|envelope| envelope.is_supported_algorithm())
}

/// Leading decimal digits of `field`, `0` if there are none.
///
/// Saturates instead of wrapping on overflow.
fn leading_number(field: &str) -> u32 {
    field
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| acc.saturating_mul(10).saturating_add(u32::from(digit - b'0')))
}
