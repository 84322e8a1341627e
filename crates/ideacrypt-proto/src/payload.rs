//! Inner payload
//!
//! The plaintext that gets encrypted: `nick 0x01 timestamp 0x01 message`,
//! where the timestamp is the sender's Unix time in lowercase hex (at least
//! 8 digits). The separator is not escaped, so it may not appear in the nick
//! or the message.

use crate::error::ProtocolError;

/// Field separator.
pub const FIELD_SEPARATOR: u8 = 0x01;

/// Decoded inner payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerPayload {
    /// Sender's nick as claimed by the sender (unauthenticated)
    pub nick: String,
    /// Sender's Unix time in seconds
    pub timestamp: u64,
    /// Message text
    pub message: String,
}

impl InnerPayload {
    /// Create a payload.
    pub fn new(nick: impl Into<String>, timestamp: u64, message: impl Into<String>) -> Self {
        Self { nick: nick.into(), timestamp, message: message.into() }
    }

    /// Serialize for encryption.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::SeparatorInField`] if the nick or message contains
    /// the separator byte.
    pub fn pack(&self) -> Result<Vec<u8>, ProtocolError> {
        check_field("nick", &self.nick)?;
        check_field("message", &self.message)?;

        let sep = char::from(FIELD_SEPARATOR);
        Ok(format!("{}{sep}{:08x}{sep}{}", self.nick, self.timestamp, self.message).into_bytes())
    }

    /// Parse decrypted bytes.
    ///
    /// Invalid UTF-8 in the nick or message is replaced rather than rejected,
    /// since the checksum already proved the bytes are what the sender sent.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::InvalidFieldCount`] unless there are exactly three fields
    /// - [`ProtocolError::InvalidTimestamp`] if the timestamp is not hex
    pub fn unpack(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let fields: Vec<&[u8]> = bytes.split(|&b| b == FIELD_SEPARATOR).collect();
        let [nick, timestamp, message] = fields.as_slice() else {
            return Err(ProtocolError::InvalidFieldCount { count: fields.len() });
        };

        let timestamp = parse_timestamp(timestamp)?;

        Ok(Self {
            nick: String::from_utf8_lossy(nick).into_owned(),
            timestamp,
            message: String::from_utf8_lossy(message).into_owned(),
        })
    }

    /// Distance in seconds between the sender's clock and `now`.
    ///
    /// Advisory only. Never negative, whichever clock is ahead.
    pub fn age_at(&self, now: u64) -> u64 {
        now.abs_diff(self.timestamp)
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), ProtocolError> {
    if value.as_bytes().contains(&FIELD_SEPARATOR) {
        return Err(ProtocolError::SeparatorInField { field });
    }
    Ok(())
}

fn parse_timestamp(raw: &[u8]) -> Result<u64, ProtocolError> {
    let invalid = || ProtocolError::InvalidTimestamp { value: String::from_utf8_lossy(raw).into_owned() };

    // from_str_radix would accept a leading '+'
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }
    let text = std::str::from_utf8(raw).map_err(|_| invalid())?;
    u64::from_str_radix(text, 16).map_err(|_| invalid())
}
