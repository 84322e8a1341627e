//! Command errors.
//!
//! Shown to the user verbatim as client notices, so messages are sentences
//! rather than lowercase diagnostics.

use thiserror::Error;

/// Why a command could not be run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Required argument missing
    #[error("Not enough parameters given")]
    NotEnoughParams,

    /// Command needs a connected server
    #[error("Not connected to server")]
    NotConnected,

    /// Command needs an active channel or query
    #[error("Not joined to any channel")]
    NotJoined,

    /// Unsupported `-option`
    #[error("Unknown option: {option}")]
    UnknownOption {
        /// Option name without the dash
        option: String,
    },

    /// Unsupported subcommand
    #[error("Unknown command: {name}")]
    UnknownCommand {
        /// Command as typed
        name: String,
    },

    /// Argument not accepted by the command
    #[error("Invalid argument: {value}")]
    InvalidArgument {
        /// Rejected argument
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(CommandError::NotEnoughParams.to_string(), "Not enough parameters given");
        assert_eq!(
            CommandError::InvalidArgument { value: "x".to_string() }.to_string(),
            "Invalid argument: x"
        );
        assert_eq!(
            CommandError::UnknownOption { option: "y".to_string() }.to_string(),
            "Unknown option: y"
        );
    }
}
