//! Client
//!
//! Chat client integration for IDEA-encrypted messages: inbound decryption,
//! outbound autocrypt, and the `/key`, `/idea` and `/ideam` commands.
//!
//! # Architecture
//!
//! The plugin follows the same Sans-IO, action-based pattern as
//! [`ideacrypt_core`]. The host feeds it events ([`PluginEvent`]) from its
//! message signals and command line, and executes the actions
//! ([`PluginAction`]) it returns: send this text, show this message, show this
//! notice, or let the original event through.
//!
//! # Components
//!
//! - [`Plugin`]: State machine owning the keyring
//! - [`Command`]: Parsed user commands
//! - [`SystemEnv`]: Production clock and RNG

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod commands;
mod error;
mod event;
mod plugin;
mod system_env;

pub use commands::{Command, DropScope};
pub use error::CommandError;
pub use event::{CommandContext, PluginAction, PluginEvent, ServerContext, Target, TargetKind};
pub use ideacrypt_core::{CryptoConfig, Environment, KeyVersion};
pub use plugin::{LOAD_NOTICE, Plugin, SERVER_NICK};
pub use system_env::SystemEnv;
