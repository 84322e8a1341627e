//! Plugin events and actions.

use ideacrypt_core::KeyVersion;

/// Whether a message target is a channel or a single nick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Channel (`#rust`, `&local`, ...)
    Channel,
    /// Single user
    Nick,
}

impl TargetKind {
    /// Classify a target name by its IRC channel prefix.
    pub fn of(name: &str) -> Self {
        match name.as_bytes().first() {
            Some(b'#' | b'&' | b'+' | b'!') => Self::Channel,
            _ => Self::Nick,
        }
    }
}

/// A message target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Channel or nick name
    pub name: String,
    /// Channel or nick
    pub kind: TargetKind,
}

impl Target {
    /// Target classified from its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = TargetKind::of(&name);
        Self { name, kind }
    }
}

/// Connection the event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContext {
    /// Host's identifier for the connection
    pub tag: String,
    /// Our nick on this connection
    pub own_nick: String,
    /// Whether the connection is registered
    pub connected: bool,
}

/// Where a user command was typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// Connection of the active window, if any
    pub server: Option<ServerContext>,
    /// Channel or query of the active window, if any
    pub active: Option<Target>,
}

/// Events the host feeds into the plugin.
///
/// The host is responsible for:
/// - Forwarding every inbound public and private message before display
/// - Routing its outgoing message primitive through the plugin
/// - Forwarding its own-message echo and user commands
#[derive(Debug, Clone)]
pub enum PluginEvent {
    /// Message arrived from the network.
    MessageReceived {
        /// Connection tag
        server: String,
        /// Raw message text
        text: String,
        /// Sender nick, `None` for server-originated messages
        nick: Option<String>,
        /// Sender `user@host`
        address: Option<String>,
        /// Channel, or our nick for private messages
        target: String,
        /// Public or private message
        kind: TargetKind,
    },

    /// Host wants to send a message.
    SendMessage {
        /// Connection the message goes out on
        server: ServerContext,
        /// Recipient
        target: Target,
        /// Plaintext
        text: String,
    },

    /// Host is about to display our own outgoing message.
    OwnMessage {
        /// Connection tag
        server: String,
        /// Recipient name
        target: String,
        /// Plaintext
        text: String,
    },

    /// User typed a command.
    Command {
        /// Full input line, including the leading `/`
        line: String,
        /// Window the command was typed in
        context: CommandContext,
    },
}

/// Actions the plugin produces for the host to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginAction {
    /// Let the event continue through the host unchanged.
    PassThrough,

    /// Send text with the host's original send primitive.
    SendRaw {
        /// Connection tag
        server: String,
        /// Recipient
        target: Target,
        /// Wire text (an envelope, or plaintext when not encrypting)
        text: String,
    },

    /// Display a decrypted inbound message in place of the raw line.
    DeliverDecrypted {
        /// Connection tag
        server: String,
        /// Decrypted text
        message: String,
        /// Sender nick from the transport (not the one inside the payload)
        nick: String,
        /// Sender `user@host`
        address: Option<String>,
        /// Channel, or our nick for private messages
        target: String,
        /// Public or private message
        kind: TargetKind,
        /// Seconds between sender clock and ours
        age_secs: u64,
        /// Key version the sender used
        version: KeyVersion,
        /// Render with the encrypted-message formats
        formatted: bool,
    },

    /// Display our own outgoing message.
    EchoOwn {
        /// Connection tag
        server: String,
        /// Recipient
        target: Target,
        /// Plaintext
        text: String,
        /// Render with the encrypted-message formats
        formatted: bool,
    },

    /// Show a client notice.
    Notice(String),
}
