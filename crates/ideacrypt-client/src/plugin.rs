//! Chat client plugin state machine.
//!
//! Sits between the host's message signals and its send primitive:
//!
//! - Inbound lines carrying an IDEA envelope are decrypted before display
//! - Outbound messages to a target with a default key are encrypted when
//!   autocrypt is on
//! - `/key`, `/idea` and `/ideam` manage keys and send explicitly
//!
//! Every event yields a list of [`PluginAction`]s. Failures become notices,
//! never panics, and plaintext is never sent when encryption was requested
//! but failed.

use ideacrypt_core::{ConfigError, CryptoConfig, EncryptError, Environment, IdeaCrypt};
use ideacrypt_proto::{ALGORITHM, MARKER};

use crate::{
    commands::{Command, DropScope},
    error::CommandError,
    event::{CommandContext, PluginAction, PluginEvent, ServerContext, Target, TargetKind},
};

/// Notice shown when the plugin is loaded.
pub const LOAD_NOTICE: &str = "IDEA-encryption plugin loaded. Messages will be encrypted whenever \
                               possible if autocrypt is set, alternatively you can use /idea and \
                               /ideam. Modify your keyring with /key in advance.";

/// Nick reported for messages without a sender.
pub const SERVER_NICK: &str = "!server!";

/// Plugin state.
///
/// # Invariants
///
/// - `pending_echo` is only set by an autocrypted send and is consumed by
///   the next own-message event
#[derive(Debug)]
pub struct Plugin<E: Environment> {
    crypt: IdeaCrypt<E>,
    autocrypt: bool,
    echo_formats: bool,

    /// Next own-message echo is for a message that went out encrypted.
    pending_echo: bool,
}

impl<E: Environment> Plugin<E> {
    /// Load the plugin with an empty keyring.
    ///
    /// Returns the plugin and the load notice.
    pub fn load(env: E, config: &CryptoConfig) -> Result<(Self, Vec<PluginAction>), ConfigError> {
        let version = config.key_version()?;
        tracing::info!(%version, autocrypt = config.autocrypt, "IDEA plugin loaded");

        let plugin = Self {
            crypt: IdeaCrypt::with_version(env, version),
            autocrypt: config.autocrypt,
            echo_formats: config.echo_formats,
            pending_echo: false,
        };
        Ok((plugin, vec![PluginAction::Notice(LOAD_NOTICE.to_string())]))
    }

    /// Unload the plugin, forgetting every key.
    pub fn unload(&mut self) {
        self.pending_echo = false;
        self.crypt.shutdown();
        tracing::info!("IDEA plugin unloaded");
    }

    /// Encryption handle and keyring.
    pub fn crypt(&self) -> &IdeaCrypt<E> {
        &self.crypt
    }

    /// Mutable encryption handle and keyring.
    pub fn crypt_mut(&mut self) -> &mut IdeaCrypt<E> {
        &mut self.crypt
    }

    /// Whether outgoing messages are encrypted automatically.
    pub fn autocrypt(&self) -> bool {
        self.autocrypt
    }

    /// Turn automatic encryption on or off.
    pub fn set_autocrypt(&mut self, enabled: bool) {
        self.autocrypt = enabled;
    }

    /// Whether decrypted and own messages use the encrypted-message formats.
    pub fn echo_formats(&self) -> bool {
        self.echo_formats
    }

    /// Turn the encrypted-message formats on or off.
    pub fn set_echo_formats(&mut self, enabled: bool) {
        self.echo_formats = enabled;
    }

    /// Process an event.
    pub fn handle(&mut self, event: PluginEvent) -> Vec<PluginAction> {
        match event {
            PluginEvent::MessageReceived { server, text, nick, address, target, kind } => {
                self.handle_received(server, &text, nick, address, target, kind)
            },
            PluginEvent::SendMessage { server, target, text } => self.handle_send(&server, target, text),
            PluginEvent::OwnMessage { server, target, text } => self.handle_own_message(server, target, text),
            PluginEvent::Command { line, context } => {
                self.handle_command(&line, &context).unwrap_or_else(|err| {
                    tracing::debug!(%line, error = %err, "command rejected");
                    vec![PluginAction::Notice(err.to_string())]
                })
            },
        }
    }

    fn handle_received(
        &mut self,
        server: String,
        text: &str,
        nick: Option<String>,
        address: Option<String>,
        target: String,
        kind: TargetKind,
    ) -> Vec<PluginAction> {
        if !is_idea_line(text) {
            return vec![PluginAction::PassThrough];
        }

        match self.crypt.decrypt_message(text) {
            Ok(decrypted) => vec![PluginAction::DeliverDecrypted {
                server,
                message: decrypted.message,
                nick: nick.unwrap_or_else(|| SERVER_NICK.to_string()),
                address,
                target,
                kind,
                age_secs: decrypted.age_secs,
                version: decrypted.version,
                formatted: self.echo_formats,
            }],
            Err(err) => vec![PluginAction::Notice(format!("Decryption error: {err}"))],
        }
    }

    fn handle_send(&mut self, server: &ServerContext, target: Target, text: String) -> Vec<PluginAction> {
        let has_key = self.crypt.keys().lookup_default_key(&target.name).is_some();
        if !self.autocrypt || !has_key {
            return vec![PluginAction::SendRaw { server: server.tag.clone(), target, text }];
        }

        match self.encrypt_to(server, &target, &text) {
            Ok(envelope) => {
                self.pending_echo = self.echo_formats;
                vec![PluginAction::SendRaw { server: server.tag.clone(), target, text: envelope }]
            },
            Err(notice) => vec![notice],
        }
    }

    fn handle_own_message(&mut self, server: String, target: String, text: String) -> Vec<PluginAction> {
        if !std::mem::take(&mut self.pending_echo) {
            return vec![PluginAction::PassThrough];
        }
        vec![PluginAction::EchoOwn { server, target: Target::new(target), text, formatted: true }]
    }

    fn handle_command(&mut self, line: &str, context: &CommandContext) -> Result<Vec<PluginAction>, CommandError> {
        let Some(command) = Command::parse(line)? else {
            return Ok(vec![PluginAction::PassThrough]);
        };

        let text = match command {
            Command::KeyAdd { known: true, key, .. } => {
                self.crypt.keys_mut().add_known_key(&key);
                format!("Added known key \"{key}\"")
            },
            Command::KeyAdd { known: false, target, key } => {
                let target = target.or_else(|| context.active.as_ref().map(|active| active.name.clone()));
                let Some(target) = target else {
                    return Ok(vec![notice("Please define channel/nick")]);
                };
                self.crypt.keys_mut().add_default_key(&target, Some(&key));
                format!("Added default key \"{key}\" for \"{target}\"")
            },
            Command::KeyDropAll { scope } => {
                let keys = self.crypt.keys_mut();
                let which = match scope {
                    DropScope::All => {
                        keys.delete_all_keys();
                        ""
                    },
                    DropScope::Known => {
                        keys.delete_all_known_keys();
                        " known"
                    },
                    DropScope::Default => {
                        keys.delete_all_default_keys();
                        " default"
                    },
                };
                format!("Dropped all{which} keys.")
            },
            Command::KeyDropKnown { key } => {
                self.crypt.keys_mut().delete_known_key(&key);
                format!("Dropped known key \"{key}\".")
            },
            Command::KeyDropDefault { target } => {
                self.crypt.keys_mut().delete_default_key(&target);
                format!("Dropped default key for \"{target}\".")
            },
            Command::Idea { message } => {
                let server = connected(context)?;
                let target = context.active.clone().ok_or(CommandError::NotJoined)?;
                return Ok(self.send_idea(server, target, message));
            },
            Command::IdeaTo { target, message } => {
                let server = connected(context)?;
                return Ok(self.send_idea(server, Target::new(target), message));
            },
        };

        Ok(vec![PluginAction::Notice(text)])
    }

    /// Explicit encrypted send: the message goes out encrypted or not at all.
    fn send_idea(&self, server: &ServerContext, target: Target, message: String) -> Vec<PluginAction> {
        match self.encrypt_to(server, &target, &message) {
            Ok(envelope) => vec![
                PluginAction::SendRaw { server: server.tag.clone(), target: target.clone(), text: envelope },
                PluginAction::EchoOwn {
                    server: server.tag.clone(),
                    target,
                    text: message,
                    formatted: self.echo_formats,
                },
            ],
            Err(notice) => vec![notice],
        }
    }

    fn encrypt_to(&self, server: &ServerContext, target: &Target, text: &str) -> Result<String, PluginAction> {
        self.crypt.encrypt_message_to(&target.name, &server.own_nick, text).map_err(|err| {
            tracing::warn!(target = %target.name, error = %err, "encryption failed");
            match err {
                EncryptError::NoKey { address } => {
                    notice(&format!("IDEA encryption failed! Perhaps no key set for \"{address}\"?"))
                },
                EncryptError::Protocol(err) => notice(&format!("IDEA encryption failed: {err}")),
            }
        })
    }
}

/// Whether an inbound line is addressed to this plugin.
fn is_idea_line(text: &str) -> bool {
    text.strip_prefix('|')
        .and_then(|rest| rest.strip_prefix(MARKER))
        .and_then(|rest| rest.strip_prefix('|'))
        .and_then(|rest| rest.strip_prefix(ALGORITHM))
        .is_some_and(|rest| rest.starts_with('|'))
}

fn connected(context: &CommandContext) -> Result<&ServerContext, CommandError> {
    context.server.as_ref().filter(|server| server.connected).ok_or(CommandError::NotConnected)
}

fn notice(text: &str) -> PluginAction {
    PluginAction::Notice(text.to_string())
}
