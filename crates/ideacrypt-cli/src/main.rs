//! ideacrypt command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Fingerprints of a passphrase under every key version
//! ideacrypt fingerprint hunter2
//!
//! # Encrypt a line for a channel sharing the passphrase
//! ideacrypt encrypt --key hunter2 --nick alice "hello"
//!
//! # Decrypt a single wire line
//! ideacrypt decrypt --key hunter2 '|*E*|IDEA|3.0|0d2c9061|...|'
//!
//! # Decrypt envelopes in a log, passing plain lines through
//! ideacrypt filter --key hunter2 --key other < channel.log
//! ```

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use ideacrypt_client::SystemEnv;
use ideacrypt_core::{
    ConfigError, CryptoConfig, DecryptError, DecryptedMessage, EncryptError, Environment,
    IdeaCrypt, KeyVersion,
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// IDEA chat message encryption tools
#[derive(Parser, Debug)]
#[command(name = "ideacrypt")]
#[command(about = "IDEA chat message encryption tools")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// TOML configuration file
    #[arg(short, long, env = "IDEACRYPT_CONFIG")]
    config: Option<PathBuf>,

    /// Key expansion version for encryption (overrides the config file)
    #[arg(long, env = "IDEACRYPT_KEY_VERSION")]
    key_version: Option<u32>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Action {
    /// Print the fingerprint of each passphrase under every key version
    Fingerprint {
        /// Passphrases
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Encrypt a message into a wire line
    Encrypt {
        /// Passphrase
        #[arg(short, long, env = "IDEACRYPT_KEY")]
        key: String,

        /// Sender nick embedded in the ciphertext
        #[arg(short, long, env = "IDEACRYPT_NICK")]
        nick: String,

        /// Message text
        message: String,
    },

    /// Decrypt a single wire line
    Decrypt {
        /// Known passphrase (repeatable)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,

        /// Wire line
        line: String,
    },

    /// Decrypt envelopes in stdin line by line, passing other lines through
    Filter {
        /// Known passphrase (repeatable)
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,
    },
}

/// Why the tool exited unsuccessfully.
#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("encryption failed: {0}")]
    Encrypt(#[from] EncryptError),

    #[error("decryption error: {0}")]
    Decrypt(#[from] DecryptError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the decrypted stream
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let version = resolve_version(&args)?;
    tracing::debug!(%version, "using key version");

    let crypt = IdeaCrypt::with_version(SystemEnv::new(), version);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(crypt, args.command, &mut stdin.lock(), &mut stdout.lock())?;

    Ok(())
}

/// Key version from `--key-version`, else the config file, else the default.
fn resolve_version(args: &Args) -> Result<KeyVersion, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|source| CliError::ReadConfig { path: path.clone(), source })?;
            CryptoConfig::from_toml(&source)?
        },
        None => CryptoConfig::default(),
    };

    if let Some(version) = args.key_version {
        config.key_version = version;
    }
    Ok(config.key_version()?)
}

fn run<E: Environment>(
    mut crypt: IdeaCrypt<E>,
    action: Action,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        Action::Fingerprint { keys } => {
            for key in &keys {
                let fingerprints: Vec<String> = KeyVersion::ALL
                    .iter()
                    .map(|version| format!("v{version}:{}", version.fingerprint(key)))
                    .collect();
                writeln!(output, "{key}\t{}", fingerprints.join(" "))?;
            }
        },
        Action::Encrypt { key, nick, message } => {
            let line = crypt.encrypt_message(&key, &nick, &message)?;
            writeln!(output, "{line}")?;
        },
        Action::Decrypt { keys, line } => {
            register(&mut crypt, &keys);
            let decrypted = crypt.decrypt_message(&line)?;
            writeln!(output, "{}", render(&decrypted))?;
        },
        Action::Filter { keys } => {
            register(&mut crypt, &keys);
            filter(&crypt, input, output)?;
        },
    }
    Ok(())
}

fn register<E: Environment>(crypt: &mut IdeaCrypt<E>, keys: &[String]) {
    for key in keys {
        crypt.keys_mut().add_known_key(key);
    }
    tracing::debug!(count = crypt.keys().known_key_count(), "registered known keys");
}

fn filter<E: Environment>(
    crypt: &IdeaCrypt<E>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let mut decrypted = 0usize;
    let mut failed = 0usize;

    for line in input.lines() {
        let line = line?;
        let Some(start) = line.find("|*E*|") else {
            writeln!(output, "{line}")?;
            continue;
        };

        // Log prefixes (timestamps, nicks) are kept in front of the decrypted text
        let (prefix, wire) = line.split_at(start);
        match crypt.decrypt_message(wire) {
            Ok(message) => {
                decrypted += 1;
                writeln!(output, "{prefix}{}", render(&message))?;
            },
            Err(err) => {
                failed += 1;
                writeln!(output, "{prefix}Decryption error: {err}")?;
            },
        }
    }

    tracing::info!(decrypted, failed, "filter finished");
    Ok(())
}

fn render(message: &DecryptedMessage) -> String {
    format!("<{}> {} (v{}, {}s)", message.nick, message.message, message.version, message.age_secs)
}
