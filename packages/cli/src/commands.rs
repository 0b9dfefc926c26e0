//! Command parsing and execution.
//!
//! Commands:
//! - `get <key>` - Print the JSON stored at key
//! - `set <key> <json>` - Store a JSON value at key
//! - `remove <key>` - Delete key (no-op if absent)
//! - `has <key>` - Exit 0 if key is present, 2 if not
//! - `list` - Print every key, one per line
//! - `clear` - Delete every key
//! - `refresh` - Reload the document and report how many keys it holds

use clap::Subcommand;

use mirrorstore::{json_to_value, value_to_json, BackendError, DurableBackend, Mirror, MirrorError};

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the value stored at a key as JSON
    Get { key: String },
    /// Store a JSON value at a key
    Set {
        key: String,
        /// Any JSON value; bare words that aren't JSON are stored as strings
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Delete a key
    #[command(alias = "rm")]
    Remove { key: String },
    /// Check whether a key is present
    Has { key: String },
    /// List all keys
    #[command(alias = "ls")]
    List,
    /// Delete every key
    Clear,
    /// Reload the document from disk
    Refresh,
}

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command succeeded, optionally with output to display
    Ok(Option<String>),
    /// The key the command asked about is absent
    Missing,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("could not determine a data directory; pass --file")]
    NoDataDir,

    #[error("could not create {}: {source}", .path.display())]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(input: &str) -> mirrorstore::Value {
    match serde_json::from_str::<serde_json::Value>(input) {
        Ok(json) => json_to_value(json),
        Err(_) => mirrorstore::Value::String(input.to_string()),
    }
}

/// Execute a command against a mirror
pub fn execute<B: DurableBackend>(
    command: Command,
    mirror: &mut Mirror<B>,
) -> Result<CommandResult, CliError> {
    tracing::debug!(?command, "executing");

    match command {
        Command::Get { key } => match mirror.get(&key) {
            Some(value) => {
                let json = value_to_json(value.clone())?;
                Ok(CommandResult::Ok(Some(json.to_string())))
            }
            None => Ok(CommandResult::Missing),
        },
        Command::Set { key, value } => {
            mirror.set(key, parse_value(&value))?;
            Ok(CommandResult::Ok(None))
        }
        Command::Remove { key } => {
            mirror.remove(&key)?;
            Ok(CommandResult::Ok(None))
        }
        Command::Has { key } => {
            if mirror.has_key(&key) {
                Ok(CommandResult::Ok(None))
            } else {
                Ok(CommandResult::Missing)
            }
        }
        Command::List => {
            let keys: Vec<&str> = mirror.keys().collect();
            if keys.is_empty() {
                Ok(CommandResult::Ok(None))
            } else {
                Ok(CommandResult::Ok(Some(keys.join("\n"))))
            }
        }
        Command::Clear => {
            mirror.clear()?;
            Ok(CommandResult::Ok(None))
        }
        Command::Refresh => {
            mirror.refresh()?;
            Ok(CommandResult::Ok(Some(format!("{} keys", mirror.len()))))
        }
    }
}
