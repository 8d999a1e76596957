//! # Bang Commands (!)
//!
//! Text-based maintenance commands prefixed with an exclamation point.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Reduced to the owner-only `!sync_commands`
//! - 1.0.0: Initial implementation with info, quick, and admin commands

pub mod admin;

/// Represents a parsed bang command
#[derive(Debug, Clone)]
pub struct BangCommand {
    /// The command name (without the ! prefix)
    pub name: String,
}

impl BangCommand {
    /// Check if the command matches a given name (case-insensitive)
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Parse a bang command from input text
///
/// # Arguments
/// * `input` - The text after the `!` prefix
///
/// # Example
/// ```
/// use emoji_reactor::commands::bang::parse_bang_command;
///
/// let cmd = parse_bang_command("sync_commands now");
/// assert_eq!(cmd.name, "sync_commands");
/// ```
pub fn parse_bang_command(input: &str) -> BangCommand {
    // Anything after the name is ignored; no command takes arguments.
    let name = input.split_whitespace().next().unwrap_or("").to_string();

    BangCommand { name }
}

/// Parses a message as a bang command if it starts with `!`.
pub fn parse_message(content: &str) -> Option<BangCommand> {
    let rest = content.trim().strip_prefix('!')?;
    let command = parse_bang_command(rest);
    if command.name.is_empty() {
        None
    } else {
        Some(command)
    }
}

/// Owner-only: re-register application commands in the current guild
pub const SYNC_COMMANDS: &str = "sync_commands";

/// All available bang command names
pub const COMMANDS: &[&str] = &[SYNC_COMMANDS];

/// Check if a string is a valid bang command
pub fn is_valid_command(name: &str) -> bool {
    COMMANDS.iter().any(|&cmd| cmd.eq_ignore_ascii_case(name))
}
