//! Admin bang commands: !sync_commands

/// Reply after a successful sync
pub fn sync_success(command_count: usize, guild_name: &str) -> String {
    format!("✅ Synced {} commands to {}", command_count, guild_name)
}

/// Reply after a failed sync
pub fn sync_failure(error: &impl std::fmt::Display) -> String {
    format!("❌ Failed to sync commands: {}", error)
}

/// Reply when the command is used outside a server
pub fn guild_only() -> String {
    "❌ Commands can only be synced inside a server.".to_string()
}
