//! # Application Commands
//!
//! Definitions and per-guild registration of the bot's application commands.
//! Registration replaces a guild's whole command list, which also clears
//! stale commands from earlier versions.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Emoji reaction context menu, per-guild sync tracking
//! - 1.0.0: Reorganized from monolithic slash_commands.rs

mod context_menu;

pub use context_menu::GENERATE_EMOJI_REACTION;

use anyhow::Result;
use dashmap::DashSet;
use log::{error, info};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

/// Creates all context menu commands
pub fn create_context_menu_commands() -> Vec<CreateApplicationCommand> {
    context_menu::create_commands()
}

/// Registers all commands for a specific guild, replacing whatever was there
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<Vec<Command>> {
    let context_commands = create_context_menu_commands();

    let synced = guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in context_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!(
        "✅ Commands synced to guild {}: {} commands",
        guild_id,
        synced.len()
    );
    for command in &synced {
        info!("  - {} ({:?})", command.name, command.kind);
    }
    Ok(synced)
}

/// Tracks which guilds already received the current command set.
#[derive(Debug, Default)]
pub struct CommandSync {
    synced_guilds: DashSet<u64>,
}

impl CommandSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self, guild_id: GuildId) -> bool {
        self.synced_guilds.contains(&guild_id.0)
    }

    /// Registers commands in `guild_id` unless that already happened this session.
    pub async fn sync_once(&self, ctx: &Context, guild_id: GuildId) {
        if self.is_synced(guild_id) {
            return;
        }
        // Failures are logged inside `sync`.
        let _ = self.sync(ctx, guild_id).await;
    }

    /// Registers commands in `guild_id` unconditionally.
    pub async fn sync(&self, ctx: &Context, guild_id: GuildId) -> Result<Vec<Command>> {
        info!("🔄 Replacing commands for guild {}...", guild_id);
        match register_guild_commands(ctx, guild_id).await {
            Ok(synced) => {
                self.synced_guilds.insert(guild_id.0);
                Ok(synced)
            }
            Err(e) => {
                error!("❌ Failed to sync commands to guild {}: {}", guild_id, e);
                Err(e)
            }
        }
    }

    pub fn synced_count(&self) -> usize {
        self.synced_guilds.len()
    }
}
