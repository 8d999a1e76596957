use anyhow::Result;
use log::{info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::model::id::UserId;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::bang::{self, admin};
use crate::commands::slash::{CommandSync, GENERATE_EMOJI_REACTION};
use crate::message_components::MessageComponentHandler;
use crate::services::EmojiServices;
use crate::sessions::TargetMessage;

#[derive(Clone)]
pub struct CommandHandler {
    services: Arc<EmojiServices>,
    command_sync: Arc<CommandSync>,
}

impl CommandHandler {
    pub fn new(services: Arc<EmojiServices>, command_sync: Arc<CommandSync>) -> Self {
        CommandHandler {
            services,
            command_sync,
        }
    }

    pub fn command_sync(&self) -> &CommandSync {
        &self.command_sync
    }

    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let command = match bang::parse_message(&msg.content) {
            Some(command) => command,
            None => return Ok(()),
        };
        if !bang::is_valid_command(&command.name) {
            return Ok(());
        }

        info!("Processing command: !{} from user: {}", command.name, msg.author.id);

        if command.is(bang::SYNC_COMMANDS) {
            self.handle_sync_commands(ctx, msg).await?;
        }

        Ok(())
    }

    pub async fn handle_application_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        info!(
            "Processing application command: {} from user: {}",
            command.data.name, command.user.id
        );

        match command.data.name.as_str() {
            GENERATE_EMOJI_REACTION => {
                self.handle_generate_emoji_reaction(ctx, command).await?;
            }
            _ => {
                reply_ephemeral(ctx, command, "Unknown command.").await?;
            }
        }

        Ok(())
    }

    /// Opens the emoji menu for the right-clicked message
    async fn handle_generate_emoji_reaction(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let guild_id = match command.guild_id {
            Some(guild_id) => guild_id,
            None => {
                return reply_ephemeral(ctx, command, "❌ Emoji reactions only work inside a server.")
                    .await
            }
        };

        let message_id = command
            .data
            .target_id
            .map(|target| target.to_message_id())
            .ok_or_else(|| anyhow::anyhow!("Context menu invoked without a target message"))?;

        let session_id = self.services.sessions.open(TargetMessage {
            guild_id: guild_id.0,
            channel_id: command.channel_id.0,
            message_id: message_id.0,
        });

        command
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .add_embed(MessageComponentHandler::create_choice_embed())
                            .set_components(MessageComponentHandler::create_choice_buttons(
                                &session_id,
                            ))
                            .ephemeral(true)
                    })
            })
            .await?;
        Ok(())
    }

    /// `!sync_commands`: owner-only resync of this guild's commands
    async fn handle_sync_commands(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if !is_owner(ctx, msg.author.id).await? {
            warn!("Ignoring !{} from non-owner {}", bang::SYNC_COMMANDS, msg.author.id);
            return Ok(());
        }

        let guild_id = match msg.guild_id {
            Some(guild_id) => guild_id,
            None => {
                msg.channel_id.say(&ctx.http, admin::guild_only()).await?;
                return Ok(());
            }
        };

        let reply = match self.command_sync.sync(ctx, guild_id).await {
            Ok(synced) => {
                let guild_name = guild_id
                    .name(&ctx.cache)
                    .unwrap_or_else(|| guild_id.to_string());
                admin::sync_success(synced.len(), &guild_name)
            }
            Err(e) => admin::sync_failure(&e),
        };

        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }
}

/// Checks the application owner, or any member of the owning team
async fn is_owner(ctx: &Context, user_id: UserId) -> Result<bool> {
    let info = ctx.http.get_current_application_info().await?;

    if info.owner.id == user_id {
        return Ok(true);
    }
    Ok(info
        .team
        .map(|team| team.members.iter().any(|member| member.user.id == user_id))
        .unwrap_or(false))
}

async fn reply_ephemeral(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}
