use anyhow::Result;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use emoji_reactor::commands::{CommandHandler, CommandSync, GENERATE_EMOJI_REACTION};
use emoji_reactor::config::Config;
use emoji_reactor::message_components::MessageComponentHandler;
use emoji_reactor::services::EmojiServices;

const GENERIC_ERROR: &str = "❌ An error occurred while processing your request. Please try again.";

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
    test_guild: Option<GuildId>,
}

impl Handler {
    fn new(
        command_handler: CommandHandler,
        component_handler: MessageComponentHandler,
        test_guild: Option<GuildId>,
    ) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
            component_handler: Arc::new(component_handler),
            test_guild,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(e) = self.command_handler.handle_message(&ctx, &msg).await {
            error!("Error handling message: {}", e);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ Logged in as {}", ready.user.name);
        info!("📊 Connected to {} server(s)", ready.guilds.len());
        info!("🔧 Registered commands: {}", GENERATE_EMOJI_REACTION);

        let command_sync = self.command_handler.command_sync();

        // The test guild is always resynced so edits show up without waiting.
        if let Some(guild_id) = self.test_guild {
            let _ = command_sync.sync(&ctx, guild_id).await;
        }

        for guild in &ready.guilds {
            command_sync.sync_once(&ctx, guild.id).await;
        }
        info!("📋 Commands synced to {} guild(s)", command_sync.synced_count());
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        if is_new {
            info!("📥 Joined guild: {} ({})", guild.name, guild.id);
        }
        self.command_handler
            .command_sync()
            .sync_once(&ctx, guild.id)
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self
                    .command_handler
                    .handle_application_command(&ctx, &command)
                    .await
                {
                    error!("Error handling command '{}': {}", command.data.name, e);

                    if command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(GENERIC_ERROR).ephemeral(true)
                                })
                        })
                        .await
                        .is_err()
                    {
                        let _ = command
                            .create_followup_message(&ctx.http, |message| {
                                message.content(GENERIC_ERROR).ephemeral(true)
                            })
                            .await;
                    }
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );

                    // Respond if nothing was sent yet, otherwise add a follow-up.
                    if component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(GENERIC_ERROR).ephemeral(true)
                                })
                        })
                        .await
                        .is_err()
                    {
                        let _ = component
                            .create_followup_message(&ctx.http, |message| {
                                message.content(GENERIC_ERROR).ephemeral(true)
                            })
                            .await;
                    }
                }
            }
            Interaction::ModalSubmit(modal) => {
                if let Err(e) = self.component_handler.handle_modal_submit(&ctx, &modal).await {
                    error!("Error handling modal submit '{}': {}", modal.data.custom_id, e);

                    if modal
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(GENERIC_ERROR).ephemeral(true)
                                })
                        })
                        .await
                        .is_err()
                    {
                        let _ = modal
                            .create_followup_message(&ctx.http, |message| {
                                message.content(GENERIC_ERROR).ephemeral(true)
                            })
                            .await;
                    }
                }
            }
            Interaction::Autocomplete(autocomplete) => {
                warn!("Unexpected autocomplete for command: {}", autocomplete.data.name);
            }
            Interaction::Ping(_) => {
                info!("Ping interaction received - Discord health check");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    info!("Starting Emoji Reactor...");
    info!("🖼️ Static emoji folder: {}", config.static_emoji_dir);
    if let Some(channel) = config.response_channel {
        info!("📣 Preferred response channel: {}", channel);
    }

    let services = Arc::new(EmojiServices::from_config(&config)?);
    let command_sync = Arc::new(CommandSync::new());
    let command_handler = CommandHandler::new(services.clone(), command_sync);
    let component_handler = MessageComponentHandler::new(services);
    let handler = Handler::new(
        command_handler,
        component_handler,
        config.guild_id.map(GuildId),
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {}", e);
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {:?}", intents);

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {:?}", why);
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
