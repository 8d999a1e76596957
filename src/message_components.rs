use anyhow::Result;
use log::{error, info, warn};
use serenity::builder::{CreateComponents, CreateEmbed};
use serenity::model::application::component::{ActionRowComponent, ButtonStyle, InputTextStyle};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Context;
use std::collections::HashMap;
use std::sync::Arc;

use crate::discord_host::DiscordEmojiHost;
use crate::emoji_name::EmojiName;
use crate::emoji_workflow::{react_with_generated, register_and_react, EmojiRequest, WorkflowError};
use crate::response_channel::resolve_response_channel;
use crate::services::EmojiServices;
use crate::sessions::{MenuSession, SessionStore};
use crate::static_library::{
    display_description, display_label, file_stem, filter_matches, paginate, Page,
};

const EMBED_COLOUR: u32 = 0x5865F2;

/// Custom ids of the emoji menu. Components that act on a target message carry
/// their session id after a colon, e.g. `emoji_generate:<session>`.
pub mod ids {
    pub const GENERATE: &str = "emoji_generate";
    pub const STATIC: &str = "emoji_static";
    pub const PREVIOUS: &str = "static_prev";
    pub const NEXT: &str = "static_next";
    pub const BROWSE_ALL: &str = "static_all";
    pub const SEARCH: &str = "static_search";
    pub const PICK: &str = "static_pick";

    pub const PROMPT_MODAL: &str = "emoji_prompt_modal";
    pub const SEARCH_MODAL: &str = "static_search_modal";

    pub const NAME_INPUT: &str = "emoji_name";
    pub const PROMPT_INPUT: &str = "emoji_prompt";
    pub const QUERY_INPUT: &str = "search_query";

    pub fn with_session(action: &str, session_id: &str) -> String {
        format!("{}:{}", action, session_id)
    }

    /// Splits a custom id into its action and session id.
    pub fn split(custom_id: &str) -> (&str, &str) {
        custom_id.split_once(':').unwrap_or((custom_id, ""))
    }
}

/// Handler for the buttons, selects and modals of the emoji menu
pub struct MessageComponentHandler {
    services: Arc<EmojiServices>,
}

impl MessageComponentHandler {
    pub fn new(services: Arc<EmojiServices>) -> Self {
        Self { services }
    }

    /// Handle all types of component interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();

        info!("Processing component interaction: {} from user: {}", custom_id, user_id);

        let (action, session_id) = ids::split(custom_id);
        match action {
            ids::GENERATE => self.show_prompt_modal(ctx, interaction, session_id).await?,
            ids::STATIC => self.open_static_browser(ctx, interaction, session_id).await?,
            ids::PREVIOUS => self.turn_page(ctx, interaction, session_id, false).await?,
            ids::NEXT => self.turn_page(ctx, interaction, session_id, true).await?,
            ids::BROWSE_ALL => self.browse_all(ctx, interaction, session_id).await?,
            ids::SEARCH => self.show_search_modal(ctx, interaction, session_id).await?,
            ids::PICK => self.use_static_emoji(ctx, interaction, session_id).await?,
            _ => {
                reply_to_component(ctx, interaction, "Unknown component interaction.").await?;
            }
        }

        Ok(())
    }

    /// Handle modal submit interactions
    pub async fn handle_modal_submit(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();

        info!("Processing modal submit: {} from user: {}", custom_id, user_id);

        let (action, session_id) = ids::split(custom_id);
        match action {
            ids::PROMPT_MODAL => self.generate_emoji(ctx, interaction, session_id).await?,
            ids::SEARCH_MODAL => self.search_static(ctx, interaction, session_id).await?,
            _ => {
                reply_to_modal(ctx, interaction, "Unknown modal submission.").await?;
            }
        }

        Ok(())
    }

    /// Embed shown when the context menu is used
    pub fn create_choice_embed() -> CreateEmbed {
        CreateEmbed::default()
            .title("🎭 Add Emoji Reaction")
            .description("Choose how you want to add an emoji reaction:")
            .colour(EMBED_COLOUR)
            .to_owned()
    }

    /// Generate / static choice buttons
    pub fn create_choice_buttons(session_id: &str) -> CreateComponents {
        CreateComponents::default()
            .create_action_row(|row| {
                row.create_button(|button| {
                    button
                        .custom_id(ids::with_session(ids::GENERATE, session_id))
                        .label("🎨 Generate New Emoji")
                        .style(ButtonStyle::Primary)
                })
                .create_button(|button| {
                    button
                        .custom_id(ids::with_session(ids::STATIC, session_id))
                        .label("🖼️ Use Static Emoji")
                        .style(ButtonStyle::Secondary)
                })
            })
            .to_owned()
    }

    /// Inputs of the "Generate Emoji Reaction" modal
    pub fn create_prompt_inputs() -> CreateComponents {
        CreateComponents::default()
            .create_action_row(|row| {
                row.create_input_text(|input| {
                    input
                        .custom_id(ids::NAME_INPUT)
                        .label("Emoji Name (optional)")
                        .style(InputTextStyle::Short)
                        .placeholder("Defaults to the first word of the prompt")
                        .required(false)
                        .max_length(32)
                })
            })
            .create_action_row(|row| {
                row.create_input_text(|input| {
                    input
                        .custom_id(ids::PROMPT_INPUT)
                        .label("Prompt for Emoji Generation")
                        .style(InputTextStyle::Paragraph)
                        .placeholder("A cute smiling orange cat emoji")
                        .required(true)
                        .min_length(1)
                        .max_length(1000)
                })
            })
            .to_owned()
    }

    /// Inputs of the static emoji search modal
    pub fn create_search_inputs() -> CreateComponents {
        CreateComponents::default()
            .create_action_row(|row| {
                row.create_input_text(|input| {
                    input
                        .custom_id(ids::QUERY_INPUT)
                        .label("Search for Static Emoji")
                        .style(InputTextStyle::Short)
                        .placeholder("Enter keywords to search for (e.g., cat, smile, logo)")
                        .required(false)
                        .max_length(100)
                })
            })
            .to_owned()
    }

    /// Embed describing one page of static emoji results
    pub fn create_static_embed(query: &str, result_count: usize, page: &Page<'_>) -> CreateEmbed {
        let (title, description) = if query.is_empty() {
            (
                "🖼️ Browse All Static Emojis".to_string(),
                format!("Showing all {} emojis", result_count),
            )
        } else {
            (
                format!("🖼️ Static Emoji Search Results: '{}'", query),
                format!("Found {} emojis", result_count),
            )
        };

        let mut embed = CreateEmbed::default();
        embed.title(title).description(description).colour(EMBED_COLOUR);

        if page.total_pages > 1 {
            embed.field(
                "📄 Page Navigation",
                format!(
                    "Page {} of {}\nUse the Previous/Next buttons to browse, or Search for specific emojis.",
                    page.index + 1,
                    page.total_pages
                ),
                false,
            );
        }

        embed
    }

    /// Select menu for the current page plus navigation buttons
    pub fn create_static_components(session_id: &str, page: &Page<'_>) -> CreateComponents {
        let mut components = CreateComponents::default();

        if !page.items.is_empty() {
            components.create_action_row(|row| {
                row.create_select_menu(|menu| {
                    menu.custom_id(ids::with_session(ids::PICK, session_id))
                        .placeholder("Choose a static emoji to react with...")
                        .min_values(1)
                        .max_values(1)
                        .options(|options| {
                            for file_name in page.items {
                                options.create_option(|option| {
                                    option
                                        .label(display_label(file_name))
                                        .value(file_name)
                                        .description(display_description(file_name))
                                });
                            }
                            options
                        })
                })
            });
        }

        components.create_action_row(|row| {
            row.create_button(|button| {
                button
                    .custom_id(ids::with_session(ids::PREVIOUS, session_id))
                    .label("⬅️ Previous")
                    .style(ButtonStyle::Secondary)
            })
            .create_button(|button| {
                button
                    .custom_id(ids::with_session(ids::NEXT, session_id))
                    .label("➡️ Next")
                    .style(ButtonStyle::Secondary)
            })
            .create_button(|button| {
                button
                    .custom_id(ids::with_session(ids::BROWSE_ALL, session_id))
                    .label("📚 Browse All")
                    .style(ButtonStyle::Primary)
            })
            .create_button(|button| {
                button
                    .custom_id(ids::with_session(ids::SEARCH, session_id))
                    .label("🔍 Search")
                    .style(ButtonStyle::Secondary)
            })
        });

        components
    }

    /// Show the generate emoji modal
    async fn show_prompt_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
    ) -> Result<()> {
        if self.services.sessions.get(session_id).is_none() {
            return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                .await;
        }

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(ids::with_session(ids::PROMPT_MODAL, session_id))
                            .title("Generate Emoji Reaction")
                            .set_components(Self::create_prompt_inputs())
                    })
            })
            .await?;

        Ok(())
    }

    /// Show the static emoji search modal
    async fn show_search_modal(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
    ) -> Result<()> {
        if self.services.sessions.get(session_id).is_none() {
            return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                .await;
        }

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::Modal)
                    .interaction_response_data(|modal| {
                        modal
                            .custom_id(ids::with_session(ids::SEARCH_MODAL, session_id))
                            .title("Search Static Emojis")
                            .set_components(Self::create_search_inputs())
                    })
            })
            .await?;

        Ok(())
    }

    /// Handle generate emoji modal submission
    async fn generate_emoji(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        session_id: &str,
    ) -> Result<()> {
        let values = modal_values(interaction);
        let prompt = values
            .get(ids::PROMPT_INPUT)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let raw_name = values
            .get(ids::NAME_INPUT)
            .map(|s| s.trim())
            .unwrap_or("");

        let session = match self.services.sessions.get(session_id) {
            Some(session) => session,
            None => {
                return reply_to_modal(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                    .await
            }
        };

        if prompt.is_empty() {
            return reply_to_modal(ctx, interaction, "❌ Please describe the emoji you want.").await;
        }

        let name = if raw_name.is_empty() {
            None
        } else {
            match EmojiName::parse(raw_name) {
                Ok(name) => Some(name),
                Err(e) => {
                    return reply_to_modal(ctx, interaction, &WorkflowError::from(e).to_string())
                        .await
                }
            }
        };

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|message| message.ephemeral(true))
            })
            .await?;

        let response_channel = match self.response_channel_for(ctx, &session) {
            Some(channel) => channel,
            None => {
                return followup_to_modal(ctx, interaction, &WorkflowError::NoResponseChannel.to_string())
                    .await
            }
        };

        let request = EmojiRequest {
            user_id: interaction.user.id.0,
            channel_id: session.target.channel_id,
            message_id: session.target.message_id,
            name,
            prompt,
        };
        let host = DiscordEmojiHost::new(ctx.http.clone(), session.target);

        match react_with_generated(&self.services.images, &host, &request).await {
            Ok(_) => {
                announce(
                    ctx,
                    response_channel,
                    &format!("✅ **Success!! Emoji Generated from: `{}`**", request.prompt),
                )
                .await;
                followup_to_modal(ctx, interaction, "✅ Emoji generated and added!").await?;
            }
            Err(e) => {
                warn!("Emoji generation for user {} failed: {:?}", request.user_id, e);
                followup_to_modal(ctx, interaction, &e.to_string()).await?;
            }
        }

        Ok(())
    }

    /// Handle the "Use Static Emoji" button
    async fn open_static_browser(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
    ) -> Result<()> {
        if self.services.sessions.get(session_id).is_none() {
            return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                .await;
        }

        defer_component(ctx, interaction).await?;

        let results = self.services.library.list().await;
        if results.is_empty() {
            return followup_to_component(
                ctx,
                interaction,
                "❌ No static emojis found in the static folder.",
            )
            .await;
        }

        let browser_id = match self.services.sessions.open_browser(session_id, "") {
            Some(browser_id) => browser_id,
            None => {
                return followup_to_component(
                    ctx,
                    interaction,
                    &WorkflowError::SessionExpired.to_string(),
                )
                .await
            }
        };

        let page = paginate(&results, 0);
        let embed = Self::create_static_embed("", results.len(), &page);
        let components = Self::create_static_components(&browser_id, &page);

        interaction
            .create_followup_message(&ctx.http, |message| {
                message
                    .add_embed(embed)
                    .set_components(components)
                    .ephemeral(true)
            })
            .await?;

        Ok(())
    }

    /// Handle Previous / Next
    async fn turn_page(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
        forward: bool,
    ) -> Result<()> {
        let session = match self.services.sessions.get(session_id) {
            Some(session) => session,
            None => {
                return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                    .await
            }
        };

        let results = self.services.library.search(&session.query).await;
        let target_page =
            match advance_browser(&self.services.sessions, session_id, &session, &results, forward) {
                Some(page) => page,
                None if forward => {
                    return reply_to_component(ctx, interaction, "❌ Already on last page!").await
                }
                None => {
                    return reply_to_component(ctx, interaction, "❌ Already on first page!").await
                }
            };

        self.show_page(ctx, interaction, session_id, &session.query, &results, target_page)
            .await
    }

    /// Handle "Browse All"
    async fn browse_all(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
    ) -> Result<()> {
        let reset = self.services.sessions.update(session_id, |session| {
            session.query.clear();
            session.page = 0;
        });
        if reset.is_none() {
            return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                .await;
        }

        let results = self.services.library.list().await;
        self.show_page(ctx, interaction, session_id, "", &results, 0)
            .await
    }

    /// Replace the browser message in place with another page
    async fn show_page(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
        query: &str,
        results: &[String],
        page_index: usize,
    ) -> Result<()> {
        let page = paginate(results, page_index);
        let embed = Self::create_static_embed(query, results.len(), &page);
        let components = Self::create_static_components(session_id, &page);

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|message| {
                        message.add_embed(embed).set_components(components)
                    })
            })
            .await?;

        Ok(())
    }

    /// Handle static emoji search modal submission
    async fn search_static(
        &self,
        ctx: &Context,
        interaction: &ModalSubmitInteraction,
        session_id: &str,
    ) -> Result<()> {
        let query = modal_values(interaction)
            .get(ids::QUERY_INPUT)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if self.services.sessions.get(session_id).is_none() {
            return reply_to_modal(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                .await;
        }

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|message| message.ephemeral(true))
            })
            .await?;

        let all = self.services.library.list().await;
        let total = all.len();
        let results = filter_matches(all, &query);

        if results.is_empty() {
            return followup_to_modal(
                ctx,
                interaction,
                &format!(
                    "❌ No static emojis found for query: `{}`\nAvailable emojis: {} total",
                    query, total
                ),
            )
            .await;
        }

        let browser_id = match self.services.sessions.open_browser(session_id, &query) {
            Some(browser_id) => browser_id,
            None => {
                return followup_to_modal(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                    .await
            }
        };

        let page = paginate(&results, 0);
        let embed = Self::create_static_embed(&query, results.len(), &page);
        let components = Self::create_static_components(&browser_id, &page);

        interaction
            .create_followup_message(&ctx.http, |message| {
                message
                    .add_embed(embed)
                    .set_components(components)
                    .ephemeral(true)
            })
            .await?;

        Ok(())
    }

    /// Handle a pick from the static emoji select menu
    async fn use_static_emoji(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        session_id: &str,
    ) -> Result<()> {
        let file_name = interaction
            .data
            .values
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Static emoji select submitted without a value"))?;

        let session = match self.services.sessions.get(session_id) {
            Some(session) => session,
            None => {
                return reply_to_component(ctx, interaction, &WorkflowError::SessionExpired.to_string())
                    .await
            }
        };

        defer_component(ctx, interaction).await?;

        let response_channel = match self.response_channel_for(ctx, &session) {
            Some(channel) => channel,
            None => {
                return followup_to_component(
                    ctx,
                    interaction,
                    &WorkflowError::NoResponseChannel.to_string(),
                )
                .await
            }
        };

        let image = match self.services.library.read(&file_name).await {
            Ok(image) => image.prepare_static(),
            Err(e) => return followup_to_component(ctx, interaction, &e.to_string()).await,
        };

        let name = EmojiName::sanitize(file_stem(&file_name));
        let host = DiscordEmojiHost::new(ctx.http.clone(), session.target);

        match register_and_react(&host, &name, image).await {
            Ok(_) => {
                announce(
                    ctx,
                    response_channel,
                    &format!("✅ **Static Emoji Added: `{}`**", file_name),
                )
                .await;
                followup_to_component(ctx, interaction, "✅ Static emoji added as reaction!")
                    .await?;
            }
            Err(e) => {
                warn!("Static emoji '{}' failed: {:?}", file_name, e);
                followup_to_component(ctx, interaction, &e.to_string()).await?;
            }
        }

        Ok(())
    }

    fn response_channel_for(&self, ctx: &Context, session: &MenuSession) -> Option<ChannelId> {
        resolve_response_channel(
            ctx,
            GuildId(session.target.guild_id),
            ChannelId(session.target.channel_id),
            self.services.response_channel,
        )
    }
}

/// Moves one browser a page forward or back and records it on that browser's
/// session. `None` when already on the first or last page.
fn advance_browser(
    sessions: &SessionStore,
    browser_id: &str,
    session: &MenuSession,
    results: &[String],
    forward: bool,
) -> Option<usize> {
    let target_page = paginate(results, session.page).step(forward)?;
    sessions.update(browser_id, |session| session.page = target_page);
    Some(target_page)
}

/// Collects modal text inputs by custom id
fn modal_values(interaction: &ModalSubmitInteraction) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for action_row in &interaction.data.components {
        for component in &action_row.components {
            if let ActionRowComponent::InputText(input) = component {
                values.insert(input.custom_id.clone(), input.value.clone());
            }
        }
    }

    values
}

async fn announce(ctx: &Context, channel: ChannelId, content: &str) {
    if let Err(e) = channel.say(&ctx.http, content).await {
        error!("Failed to post announcement in channel {}: {}", channel, e);
    }
}

async fn reply_to_component(
    ctx: &Context,
    interaction: &MessageComponentInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}

async fn defer_component(ctx: &Context, interaction: &MessageComponentInteraction) -> Result<()> {
    interaction
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                .interaction_response_data(|message| message.ephemeral(true))
        })
        .await?;
    Ok(())
}

async fn followup_to_component(
    ctx: &Context,
    interaction: &MessageComponentInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_followup_message(&ctx.http, |message| message.content(content).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_to_modal(
    ctx: &Context,
    interaction: &ModalSubmitInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}

async fn followup_to_modal(
    ctx: &Context,
    interaction: &ModalSubmitInteraction,
    content: &str,
) -> Result<()> {
    interaction
        .create_followup_message(&ctx.http, |message| message.content(content).ephemeral(true))
        .await?;
    Ok(())
}
