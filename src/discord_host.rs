//! Serenity-backed [`EmojiHost`]: one guild, one target message.

use log::debug;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, EmojiId, GuildId, MessageId};
use serenity::Error as SerenityError;
use std::collections::HashSet;
use std::sync::Arc;

use crate::emoji_image::EmojiImage;
use crate::emoji_name::EmojiName;
use crate::emoji_workflow::{EmojiHost, HostError, RegisteredEmoji};
use crate::sessions::TargetMessage;

pub struct DiscordEmojiHost {
    http: Arc<Http>,
    guild_id: GuildId,
    channel_id: ChannelId,
    message_id: MessageId,
}

impl DiscordEmojiHost {
    pub fn new(http: Arc<Http>, target: TargetMessage) -> Self {
        DiscordEmojiHost {
            http,
            guild_id: GuildId(target.guild_id),
            channel_id: ChannelId(target.channel_id),
            message_id: MessageId(target.message_id),
        }
    }
}

#[async_trait]
impl EmojiHost for DiscordEmojiHost {
    async fn emoji_names(&self) -> Result<HashSet<String>, HostError> {
        let emojis = self
            .guild_id
            .emojis(&self.http)
            .await
            .map_err(host_error)?;
        Ok(emojis.into_iter().map(|emoji| emoji.name).collect())
    }

    async fn create_emoji(
        &self,
        name: &EmojiName,
        image: &EmojiImage,
    ) -> Result<RegisteredEmoji, HostError> {
        let emoji = self
            .guild_id
            .create_emoji(&self.http, name.as_str(), &image.data_uri())
            .await
            .map_err(host_error)?;

        debug!("Created emoji {} ({}) in guild {}", emoji.name, emoji.id, self.guild_id);
        Ok(RegisteredEmoji {
            id: emoji.id.0,
            name: emoji.name,
            animated: emoji.animated,
        })
    }

    async fn react(&self, emoji: &RegisteredEmoji) -> Result<(), HostError> {
        let reaction = ReactionType::Custom {
            animated: emoji.animated,
            id: EmojiId(emoji.id),
            name: Some(emoji.name.clone()),
        };

        self.channel_id
            .create_reaction(&self.http, self.message_id, reaction)
            .await
            .map_err(host_error)
    }

    async fn delete_emoji(&self, emoji: &RegisteredEmoji) -> Result<(), HostError> {
        self.guild_id
            .delete_emoji(&self.http, EmojiId(emoji.id))
            .await
            .map_err(host_error)?;

        debug!("Deleted emoji {} ({}) from guild {}", emoji.name, emoji.id, self.guild_id);
        Ok(())
    }
}

fn host_error(err: SerenityError) -> HostError {
    let status = match &err {
        SerenityError::Http(http_err) => http_err.status_code().map(|status| status.as_u16()),
        _ => None,
    };
    classify_status(status, err.to_string())
}

/// 403 means the bot lacks Manage Emojis (or the target is off limits).
fn classify_status(status: Option<u16>, detail: String) -> HostError {
    match status {
        Some(403) => HostError::Forbidden,
        _ => HostError::Other(detail),
    }
}
