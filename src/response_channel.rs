//! Where public "emoji added" announcements go.

use log::warn;
use serenity::cache::Cache;
use serenity::model::channel::{Channel, ChannelType, GuildChannel};
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Context;

/// Picks the configured channel, then the current one, then any text channel,
/// keeping the first the bot can send messages in.
pub fn pick_response_channel<F>(
    configured: Option<u64>,
    current: u64,
    text_channels: &[u64],
    can_send: F,
) -> Option<u64>
where
    F: Fn(u64) -> bool,
{
    configured
        .into_iter()
        .chain(std::iter::once(current))
        .chain(text_channels.iter().copied())
        .find(|&id| can_send(id))
}

/// Resolves the announcement channel from the guild cache.
pub fn resolve_response_channel(
    ctx: &Context,
    guild_id: GuildId,
    current: ChannelId,
    configured: Option<u64>,
) -> Option<ChannelId> {
    resolve_from_cache(&ctx.cache, guild_id, current, configured)
}

fn resolve_from_cache(
    cache: &Cache,
    guild_id: GuildId,
    current: ChannelId,
    configured: Option<u64>,
) -> Option<ChannelId> {
    let guild = match cache.guild(guild_id) {
        Some(guild) => guild,
        None => {
            warn!("Guild {} not cached, announcing in the current channel", guild_id);
            return Some(current);
        }
    };
    let bot_id = cache.current_user_id();

    let lookup = |id: u64| -> Option<&GuildChannel> {
        let channel_id = ChannelId(id);
        match guild.channels.get(&channel_id) {
            Some(Channel::Guild(channel)) => Some(channel),
            _ => guild.threads.iter().find(|thread| thread.id == channel_id),
        }
    };

    let mut text_channels: Vec<&GuildChannel> = guild
        .channels
        .values()
        .filter_map(|channel| match channel {
            Channel::Guild(channel) if channel.kind == ChannelType::Text => Some(channel),
            _ => None,
        })
        .collect();
    text_channels.sort_by_key(|channel| (channel.position, channel.id));
    let text_ids: Vec<u64> = text_channels.iter().map(|channel| channel.id.0).collect();

    pick_response_channel(configured, current.0, &text_ids, |id| {
        lookup(id)
            .and_then(|channel| channel.permissions_for_user(cache, bot_id).ok())
            .map(|permissions| permissions.send_messages())
            .unwrap_or(false)
    })
    .map(ChannelId)
}
