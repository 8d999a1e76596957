use anyhow::Result;

use crate::config::Config;
use crate::image_gen::ImageGenerator;
use crate::sessions::SessionStore;
use crate::static_library::StaticLibrary;

/// Everything the interaction handlers share for the lifetime of the bot.
pub struct EmojiServices {
    pub images: ImageGenerator,
    pub library: StaticLibrary,
    pub sessions: SessionStore,
    pub response_channel: Option<u64>,
}

impl EmojiServices {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(EmojiServices {
            images: ImageGenerator::new(config.openai_api_key.clone())?,
            library: StaticLibrary::new(&config.static_emoji_dir),
            sessions: SessionStore::default(),
            response_channel: config.response_channel,
        })
    }
}
