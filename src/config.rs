use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub openai_api_key: String,
    pub guild_id: Option<u64>,
    pub response_channel: Option<u64>,
    pub static_emoji_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            discord_token: required(&lookup, "DISCORD_BOT_TOKEN")?,
            openai_api_key: required(&lookup, "OPENAI_API_KEY")?,
            guild_id: optional_id(&lookup, "GUILD_ID"),
            response_channel: optional_id(&lookup, "RESPONSE_CHANNEL"),
            static_emoji_dir: lookup("STATIC_EMOJI_DIR").unwrap_or_else(|| "static".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
}

// Blank means unset; anything non-numeric is ignored with a warning.
fn optional_id<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("⚠️  Invalid {} format: '{}', ignoring", key, trimmed);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_missing_discord_token() {
        let result = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "key")]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("DISCORD_BOT_TOKEN"));
    }

    #[test]
    fn test_config_missing_openai_key() {
        let result = Config::from_lookup(lookup_from(&[("DISCORD_BOT_TOKEN", "token")]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_config_blank_token_is_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "   "),
            ("OPENAI_API_KEY", "key"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_with_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "test_discord_token"),
            ("OPENAI_API_KEY", "test_openai_key"),
        ]))
        .unwrap();

        assert_eq!(config.discord_token, "test_discord_token");
        assert_eq!(config.openai_api_key, "test_openai_key");
        assert_eq!(config.guild_id, None);
        assert_eq!(config.response_channel, None);
        assert_eq!(config.static_emoji_dir, "static");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_optional_ids() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("OPENAI_API_KEY", "key"),
            ("GUILD_ID", " 123456789012345678 "),
            ("RESPONSE_CHANNEL", "not-a-channel"),
        ]))
        .unwrap();

        assert_eq!(config.guild_id, Some(123456789012345678));
        assert_eq!(config.response_channel, None);
    }
}
