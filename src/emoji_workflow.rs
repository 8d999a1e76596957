//! # Feature: Emoji Reactions
//!
//! The generate → register → react → clean up sequence behind the
//! "Generate Emoji Reaction" context menu. The image source and the guild are
//! traits so the sequence can run against Discord and OpenAI in production and
//! against in-memory fakes in tests.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.0.0: Generated and static emoji reactions with guaranteed cleanup

use log::{info, warn};
use serenity::async_trait;
use std::collections::HashSet;
use thiserror::Error;

use crate::emoji_image::EmojiImage;
use crate::emoji_name::{EmojiName, EmojiNameError};

/// Every way a reaction request can fail, worded for the user who asked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("❌ Failed to generate image: {0}")]
    Generation(String),
    #[error("❌ OpenAI API request timed out. Please try again.")]
    GenerationTimedOut,
    #[error("❌ No image URL returned from OpenAI")]
    NoImageReturned,
    #[error("❌ Failed to download image: {0}")]
    Download(String),
    #[error("❌ Image download timed out. Please try again.")]
    DownloadTimedOut,
    #[error("❌ I don't have permission to add emojis.")]
    EmojiForbidden,
    #[error("❌ Failed to create emoji '{name}': {reason}")]
    EmojiCreate { name: String, reason: String },
    #[error("❌ Failed to react: {0}")]
    React(String),
    #[error("❌ I don't have permission to send messages in any channel.")]
    NoResponseChannel,
    #[error("❌ Invalid emoji name: {0}")]
    InvalidName(#[from] EmojiNameError),
    #[error("❌ Selected emoji file not found.")]
    StaticFileMissing,
    #[error("❌ Failed to read emoji file: {0}")]
    StaticFileUnreadable(String),
    #[error("⌛ This menu has expired. Right-click the message and pick the command again.")]
    SessionExpired,
}

/// Errors from the chat platform, reduced to what the workflow reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("missing permissions")]
    Forbidden,
    #[error("{0}")]
    Other(String),
}

/// A guild emoji that exists only until the workflow deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEmoji {
    pub id: u64,
    pub name: String,
    pub animated: bool,
}

/// Produces emoji artwork for a prompt.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<EmojiImage, WorkflowError>;
}

/// The guild and target message a reaction lands on.
#[async_trait]
pub trait EmojiHost: Send + Sync {
    async fn emoji_names(&self) -> Result<HashSet<String>, HostError>;
    async fn create_emoji(
        &self,
        name: &EmojiName,
        image: &EmojiImage,
    ) -> Result<RegisteredEmoji, HostError>;
    async fn react(&self, emoji: &RegisteredEmoji) -> Result<(), HostError>;
    async fn delete_emoji(&self, emoji: &RegisteredEmoji) -> Result<(), HostError>;
}

/// A submitted "Generate Emoji Reaction" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiRequest {
    pub user_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
    /// Name typed by the user, already validated.
    pub name: Option<EmojiName>,
    pub prompt: String,
}

impl EmojiRequest {
    /// The user's name if they gave one, otherwise the first word of the prompt.
    pub fn base_name(&self) -> EmojiName {
        self.name
            .clone()
            .unwrap_or_else(|| EmojiName::from_prompt(&self.prompt))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub emoji_name: String,
    /// False when the temporary emoji could not be deleted and was left in the guild.
    pub cleaned_up: bool,
}

pub async fn react_with_generated<I, H>(
    images: &I,
    host: &H,
    request: &EmojiRequest,
) -> Result<ReactionOutcome, WorkflowError>
where
    I: ImageSource + ?Sized,
    H: EmojiHost + ?Sized,
{
    info!(
        "Emoji request from user {} for message {} in channel {}",
        request.user_id, request.message_id, request.channel_id
    );

    let image = images.generate(&request.prompt).await?.prepare_generated();
    register_and_react(host, &request.base_name(), image).await
}

/// Uploads the image as a uniquely named emoji, reacts with it, then deletes it.
///
/// The delete runs exactly once whenever creation succeeded, even if the
/// reaction failed. A failed delete is logged and reported through
/// [`ReactionOutcome::cleaned_up`], never as an error.
pub async fn register_and_react<H>(
    host: &H,
    base_name: &EmojiName,
    image: EmojiImage,
) -> Result<ReactionOutcome, WorkflowError>
where
    H: EmojiHost + ?Sized,
{
    let existing = host.emoji_names().await.unwrap_or_else(|e| {
        warn!("⚠️ Could not list guild emojis, assuming none: {}", e);
        HashSet::new()
    });
    let name = base_name.unique_among(&existing);

    info!(
        "Creating emoji '{}' | {} bytes of {}",
        name,
        image.bytes.len(),
        image.content_type
    );
    let emoji = host
        .create_emoji(&name, &image)
        .await
        .map_err(|e| match e {
            HostError::Forbidden => WorkflowError::EmojiForbidden,
            HostError::Other(reason) => WorkflowError::EmojiCreate {
                name: name.to_string(),
                reason,
            },
        })?;

    let reacted = host.react(&emoji).await;

    let cleaned_up = match host.delete_emoji(&emoji).await {
        Ok(()) => true,
        Err(e) => {
            warn!("⚠️ Failed to delete temporary emoji '{}' ({}): {}", emoji.name, emoji.id, e);
            false
        }
    };

    reacted.map_err(|e| WorkflowError::React(e.to_string()))?;
    info!("✅ Reacted with '{}' (cleaned up: {})", emoji.name, cleaned_up);

    Ok(ReactionOutcome {
        emoji_name: emoji.name,
        cleaned_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        ListNames,
        Create(String),
        React(u64),
        Delete(u64),
    }

    /// In-memory guild that records every call.
    #[derive(Default)]
    pub struct FakeHost {
        pub calls: Mutex<Vec<Call>>,
        pub live_emojis: Mutex<Vec<RegisteredEmoji>>,
        pub reactions: Mutex<Vec<String>>,
        pub existing: HashSet<String>,
        pub create_error: Option<HostError>,
        pub react_error: Option<HostError>,
        pub delete_error: Option<HostError>,
    }

    impl FakeHost {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn deletes(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Delete(_)))
                .count()
        }
    }

    #[async_trait]
    impl EmojiHost for FakeHost {
        async fn emoji_names(&self) -> Result<HashSet<String>, HostError> {
            self.calls.lock().unwrap().push(Call::ListNames);
            Ok(self.existing.clone())
        }

        async fn create_emoji(
            &self,
            name: &EmojiName,
            _image: &EmojiImage,
        ) -> Result<RegisteredEmoji, HostError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(name.to_string()));
            if let Some(e) = &self.create_error {
                return Err(e.clone());
            }
            let emoji = RegisteredEmoji {
                id: 42,
                name: name.to_string(),
                animated: false,
            };
            self.live_emojis.lock().unwrap().push(emoji.clone());
            Ok(emoji)
        }

        async fn react(&self, emoji: &RegisteredEmoji) -> Result<(), HostError> {
            self.calls.lock().unwrap().push(Call::React(emoji.id));
            if let Some(e) = &self.react_error {
                return Err(e.clone());
            }
            self.reactions.lock().unwrap().push(emoji.name.clone());
            Ok(())
        }

        async fn delete_emoji(&self, emoji: &RegisteredEmoji) -> Result<(), HostError> {
            self.calls.lock().unwrap().push(Call::Delete(emoji.id));
            if let Some(e) = &self.delete_error {
                return Err(e.clone());
            }
            self.live_emojis.lock().unwrap().retain(|e| e.id != emoji.id);
            Ok(())
        }
    }

    struct FakeImages {
        result: Result<Vec<u8>, WorkflowError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeImages {
        fn ok() -> Self {
            FakeImages {
                result: Ok(b"not really a png".to_vec()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: WorkflowError) -> Self {
            FakeImages {
                result: Err(error),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageSource for FakeImages {
        async fn generate(&self, prompt: &str) -> Result<EmojiImage, WorkflowError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.result.clone().map(EmojiImage::new)
        }
    }

    fn request(prompt: &str, name: Option<&str>) -> EmojiRequest {
        EmojiRequest {
            user_id: 1,
            channel_id: 2,
            message_id: 3,
            name: name.map(|n| EmojiName::parse(n).unwrap()),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_run_reacts_once_and_leaves_no_emoji() {
        let images = FakeImages::ok();
        let host = FakeHost::default();

        let outcome = react_with_generated(&images, &host, &request("Cat in a hat", None))
            .await
            .unwrap();

        assert_eq!(outcome.emoji_name, "cat");
        assert!(outcome.cleaned_up);
        assert_eq!(*host.reactions.lock().unwrap(), vec!["cat".to_string()]);
        assert!(host.live_emojis.lock().unwrap().is_empty());
        assert_eq!(
            host.calls(),
            vec![
                Call::ListNames,
                Call::Create("cat".to_string()),
                Call::React(42),
                Call::Delete(42),
            ]
        );
        assert_eq!(*images.prompts.lock().unwrap(), vec!["Cat in a hat".to_string()]);
    }

    #[tokio::test]
    async fn test_reaction_failure_still_deletes_exactly_once() {
        let images = FakeImages::ok();
        let host = FakeHost {
            react_error: Some(HostError::Other("Unknown Message".to_string())),
            ..Default::default()
        };

        let err = react_with_generated(&images, &host, &request("Cat", None))
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::React("Unknown Message".to_string()));
        assert_eq!(host.deletes(), 1);
        assert!(host.live_emojis.lock().unwrap().is_empty());
        assert!(host.reactions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_creation_skips_react_and_delete() {
        let images = FakeImages::ok();
        let host = FakeHost {
            create_error: Some(HostError::Forbidden),
            ..Default::default()
        };

        let err = react_with_generated(&images, &host, &request("Cat", None))
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::EmojiForbidden);
        assert_eq!(
            host.calls(),
            vec![Call::ListNames, Call::Create("cat".to_string())]
        );
    }

    #[tokio::test]
    async fn test_creation_failure_names_the_emoji() {
        let host = FakeHost {
            create_error: Some(HostError::Other("Maximum number of emojis reached".to_string())),
            ..Default::default()
        };

        let err = react_with_generated(&FakeImages::ok(), &host, &request("Cat", Some("kitty")))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "❌ Failed to create emoji 'kitty': Maximum number of emojis reached"
        );
        assert_eq!(host.deletes(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_never_touches_the_guild() {
        let images = FakeImages::failing(WorkflowError::GenerationTimedOut);
        let host = FakeHost::default();

        let err = react_with_generated(&images, &host, &request("Cat", None))
            .await
            .unwrap_err();

        assert_eq!(err, WorkflowError::GenerationTimedOut);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cleanup_is_reported_not_raised() {
        let host = FakeHost {
            delete_error: Some(HostError::Forbidden),
            ..Default::default()
        };

        let outcome = react_with_generated(&FakeImages::ok(), &host, &request("Cat", None))
            .await
            .unwrap();

        assert!(!outcome.cleaned_up);
        assert_eq!(host.deletes(), 1);
    }

    #[tokio::test]
    async fn test_name_is_made_unique_and_user_name_wins() {
        let host = FakeHost {
            existing: ["party".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let outcome =
            react_with_generated(&FakeImages::ok(), &host, &request("Cat", Some("party")))
                .await
                .unwrap();

        assert_eq!(outcome.emoji_name, "party_1");
    }
}
