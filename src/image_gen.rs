//! # Feature: Emoji Image Generation
//!
//! DALL-E 3 powered emoji artwork. Every prompt is wrapped in a style prefix
//! that pushes the model toward bold, centered, flat designs that still read
//! at 128px.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Emoji style prefix, request timeouts, download folded into generation
//! - 1.0.0: Initial release with DALL-E 3 integration

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serenity::async_trait;
use std::time::Duration;

use crate::emoji_image::EmojiImage;
use crate::emoji_workflow::{ImageSource, WorkflowError};

const GENERATIONS_URL: &str = "https://api.openai.com/v1/images/generations";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const EMOJI_STYLE_PREFIX: &str = "A large, centered emoji design filling 100% of the image canvas. \
Flat vector style with high contrast and bold, vibrant colors. \
Minimal background, maximum zoom on the emoji subject. \
Clean, thick outlines and simple geometric shapes. \
Optimized for visibility at small sizes with no fine details. \
Square format, no borders or margins. Prompt: ";

/// Prepends the emoji style prefix to a user prompt.
pub fn styled_prompt(prompt: &str) -> String {
    format!("{}{}", EMOJI_STYLE_PREFIX, prompt.trim())
}

#[derive(Clone)]
pub struct ImageGenerator {
    openai_api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct DalleRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
    response_format: String,
}

#[derive(Deserialize, Debug)]
struct DalleResponse {
    data: Vec<DalleImageData>,
}

#[derive(Deserialize, Debug)]
struct DalleImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Deserialize, Debug)]
struct DalleError {
    error: DalleErrorDetails,
}

#[derive(Deserialize, Debug)]
struct DalleErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl ImageGenerator {
    pub fn new(openai_api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ImageGenerator {
            openai_api_key,
            client,
        })
    }

    /// Ask DALL-E 3 for one square image and return its URL.
    pub async fn generate_image_url(&self, prompt: &str) -> Result<String, WorkflowError> {
        info!(
            "Generating emoji image with DALL-E 3 | Prompt: '{}'",
            prompt.chars().take(100).collect::<String>()
        );

        let request = DalleRequest {
            model: "dall-e-3".to_string(),
            prompt: styled_prompt(prompt),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            response_format: "url".to_string(),
        };

        debug!("Sending request to OpenAI DALL-E API");
        let response = self
            .client
            .post(GENERATIONS_URL)
            .bearer_auth(&self.openai_api_key)
            .json(&request)
            .send()
            .await
            .map_err(generation_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(generation_error)?;

        if !status.is_success() {
            return Err(parse_api_error(status, &response_text));
        }

        let dalle_response: DalleResponse = serde_json::from_str(&response_text)
            .map_err(|e| WorkflowError::Generation(format!("unreadable response: {}", e)))?;

        match dalle_response.data.into_iter().next() {
            Some(DalleImageData {
                url: Some(url),
                revised_prompt,
            }) => {
                info!("Image generated successfully | URL length: {}", url.len());
                if let Some(revised) = revised_prompt {
                    debug!("Revised prompt: {}", revised);
                }
                Ok(url)
            }
            _ => {
                error!("No image URL in response: {}", response_text);
                Err(WorkflowError::NoImageReturned)
            }
        }
    }

    /// Download an image from URL to bytes
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, WorkflowError> {
        debug!("Downloading generated image");
        let response = self.client.get(url).send().await.map_err(download_error)?;

        if !response.status().is_success() {
            error!("Failed to download image: {}", response.status());
            return Err(WorkflowError::Download(format!(
                "status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(download_error)?;
        info!("Image downloaded | Size: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageSource for ImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<EmojiImage, WorkflowError> {
        let url = self.generate_image_url(prompt).await?;
        let bytes = self.download_image(&url).await?;
        Ok(EmojiImage::new(bytes))
    }
}

fn generation_error(e: reqwest::Error) -> WorkflowError {
    if e.is_timeout() {
        WorkflowError::GenerationTimedOut
    } else {
        WorkflowError::Generation(e.to_string())
    }
}

fn download_error(e: reqwest::Error) -> WorkflowError {
    if e.is_timeout() {
        WorkflowError::DownloadTimedOut
    } else {
        WorkflowError::Download(e.to_string())
    }
}

fn parse_api_error(status: reqwest::StatusCode, body: &str) -> WorkflowError {
    match serde_json::from_str::<DalleError>(body) {
        Ok(error_response) => {
            error!(
                "DALL-E API error: {} (type: {:?})",
                error_response.error.message, error_response.error.error_type
            );
            WorkflowError::Generation(error_response.error.message)
        }
        Err(_) => {
            error!("DALL-E API error (status {}): {}", status, body);
            WorkflowError::Generation(format!("API error (status {})", status))
        }
    }
}
