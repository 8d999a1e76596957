//! # Command System
//!
//! Application commands (the emoji reaction context menu) and bang commands (!).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Emoji reaction context menu replaces the persona commands
//! - 1.0.0: Initial reorganization with modular command structure

pub mod bang;
pub mod slash;

// Re-export the CommandHandler from the handler module
pub use crate::command_handler::CommandHandler;

pub use slash::{CommandSync, GENERATE_EMOJI_REACTION};
