pub mod command_handler;
pub mod commands;
pub mod config;
pub mod discord_host;
pub mod emoji_image;
pub mod emoji_name;
pub mod emoji_workflow;
pub mod image_gen;
pub mod message_components;
pub mod response_channel;
pub mod services;
pub mod sessions;
pub mod static_library;
