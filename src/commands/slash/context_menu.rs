//! Context menu commands (right-click actions)

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandType;

pub const GENERATE_EMOJI_REACTION: &str = "Generate Emoji Reaction";

/// Creates context menu commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_generate_emoji_reaction_command()]
}

/// Creates the message context menu that starts an emoji reaction
fn create_generate_emoji_reaction_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(GENERATE_EMOJI_REACTION)
        .kind(CommandType::Message)
        .to_owned()
}
