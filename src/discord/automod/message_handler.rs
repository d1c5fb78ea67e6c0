// Discord-specific message glue - runs every inbound guild message through
// the automod engine.

use crate::core::automod::{MessageRef, ModerationOutcome};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Check a message against the guild's word filter.
///
/// Returns `true` if the message violated the filter and was handled.
pub async fn handle_message_for_automod(
    _ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<bool, Error> {
    // Skip bots (including ourselves)
    if msg.author.bot {
        return Ok(false);
    }

    // Only moderate guild messages
    let guild_id = match msg.guild_id {
        Some(id) => id.get(),
        None => return Ok(false),
    };

    let message = MessageRef {
        guild_id,
        channel_id: msg.channel_id.get(),
        message_id: msg.id.get(),
    };

    let outcome = data
        .automod
        .handle_message(guild_id, msg.author.id.get(), &msg.content, message)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    match outcome {
        ModerationOutcome::Ignored | ModerationOutcome::NoMatch => Ok(false),
        ModerationOutcome::Enforced {
            matched_term,
            violation_count,
            ..
        } => {
            tracing::info!(
                guild_id,
                user_id = msg.author.id.get(),
                matched_term = %matched_term,
                violation_count,
                "Automod enforced against a message"
            );
            Ok(true)
        }
    }
}
