// Automod slash commands for configuration and manual warnings.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call the core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::automod::TimeoutSchedule;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Word filter configuration.
#[poise::command(
    slash_command,
    subcommands("status", "enable", "disable", "auditlog"),
    required_permissions = "MANAGE_MESSAGES",
    guild_only
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - subcommands do the work
    Ok(())
}

/// Show the current word filter status.
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let config = ctx
        .data()
        .automod
        .config(guild_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;
    let escalation = ctx.data().automod.escalation();

    let schedule = match escalation.timeout_schedule {
        TimeoutSchedule::FlatFiveMinutes => "5 minute timeout every 3rd violation".to_string(),
        TimeoutSchedule::EscalatingHours => {
            "2h timeout at the 3rd violation, +1h per violation after".to_string()
        }
    };

    let audit = match config.audit_channel_id {
        Some(id) => format!("<#{}>", id),
        None => "not set".to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ Automod Status")
        .color(if config.moderation_enabled {
            0x00FF00
        } else {
            0xFF0000
        })
        .field(
            "Status",
            if config.moderation_enabled {
                "✅ Enabled"
            } else {
                "❌ Disabled"
            },
            false,
        )
        .field(
            "Blacklist",
            format!("{} word(s)", config.denylist.len()),
            true,
        )
        .field("Audit channel", audit, true)
        .field(
            "Escalation",
            format!("{}\nKick at {} violations", schedule, escalation.kick_threshold),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Enable the word filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    ctx.data()
        .automod
        .set_enabled(guild_id, true)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say("✅ Automod has been **enabled**.").await?;
    Ok(())
}

/// Disable the word filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    ctx.data()
        .automod
        .set_enabled(guild_id, false)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say("❌ Automod has been **disabled**.").await?;
    Ok(())
}

/// Set (or clear) the channel that receives audit log embeds.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn auditlog(
    ctx: Context<'_>,
    #[description = "Channel for audit entries (omit to disable)"] channel: Option<
        serenity::Channel,
    >,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();
    let channel_id = channel.as_ref().map(|c| c.id().get());

    ctx.data()
        .automod
        .set_audit_channel(guild_id, channel_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    match channel_id {
        Some(id) => ctx.say(format!("📋 Audit entries will go to <#{}>.", id)).await?,
        None => ctx.say("📋 Audit logging disabled.").await?,
    };
    Ok(())
}

/// Manage the blacklisted word list.
#[poise::command(
    slash_command,
    subcommands("add", "clear", "show"),
    required_permissions = "MANAGE_MESSAGES",
    guild_only
)]
pub async fn blacklist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add words to the blacklist (space-separated).
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The words to blacklist"] words: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let terms: Vec<String> = words.split_whitespace().map(|w| w.to_string()).collect();
    if terms.is_empty() {
        ctx.say("No words given.").await?;
        return Ok(());
    }

    let config = ctx
        .data()
        .automod
        .add_blacklisted_words(guild_id, terms)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!(
        "Added to blacklist. It now has {} word(s).",
        config.denylist.len()
    ))
    .await?;
    Ok(())
}

/// Remove every word from the blacklist.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    ctx.data()
        .automod
        .clear_blacklist(guild_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say("Blacklist has been cleared.").await?;
    Ok(())
}

/// Show the current blacklist.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let blacklist = ctx
        .data()
        .automod
        .current_blacklist(guild_id)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if blacklist.is_empty() {
        ctx.say("The blacklist is empty.").await?;
    } else {
        ctx.say(format!("Current blacklist: {}", blacklist.join(", ")))
            .await?;
    }
    Ok(())
}

/// Manually warn a user.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let count = ctx
        .data()
        .automod
        .add_warning(guild_id, user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!("<@{}> now has {} warning(s).", user.id.get(), count))
        .await?;
    Ok(())
}

/// Clear warnings for a user.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn clearwarn(
    ctx: Context<'_>,
    #[description = "The user to clear warnings for"] user: serenity::User,
    #[description = "How many to remove (omit to reset to zero)"] amount: Option<u32>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let count = ctx
        .data()
        .automod
        .clear_warnings(guild_id, user.id.get(), amount)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.say(format!(
        "Warnings for <@{}> updated. They now have {} warning(s).",
        user.id.get(),
        count
    ))
    .await?;
    Ok(())
}

/// Check a user's warning count.
#[poise::command(slash_command, guild_only)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?.get();

    let count = ctx
        .data()
        .automod
        .get_warnings(guild_id, user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("<@{}> has {} warning(s).", user.id.get(), count))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
