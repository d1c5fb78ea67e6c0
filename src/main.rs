// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (storage)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a handful of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::automod::{AutomodService, EscalationConfig, TimeoutSchedule, KICK_THRESHOLD};
use crate::discord::automod::enforcement::SerenityEnforcementPort;
use crate::discord::automod::message_handler::handle_message_for_automod;
use crate::discord::{Data, Error};
use crate::infra::automod::JsonConfigStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
/// This is where inbound messages meet the word filter.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        if let Err(e) = handle_message_for_automod(ctx, new_message, data).await {
            tracing::error!("Error handling message for automod: {}", e);
        }
    }

    Ok(())
}

/// Read the escalation schedule from the environment. Which of the two
/// punishment schedules runs is a deployment decision, not a code change.
fn escalation_from_env() -> EscalationConfig {
    let timeout_schedule = match std::env::var("AUTOMOD_TIMEOUT_SCHEDULE").ok().as_deref() {
        Some("escalating") => TimeoutSchedule::EscalatingHours,
        Some("flat") | None => TimeoutSchedule::FlatFiveMinutes,
        Some(other) => {
            tracing::warn!(
                "Unknown AUTOMOD_TIMEOUT_SCHEDULE '{}', using the flat schedule",
                other
            );
            TimeoutSchedule::FlatFiveMinutes
        }
    };

    let kick_threshold = std::env::var("AUTOMOD_KICK_THRESHOLD")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(KICK_THRESHOLD);

    EscalationConfig {
        timeout_schedule,
        kick_threshold,
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep the runtime config document in a dedicated folder so the repo
    // root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let config_store = JsonConfigStore::new(format!("{}/server_configs.json", data_dir));
    let escalation = escalation_from_env();

    // The enforcement port gets its own HTTP client because the service is
    // built before the gateway client exists.
    let http = Arc::new(serenity::Http::new(&token));
    let port = Arc::new(SerenityEnforcementPort::new(http));
    let automod_service = Arc::new(AutomodService::new(config_store, port, escalation));

    // Create the data structure that will be shared across all commands
    let data = Data {
        automod: Arc::clone(&automod_service),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::automod::commands::automod(),
                discord::automod::commands::blacklist(),
                discord::automod::commands::warn(),
                discord::automod::commands::clearwarn(),
                discord::automod::commands::warnings(),
            ],
            // Event handler for messages
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                println!("🤖 Bot is starting up...");

                // Register slash commands globally (can take up to an hour to
                // propagate). For faster development, use register_in_guild.
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                println!("✅ Commands registered!");
                println!("🚀 Bot is ready!");

                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
