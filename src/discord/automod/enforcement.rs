// Live EnforcementPort over the Discord HTTP API.
//
// Translates the core's platform-agnostic action calls into serenity
// requests and serenity failures into the core's PlatformError taxonomy.

use crate::core::automod::{AuditEntry, AuditSeverity, EnforcementPort, MessageRef, PlatformError};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub struct SerenityEnforcementPort {
    http: Arc<serenity::Http>,
}

impl SerenityEnforcementPort {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// Map a serenity error onto the core's platform error taxonomy using the
/// HTTP status where one is available.
fn platform_error(err: serenity::Error) -> PlatformError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(ref response)) = err {
        return match response.status_code.as_u16() {
            403 => PlatformError::PermissionDenied(err.to_string()),
            404 => PlatformError::NotFound(err.to_string()),
            429 => PlatformError::RateLimited(err.to_string()),
            _ => PlatformError::Api(err.to_string()),
        };
    }
    PlatformError::Api(err.to_string())
}

fn severity_color(severity: AuditSeverity) -> u32 {
    match severity {
        AuditSeverity::Warning => 0xFFD700,  // Gold
        AuditSeverity::Timeout => 0xFF8C00,  // Dark orange
        AuditSeverity::Critical => 0xFF0000, // Red
    }
}

#[async_trait]
impl EnforcementPort for SerenityEnforcementPort {
    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError> {
        serenity::ChannelId::new(message.channel_id)
            .delete_message(&self.http, serenity::MessageId::new(message.message_id))
            .await
            .map_err(platform_error)
    }

    async fn send_notice(&self, channel_id: u64, text: &str) -> Result<(), PlatformError> {
        serenity::ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(platform_error)
    }

    async fn apply_timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        duration: Duration,
        reason: &str,
    ) -> Result<(), PlatformError> {
        let until = serenity::Timestamp::from_unix_timestamp(
            chrono::Utc::now().timestamp() + duration.as_secs() as i64,
        )
        .map_err(|e| PlatformError::Api(format!("invalid timeout timestamp: {}", e)))?;

        serenity::GuildId::new(guild_id)
            .edit_member(
                &self.http,
                serenity::UserId::new(user_id),
                serenity::EditMember::new()
                    .disable_communication_until_datetime(until)
                    .audit_log_reason(reason),
            )
            .await
            .map(|_| ())
            .map_err(platform_error)
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError> {
        serenity::GuildId::new(guild_id)
            .kick_with_reason(&self.http, serenity::UserId::new(user_id), reason)
            .await
            .map_err(platform_error)
    }

    async fn publish_audit(
        &self,
        channel_id: u64,
        entry: &AuditEntry,
    ) -> Result<(), PlatformError> {
        let embed = serenity::CreateEmbed::new()
            .title(format!("🛡️ {}", entry.title))
            .description(entry.body.clone())
            .color(severity_color(entry.severity))
            .timestamp(
                serenity::Timestamp::from_unix_timestamp(entry.timestamp.timestamp())
                    .unwrap_or_else(|_| serenity::Timestamp::now()),
            )
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Severity: {}",
                entry.severity
            )));

        serenity::ChannelId::new(channel_id)
            .send_message(&self.http, serenity::CreateMessage::new().embed(embed))
            .await
            .map(|_| ())
            .map_err(platform_error)
    }
}
