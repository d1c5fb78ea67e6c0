// Audit trail - formats violation events and ships them to the guild's
// audit channel, if one is configured.
//
// Delivery is best-effort by contract: a guild without an audit channel is
// a no-op, and a failed send is logged and swallowed. Enforcement must
// never stall or fail because the audit channel went away.

use super::automod_models::{AuditEntry, AuditSeverity, GuildConfig, ViolationEvent};
use super::automod_service::EnforcementPort;

pub struct AuditLogger;

impl AuditLogger {
    /// Build the audit entry for a violation event at the given severity.
    pub fn entry_for(event: &ViolationEvent, severity: AuditSeverity, detail: String) -> AuditEntry {
        let title = match severity {
            AuditSeverity::Warning => "Word filter triggered",
            AuditSeverity::Timeout => "Timeout applied",
            AuditSeverity::Critical => "Member kicked",
        };

        AuditEntry {
            title: title.to_string(),
            body: format!(
                "<@{}> matched \"{}\" (violation #{}). {}",
                event.user_id, event.matched_term, event.count_after_increment, detail
            ),
            severity,
            timestamp: event.timestamp,
        }
    }

    /// Dispatch an entry to the guild's audit channel.
    pub async fn record<P: EnforcementPort + ?Sized>(
        port: &P,
        config: &GuildConfig,
        guild_id: u64,
        entry: &AuditEntry,
    ) {
        let Some(channel_id) = config.audit_channel_id else {
            return;
        };

        if let Err(err) = port.publish_audit(channel_id, entry).await {
            tracing::warn!(
                guild_id,
                channel_id,
                severity = %entry.severity,
                "Failed to deliver audit entry: {}",
                err
            );
        }
    }
}
