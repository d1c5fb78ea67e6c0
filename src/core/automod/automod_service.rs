// Automod engine - orchestrates matcher, escalation policy, config store
// and enforcement port for every inbound message.
//
// NO Discord dependencies here - side effects go through the EnforcementPort
// trait, so the whole engine is unit-testable with a recording stub.

use super::audit::AuditLogger;
use super::automod_models::{
    AuditEntry, AuditSeverity, EnforcementAction, EscalationConfig, GuildConfig, MessageRef,
    ModerationOutcome, PlannedAction, ViolationEvent,
};
use super::config_store::{AutomodError, GuildConfigStore};
use super::escalation::EscalationPolicy;
use super::matcher::find_blocked_term;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Platform API error: {0}")]
    Api(String),
}

/// Side-effect port for enforcement actions.
///
/// The engine never talks to the platform directly; every delete, notice,
/// timeout, kick and audit embed goes through this trait. The live
/// implementation wraps the Discord HTTP client; tests use a recorder.
#[async_trait]
pub trait EnforcementPort: Send + Sync {
    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError>;

    async fn send_notice(&self, channel_id: u64, text: &str) -> Result<(), PlatformError>;

    async fn apply_timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        duration: Duration,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn kick(&self, guild_id: u64, user_id: u64, reason: &str) -> Result<(), PlatformError>;

    async fn publish_audit(&self, channel_id: u64, entry: &AuditEntry)
        -> Result<(), PlatformError>;
}

/// The moderation engine.
///
/// One `handle_message` pass per inbound message: load config, match the
/// denylist, increment the counter in a single read-modify-write, plan the
/// escalation, dispatch. All administrative operations are thin wrappers
/// around `GuildConfigStore::mutate`.
pub struct AutomodService<S: GuildConfigStore, P: EnforcementPort> {
    store: S,
    port: Arc<P>,
    policy: EscalationPolicy,
}

impl<S: GuildConfigStore, P: EnforcementPort> AutomodService<S, P> {
    pub fn new(store: S, port: Arc<P>, escalation: EscalationConfig) -> Self {
        Self {
            store,
            port,
            policy: EscalationPolicy::new(escalation),
        }
    }

    pub fn escalation(&self) -> &EscalationConfig {
        self.policy.config()
    }

    /// Run one message through the word filter.
    ///
    /// Exactly one store mutation happens on a match, and it both increments
    /// the count and reads back the new value, so concurrent violations by
    /// the same user can never lose an increment. Dispatch failures are
    /// logged per action and never abort the remaining actions; a storage
    /// failure aborts before any side effect.
    pub async fn handle_message(
        &self,
        guild_id: u64,
        user_id: u64,
        content: &str,
        message: MessageRef,
    ) -> Result<ModerationOutcome, AutomodError> {
        let config = self.store.ensure(guild_id).await?;

        if !config.moderation_enabled {
            return Ok(ModerationOutcome::Ignored);
        }

        let matched_term = match find_blocked_term(content, &config.denylist) {
            Some(term) => term.to_string(),
            None => return Ok(ModerationOutcome::NoMatch),
        };

        let updated = self
            .store
            .mutate(
                guild_id,
                Box::new(move |config| {
                    let count = config.violation_counts.entry(user_id).or_insert(0);
                    *count = count.saturating_add(1);
                }),
            )
            .await?;
        let violation_count = updated
            .violation_counts
            .get(&user_id)
            .copied()
            .unwrap_or(0);

        let event = ViolationEvent {
            guild_id,
            user_id,
            matched_term: matched_term.clone(),
            count_after_increment: violation_count,
            timestamp: Utc::now(),
        };

        let actions = self.realize_actions(&event);
        // A kick supersedes a timeout on the platform; both stay in the
        // action list (and the audit trail), but the timeout call is skipped.
        let kick_queued = actions
            .iter()
            .any(|a| matches!(a, EnforcementAction::Kick { .. }));
        for action in &actions {
            if kick_queued && matches!(action, EnforcementAction::Timeout { .. }) {
                tracing::debug!(
                    guild_id,
                    user_id,
                    "Skipping timeout dispatch: kick queued in the same pass"
                );
                continue;
            }
            self.dispatch(action, &updated, &event, &message).await;
        }

        Ok(ModerationOutcome::Enforced {
            matched_term,
            violation_count,
            actions,
        })
    }

    /// Fill in concrete payloads for the planned action kinds.
    fn realize_actions(&self, event: &ViolationEvent) -> Vec<EnforcementAction> {
        let count = event.count_after_increment;

        self.policy
            .actions_for(count)
            .into_iter()
            .map(|planned| match planned {
                PlannedAction::DeleteMessage => EnforcementAction::DeleteMessage,
                PlannedAction::SendNotice => EnforcementAction::SendNotice {
                    text: format!(
                        "<@{}>, you've said a blacklisted word and have been \
                         automatically warned. You now have {} warning(s).",
                        event.user_id, count
                    ),
                },
                PlannedAction::Timeout { duration } => EnforcementAction::Timeout {
                    duration,
                    reason: format!(
                        "Received a {} timeout at {} warnings",
                        format_duration(duration),
                        count
                    ),
                },
                PlannedAction::Kick => EnforcementAction::Kick {
                    reason: "You've received too many warnings.".to_string(),
                },
                PlannedAction::AuditEntry { severity } => {
                    let detail = match severity {
                        AuditSeverity::Warning => "Message deleted and user notified.".to_string(),
                        AuditSeverity::Timeout => format!(
                            "Timed out for {}.",
                            format_duration(
                                self.policy.config().timeout_schedule.duration_for(count)
                            )
                        ),
                        AuditSeverity::Critical => {
                            format!("Kicked after reaching {} violations.", count)
                        }
                    };
                    EnforcementAction::AuditEntry(AuditLogger::entry_for(event, severity, detail))
                }
            })
            .collect()
    }

    /// Dispatch one action, logging (but not propagating) platform failures.
    async fn dispatch(
        &self,
        action: &EnforcementAction,
        config: &GuildConfig,
        event: &ViolationEvent,
        message: &MessageRef,
    ) {
        let result = match action {
            EnforcementAction::DeleteMessage => self.port.delete_message(message).await,
            EnforcementAction::SendNotice { text } => {
                self.port.send_notice(message.channel_id, text).await
            }
            EnforcementAction::Timeout { duration, reason } => {
                self.port
                    .apply_timeout(event.guild_id, event.user_id, *duration, reason)
                    .await
            }
            EnforcementAction::Kick { reason } => {
                self.port.kick(event.guild_id, event.user_id, reason).await
            }
            EnforcementAction::AuditEntry(entry) => {
                // Audit delivery handles its own failures (best-effort).
                AuditLogger::record(self.port.as_ref(), config, event.guild_id, entry).await;
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::warn!(
                guild_id = event.guild_id,
                user_id = event.user_id,
                ?action,
                "Enforcement action failed: {}",
                err
            );
        }
    }

    // ------------------------------------------------------------------
    // Administrative operations - all single mutate calls.
    // ------------------------------------------------------------------

    /// Current config for a guild (created with defaults if new).
    pub async fn config(&self, guild_id: u64) -> Result<GuildConfig, AutomodError> {
        self.store.ensure(guild_id).await
    }

    /// Add terms to the denylist. Terms are trimmed and lowercased; empty
    /// terms are dropped and duplicates are ignored, so the operation is an
    /// idempotent union.
    pub async fn add_blacklisted_words(
        &self,
        guild_id: u64,
        words: Vec<String>,
    ) -> Result<GuildConfig, AutomodError> {
        self.store
            .mutate(
                guild_id,
                Box::new(move |config| {
                    for word in words {
                        let term = word.trim().to_lowercase();
                        if !term.is_empty() && !config.denylist.contains(&term) {
                            config.denylist.push(term);
                        }
                    }
                }),
            )
            .await
    }

    /// Remove every term from the denylist.
    pub async fn clear_blacklist(&self, guild_id: u64) -> Result<GuildConfig, AutomodError> {
        self.store
            .mutate(guild_id, Box::new(|config| config.denylist.clear()))
            .await
    }

    /// The denylist in insertion order.
    pub async fn current_blacklist(&self, guild_id: u64) -> Result<Vec<String>, AutomodError> {
        Ok(self.store.ensure(guild_id).await?.denylist)
    }

    /// Turn the word filter on or off for a guild.
    pub async fn set_enabled(&self, guild_id: u64, enabled: bool) -> Result<GuildConfig, AutomodError> {
        self.store
            .mutate(
                guild_id,
                Box::new(move |config| config.moderation_enabled = enabled),
            )
            .await
    }

    /// Point audit entries at a channel, or disable them with `None`.
    pub async fn set_audit_channel(
        &self,
        guild_id: u64,
        channel_id: Option<u64>,
    ) -> Result<GuildConfig, AutomodError> {
        self.store
            .mutate(
                guild_id,
                Box::new(move |config| config.audit_channel_id = channel_id),
            )
            .await
    }

    /// Manually warn a user. Returns the new count. Does not fire
    /// enforcement actions; moderators issue those explicitly.
    pub async fn add_warning(&self, guild_id: u64, user_id: u64) -> Result<u32, AutomodError> {
        let config = self
            .store
            .mutate(
                guild_id,
                Box::new(move |config| {
                    let count = config.violation_counts.entry(user_id).or_insert(0);
                    *count = count.saturating_add(1);
                }),
            )
            .await?;
        Ok(config.violation_counts.get(&user_id).copied().unwrap_or(0))
    }

    /// Clear warnings for a user: `None` resets to zero, `Some(n)` removes
    /// up to `n`, never going below zero. Returns the new count.
    pub async fn clear_warnings(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: Option<u32>,
    ) -> Result<u32, AutomodError> {
        let config = self
            .store
            .mutate(
                guild_id,
                Box::new(move |config| match amount {
                    None => {
                        config.violation_counts.remove(&user_id);
                    }
                    Some(n) => {
                        if let Some(count) = config.violation_counts.get_mut(&user_id) {
                            *count = count.saturating_sub(n);
                        }
                    }
                }),
            )
            .await?;
        Ok(config.violation_counts.get(&user_id).copied().unwrap_or(0))
    }

    /// Current warning count for a user.
    pub async fn get_warnings(&self, guild_id: u64, user_id: u64) -> Result<u32, AutomodError> {
        Ok(self
            .store
            .ensure(guild_id)
            .await?
            .violation_counts
            .get(&user_id)
            .copied()
            .unwrap_or(0))
    }
}

/// Human-readable duration for notices and audit bodies.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs % 3600 == 0 && secs >= 3600 {
        let hours = secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        let minutes = secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::automod::automod_models::TimeoutSchedule;
    use crate::infra::automod::InMemoryConfigStore;
    use std::sync::Mutex;

    /// What the recording port saw, in dispatch order.
    #[derive(Debug, Clone, PartialEq)]
    enum PortCall {
        Delete(u64),
        Notice(u64, String),
        Timeout(u64, u64, Duration),
        Kick(u64, u64),
        Audit(u64, AuditSeverity),
    }

    /// EnforcementPort stub that records every call and can be told to fail
    /// individual operations.
    #[derive(Default)]
    struct RecordingPort {
        calls: Mutex<Vec<PortCall>>,
        fail_delete: bool,
        fail_audit: bool,
    }

    impl RecordingPort {
        fn calls(&self) -> Vec<PortCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EnforcementPort for RecordingPort {
        async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError> {
            self.calls
                .lock()
                .unwrap()
                .push(PortCall::Delete(message.message_id));
            if self.fail_delete {
                return Err(PlatformError::PermissionDenied("missing manage messages".into()));
            }
            Ok(())
        }

        async fn send_notice(&self, channel_id: u64, text: &str) -> Result<(), PlatformError> {
            self.calls
                .lock()
                .unwrap()
                .push(PortCall::Notice(channel_id, text.to_string()));
            Ok(())
        }

        async fn apply_timeout(
            &self,
            guild_id: u64,
            user_id: u64,
            duration: Duration,
            _reason: &str,
        ) -> Result<(), PlatformError> {
            self.calls
                .lock()
                .unwrap()
                .push(PortCall::Timeout(guild_id, user_id, duration));
            Ok(())
        }

        async fn kick(&self, guild_id: u64, user_id: u64, _reason: &str) -> Result<(), PlatformError> {
            self.calls.lock().unwrap().push(PortCall::Kick(guild_id, user_id));
            Ok(())
        }

        async fn publish_audit(
            &self,
            channel_id: u64,
            entry: &AuditEntry,
        ) -> Result<(), PlatformError> {
            self.calls
                .lock()
                .unwrap()
                .push(PortCall::Audit(channel_id, entry.severity));
            if self.fail_audit {
                return Err(PlatformError::NotFound("audit channel deleted".into()));
            }
            Ok(())
        }
    }

    const GUILD: u64 = 100;
    const USER: u64 = 7;
    const CHANNEL: u64 = 55;

    fn message(id: u64) -> MessageRef {
        MessageRef {
            guild_id: GUILD,
            channel_id: CHANNEL,
            message_id: id,
        }
    }

    fn service_with(
        port: Arc<RecordingPort>,
    ) -> AutomodService<InMemoryConfigStore, RecordingPort> {
        AutomodService::new(InMemoryConfigStore::new(), port, EscalationConfig::default())
    }

    async fn seed_denylist(
        service: &AutomodService<InMemoryConfigStore, RecordingPort>,
        words: &[&str],
    ) {
        service
            .add_blacklisted_words(GUILD, words.iter().map(|w| w.to_string()).collect())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn clean_message_is_no_match_and_leaves_count_alone() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        let outcome = service
            .handle_message(GUILD, USER, "a perfectly fine message", message(1))
            .await
            .unwrap();

        assert!(matches!(outcome, ModerationOutcome::NoMatch));
        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 0);
        assert!(port.calls().is_empty());
    }

    #[tokio::test]
    async fn first_violation_deletes_notifies_and_increments_once() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        let outcome = service
            .handle_message(GUILD, USER, "this is SPAM", message(1))
            .await
            .unwrap();

        match outcome {
            ModerationOutcome::Enforced {
                matched_term,
                violation_count,
                actions,
            } => {
                assert_eq!(matched_term, "spam");
                assert_eq!(violation_count, 1);
                assert_eq!(actions.len(), 3); // delete, notice, warning audit
            }
            other => panic!("expected Enforced, got {:?}", other),
        }

        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 1);
        // No audit channel configured, so the audit entry was dropped.
        assert_eq!(
            port.calls(),
            vec![
                PortCall::Delete(1),
                PortCall::Notice(CHANNEL, format!(
                    "<@{}>, you've said a blacklisted word and have been \
                     automatically warned. You now have 1 warning(s).",
                    USER
                )),
            ]
        );
    }

    #[tokio::test]
    async fn third_violation_adds_a_timeout() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        for i in 1..=3 {
            service
                .handle_message(GUILD, USER, "spam again", message(i))
                .await
                .unwrap();
        }

        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 3);
        assert!(port
            .calls()
            .contains(&PortCall::Timeout(GUILD, USER, Duration::from_secs(300))));
    }

    #[tokio::test]
    async fn escalating_schedule_flows_through_to_the_port() {
        let port = Arc::new(RecordingPort::default());
        let service = AutomodService::new(
            InMemoryConfigStore::new(),
            Arc::clone(&port),
            EscalationConfig {
                timeout_schedule: TimeoutSchedule::EscalatingHours,
                ..Default::default()
            },
        );
        seed_denylist(&service, &["spam"]).await;

        for i in 1..=6 {
            service
                .handle_message(GUILD, USER, "spam", message(i))
                .await
                .unwrap();
        }

        // 3rd violation: 2 hours. 6th violation: 5 hours.
        let timeouts: Vec<_> = port
            .calls()
            .into_iter()
            .filter(|c| matches!(c, PortCall::Timeout(..)))
            .collect();
        assert_eq!(
            timeouts,
            vec![
                PortCall::Timeout(GUILD, USER, Duration::from_secs(2 * 3600)),
                PortCall::Timeout(GUILD, USER, Duration::from_secs(5 * 3600)),
            ]
        );
    }

    #[tokio::test]
    async fn kick_threshold_kicks() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        for i in 1..=10 {
            service
                .handle_message(GUILD, USER, "spam", message(i))
                .await
                .unwrap();
        }

        assert!(port.calls().contains(&PortCall::Kick(GUILD, USER)));
    }

    #[tokio::test]
    async fn kick_supersedes_timeout_at_dispatch_but_both_are_reported() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        // 12 violations: a timeout multiple past the kick threshold.
        let mut last = None;
        for i in 1..=12 {
            last = Some(
                service
                    .handle_message(GUILD, USER, "spam", message(i))
                    .await
                    .unwrap(),
            );
        }

        let ModerationOutcome::Enforced { actions, .. } = last.unwrap() else {
            panic!("expected Enforced");
        };
        assert!(actions
            .iter()
            .any(|a| matches!(a, EnforcementAction::Timeout { .. })));
        assert!(actions
            .iter()
            .any(|a| matches!(a, EnforcementAction::Kick { .. })));

        // Timeouts were dispatched at 3, 6 and 9 only; the 12th pass kicked
        // instead of also calling the timeout endpoint.
        let calls = port.calls();
        let timeout_calls = calls
            .iter()
            .filter(|c| matches!(c, PortCall::Timeout(..)))
            .count();
        assert_eq!(timeout_calls, 3);
        let kick_calls = calls
            .iter()
            .filter(|c| matches!(c, PortCall::Kick(..)))
            .count();
        // Kicks at 10, 11 and 12.
        assert_eq!(kick_calls, 3);
    }

    #[tokio::test]
    async fn disabled_guild_ignores_matching_content() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;
        service.set_enabled(GUILD, false).await.unwrap();

        let outcome = service
            .handle_message(GUILD, USER, "pure spam", message(1))
            .await
            .unwrap();

        assert!(matches!(outcome, ModerationOutcome::Ignored));
        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 0);
        assert!(port.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_does_not_stop_the_notice() {
        let port = Arc::new(RecordingPort {
            fail_delete: true,
            ..Default::default()
        });
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;

        let outcome = service
            .handle_message(GUILD, USER, "spam", message(1))
            .await
            .unwrap();

        // Still an enforced outcome, counter still incremented, notice sent.
        assert!(matches!(outcome, ModerationOutcome::Enforced { .. }));
        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 1);
        assert!(port
            .calls()
            .iter()
            .any(|c| matches!(c, PortCall::Notice(..))));
    }

    #[tokio::test]
    async fn audit_entries_reach_a_configured_channel() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;
        service.set_audit_channel(GUILD, Some(999)).await.unwrap();

        service
            .handle_message(GUILD, USER, "spam", message(1))
            .await
            .unwrap();

        assert!(port
            .calls()
            .contains(&PortCall::Audit(999, AuditSeverity::Warning)));
    }

    #[tokio::test]
    async fn audit_delivery_failure_is_swallowed() {
        let port = Arc::new(RecordingPort {
            fail_audit: true,
            ..Default::default()
        });
        let service = service_with(Arc::clone(&port));
        seed_denylist(&service, &["spam"]).await;
        service.set_audit_channel(GUILD, Some(999)).await.unwrap();

        let outcome = service
            .handle_message(GUILD, USER, "spam", message(1))
            .await
            .unwrap();

        assert!(matches!(outcome, ModerationOutcome::Enforced { .. }));
    }

    #[tokio::test]
    async fn concurrent_violations_never_lose_an_increment() {
        let port = Arc::new(RecordingPort::default());
        let service = Arc::new(service_with(Arc::clone(&port)));
        seed_denylist(&service, &["spam"]).await;

        let mut handles = Vec::new();
        for i in 0..16u64 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .handle_message(GUILD, USER, "spam", message(i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn denylist_union_is_idempotent() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(port);

        seed_denylist(&service, &["Spam", "  SCAM  ", "spam", ""]).await;
        seed_denylist(&service, &["spam"]).await;

        assert_eq!(
            service.current_blacklist(GUILD).await.unwrap(),
            vec!["spam", "scam"]
        );
    }

    #[tokio::test]
    async fn manual_warnings_adjust_and_reset() {
        let port = Arc::new(RecordingPort::default());
        let service = service_with(port);

        assert_eq!(service.add_warning(GUILD, USER).await.unwrap(), 1);
        assert_eq!(service.add_warning(GUILD, USER).await.unwrap(), 2);
        assert_eq!(service.add_warning(GUILD, USER).await.unwrap(), 3);

        // Subtract two, floor at zero.
        assert_eq!(service.clear_warnings(GUILD, USER, Some(2)).await.unwrap(), 1);
        assert_eq!(service.clear_warnings(GUILD, USER, Some(5)).await.unwrap(), 0);

        service.add_warning(GUILD, USER).await.unwrap();
        assert_eq!(service.clear_warnings(GUILD, USER, None).await.unwrap(), 0);
        assert_eq!(service.get_warnings(GUILD, USER).await.unwrap(), 0);
    }
}
