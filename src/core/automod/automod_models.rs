// Automod domain models - data structures for the word-filter system.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts these into Discord-specific API calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Every third violation earns a timeout.
pub const TIMEOUT_EVERY: u32 = 3;

/// Violations at or beyond this count earn a kick.
pub const KICK_THRESHOLD: u32 = 10;

/// Flat timeout length for the baseline schedule.
pub const FLAT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// How timeout durations grow with repeated violations.
///
/// The two variants correspond to the two punishment schedules this bot has
/// shipped with historically; which one is active is a deployment decision,
/// not a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutSchedule {
    /// 5 minutes, every third violation.
    FlatFiveMinutes,
    /// 2 hours at the third violation, plus one hour per violation after that.
    EscalatingHours,
}

impl TimeoutSchedule {
    /// Timeout duration for the given violation count.
    pub fn duration_for(&self, count: u32) -> Duration {
        match self {
            TimeoutSchedule::FlatFiveMinutes => FLAT_TIMEOUT,
            TimeoutSchedule::EscalatingHours => {
                let hours = 2 + count.saturating_sub(TIMEOUT_EVERY) as u64;
                Duration::from_secs(hours * 60 * 60)
            }
        }
    }
}

/// Escalation thresholds, fixed at composition time.
#[derive(Debug, Clone, Copy)]
pub struct EscalationConfig {
    pub timeout_schedule: TimeoutSchedule,
    pub kick_threshold: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            timeout_schedule: TimeoutSchedule::FlatFiveMinutes,
            kick_threshold: KICK_THRESHOLD,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Per-guild moderation configuration, persisted as one entry in the
/// deployment-wide config document.
///
/// Field names stay camelCase so documents written by earlier versions of
/// the bot keep loading. `auditChannelId` was added later; older documents
/// that lack it read as "no audit channel", not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    /// Whether the word filter is active for this guild.
    #[serde(default = "default_enabled")]
    pub moderation_enabled: bool,
    /// Blocked terms, lowercase, insertion-ordered, no duplicates.
    #[serde(default)]
    pub denylist: Vec<String>,
    /// user_id -> cumulative violation count.
    #[serde(default)]
    pub violation_counts: HashMap<u64, u32>,
    /// Channel receiving audit embeds. None = audit entries are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_channel_id: Option<u64>,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            moderation_enabled: true,
            denylist: Vec::new(),
            violation_counts: HashMap::new(),
            audit_channel_id: None,
        }
    }
}

/// Identifies a message on the platform well enough to delete it and to
/// reply in its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

/// One detected denylist hit. Transient - produced by the engine, consumed
/// by the policy and the audit logger, never persisted.
#[derive(Debug, Clone)]
pub struct ViolationEvent {
    pub guild_id: u64,
    pub user_id: u64,
    pub matched_term: String,
    pub count_after_increment: u32,
    pub timestamp: DateTime<Utc>,
}

/// Severity attached to an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSeverity {
    Warning,
    Timeout,
    Critical,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditSeverity::Warning => write!(f, "Warning"),
            AuditSeverity::Timeout => write!(f, "Timeout"),
            AuditSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// Structured audit record sent to the guild's audit channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub title: String,
    pub body: String,
    pub severity: AuditSeverity,
    pub timestamp: DateTime<Utc>,
}

/// Action kinds the escalation policy plans for a violation count.
/// The engine fills in the concrete payloads (notice text, reasons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    DeleteMessage,
    SendNotice,
    Timeout { duration: Duration },
    Kick,
    AuditEntry { severity: AuditSeverity },
}

/// A fully-specified enforcement action, ready to dispatch through the
/// enforcement port.
#[derive(Debug, Clone, PartialEq)]
pub enum EnforcementAction {
    DeleteMessage,
    SendNotice { text: String },
    Timeout { duration: Duration, reason: String },
    Kick { reason: String },
    AuditEntry(AuditEntry),
}

/// Result of running one message through the engine.
#[derive(Debug, Clone)]
pub enum ModerationOutcome {
    /// Moderation is disabled for the guild; nothing was checked or changed.
    Ignored,
    /// No denylisted term was found.
    NoMatch,
    /// A term matched; the counter was incremented and actions dispatched.
    Enforced {
        matched_term: String,
        violation_count: u32,
        actions: Vec<EnforcementAction>,
    },
}
