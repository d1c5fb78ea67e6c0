// Escalation policy - maps a violation count to the actions it earns.
//
// Pure domain logic. The engine turns the planned kinds into concrete
// actions with payloads; this module only decides WHAT happens at a given
// count, in a fixed order, so dispatch (and test assertions) stay
// deterministic.

use super::automod_models::{AuditSeverity, EscalationConfig, PlannedAction, TIMEOUT_EVERY};

/// Fixed-threshold escalation policy.
///
/// Every violation: delete + notice + warning audit entry.
/// Every `TIMEOUT_EVERY`th violation: a timeout, with the duration taken
/// from the configured schedule.
/// At `kick_threshold` and beyond: a kick. Thresholds are evaluated
/// independently, so a count that is both a timeout multiple and past the
/// kick threshold plans both actions; the enforcement port may skip the
/// timeout when a kick is queued.
pub struct EscalationPolicy {
    config: EscalationConfig,
}

impl EscalationPolicy {
    pub fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    /// Plan the actions for a freshly-incremented violation count.
    pub fn actions_for(&self, count: u32) -> Vec<PlannedAction> {
        let mut actions = vec![
            PlannedAction::DeleteMessage,
            PlannedAction::SendNotice,
            PlannedAction::AuditEntry {
                severity: AuditSeverity::Warning,
            },
        ];

        if count > 0 && count % TIMEOUT_EVERY == 0 {
            actions.push(PlannedAction::Timeout {
                duration: self.config.timeout_schedule.duration_for(count),
            });
            actions.push(PlannedAction::AuditEntry {
                severity: AuditSeverity::Timeout,
            });
        }

        if count >= self.config.kick_threshold {
            actions.push(PlannedAction::Kick);
            actions.push(PlannedAction::AuditEntry {
                severity: AuditSeverity::Critical,
            });
        }

        actions
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(EscalationConfig::default())
    }
}
