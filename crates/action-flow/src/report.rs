//! Run report

use crate::state::ScenarioState;
use action_primitives::InteractionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub reached: ScenarioState,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a scenario run, complete or partial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Last state reached by a flow step. Closing is recorded in `steps` only.
    pub final_state: ScenarioState,

    /// Whether the browser was released
    pub closed: bool,

    pub steps: Vec<StepRecord>,

    /// Fallbacks taken and optional elements skipped
    pub interactions: Vec<InteractionRecord>,

    /// Error that aborted the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            final_state: ScenarioState::NotStarted,
            closed: false,
            steps: Vec::new(),
            interactions: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.final_state.is_complete()
    }

    pub fn fallback_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|record| {
                matches!(
                    record.event,
                    action_primitives::InteractionEvent::FallbackUsed { .. }
                )
            })
            .count()
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    pub(crate) fn record_step(&mut self, step: &str, reached: ScenarioState, duration_ms: u64) {
        self.final_state = reached;
        self.steps.push(StepRecord {
            step: step.to_string(),
            reached,
            duration_ms,
            finished_at: Utc::now(),
        });
    }

    /// Append the terminal `Closed` step without touching `final_state`
    pub(crate) fn record_close(&mut self, duration_ms: u64) {
        self.steps.push(StepRecord {
            step: "close".to_string(),
            reached: ScenarioState::Closed,
            duration_ms,
            finished_at: Utc::now(),
        });
    }

    pub(crate) fn finish(&mut self, interactions: Vec<InteractionRecord>, closed: bool) {
        self.interactions = interactions;
        self.closed = closed;
        self.finished_at = Some(Utc::now());
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::InteractionEvent;

    #[test]
    fn test_report_tracks_steps() {
        let mut report = RunReport::new();
        report.record_step("open_browser", ScenarioState::BrowserReady, 120);
        report.record_step("goto_storefront", ScenarioState::OnTargetPage, 2100);

        assert_eq!(report.final_state, ScenarioState::OnTargetPage);
        assert_eq!(report.steps.len(), 2);
        assert!(!report.is_success());
    }

    #[test]
    fn test_close_step_keeps_final_state() {
        let mut report = RunReport::new();
        report.record_step("verify_auth_redirect", ScenarioState::AuthRedirectVerified, 10);
        report.record_close(5);

        assert_eq!(report.final_state, ScenarioState::AuthRedirectVerified);
        assert_eq!(report.steps.last().map(|s| s.reached), Some(ScenarioState::Closed));
    }

    #[test]
    fn test_report_serializes() {
        let mut report = RunReport::new();
        report.record_step("verify_auth_redirect", ScenarioState::AuthRedirectVerified, 10);
        report.finish(
            vec![InteractionRecord::new(
                "btn_Card",
                InteractionEvent::FallbackUsed {
                    primary: "click".to_string(),
                    fallback: "script-click".to_string(),
                    primary_error: "obstructed: overlay".to_string(),
                },
            )],
            true,
        );

        assert!(report.is_success());
        assert_eq!(report.fallback_count(), 1);
        assert!(report.duration_ms().is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["final_state"], "auth_redirect_verified");
        assert_eq!(json["interactions"][0]["event"]["kind"], "fallback-used");
        assert!(json.get("error").is_none());
    }
}
