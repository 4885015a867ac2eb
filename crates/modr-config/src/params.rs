use modr_types::EngineError;
use serde::{Deserialize, Serialize};

/// What the evaluator does when the vote window closes undecided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoResolvePolicy {
    /// Hand off to an administrative review (`RequiresEscalation`).
    Escalate,
    /// Ask the caller to push the deadline out by this many hours.
    ExtendByHours(u32),
    AutoAccept,
    AutoReject,
}

/// Consensus evaluator parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigParams {
    /// Minimum number of Accept + Reject votes before any scoring resolves.
    pub min_voters: u32,
    /// `r` in the `r : 1` supermajority rule; the hybrid score must reach
    /// `r / (r + 1)`.
    pub threshold_ratio: u32,
    pub vote_window_hours: u32,
    pub auto_resolve_policy: AutoResolvePolicy,
}

impl Default for ConfigParams {
    fn default() -> Self {
        Self {
            min_voters: 22,
            threshold_ratio: 2,
            vote_window_hours: 168,
            auto_resolve_policy: AutoResolvePolicy::Escalate,
        }
    }
}

impl ConfigParams {
    /// Fail fast on values that would make the evaluator meaningless.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_voters == 0 {
            return Err(EngineError::invalid_config(
                "params.min_voters",
                "must be >= 1",
            ));
        }
        if self.threshold_ratio == 0 {
            return Err(EngineError::invalid_config(
                "params.threshold_ratio",
                "must be >= 1",
            ));
        }
        if self.vote_window_hours == 0 {
            return Err(EngineError::invalid_config(
                "params.vote_window_hours",
                "must be >= 1",
            ));
        }
        if let AutoResolvePolicy::ExtendByHours(0) = self.auto_resolve_policy {
            return Err(EngineError::invalid_config(
                "params.auto_resolve_policy",
                "extend_by_hours must be >= 1",
            ));
        }
        Ok(())
    }

    /// Vote window in seconds.
    pub fn vote_window_secs(&self) -> i64 {
        i64::from(self.vote_window_hours) * 3_600
    }
}
