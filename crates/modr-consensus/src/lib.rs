//! modr-consensus
//!
//! Decides whether a submitted story or completion is accepted:
//! - staker classification; Ineligible stakes carry no weight
//! - requirement gate (quorum + stake covering the mint value)
//! - hybrid vote/stake scoring with an `r : 1` supermajority threshold
//! - deadline auto-resolve policy
//! - super-moderator override (51/49 blend, decisive status)
//!
//! Deterministic, pure logic. No IO, no clock, no persistence; the caller
//! supplies `now` and persists the result.

mod context;
mod eligibility;
mod evaluator;
mod overrides;

pub use context::{deadline_from, DecisionContext};
pub use eligibility::classify;
pub use evaluator::evaluate;
pub use overrides::{
    community_score, override_decision, OverrideAuthorization, OverrideDecision,
    OverrideRequest, COMMUNITY_WEIGHT_PCT, SUPER_MODERATOR_WEIGHT_PCT,
};
