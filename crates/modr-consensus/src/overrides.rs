//! Super-moderator override.
//!
//! The content's original creator may, once, replace the community outcome.
//! Their decision is always decisive for the status; the 51/49 blend only
//! sets the scores that settlement weighs by.
//!
//! Authorization and single-use bookkeeping are the caller's job.  The caller
//! states what it checked in an [`OverrideAuthorization`]; a grant that does
//! not hold is a contract breach and fails with `UnauthorizedOverride`.

use modr_types::{
    Atto, EngineError, EvaluationResult, OrOverflow, Participant, Provenance, ResolutionStatus,
    VoteDecision, WalletId,
};
use serde::{Deserialize, Serialize};

/// Weight of the community score in the blend, in percent.
pub const COMMUNITY_WEIGHT_PCT: u128 = 49;
/// Weight of the super-moderator score in the blend, in percent.
pub const SUPER_MODERATOR_WEIGHT_PCT: u128 = 51;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideDecision {
    Validated,
    Rejected,
}

impl OverrideDecision {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            OverrideDecision::Validated => ResolutionStatus::Validated,
            OverrideDecision::Rejected => ResolutionStatus::Rejected,
        }
    }
}

/// What the caller verified before invoking the override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAuthorization {
    pub invoker: WalletId,
    /// Wallet registered as the content's original creator.
    pub creator: WalletId,
    /// An override was already applied to this content item.
    pub already_used: bool,
}

impl OverrideAuthorization {
    pub fn is_valid(&self) -> bool {
        !self.already_used && !self.invoker.is_empty() && self.invoker == self.creator
    }
}

/// A complete override submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub decision: OverrideDecision,
    pub super_moderator_score: Atto,
    /// The community result's `score_accept` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_score: Option<Atto>,
    pub auth: OverrideAuthorization,
}

impl OverrideRequest {
    /// Apply this request to a community result.
    pub fn apply(&self, community: &EvaluationResult) -> Result<EvaluationResult, EngineError> {
        override_decision(
            community,
            self.community_score.unwrap_or(community.score_accept),
            self.super_moderator_score,
            self.decision,
            &self.auth,
        )
    }
}

/// Replace the community outcome with the super-moderator's.
///
/// Both scores are accept-side scores in `[0, 1]`.
/// `final = 0.49 * community_score + 0.51 * super_moderator_score`, floored;
/// `score_accept = final`, `score_reject = 1 - final`.  `quorum_met` is carried
/// over from the community result so quorum-dependent settlement rules still
/// see the organic vote count.
pub fn override_decision(
    community: &EvaluationResult,
    community_score: Atto,
    super_moderator_score: Atto,
    decision: OverrideDecision,
    auth: &OverrideAuthorization,
) -> Result<EvaluationResult, EngineError> {
    if !auth.is_valid() {
        tracing::warn!(invoker = %auth.invoker, "override rejected: not authorized");
        return Err(EngineError::UnauthorizedOverride {
            invoker: auth.invoker.clone(),
        });
    }
    for (name, score) in [
        ("community_score", community_score),
        ("super_moderator_score", super_moderator_score),
    ] {
        if score > Atto::ONE {
            return Err(EngineError::invalid_input(format!(
                "{name} {score} is outside [0, 1]"
            )));
        }
    }

    let blended = community_score
        .mul_frac(COMMUNITY_WEIGHT_PCT, 1)
        .zip(super_moderator_score.mul_frac(SUPER_MODERATOR_WEIGHT_PCT, 1))
        .and_then(|(c, s)| c.checked_add(s))
        .and_then(|sum| sum.mul_frac(1, 100))
        .or_overflow("override blend")?;
    let score_accept = blended.clamp_unit();
    let score_reject = Atto::ONE
        .checked_sub(score_accept)
        .or_overflow("override blend")?;

    let status = decision.status();
    tracing::info!(
        from = %community.status,
        to = %status,
        score_accept = %score_accept,
        "super-moderator override applied"
    );

    Ok(EvaluationResult {
        status,
        score_accept,
        score_reject,
        victory_factor: score_accept.abs_diff(score_reject).clamp_unit(),
        reason: None,
        quorum_met: community.quorum_met,
        provenance: Provenance::Override,
    })
}

/// Stake-weighted mean of the 1–100 scores given by Accept voters, as a
/// ratio in `[0, 1]`.  Zero when nobody scored.
///
/// This rates the content among those who accepted it and says nothing about
/// how many rejected it, so it is never used as an implicit community score.
/// Callers may pass it explicitly in an [`OverrideRequest`].
///
/// Scores on Reject/Abstain votes are ignored; a score outside 1..=100 on an
/// Accept vote is invalid input.
pub fn community_score(participants: &[Participant]) -> Result<Atto, EngineError> {
    let mut weighted = Atto::ZERO;
    let mut stake = Atto::ZERO;
    for p in participants {
        if p.vote != VoteDecision::Accept {
            continue;
        }
        let Some(score) = p.score else { continue };
        if !(1..=100).contains(&score) {
            return Err(EngineError::invalid_input(format!(
                "score {score} from '{}' is outside 1..=100",
                p.wallet
            )));
        }
        weighted = p
            .stake_amount
            .mul_frac(u128::from(score), 100)
            .and_then(|w| weighted.checked_add(w))
            .or_overflow("community score")?;
        stake = stake
            .checked_add(p.stake_amount)
            .or_overflow("community score")?;
    }
    if stake.is_zero() {
        return Ok(Atto::ZERO);
    }
    weighted.ratio_of(stake).or_overflow("community score")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> OverrideAuthorization {
        OverrideAuthorization {
            invoker: "creator".into(),
            creator: "creator".into(),
            already_used: false,
        }
    }

    #[test]
    fn grant_must_match_creator_and_be_unused() {
        assert!(auth().is_valid());
        let mut other = auth();
        other.invoker = "someone".into();
        assert!(!other.is_valid());
        let mut used = auth();
        used.already_used = true;
        assert!(!used.is_valid());
    }

    #[test]
    fn community_score_is_stake_weighted() {
        let roster = vec![
            Participant::new("a", Atto::from_units(3), 10, VoteDecision::Accept).with_score(80),
            Participant::new("b", Atto::from_units(1), 10, VoteDecision::Accept).with_score(40),
            Participant::new("c", Atto::from_units(9), 10, VoteDecision::Reject).with_score(1),
        ];
        // (3*0.8 + 1*0.4) / 4 = 0.7
        assert_eq!(community_score(&roster).unwrap(), "0.7".parse().unwrap());
    }

    #[test]
    fn out_of_range_score_is_invalid() {
        let roster =
            vec![Participant::new("a", Atto::ONE, 10, VoteDecision::Accept).with_score(101)];
        assert_eq!(
            community_score(&roster).unwrap_err().code(),
            "INVALID_INPUT"
        );
    }

    fn community(score_accept: &str) -> EvaluationResult {
        let score_accept: Atto = score_accept.parse().unwrap();
        EvaluationResult {
            status: ResolutionStatus::InProgress,
            score_accept,
            score_reject: Atto::ONE.checked_sub(score_accept).unwrap(),
            victory_factor: Atto::ZERO,
            reason: None,
            quorum_met: true,
            provenance: Provenance::Community,
        }
    }

    fn request(super_moderator_score: Atto, community_score: Option<Atto>) -> OverrideRequest {
        OverrideRequest {
            decision: OverrideDecision::Validated,
            super_moderator_score,
            community_score,
            auth: auth(),
        }
    }

    #[test]
    fn request_defaults_to_community_score_accept() {
        // 0.49 * 0.5 + 0.51 * 1
        let r = request(Atto::ONE, None).apply(&community("0.5")).unwrap();
        assert_eq!(r.score_accept, "0.755".parse().unwrap());
        assert_eq!(r.status, ResolutionStatus::Validated);
    }

    #[test]
    fn rejecting_community_is_not_blended_as_approval() {
        // Accept voters rated it 100, but the community leans 0.2 accept.
        let roster = vec![
            Participant::new("fan", Atto::ONE, 10, VoteDecision::Accept).with_score(100),
            Participant::new("critic", Atto::from_units(4), 10, VoteDecision::Reject),
        ];
        assert_eq!(community_score(&roster).unwrap(), Atto::ONE);

        let r = request(Atto::ZERO, None).apply(&community("0.2")).unwrap();
        assert_eq!(r.score_accept, "0.098".parse().unwrap());

        let explicit = request(Atto::ZERO, Some("0.5".parse().unwrap()))
            .apply(&community("0.2"))
            .unwrap();
        assert_eq!(explicit.score_accept, "0.245".parse().unwrap());
    }

    #[test]
    fn nobody_scored_is_zero() {
        assert_eq!(community_score(&[]).unwrap(), Atto::ZERO);
    }
}
