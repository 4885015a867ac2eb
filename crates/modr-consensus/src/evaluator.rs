use modr_config::{AutoResolvePolicy, ConfigParams};
use modr_types::{
    Atto, EngineError, EvaluationResult, OrOverflow, PendingReason, Provenance, ResolutionStatus,
};
use primitive_types::U256;

use crate::DecisionContext;

// ============================================================================
// Public API
// ============================================================================

/// Evaluate one content item's live tallies.
///
/// Steps, in order:
/// 1. Requirement gate: enough votes AND enough stake to cover the mint value.
/// 2. Hybrid score: equal blend of vote-count ratio and stake ratio.
/// 3. Threshold: `r : 1` supermajority on either side resolves.
/// 4. Deadline: past its deadline, an undecided item follows the
///    auto-resolve policy.  So does an item whose gate is still closed; its
///    result keeps `quorum_met = false`.
/// 5. Victory factor: `|accept - reject|`, reported for settlement only.
///
/// The threshold decision is made on exact rationals built from the raw
/// inputs; the reported scores are floored fixed-point projections of the
/// same values.  Pure: identical inputs give identical output.
pub fn evaluate(
    ctx: &DecisionContext,
    cfg: &ConfigParams,
) -> Result<EvaluationResult, EngineError> {
    cfg.validate()?;

    let votes = ctx.total_votes()?;
    let staked = ctx.total_stake()?;
    let required_stake = ctx.required_stake()?;

    let quorum_met = votes >= u64::from(cfg.min_voters);
    let stake_met = staked >= required_stake;

    let accept_side = (vote_fraction(ctx, true), stake_fraction(ctx, true)?);
    let reject_side = (vote_fraction(ctx, false), stake_fraction(ctx, false)?);

    let (score_accept, score_reject) = hybrid_scores(accept_side)?;
    let victory_factor = score_accept.abs_diff(score_reject).clamp_unit();

    let (status, reason) = if !(quorum_met && stake_met) {
        let gate = gate_reason(votes, cfg.min_voters, quorum_met, staked, required_stake);
        if ctx.deadline_passed() {
            apply_deadline_policy(ctx, cfg)
        } else {
            (ResolutionStatus::PendingRequirements, Some(gate))
        }
    } else {
        match threshold_status(accept_side, reject_side, cfg.threshold_ratio) {
            ResolutionStatus::InProgress if ctx.deadline_passed() => {
                apply_deadline_policy(ctx, cfg)
            }
            decided => (decided, None),
        }
    };

    tracing::debug!(
        status = %status,
        votes,
        quorum_met,
        stake_met,
        score_accept = %score_accept,
        "consensus evaluated"
    );

    Ok(EvaluationResult {
        status,
        score_accept,
        score_reject,
        victory_factor,
        reason,
        quorum_met,
        provenance: Provenance::Community,
    })
}

// ============================================================================
// Scoring
// ============================================================================

type Fraction = (u128, u128);

/// A side's share as an exact fraction.  An empty denominator is neutral (1/2).
fn fraction(part: u128, whole: u128) -> Fraction {
    if whole == 0 {
        (1, 2)
    } else {
        (part, whole)
    }
}

fn vote_fraction(ctx: &DecisionContext, side_accept: bool) -> Fraction {
    let total = u128::from(ctx.accept_votes) + u128::from(ctx.reject_votes);
    let part = if side_accept {
        ctx.accept_votes
    } else {
        ctx.reject_votes
    };
    fraction(u128::from(part), total)
}

fn stake_fraction(ctx: &DecisionContext, side_accept: bool) -> Result<Fraction, EngineError> {
    let total = ctx.total_stake()?.raw();
    let part = if side_accept {
        ctx.stake_accept
    } else {
        ctx.stake_reject
    };
    Ok(fraction(part.raw(), total))
}

/// `(score_accept, score_reject)`; they sum to exactly `Atto::ONE`.
fn hybrid_scores(accept_side: (Fraction, Fraction)) -> Result<(Atto, Atto), EngineError> {
    let ((vn, vd), (sn, sd)) = accept_side;

    let vote_score = Atto::from_ratio(vn, vd).or_overflow("vote score")?;
    let stake_score = Atto::from_ratio(sn, sd).or_overflow("stake score")?;
    let score_accept = vote_score
        .checked_add(stake_score)
        .and_then(|s| s.mul_frac(1, 2))
        .or_overflow("hybrid score")?
        .clamp_unit();
    let score_reject = Atto::ONE
        .checked_sub(score_accept)
        .or_overflow("hybrid score")?;
    Ok((score_accept, score_reject))
}

/// `(vn/vd + sn/sd) / 2 >= r / (r + 1)`, cross-multiplied:
/// `(vn*sd + sn*vd) * (r + 1) >= 2 * r * vd * sd`.
///
/// Every factor is below 2^128 and `r` below 2^32, so both sides fit in 256
/// bits.
fn side_reaches_threshold(vote: Fraction, stake: Fraction, r: u32) -> bool {
    let (vn, vd) = (U256::from(vote.0), U256::from(vote.1));
    let (sn, sd) = (U256::from(stake.0), U256::from(stake.1));
    let r = U256::from(r);

    let lhs = (vn * sd + sn * vd) * (r + U256::one());
    let rhs = U256::from(2u8) * r * vd * sd;
    lhs >= rhs
}

fn threshold_status(
    accept_side: (Fraction, Fraction),
    reject_side: (Fraction, Fraction),
    threshold_ratio: u32,
) -> ResolutionStatus {
    if side_reaches_threshold(accept_side.0, accept_side.1, threshold_ratio) {
        return ResolutionStatus::Validated;
    }
    if side_reaches_threshold(reject_side.0, reject_side.1, threshold_ratio) {
        return ResolutionStatus::Rejected;
    }
    ResolutionStatus::InProgress
}

// ============================================================================
// Gate and deadline
// ============================================================================

fn gate_reason(
    votes: u64,
    min_voters: u32,
    quorum_met: bool,
    staked: Atto,
    required_stake: Atto,
) -> PendingReason {
    match quorum_met {
        false if staked < required_stake => PendingReason::QuorumAndStakeNotReached {
            votes,
            required_votes: min_voters,
            staked,
            required_stake,
        },
        false => PendingReason::QuorumNotReached {
            votes,
            required: min_voters,
        },
        true => PendingReason::StakeBelowMintValue {
            staked,
            required: required_stake,
        },
    }
}

fn apply_deadline_policy(
    ctx: &DecisionContext,
    cfg: &ConfigParams,
) -> (ResolutionStatus, Option<PendingReason>) {
    match cfg.auto_resolve_policy {
        AutoResolvePolicy::Escalate => (ResolutionStatus::RequiresEscalation, None),
        AutoResolvePolicy::ExtendByHours(hours) => {
            let new_deadline = ctx
                .now
                .max(ctx.deadline)
                .saturating_add(i64::from(hours) * 3_600);
            (
                ResolutionStatus::PendingRequirements,
                Some(PendingReason::DeadlineExtended {
                    hours,
                    new_deadline,
                }),
            )
        }
        AutoResolvePolicy::AutoAccept => (ResolutionStatus::Validated, None),
        AutoResolvePolicy::AutoReject => (ResolutionStatus::Rejected, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_two_to_one_reaches_threshold() {
        // 20:10 votes and 2:1 stake is exactly 2/3; flooring must not push it under.
        assert!(side_reaches_threshold((20, 30), (2, 3), 2));
        assert!(!side_reaches_threshold((19, 30), (2, 3), 2));
    }

    #[test]
    fn empty_side_is_neutral() {
        assert_eq!(fraction(0, 0), (1, 2));
        assert_eq!(fraction(3, 4), (3, 4));
    }

    #[test]
    fn large_stakes_do_not_overflow_threshold() {
        let big = u128::MAX / 2;
        assert!(!side_reaches_threshold((30, 40), (big, 2 * big), 2));
        assert!(side_reaches_threshold((40, 40), (big, 2 * big), 2));
    }
}
