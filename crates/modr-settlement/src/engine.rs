use std::collections::BTreeSet;

use modr_config::ContentTypeConfig;
use modr_consensus::OverrideRequest;
use modr_types::{
    checked_sum, Atto, ContentClass, EngineError, EvaluationResult, OrOverflow, Participant,
    ParticipantOutcome, SettlementParties, SettlementResult,
};

use crate::classify::check_roster;
use crate::payouts::{distribute, Purse};
use crate::pools::PoolSplit;
use crate::stakers::{settle_pools, PoolRules};

// ============================================================================
// Public API
// ============================================================================

/// Settle a terminal decision.
///
/// `active` and `passive` must be the two staker lists as produced by
/// [`crate::partition_roster`]; Ineligible entries are tolerated in either.
///
/// On success the result balances exactly:
/// `total_paid + platform_pool == total_pool + total_penalties`.
pub fn settle(
    class: ContentClass,
    cfg: &ContentTypeConfig,
    decision: &EvaluationResult,
    parties: &SettlementParties,
    active: &[Participant],
    passive: &[Participant],
) -> Result<SettlementResult, EngineError> {
    cfg.validate(class.as_str())?;
    let winning_vote = decision.status.winning_vote().ok_or_else(|| {
        EngineError::PrematureSettlement {
            status: decision.status.as_str().to_string(),
        }
    })?;
    check_inputs(class, decision, parties)?;
    let (active, passive) = check_roster(active, passive, cfg)?;

    let split = PoolSplit::compute(cfg, parties.winc_per_reference_unit)?;

    let active_rules = PoolRules {
        pool: split.active,
        dampening: Atto::ONE,
        winning_vote,
        victory_factor: decision.victory_factor,
    };
    let passive_rules = PoolRules {
        pool: split.passive,
        dampening: cfg.passive_factor,
        winning_vote,
        victory_factor: decision.victory_factor,
    };
    let (active_pool, passive_pool) =
        settle_pools(&active, &active_rules, &passive, &passive_rules, cfg)?;

    let total_penalties = active_pool
        .penalties
        .checked_add(passive_pool.penalties)
        .or_overflow("penalties")?;
    let remainder = checked_sum([
        split.unallocated_reward,
        active_pool.unspent,
        passive_pool.unspent,
    ])
    .or_overflow("remainder")?;

    let dist = distribute(
        decision,
        class,
        cfg,
        parties,
        split.total,
        Purse {
            remainder,
            platform: split.platform,
        },
    )?;

    let mut participants = active_pool.outcomes;
    participants.extend(passive_pool.outcomes);
    let completer_total =
        checked_sum(dist.completers.iter().map(|c| c.payout)).or_overflow("completer total")?;
    let fixed = dist
        .creator
        .payout
        .checked_add(completer_total)
        .or_overflow("fixed payouts")?;
    let sources = split
        .total
        .checked_add(total_penalties)
        .or_overflow("settlement sources")?;
    let mut platform_pool = dist.platform;
    reconcile(&mut participants, fixed, &mut platform_pool, sources)?;

    let staker_total =
        checked_sum(participants.iter().map(|p| p.payout)).or_overflow("staker total")?;
    let total_paid = staker_total.checked_add(fixed).or_overflow("total paid")?;

    if !dist.shortfall.is_zero() {
        tracing::warn!(
            class = %class,
            shortfall = %dist.shortfall,
            "settlement guarantees not fully funded"
        );
    }
    tracing::debug!(
        class = %class,
        status = %decision.status,
        total_pool = %split.total,
        total_paid = %total_paid,
        platform = %platform_pool,
        penalties = %total_penalties,
        "settlement computed"
    );

    Ok(SettlementResult {
        class,
        status: decision.status,
        provenance: decision.provenance,
        total_pool: split.total,
        reward_pool: split.reward,
        platform_pool,
        active_pool_total: split.active,
        passive_pool_total: split.passive,
        total_paid,
        total_penalties,
        shortfall: dist.shortfall,
        participants,
        creator: dist.creator,
        completers: dist.completers,
    })
}

/// Apply a super-moderator override, then settle its decision.
pub fn override_and_settle(
    community: &EvaluationResult,
    request: &OverrideRequest,
    class: ContentClass,
    cfg: &ContentTypeConfig,
    parties: &SettlementParties,
    active: &[Participant],
    passive: &[Participant],
) -> Result<(EvaluationResult, SettlementResult), EngineError> {
    let decision = request.apply(community)?;
    let settlement = settle(class, cfg, &decision, parties, active, passive)?;
    Ok((decision, settlement))
}

// ============================================================================
// Input checks
// ============================================================================

fn check_inputs(
    class: ContentClass,
    decision: &EvaluationResult,
    parties: &SettlementParties,
) -> Result<(), EngineError> {
    if decision.victory_factor > Atto::ONE {
        return Err(EngineError::invalid_input(format!(
            "victory factor {} is outside [0, 1]",
            decision.victory_factor
        )));
    }
    if !class.is_completion() && !parties.completers.is_empty() {
        return Err(EngineError::invalid_input(format!(
            "{class} content has no completers, got {}",
            parties.completers.len()
        )));
    }
    let mut ranks = BTreeSet::new();
    let mut wallets = BTreeSet::new();
    for c in &parties.completers {
        if c.rank == 0 {
            return Err(EngineError::invalid_input(format!(
                "completer '{}' has rank 0; ranks start at 1",
                c.wallet
            )));
        }
        if !ranks.insert(c.rank) {
            return Err(EngineError::invalid_input(format!(
                "completer rank {} is used more than once",
                c.rank
            )));
        }
        if !wallets.insert(c.wallet.as_str()) {
            return Err(EngineError::invalid_input(format!(
                "completer '{}' appears more than once",
                c.wallet
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Balance
// ============================================================================

/// Make `Σ staker payouts + fixed + platform == sources` hold.
///
/// A surplus goes to the platform.  An excess is taken back from staker
/// payouts proportionally (creator, completer and floor amounts in `fixed`
/// are never touched); the floor dust of that rescale goes to the platform.
/// An excess larger than all staker payouts is a `PoolImbalance`.
pub(crate) fn reconcile(
    stakers: &mut [ParticipantOutcome],
    fixed: Atto,
    platform: &mut Atto,
    sources: Atto,
) -> Result<(), EngineError> {
    let staker_total =
        checked_sum(stakers.iter().map(|p| p.payout)).or_overflow("staker total")?;
    let uses = checked_sum([staker_total, fixed, *platform]).or_overflow("settlement uses")?;

    if uses <= sources {
        *platform = platform
            .checked_add(sources.saturating_sub(uses))
            .or_overflow("rounding surplus")?;
        return Ok(());
    }

    let excess = uses.saturating_sub(sources);
    if excess > staker_total {
        return Err(EngineError::PoolImbalance {
            sources: sources.to_string(),
            uses: uses.to_string(),
        });
    }
    let target = staker_total.saturating_sub(excess);
    tracing::warn!(
        excess = %excess,
        staker_total = %staker_total,
        "renormalizing staker payouts"
    );
    let mut rescaled_total = Atto::ZERO;
    for p in stakers.iter_mut() {
        p.payout = p
            .payout
            .mul_div(target, staker_total)
            .or_overflow("renormalize")?;
        rescaled_total = rescaled_total
            .checked_add(p.payout)
            .or_overflow("renormalize")?;
    }
    *platform = platform
        .checked_add(target.saturating_sub(rescaled_total))
        .or_overflow("renormalize")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modr_types::{Classification, VoteDecision};

    fn outcome(wallet: &str, payout: u64) -> ParticipantOutcome {
        ParticipantOutcome {
            wallet: wallet.into(),
            classification: Classification::Active,
            vote: VoteDecision::Accept,
            payout: Atto::from_units(payout),
            penalty: Atto::ZERO,
            xp: 0,
        }
    }

    #[test]
    fn balanced_books_are_untouched() {
        let mut stakers = vec![outcome("a", 3), outcome("b", 1)];
        let mut platform = Atto::from_units(2);
        reconcile(&mut stakers, Atto::from_units(4), &mut platform, Atto::from_units(10)).unwrap();
        assert_eq!(platform, Atto::from_units(2));
        assert_eq!(stakers[0].payout, Atto::from_units(3));
    }

    #[test]
    fn surplus_goes_to_platform() {
        let mut stakers = vec![outcome("a", 3)];
        let mut platform = Atto::from_units(2);
        reconcile(&mut stakers, Atto::ZERO, &mut platform, Atto::from_units(6)).unwrap();
        assert_eq!(platform, Atto::from_units(3));
    }

    #[test]
    fn excess_is_taken_from_stakers_pro_rata() {
        let mut stakers = vec![outcome("a", 3), outcome("b", 1)];
        let mut platform = Atto::from_units(2);
        // uses = 4 + 5 + 2 = 11 against 10 sources.
        reconcile(&mut stakers, Atto::from_units(5), &mut platform, Atto::from_units(10)).unwrap();
        assert_eq!(stakers[0].payout, "2.25".parse().unwrap());
        assert_eq!(stakers[1].payout, "0.75".parse().unwrap());
        assert_eq!(platform, Atto::from_units(2));
    }

    #[test]
    fn unabsorbable_excess_is_an_imbalance() {
        let mut stakers = vec![outcome("a", 1)];
        let mut platform = Atto::from_units(5);
        let err = reconcile(&mut stakers, Atto::from_units(5), &mut platform, Atto::from_units(8))
            .unwrap_err();
        assert_eq!(err.code(), "POOL_IMBALANCE");
    }
}
