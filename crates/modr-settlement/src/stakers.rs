//! Per-pool staker settlement: slashing, minority bonus, penalty
//! redistribution, dampening, XP.

use modr_config::ContentTypeConfig;
use modr_types::{
    checked_sum, Atto, Classification, EngineError, OrOverflow, ParticipantOutcome,
    VoteDecision, ATTO_SCALE,
};

use crate::classify::Classified;

/// What one staker pool is settled against.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PoolRules {
    pub pool: Atto,
    /// 1 for the active pool, `passive_factor` for the passive pool.
    pub dampening: Atto,
    pub winning_vote: VoteDecision,
    pub victory_factor: Atto,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PoolSettlement {
    /// One per roster entry, in input order.
    pub outcomes: Vec<ParticipantOutcome>,
    /// Slashed from this pool's losers.
    pub penalties: Atto,
    /// `pool + penalty pot - paid`; joins the creator/contributor remainder.
    pub unspent: Atto,
}

fn is_eligible_voter(c: &Classified<'_>) -> bool {
    c.class != Classification::Ineligible && c.participant.vote.is_cast()
}

fn votes_with(c: &Classified<'_>, vote: VoteDecision) -> bool {
    c.participant.vote == vote
}

/// XP for a cast vote: `base_xp`, plus `floor(base_xp * victory_factor)` on
/// the winning side.
pub(crate) fn vote_xp(base_xp: u64, won: bool, victory_factor: Atto) -> Result<u64, EngineError> {
    if !won {
        return Ok(base_xp);
    }
    let bonus = Atto::from_units(base_xp)
        .mul_ratio(victory_factor.clamp_unit())
        .or_overflow("xp bonus")?
        .raw()
        / ATTO_SCALE;
    u64::try_from(bonus)
        .ok()
        .and_then(|b| base_xp.checked_add(b))
        .or_overflow("xp")
}

/// Slashes and winner totals of one pool, computed before any payout.
#[derive(Clone, Debug)]
pub(crate) struct PoolAssessment {
    /// One per roster entry, in input order.
    slashes: Vec<Atto>,
    pub penalties: Atto,
    winner_stake: Atto,
    /// Winners' combined base share, after the minority bonus and the cap.
    winners_base: Atto,
}

impl PoolAssessment {
    pub fn has_winners(&self) -> bool {
        !self.winner_stake.is_zero()
    }
}

pub(crate) fn assess_pool(
    entries: &[Classified<'_>],
    rules: &PoolRules,
    cfg: &ContentTypeConfig,
) -> Result<PoolAssessment, EngineError> {
    let eligible: Vec<&Classified<'_>> = entries.iter().filter(|c| is_eligible_voter(c)).collect();
    let winner_count = eligible
        .iter()
        .filter(|c| votes_with(c, rules.winning_vote))
        .count();
    let loser_count = eligible.len() - winner_count;

    let all_stake = checked_sum(eligible.iter().map(|c| c.participant.stake_amount))
        .or_overflow("pool stake")?;
    let winner_stake = checked_sum(
        eligible
            .iter()
            .filter(|c| votes_with(c, rules.winning_vote))
            .map(|c| c.participant.stake_amount),
    )
    .or_overflow("winner stake")?;

    let slash_rate = cfg
        .slash_fraction
        .mul_ratio(rules.dampening)
        .or_overflow("slash rate")?;
    let mut slashes = Vec::with_capacity(entries.len());
    for c in entries {
        let slashed = if is_eligible_voter(c) && !votes_with(c, rules.winning_vote) {
            c.participant
                .stake_amount
                .mul_ratio(slash_rate)
                .or_overflow("slash")?
        } else {
            Atto::ZERO
        };
        slashes.push(slashed);
    }
    let penalties = checked_sum(slashes.iter().copied()).or_overflow("penalties")?;

    // Boosted when the winners are the smaller bloc, never more than the pool.
    let winners_base = if winner_stake.is_zero() {
        Atto::ZERO
    } else {
        let proportional = rules
            .pool
            .mul_div(winner_stake, all_stake)
            .or_overflow("winner share")?;
        let boosted = if winner_count < loser_count {
            let multiplier = Atto::ONE
                .checked_add(cfg.minority_factor)
                .or_overflow("minority bonus")?;
            proportional
                .mul_ratio(multiplier)
                .or_overflow("minority bonus")?
        } else {
            proportional
        };
        boosted.min(rules.pool)
    };

    Ok(PoolAssessment {
        slashes,
        penalties,
        winner_stake,
        winners_base,
    })
}

/// Pay one assessed pool.  `penalty_pot` is the slashed stake this pool's
/// winners share by stake; it need not be the pool's own penalties.
pub(crate) fn pay_pool(
    entries: &[Classified<'_>],
    rules: &PoolRules,
    assessment: PoolAssessment,
    penalty_pot: Atto,
    cfg: &ContentTypeConfig,
) -> Result<PoolSettlement, EngineError> {
    let PoolAssessment {
        slashes,
        penalties,
        winner_stake,
        winners_base,
    } = assessment;

    let mut outcomes = Vec::with_capacity(entries.len());
    let mut paid = Atto::ZERO;
    for (c, penalty) in entries.iter().zip(slashes) {
        let p = c.participant;
        let won = votes_with(c, rules.winning_vote);
        let payout = if won && is_eligible_voter(c) && !winner_stake.is_zero() {
            let base = winners_base
                .mul_div(p.stake_amount, winner_stake)
                .or_overflow("winner base")?;
            let bonus = penalty_pot
                .mul_div(p.stake_amount, winner_stake)
                .or_overflow("penalty share")?;
            base.checked_add(bonus)
                .and_then(|gross| gross.mul_ratio(rules.dampening))
                .or_overflow("winner payout")?
        } else {
            Atto::ZERO
        };
        paid = paid.checked_add(payout).or_overflow("pool paid")?;

        let xp = if p.vote.is_cast() {
            vote_xp(cfg.base_xp, won, rules.victory_factor)?
        } else {
            0
        };

        outcomes.push(ParticipantOutcome {
            wallet: p.wallet.clone(),
            classification: c.class,
            vote: p.vote,
            payout,
            penalty,
            xp,
        });
    }

    let unspent = rules
        .pool
        .checked_add(penalty_pot)
        .and_then(|funded| funded.checked_sub(paid))
        .or_overflow("pool unspent")?;

    Ok(PoolSettlement {
        outcomes,
        penalties,
        unspent,
    })
}

/// Settle both staker pools.
///
/// Penalties fund the winners of the pool they were slashed in.  A pool with
/// no winners hands its penalties to the other pool's winners; only when
/// neither pool has winners do they stay unspent.
pub(crate) fn settle_pools(
    active: &[Classified<'_>],
    active_rules: &PoolRules,
    passive: &[Classified<'_>],
    passive_rules: &PoolRules,
    cfg: &ContentTypeConfig,
) -> Result<(PoolSettlement, PoolSettlement), EngineError> {
    let active_assessment = assess_pool(active, active_rules, cfg)?;
    let passive_assessment = assess_pool(passive, passive_rules, cfg)?;

    let own = (active_assessment.penalties, passive_assessment.penalties);
    let all = own.0.checked_add(own.1).or_overflow("penalties")?;
    let (active_pot, passive_pot) = match (
        active_assessment.has_winners(),
        passive_assessment.has_winners(),
    ) {
        (true, false) => (all, Atto::ZERO),
        (false, true) => (Atto::ZERO, all),
        _ => own,
    };
    if (active_pot, passive_pot) != own {
        tracing::debug!(
            active_pot = %active_pot,
            passive_pot = %passive_pot,
            "penalties moved to the pool with winners"
        );
    }

    let active = pay_pool(active, active_rules, active_assessment, active_pot, cfg)?;
    let passive = pay_pool(passive, passive_rules, passive_assessment, passive_pot, cfg)?;
    Ok((active, passive))
}
