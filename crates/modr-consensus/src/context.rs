use modr_config::{ConfigParams, ContentTypeConfig};
use modr_types::{Atto, Classification, EngineError, OrOverflow, Participant, VoteDecision};
use serde::{Deserialize, Serialize};

use crate::classify;

/// Live vote/stake aggregate for one content item, built by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub accept_votes: u64,
    pub reject_votes: u64,
    pub stake_accept: Atto,
    pub stake_reject: Atto,
    /// Reference price of the content class.
    pub mint_price: Atto,
    /// Unix seconds.
    pub now: i64,
    /// Unix seconds.
    pub deadline: i64,
    pub winc_per_reference_unit: Atto,
}

impl DecisionContext {
    /// Tally a roster into an aggregate.  Abstentions and Ineligible stakes
    /// are not counted, in either the vote count or the stake sums.
    pub fn from_participants(
        participants: &[Participant],
        cfg: &ContentTypeConfig,
        winc_per_reference_unit: Atto,
        now: i64,
        deadline: i64,
    ) -> Result<Self, EngineError> {
        let mut ctx = Self {
            accept_votes: 0,
            reject_votes: 0,
            stake_accept: Atto::ZERO,
            stake_reject: Atto::ZERO,
            mint_price: cfg.mint_price,
            now,
            deadline,
            winc_per_reference_unit,
        };
        for p in participants {
            if classify(p, cfg) == Classification::Ineligible {
                continue;
            }
            match p.vote {
                VoteDecision::Accept => {
                    ctx.accept_votes += 1;
                    ctx.stake_accept = ctx
                        .stake_accept
                        .checked_add(p.stake_amount)
                        .or_overflow("stake tally")?;
                }
                VoteDecision::Reject => {
                    ctx.reject_votes += 1;
                    ctx.stake_reject = ctx
                        .stake_reject
                        .checked_add(p.stake_amount)
                        .or_overflow("stake tally")?;
                }
                VoteDecision::Abstain => {}
            }
        }
        Ok(ctx)
    }

    pub fn total_votes(&self) -> Result<u64, EngineError> {
        self.accept_votes
            .checked_add(self.reject_votes)
            .or_overflow("vote total")
    }

    pub fn total_stake(&self) -> Result<Atto, EngineError> {
        self.stake_accept
            .checked_add(self.stake_reject)
            .or_overflow("stake total")
    }

    /// The stake the pool must hold before the decision can resolve.
    pub fn required_stake(&self) -> Result<Atto, EngineError> {
        self.mint_price
            .mul_ratio(self.winc_per_reference_unit)
            .or_overflow("mint value")
    }

    pub fn deadline_passed(&self) -> bool {
        self.now >= self.deadline
    }
}

/// Deadline for a vote window opened at `opened_at`.
pub fn deadline_from(opened_at: i64, cfg: &ConfigParams) -> i64 {
    opened_at.saturating_add(cfg.vote_window_secs())
}
