//! Creator and completer payouts from the remainder.
//!
//! The remainder is what the staker pools did not pay out plus any reward
//! share no staker pool claimed.  How it is spent depends on the outcome:
//!
//! | outcome | creator | completers | leftover |
//! |---|---|---|---|
//! | Rejected | 0 | 0 | platform |
//! | Validated, no organic quorum | 0 | entry price refunded | platform |
//! | Validated with quorum | rest, capped | contributor share, floor on top rank | cap excess to platform |

use modr_config::ContentTypeConfig;
use modr_types::{
    Atto, Completer, CompleterOutcome, ContentClass, CreatorOutcome, EngineError,
    EvaluationResult, OrOverflow, ResolutionStatus, SettlementParties,
};

/// Funds available after the staker pools are settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Purse {
    pub remainder: Atto,
    pub platform: Atto,
}

impl Purse {
    /// Take up to `amount`, remainder first, then platform.  Returns what was
    /// actually funded.
    fn draw(&mut self, amount: Atto) -> Atto {
        let from_remainder = amount.min(self.remainder);
        self.remainder = self.remainder.saturating_sub(from_remainder);
        let still_needed = amount.saturating_sub(from_remainder);
        let from_platform = still_needed.min(self.platform);
        self.platform = self.platform.saturating_sub(from_platform);
        amount.saturating_sub(still_needed.saturating_sub(from_platform))
    }

    /// Move whatever is left of the remainder to the platform.
    fn sweep(&mut self) -> Result<(), EngineError> {
        self.platform = self
            .platform
            .checked_add(self.remainder)
            .or_overflow("platform sweep")?;
        self.remainder = Atto::ZERO;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Distribution {
    pub creator: CreatorOutcome,
    /// Ranked order.
    pub completers: Vec<CompleterOutcome>,
    pub platform: Atto,
    pub shortfall: Atto,
}

/// Completers by rank, ties broken by wallet.
fn ranked(completers: &[Completer]) -> Vec<&Completer> {
    let mut out: Vec<&Completer> = completers.iter().collect();
    out.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.wallet.cmp(&b.wallet)));
    out
}

fn unpaid(c: &Completer) -> CompleterOutcome {
    CompleterOutcome {
        wallet: c.wallet.clone(),
        rank: c.rank,
        entry_price: c.entry_price,
        payout: Atto::ZERO,
        refunded: false,
    }
}

pub(crate) fn distribute(
    decision: &EvaluationResult,
    class: ContentClass,
    cfg: &ContentTypeConfig,
    parties: &SettlementParties,
    total_pool: Atto,
    mut purse: Purse,
) -> Result<Distribution, EngineError> {
    let order = ranked(&parties.completers);
    let mut creator = CreatorOutcome {
        wallet: parties.creator.clone(),
        payout: Atto::ZERO,
        capped: false,
    };
    let mut completers: Vec<CompleterOutcome> = order.iter().copied().map(unpaid).collect();
    let mut shortfall = Atto::ZERO;

    match (decision.status, decision.quorum_met) {
        (ResolutionStatus::Validated, false) => {
            for outcome in completers.iter_mut() {
                let funded = purse.draw(outcome.entry_price);
                shortfall = shortfall
                    .checked_add(outcome.entry_price.saturating_sub(funded))
                    .or_overflow("refund shortfall")?;
                outcome.payout = funded;
                outcome.refunded = true;
            }
        }
        (ResolutionStatus::Validated, true) => {
            if class.is_completion() && !completers.is_empty() {
                pay_contributors(&mut completers, cfg, &mut purse)?;
            }

            let promised = purse.remainder;
            let cap = total_pool
                .mul_ratio(cfg.creator_cap_share)
                .or_overflow("creator cap")?;
            creator.payout = promised.min(cap);
            creator.capped = promised > cap;
            purse.remainder = Atto::ZERO;
            purse.platform = purse
                .platform
                .checked_add(promised.saturating_sub(cap))
                .or_overflow("creator cap excess")?;

            if let Some(top) = completers.first_mut() {
                let floor = top
                    .entry_price
                    .mul_ratio(cfg.completer_floor_multiple)
                    .or_overflow("completer floor")?;
                let need = floor.saturating_sub(top.payout);
                let from_platform = need.min(purse.platform);
                purse.platform = purse.platform.saturating_sub(from_platform);
                let from_creator = need.saturating_sub(from_platform).min(creator.payout);
                creator.payout = creator.payout.saturating_sub(from_creator);
                top.payout = top
                    .payout
                    .checked_add(from_platform)
                    .and_then(|p| p.checked_add(from_creator))
                    .or_overflow("completer floor")?;
                shortfall = shortfall
                    .checked_add(floor.saturating_sub(top.payout))
                    .or_overflow("floor shortfall")?;
            }
        }
        // Rejected: creator and completers keep nothing.  Non-terminal
        // statuses never reach here.
        _ => {}
    }

    purse.sweep()?;
    Ok(Distribution {
        creator,
        completers,
        platform: purse.platform,
        shortfall,
    })
}

/// `contributor_share` of the remainder, split equally over the top
/// `top_contributor_count` completers.  Floor dust goes to the top rank.
fn pay_contributors(
    ranked: &mut [CompleterOutcome],
    cfg: &ContentTypeConfig,
    purse: &mut Purse,
) -> Result<(), EngineError> {
    let pot = purse
        .remainder
        .mul_ratio(cfg.contributor_share)
        .or_overflow("contributor pot")?;
    let k = ranked.len().min(cfg.top_contributor_count as usize);
    if k == 0 || pot.is_zero() {
        return Ok(());
    }
    let each = pot.mul_frac(1, k as u128).or_overflow("contributor split")?;
    for outcome in ranked.iter_mut().take(k) {
        outcome.payout = each;
    }
    let handed_out = each.mul_frac(k as u128, 1).or_overflow("contributor split")?;
    let dust = pot.checked_sub(handed_out).or_overflow("contributor split")?;
    ranked[0].payout = ranked[0]
        .payout
        .checked_add(dust)
        .or_overflow("contributor split")?;
    purse.remainder = purse
        .remainder
        .checked_sub(pot)
        .or_overflow("contributor pot")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modr_types::Provenance;

    fn decision(status: ResolutionStatus, quorum_met: bool) -> EvaluationResult {
        EvaluationResult {
            status,
            score_accept: "0.8".parse().unwrap(),
            score_reject: "0.2".parse().unwrap(),
            victory_factor: "0.6".parse().unwrap(),
            reason: None,
            quorum_met,
            provenance: Provenance::Community,
        }
    }

    fn parties(entries: &[(&str, u64, u32)]) -> SettlementParties {
        SettlementParties {
            creator: "creator".into(),
            completers: entries
                .iter()
                .map(|(w, price, rank)| Completer::new(*w, Atto::from_units(*price), *rank))
                .collect(),
            winc_per_reference_unit: Atto::ONE,
        }
    }

    fn purse(remainder: u64, platform: u64) -> Purse {
        Purse {
            remainder: Atto::from_units(remainder),
            platform: Atto::from_units(platform),
        }
    }

    fn cfg() -> ContentTypeConfig {
        ContentTypeConfig::defaults_for(ContentClass::CompletionPaid)
    }

    #[test]
    fn draw_uses_remainder_then_platform() {
        let mut p = purse(3, 2);
        assert_eq!(p.draw(Atto::from_units(4)), Atto::from_units(4));
        assert_eq!(p, purse(0, 1));
        assert_eq!(p.draw(Atto::from_units(5)), Atto::ONE);
        assert_eq!(p, purse(0, 0));
    }

    #[test]
    fn rejected_sends_remainder_to_platform() {
        let d = distribute(
            &decision(ResolutionStatus::Rejected, true),
            ContentClass::CompletionPaid,
            &cfg(),
            &parties(&[("c1", 4, 1)]),
            Atto::from_units(10),
            purse(3, 2),
        )
        .unwrap();
        assert_eq!(d.creator.payout, Atto::ZERO);
        assert_eq!(d.completers[0].payout, Atto::ZERO);
        assert!(!d.completers[0].refunded);
        assert_eq!(d.platform, Atto::from_units(5));
    }

    #[test]
    fn contributors_split_equally_with_dust_to_top() {
        let mut ranked = vec![
            unpaid(&Completer::new("a", Atto::ZERO, 1)),
            unpaid(&Completer::new("b", Atto::ZERO, 2)),
            unpaid(&Completer::new("c", Atto::ZERO, 3)),
        ];
        let mut p = Purse {
            remainder: Atto::new(1_000),
            platform: Atto::ZERO,
        };
        pay_contributors(&mut ranked, &cfg(), &mut p).unwrap();
        // pot = 600 raw, 200 each.
        assert_eq!(ranked[0].payout, Atto::new(200));
        assert_eq!(ranked[2].payout, Atto::new(200));
        assert_eq!(p.remainder, Atto::new(400));

        let mut two = vec![
            unpaid(&Completer::new("a", Atto::ZERO, 1)),
            unpaid(&Completer::new("b", Atto::ZERO, 2)),
        ];
        let mut p = Purse {
            remainder: Atto::new(1_005),
            platform: Atto::ZERO,
        };
        pay_contributors(&mut two, &cfg(), &mut p).unwrap();
        // pot = 603 raw: 301 each, 1 dust to rank 1.
        assert_eq!(two[0].payout, Atto::new(302));
        assert_eq!(two[1].payout, Atto::new(301));
    }

    #[test]
    fn creator_is_capped_and_excess_goes_to_platform() {
        let d = distribute(
            &decision(ResolutionStatus::Validated, true),
            ContentClass::InitialStandard,
            &ContentTypeConfig::defaults_for(ContentClass::InitialStandard),
            &parties(&[]),
            Atto::from_units(10),
            purse(8, 2),
        )
        .unwrap();
        assert_eq!(d.creator.payout, Atto::from_units(5));
        assert!(d.creator.capped);
        assert_eq!(d.platform, Atto::from_units(5));
    }
}
