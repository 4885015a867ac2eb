use modr_config::ContentTypeConfig;
use modr_types::{Classification, Participant};

/// Derive a participant's staker class.
///
/// - stake below `min_eligible_stake` → Ineligible
/// - stake at least `min_active_stake` held for at least
///   `min_active_stake_age_days` → Active
/// - anything else → Passive
///
/// Ineligible entries carry no weight anywhere: they are left out of the
/// consensus tally and receive no payout.
pub fn classify(p: &Participant, cfg: &ContentTypeConfig) -> Classification {
    if p.stake_amount < cfg.min_eligible_stake {
        Classification::Ineligible
    } else if p.stake_amount >= cfg.min_active_stake
        && p.stake_age_days >= cfg.min_active_stake_age_days
    {
        Classification::Active
    } else {
        Classification::Passive
    }
}
