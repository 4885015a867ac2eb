use modr_config::ContentTypeConfig;
use modr_types::{Atto, EngineError, OrOverflow};

/// How one item's pool is carved up before anyone is paid.
///
/// `reward + platform == total` and
/// `active + passive + unallocated_reward == reward`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSplit {
    pub total: Atto,
    pub reward: Atto,
    /// `total * platform_share` plus any share fraction nobody claimed and the
    /// floor dust of the reward split.
    pub platform: Atto,
    pub active: Atto,
    pub passive: Atto,
    /// Part of the reward pool not covered by the two staker pools.  Seeds
    /// the creator/contributor remainder.
    pub unallocated_reward: Atto,
}

impl PoolSplit {
    pub fn compute(
        cfg: &ContentTypeConfig,
        winc_per_reference_unit: Atto,
    ) -> Result<Self, EngineError> {
        let total = cfg
            .mint_price
            .mul_ratio(winc_per_reference_unit)
            .or_overflow("total pool")?;
        let reward = total
            .mul_ratio(cfg.reward_pool_share)
            .or_overflow("reward pool")?;
        let platform = total.checked_sub(reward).or_overflow("platform pool")?;
        let active = reward
            .mul_ratio(cfg.active_pool_share)
            .or_overflow("active pool")?;
        let passive = reward
            .mul_ratio(cfg.passive_pool_share)
            .or_overflow("passive pool")?;
        let unallocated_reward = reward
            .checked_sub(active)
            .and_then(|r| r.checked_sub(passive))
            .or_overflow("reward split")?;

        Ok(Self {
            total,
            reward,
            platform,
            active,
            passive,
            unallocated_reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modr_types::ContentClass;

    #[test]
    fn default_split_for_initial_standard() {
        let cfg = ContentTypeConfig::defaults_for(ContentClass::InitialStandard);
        let split = PoolSplit::compute(&cfg, Atto::ONE).unwrap();
        assert_eq!(split.total, Atto::from_units(10));
        assert_eq!(split.reward, Atto::from_units(8));
        assert_eq!(split.platform, Atto::from_units(2));
        assert_eq!(split.active, "5.6".parse().unwrap());
        assert_eq!(split.passive, "2.4".parse().unwrap());
        assert_eq!(split.unallocated_reward, Atto::ZERO);
    }

    #[test]
    fn unclaimed_share_goes_to_platform() {
        let mut cfg = ContentTypeConfig::defaults_for(ContentClass::CompletionPaid);
        cfg.reward_pool_share = "0.5".parse().unwrap();
        cfg.platform_share = "0.3".parse().unwrap();
        cfg.passive_pool_share = "0.2".parse().unwrap();
        let split = PoolSplit::compute(&cfg, "2".parse().unwrap()).unwrap();
        assert_eq!(split.total, Atto::from_units(20));
        assert_eq!(split.platform, Atto::from_units(10));
        assert_eq!(split.active, Atto::from_units(6));
        assert_eq!(split.passive, Atto::from_units(2));
        assert_eq!(split.unallocated_reward, Atto::from_units(2));
    }
}
