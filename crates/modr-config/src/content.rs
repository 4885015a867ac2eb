use std::collections::BTreeMap;

use modr_types::{Atto, ContentClass, EngineError, OrOverflow, ATTO_SCALE};
use serde::{Deserialize, Serialize};

/// Per-class pricing and settlement policy.
///
/// All fractions are fixed-point ratios (`Atto::ONE` = 100 %).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentTypeConfig {
    /// Reference price in the stable reference unit.
    pub mint_price: Atto,
    pub reward_pool_share: Atto,
    pub platform_share: Atto,
    pub active_pool_share: Atto,
    pub passive_pool_share: Atto,
    pub base_xp: u64,
    /// Extra weight for correct voters in the numerical minority of their pool.
    pub minority_factor: Atto,
    /// Dampening (<= 1) of passive stakers' gains and slashes.
    pub passive_factor: Atto,

    /// Fraction of a losing active stake moved into penalties.
    pub slash_fraction: Atto,
    /// Absolute floor below which a stake is ignored entirely.
    pub min_eligible_stake: Atto,
    pub min_active_stake: Atto,
    pub min_active_stake_age_days: u32,
    /// Part of the creator/contributor remainder paid to top contributors.
    pub contributor_share: Atto,
    pub top_contributor_count: u32,
    /// Multiple of entry price guaranteed to the top-ranked completer.
    pub completer_floor_multiple: Atto,
    /// Creator hard cap, as a fraction of the total pool.
    pub creator_cap_share: Atto,
}

/// `n` percent as a fixed-point ratio.
const fn pct(n: u128) -> Atto {
    Atto::new(ATTO_SCALE / 100 * n)
}

impl ContentTypeConfig {
    /// Built-in defaults per class.
    pub fn defaults_for(class: ContentClass) -> Self {
        let (mint, reward, platform, active, passive, base_xp, minority) = match class {
            ContentClass::InitialStandard => (10, 80, 20, 70, 30, 100, 25),
            ContentClass::InitialAgency => (25, 75, 25, 70, 30, 150, 25),
            ContentClass::InitialIndividual => (5, 85, 15, 70, 30, 80, 25),
            ContentClass::CompletionPaid => (10, 80, 20, 60, 40, 60, 20),
            ContentClass::CompletionFree => (1, 90, 10, 60, 40, 30, 20),
            ContentClass::CompletionIndividual => (5, 85, 15, 60, 40, 50, 20),
        };
        Self {
            mint_price: Atto::from_units(mint),
            reward_pool_share: pct(reward),
            platform_share: pct(platform),
            active_pool_share: pct(active),
            passive_pool_share: pct(passive),
            base_xp,
            minority_factor: pct(minority),
            passive_factor: pct(50),
            slash_fraction: pct(10),
            min_eligible_stake: pct(1),
            min_active_stake: Atto::ONE,
            min_active_stake_age_days: 7,
            contributor_share: pct(60),
            top_contributor_count: 3,
            completer_floor_multiple: pct(150),
            creator_cap_share: pct(50),
        }
    }

    /// Validate ranges and share-group sums.  `scope` prefixes field names in
    /// errors (e.g. `initial_standard`).
    pub fn validate(&self, scope: &str) -> Result<(), EngineError> {
        let field = |name: &str| format!("{scope}.{name}");

        let unit_fractions = [
            ("reward_pool_share", self.reward_pool_share),
            ("platform_share", self.platform_share),
            ("active_pool_share", self.active_pool_share),
            ("passive_pool_share", self.passive_pool_share),
            ("passive_factor", self.passive_factor),
            ("slash_fraction", self.slash_fraction),
            ("contributor_share", self.contributor_share),
            ("creator_cap_share", self.creator_cap_share),
        ];
        for (name, v) in unit_fractions {
            if v > Atto::ONE {
                return Err(EngineError::invalid_config(
                    field(name),
                    format!("{v} exceeds 1"),
                ));
            }
        }

        let pool_split = self
            .reward_pool_share
            .checked_add(self.platform_share)
            .or_overflow("share sum")?;
        if pool_split > Atto::ONE {
            return Err(EngineError::invalid_config(
                field("reward_pool_share+platform_share"),
                format!("sum {pool_split} exceeds 1"),
            ));
        }

        let staker_split = self
            .active_pool_share
            .checked_add(self.passive_pool_share)
            .or_overflow("share sum")?;
        if staker_split > Atto::ONE {
            return Err(EngineError::invalid_config(
                field("active_pool_share+passive_pool_share"),
                format!("sum {staker_split} exceeds 1"),
            ));
        }

        if self.min_active_stake < self.min_eligible_stake {
            return Err(EngineError::invalid_config(
                field("min_active_stake"),
                "must be >= min_eligible_stake",
            ));
        }
        if self.top_contributor_count == 0 {
            return Err(EngineError::invalid_config(
                field("top_contributor_count"),
                "must be >= 1",
            ));
        }
        Ok(())
    }
}

/// The complete class → config table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTypeTable(BTreeMap<ContentClass, ContentTypeConfig>);

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self(
            ContentClass::ALL
                .iter()
                .map(|c| (*c, ContentTypeConfig::defaults_for(*c)))
                .collect(),
        )
    }
}

impl ContentTypeTable {
    pub fn get(&self, class: ContentClass) -> Result<&ContentTypeConfig, EngineError> {
        self.0.get(&class).ok_or_else(|| {
            EngineError::invalid_config(
                format!("content_types.{class}"),
                "missing entry for content class",
            )
        })
    }

    /// Every class present and individually valid.
    pub fn validate(&self) -> Result<(), EngineError> {
        for class in ContentClass::ALL {
            self.get(class)?
                .validate(&format!("content_types.{class}"))?;
        }
        Ok(())
    }
}
