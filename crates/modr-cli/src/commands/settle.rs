use anyhow::{Context, Result};
use modr_config::LoadedConfig;
use modr_consensus::OverrideRequest;
use modr_settlement::{override_and_settle, partition_roster, settle};
use modr_types::{ContentClass, EvaluationResult, Participant, SettlementParties, SettlementResult};
use serde::{Deserialize, Serialize};

use super::{class_config, read_json_file};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettleInput {
    pub class: ContentClass,
    pub decision: EvaluationResult,
    pub parties: SettlementParties,
    /// Flat roster; split into active/passive with the class thresholds.
    pub participants: Vec<Participant>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideInput {
    pub class: ContentClass,
    pub community: EvaluationResult,
    pub request: OverrideRequest,
    pub parties: SettlementParties,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Serialize)]
pub struct SettleOutput {
    pub config_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<EvaluationResult>,
    pub settlement: SettlementResult,
}

pub fn run_settle(loaded: &LoadedConfig, input_path: &str) -> Result<SettleOutput> {
    let input: SettleInput = read_json_file(input_path)?;
    let cfg = class_config(loaded, input.class)?;
    let (active, passive) = partition_roster(&input.participants, cfg);

    let settlement = settle(
        input.class,
        cfg,
        &input.decision,
        &input.parties,
        &active,
        &passive,
    )
    .with_context(|| format!("settle {} failed", input.class))?;

    tracing::info!(
        class = %input.class,
        total_paid = %settlement.total_paid,
        platform = %settlement.platform_pool,
        "settled"
    );

    Ok(SettleOutput {
        config_hash: loaded.config_hash.clone(),
        decision: None,
        settlement,
    })
}

pub fn run_override(loaded: &LoadedConfig, input_path: &str) -> Result<SettleOutput> {
    let input: OverrideInput = read_json_file(input_path)?;
    let cfg = class_config(loaded, input.class)?;
    let (active, passive) = partition_roster(&input.participants, cfg);

    let (decision, settlement) = override_and_settle(
        &input.community,
        &input.request,
        input.class,
        cfg,
        &input.parties,
        &active,
        &passive,
    )
    .with_context(|| format!("override {} failed", input.class))?;

    tracing::info!(
        class = %input.class,
        status = %decision.status,
        total_paid = %settlement.total_paid,
        "override settled"
    );

    Ok(SettleOutput {
        config_hash: loaded.config_hash.clone(),
        decision: Some(decision),
        settlement,
    })
}
