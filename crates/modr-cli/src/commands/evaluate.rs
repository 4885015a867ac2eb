use anyhow::Result;
use chrono::Utc;
use modr_config::LoadedConfig;
use modr_consensus::{classify, community_score, deadline_from, evaluate, DecisionContext};
use modr_types::{
    Atto, Classification, ContentClass, EvaluationResult, Participant, UserFacingStatus,
};
use serde::{Deserialize, Serialize};

use super::{class_config, read_json_file};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateInput {
    pub class: ContentClass,
    pub participants: Vec<Participant>,
    pub winc_per_reference_unit: Atto,
    /// Unix seconds the vote window opened.
    pub opened_at: i64,
    /// Unix seconds; wall clock when absent.
    #[serde(default)]
    pub now: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    pub config_hash: String,
    pub class: ContentClass,
    pub context: DecisionContext,
    pub result: EvaluationResult,
    /// Eligible Accept voters' stake-weighted rating; a ready-made explicit
    /// `community_score` for an override request.
    pub accept_rating: Atto,
    pub user_status: UserFacingStatus,
    pub message: &'static str,
}

pub fn run(loaded: &LoadedConfig, input_path: &str) -> Result<EvaluateOutput> {
    let input: EvaluateInput = read_json_file(input_path)?;
    let params = &loaded.config.params;
    let class_cfg = class_config(loaded, input.class)?;

    let now = input.now.unwrap_or_else(|| Utc::now().timestamp());
    let context = DecisionContext::from_participants(
        &input.participants,
        class_cfg,
        input.winc_per_reference_unit,
        now,
        deadline_from(input.opened_at, params),
    )?;
    let result = evaluate(&context, params)?;
    let eligible: Vec<Participant> = input
        .participants
        .iter()
        .filter(|p| classify(p, class_cfg) != Classification::Ineligible)
        .cloned()
        .collect();
    let accept_rating = community_score(&eligible)?;
    let user_status = UserFacingStatus::from(result.status);

    tracing::info!(class = %input.class, status = %result.status, "evaluated");

    Ok(EvaluateOutput {
        config_hash: loaded.config_hash.clone(),
        class: input.class,
        context,
        result,
        accept_rating,
        user_status,
        message: user_status.message(),
    })
}
