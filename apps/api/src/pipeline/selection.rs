//! Final selection stage — the hiring-manager synthesis call.
//!
//! Recomputes the top-K ranking independently of the diversity stage (the
//! two stages do not share the ranked subset) and asks the judge for exactly
//! [`TEAM_SIZE`] names with index-aligned summaries. An undersized or
//! misaligned selection is rejected — the pipeline never returns a
//! half-formed team.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::judge::{evaluate_as, Judge};

use super::{prompts, rank, PipelineState, Stage, StageFailure, StageFailureKind, TEAM_SIZE, TOP_K};

/// Terminal artifact of the pipeline: the chosen team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalSelection {
    /// Exactly [`TEAM_SIZE`] names.
    pub selected_candidates: Vec<String>,
    /// Index-aligned with `selected_candidates`.
    pub summaries: Vec<String>,
}

pub async fn run(
    state: &mut PipelineState,
    judge: &dyn Judge,
) -> Result<FinalSelection, StageFailure> {
    let fail = |kind: StageFailureKind| StageFailure {
        stage: Stage::Selection,
        kind,
    };

    let outcomes = match state.all_relevance_scores.as_deref() {
        Some(outcomes) if !outcomes.is_empty() => outcomes,
        _ => return Err(fail(StageFailureKind::EmptyPool)),
    };
    let analysis = state.diversity_analysis.as_ref().ok_or_else(|| {
        fail(StageFailureKind::InvalidResult(
            "diversity analysis has not run".to_string(),
        ))
    })?;

    let top = rank::top_by_score(outcomes, TOP_K);
    let relevance_scores = top
        .iter()
        .map(|o| {
            format!(
                "Name: {}, Score: {}, Justification: {}",
                o.candidate_name(),
                o.score(),
                o.justification()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let diversity_analysis = format!(
        "Diversity Score: {}, Justification: {}",
        analysis.diversity_score, analysis.justification
    );

    let prompt = prompts::SELECTION_PROMPT_TEMPLATE
        .replace("{relevance_scores}", &relevance_scores)
        .replace("{diversity_analysis}", &diversity_analysis);

    let selection = evaluate_as::<FinalSelection>(judge, prompts::SELECTION_SYSTEM, &prompt)
        .await
        .map_err(|e| fail(e.into()))?;

    validate(&selection).map_err(|reason| fail(StageFailureKind::InvalidResult(reason)))?;

    info!(
        "final selection: {}",
        selection.selected_candidates.join(", ")
    );
    state.final_selection = Some(selection.clone());
    Ok(selection)
}

/// Enforces the 5-name, index-aligned team invariant.
fn validate(selection: &FinalSelection) -> Result<(), String> {
    if selection.selected_candidates.len() != selection.summaries.len() {
        return Err(format!(
            "selected {} candidates but {} summaries",
            selection.selected_candidates.len(),
            selection.summaries.len()
        ));
    }
    if selection.selected_candidates.len() != TEAM_SIZE {
        return Err(format!(
            "expected {TEAM_SIZE} selected candidates, got {}",
            selection.selected_candidates.len()
        ));
    }
    Ok(())
}
