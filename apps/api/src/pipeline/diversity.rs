//! Diversity analysis stage — a single judge call over the top-scoring
//! subset.
//!
//! Unlike screening there is no sentinel fallback: a team-level diversity
//! judgment cannot be meaningfully defaulted, so a judge failure here aborts
//! the run as a [`StageFailure`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::judge::{evaluate_as, Judge};
use crate::models::candidate::UNAVAILABLE;

use super::{prompts, rank, PipelineState, Stage, StageFailure, StageFailureKind, TOP_K};

/// Holistic diversity verdict for a prospective 5-person team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityAnalysis {
    /// 0 to 100.
    pub diversity_score: u8,
    pub justification: String,
}

pub async fn run(state: &mut PipelineState, judge: &dyn Judge) -> Result<(), StageFailure> {
    let fail = |kind: StageFailureKind| StageFailure {
        stage: Stage::Diversity,
        kind,
    };

    let outcomes = match state.all_relevance_scores.as_deref() {
        Some(outcomes) if !outcomes.is_empty() => outcomes,
        _ => return Err(fail(StageFailureKind::EmptyPool)),
    };

    let top = rank::top_by_score(outcomes, TOP_K);

    let mut lines = Vec::with_capacity(top.len());
    for outcome in &top {
        let record = state
            .name_index
            .get(outcome.candidate_name())
            .map(|&i| &state.candidates[i]);
        if record.is_none() {
            warn!(
                "no candidate record matches scored name '{}'",
                outcome.candidate_name()
            );
        }
        lines.push(format!(
            "Name: {}, Score: {}, Location: {}, School: {}",
            outcome.candidate_name(),
            outcome.score(),
            record.map(|c| c.location_or_unavailable()).unwrap_or(UNAVAILABLE),
            record.map(|c| c.primary_school()).unwrap_or(UNAVAILABLE),
        ));
    }

    let prompt = prompts::DIVERSITY_PROMPT_TEMPLATE.replace("{profiles}", &lines.join("\n---\n"));

    let mut analysis =
        evaluate_as::<DiversityAnalysis>(judge, prompts::DIVERSITY_SYSTEM, &prompt)
            .await
            .map_err(|e| fail(e.into()))?;
    analysis.diversity_score = analysis.diversity_score.min(100);

    info!("diversity score: {}/100", analysis.diversity_score);
    state.diversity_analysis = Some(analysis);
    Ok(())
}
