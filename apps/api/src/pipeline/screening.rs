//! Screening stage — one judge call per candidate, best-effort and
//! always-complete.
//!
//! A failed evaluation never aborts the loop: it is recorded as a
//! [`EvaluationOutcome::Failed`] and the loop moves on, so a single bad
//! record cannot sink a thousand-candidate run. Exactly one progress event
//! fires per candidate, success or failure.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::judge::{evaluate_as, Judge};

use super::progress::ProgressSink;
use super::{prompts, PipelineState};

/// Justification carried by the sentinel view of a failed evaluation.
pub const FAILURE_JUSTIFICATION: &str = "Error during processing.";

/// A relevance verdict for a single candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceScore {
    pub candidate_name: String,
    /// 0 to 100.
    pub score: u8,
    pub justification: String,
}

/// Per-candidate screening result. `Failed` is kept distinct from a genuine
/// zero score so failures stay distinguishable in reports, while the
/// accessors present the sentinel view (score 0, fixed justification) that
/// downstream ranking and prompts consume.
#[derive(Debug, Clone, Serialize)]
pub enum EvaluationOutcome {
    Scored(RelevanceScore),
    Failed { candidate_name: String },
}

impl EvaluationOutcome {
    pub fn candidate_name(&self) -> &str {
        match self {
            Self::Scored(s) => &s.candidate_name,
            Self::Failed { candidate_name } => candidate_name,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            Self::Scored(s) => s.score,
            Self::Failed { .. } => 0,
        }
    }

    pub fn justification(&self) -> &str {
        match self {
            Self::Scored(s) => &s.justification,
            Self::Failed { .. } => FAILURE_JUSTIFICATION,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Materializes the sentinel view for reporting.
    pub fn to_relevance_score(&self) -> RelevanceScore {
        match self {
            Self::Scored(s) => s.clone(),
            Self::Failed { candidate_name } => RelevanceScore {
                candidate_name: candidate_name.clone(),
                score: 0,
                justification: FAILURE_JUSTIFICATION.to_string(),
            },
        }
    }
}

/// Screens every candidate in source order, writing one outcome per
/// candidate to `state.all_relevance_scores` (same order as the input).
pub async fn run(state: &mut PipelineState, judge: &dyn Judge, progress: &dyn ProgressSink) {
    let total = state.candidates.len();
    let mut outcomes: Vec<EvaluationOutcome> = Vec::with_capacity(total);

    for (index, candidate) in state.candidates.iter().enumerate() {
        let prompt =
            prompts::SCREENING_PROMPT_TEMPLATE.replace("{profile}", &candidate.profile_text());

        match evaluate_as::<RelevanceScore>(judge, prompts::SCREENING_SYSTEM, &prompt).await {
            Ok(mut score) => {
                score.score = score.score.min(100);
                if !state.name_index.contains_key(&score.candidate_name) {
                    warn!(
                        "judge returned name '{}' not present in the sourced pool",
                        score.candidate_name
                    );
                }
                outcomes.push(EvaluationOutcome::Scored(score));
            }
            Err(e) => {
                warn!(
                    "evaluation failed for candidate '{}': {e}",
                    candidate.display_name()
                );
                outcomes.push(EvaluationOutcome::Failed {
                    candidate_name: candidate.display_name().to_string(),
                });
            }
        }

        progress.on_progress(index + 1, total);
    }

    state.all_relevance_scores = Some(outcomes);
}
