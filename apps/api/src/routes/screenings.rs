//! Screening run endpoint — loads the candidate export and drives the
//! pipeline to completion, returning the full run report.

use std::path::Path;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::diversity::DiversityAnalysis;
use crate::pipeline::progress::TracingProgress;
use crate::pipeline::screening::RelevanceScore;
use crate::pipeline::selection::FinalSelection;
use crate::pipeline::{PipelineRunner, PipelineState};
use crate::source::load_candidates;
use crate::state::AppState;

/// Progress is logged every this many screened candidates.
const PROGRESS_LOG_INTERVAL: usize = 25;

#[derive(Debug, Serialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_candidates: usize,
    pub failed_evaluations: usize,
    pub relevance_scores: Vec<RelevanceScore>,
    pub diversity_analysis: DiversityAnalysis,
    pub final_selection: FinalSelection,
}

/// POST /api/v1/screenings
/// Runs the full four-stage screening pipeline over the configured candidate
/// export. Blocking from the caller's perspective; progress is visible in the
/// service logs.
pub async fn handle_run_screening(
    State(state): State<AppState>,
) -> Result<Json<ScreeningReport>, AppError> {
    let candidates = load_candidates(Path::new(&state.config.candidate_data_path))?;

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(
        "screening run {run_id} started over {} candidates",
        candidates.len()
    );

    let progress = TracingProgress::new(PROGRESS_LOG_INTERVAL);
    let runner = PipelineRunner::new(state.judge.as_ref(), &progress);
    let mut pipeline_state = PipelineState::new(candidates);

    let final_selection = runner.run(&mut pipeline_state).await?;

    let relevance_scores = pipeline_state
        .all_relevance_scores
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|o| o.to_relevance_score())
        .collect::<Vec<_>>();

    let diversity_analysis = pipeline_state
        .diversity_analysis
        .take()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("run completed without analysis")))?;

    info!("screening run {run_id} complete");

    Ok(Json(ScreeningReport {
        run_id,
        started_at,
        total_candidates: pipeline_state.candidates.len(),
        failed_evaluations: pipeline_state.failed_evaluations(),
        relevance_scores,
        diversity_analysis,
        final_selection,
    }))
}
