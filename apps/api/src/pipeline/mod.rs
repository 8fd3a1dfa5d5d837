//! Candidate screening pipeline — the core of the service.
//!
//! Flow: sourcing → screening → diversity analysis → final selection,
//! strictly linear over one shared [`PipelineState`]. Screening absorbs
//! per-candidate judge failures into sentinel outcomes; the two batch stages
//! propagate failures as [`StageFailure`] and abort the run. The state stays
//! with the caller, so screening results remain inspectable after a failed
//! run.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::judge::{EvaluationError, Judge};
use crate::models::candidate::CandidateRecord;

pub mod diversity;
pub mod progress;
pub mod prompts;
pub mod rank;
pub mod screening;
pub mod selection;
pub mod sourcing;

use diversity::DiversityAnalysis;
use progress::ProgressSink;
use screening::EvaluationOutcome;
use selection::FinalSelection;

/// Final team size.
pub const TEAM_SIZE: usize = 5;
/// Size of the top-scoring subset fed to the diversity and selection stages.
pub const TOP_K: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sourcing,
    Screening,
    Diversity,
    Selection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Sourcing => "sourcing",
            Stage::Screening => "screening",
            Stage::Diversity => "diversity analysis",
            Stage::Selection => "final selection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StageFailureKind {
    #[error(transparent)]
    Judge(#[from] EvaluationError),

    #[error("no scored candidates to analyze")]
    EmptyPool,

    #[error("invalid selection result: {0}")]
    InvalidResult(String),
}

/// A batch-level failure that aborts the run, naming the stage it came from.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {kind}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub kind: StageFailureKind,
}

/// The single mutable aggregate threaded through all stages. Each stage
/// reads fields written by earlier stages and writes its own exactly once.
#[derive(Debug)]
pub struct PipelineState {
    pub candidates: Vec<CandidateRecord>,
    /// Candidate name → index into `candidates`; first occurrence wins on
    /// duplicate names. Built by sourcing.
    pub name_index: HashMap<String, usize>,
    /// Flattened textual join of all records, kept for inspection.
    pub parsed_profiles: Option<String>,
    pub all_relevance_scores: Option<Vec<EvaluationOutcome>>,
    pub diversity_analysis: Option<DiversityAnalysis>,
    pub final_selection: Option<FinalSelection>,
}

impl PipelineState {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            candidates,
            name_index: HashMap::new(),
            parsed_profiles: None,
            all_relevance_scores: None,
            diversity_analysis: None,
            final_selection: None,
        }
    }

    pub fn failed_evaluations(&self) -> usize {
        self.all_relevance_scores
            .as_deref()
            .map(|outcomes| outcomes.iter().filter(|o| o.is_failed()).count())
            .unwrap_or(0)
    }
}

/// Drives the four stages in order over a caller-owned state.
pub struct PipelineRunner<'a> {
    judge: &'a dyn Judge,
    progress: &'a dyn ProgressSink,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(judge: &'a dyn Judge, progress: &'a dyn ProgressSink) -> Self {
        Self { judge, progress }
    }

    /// Runs the pipeline to completion. On a stage failure the state keeps
    /// everything produced so far; `final_selection` is only ever set on a
    /// fully successful run.
    pub async fn run(&self, state: &mut PipelineState) -> Result<FinalSelection, StageFailure> {
        info!(
            "stage 1/4: {} ({} candidates)",
            Stage::Sourcing,
            state.candidates.len()
        );
        sourcing::run(state);

        info!("stage 2/4: {}", Stage::Screening);
        screening::run(state, self.judge, self.progress).await;
        info!(
            "stage 2/4 complete: {} evaluated, {} failed",
            state.candidates.len(),
            state.failed_evaluations()
        );

        info!("stage 3/4: {}", Stage::Diversity);
        diversity::run(state, self.judge).await?;

        info!("stage 4/4: {}", Stage::Selection);
        selection::run(state, self.judge).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared test support
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::judge::{EvaluationError, Judge};
    use crate::models::candidate::CandidateRecord;

    use super::progress::ProgressSink;

    /// Judge that replays a fixed queue of responses and records the prompts
    /// it was shown. Once the queue is exhausted every call fails.
    pub struct ScriptedJudge {
        responses: Mutex<VecDeque<Result<Value, EvaluationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedJudge {
        pub fn new(responses: Vec<Result<Value, EvaluationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn seen_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        async fn evaluate(&self, _system: &str, prompt: &str) -> Result<Value, EvaluationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(EvaluationError::EmptyContent))
        }
    }

    /// Sink that records every progress event.
    #[derive(Default)]
    pub struct CollectingSink {
        events: Mutex<Vec<(usize, usize)>>,
    }

    impl CollectingSink {
        pub fn events(&self) -> Vec<(usize, usize)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressSink for CollectingSink {
        fn on_progress(&self, processed: usize, total: usize) {
            self.events.lock().unwrap().push((processed, total));
        }
    }

    pub fn candidate(name: &str, location: &str, school: &str) -> CandidateRecord {
        serde_json::from_value(json!({
            "name": name,
            "location": location,
            "education": {"degrees": [{"school": school}]},
            "skills": ["Python"]
        }))
        .unwrap()
    }

    pub fn relevance_json(name: &str, score: u8) -> Value {
        json!({
            "candidate_name": name,
            "score": score,
            "justification": format!("scored {score} for test purposes")
        })
    }

    pub fn diversity_json(score: u8) -> Value {
        json!({
            "diversity_score": score,
            "justification": "test diversity rationale"
        })
    }

    pub fn selection_json(names: &[&str]) -> Value {
        json!({
            "selected_candidates": names,
            "summaries": names
                .iter()
                .map(|n| format!("{n} chosen for test purposes"))
                .collect::<Vec<_>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const TEAM: [&str; 5] = ["Ada", "Bob", "Cleo", "Dan", "Eve"];

    fn small_pool() -> Vec<CandidateRecord> {
        vec![
            candidate("Ada", "London", "Oxford"),
            candidate("Bob", "Lagos", "UNILAG"),
            candidate("Cleo", "Cairo", "AUC"),
        ]
    }

    #[tokio::test]
    async fn test_full_run_on_small_pool_returns_stubbed_selection() {
        // Pool of 3: the diversity subset is the whole pool (K > N) and the
        // stubbed selection passes through unchanged.
        let judge = ScriptedJudge::new(vec![
            Ok(relevance_json("Ada", 90)),
            Ok(relevance_json("Bob", 10)),
            Ok(relevance_json("Cleo", 50)),
            Ok(diversity_json(65)),
            Ok(selection_json(&TEAM)),
        ]);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(small_pool());

        let selection = runner.run(&mut state).await.unwrap();

        assert_eq!(selection.selected_candidates, TEAM.to_vec());
        assert_eq!(selection.summaries.len(), TEAM_SIZE);

        let outcomes = state.all_relevance_scores.as_ref().unwrap();
        let scores: Vec<u8> = outcomes.iter().map(|o| o.score()).collect();
        assert_eq!(scores, vec![90, 10, 50]);

        assert_eq!(state.diversity_analysis.as_ref().unwrap().diversity_score, 65);
        assert_eq!(sink.events(), vec![(1, 3), (2, 3), (3, 3)]);
        // All 3 candidates appear in the diversity prompt (subset = pool).
        let diversity_prompt = &judge.seen_prompts()[3];
        for name in ["Ada", "Bob", "Cleo"] {
            assert!(diversity_prompt.contains(name));
        }
    }

    #[tokio::test]
    async fn test_screening_failure_is_isolated_and_run_completes() {
        let judge = ScriptedJudge::new(vec![
            Ok(relevance_json("Ada", 90)),
            Err(EvaluationError::EmptyContent),
            Ok(diversity_json(55)),
            Ok(selection_json(&TEAM)),
        ]);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(vec![
            candidate("Ada", "London", "Oxford"),
            candidate("Bob", "Lagos", "UNILAG"),
        ]);

        let selection = runner.run(&mut state).await.unwrap();

        assert_eq!(selection.selected_candidates.len(), TEAM_SIZE);
        let outcomes = state.all_relevance_scores.as_ref().unwrap();
        assert_eq!(outcomes.len(), 2);
        let sentinel = outcomes[1].to_relevance_score();
        assert_eq!(sentinel.score, 0);
        assert_eq!(sentinel.justification, screening::FAILURE_JUSTIFICATION);
        assert_eq!(sink.events(), vec![(1, 2), (2, 2)]);
        assert_eq!(state.failed_evaluations(), 1);
    }

    #[tokio::test]
    async fn test_diversity_failure_aborts_run_with_stage_name() {
        let judge = ScriptedJudge::new(vec![
            Ok(relevance_json("Ada", 90)),
            Ok(relevance_json("Bob", 10)),
            Ok(relevance_json("Cleo", 50)),
            Err(EvaluationError::Api {
                status: 500,
                message: "upstream".to_string(),
            }),
        ]);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(small_pool());

        let err = runner.run(&mut state).await.unwrap_err();

        assert_eq!(err.stage, Stage::Diversity);
        assert!(err.to_string().contains("diversity analysis"));
        assert!(state.final_selection.is_none());
        // Screening results remain available for inspection.
        assert_eq!(state.all_relevance_scores.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_selection_failure_aborts_run() {
        let judge = ScriptedJudge::new(vec![
            Ok(relevance_json("Ada", 90)),
            Ok(relevance_json("Bob", 10)),
            Ok(relevance_json("Cleo", 50)),
            Ok(diversity_json(65)),
            Err(EvaluationError::EmptyContent),
        ]);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(small_pool());

        let err = runner.run(&mut state).await.unwrap_err();

        assert_eq!(err.stage, Stage::Selection);
        assert!(state.final_selection.is_none());
        assert!(state.diversity_analysis.is_some());
    }

    #[tokio::test]
    async fn test_empty_pool_screens_nothing_and_fails_at_diversity() {
        let judge = ScriptedJudge::new(vec![]);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(vec![]);

        let err = runner.run(&mut state).await.unwrap_err();

        assert_eq!(err.stage, Stage::Diversity);
        assert!(matches!(err.kind, StageFailureKind::EmptyPool));
        assert_eq!(state.all_relevance_scores.as_ref().unwrap().len(), 0);
        assert!(sink.events().is_empty());
        assert!(state.final_selection.is_none());
        // No judge call was ever made.
        assert!(judge.seen_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_large_pool_only_top_k_reaches_diversity_prompt() {
        let mut candidates = Vec::new();
        let mut responses = Vec::new();
        for i in 0..30 {
            let name = format!("Candidate {i:02}");
            candidates.push(candidate(&name, "City", "School"));
            responses.push(Ok(relevance_json(&name, i as u8)));
        }
        responses.push(Ok(diversity_json(50)));
        responses.push(Ok(selection_json(&TEAM)));

        let judge = ScriptedJudge::new(responses);
        let sink = CollectingSink::default();
        let runner = PipelineRunner::new(&judge, &sink);
        let mut state = PipelineState::new(candidates);

        runner.run(&mut state).await.unwrap();

        let diversity_prompt = &judge.seen_prompts()[30];
        // Scores 10..=29 make the top 20; scores 0..=9 do not.
        assert!(diversity_prompt.contains("Candidate 29"));
        assert!(diversity_prompt.contains("Candidate 10"));
        assert!(!diversity_prompt.contains("Candidate 09"));
    }
}
