//! Score ranking shared by the diversity and selection stages.
//!
//! Both stages call this independently rather than passing the ranked subset
//! between them, keeping the stages decoupled. The sort is stable: ties keep
//! their original (source) order, so the top-K subset is deterministic for a
//! given score list.

use std::cmp::Reverse;

use super::screening::EvaluationOutcome;

/// Returns references to the top `k` outcomes by descending score.
/// Failed evaluations rank as score 0.
pub fn top_by_score(outcomes: &[EvaluationOutcome], k: usize) -> Vec<&EvaluationOutcome> {
    let mut ranked: Vec<&EvaluationOutcome> = outcomes.iter().collect();
    ranked.sort_by_key(|o| Reverse(o.score()));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::screening::RelevanceScore;

    fn scored(name: &str, score: u8) -> EvaluationOutcome {
        EvaluationOutcome::Scored(RelevanceScore {
            candidate_name: name.to_string(),
            score,
            justification: "test".to_string(),
        })
    }

    #[test]
    fn test_ranks_descending_by_score() {
        let outcomes = vec![scored("low", 10), scored("high", 90), scored("mid", 50)];
        let top = top_by_score(&outcomes, 3);
        let names: Vec<&str> = top.iter().map(|o| o.candidate_name()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_truncates_to_k() {
        let outcomes = vec![scored("a", 1), scored("b", 2), scored("c", 3)];
        assert_eq!(top_by_score(&outcomes, 2).len(), 2);
    }

    #[test]
    fn test_k_larger_than_pool_returns_all() {
        let outcomes = vec![scored("a", 1)];
        assert_eq!(top_by_score(&outcomes, 20).len(), 1);
    }

    #[test]
    fn test_ties_keep_source_order() {
        let outcomes = vec![scored("first", 50), scored("second", 50), scored("third", 50)];
        let top = top_by_score(&outcomes, 3);
        let names: Vec<&str> = top.iter().map(|o| o.candidate_name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failed_outcomes_rank_last() {
        let outcomes = vec![
            EvaluationOutcome::Failed {
                candidate_name: "broken".to_string(),
            },
            scored("fine", 1),
        ];
        let top = top_by_score(&outcomes, 2);
        assert_eq!(top[0].candidate_name(), "fine");
        assert_eq!(top[1].candidate_name(), "broken");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let outcomes = vec![scored("a", 30), scored("b", 30), scored("c", 70)];
        let first: Vec<&str> = top_by_score(&outcomes, 2)
            .iter()
            .map(|o| o.candidate_name())
            .collect();
        let second: Vec<&str> = top_by_score(&outcomes, 2)
            .iter()
            .map(|o| o.candidate_name())
            .collect();
        assert_eq!(first, second);
    }
}
