// All judge prompt constants for the screening pipeline.
// Templates use {placeholder} substitution; replace before sending.

/// System prompt for per-candidate screening — enforces JSON-only output.
pub const SCREENING_SYSTEM: &str = "You are a professional hiring screener. \
    Your task is to evaluate a single candidate profile based on a set of ideal \
    criteria for a tech startup. The ideal candidate has a strong background in \
    technology (like Python, React, AWS, or Data Science) or product management. \
    A degree from a top 50 university is a plus but not required. \
    Score the candidate from 0 to 100 based on their relevance to these criteria \
    and provide a brief justification. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Screening prompt template. Replace `{profile}` before sending.
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"Please score the following candidate.

Return a JSON object with this EXACT schema (no extra fields):
{
  "candidate_name": "The full name of the candidate",
  "score": 87,
  "justification": "A brief justification for the assigned score."
}

CANDIDATE PROFILE:
{profile}"#;

/// System prompt for the diversity analysis call.
pub const DIVERSITY_SYSTEM: &str = "You are a Diversity and Inclusion specialist. \
    Analyze the following list of top-scoring candidates to form a team of 5. \
    Your goal is to ensure a balanced and diverse team. Consider diversity in \
    location and educational background (e.g., mix of top-tier and other \
    universities). Provide a holistic diversity score from 0 to 100 for a \
    potential team of 5 derived from this list, and justify your score. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Diversity prompt template. Replace `{profiles}` before sending.
pub const DIVERSITY_PROMPT_TEMPLATE: &str = r#"Analyze this list for diversity to help form a team of 5.

Return a JSON object with this EXACT schema (no extra fields):
{
  "diversity_score": 72,
  "justification": "An explanation of the diversity score, considering location and educational background."
}

TOP CANDIDATES:
{profiles}"#;

/// System prompt for the final selection call.
pub const SELECTION_SYSTEM: &str = "You are the Hiring Manager. Your task is to \
    select the top 5 candidates for a new startup team. You have been provided \
    with relevance scores for all candidates and a diversity analysis. Your \
    final team should be a strong mix of technical talent, product/business \
    skills, and diversity. Select the best 5 candidates and provide a concise \
    summary for each, explaining exactly why they were chosen for the team. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Final selection prompt template.
/// Replace `{relevance_scores}` and `{diversity_analysis}` before sending.
pub const SELECTION_PROMPT_TEMPLATE: &str = r#"Based on the following data, make your final selection of 5 candidates.

Return a JSON object with this EXACT schema (no extra fields):
{
  "selected_candidates": ["Name One", "Name Two", "Name Three", "Name Four", "Name Five"],
  "summaries": ["Why Name One was chosen", "Why Name Two was chosen", "Why Name Three was chosen", "Why Name Four was chosen", "Why Name Five was chosen"]
}

HARD RULES:
1. `selected_candidates` MUST contain exactly 5 names drawn from the relevance scores below
2. `summaries` MUST contain exactly 5 entries, index-aligned with `selected_candidates`

Relevance Scores (Top 20 shown for brevity):
{relevance_scores}

Diversity Analysis:
{diversity_analysis}"#;
