//! Sourcing stage — prepares the shared state before any judge call.
//!
//! Builds the name → index map used by later stages to resolve scored names
//! back to candidate records (first occurrence wins on duplicate names), and
//! the flattened profile join kept for inspection. No external calls; an
//! empty pool is valid and the pipeline proceeds trivially.

use std::collections::HashMap;

use tracing::{info, warn};

use super::PipelineState;

pub fn run(state: &mut PipelineState) {
    let mut name_index: HashMap<String, usize> = HashMap::with_capacity(state.candidates.len());

    for (index, candidate) in state.candidates.iter().enumerate() {
        let name = candidate.display_name().to_string();
        if name_index.contains_key(&name) {
            warn!("duplicate candidate name '{name}' — keeping first occurrence");
        } else {
            name_index.insert(name, index);
        }
    }

    let parsed_profiles = state
        .candidates
        .iter()
        .map(|c| c.profile_text())
        .collect::<Vec<_>>()
        .join("\n---\n");

    info!("sourced {} candidate profiles", state.candidates.len());

    state.name_index = name_index;
    state.parsed_profiles = Some(parsed_profiles);
}
