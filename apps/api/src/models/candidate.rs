//! Candidate data model — the freeform applicant records consumed by the
//! screening pipeline.
//!
//! Records come from the form-submission export and vary widely in shape.
//! Only `name` is required; every other field is optional and renders as
//! [`UNAVAILABLE`] when missing. Unknown fields are preserved verbatim so the
//! full profile can be shown to the screening judge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder rendered for any profile field the candidate did not supply.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Degree {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub highest_level: Option<String>,
    #[serde(default)]
    pub degrees: Vec<Degree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(rename = "roleName", default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single applicant record. Immutable once sourced; the pipeline only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub education: Option<Education>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateRecord {
    /// The candidate's name, or the placeholder if the export left it blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNAVAILABLE
        } else {
            &self.name
        }
    }

    pub fn location_or_unavailable(&self) -> &str {
        self.location.as_deref().unwrap_or(UNAVAILABLE)
    }

    /// School of the first listed degree. Used in diversity summary lines.
    pub fn primary_school(&self) -> &str {
        self.education
            .as_ref()
            .and_then(|e| e.degrees.first())
            .and_then(|d| d.school.as_deref())
            .unwrap_or(UNAVAILABLE)
    }

    /// Full textual rendering of the record, embedded in the screening prompt
    /// and in the sourced-profiles diagnostic join.
    pub fn profile_text(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| format!("Name: {}", self.display_name()))
    }
}
