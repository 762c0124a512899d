// src/parser/models.rs
//! Data structures for parsed resumes and batch results.

use serde::{Deserialize, Serialize};

/// Structured fields extracted from a resume.
///
/// Every scalar field is optional: `None` means the model could not
/// determine the value, which is distinct from an empty string. The skill
/// lists may be empty. JSON field names are camelCase; this is the wire
/// contract shared by the model prompt, the cache files, and the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Core technical competencies, most prominent first.
    #[serde(default)]
    pub primary_skills: Vec<String>,

    /// Supporting technologies and tools.
    #[serde(default)]
    pub secondary_skills: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,

    /// How the model decided on the skill lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_source: Option<String>,
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub filename: String,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResumeRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn parsed(filename: String, data: ResumeRecord) -> Self {
        Self {
            filename,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            success: false,
            data: None,
            error: Some(error),
        }
    }
}
