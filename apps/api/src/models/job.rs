//! Job-level data model — the query coming in and the result going out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::{OutreachMessage, ScoredCandidate};

/// Tolerance when checking that rubric weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Seniority bands recognized in job specs and candidate titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Staff,
    Principal,
    Lead,
    Manager,
    Director,
    Vp,
    CLevel,
    #[default]
    Unknown,
}

/// Per-dimension scoring weights. Serialized as a map of dimension → weight.
///
/// Weights must be non-negative and sum to 1.0 ± 1e-6 (see `JobSpec::validate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricWeights {
    pub education: f64,
    pub career_trajectory: f64,
    pub company_relevance: f64,
    pub experience_match: f64,
    pub location_match: f64,
    pub tenure: f64,
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            education: 0.20,
            career_trajectory: 0.20,
            company_relevance: 0.15,
            experience_match: 0.25,
            location_match: 0.10,
            tenure: 0.10,
        }
    }
}

impl RubricWeights {
    pub fn sum(&self) -> f64 {
        self.education
            + self.career_trajectory
            + self.company_relevance
            + self.experience_match
            + self.location_match
            + self.tenure
    }

    fn all_non_negative(&self) -> bool {
        [
            self.education,
            self.career_trajectory,
            self.company_relevance,
            self.experience_match,
            self.location_match,
            self.tenure,
        ]
        .iter()
        .all(|w| *w >= 0.0)
    }
}

/// The structured query describing the role and search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    /// Opaque id, unique per call. Generated when empty.
    #[serde(default)]
    pub id: String,
    pub description: String,
    /// Role title used in outreach context (e.g. "ML Research Engineer").
    #[serde(default)]
    pub title: String,
    /// Hiring company used in outreach context.
    #[serde(default)]
    pub company: String,
    /// Short selling points surfaced in outreach messages.
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_skills: BTreeSet<String>,
    /// Ordered geographic preferences: city, metro, or "remote".
    #[serde(default)]
    pub location_preferences: Vec<String>,
    #[serde(default)]
    pub seniority_hint: Seniority,
    #[serde(default)]
    pub rubric_weights: RubricWeights,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default)]
    pub include_outreach: bool,
}

fn default_max_candidates() -> usize {
    10
}

impl JobSpec {
    /// Validates the spec, filling in a generated id when the caller omitted one.
    /// Invalid specs never start a job.
    pub fn validate(&mut self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            self.id = format!("job-{}", Uuid::new_v4());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        if self.max_candidates == 0 {
            return Err("max_candidates must be at least 1".to_string());
        }
        if !self.rubric_weights.all_non_negative() {
            return Err("rubric_weights must be non-negative".to_string());
        }
        let sum = self.rubric_weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!(
                "rubric_weights must sum to 1.0 (got {sum:.6})"
            ));
        }
        Ok(())
    }
}

/// A non-fatal, per-source error recorded in the result rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailure {
    pub source_id: String,
    pub reason: String,
}

/// Final output of one sourcing job. Owned by the caller once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub candidates_found: usize,
    pub top_candidates: Vec<ScoredCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<OutreachMessage>>,
    pub processing_time_ms: u64,
    pub partial_failures: Vec<PartialFailure>,
}
