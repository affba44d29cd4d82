//! Candidate data model — the canonical person record and everything derived
//! from it.
//!
//! `RawRecord` is the only dynamically-shaped value in the pipeline; the
//! normalizer is the single boundary where shape is fixed into `Candidate`.
//! After the merger runs, candidates are frozen — the scorer and outreach
//! generator only read them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unnormalized, source-specific payload straight off an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub source_id: String,
    pub fetched_at: DateTime<Utc>,
    /// Set when the record was produced by an adapter running in demo mode.
    #[serde(default)]
    pub synthetic: bool,
    pub payload: serde_json::Value,
}

/// One role in a candidate's history. Dates are "YYYY-MM" or "YYYY" strings;
/// a missing end (or the literal "present") marks a current role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Experience {
    pub fn is_current(&self) -> bool {
        match self.end.as_deref() {
            None => true,
            Some(e) => e.eq_ignore_ascii_case("present"),
        }
    }

    /// Completed-role tenure in years, when both endpoints parse.
    pub fn tenure_years(&self) -> Option<f64> {
        if self.is_current() {
            return None;
        }
        let start = parse_year_month(self.start.as_deref()?)?;
        let end = parse_year_month(self.end.as_deref()?)?;
        let days = (end - start).num_days();
        if days <= 0 {
            return None;
        }
        Some(days as f64 / 365.25)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_year_month(self.start.as_deref()?)
    }
}

/// Parses "YYYY-MM" or bare "YYYY" into the first day of that month/year.
pub fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some((y, m)) = s.split_once('-') {
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    } else {
        let year: i32 = s.parse().ok()?;
        NaiveDate::from_ymd_opt(year, 1, 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    #[serde(default)]
    pub year: Option<String>,
}

/// A notable public repository on a code-hosting profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotableRepo {
    pub name: String,
    pub stars: u32,
}

/// Source-specific enrichment, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceData {
    /// Summary text from the primary professional-network profile.
    Profile { snippet: String },
    CodeHosting {
        username: String,
        public_repos: u32,
        followers: u32,
        top_languages: Vec<String>,
        notable_repos: Vec<NotableRepo>,
    },
    Microblog {
        username: String,
        followers: u32,
        bio: String,
    },
    PersonalSite {
        url: String,
        has_blog: bool,
        has_portfolio: bool,
        topics: Vec<String>,
    },
}

/// Enrichment plus the fetch timestamp that decides merge conflicts
/// (later-fetched wins per source id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub fetched_at: DateTime<Utc>,
    pub data: SourceData,
}

/// Normalized representation of a person aggregated across sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable dedup key: canonical profile URL, or a name+location hash.
    pub identity_key: String,
    pub name: String,
    pub headline: String,
    pub location: String,
    pub primary_profile_url: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: BTreeSet<String>,
    pub sources: BTreeMap<String, SourceAttribution>,
    /// Weighted fraction of expected fields present, in [0, 1].
    pub completeness: f64,
}

impl Candidate {
    /// Most recent role whose company is known, preferring current roles and
    /// then later start dates.
    pub fn recent_role(&self) -> Option<&Experience> {
        self.experience
            .iter()
            .filter(|e| !e.company.trim().is_empty())
            .max_by_key(|e| (e.is_current(), e.start_date()))
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

/// A candidate plus its rubric evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Weighted rubric score in [0, 10].
    pub fit_score: f64,
    /// Raw per-dimension scores, pre-weighting, each in [0, 10].
    pub breakdown: BTreeMap<String, f64>,
    /// completeness × dimension coverage, in [0, 1].
    pub confidence: f64,
    pub insights: Vec<String>,
}

/// How an outreach body was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachMethod {
    Ai,
    Template,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachMessage {
    /// Identity key of the candidate this message addresses.
    pub candidate_ref: String,
    pub body: String,
    pub method: OutreachMethod,
    pub generated_at: DateTime<Utc>,
    pub char_count: usize,
}

impl OutreachMessage {
    pub fn new(candidate_ref: String, body: String, method: OutreachMethod) -> Self {
        let char_count = body.chars().count();
        Self {
            candidate_ref,
            body,
            method,
            generated_at: Utc::now(),
            char_count,
        }
    }
}
