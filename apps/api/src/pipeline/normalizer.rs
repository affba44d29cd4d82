//! Profile normalizer — the single boundary where dynamically-shaped source
//! payloads become the canonical Candidate record.
//!
//! A payload that cannot produce at least a person name is dropped; the
//! orchestrator counts the drop as an "unparseable" partial failure.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};
use url::Url;

use crate::cache::hex_prefix;
use crate::models::candidate::{
    Candidate, Education, Experience, NotableRepo, RawRecord, SourceAttribution, SourceData,
};
use crate::sources;

/// Field weights behind the completeness fraction. The expected-field set is
/// {name, headline, location, profile_url, experience≥1, education≥1,
/// skills≥3}; weights sum to 1.
const COMPLETENESS_WEIGHTS: &[(&str, f64)] = &[
    ("name", 0.15),
    ("headline", 0.10),
    ("location", 0.10),
    ("profile_url", 0.15),
    ("experience", 0.20),
    ("education", 0.15),
    ("skills", 0.15),
];

pub struct Normalizer {
    vocabulary: Vec<String>,
}

impl Normalizer {
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self { vocabulary }
    }

    /// Converts one RawRecord into a Candidate. Returns None when the payload
    /// is unparseable for its source.
    pub fn normalize(&self, record: &RawRecord) -> Option<Candidate> {
        let mut candidate = match record.source_id.as_str() {
            sources::LINKEDIN => self.from_linkedin(record)?,
            sources::GITHUB => self.from_github(record)?,
            sources::TWITTER => self.from_twitter(record)?,
            sources::WEBSITE => self.from_website(record)?,
            _ => return None,
        };
        candidate.identity_key = identity_key(
            &candidate.primary_profile_url,
            &candidate.name,
            &candidate.location,
        );
        candidate.completeness = compute_completeness(&candidate);
        Some(candidate)
    }

    fn from_linkedin(&self, record: &RawRecord) -> Option<Candidate> {
        let payload = &record.payload;
        let name = non_empty_str(payload, "name")?;
        let headline = str_or_default(payload, "headline");
        let snippet = str_or_default(payload, "snippet");
        let location = str_or_default(payload, "location");
        let url = payload
            .get("profile_url")
            .and_then(|v| v.as_str())
            .and_then(canonicalize_url)
            .unwrap_or_default();

        let experience: Vec<Experience> = payload
            .get("experience")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let education: Vec<Education> = payload
            .get("education")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        let explicit: Vec<String> = payload
            .get("skills")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let free_text = format!(
            "{headline} {snippet} {}",
            experience
                .iter()
                .map(|e| e.description.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let skills = self.tokenize_skills(&explicit, &free_text);

        let mut sources_map = BTreeMap::new();
        if !snippet.is_empty() {
            sources_map.insert(
                sources::LINKEDIN.to_string(),
                SourceAttribution {
                    fetched_at: record.fetched_at,
                    data: SourceData::Profile { snippet },
                },
            );
        }

        Some(Candidate {
            identity_key: String::new(), // filled by normalize()
            name,
            headline,
            location,
            primary_profile_url: url,
            experience,
            education,
            skills,
            sources: sources_map,
            completeness: 0.0,
        })
    }

    fn from_github(&self, record: &RawRecord) -> Option<Candidate> {
        let payload = &record.payload;
        let username = non_empty_str(payload, "username")?;
        let name = payload
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(username.as_str())
            .to_string();
        let location = str_or_default(payload, "location");
        let url = payload
            .get("linkedin_url")
            .or_else(|| payload.get("html_url"))
            .and_then(|v| v.as_str())
            .and_then(canonicalize_url)
            .unwrap_or_default();

        let top_languages: Vec<String> = payload
            .get("top_languages")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let notable_repos: Vec<NotableRepo> = payload
            .get("notable_repos")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        let data = SourceData::CodeHosting {
            username,
            public_repos: payload
                .get("public_repos")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            followers: payload.get("followers").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            top_languages: top_languages.clone(),
            notable_repos,
        };

        Some(Candidate {
            identity_key: String::new(),
            name,
            headline: str_or_default(payload, "bio"),
            location,
            primary_profile_url: url,
            experience: vec![],
            education: vec![],
            skills: self.tokenize_skills(&top_languages, ""),
            sources: BTreeMap::from([(
                sources::GITHUB.to_string(),
                SourceAttribution {
                    fetched_at: record.fetched_at,
                    data,
                },
            )]),
            completeness: 0.0,
        })
    }

    fn from_twitter(&self, record: &RawRecord) -> Option<Candidate> {
        let payload = &record.payload;
        let username = non_empty_str(payload, "username")?;
        let name = payload
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(username.as_str())
            .to_string();
        let bio = str_or_default(payload, "bio");
        let url = payload
            .get("linkedin_url")
            .and_then(|v| v.as_str())
            .and_then(canonicalize_url)
            .unwrap_or_default();

        let data = SourceData::Microblog {
            username,
            followers: payload.get("followers").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
            bio: bio.clone(),
        };

        Some(Candidate {
            identity_key: String::new(),
            name,
            headline: bio.clone(),
            location: str_or_default(payload, "location"),
            primary_profile_url: url,
            experience: vec![],
            education: vec![],
            skills: self.tokenize_skills(&[], &bio),
            sources: BTreeMap::from([(
                sources::TWITTER.to_string(),
                SourceAttribution {
                    fetched_at: record.fetched_at,
                    data,
                },
            )]),
            completeness: 0.0,
        })
    }

    fn from_website(&self, record: &RawRecord) -> Option<Candidate> {
        let payload = &record.payload;
        let name = non_empty_str(payload, "owner_name")?;
        let site_url = str_or_default(payload, "url");
        let topics: Vec<String> = payload
            .get("topics")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let url = payload
            .get("linkedin_url")
            .and_then(|v| v.as_str())
            .and_then(canonicalize_url)
            .unwrap_or_default();

        let data = SourceData::PersonalSite {
            url: site_url,
            has_blog: payload.get("has_blog").and_then(|v| v.as_bool()).unwrap_or(false),
            has_portfolio: payload
                .get("has_portfolio")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            topics: topics.clone(),
        };

        Some(Candidate {
            identity_key: String::new(),
            name,
            headline: String::new(),
            location: String::new(),
            primary_profile_url: url,
            experience: vec![],
            education: vec![],
            skills: self.tokenize_skills(&topics, ""),
            sources: BTreeMap::from([(
                sources::WEBSITE.to_string(),
                SourceAttribution {
                    fetched_at: record.fetched_at,
                    data,
                },
            )]),
            completeness: 0.0,
        })
    }

    /// Lowercases and dedupes explicit skill tokens, then adds vocabulary
    /// phrases found in the free text.
    fn tokenize_skills(&self, explicit: &[String], free_text: &str) -> BTreeSet<String> {
        let mut skills: BTreeSet<String> = explicit
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !free_text.is_empty() {
            let lower = free_text.to_lowercase();
            for phrase in &self.vocabulary {
                if lower.contains(phrase.as_str()) {
                    skills.insert(phrase.clone());
                }
            }
        }
        skills
    }
}

/// Splits a headline into (title, company). The left-hand side of the first
/// " at " is the title; the first segment after it (up to "•", "|", " - ")
/// is the company. Without an "at" the whole first segment is the title.
pub fn split_headline(headline: &str) -> (String, String) {
    let trimmed = headline.trim();
    if let Some(idx) = find_at_separator(trimmed) {
        let title = first_segment(&trimmed[..idx]);
        let company = first_segment(&trimmed[idx + 4..]);
        (title, company)
    } else {
        (first_segment(trimmed), String::new())
    }
}

fn find_at_separator(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len().saturating_sub(3)).find(|&i| {
        bytes[i] == b' '
            && bytes[i + 1].eq_ignore_ascii_case(&b'a')
            && bytes[i + 2].eq_ignore_ascii_case(&b't')
            && bytes[i + 3] == b' '
    })
}

/// First segment before any of the common headline separators, trimmed.
fn first_segment(s: &str) -> String {
    let mut result = s;
    for sep in ["•", "|", " - ", " @ ", "("] {
        if let Some(idx) = result.find(sep) {
            result = &result[..idx];
        }
    }
    result.trim().trim_end_matches(',').to_string()
}

/// Lowercased scheme+host, query and fragment stripped, no trailing slash.
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?.to_lowercase();
    let path = url.path().trim_end_matches('/');
    Some(format!("{}://{}{}", url.scheme(), host, path))
}

/// Canonical URL when present, else a stable hash of the lowercased name and
/// the first non-empty location token.
pub fn identity_key(canonical_url: &str, name: &str, location: &str) -> String {
    if !canonical_url.is_empty() {
        return canonical_url.to_string();
    }
    let location_token = location
        .split([',', ' '])
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or("")
        .to_lowercase();
    let digest = Sha256::digest(format!("{}|{}", name.trim().to_lowercase(), location_token));
    format!("p:{}", hex_prefix(&digest, 16))
}

/// Weighted fraction of expected fields present.
pub fn compute_completeness(candidate: &Candidate) -> f64 {
    let mut score = 0.0;
    for (field, weight) in COMPLETENESS_WEIGHTS {
        let present = match *field {
            "name" => !candidate.name.trim().is_empty(),
            "headline" => !candidate.headline.trim().is_empty(),
            "location" => !candidate.location.trim().is_empty(),
            "profile_url" => !candidate.primary_profile_url.is_empty(),
            "experience" => !candidate.experience.is_empty(),
            "education" => !candidate.education.is_empty(),
            "skills" => candidate.skills.len() >= 3,
            _ => false,
        };
        if present {
            score += weight;
        }
    }
    score.clamp(0.0, 1.0)
}

fn non_empty_str(payload: &serde_json::Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn str_or_default(payload: &serde_json::Value, field: &str) -> String {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string()
}
