//! Profile merger — dedups candidates by identity key and unions their
//! multi-source data.
//!
//! Merging is idempotent: running it over an already-merged set changes
//! nothing but the recomputed completeness.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::candidate::Candidate;
use crate::pipeline::normalizer::compute_completeness;

/// Groups candidates by identity key and merges each group. Output order is
/// deterministic (ascending identity key).
pub fn merge_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut groups: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry(candidate.identity_key.clone())
            .or_default()
            .push(candidate);
    }

    groups
        .into_values()
        .map(|group| {
            let merged = merge_group(group);
            debug!(identity = %merged.identity_key, "merged candidate group");
            merged
        })
        .collect()
}

/// Merges one identity group. The most complete record is the base; ties
/// break on source count so enriched records win over bare ones.
fn merge_group(mut group: Vec<Candidate>) -> Candidate {
    let base_index = group
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.completeness
                .total_cmp(&b.completeness)
                .then(a.sources.len().cmp(&b.sources.len()))
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut base = group.swap_remove(base_index);

    for other in group {
        if base.name.trim().is_empty() {
            base.name = other.name;
        }
        if base.headline.trim().is_empty() {
            base.headline = other.headline;
        }
        if base.location.trim().is_empty() {
            base.location = other.location;
        }
        if base.primary_profile_url.is_empty() {
            base.primary_profile_url = other.primary_profile_url;
        }

        base.skills.extend(other.skills);

        // Experience union by (company, title, start); conflicts keep the
        // longer description.
        for exp in other.experience {
            let key = (
                exp.company.to_lowercase(),
                exp.title.to_lowercase(),
                exp.start.clone(),
            );
            match base.experience.iter_mut().find(|e| {
                (e.company.to_lowercase(), e.title.to_lowercase(), e.start.clone()) == key
            }) {
                Some(existing) => {
                    if exp.description.len() > existing.description.len() {
                        existing.description = exp.description;
                    }
                    if existing.end.is_none() {
                        existing.end = exp.end;
                    }
                }
                None => base.experience.push(exp),
            }
        }

        // Education union by (school, degree, year).
        for edu in other.education {
            let exists = base.education.iter().any(|e| {
                e.school.eq_ignore_ascii_case(&edu.school)
                    && e.degree.eq_ignore_ascii_case(&edu.degree)
                    && e.year == edu.year
            });
            if !exists {
                base.education.push(edu);
            }
        }

        // Source union; per source id, the later-fetched attribution wins.
        for (source_id, attribution) in other.sources {
            match base.sources.get(&source_id) {
                Some(existing) if existing.fetched_at >= attribution.fetched_at => {}
                _ => {
                    base.sources.insert(source_id, attribution);
                }
            }
        }
    }

    base.completeness = compute_completeness(&base);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{
        Education, Experience, SourceAttribution, SourceData,
    };
    use chrono::{Duration, Utc};
    use std::collections::{BTreeMap, BTreeSet};

    fn candidate(key: &str, skills: &[&str], completeness: f64) -> Candidate {
        Candidate {
            identity_key: key.to_string(),
            name: "Sarah Chen".to_string(),
            headline: "Senior ML Engineer at Google".to_string(),
            location: "Mountain View, CA".to_string(),
            primary_profile_url: key.to_string(),
            experience: vec![],
            education: vec![],
            skills: skills.iter().map(|s| s.to_string()).collect(),
            sources: BTreeMap::new(),
            completeness,
        }
    }

    #[test]
    fn test_skills_union_across_records() {
        let a = candidate("https://linkedin.com/in/x", &["python", "aws"], 0.5);
        let b = candidate("https://linkedin.com/in/x", &["aws", "kubernetes"], 0.4);
        let merged = merge_candidates(vec![a.clone(), b]);
        assert_eq!(merged.len(), 1);
        let expected: BTreeSet<String> = ["python", "aws", "kubernetes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(merged[0].skills, expected);
        assert!(
            merged[0].completeness >= a.completeness,
            "union never loses completeness"
        );
    }

    #[test]
    fn test_distinct_identities_not_merged() {
        let a = candidate("https://linkedin.com/in/x", &[], 0.5);
        let b = candidate("https://linkedin.com/in/y", &[], 0.5);
        assert_eq!(merge_candidates(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_experience_conflict_keeps_longer_description() {
        let mut a = candidate("k", &[], 0.6);
        a.experience = vec![Experience {
            title: "ML Engineer".to_string(),
            company: "Google".to_string(),
            start: Some("2021-06".to_string()),
            end: Some("present".to_string()),
            description: "short".to_string(),
        }];
        let mut b = candidate("k", &[], 0.4);
        b.experience = vec![Experience {
            title: "ml engineer".to_string(),
            company: "google".to_string(),
            start: Some("2021-06".to_string()),
            end: Some("present".to_string()),
            description: "a much longer description of the role".to_string(),
        }];
        let merged = merge_candidates(vec![a, b]);
        assert_eq!(merged[0].experience.len(), 1);
        assert!(merged[0].experience[0].description.starts_with("a much longer"));
    }

    #[test]
    fn test_education_union_by_key() {
        let mut a = candidate("k", &[], 0.6);
        a.education = vec![Education {
            degree: "MS CS".to_string(),
            school: "Stanford".to_string(),
            year: Some("2019".to_string()),
        }];
        let mut b = candidate("k", &[], 0.4);
        b.education = vec![
            Education {
                degree: "ms cs".to_string(),
                school: "stanford".to_string(),
                year: Some("2019".to_string()),
            },
            Education {
                degree: "BS CS".to_string(),
                school: "UCLA".to_string(),
                year: Some("2017".to_string()),
            },
        ];
        let merged = merge_candidates(vec![a, b]);
        assert_eq!(merged[0].education.len(), 2);
    }

    #[test]
    fn test_later_fetched_source_wins() {
        let now = Utc::now();
        let mut a = candidate("k", &[], 0.6);
        a.sources.insert(
            "github".to_string(),
            SourceAttribution {
                fetched_at: now - Duration::hours(2),
                data: SourceData::CodeHosting {
                    username: "old".to_string(),
                    public_repos: 1,
                    followers: 1,
                    top_languages: vec![],
                    notable_repos: vec![],
                },
            },
        );
        let mut b = candidate("k", &[], 0.4);
        b.sources.insert(
            "github".to_string(),
            SourceAttribution {
                fetched_at: now,
                data: SourceData::CodeHosting {
                    username: "new".to_string(),
                    public_repos: 2,
                    followers: 2,
                    top_languages: vec![],
                    notable_repos: vec![],
                },
            },
        );
        let merged = merge_candidates(vec![a, b]);
        match &merged[0].sources.get("github").unwrap().data {
            SourceData::CodeHosting { username, .. } => assert_eq!(username, "new"),
            other => panic!("unexpected source data: {other:?}"),
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut a = candidate("k", &["python"], 0.6);
        a.experience = vec![Experience {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start: Some("2020-01".to_string()),
            end: Some("2022-01".to_string()),
            description: "built things".to_string(),
        }];
        let b = candidate("k", &["aws"], 0.4);

        let once = merge_candidates(vec![a, b]);
        let twice = merge_candidates(once.clone());

        assert_eq!(once.len(), twice.len());
        assert_eq!(once[0].skills, twice[0].skills);
        assert_eq!(once[0].experience, twice[0].experience);
        assert_eq!(once[0].education, twice[0].education);
        assert_eq!(once[0].completeness, twice[0].completeness);
    }

    #[test]
    fn test_base_fields_filled_from_less_complete_record() {
        let mut a = candidate("k", &[], 0.8);
        a.location = String::new();
        let b = candidate("k", &[], 0.2);
        let merged = merge_candidates(vec![a, b]);
        assert_eq!(merged[0].location, "Mountain View, CA");
    }
}
