//! Fit scorer — applies the weighted rubric to a Candidate against a JobSpec.
//!
//! Six dimensions, each scored raw on [0, 10] before weighting. A dimension
//! whose inputs are missing scores the neutral 5.0 and is excluded from the
//! coverage fraction; `confidence = completeness × coverage`. The weighted sum
//! is taken exactly as configured — no re-normalization — so scaling all
//! weights scales the final score linearly.

pub mod seniority;

use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::models::candidate::{Candidate, ScoredCandidate};
use crate::models::job::JobSpec;
use crate::scoring::seniority::{function_category, title_rung};

/// Neutral value for dimensions with missing inputs.
const NEUTRAL: f64 = 5.0;
const MAX_INSIGHTS: usize = 6;

/// Rubric dimensions, in breakdown/report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Education,
    CareerTrajectory,
    CompanyRelevance,
    ExperienceMatch,
    LocationMatch,
    Tenure,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Education,
        Dimension::CareerTrajectory,
        Dimension::CompanyRelevance,
        Dimension::ExperienceMatch,
        Dimension::LocationMatch,
        Dimension::Tenure,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Education => "education",
            Dimension::CareerTrajectory => "career_trajectory",
            Dimension::CompanyRelevance => "company_relevance",
            Dimension::ExperienceMatch => "experience_match",
            Dimension::LocationMatch => "location_match",
            Dimension::Tenure => "tenure",
        }
    }
}

/// Raw dimension outcome: the [0, 10] value and whether its inputs were
/// actually present (missing inputs score neutral and drop out of coverage).
#[derive(Debug, Clone, Copy)]
struct DimensionScore {
    value: f64,
    inputs_present: bool,
}

impl DimensionScore {
    fn present(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 10.0),
            inputs_present: true,
        }
    }

    fn missing() -> Self {
        Self {
            value: NEUTRAL,
            inputs_present: false,
        }
    }
}

/// Companies that signal an obviously off-domain background for technology
/// sourcing.
const OFF_DOMAIN_MARKERS: &[&str] = &[
    "restaurant",
    "retail",
    "hospitality",
    "staffing",
    "real estate",
];

/// City groups treated as one metro area for location scoring.
const METRO_AREAS: &[&[&str]] = &[
    &[
        "san francisco",
        "sf",
        "bay area",
        "silicon valley",
        "mountain view",
        "palo alto",
        "menlo park",
        "san jose",
        "sunnyvale",
        "santa clara",
        "cupertino",
        "redwood city",
        "oakland",
        "berkeley",
        "fremont",
    ],
    &["new york", "nyc", "brooklyn", "manhattan", "jersey city"],
    &["seattle", "bellevue", "redmond", "kirkland"],
    &["los angeles", "santa monica", "pasadena", "long beach"],
    &["london", "cambridge uk"],
];

const REMOTE_MARKERS: &[&str] = &["remote", "distributed", "anywhere", "worldwide", "global"];

pub struct FitScorer {
    config: ScoringConfig,
}

impl FitScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Scores one frozen candidate against the job.
    pub fn score(&self, candidate: &Candidate, job: &JobSpec) -> ScoredCandidate {
        let scores: Vec<(Dimension, DimensionScore)> = Dimension::ALL
            .iter()
            .map(|dim| (*dim, self.score_dimension(*dim, candidate, job)))
            .collect();

        let weights = &job.rubric_weights;
        let mut fit_score = 0.0;
        let mut covered = 0usize;
        let mut breakdown = BTreeMap::new();
        for (dim, ds) in &scores {
            let weight = match dim {
                Dimension::Education => weights.education,
                Dimension::CareerTrajectory => weights.career_trajectory,
                Dimension::CompanyRelevance => weights.company_relevance,
                Dimension::ExperienceMatch => weights.experience_match,
                Dimension::LocationMatch => weights.location_match,
                Dimension::Tenure => weights.tenure,
            };
            fit_score += weight * ds.value;
            if ds.inputs_present {
                covered += 1;
            }
            breakdown.insert(dim.key().to_string(), ds.value);
        }

        let coverage = covered as f64 / Dimension::ALL.len() as f64;
        let confidence = (candidate.completeness * coverage).clamp(0.0, 1.0);
        let insights = build_insights(candidate, &breakdown);

        ScoredCandidate {
            candidate: candidate.clone(),
            fit_score,
            breakdown,
            confidence,
            insights,
        }
    }

    fn score_dimension(
        &self,
        dimension: Dimension,
        candidate: &Candidate,
        job: &JobSpec,
    ) -> DimensionScore {
        match dimension {
            Dimension::Education => self.score_education(candidate),
            Dimension::CareerTrajectory => score_trajectory(candidate),
            Dimension::CompanyRelevance => self.score_company(candidate),
            Dimension::ExperienceMatch => score_experience_match(candidate, job),
            Dimension::LocationMatch => score_location(candidate, job),
            Dimension::Tenure => score_tenure(candidate),
        }
    }

    /// Elite schools 9–10, strong 7–8.5, any completed degree 5–6.5; advanced
    /// degrees push toward the top of the band. No education with experience
    /// present scores the compensated 4.0.
    fn score_education(&self, candidate: &Candidate) -> DimensionScore {
        if candidate.education.is_empty() {
            if candidate.experience.is_empty() {
                return DimensionScore::missing();
            }
            return DimensionScore::present(4.0);
        }

        let mut best: f64 = 0.0;
        for edu in &candidate.education {
            let school = edu.school.to_lowercase();
            let degree = edu.degree.to_lowercase();
            let advanced = degree.contains("phd") || degree.contains("doctor");
            let masters = degree.contains("master")
                || degree.contains("ms ")
                || degree.starts_with("ms")
                || degree.contains("meng")
                || degree.contains("mba")
                || degree.contains("msc");

            let base = if self
                .config
                .elite_schools
                .iter()
                .any(|s| school.contains(s.as_str()))
            {
                if advanced {
                    10.0
                } else if masters {
                    9.5
                } else {
                    9.0
                }
            } else if self
                .config
                .strong_schools
                .iter()
                .any(|s| school.contains(s.as_str()))
            {
                if advanced {
                    8.5
                } else if masters {
                    7.5
                } else {
                    7.0
                }
            } else if advanced {
                6.5
            } else if masters {
                5.5
            } else {
                5.0
            };
            best = best.max(base);
        }
        DimensionScore::present(best)
    }

    /// Top-tier employer 9.5, recognizable mid-tier 7.5, unknown 5.5,
    /// obviously off-domain 3.0. Judged on the most recent role with a known
    /// company, falling back to the headline.
    fn score_company(&self, candidate: &Candidate) -> DimensionScore {
        let company = candidate
            .recent_role()
            .map(|e| e.company.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| {
                crate::pipeline::normalizer::split_headline(&candidate.headline).1
            });
        if company.trim().is_empty() {
            return DimensionScore::missing();
        }
        let company = company.to_lowercase();

        if self
            .config
            .top_tier_companies
            .iter()
            .any(|c| company.contains(c.as_str()))
        {
            return DimensionScore::present(9.5);
        }
        if self
            .config
            .mid_tier_companies
            .iter()
            .any(|c| company.contains(c.as_str()))
        {
            return DimensionScore::present(7.5);
        }
        if OFF_DOMAIN_MARKERS.iter().any(|m| company.contains(m)) {
            return DimensionScore::present(3.0);
        }
        DimensionScore::present(5.5)
    }
}

/// Normalized ladder slope over time, plus a cross-function breadth bonus
/// capped at +1.
fn score_trajectory(candidate: &Candidate) -> DimensionScore {
    if candidate.experience.is_empty() {
        return DimensionScore::missing();
    }

    let mut dated: Vec<(chrono::NaiveDate, u8)> = candidate
        .experience
        .iter()
        .filter_map(|e| e.start_date().map(|d| (d, title_rung(&e.title))))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let base = if dated.len() < 2 {
        let rung = dated
            .first()
            .map(|(_, r)| *r)
            .unwrap_or_else(|| title_rung(&candidate.experience[0].title));
        (5.0 + rung as f64 * 0.25).min(7.0)
    } else {
        let (first_date, first_rung) = dated[0];
        let (last_date, last_rung) = dated[dated.len() - 1];
        let span_years = ((last_date - first_date).num_days() as f64 / 365.25).max(0.5);
        let slope = (last_rung as f64 - first_rung as f64) / span_years;
        (5.0 + slope * 6.0).clamp(0.0, 9.0)
    };

    let categories: std::collections::BTreeSet<&str> = candidate
        .experience
        .iter()
        .map(|e| function_category(&e.title))
        .collect();
    let breadth_bonus = (categories.len().saturating_sub(1) as f64 * 0.5).min(1.0);

    DimensionScore::present(base + breadth_bonus)
}

/// Required-skill overlap mapped linearly from [0, 1] to [2, 10], with a
/// capped bonus for preferred-skill overlap. Empty requirements score 5.
fn score_experience_match(candidate: &Candidate, job: &JobSpec) -> DimensionScore {
    if candidate.skills.is_empty() {
        return DimensionScore::missing();
    }
    if job.required_skills.is_empty() {
        return DimensionScore::present(5.0);
    }

    let matched = job
        .required_skills
        .iter()
        .filter(|req| candidate.skills.contains(&req.to_lowercase()))
        .count();
    let ratio = matched as f64 / job.required_skills.len() as f64;

    let preferred_matched = job
        .preferred_skills
        .iter()
        .filter(|p| candidate.skills.contains(&p.to_lowercase()))
        .count();
    let bonus = (preferred_matched as f64 * 0.5).min(1.0);

    DimensionScore::present(2.0 + 8.0 * ratio + bonus)
}

/// 10 exact city, 8 same metro, 6 same country, 4 remote-compatible, else 0.
/// Best outcome across the ordered preferences wins.
fn score_location(candidate: &Candidate, job: &JobSpec) -> DimensionScore {
    if job.location_preferences.is_empty() {
        return DimensionScore::missing();
    }
    let location = candidate.location.to_lowercase();
    if location.is_empty() {
        return DimensionScore::missing();
    }

    let remote_capable = REMOTE_MARKERS.iter().any(|m| location.contains(m));
    let mut best: f64 = 0.0;
    for preference in &job.location_preferences {
        let pref = preference.to_lowercase();
        let score = if pref == "remote" {
            if remote_capable {
                4.0
            } else {
                0.0
            }
        } else if location.contains(&pref) || pref.contains(location.trim()) {
            10.0
        } else if same_metro(&location, &pref) {
            8.0
        } else if same_country(&location, &pref) {
            6.0
        } else {
            0.0
        };
        best = best.max(score);
    }
    DimensionScore::present(best)
}

fn same_metro(a: &str, b: &str) -> bool {
    METRO_AREAS.iter().any(|area| {
        area.iter().any(|city| a.contains(city)) && area.iter().any(|city| b.contains(city))
    })
}

/// Coarse country comparison: both locations resolve to the same country
/// token. US locations are recognized by state markers; otherwise the last
/// comma-separated segment is taken as the country.
fn same_country(a: &str, b: &str) -> bool {
    match (country_of(a), country_of(b)) {
        (Some(ca), Some(cb)) => ca == cb,
        _ => false,
    }
}

fn country_of(location: &str) -> Option<String> {
    const US_MARKERS: &[&str] = &[
        " ca", " ny", " wa", " tx", " ma", " il", " co", " or", " ga", " nc",
        "california", "new york", "washington", "texas", "usa", "united states",
    ];
    let lower = location.to_lowercase();
    if US_MARKERS.iter().any(|m| lower.contains(m)) {
        return Some("us".to_string());
    }
    let last = lower.split(',').next_back()?.trim().to_string();
    if last.is_empty() {
        None
    } else {
        Some(last)
    }
}

/// Average tenure across completed roles; peak for the 2–3 year band,
/// declining on both sides.
fn score_tenure(candidate: &Candidate) -> DimensionScore {
    let tenures: Vec<f64> = candidate
        .experience
        .iter()
        .filter_map(|e| e.tenure_years())
        .collect();
    if tenures.is_empty() {
        return DimensionScore::missing();
    }
    let avg = tenures.iter().sum::<f64>() / tenures.len() as f64;

    let score = if avg < 1.0 {
        3.5
    } else if avg < 1.5 {
        5.0
    } else if avg < 2.0 {
        7.5
    } else if avg <= 3.0 {
        9.5
    } else if avg <= 4.0 {
        9.0
    } else if avg <= 6.0 {
        8.0
    } else {
        6.5
    };
    DimensionScore::present(score)
}

/// Short templated observations emitted when dimensions cross thresholds.
fn build_insights(candidate: &Candidate, breakdown: &BTreeMap<String, f64>) -> Vec<String> {
    let over = |key: &str, threshold: f64| breakdown.get(key).is_some_and(|v| *v >= threshold);
    let mut insights = Vec::new();

    if over("experience_match", 9.0) {
        insights.push("Strong skill match with the role requirements".to_string());
    }
    if over("education", 8.0) {
        insights.push("Strong educational background from a prestigious institution".to_string());
    }
    if over("company_relevance", 9.0) {
        insights.push("Track record at top-tier technology companies".to_string());
    }
    if over("career_trajectory", 8.0) {
        insights.push("Clear career progression and advancement".to_string());
    }
    if over("tenure", 9.0) {
        insights.push("Healthy tenure pattern across roles".to_string());
    }
    if over("location_match", 10.0) {
        insights.push("Based in the target location".to_string());
    }
    if candidate.sources.len() >= 3 {
        insights.push("Verified across multiple professional platforms".to_string());
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Deterministic ranking: fit score, then confidence, then completeness,
/// then identity key.
pub fn rank(scored: &mut [ScoredCandidate]) {
    scored.sort_by(|a, b| {
        b.fit_score
            .total_cmp(&a.fit_score)
            .then(b.confidence.total_cmp(&a.confidence))
            .then(b.candidate.completeness.total_cmp(&a.candidate.completeness))
            .then(a.candidate.identity_key.cmp(&b.candidate.identity_key))
    });
}
