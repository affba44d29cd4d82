//! Outreach templates — four structural classes with a deterministic
//! selection table and byte-stable rendering.
//!
//! Given the same context and class, `render` produces identical bytes across
//! runs. No clocks, no randomness, no map iteration order leaks into output.

use crate::models::candidate::ScoredCandidate;
use crate::models::job::JobSpec;
use crate::pipeline::normalizer::split_headline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateClass {
    Executive,
    Researcher,
    Startup,
    Default,
}

const EXECUTIVE_MARKERS: &[&str] = &[
    "director",
    "vp",
    "vice president",
    "head of",
    "chief",
    "cto",
    "ceo",
    "president",
];
const RESEARCHER_MARKERS: &[&str] = &["research", "scientist", "phd", "professor"];
const STARTUP_MARKERS: &[&str] = &["founder", "founding", "startup", "entrepreneur"];

/// Deterministic class selection over the candidate's most recent title and
/// headline tokens. Executive outranks researcher outranks startup.
pub fn select_template(candidate: &ScoredCandidate) -> TemplateClass {
    let recent_title = candidate
        .candidate
        .recent_role()
        .map(|e| e.title.clone())
        .unwrap_or_default();
    let haystack = format!("{} {}", recent_title, candidate.candidate.headline).to_lowercase();

    if EXECUTIVE_MARKERS.iter().any(|m| haystack.contains(m)) {
        TemplateClass::Executive
    } else if RESEARCHER_MARKERS.iter().any(|m| haystack.contains(m)) {
        TemplateClass::Researcher
    } else if STARTUP_MARKERS.iter().any(|m| haystack.contains(m)) {
        TemplateClass::Startup
    } else {
        TemplateClass::Default
    }
}

/// Everything a template (or the AI prompt) may reference about one
/// candidate/job pairing.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub first_name: String,
    pub recent_company: String,
    pub recent_title: String,
    pub top_skill_overlap: String,
    pub job_title: String,
    pub job_company: String,
    pub job_highlights: Vec<String>,
}

impl MessageContext {
    pub fn build(scored: &ScoredCandidate, job: &JobSpec) -> Self {
        let candidate = &scored.candidate;
        let (headline_title, headline_company) = split_headline(&candidate.headline);
        let (recent_title, recent_company) = match candidate.recent_role() {
            Some(role) => (role.title.clone(), role.company.clone()),
            None => (headline_title, headline_company),
        };

        // Display the job's own casing for the overlapping skill.
        let top_skill_overlap = job
            .required_skills
            .iter()
            .find(|req| candidate.skills.contains(&req.to_lowercase()))
            .or_else(|| {
                job.preferred_skills
                    .iter()
                    .find(|p| candidate.skills.contains(&p.to_lowercase()))
            })
            .cloned()
            .or_else(|| candidate.skills.iter().next().cloned())
            .unwrap_or_else(|| "your technical background".to_string());

        Self {
            first_name: candidate.first_name().to_string(),
            recent_company: if recent_company.trim().is_empty() {
                "your current company".to_string()
            } else {
                recent_company
            },
            recent_title: if recent_title.trim().is_empty() {
                "your current role".to_string()
            } else {
                recent_title
            },
            top_skill_overlap,
            job_title: if job.title.trim().is_empty() {
                "an open role".to_string()
            } else {
                job.title.clone()
            },
            job_company: if job.company.trim().is_empty() {
                "our client".to_string()
            } else {
                job.company.clone()
            },
            job_highlights: job.highlights.clone(),
        }
    }

    fn highlights_block(&self) -> String {
        if self.job_highlights.is_empty() {
            return String::new();
        }
        let mut block = String::from("\n");
        for highlight in &self.job_highlights {
            block.push_str("• ");
            block.push_str(highlight);
            block.push('\n');
        }
        block
    }

    fn sign_off(&self) -> String {
        format!("Best regards,\nThe {} Talent Team", self.job_company)
    }
}

/// Renders the deterministic template body for a class and context.
pub fn render(class: TemplateClass, ctx: &MessageContext) -> String {
    match class {
        TemplateClass::Executive => format!(
            "Hi {first},\n\n\
             Your leadership track record as {title} at {company} caught my attention.\n\n\
             I'm reaching out about a {job_title} opportunity at {job_company}. They are \
             looking for someone with exactly your depth in {skill} to shape the team's \
             direction.\n{highlights}\n\
             Given your background at {company}, I believe this could be a compelling next \
             step. Would you be open to a short conversation?\n\n\
             {sign_off}",
            first = ctx.first_name,
            title = ctx.recent_title,
            company = ctx.recent_company,
            job_title = ctx.job_title,
            job_company = ctx.job_company,
            skill = ctx.top_skill_overlap,
            highlights = ctx.highlights_block(),
            sign_off = ctx.sign_off(),
        ),
        TemplateClass::Researcher => format!(
            "Hi {first},\n\n\
             I came across your research background and was impressed by your work at \
             {company}.\n\n\
             I wanted to share a {job_title} opening at {job_company} that aligns closely \
             with your work on {skill}.\n{highlights}\n\
             Would you be open to a discussion about the role and the problems the team is \
             working on?\n\n\
             {sign_off}",
            first = ctx.first_name,
            company = ctx.recent_company,
            job_title = ctx.job_title,
            job_company = ctx.job_company,
            skill = ctx.top_skill_overlap,
            highlights = ctx.highlights_block(),
            sign_off = ctx.sign_off(),
        ),
        TemplateClass::Startup => format!(
            "Hi {first},\n\n\
             I noticed your builder background as {title} at {company} and thought of you \
             for something new.\n\n\
             {job_company} is hiring a {job_title}, and your experience with {skill} would \
             be a strong fit for their pace.\n{highlights}\n\
             Interested in hearing more?\n\n\
             {sign_off}",
            first = ctx.first_name,
            title = ctx.recent_title,
            company = ctx.recent_company,
            job_title = ctx.job_title,
            job_company = ctx.job_company,
            skill = ctx.top_skill_overlap,
            highlights = ctx.highlights_block(),
            sign_off = ctx.sign_off(),
        ),
        TemplateClass::Default => format!(
            "Hi {first},\n\n\
             I came across your profile and was impressed by your work as {title} at \
             {company}.\n\n\
             We're hiring a {job_title} at {job_company}, and your experience with {skill} \
             stood out as a strong match.\n{highlights}\n\
             Would you be open to a brief conversation about the opportunity?\n\n\
             {sign_off}",
            first = ctx.first_name,
            title = ctx.recent_title,
            company = ctx.recent_company,
            job_title = ctx.job_title,
            job_company = ctx.job_company,
            skill = ctx.top_skill_overlap,
            highlights = ctx.highlights_block(),
            sign_off = ctx.sign_off(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Candidate, Experience, ScoredCandidate};
    use serde_json::json;
    use std::collections::{BTreeMap, BTreeSet};

    fn scored(name: &str, headline: &str, company: &str, skills: &[&str]) -> ScoredCandidate {
        let candidate = Candidate {
            identity_key: "k".to_string(),
            name: name.to_string(),
            headline: headline.to_string(),
            location: String::new(),
            primary_profile_url: String::new(),
            experience: vec![Experience {
                title: split_headline(headline).0,
                company: company.to_string(),
                start: Some("2021-01".to_string()),
                end: Some("present".to_string()),
                description: String::new(),
            }],
            education: vec![],
            skills: skills.iter().map(|s| s.to_lowercase()).collect(),
            sources: BTreeMap::new(),
            completeness: 0.8,
        };
        ScoredCandidate {
            candidate,
            fit_score: 8.0,
            breakdown: BTreeMap::new(),
            confidence: 0.8,
            insights: vec![],
        }
    }

    fn ml_job() -> JobSpec {
        serde_json::from_value(json!({
            "description": "ML research role",
            "title": "ML Research Engineer",
            "company": "Acme AI",
            "required_skills": ["PyTorch", "Python"]
        }))
        .unwrap()
    }

    #[test]
    fn test_template_selection_table() {
        let exec = scored("A", "VP of Engineering at Stripe", "Stripe", &[]);
        assert_eq!(select_template(&exec), TemplateClass::Executive);

        let researcher = scored("B", "Research Scientist at OpenAI", "OpenAI", &[]);
        assert_eq!(select_template(&researcher), TemplateClass::Researcher);

        let founder = scored("C", "Founding Engineer at Linear", "Linear", &[]);
        assert_eq!(select_template(&founder), TemplateClass::Startup);

        let ic = scored("D", "Software Engineer at SAP", "SAP", &[]);
        assert_eq!(select_template(&ic), TemplateClass::Default);
    }

    #[test]
    fn test_executive_markers_outrank_researcher_markers() {
        let both = scored("E", "Director of Research at DeepMind", "DeepMind", &[]);
        assert_eq!(select_template(&both), TemplateClass::Executive);
    }

    #[test]
    fn test_default_template_body_contents() {
        // Template fallback for a known candidate must greet by first name,
        // name the candidate's company, the overlapping skill, and the role,
        // and end with a sign-off line.
        let sarah = scored(
            "Sarah Chen",
            "Senior ML Engineer at Google",
            "Google",
            &["pytorch", "python"],
        );
        let ctx = MessageContext::build(&sarah, &ml_job());
        let body = render(select_template(&sarah), &ctx);

        assert!(body.starts_with("Hi Sarah,"), "greeting: {body}");
        assert!(body.contains("Google"));
        assert!(body.contains("PyTorch"), "job casing preserved: {body}");
        assert!(body.contains("ML Research Engineer"));
        let last_line = body.lines().last().unwrap();
        assert!(last_line.contains("Talent Team"), "sign-off: {last_line}");
    }

    #[test]
    fn test_render_is_byte_identical_across_runs() {
        let sarah = scored("Sarah Chen", "Senior ML Engineer at Google", "Google", &["pytorch"]);
        let job = ml_job();
        let a = render(TemplateClass::Default, &MessageContext::build(&sarah, &job));
        let b = render(TemplateClass::Default, &MessageContext::build(&sarah, &job));
        assert_eq!(a, b);
    }

    #[test]
    fn test_highlights_render_as_bullets() {
        let sarah = scored("Sarah Chen", "Senior ML Engineer at Google", "Google", &["pytorch"]);
        let mut job = ml_job();
        job.highlights = vec!["Series B, well funded".to_string(), "Remote-first".to_string()];
        let body = render(
            TemplateClass::Default,
            &MessageContext::build(&sarah, &job),
        );
        assert!(body.contains("• Series B, well funded\n"));
        assert!(body.contains("• Remote-first\n"));
    }

    #[test]
    fn test_context_falls_back_gracefully() {
        let bare = scored("X", "", "", &[]);
        let job: JobSpec = serde_json::from_value(json!({"description": "role"})).unwrap();
        let ctx = MessageContext::build(&bare, &job);
        assert_eq!(ctx.job_title, "an open role");
        assert_eq!(ctx.job_company, "our client");
        assert_eq!(ctx.top_skill_overlap, "your technical background");
    }
}
