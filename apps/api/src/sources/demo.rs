//! Deterministic synthetic profiles for demo mode.
//!
//! A fixed pool of people with per-source views. Views for the same person
//! share the canonical profile URL so the merger has real work to do. No
//! randomness anywhere: the same job always yields the same records.

use serde_json::{json, Value};

use crate::models::job::JobSpec;

/// One synthetic person with the per-source payloads an adapter would fetch.
pub struct DemoProfile {
    pub linkedin: Value,
    pub github: Option<Value>,
    pub twitter: Option<Value>,
    pub website: Option<Value>,
    /// Lowercased tokens used for query-relevance filtering.
    keywords: &'static [&'static str],
}

/// Returns pool members relevant to the job, in fixed pool order. When no
/// profile matches the query at all, the whole pool is returned so demo jobs
/// always produce candidates.
pub fn relevant_profiles(job: &JobSpec) -> Vec<&'static DemoProfile> {
    let mut query = job.description.to_lowercase();
    query.push(' ');
    query.push_str(&job.title.to_lowercase());
    for skill in job.required_skills.iter().chain(job.preferred_skills.iter()) {
        query.push(' ');
        query.push_str(&skill.to_lowercase());
    }

    let matched: Vec<&'static DemoProfile> = pool()
        .iter()
        .filter(|p| p.keywords.iter().any(|kw| query.contains(kw)))
        .collect();
    if matched.is_empty() {
        pool().iter().collect()
    } else {
        matched
    }
}

fn pool() -> &'static [DemoProfile] {
    use std::sync::OnceLock;
    static POOL: OnceLock<Vec<DemoProfile>> = OnceLock::new();
    POOL.get_or_init(build_pool)
}

fn build_pool() -> Vec<DemoProfile> {
    vec![
        DemoProfile {
            keywords: &["machine learning", "ml", "pytorch", "tensorflow", "python", "ai"],
            linkedin: json!({
                "name": "Sarah Chen",
                "headline": "Senior Machine Learning Engineer at Google",
                "location": "Mountain View, CA",
                "snippet": "ML engineer with 8+ years building production ML systems. Led teams developing recommendation engines and NLP models.",
                "profile_url": "https://linkedin.com/in/sarah-chen-ml",
                "experience": [
                    {"title": "Senior ML Engineer", "company": "Google", "start": "2021-06", "end": "present",
                     "description": "Lead ML infrastructure team, built recommendation systems serving 1B+ users"},
                    {"title": "ML Engineer", "company": "Uber", "start": "2019-01", "end": "2021-06",
                     "description": "Developed fraud detection models, improved accuracy by 25%"}
                ],
                "education": [
                    {"degree": "MS Computer Science", "school": "Stanford University", "year": "2019"}
                ],
                "skills": ["Python", "PyTorch", "TensorFlow", "MLOps", "Kubernetes", "GCP"]
            }),
            github: Some(json!({
                "username": "sarah-chen-ml",
                "name": "Sarah Chen",
                "location": "Mountain View, CA",
                "linkedin_url": "https://linkedin.com/in/sarah-chen-ml",
                "public_repos": 45,
                "followers": 1200,
                "top_languages": ["Python", "Go"],
                "notable_repos": [
                    {"name": "ml-pipeline-tools", "stars": 890},
                    {"name": "pytorch-examples", "stars": 234}
                ]
            })),
            twitter: Some(json!({
                "username": "sarahchen_ml",
                "name": "Sarah Chen",
                "location": "Mountain View, CA",
                "linkedin_url": "https://linkedin.com/in/sarah-chen-ml",
                "followers": 5600,
                "bio": "ML Engineer @Google. Building AI systems that matter."
            })),
            website: None,
        },
        DemoProfile {
            keywords: &["backend", "infrastructure", "distributed", "go", "python", "kubernetes"],
            linkedin: json!({
                "name": "Marcus Rodriguez",
                "headline": "Staff Software Engineer at Meta | Ex-Netflix",
                "location": "San Francisco, CA",
                "snippet": "Full-stack engineer specializing in scalable systems. Built infrastructure serving 500M+ users.",
                "profile_url": "https://linkedin.com/in/marcus-rodriguez",
                "experience": [
                    {"title": "Staff Software Engineer", "company": "Meta", "start": "2022-02", "end": "present",
                     "description": "Lead Instagram backend infrastructure, reduced latency by 40%"},
                    {"title": "Senior Software Engineer", "company": "Netflix", "start": "2020-01", "end": "2022-02",
                     "description": "Built video streaming infrastructure, handled 200M concurrent users"},
                    {"title": "Software Engineer", "company": "Dropbox", "start": "2017-06", "end": "2019-12",
                     "description": "Sync engine performance work"}
                ],
                "education": [
                    {"degree": "BS Computer Engineering", "school": "UC Berkeley", "year": "2017"}
                ],
                "skills": ["Python", "Go", "React", "PostgreSQL", "Kubernetes", "AWS"]
            }),
            github: Some(json!({
                "username": "marcus-dev",
                "name": "Marcus Rodriguez",
                "location": "San Francisco, CA",
                "linkedin_url": "https://linkedin.com/in/marcus-rodriguez",
                "public_repos": 67,
                "followers": 890,
                "top_languages": ["Go", "Python", "JavaScript"],
                "notable_repos": [
                    {"name": "distributed-cache", "stars": 1200},
                    {"name": "microservices-toolkit", "stars": 445}
                ]
            })),
            twitter: None,
            website: None,
        },
        DemoProfile {
            keywords: &["research", "llm", "nlp", "machine learning", "ai", "scientist"],
            linkedin: json!({
                "name": "Priya Patel",
                "headline": "AI Research Scientist at OpenAI • PhD Stanford",
                "location": "Palo Alto, CA",
                "snippet": "AI researcher focused on large language models and multimodal AI. Published 15+ papers in top venues.",
                "profile_url": "https://linkedin.com/in/priya-patel-ai",
                "experience": [
                    {"title": "Research Scientist", "company": "OpenAI", "start": "2023-01", "end": "present",
                     "description": "Research on large language models, multimodal AI, and AI safety"},
                    {"title": "Research Intern", "company": "DeepMind", "start": "2022-01", "end": "2023-01",
                     "description": "Scaling laws for sparse models"}
                ],
                "education": [
                    {"degree": "PhD Computer Science", "school": "Stanford University", "year": "2022"},
                    {"degree": "BTech Computer Science", "school": "IIT Bombay", "year": "2016"}
                ],
                "skills": ["Machine Learning", "Deep Learning", "Natural Language Processing", "PyTorch", "Python"]
            }),
            github: None,
            twitter: Some(json!({
                "username": "priyapatel_ai",
                "name": "Priya Patel",
                "location": "Palo Alto, CA",
                "linkedin_url": "https://linkedin.com/in/priya-patel-ai",
                "followers": 12400,
                "bio": "Research scientist. LLMs, multimodal models, AI safety."
            })),
            website: Some(json!({
                "owner_name": "Priya Patel",
                "linkedin_url": "https://linkedin.com/in/priya-patel-ai",
                "url": "https://priyapatel.ai",
                "has_blog": true,
                "has_portfolio": false,
                "topics": ["machine learning", "ai safety", "research"]
            })),
        },
        DemoProfile {
            keywords: &["director", "leadership", "payments", "platform", "manager"],
            linkedin: json!({
                "name": "Alex Kim",
                "headline": "Engineering Director at Stripe",
                "location": "New York, NY",
                "snippet": "Engineering leader scaling payments infrastructure teams from 10 to 60.",
                "profile_url": "https://linkedin.com/in/alex-kim-eng",
                "experience": [
                    {"title": "Engineering Director", "company": "Stripe", "start": "2021-03", "end": "present",
                     "description": "Own payments platform org, 60 engineers across 6 teams"},
                    {"title": "Engineering Manager", "company": "Square", "start": "2017-05", "end": "2021-03",
                     "description": "Managed terminal payments team"},
                    {"title": "Senior Software Engineer", "company": "Square", "start": "2014-08", "end": "2017-05",
                     "description": "Card processing pipeline"}
                ],
                "education": [
                    {"degree": "BS Computer Science", "school": "Cornell", "year": "2012"}
                ],
                "skills": ["Distributed Systems", "Java", "Go", "Leadership", "System Design"]
            }),
            github: None,
            twitter: None,
            website: None,
        },
        DemoProfile {
            keywords: &["founder", "startup", "full-stack", "typescript", "react", "product"],
            linkedin: json!({
                "name": "Jordan Lee",
                "headline": "Founding Engineer at Linear",
                "location": "Remote",
                "snippet": "Product-minded engineer. First hire at two startups; shipped 0-to-1 products across web and mobile.",
                "profile_url": "https://linkedin.com/in/jordan-lee-dev",
                "experience": [
                    {"title": "Founding Engineer", "company": "Linear", "start": "2022-09", "end": "present",
                     "description": "Early engineer across sync engine and editor"},
                    {"title": "Software Engineer", "company": "Notion", "start": "2020-02", "end": "2022-09",
                     "description": "Built collaborative editing features"}
                ],
                "education": [
                    {"degree": "BS Computer Science", "school": "University of Waterloo", "year": "2019"}
                ],
                "skills": ["TypeScript", "React", "Node.js", "GraphQL", "PostgreSQL"]
            }),
            github: Some(json!({
                "username": "jordanlee",
                "name": "Jordan Lee",
                "location": "Remote",
                "linkedin_url": "https://linkedin.com/in/jordan-lee-dev",
                "public_repos": 31,
                "followers": 410,
                "top_languages": ["TypeScript", "Rust"],
                "notable_repos": [
                    {"name": "local-first-sync", "stars": 980}
                ]
            })),
            twitter: None,
            website: Some(json!({
                "owner_name": "Jordan Lee",
                "linkedin_url": "https://linkedin.com/in/jordan-lee-dev",
                "url": "https://jordanlee.dev",
                "has_blog": true,
                "has_portfolio": true,
                "topics": ["local-first software", "typescript", "product engineering"]
            })),
        },
        DemoProfile {
            keywords: &["java", "enterprise", "sap", "berlin", "cloud"],
            linkedin: json!({
                "name": "Emma Müller",
                "headline": "Software Engineer at SAP",
                "location": "Berlin, Germany",
                "snippet": "Cloud platform engineer working on multi-tenant Java services.",
                "profile_url": "https://linkedin.com/in/emma-mueller",
                "experience": [
                    {"title": "Software Engineer", "company": "SAP", "start": "2020-10", "end": "present",
                     "description": "Multi-tenant provisioning services"}
                ],
                "education": [
                    {"degree": "MSc Informatics", "school": "TU Munich", "year": "2020"}
                ],
                "skills": ["Java", "Spring Boot", "Kubernetes", "SQL"]
            }),
            github: None,
            twitter: None,
            website: None,
        },
    ]
}
