//! Code-hosting source — public account data for technical candidates.
//!
//! Issues one search per top required skill (max 3). Hits carry repository
//! and follower stats the scorer and outreach generator use as enrichment.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::models::candidate::RawRecord;
use crate::models::job::JobSpec;
use crate::sources::{demo, SourceAdapter, SourceContext, SourceError, GITHUB};

pub struct GithubSource {
    ctx: SourceContext,
}

impl GithubSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

/// One search term per top required skill; description head as fallback.
fn build_queries(job: &JobSpec) -> Vec<String> {
    let from_skills: Vec<String> = job.required_skills.iter().take(3).cloned().collect();
    if from_skills.is_empty() {
        vec![job
            .description
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")]
    } else {
        from_skills
    }
}

#[async_trait]
impl SourceAdapter for GithubSource {
    fn source_id(&self) -> &'static str {
        GITHUB
    }

    fn enabled(&self) -> bool {
        self.ctx.config.enabled
    }

    async fn discover(
        &self,
        job: &JobSpec,
        records: &mpsc::Sender<RawRecord>,
    ) -> Result<(), SourceError> {
        let queries = build_queries(job);
        let key = self.ctx.query_key(&queries.join(" | "));

        if let Some(cached) = self.ctx.cached_records(&key).await {
            for record in cached {
                let _ = records.send(record).await;
            }
            return Ok(());
        }

        let mut batch: Vec<RawRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        if self.ctx.config.demo_mode {
            for _ in &queries {
                self.ctx.pace_demo_call().await;
            }
            for profile in demo::relevant_profiles(job) {
                let Some(view) = &profile.github else { continue };
                let username = view["username"].as_str().unwrap_or_default().to_string();
                if seen.insert(username) {
                    batch.push(self.ctx.record(view.clone(), true));
                }
            }
        } else {
            for query in &queries {
                let value = self
                    .ctx
                    .paced_get_json("/search/users", &[("q", query.clone())])
                    .await?;
                let users = value
                    .get("users")
                    .and_then(|v| v.as_array())
                    .ok_or(SourceError::Unparseable)?;
                for user in users {
                    let username = user
                        .get("username")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    if seen.insert(username) {
                        batch.push(self.ctx.record(user.clone(), false));
                    }
                }
            }
        }

        info!(source = GITHUB, hits = batch.len(), "discovery complete");
        for record in &batch {
            let _ = records.send(record.clone()).await;
        }
        self.ctx.store_records(&key, &batch).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queries_from_required_skills() {
        let job: JobSpec = serde_json::from_value(json!({
            "description": "backend",
            "required_skills": ["go", "kubernetes", "postgres", "kafka"]
        }))
        .unwrap();
        let queries = build_queries(&job);
        assert_eq!(queries.len(), 3, "capped at 3 search terms");
    }

    #[test]
    fn test_queries_fall_back_to_description() {
        let job: JobSpec =
            serde_json::from_value(json!({ "description": "platform engineer role" })).unwrap();
        assert_eq!(build_queries(&job), vec!["platform engineer role"]);
    }
}
