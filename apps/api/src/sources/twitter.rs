//! Microblog source — short-form public posting profiles. A thin enrichment
//! signal: follower reach and bio keywords.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::models::candidate::RawRecord;
use crate::models::job::JobSpec;
use crate::sources::{demo, SourceAdapter, SourceContext, SourceError, TWITTER};

pub struct TwitterSource {
    ctx: SourceContext,
}

impl TwitterSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

fn build_query(job: &JobSpec) -> String {
    let head = if job.title.trim().is_empty() {
        job.description
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        job.title.clone()
    };
    let skill = job
        .required_skills
        .iter()
        .next()
        .cloned()
        .unwrap_or_default();
    format!("{head} {skill}").trim().to_string()
}

#[async_trait]
impl SourceAdapter for TwitterSource {
    fn source_id(&self) -> &'static str {
        TWITTER
    }

    fn enabled(&self) -> bool {
        self.ctx.config.enabled
    }

    async fn discover(
        &self,
        job: &JobSpec,
        records: &mpsc::Sender<RawRecord>,
    ) -> Result<(), SourceError> {
        let query = build_query(job);
        let key = self.ctx.query_key(&query);

        if let Some(cached) = self.ctx.cached_records(&key).await {
            for record in cached {
                let _ = records.send(record).await;
            }
            return Ok(());
        }

        let mut batch: Vec<RawRecord> = Vec::new();
        if self.ctx.config.demo_mode {
            self.ctx.pace_demo_call().await;
            for profile in demo::relevant_profiles(job) {
                if let Some(view) = &profile.twitter {
                    batch.push(self.ctx.record(view.clone(), true));
                }
            }
        } else {
            let value = self
                .ctx
                .paced_get_json("/search/accounts", &[("q", query)])
                .await?;
            let accounts = value
                .get("accounts")
                .and_then(|v| v.as_array())
                .ok_or(SourceError::Unparseable)?;
            for account in accounts {
                batch.push(self.ctx.record(account.clone(), false));
            }
        }

        info!(source = TWITTER, hits = batch.len(), "discovery complete");
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
    fn test_query_prefers_title_and_first_skill() {
        let job: JobSpec = serde_json::from_value(json!({
            "description": "long description here",
            "title": "ML Engineer",
            "required_skills": ["pytorch"]
        }))
        .unwrap();
        assert_eq!(build_query(&job), "ML Engineer pytorch");
    }
}
