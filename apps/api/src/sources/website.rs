//! Personal-site source — best-effort discovery of independent sites and
//! blogs. The weakest signal of the four; hits only ever enrich an existing
//! candidate or introduce a hash-keyed one.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::models::candidate::RawRecord;
use crate::models::job::JobSpec;
use crate::sources::{demo, SourceAdapter, SourceContext, SourceError, WEBSITE};

pub struct WebsiteSource {
    ctx: SourceContext,
}

impl WebsiteSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

fn build_query(job: &JobSpec) -> String {
    let skills = job
        .required_skills
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    if skills.is_empty() {
        job.description
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        format!("{skills} blog portfolio")
    }
}

#[async_trait]
impl SourceAdapter for WebsiteSource {
    fn source_id(&self) -> &'static str {
        WEBSITE
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
                if let Some(view) = &profile.website {
                    batch.push(self.ctx.record(view.clone(), true));
                }
            }
        } else {
            let value = self
                .ctx
                .paced_get_json("/search/sites", &[("q", query)])
                .await?;
            let sites = value
                .get("sites")
                .and_then(|v| v.as_array())
                .ok_or(SourceError::Unparseable)?;
            for site in sites {
                batch.push(self.ctx.record(site.clone(), false));
            }
        }

        info!(source = WEBSITE, hits = batch.len(), "discovery complete");
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
    fn test_query_targets_blogs_and_portfolios() {
        let job: JobSpec = serde_json::from_value(json!({
            "description": "x",
            "required_skills": ["rust"]
        }))
        .unwrap();
        assert_eq!(build_query(&job), "rust blog portfolio");
    }
}
