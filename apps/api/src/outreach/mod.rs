//! Outreach generator — AI-backed message generation with a deterministic
//! template fallback.
//!
//! The AI path is attempted only when a backend is configured and healthy,
//! is rate-limited under the "ai" source id, and is bounded by a wall-clock
//! timeout. Any unusable outcome (timeout, rejection, too short, banned
//! phrase) falls back to the template; the fallback is never an error and
//! `method = "template"` is the only signal.

pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::ai_client::{prompts, AiBackend, AiError};
use crate::limiter::RateLimiter;
use crate::models::candidate::{OutreachMessage, OutreachMethod, ScoredCandidate};
use crate::models::job::JobSpec;
use crate::outreach::templates::{render, select_template, MessageContext};
use crate::sources::AI;

/// Retries for transient transport failures. Model-level rejections are
/// never retried.
const MAX_TRANSPORT_RETRIES: u32 = 2;
const MIN_USABLE_CHARS: usize = 80;

const BANNED_PHRASES: &[&str] = &[
    "as an ai",
    "language model",
    "i cannot",
    "i can't",
    "[your name]",
    "[company]",
    "[candidate]",
];

const FILLER_PREFIXES: &[&str] = &[
    "sure",
    "certainly",
    "of course",
    "here is",
    "here's",
    "absolutely",
];

#[derive(Clone)]
pub struct OutreachGenerator {
    ai: Option<Arc<dyn AiBackend>>,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
    max_output_chars: usize,
}

impl OutreachGenerator {
    pub fn new(
        ai: Option<Arc<dyn AiBackend>>,
        limiter: Arc<RateLimiter>,
        timeout: Duration,
        max_output_chars: usize,
    ) -> Self {
        Self {
            ai,
            limiter,
            timeout,
            max_output_chars,
        }
    }

    /// Produces one message for a scored candidate. Never fails.
    pub async fn generate(&self, scored: &ScoredCandidate, job: &JobSpec) -> OutreachMessage {
        let class = select_template(scored);
        let ctx = MessageContext::build(scored, job);

        if let Some(ai) = &self.ai {
            if ai.health_check().await {
                match self.try_ai(ai.as_ref(), &ctx).await {
                    Ok(body) => {
                        return OutreachMessage::new(
                            scored.candidate.identity_key.clone(),
                            body,
                            OutreachMethod::Ai,
                        );
                    }
                    Err(e) => {
                        warn!(
                            candidate = %scored.candidate.identity_key,
                            "ai generation unavailable ({e}), using template"
                        );
                    }
                }
            } else {
                debug!("ai backend unhealthy, using template");
            }
        }

        OutreachMessage::new(
            scored.candidate.identity_key.clone(),
            render(class, &ctx),
            OutreachMethod::Template,
        )
    }

    async fn try_ai(&self, ai: &dyn AiBackend, ctx: &MessageContext) -> Result<String, AiError> {
        let prompt = prompts::outreach_prompt(ctx);

        let mut attempt = 0u32;
        loop {
            self.limiter.acquire(AI).await;
            let call = ai.generate(&prompt, prompts::OUTREACH_SYSTEM);
            match tokio::time::timeout(self.timeout, call).await {
                Err(_) => return Err(AiError::Timeout),
                Ok(Err(AiError::Transport)) if attempt < MAX_TRANSPORT_RETRIES => {
                    attempt += 1;
                    warn!(attempt, "transient ai failure, retrying");
                }
                Ok(Err(e)) => return Err(e),
                Ok(Ok(raw)) => {
                    let cleaned = clean_response(&raw, ctx, self.max_output_chars);
                    return match cleaned {
                        Some(body) => Ok(body),
                        None => Err(AiError::Rejected("unusable response".to_string())),
                    };
                }
            }
        }
    }
}

/// Strips leading filler, enforces greeting and sign-off, bounds length, and
/// rejects unusable bodies (too short or containing a banned phrase).
fn clean_response(raw: &str, ctx: &MessageContext, max_chars: usize) -> Option<String> {
    let mut lines: Vec<&str> = raw.trim().lines().collect();
    while let Some(first) = lines.first() {
        let lower = first.trim().to_lowercase();
        if FILLER_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            lines.remove(0);
        } else {
            break;
        }
    }
    let mut body = lines.join("\n").trim().to_string();
    if body.is_empty() {
        return None;
    }

    let lower = body.to_lowercase();
    if BANNED_PHRASES.iter().any(|p| lower.contains(p)) {
        return None;
    }

    if !lower.starts_with("hi ") && !lower.starts_with("hello") && !lower.starts_with("dear") {
        body = format!("Hi {},\n\n{body}", ctx.first_name);
    }

    let last_line = body.lines().last().unwrap_or_default().to_lowercase();
    let has_sign_off = ["best", "regards", "cheers", "sincerely", "thanks", "talent team"]
        .iter()
        .any(|m| last_line.contains(m));
    if !has_sign_off {
        body.push_str("\n\nBest regards,\nThe ");
        body.push_str(&ctx.job_company);
        body.push_str(" Talent Team");
    }

    if body.chars().count() > max_chars {
        body = truncate_at_sentence(&body, max_chars);
    }

    if body.chars().count() < MIN_USABLE_CHARS {
        return None;
    }
    Some(body)
}

/// Cuts at the last sentence end before the limit when one exists past 70%
/// of it, otherwise hard-truncates.
fn truncate_at_sentence(body: &str, max_chars: usize) -> String {
    let truncated: String = body.chars().take(max_chars).collect();
    match truncated.rfind('.') {
        Some(idx) if idx >= max_chars * 7 / 10 => truncated[..=idx].to_string(),
        _ => truncated,
    }
}
