//! Prompt constants and builders for outreach generation.

use crate::outreach::templates::MessageContext;

pub const OUTREACH_SYSTEM: &str = "You are a recruiter writing short, personalized \
outreach messages. Your messages are specific, grounded in the candidate's actual \
background, and free of filler. Reply with the message body only: no preamble, no \
commentary, no placeholders.";

/// Bounded prompt derived from the message context. Everything the model may
/// reference is inlined; nothing else about the candidate is sent.
pub fn outreach_prompt(ctx: &MessageContext) -> String {
    let highlights = if ctx.job_highlights.is_empty() {
        "none provided".to_string()
    } else {
        ctx.job_highlights.join("; ")
    };
    format!(
        "Write a LinkedIn outreach message of at most 180 words.\n\
         \n\
         CANDIDATE\n\
         First name: {first}\n\
         Current role: {title} at {company}\n\
         Strongest overlapping skill: {skill}\n\
         \n\
         ROLE\n\
         Title: {job_title}\n\
         Company: {job_company}\n\
         Highlights: {highlights}\n\
         \n\
         REQUIREMENTS\n\
         1. Open with \"Hi {first},\"\n\
         2. Mention {company} and {skill} explicitly\n\
         3. Name the role and company clearly\n\
         4. End with a question and a sign-off line\n\
         5. No placeholders like [Your Name]",
        first = ctx.first_name,
        title = ctx.recent_title,
        company = ctx.recent_company,
        skill = ctx.top_skill_overlap,
        job_title = ctx.job_title,
        job_company = ctx.job_company,
        highlights = highlights,
    )
}
