//! Candidate sourcing pipeline engine.
//!
//! Given a job description, discovers professional profiles across several
//! public sources, normalizes and dedups them into canonical candidate
//! records, scores each against a weighted rubric, optionally generates a
//! personalized outreach message per candidate, and returns a ranked list.
//! The HTTP server (`main.rs`) and CLI (`cli.rs`) are thin shells over
//! `pipeline::SourcingEngine`.

pub mod ai_client;
pub mod cache;
pub mod config;
pub mod errors;
pub mod limiter;
pub mod models;
pub mod outreach;
pub mod pipeline;
pub mod routes;
pub mod scoring;
pub mod sources;
pub mod state;
