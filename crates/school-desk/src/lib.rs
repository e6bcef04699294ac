//! Scoring, ingestion, and API plumbing behind the school administration dashboard.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod scoring;
pub mod session;
pub mod submission;
pub mod telemetry;
