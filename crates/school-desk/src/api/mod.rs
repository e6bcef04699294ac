//! Client for the dashboard REST API.

mod client;
mod context;
mod error;
pub mod models;

pub use client::ApiClient;
pub use context::DashboardContext;
pub use error::ApiError;
pub use models::{BulkCreateReceipt, Campus, ParentCredentials, Student, Subject, UserCredentials};
