use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::TestResult;

/// Identity of one stored result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultKey {
    pub reg_number: String,
    pub test_name: String,
    pub date: NaiveDate,
}

impl From<&TestResult> for ResultKey {
    fn from(result: &TestResult) -> Self {
        Self {
            reg_number: result.reg_number.trim().to_string(),
            test_name: result.test_name.trim().to_string(),
            date: result.date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub updated: usize,
}

/// Where computed results are stored.
#[async_trait]
pub trait ResultsGateway: Send + Sync {
    /// How many of `keys` already have a stored result.
    async fn count_existing(&self, keys: &[ResultKey]) -> Result<usize, GatewayError>;
    /// Upsert every result by key.
    async fn submit(&self, results: &[TestResult]) -> Result<SubmissionReceipt, GatewayError>;
}

/// Asks the operator before existing results are overwritten.
pub trait OverwritePrompt {
    fn confirm_overwrite(&self, existing: usize, total: usize) -> bool;
}

impl<F> OverwritePrompt for F
where
    F: Fn(usize, usize) -> bool,
{
    fn confirm_overwrite(&self, existing: usize, total: usize) -> bool {
        self(existing, total)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("results store rejected the request: {0}")]
    Rejected(String),
    #[error("results store unavailable: {0}")]
    Unavailable(String),
}
