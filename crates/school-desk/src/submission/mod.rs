//! Pushing computed results back to the results store.
//!
//! The store contract is an idempotent upsert keyed by registration number, test name, and
//! date: resubmitting a key overwrites the earlier result and never duplicates it.

mod gateway;
mod memory;

pub use gateway::{GatewayError, OverwritePrompt, ResultKey, ResultsGateway, SubmissionReceipt};
pub use memory::InMemoryResultsGateway;

use tracing::{info, warn};

use crate::scoring::TestResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Nothing to send.
    Nothing,
    /// Existing results would be overwritten and the prompt declined.
    Cancelled { existing: usize },
    Submitted(SubmissionReceipt),
}

/// Count existing results, confirm overwrites, then submit the whole batch.
pub struct ResultSubmission<'a, G, P> {
    gateway: &'a G,
    prompt: &'a P,
}

impl<'a, G, P> ResultSubmission<'a, G, P>
where
    G: ResultsGateway,
    P: OverwritePrompt,
{
    pub fn new(gateway: &'a G, prompt: &'a P) -> Self {
        Self { gateway, prompt }
    }

    pub async fn run(&self, results: &[TestResult]) -> Result<SubmissionOutcome, GatewayError> {
        if results.is_empty() {
            return Ok(SubmissionOutcome::Nothing);
        }

        let keys: Vec<ResultKey> = results.iter().map(ResultKey::from).collect();
        let existing = self.gateway.count_existing(&keys).await?;

        if existing > 0 && !self.prompt.confirm_overwrite(existing, results.len()) {
            warn!(existing, total = results.len(), "submission cancelled at overwrite prompt");
            return Ok(SubmissionOutcome::Cancelled { existing });
        }

        let receipt = self.gateway.submit(results).await?;
        info!(
            created = receipt.created,
            updated = receipt.updated,
            "test results submitted"
        );
        Ok(SubmissionOutcome::Submitted(receipt))
    }
}
