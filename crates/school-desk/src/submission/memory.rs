use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use super::gateway::{GatewayError, ResultKey, ResultsGateway, SubmissionReceipt};
use crate::scoring::TestResult;

/// Results store held in memory, with the same upsert contract as the remote store.
#[derive(Debug, Default)]
pub struct InMemoryResultsGateway {
    records: Mutex<BTreeMap<ResultKey, TestResult>>,
}

impl InMemoryResultsGateway {
    pub fn len(&self) -> usize {
        self.records.lock().expect("results mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &ResultKey) -> Option<TestResult> {
        self.records
            .lock()
            .expect("results mutex poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl ResultsGateway for InMemoryResultsGateway {
    async fn count_existing(&self, keys: &[ResultKey]) -> Result<usize, GatewayError> {
        let guard = self.records.lock().expect("results mutex poisoned");
        Ok(keys.iter().filter(|key| guard.contains_key(key)).count())
    }

    async fn submit(&self, results: &[TestResult]) -> Result<SubmissionReceipt, GatewayError> {
        let mut guard = self.records.lock().expect("results mutex poisoned");
        let mut receipt = SubmissionReceipt::default();
        let mut seen = BTreeSet::new();
        // Repeated keys in one batch count once; the last result wins.
        for result in results {
            let key = ResultKey::from(result);
            if seen.insert(key.clone()) {
                if guard.contains_key(&key) {
                    receipt.updated += 1;
                } else {
                    receipt.created += 1;
                }
            }
            guard.insert(key, result.clone());
        }
        Ok(receipt)
    }
}
