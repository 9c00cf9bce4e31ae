//! Test results

use lava_protocol::{JobId, TestCase};

use crate::client::{ClientResult, Operation};

use super::LavaTools;

impl LavaTools {
    /// All test cases recorded for a job
    pub fn job_results_with_retry(&self, id: JobId) -> ClientResult<Vec<TestCase>> {
        self.retrier
            .fetch(Operation::JobResults, || self.client.job_results(id))
    }

    /// Test cases of a job that did not pass
    pub fn job_failures_with_retry(&self, id: JobId) -> ClientResult<Vec<TestCase>> {
        Ok(self
            .job_results_with_retry(id)?
            .into_iter()
            .filter(|case| !case.passed())
            .collect())
    }
}
