//! Test result records.

use serde::{Deserialize, Serialize};

/// One test case result of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// "pass", "fail", "skip", "unknown".
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub logged: String,
    #[serde(default)]
    pub log_start_line: String,
    #[serde(default)]
    pub log_end_line: String,
    #[serde(default)]
    pub metadata: TestCaseMetadata,
}

impl TestCase {
    pub fn passed(&self) -> bool {
        self.result.eq_ignore_ascii_case("pass")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseMetadata {
    #[serde(default)]
    pub case: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub path: String,
}
