//! Build snapshots.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Started,
    Succeeded,
    Failed,
    Errored,
    Aborted,
}

impl BuildStatus {
    /// Parse the wire `status` string. Unknown strings are `None`; the
    /// caller decides whether that rejects the record.
    pub fn from_wire(status: &str) -> Option<Self> {
        match status {
            "pending" => Some(BuildStatus::Pending),
            "started" => Some(BuildStatus::Started),
            "succeeded" => Some(BuildStatus::Succeeded),
            "failed" => Some(BuildStatus::Failed),
            "errored" => Some(BuildStatus::Errored),
            "aborted" => Some(BuildStatus::Aborted),
            _ => None,
        }
    }

    /// The wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Started => "started",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Aborted => "aborted",
        }
    }

    /// Whether the server will emit no further status changes.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildStatus::Pending | BuildStatus::Started)
    }
}

/// An immutable snapshot of one build, as fetched from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: i64,
    pub name: String,
    pub team_name: String,
    pub job_name: String,
    pub status: BuildStatus,
    pub pipeline_name: String,
    /// Unix seconds; absent while the build is pending.
    pub start_time: Option<u64>,
    /// Unix seconds; absent until the build reaches a terminal status.
    pub end_time: Option<u64>,
}
