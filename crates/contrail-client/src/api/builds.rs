//! Builds API.

use serde_json::Value;

use contrail_types::{Build, BuildStatus, DeserializationError, Token};

use crate::client::{ConcourseClient, RequestAuth};
use crate::decode::{decode_elements, optional_u64, require_i64, require_str};
use crate::error::Result;

/// Builds API client.
pub struct BuildsApi {
    client: ConcourseClient,
}

impl BuildsApi {
    pub(crate) fn new(client: ConcourseClient) -> Self {
        Self { client }
    }

    /// List builds visible to the token.
    ///
    /// Malformed records are dropped; the rest come back in server order.
    pub async fn list(&self, token: &Token) -> Result<Vec<Build>> {
        let body = self
            .client
            .get_bytes("builds", RequestAuth::Bearer(token))
            .await?;

        let builds = decode_elements(&body, parse_build)?;
        Ok(builds.collect())
    }
}

/// Parse one build record.
pub(crate) fn parse_build(record: &Value) -> std::result::Result<Build, DeserializationError> {
    let id = require_i64(record, "id")?;
    let name = require_str(record, "name")?.to_string();
    let team_name = require_str(record, "team_name")?.to_string();
    let job_name = require_str(record, "job_name")?.to_string();
    let status_str = require_str(record, "status")?;
    let status = BuildStatus::from_wire(status_str).ok_or_else(|| {
        DeserializationError::type_mismatch("status", "a recognized build status")
    })?;
    let pipeline_name = require_str(record, "pipeline_name")?.to_string();
    let start_time = optional_u64(record, "start_time")?;
    let end_time = optional_u64(record, "end_time")?;

    Ok(Build {
        id,
        name,
        team_name,
        job_name,
        status,
        pipeline_name,
        start_time,
        end_time,
    })
}
