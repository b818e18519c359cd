//! Jobs API.

use serde_json::Value;

use contrail_types::{DeserializationError, Job, Token};

use crate::client::{ConcourseClient, RequestAuth};
use crate::decode::{decode_elements, optional_str_array, require_str};
use crate::error::Result;

/// Jobs API client.
pub struct JobsApi {
    client: ConcourseClient,
}

impl JobsApi {
    pub(crate) fn new(client: ConcourseClient) -> Self {
        Self { client }
    }

    /// List the jobs of one pipeline.
    pub async fn list(
        &self,
        token: &Token,
        team_name: &str,
        pipeline_name: &str,
    ) -> Result<Vec<Job>> {
        let path = format!("teams/{}/pipelines/{}/jobs", team_name, pipeline_name);
        let body = self
            .client
            .get_bytes(&path, RequestAuth::Bearer(token))
            .await?;

        let jobs = decode_elements(&body, parse_job)?;
        Ok(jobs.collect())
    }
}

/// Parse one job record. `groups` is optional and defaults to empty.
fn parse_job(record: &Value) -> std::result::Result<Job, DeserializationError> {
    let name = require_str(record, "name")?.to_string();
    let groups = optional_str_array(record, "groups")?;
    Ok(Job { name, groups })
}
