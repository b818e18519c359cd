//! Jobs and job grouping.

use serde::{Deserialize, Serialize};

/// One job within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    /// Pipeline groups this job belongs to; may be empty.
    pub groups: Vec<String>,
}

impl Job {
    pub fn new(name: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }
}

/// A named section of jobs, for grouped display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobGroup {
    pub name: String,
    pub jobs: Vec<Job>,
}

/// Bucket jobs into sections by each job's first group.
///
/// Jobs with no group land in an `"ungrouped"` section. Section order
/// follows first appearance; job order within a section follows the input.
pub fn group_jobs(jobs: Vec<Job>) -> Vec<JobGroup> {
    let mut groups: Vec<JobGroup> = Vec::new();

    for job in jobs {
        let group_name = job
            .groups
            .first()
            .map(String::as_str)
            .unwrap_or("ungrouped")
            .to_string();

        match groups.iter_mut().find(|g| g.name == group_name) {
            Some(group) => group.jobs.push(job),
            None => groups.push(JobGroup {
                name: group_name,
                jobs: vec![job],
            }),
        }
    }

    groups
}
