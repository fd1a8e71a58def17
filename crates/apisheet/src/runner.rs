//! Runs one job end-to-end: dispatch, normalize, flatten.

use std::fmt;

use crate::dispatch::RequestDispatcher;
use crate::normalize::{request_parameters, response_parameters};
use crate::types::{CallOutcome, DispatchError, JobRecord, NormalizedRecord};

/// Lifecycle of a single job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Dispatching,
    Normalizing,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Dispatching => "dispatching",
            JobState::Normalizing => "normalizing",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of [`JobRunner::execute`]: final state plus rows when done.
#[derive(Debug)]
pub struct JobRun {
    pub state: JobState,
    pub records: Option<Vec<NormalizedRecord>>,
    pub error: Option<DispatchError>,
}

/// Orchestrates a job through the dispatcher and flattens its outcomes.
#[derive(Clone)]
pub struct JobRunner {
    dispatcher: RequestDispatcher,
}

impl JobRunner {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Run `job`. `None` means the job failed and nothing should be exported.
    pub async fn run(&self, job: &JobRecord) -> Option<Vec<NormalizedRecord>> {
        self.execute(job).await.records
    }

    /// Run `job`, keeping the final state and the failure cause.
    pub async fn execute(&self, job: &JobRecord) -> JobRun {
        let mut state = JobState::Idle;

        tracing::info!("Sending requests for {}...", job.label);
        advance(&mut state, JobState::Dispatching, job);

        let outcomes = match self.dispatcher.dispatch(job).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                log_failure(job, &e);
                advance(&mut state, JobState::Failed, job);
                return JobRun {
                    state,
                    records: None,
                    error: Some(e),
                };
            }
        };

        advance(&mut state, JobState::Normalizing, job);
        let records = outcomes
            .iter()
            .map(|outcome| flatten(outcome, &job.endpoint))
            .collect::<Vec<_>>();

        advance(&mut state, JobState::Done, job);
        tracing::debug!("{}: {} record(s)", job.label, records.len());

        JobRun {
            state,
            records: Some(records),
            error: None,
        }
    }
}

/// Build the exported row for one call outcome.
pub fn flatten(outcome: &CallOutcome, endpoint: &str) -> NormalizedRecord {
    NormalizedRecord {
        status_code: outcome.status_code,
        request_parameters: request_parameters(outcome.payload_item.as_ref()),
        response_parameters: response_parameters(&outcome.response_body),
        endpoint: endpoint.to_string(),
    }
}

fn advance(state: &mut JobState, next: JobState, job: &JobRecord) {
    tracing::trace!("{}: {} -> {}", job.label, state, next);
    *state = next;
}

fn log_failure(job: &JobRecord, error: &DispatchError) {
    match error {
        DispatchError::PayloadParse(_) => {
            tracing::error!(
                "JSON parse error for {}: {error} (payload: {})",
                job.label,
                job.sample_payload
            );
        }
        DispatchError::UnsupportedMethod(_) => {
            tracing::warn!("Invalid request type for {}: {error}", job.label);
        }
        DispatchError::Network { source, .. } if source.is_timeout() => {
            tracing::error!("Timeout for {}: {}", job.label, job.endpoint);
        }
        _ => {
            tracing::error!("Request error for {}: {error}", job.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeMap;
    use serde_json::json;

    #[test]
    fn test_flatten_get_outcome() {
        let mut body = AttributeMap::new();
        body.insert("status".to_string(), json!("ok"));
        body.insert("id".to_string(), json!(7));
        let outcome = CallOutcome {
            payload_item: None,
            status_code: 200,
            response_body: body,
        };

        let record = flatten(&outcome, "http://x/ep");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.request_parameters, "");
        assert_eq!(record.response_parameters, "status: ok || id: 7");
        assert_eq!(record.endpoint, "http://x/ep");
    }

    #[test]
    fn test_flatten_post_outcome() {
        let outcome = CallOutcome {
            payload_item: Some(json!({"k": 2})),
            status_code: 201,
            response_body: AttributeMap::new(),
        };

        let record = flatten(&outcome, "http://x/ep");
        assert_eq!(record.request_parameters, "k: 2");
        assert_eq!(record.response_parameters, "");
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Done.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Idle.is_terminal());
        assert!(!JobState::Dispatching.is_terminal());
        assert!(!JobState::Normalizing.is_terminal());
    }
}
