//! Concurrent HTTP dispatch for a single job.
//!
//! Every call of a job is spawned onto a [`JoinSet`] and gated by a worker
//! pool shared across jobs. The first failed call aborts the rest of the
//! batch; successes from sibling calls are discarded.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::DispatchConfig;
use crate::normalize::normalize;
use crate::types::{CallOutcome, DispatchError, DispatchResult, JobRecord, Method};

/// Status and body of one completed call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues the calls described by a [`JobRecord`].
#[derive(Clone)]
pub struct RequestDispatcher {
    client: reqwest::Client,
    pool: Arc<Semaphore>,
    capacity: usize,
    content_type: String,
    request_timeout: Duration,
}

impl RequestDispatcher {
    /// Build the HTTP client and the shared worker pool.
    pub fn new(config: &DispatchConfig) -> DispatchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::Client(e.to_string()))?;

        let capacity = config.effective_workers();

        Ok(Self {
            client,
            pool: Arc::new(Semaphore::new(capacity)),
            capacity,
            content_type: config.content_type.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Maximum number of calls in flight at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Workers not currently serving a call.
    pub fn idle_workers(&self) -> usize {
        self.pool.available_permits()
    }

    /// Issue every call of `job` and wait for all of them.
    ///
    /// Outcomes are returned in submission order, whatever order the
    /// responses arrived in.
    pub async fn dispatch(&self, job: &JobRecord) -> DispatchResult<Vec<CallOutcome>> {
        let (method, items): (reqwest::Method, Vec<Option<Value>>) = match &job.method {
            Method::Get => (reqwest::Method::GET, vec![None]),
            Method::Post => {
                let items = parse_payload_items(&job.sample_payload)?;
                (reqwest::Method::POST, items.into_iter().map(Some).collect())
            }
            Method::Other(raw) => return Err(DispatchError::UnsupportedMethod(raw.clone())),
        };

        tracing::debug!(
            "Dispatching {} {} call(s) to {}",
            items.len(),
            method,
            job.endpoint
        );

        self.run_batch(method, &job.endpoint, items).await
    }

    async fn run_batch(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        items: Vec<Option<Value>>,
    ) -> DispatchResult<Vec<CallOutcome>> {
        let total = items.len();
        let mut set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let mut request = self
                .client
                .request(method.clone(), endpoint)
                .header(CONTENT_TYPE, self.content_type.as_str())
                .timeout(self.request_timeout);
            if let Some(body) = &item {
                request = request.body(body.to_string());
            }

            let pool = Arc::clone(&self.pool);
            let endpoint = endpoint.to_string();
            set.spawn(async move {
                // The pool is never closed, so a permit is always granted.
                let _permit = pool.acquire_owned().await.ok();
                let result = send(request, &endpoint)
                    .await
                    .map(|raw| normalize(item, &raw));
                (index, result)
            });
        }

        let mut slots: Vec<Option<CallOutcome>> = (0..total).map(|_| None).collect();

        while let Some(joined) = set.join_next().await {
            let failure = match joined {
                Ok((index, Ok(outcome))) => {
                    slots[index] = Some(outcome);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(e) => DispatchError::Worker(e.to_string()),
            };

            // Cancel queued and in-flight siblings before reporting.
            set.shutdown().await;
            return Err(failure);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

async fn send(request: reqwest::RequestBuilder, endpoint: &str) -> DispatchResult<RawResponse> {
    let network = |source: reqwest::Error| DispatchError::Network {
        endpoint: endpoint.to_string(),
        source,
    };

    let response = request.send().await.map_err(network)?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(network)?;

    tracing::debug!("{endpoint} -> {status}");

    Ok(RawResponse { status, body })
}

/// Parse a sample payload fragment into one JSON value per call.
///
/// The fragment is wrapped in `[...]`, so `{"k":1},{"k":2}` yields two items.
/// An empty fragment is an error: a POST job without a sample cannot run.
pub fn parse_payload_items(sample: &str) -> DispatchResult<Vec<Value>> {
    if sample.trim().is_empty() {
        return Err(DispatchError::PayloadParse(
            "sample payload is empty".to_string(),
        ));
    }

    serde_json::from_str::<Vec<Value>>(&format!("[{sample}]"))
        .map_err(|e| DispatchError::PayloadParse(format!("{e} in {sample:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_two_objects() {
        let items = parse_payload_items(r#"{"k":1},{"k":2}"#).unwrap();
        assert_eq!(items, vec![json!({"k": 1}), json!({"k": 2})]);
    }

    #[test]
    fn test_parse_single_object() {
        let items = parse_payload_items(r#"{"name":"a","qty":3}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["qty"], json!(3));
    }

    #[test]
    fn test_parse_keeps_number_text() {
        let items = parse_payload_items(r#"{"id":123456789012345678901234,"p":1.50}"#).unwrap();
        assert_eq!(items[0].to_string(), r#"{"id":123456789012345678901234,"p":1.50}"#);
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(
            parse_payload_items(""),
            Err(DispatchError::PayloadParse(_))
        ));
        assert!(matches!(
            parse_payload_items("   \n"),
            Err(DispatchError::PayloadParse(_))
        ));
    }

    #[test]
    fn test_parse_malformed_is_error() {
        assert!(matches!(
            parse_payload_items(r#"{"k":1"#),
            Err(DispatchError::PayloadParse(_))
        ));
        assert!(matches!(
            parse_payload_items(r#"{"k":1},"#),
            Err(DispatchError::PayloadParse(_))
        ));
    }

    #[test]
    fn test_dispatcher_capacity_from_config() {
        let dispatcher = RequestDispatcher::new(&DispatchConfig {
            max_workers: 0,
            ..DispatchConfig::default()
        })
        .unwrap();
        assert_eq!(dispatcher.capacity(), 1);
        assert_eq!(dispatcher.idle_workers(), 1);
    }
}
