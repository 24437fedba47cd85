//! Correlation of asynchronous outcomes with the requests that started them.
//!
//! A [`Job`] describes one logical request: the server is asked for `pattern` repeated
//! `count` times, and the job records whichever outcome arrives first. The
//! [`JobCorrelator`] keeps jobs under a [`JobId`] and implements [`OutcomeSink`], so a
//! session can report straight into it. A job leaves the correlator with its first outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use http::StatusCode;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::connection::OutcomeSink;
use crate::entity::Entity;
use crate::protocol::{FailureKind, HttpError, ResponseHead};

/// Opaque correlation context handed to a session with each request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Success { status: StatusCode, body: String },
    Failure { message: String, kind: Option<FailureKind> },
}

#[derive(Debug)]
pub struct Job {
    pattern: String,
    count: usize,
    result: OnceLock<JobResult>,
    completed: Notify,
}

impl Job {
    pub fn new<S: Into<String>>(pattern: S, count: usize) -> Self {
        Self { pattern: pattern.into(), count, result: OnceLock::new(), completed: Notify::new() }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Path asking the server for the pattern repeated `count` times.
    pub fn request_path(&self) -> String {
        format!("/{}x{}", self.pattern, self.count)
    }

    /// Body a correct server answers with.
    pub fn expected(&self) -> String {
        self.pattern.repeat(self.count)
    }

    /// Records a successful response; returns false if the job was already completed.
    pub fn complete_success(&self, status: StatusCode, body: String) -> bool {
        self.complete(JobResult::Success { status, body })
    }

    /// Records a failure; returns false if the job was already completed.
    pub fn fail(&self, error: &HttpError) -> bool {
        self.complete(JobResult::Failure { message: error.to_string(), kind: error.failure_kind() })
    }

    fn complete(&self, result: JobResult) -> bool {
        if self.result.set(result).is_err() {
            debug!(path = %self.request_path(), "job already completed, drop the late outcome");
            return false;
        }
        self.completed.notify_waiters();
        true
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.result.get().is_some()
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.get()
    }

    /// Waits until the job completes, or `timeout` elapses.
    pub async fn wait_for(&self, timeout: Duration) -> Option<&JobResult> {
        let wait = async {
            loop {
                let notified = self.completed.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if let Some(result) = self.result.get() {
                    return result;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait).await.ok()
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.result.get(), Some(JobResult::Success { status, .. }) if status.is_success())
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match self.result.get() {
            Some(JobResult::Success { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self.result.get() {
            Some(JobResult::Success { body, .. }) => Some(body),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self.result.get() {
            Some(JobResult::Failure { message, .. }) => Some(message),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.result.get() {
            Some(JobResult::Failure { kind, .. }) => *kind,
            _ => None,
        }
    }
}

/// Registry of in-flight jobs, completed from session outcomes.
#[derive(Debug, Default)]
pub struct JobCorrelator {
    next_id: AtomicU64,
    jobs: Mutex<HashMap<JobId, Arc<Job>>>,
}

impl JobCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, job: Arc<Job>) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).insert(id, job);
        id
    }

    pub fn get(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).get(&id).cloned()
    }

    pub fn remove(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).remove(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the job an outcome belongs to; later outcomes for it are dropped.
    fn take(&self, id: JobId) -> Option<Arc<Job>> {
        let job = self.remove(id);
        if job.is_none() {
            warn!(job = id.as_u64(), "outcome for an unknown or already completed job");
        }
        job
    }
}

impl OutcomeSink<JobId> for JobCorrelator {
    fn on_entity_complete(&self, response: ResponseHead, mut entity: Entity, context: JobId) {
        let Some(job) = self.take(context) else {
            return;
        };

        match entity.content() {
            Ok(content) => {
                job.complete_success(response.status(), String::from_utf8_lossy(&content).into_owned());
            }
            Err(e) => {
                job.fail(&e.into());
            }
        }
    }

    fn on_fatal_error(&self, error: HttpError, context: JobId) {
        if let Some(job) = self.take(context) {
            job.fail(&error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ParseError;
    use http::Response;

    fn finished_entity(content: &[u8]) -> Entity {
        let mut entity = Entity::new();
        entity.append(content);
        entity.finish();
        entity
    }

    #[test]
    fn request_path_and_expected_body() {
        let job = Job::new("ab", 3);
        assert_eq!(job.request_path(), "/abx3");
        assert_eq!(job.expected(), "ababab");
    }

    #[tokio::test]
    async fn completes_exactly_once() {
        let correlator = JobCorrelator::new();
        let job = Arc::new(Job::new("ab", 2));
        let id = correlator.register(Arc::clone(&job));

        let waiter = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { job.wait_for(Duration::from_secs(5)).await.cloned() })
        };

        let response = Response::builder().status(StatusCode::OK).body(()).unwrap();
        correlator.on_entity_complete(response, finished_entity(b"abab"), id);
        correlator.on_fatal_error(ParseError::truncated("late failure").into(), id);

        assert!(correlator.is_empty());
        assert!(correlator.get(id).is_none());

        let result = waiter.await.unwrap().unwrap();
        assert_eq!(result, JobResult::Success { status: StatusCode::OK, body: "abab".to_string() });
        assert!(job.is_successful());
        assert_eq!(job.body(), Some(job.expected().as_str()));
        assert_eq!(job.failure_kind(), None);
    }

    #[tokio::test]
    async fn failure_is_recorded() {
        let correlator = JobCorrelator::new();
        let job = Arc::new(Job::new("x", 1));
        let id = correlator.register(Arc::clone(&job));

        correlator.on_fatal_error(ParseError::truncated("closed mid chunk").into(), id);

        assert!(job.wait_for(Duration::from_millis(10)).await.is_some());
        assert!(!job.is_successful());
        assert_eq!(job.failure_kind(), Some(FailureKind::TruncatedStream));
        assert!(job.failure_message().unwrap().contains("closed mid chunk"));
        assert!(!job.fail(&HttpError::ConnectionClosed));
    }

    #[tokio::test]
    async fn wait_times_out() {
        let job = Job::new("x", 1);
        assert!(job.wait_for(Duration::from_millis(10)).await.is_none());
    }
}
