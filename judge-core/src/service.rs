use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::{
    engine::ExecutionEngine,
    error::Error,
    judge::Judge,
    types::{EngineConfig, ExecutionOutcome, Submission, TestCase, Verdict},
};

/// Shared judging front door with bounded concurrency: at most
/// `max_concurrent` submissions execute at once, the rest queue on the
/// semaphore.
#[derive(Clone)]
pub struct JudgeService {
    judge: Arc<Judge>,
    semaphore: Arc<Semaphore>,
}

impl JudgeService {
    pub async fn new(max_concurrent: usize, config: EngineConfig) -> Result<Self, Error> {
        let engine = ExecutionEngine::new(config).await?;

        Ok(Self {
            judge: Arc::new(Judge::new(engine)),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        })
    }

    /// Execute a submission once against ad-hoc input, without grading.
    pub async fn run_custom(
        &self,
        submission: &Submission,
        input: &str,
    ) -> Result<ExecutionOutcome, Error> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::System(format!("Failed to acquire execution permit: {}", e)))?;

        debug!(language = %submission.language, "starting custom run");
        let result = self.judge.run_custom(submission, input).await;

        match &result {
            Ok(outcome) => info!(status = %outcome.status, "custom run completed"),
            Err(e) => error!("custom run failed: {}", e),
        }

        result
    }

    /// Grade a submission against the supplied case list.
    pub async fn submit(
        &self,
        submission: &Submission,
        cases: &[TestCase],
    ) -> Result<Verdict, Error> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::System(format!("Failed to acquire execution permit: {}", e)))?;

        debug!(language = %submission.language, cases = cases.len(), "judging submission");
        let result = self.judge.judge(submission, cases).await;

        match &result {
            Ok(verdict) => info!(passed_all = verdict.passed_all, "submission judged"),
            Err(e) => error!("judging failed: {}", e),
        }

        result
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
