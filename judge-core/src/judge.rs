use tracing::{debug, error};

use crate::{
    engine::{ExecutionEngine, Prepared, PreparedJob},
    error::Error,
    types::{CaseResult, ExecutionOutcome, OutcomeStatus, Submission, TestCase, Verdict},
};

/// Grades submissions: one compile per submission, one run per test case,
/// cases taken strictly in the order supplied.
pub struct Judge {
    engine: ExecutionEngine,
}

impl Judge {
    pub fn new(engine: ExecutionEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    /// Run a submission against every case and aggregate a verdict. A
    /// failing case never short-circuits the remaining ones; the submitter
    /// sees all case results. An empty case list is vacuously accepted.
    pub async fn judge(
        &self,
        submission: &Submission,
        cases: &[TestCase],
    ) -> Result<Verdict, Error> {
        if cases.is_empty() {
            debug!("no cases supplied, vacuous accept");
            return Ok(Verdict {
                passed_all: true,
                results: Vec::new(),
            });
        }

        let job = match self.engine.prepare(submission).await? {
            Prepared::Runnable(job) => job,
            Prepared::CompileFailed(outcome) => {
                // every case surfaces the same compiler diagnostics
                let results = cases
                    .iter()
                    .map(|case| CaseResult {
                        input: case.input.clone(),
                        expected: case.expected.clone(),
                        output: failure_detail(&outcome),
                        passed: false,
                        error: true,
                    })
                    .collect();
                return Ok(Verdict {
                    passed_all: false,
                    results,
                });
            }
        };

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.run_case(&job, case).await);
        }

        let passed_all = results.iter().all(|r| r.passed && !r.error);
        Ok(Verdict {
            passed_all,
            results,
        })
    }

    /// Single ad-hoc run against caller-supplied stdin, no grading. This is
    /// the judge's degenerate one-case mode; only the outcome is surfaced.
    pub async fn run_custom(
        &self,
        submission: &Submission,
        input: &str,
    ) -> Result<ExecutionOutcome, Error> {
        match self.engine.prepare(submission).await? {
            Prepared::CompileFailed(outcome) => Ok(outcome),
            Prepared::Runnable(job) => {
                let input = self.engine.materialize_input(input).await?;
                self.engine.run(&job, &input).await
            }
        }
    }

    async fn run_case(&self, job: &PreparedJob, case: &TestCase) -> CaseResult {
        let outcome = match self.engine.materialize_input(&case.input).await {
            Ok(input) => self.engine.run(job, &input).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(outcome) if outcome.status == OutcomeStatus::Succeeded => CaseResult {
                input: case.input.clone(),
                expected: case.expected.clone(),
                output: outcome.stdout.trim().to_string(),
                passed: outputs_match(&outcome.stdout, &case.expected),
                error: false,
            },
            Ok(outcome) => CaseResult {
                input: case.input.clone(),
                expected: case.expected.clone(),
                output: failure_detail(&outcome),
                passed: false,
                error: true,
            },
            Err(e) => {
                error!(job = %job.id(), "case execution failed: {}", e);
                CaseResult {
                    input: case.input.clone(),
                    expected: case.expected.clone(),
                    output: "Execution failed".to_string(),
                    passed: false,
                    error: true,
                }
            }
        }
    }
}

/// Both sides are trimmed of leading/trailing whitespace, then compared
/// byte-for-byte. Internal whitespace differences count as mismatches.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

fn failure_detail(outcome: &ExecutionOutcome) -> String {
    match outcome.status {
        OutcomeStatus::Timeout => {
            format!("Timeout after {} seconds", outcome.duration.as_secs())
        }
        _ => {
            let stderr = outcome.stderr.trim();
            if stderr.is_empty() {
                "Execution failed".to_string()
            } else {
                stderr.to_string()
            }
        }
    }
}
