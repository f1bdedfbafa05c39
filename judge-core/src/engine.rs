use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

use crate::{
    error::Error,
    job::JobId,
    languages::{self, CommandSpec, Toolchain},
    types::{EngineConfig, ExecutionOutcome, OutcomeStatus, Submission},
    workspace::{InputArtifact, SourceArtifact, Workspace},
};

/// Result of preparing a submission: either a runnable job or the compiler's
/// diagnostics.
pub enum Prepared {
    Runnable(PreparedJob),
    CompileFailed(ExecutionOutcome),
}

/// A submission whose source is materialized and, where the toolchain has a
/// compile step, already built. Running it against an input is cheaply
/// repeatable; the judge reuses one prepared job across every test case.
/// All on-disk artifacts go away when the job is dropped.
pub struct PreparedJob {
    source: SourceArtifact,
    toolchain: Box<dyn Toolchain>,
}

impl PreparedJob {
    pub fn id(&self) -> JobId {
        self.source.job_id()
    }
}

/// Runs one source+input pair per invocation: optional compile step, then
/// the run step with captured stdout/stderr, each under an independent
/// wall-clock budget enforced by a watchdog that kills the process.
pub struct ExecutionEngine {
    workspace: Workspace,
    timeout: Duration,
}

enum StepExit {
    Exited {
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    },
    TimedOut,
}

impl ExecutionEngine {
    pub async fn new(config: EngineConfig) -> Result<Self, Error> {
        let workspace = Workspace::new(&config.workspace_root).await?;
        Ok(Self {
            workspace,
            timeout: config.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write one stdin payload into the workspace.
    pub async fn materialize_input(&self, payload: &str) -> Result<InputArtifact, Error> {
        self.workspace.materialize_input(payload).await
    }

    /// Materialize the submission's source and run its compile step, if the
    /// toolchain has one. The compile phase gets the same budget as a run
    /// phase; compile failures carry the compiler's stderr.
    pub async fn prepare(&self, submission: &Submission) -> Result<Prepared, Error> {
        let toolchain = languages::lookup(submission.language);
        let job_id = JobId::new();
        let source = self
            .workspace
            .materialize_source(job_id, toolchain.as_ref(), &submission.code)
            .await?;

        if let Some(compile) = toolchain.compile_command(source.job_dir(), source.path()) {
            debug!(job = %job_id, program = %compile.program, "compiling submission");
            match self
                .run_step(&compile, source.job_dir(), Stdio::null())
                .await?
            {
                StepExit::Exited {
                    status,
                    stdout,
                    stderr,
                    elapsed,
                } => {
                    let missing_artifact = toolchain
                        .build_artifact(source.job_dir())
                        .is_some_and(|artifact| !artifact.exists());
                    if !status.success() || missing_artifact {
                        warn!(job = %job_id, exit = ?status.code(), "compilation failed");
                        return Ok(Prepared::CompileFailed(ExecutionOutcome {
                            status: OutcomeStatus::CompileFailed,
                            stdout,
                            stderr: if stderr.trim().is_empty() {
                                "compiler produced no output artifact".to_string()
                            } else {
                                stderr
                            },
                            exit_code: status.code(),
                            duration: elapsed,
                        }));
                    }
                }
                StepExit::TimedOut => {
                    warn!(job = %job_id, "compilation timed out");
                    return Ok(Prepared::CompileFailed(ExecutionOutcome {
                        status: OutcomeStatus::CompileFailed,
                        stdout: String::new(),
                        stderr: format!(
                            "compilation exceeded the {} second limit",
                            self.timeout.as_secs()
                        ),
                        exit_code: None,
                        duration: self.timeout,
                    }));
                }
            }
        }

        Ok(Prepared::Runnable(PreparedJob { source, toolchain }))
    }

    /// Run a prepared job once, with stdin bound to the input artifact.
    /// Exactly one outcome per invocation; no retries.
    pub async fn run(
        &self,
        job: &PreparedJob,
        input: &InputArtifact,
    ) -> Result<ExecutionOutcome, Error> {
        let spec = job
            .toolchain
            .run_command(job.source.job_dir(), job.source.path());
        let stdin = tokio::fs::File::open(input.path()).await?.into_std().await;

        debug!(job = %job.id(), program = %spec.program, "running submission");
        match self
            .run_step(&spec, job.source.job_dir(), Stdio::from(stdin))
            .await?
        {
            StepExit::Exited {
                status,
                stdout,
                stderr,
                elapsed,
            } => Ok(ExecutionOutcome {
                status: if status.success() {
                    OutcomeStatus::Succeeded
                } else {
                    OutcomeStatus::RuntimeFailed
                },
                stdout,
                stderr,
                exit_code: status.code(),
                duration: elapsed,
            }),
            StepExit::TimedOut => Ok(ExecutionOutcome {
                status: OutcomeStatus::Timeout,
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                duration: self.timeout,
            }),
        }
    }

    async fn run_step(
        &self,
        spec: &CommandSpec,
        cwd: &Path,
        stdin: Stdio,
    ) -> Result<StepExit, Error> {
        let program = resolve_program(&spec.program)?;

        let mut command = Command::new(&program);
        command
            .args(&spec.args)
            .current_dir(cwd)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| Error::System(format!("Failed to spawn {}: {}", spec.program, e)))?;
        let child_id = child.id();
        let started = Instant::now();

        match time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(StepExit::Exited {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                elapsed: started.elapsed().min(self.timeout),
            }),
            Ok(Err(e)) => Err(Error::System(format!("Process error: {}", e))),
            Err(_) => {
                if let Some(id) = child_id {
                    // SIGTERM, short grace period, then SIGKILL
                    let _ = Command::new("kill").arg(id.to_string()).status().await;
                    time::sleep(Duration::from_millis(10)).await;
                    let _ = Command::new("kill")
                        .arg("-9")
                        .arg(id.to_string())
                        .status()
                        .await;
                }
                Ok(StepExit::TimedOut)
            }
        }
    }
}

/// Paths run as-is; bare names resolve through the system search path.
fn resolve_program(program: &str) -> Result<PathBuf, Error> {
    let candidate = Path::new(program);
    if candidate.is_absolute() || program.starts_with("./") {
        Ok(candidate.to_path_buf())
    } else if let Ok(path) = which::which(program) {
        Ok(path)
    } else {
        Err(Error::System(format!("Command not found: {}", program)))
    }
}
