use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Wall-clock budget applied independently to the compile phase and the run
/// phase of every job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Java,
    Python,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpp" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "python" => Ok(Language::Python),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
        };
        f.write_str(name)
    }
}

/// One submission: the language tag plus the untrusted source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub language: Language,
    pub code: String,
}

/// One input/expected-output pair owned by the problem collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// Engine configuration. The workspace root is always passed in explicitly;
/// the engine never reads it from ambient global state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory under which the sources/ and inputs/ subtrees are created.
    pub workspace_root: PathBuf,
    /// Wall-clock limit for each compile/run phase.
    pub timeout: Duration,
}

impl EngineConfig {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Terminal classification of one execution job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    CompileFailed,
    RuntimeFailed,
    Timeout,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeStatus::Succeeded => "succeeded",
            OutcomeStatus::CompileFailed => "compile_failed",
            OutcomeStatus::RuntimeFailed => "runtime_failed",
            OutcomeStatus::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Result of one compile+run attempt. Produced exactly once per job and
/// never mutated afterwards. `duration` never exceeds the configured
/// timeout; a job cut off by the watchdog reports the full budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: OutcomeStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Grading result for a single test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub input: String,
    pub expected: String,
    pub output: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

/// Aggregate grading result of one submission against an ordered case list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "passedAll")]
    pub passed_all: bool,
    pub results: Vec<CaseResult>,
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
