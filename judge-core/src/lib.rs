//! # Judge Core
//!
//! Execution and grading engine for code submissions: materializes untrusted
//! source text as filesystem artifacts, optionally compiles it, runs it
//! against supplied input under a wall-clock deadline, and compares captured
//! output against expected results to produce per-case and aggregate
//! verdicts.

mod engine;
mod error;
mod job;
mod judge;
mod languages;
mod service;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use engine::{ExecutionEngine, Prepared, PreparedJob};
pub use error::Error;
pub use job::JobId;
pub use judge::{outputs_match, Judge};
pub use languages::{lookup, CommandSpec, Toolchain};
pub use service::JudgeService;
pub use types::{
    CaseResult, EngineConfig, ExecutionOutcome, Language, OutcomeStatus, Submission, TestCase,
    Verdict, DEFAULT_TIMEOUT,
};
pub use workspace::{InputArtifact, SourceArtifact, Workspace};

/// Result type for judge operations
pub type Result<T> = std::result::Result<T, Error>;
