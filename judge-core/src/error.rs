use thiserror::Error;

/// Failures that abort a whole submission before or outside of user-code
/// execution. Compile errors, runtime errors, and timeouts are not listed
/// here: they are per-job classifications carried by
/// [`OutcomeStatus`](crate::OutcomeStatus).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
