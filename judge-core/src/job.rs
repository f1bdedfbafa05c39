use std::fmt;
use uuid::Uuid;

/// Identifier minted once per compile+run job. Uniqueness across
/// concurrently executing jobs is what keeps their on-disk artifacts from
/// colliding; it is the only synchronization the filesystem namespace needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
