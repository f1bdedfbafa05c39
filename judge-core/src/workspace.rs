use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::Error, job::JobId, languages::Toolchain};

/// Filesystem root for job artifacts: a `sources/` subtree holding one
/// directory per job and an `inputs/` subtree holding one file per case.
/// The root is always supplied by the caller, never read from ambient
/// state.
pub struct Workspace {
    sources_dir: PathBuf,
    inputs_dir: PathBuf,
}

impl Workspace {
    pub async fn new(root: &Path) -> Result<Self, Error> {
        let sources_dir = root.join("sources");
        let inputs_dir = root.join("inputs");
        fs::create_dir_all(&sources_dir).await?;
        fs::create_dir_all(&inputs_dir).await?;
        Ok(Self {
            sources_dir,
            inputs_dir,
        })
    }

    /// Write submitted source text exactly once into a fresh per-job
    /// directory. The directory name carries the job id, so toolchains with
    /// a fixed entry-point filename (Java's `Main.java`) still get unique
    /// paths across concurrent jobs.
    pub async fn materialize_source(
        &self,
        job_id: JobId,
        toolchain: &dyn Toolchain,
        code: &str,
    ) -> Result<SourceArtifact, Error> {
        let job_dir = self.sources_dir.join(job_id.to_string());
        fs::create_dir_all(&job_dir).await?;

        let path = job_dir.join(toolchain.source_filename(job_id));
        fs::write(&path, code).await?;
        debug!(job = %job_id, path = %path.display(), "materialized source");

        Ok(SourceArtifact {
            job_id,
            job_dir,
            path,
        })
    }

    /// Write one stdin payload to a uniquely named file under `inputs/`.
    pub async fn materialize_input(&self, payload: &str) -> Result<InputArtifact, Error> {
        let path = self.inputs_dir.join(format!("{}.txt", Uuid::new_v4()));
        fs::write(&path, payload).await?;
        Ok(InputArtifact { path })
    }
}

/// Materialized source for one job. Owns the whole job directory, which also
/// receives compile outputs; everything is removed when the job finalizes.
pub struct SourceArtifact {
    job_id: JobId,
    job_dir: PathBuf,
    path: PathBuf,
}

impl SourceArtifact {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn job_dir(&self) -> &Path {
        &self.job_dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SourceArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.job_dir) {
            warn!(job = %self.job_id, "failed to clean up job directory: {}", e);
        }
    }
}

/// Materialized stdin payload for one case, removed when the case finalizes.
pub struct InputArtifact {
    path: PathBuf,
}

impl InputArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InputArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), "failed to clean up input file: {}", e);
        }
    }
}
