use std::path::{Path, PathBuf};

use crate::{
    job::JobId,
    languages::{CommandSpec, Toolchain},
    types::Language,
};

pub struct PythonToolchain {
    interpreter: String,
}

impl PythonToolchain {
    pub fn new(interpreter: Option<String>) -> Self {
        Self {
            interpreter: interpreter.unwrap_or_else(|| "python3".to_string()),
        }
    }
}

impl Toolchain for PythonToolchain {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_filename(&self, job_id: JobId) -> String {
        format!("{}.py", job_id)
    }

    fn compile_command(&self, _job_dir: &Path, _source: &Path) -> Option<CommandSpec> {
        None
    }

    fn build_artifact(&self, _job_dir: &Path) -> Option<PathBuf> {
        None
    }

    fn run_command(&self, _job_dir: &Path, source: &Path) -> CommandSpec {
        CommandSpec::new(&self.interpreter).arg(source.display().to_string())
    }
}
