use std::path::{Path, PathBuf};

use crate::{
    job::JobId,
    languages::{CommandSpec, Toolchain},
    types::Language,
};

const BINARY_NAME: &str = "program";

pub struct CppToolchain {
    compiler: String,
}

impl CppToolchain {
    pub fn new(compiler: Option<String>) -> Self {
        Self {
            compiler: compiler.unwrap_or_else(|| "g++".to_string()),
        }
    }
}

impl Toolchain for CppToolchain {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_filename(&self, job_id: JobId) -> String {
        format!("{}.cpp", job_id)
    }

    fn compile_command(&self, _job_dir: &Path, source: &Path) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&self.compiler)
                .arg(source.display().to_string())
                .arg("-o")
                .arg(BINARY_NAME),
        )
    }

    fn build_artifact(&self, job_dir: &Path) -> Option<PathBuf> {
        Some(job_dir.join(BINARY_NAME))
    }

    fn run_command(&self, _job_dir: &Path, _source: &Path) -> CommandSpec {
        CommandSpec::new(format!("./{}", BINARY_NAME))
    }
}
