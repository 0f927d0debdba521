//! Pipeline configuration
//!
//! Passed explicitly to [`crate::CompilationPipeline::new`]. Loadable from
//! the `[pipeline]` table of `texmill.toml`:
//!
//! ```toml
//! [pipeline]
//! compiler = "/usr/bin/pdflatex"
//! work_dir = "/var/tmp/texmill"
//! keep_failed_workspace = false
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Compiler used when none is configured
pub const DEFAULT_COMPILER: &str = "pdflatex";

/// Configuration of a compilation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Compiler program, a path or a name resolved through `PATH`
    pub compiler: String,
    /// Directory holding workspace files
    pub work_dir: PathBuf,
    /// Keep source, aux and log files after a failed run
    pub keep_failed_workspace: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compiler: DEFAULT_COMPILER.to_string(),
            work_dir: std::env::temp_dir(),
            keep_failed_workspace: false,
        }
    }
}

impl PipelineConfig {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Use a different compiler
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Use a different work directory
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Keep workspace files when compilation fails
    pub fn with_keep_failed_workspace(mut self, keep: bool) -> Self {
        self.keep_failed_workspace = keep;
        self
    }

    /// The compiler to run; an empty setting falls back to `pdflatex`
    pub fn compiler_program(&self) -> &str {
        if self.compiler.trim().is_empty() {
            DEFAULT_COMPILER
        } else {
            &self.compiler
        }
    }
}
