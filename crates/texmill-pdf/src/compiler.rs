//! LaTeX to PDF compilation pipeline
//!
//! Drives an external compiler through a temporary workspace:
//!
//! ```text
//! Pending -> SourceWritten -> ProcessRan -> Succeeded | Failed -> CleanedUp
//! ```
//!
//! The call blocks until the compiler exits. No timeout is applied here;
//! callers that need one wrap the call themselves.

use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::artifact::Artifact;
use crate::config::PipelineConfig;
use crate::error::{PdfError, Result};
use crate::events::{DeliveryMode, EventSink, NullSink, PdfFailed};
use crate::workspace::Workspace;

/// Compiles LaTeX source with an external compiler
#[derive(Clone)]
pub struct CompilationPipeline {
    config: PipelineConfig,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for CompilationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for CompilationPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl CompilationPipeline {
    /// Create a pipeline that does not report events
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            events: Arc::new(NullSink),
        }
    }

    /// Report failures to `events`
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Event sink shared with callers
    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Compile `source` into a PDF.
    ///
    /// On success the workspace is cleaned except for the PDF, which lives
    /// as long as the returned [`Artifact`]. When the compiler cannot be
    /// started or reports failure, a failure event tagged with `mode` is
    /// emitted and [`PdfError::Spawn`] or [`PdfError::Compilation`] is
    /// returned.
    pub fn compile(&self, source: &str, mode: DeliveryMode) -> Result<Artifact> {
        let started_at = Instant::now();
        let workspace = Workspace::allocate(&self.config.work_dir)?;

        if let Err(err) = workspace.write_source(source) {
            workspace.remove_all();
            return Err(err);
        }
        debug!(
            op = "pipeline::compile",
            stage = "source_written",
            source_bytes = source.len(),
            base = %workspace.base().display(),
            "Source written"
        );

        let program = self.config.compiler_program();
        let output = match self.run_compiler(program, &workspace) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    op = "pipeline::compile",
                    stage = "process_ran",
                    result = "error",
                    error_code = "spawn_compiler",
                    program,
                    error = %err,
                    "Failed to start LaTeX compiler"
                );
                self.events.failed(PdfFailed {
                    file_name: workspace.token().to_string(),
                    mode,
                    reason: err.to_string(),
                });
                workspace.remove_all();
                return Err(PdfError::Spawn {
                    program: program.to_string(),
                    source: err,
                });
            }
        };

        if !output.status.success() {
            return Err(self.fail(&workspace, &output, mode, started_at));
        }

        workspace.remove_secondary();
        let artifact = Artifact::new(workspace.pdf_path());
        info!(
            op = "pipeline::compile",
            stage = "cleaned_up",
            result = "succeeded",
            mode = %mode,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            pdf = %artifact.path().display(),
            "LaTeX compiled"
        );
        Ok(artifact)
    }

    fn run_compiler(&self, program: &str, workspace: &Workspace) -> std::io::Result<Output> {
        Command::new(program)
            .arg("-output-directory")
            .arg(workspace.dir())
            .arg(workspace.base())
            .current_dir(workspace.dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    }

    /// Classify a failed run, notify the sink and clean up
    fn fail(
        &self,
        workspace: &Workspace,
        output: &Output,
        mode: DeliveryMode,
        started_at: Instant,
    ) -> PdfError {
        let exit_code = output.status.code();
        let diagnostic = workspace
            .read_failure_log()
            .unwrap_or_else(|| combined_output(output));

        warn!(
            op = "pipeline::compile",
            stage = "failed",
            result = "error",
            mode = %mode,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            exit_code = exit_code.map(i64::from).unwrap_or(-1),
            error_code = "latex_compiler",
            "LaTeX compilation failed"
        );

        self.events.failed(PdfFailed {
            file_name: workspace.token().to_string(),
            mode,
            reason: diagnostic.clone(),
        });

        if self.config.keep_failed_workspace {
            debug!(base = %workspace.base().display(), "Keeping failed workspace");
        } else {
            workspace.remove_all();
        }

        PdfError::Compilation {
            diagnostic,
            exit_code,
        }
    }
}

/// Standard output followed by standard error
fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
