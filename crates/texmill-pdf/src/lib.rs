//! texmill-pdf - PDF generation via an external LaTeX compiler
//!
//! Compiles LaTeX source with `pdflatex` (or any compatible binary) in a
//! private temporary workspace and hands the PDF back as a scoped
//! [`Artifact`].
//!
//! # Architecture
//!
//! 1. **Pipeline** - [`CompilationPipeline`] writes the source, runs the
//!    compiler and cleans up the workspace
//! 2. **Service** - [`PdfService`] renders [`TexDocument`]s through a
//!    [`ViewRenderer`] and delivers the result as a saved file, a
//!    download or inline response, or raw/base64 content
//! 3. **Bundles** - [`PdfBundle`] compiles several documents into a zip
//!
//! # Example
//!
//! ```no_run
//! use texmill_pdf::{CompilationPipeline, PdfService, PipelineConfig, TexDocument};
//!
//! let service = PdfService::new(CompilationPipeline::new(PipelineConfig::default()));
//! let mut document = TexDocument::raw(
//!     "\\documentclass{article}\\begin{document}Hi\\end{document}",
//! );
//! let saved = service.save_pdf(&mut document, "hello.pdf")?;
//! # Ok::<(), texmill_pdf::PdfError>(())
//! ```

mod artifact;
mod bundle;
mod compiler;
mod config;
mod document;
mod error;
mod events;
mod views;
mod workspace;

pub use artifact::Artifact;
pub use bundle::PdfBundle;
pub use compiler::CompilationPipeline;
pub use config::{PipelineConfig, DEFAULT_COMPILER};
pub use document::{
    ContentKind, ContentOutcome, Disposition, DocumentSource, PdfContent, PdfResponse, PdfService,
    TexDocument, DRY_RUN_TEX, WRONG_CONTENT_TYPE,
};
pub use error::{PdfError, Result};
pub use events::{
    DeliveryMode, EventSink, NullSink, PdfFailed, PdfGenerated, RecordingSink, TracingSink,
};
pub use views::{MemoryViews, ViewData, ViewRenderer};
pub use workspace::{random_base_name, Workspace};

/// Compile raw LaTeX and return the PDF bytes
pub fn compile_tex(config: PipelineConfig, tex: &str) -> Result<Vec<u8>> {
    let artifact = CompilationPipeline::new(config).compile(tex, DeliveryMode::Content)?;
    let bytes = artifact.read()?;
    artifact.release();
    Ok(bytes)
}
