//! Documents and delivery
//!
//! A [`TexDocument`] is either raw LaTeX or a view plus data. The
//! [`PdfService`] renders it, compiles it through a
//! [`CompilationPipeline`] and hands the result over in one of the
//! [`DeliveryMode`]s, notifying the pipeline's event sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::artifact::Artifact;
use crate::compiler::CompilationPipeline;
use crate::error::{PdfError, Result};
use crate::events::{DeliveryMode, EventSink, PdfFailed, PdfGenerated};
use crate::views::{MemoryViews, ViewData, ViewRenderer};

/// LaTeX compiled by [`PdfService::dry_run`]
pub const DRY_RUN_TEX: &str = include_str!("../assets/dryrun.tex");

/// Width of base64 lines in content output
const BASE64_LINE_LEN: usize = 76;

/// Message returned for an unsupported content type
pub const WRONG_CONTENT_TYPE: &str = "Wrong type set. Use raw or base64.";

/// Where the LaTeX comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    /// A named view rendered with data
    View { name: String, data: ViewData },
    /// LaTeX used as is
    Raw,
}

/// A document to compile
#[derive(Debug, Clone, PartialEq)]
pub struct TexDocument {
    source: DocumentSource,
    rendered: Option<String>,
    metadata: serde_json::Value,
    name: Option<String>,
}

impl TexDocument {
    /// Document rendered from a view
    pub fn view(name: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::View {
                name: name.into(),
                data: ViewData::new(),
            },
            rendered: None,
            metadata: serde_json::Value::Null,
            name: None,
        }
    }

    /// Document made of raw LaTeX
    pub fn raw(tex: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Raw,
            rendered: Some(tex.into()),
            metadata: serde_json::Value::Null,
            name: None,
        }
    }

    /// Data for the view; ignored for raw documents
    pub fn with_data(mut self, data: ViewData) -> Self {
        if let DocumentSource::View { data: current, .. } = &mut self.source {
            *current = data;
        }
        self
    }

    /// Metadata passed through to generation events
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// File name used inside bundles; only the final path component is kept
    pub fn with_name(mut self, name: &str) -> Self {
        let base = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.name = Some(base);
        self
    }

    /// File name used inside bundles
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Metadata passed through to generation events
    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    /// Render the LaTeX source, once.
    ///
    /// Fails with [`PdfError::ViewNotFound`] before any file is touched
    /// when the view does not resolve.
    pub fn render(&mut self, views: &dyn ViewRenderer) -> Result<&str> {
        if self.rendered.is_none() {
            let DocumentSource::View { name, data } = &self.source else {
                return Ok("");
            };
            if !views.exists(name) {
                return Err(PdfError::ViewNotFound(name.clone()));
            }
            self.rendered = Some(views.render(name, data)?);
        }
        Ok(self.rendered.as_deref().unwrap_or_default())
    }
}

/// How a response should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

/// A compiled PDF ready to be streamed by the delivery layer
#[derive(Debug)]
pub struct PdfResponse {
    pub file_name: String,
    pub disposition: Disposition,
    /// The file is deleted when the response is dropped
    pub artifact: Artifact,
}

impl PdfResponse {
    /// Content type of every response
    pub const CONTENT_TYPE: &'static str = "application/pdf";

    /// Response headers as name/value pairs
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let disposition = match self.disposition {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        };
        vec![
            ("Content-Type", Self::CONTENT_TYPE.to_string()),
            (
                "Content-Disposition",
                format!("{}; filename=\"{}\"", disposition, self.file_name),
            ),
        ]
    }
}

/// Requested content representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Raw,
    Base64,
}

impl ContentKind {
    /// Parse `raw` or `base64`
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "raw" => Some(ContentKind::Raw),
            "base64" => Some(ContentKind::Base64),
            _ => None,
        }
    }
}

/// PDF content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfContent {
    Raw(Vec<u8>),
    /// Base64 in 76-character lines, each ending in CRLF
    Base64(String),
}

/// Result of a content request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    Content(PdfContent),
    /// The request was invalid; nothing was compiled
    Rejected { status: u16, message: String },
}

/// Renders, compiles and delivers documents
#[derive(Clone)]
pub struct PdfService {
    pipeline: CompilationPipeline,
    views: Arc<dyn ViewRenderer>,
}

impl std::fmt::Debug for PdfService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfService")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl PdfService {
    /// Service without views; only raw documents can be compiled
    pub fn new(pipeline: CompilationPipeline) -> Self {
        Self {
            pipeline,
            views: Arc::new(MemoryViews::new()),
        }
    }

    /// Use `views` to render view documents
    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = views;
        self
    }

    pub fn pipeline(&self) -> &CompilationPipeline {
        &self.pipeline
    }

    fn events(&self) -> &dyn EventSink {
        self.pipeline.events().as_ref()
    }

    pub(crate) fn compile(&self, document: &mut TexDocument, mode: DeliveryMode) -> Result<Artifact> {
        let source = document.render(self.views.as_ref())?;
        self.pipeline.compile(source, mode)
    }

    fn notify(&self, document: &TexDocument, target: String, mode: DeliveryMode) {
        self.events().generated(PdfGenerated {
            target,
            mode,
            metadata: document.metadata().clone(),
        });
    }

    /// Compile and move the PDF to `location`
    pub fn save_pdf(&self, document: &mut TexDocument, location: impl AsRef<Path>) -> Result<PathBuf> {
        let artifact = self.compile(document, DeliveryMode::SavePdf)?;
        let saved = artifact.persist(location.as_ref())?;
        self.notify(
            document,
            saved.to_string_lossy().into_owned(),
            DeliveryMode::SavePdf,
        );
        Ok(saved)
    }

    /// Compile for download; the name defaults to the artifact's
    pub fn download(&self, document: &mut TexDocument, file_name: Option<&str>) -> Result<PdfResponse> {
        self.respond(document, file_name, DeliveryMode::Download, Disposition::Attachment)
    }

    /// Compile for inline display; the name defaults to the artifact's
    pub fn inline(&self, document: &mut TexDocument, file_name: Option<&str>) -> Result<PdfResponse> {
        self.respond(document, file_name, DeliveryMode::Inline, Disposition::Inline)
    }

    fn respond(
        &self,
        document: &mut TexDocument,
        file_name: Option<&str>,
        mode: DeliveryMode,
        disposition: Disposition,
    ) -> Result<PdfResponse> {
        let artifact = self.compile(document, mode)?;
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| artifact.file_name());
        self.notify(document, file_name.clone(), mode);
        Ok(PdfResponse {
            file_name,
            disposition,
            artifact,
        })
    }

    /// Compile and return the PDF content as `raw` bytes or `base64`.
    ///
    /// Any other `kind` is rejected with status 400 and a failure event,
    /// without rendering or compiling anything.
    pub fn content(&self, document: &mut TexDocument, kind: &str) -> Result<ContentOutcome> {
        let Some(kind) = ContentKind::parse(kind) else {
            debug!(op = "service::content", kind, "Rejected content type");
            self.events().failed(PdfFailed {
                file_name: String::new(),
                mode: DeliveryMode::Content,
                reason: "Wrong type set".to_string(),
            });
            return Ok(ContentOutcome::Rejected {
                status: 400,
                message: WRONG_CONTENT_TYPE.to_string(),
            });
        };

        let artifact = self.compile(document, DeliveryMode::Content)?;
        self.notify(document, artifact.file_name(), DeliveryMode::Content);

        let bytes = artifact.read()?;
        artifact.release();

        let content = match kind {
            ContentKind::Raw => PdfContent::Raw(bytes),
            ContentKind::Base64 => PdfContent::Base64(chunk_split(&STANDARD.encode(bytes))),
        };
        Ok(ContentOutcome::Content(content))
    }

    /// Compile a bundled test document as `dryrun.pdf`
    pub fn dry_run(&self) -> Result<PdfResponse> {
        let mut document = TexDocument::raw(DRY_RUN_TEX);
        self.download(&mut document, Some("dryrun.pdf"))
    }
}

/// Split base64 text into lines of 76 characters, each ending in CRLF
fn chunk_split(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_LEN * 2 + 2);
    let mut rest = encoded;
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(BASE64_LINE_LEN));
        out.push_str(line);
        out.push_str("\r\n");
        rest = tail;
    }
    out
}
