//! Generation events
//!
//! Sinks are notified when a PDF was produced for a delivery mode and when
//! production failed. Notifications are fire-and-forget.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How the produced PDF is handed to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Moved to a location on disk
    SavePdf,
    /// Sent as an attachment
    Download,
    /// Sent for inline display
    Inline,
    /// Returned as bytes or a base64 string
    Content,
}

impl DeliveryMode {
    /// Lower-case identifier, e.g. `savepdf`
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::SavePdf => "savepdf",
            DeliveryMode::Download => "download",
            DeliveryMode::Inline => "inline",
            DeliveryMode::Content => "content",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PDF was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfGenerated {
    /// File name or destination path of the PDF
    pub target: String,
    pub mode: DeliveryMode,
    /// Caller-supplied metadata, passed through untouched
    pub metadata: serde_json::Value,
}

/// PDF production failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfFailed {
    /// Workspace token or requested file name; empty when none exists yet
    pub file_name: String,
    pub mode: DeliveryMode,
    pub reason: String,
}

/// Receiver of generation events
pub trait EventSink: Send + Sync {
    /// A PDF was produced
    fn generated(&self, event: PdfGenerated);

    /// PDF production failed
    fn failed(&self, event: PdfFailed);
}

/// Sink that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn generated(&self, _event: PdfGenerated) {}

    fn failed(&self, _event: PdfFailed) {}
}

/// Sink that reports events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn generated(&self, event: PdfGenerated) {
        info!(
            target: "texmill::events",
            mode = %event.mode,
            pdf = %event.target,
            metadata = %event.metadata,
            "PDF generated"
        );
    }

    fn failed(&self, event: PdfFailed) {
        warn!(
            target: "texmill::events",
            mode = %event.mode,
            file_name = %event.file_name,
            reason = %event.reason,
            "PDF generation failed"
        );
    }
}

/// Sink that keeps every event, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    generated: Mutex<Vec<PdfGenerated>>,
    failed: Mutex<Vec<PdfFailed>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success events received so far
    pub fn generated_events(&self) -> Vec<PdfGenerated> {
        self.generated.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Failure events received so far
    pub fn failed_events(&self) -> Vec<PdfFailed> {
        self.failed.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn generated(&self, event: PdfGenerated) {
        if let Ok(mut events) = self.generated.lock() {
            events.push(event);
        }
    }

    fn failed(&self, event: PdfFailed) {
        if let Ok(mut events) = self.failed.lock() {
            events.push(event);
        }
    }
}
