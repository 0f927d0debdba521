//! Zip bundles of compiled documents

use std::collections::HashSet;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::document::{PdfService, TexDocument};
use crate::error::Result;
use crate::events::{DeliveryMode, PdfGenerated};

/// Several documents compiled into one zip archive
#[derive(Debug, Clone, Default)]
pub struct PdfBundle {
    documents: Vec<TexDocument>,
}

impl PdfBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document
    pub fn push(&mut self, document: TexDocument) {
        self.documents.push(document);
    }

    /// Add a document, builder style
    pub fn with_document(mut self, document: TexDocument) -> Self {
        self.push(document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Entry names in archive order.
    ///
    /// Unnamed documents become `document-<n>.pdf` (1-based); repeated
    /// names get a `-<n>` suffix before the extension.
    pub fn entry_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.documents
            .iter()
            .enumerate()
            .map(|(index, document)| {
                let name = match document.name() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => format!("document-{}.pdf", index + 1),
                };
                unique_name(name, &mut seen)
            })
            .collect()
    }

    /// Compile every document and write the archive to `location`.
    ///
    /// The archive is assembled in a temporary file next to `location` and
    /// only moved into place once every document compiled.
    pub fn save_zip(&mut self, service: &PdfService, location: impl AsRef<Path>) -> Result<PathBuf> {
        let location = location.as_ref();
        let parent = match location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(parent)?;
        self.write_to(service, staging.as_file_mut())?;
        staging
            .persist(location)
            .map_err(|err| err.error)?;

        info!(
            op = "bundle::save_zip",
            result = "succeeded",
            entries = self.documents.len(),
            zip = %location.display(),
            "Bundle written"
        );
        service.pipeline().events().generated(PdfGenerated {
            target: location.to_string_lossy().into_owned(),
            mode: DeliveryMode::SavePdf,
            metadata: serde_json::Value::Null,
        });
        Ok(location.to_path_buf())
    }

    /// Compile every document and write the archive to `writer`
    pub fn write_to<W: Write + Seek>(&mut self, service: &PdfService, writer: W) -> Result<()> {
        let names = self.entry_names();
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (document, name) in self.documents.iter_mut().zip(names) {
            let artifact = service.compile(document, DeliveryMode::SavePdf)?;
            let bytes = artifact.read()?;
            artifact.release();

            zip.start_file(name, options)?;
            zip.write_all(&bytes)?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn unique_name(name: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let mut counter = 2;
    loop {
        let candidate = format!("{stem}-{counter}{extension}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
