//! Error types for PDF generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during PDF generation
#[derive(Error, Debug)]
pub enum PdfError {
    /// The requested view does not exist; raised before any file I/O
    #[error("View {0} not found.")]
    ViewNotFound(String),

    /// Temporary workspace allocation failed
    #[error("Workspace error at {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler binary could not be started
    #[error("Failed to start compiler {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and reported failure
    #[error("LaTeX compilation failed (exit {exit_code:?}):\n{diagnostic}")]
    Compilation {
        /// Compiler log contents, or the captured output when no log exists
        diagnostic: String,
        exit_code: Option<i32>,
    },

    /// IO error while reading or moving an artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl PdfError {
    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PdfError::Workspace {
            path: path.into(),
            source,
        }
    }

    /// Compiler diagnostic, if this is a compilation failure
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            PdfError::Compilation { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_not_found_message() {
        let err = PdfError::ViewNotFound("invoice".to_string());
        assert_eq!(err.to_string(), "View invoice not found.");
    }

    #[test]
    fn test_diagnostic_accessor() {
        let err = PdfError::Compilation {
            diagnostic: "! Undefined control sequence.".to_string(),
            exit_code: Some(1),
        };
        assert_eq!(err.diagnostic(), Some("! Undefined control sequence."));
        assert!(err.to_string().contains("Undefined control sequence"));

        let io = PdfError::from(std::io::Error::other("x"));
        assert_eq!(io.diagnostic(), None);
    }
}
