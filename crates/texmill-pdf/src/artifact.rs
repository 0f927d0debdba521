//! Scoped handle for a compiled PDF
//!
//! The compiled file stays on disk for as long as its [`Artifact`] lives.
//! Dropping or releasing the handle deletes it; [`Artifact::persist`] moves
//! it somewhere else and disarms the deletion.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// A compiled file whose deletion is deferred until the handle goes away
#[derive(Debug)]
pub struct Artifact {
    path: Option<PathBuf>,
}

impl Artifact {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Location of the compiled file
    pub fn path(&self) -> &Path {
        // Only `None` after persist/release, which consume the handle.
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// File name of the artifact, e.g. `a1b2c3d4e5f6XyZ123.pdf`
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Check whether the file is still on disk
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Read the whole file
    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(self.path())
    }

    /// Move the file to `destination`; it is no longer deleted afterwards.
    ///
    /// Falls back to copy and remove when a rename is not possible, e.g.
    /// across file systems.
    pub fn persist(mut self, destination: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let destination = destination.as_ref().to_path_buf();
        let Some(source) = self.path.take() else {
            return Err(std::io::Error::new(
                ErrorKind::NotFound,
                "artifact already released",
            ));
        };

        if let Err(rename_err) = fs::rename(&source, &destination) {
            debug!(
                op = "artifact::persist",
                error = %rename_err,
                "Rename failed, copying artifact instead"
            );
            if let Err(copy_err) = fs::copy(&source, &destination) {
                // Keep the handle armed so the temp file is still cleaned up.
                self.path = Some(source);
                return Err(copy_err);
            }
            remove_quietly(&source);
        }

        Ok(destination)
    }

    /// Delete the file now
    pub fn release(mut self) {
        if let Some(path) = self.path.take() {
            remove_quietly(&path);
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            remove_quietly(&path);
        }
    }
}

/// Remove a file, treating absence as already clean. Never fails.
pub(crate) fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed workspace file"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(
            path = %path.display(),
            error = %err,
            "Failed to remove workspace file"
        ),
    }
}
