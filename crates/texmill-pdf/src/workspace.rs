//! Per-invocation workspace files
//!
//! A workspace is a random, extensionless base path inside the work
//! directory. The compiler derives its outputs from it:
//!
//! ```text
//! <work_dir>/<base>        LaTeX source
//! <work_dir>/<base>.aux    auxiliary data
//! <work_dir>/<base>.log    compiler log
//! <work_dir>/<base>.out    hyperref outlines
//! <work_dir>/<base>.pdf    the artifact
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::artifact::remove_quietly;
use crate::error::{PdfError, Result};

/// Length of the random base-name token
const BASE_NAME_LEN: usize = 12;

/// Random characters the temp-file facility adds after the token
const TEMPFILE_RAND_BYTES: usize = 6;

/// Auxiliary outputs removed after a successful run
const SECONDARY_EXTENSIONS: [&str; 3] = ["aux", "log", "out"];

/// Random token used as file-name prefix, 12 lower-case hex digits
pub fn random_base_name() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(BASE_NAME_LEN);
    token
}

fn extension_regex() -> &'static Regex {
    static EXT_RE: OnceLock<Regex> = OnceLock::new();
    EXT_RE.get_or_init(|| Regex::new(r"\.[^.\s]{3,4}$").unwrap())
}

/// Files of one compilation
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    token: String,
    base: PathBuf,
}

impl Workspace {
    /// Create a fresh, uniquely named source file in `dir`.
    ///
    /// A relative `dir` is resolved against the current directory, so the
    /// paths handed to the compiler stay valid from inside `dir`.
    ///
    /// Any extension the temp-file facility appended is stripped by
    /// renaming, and the file is made world-readable and executable.
    pub fn allocate(dir: &Path) -> Result<Self> {
        let dir = absolute_dir(dir)?;
        let token = random_base_name();
        let created = tempfile::Builder::new()
            .prefix(&token)
            .rand_bytes(TEMPFILE_RAND_BYTES)
            .tempfile_in(&dir)
            .map_err(|err| PdfError::workspace(&dir, err))?
            .into_temp_path()
            .keep()
            .map_err(|err| PdfError::workspace(&dir, err.error))?;

        let base = strip_extension(&created);
        if base != created {
            if base.exists() {
                remove_quietly(&created);
                return Err(PdfError::workspace(
                    &base,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "workspace base path already taken",
                    ),
                ));
            }
            fs::rename(&created, &base).map_err(|err| {
                remove_quietly(&created);
                PdfError::workspace(&base, err)
            })?;
        }

        set_mode(&base).map_err(|err| {
            remove_quietly(&base);
            PdfError::workspace(&base, err)
        })?;

        Ok(Self {
            dir,
            token,
            base,
        })
    }

    /// Write the LaTeX source verbatim
    pub fn write_source(&self, source: &str) -> Result<()> {
        fs::write(&self.base, source).map_err(|err| PdfError::workspace(&self.base, err))
    }

    /// Work directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The random token the base name starts with
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Extensionless base path, also the source file
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>.<extension>`
    pub fn with_extension(&self, extension: &str) -> PathBuf {
        self.concat(&format!(".{extension}"))
    }

    /// Where the compiler writes the PDF
    pub fn pdf_path(&self) -> PathBuf {
        self.with_extension("pdf")
    }

    /// Log path consulted on failure: `<base>log`, without a dot.
    ///
    /// Real compilers write `<base>.log`, so this only matches when the
    /// compiler writes exactly this name. Kept for compatibility.
    pub fn failure_log_path(&self) -> PathBuf {
        self.concat("log")
    }

    fn concat(&self, suffix: &str) -> PathBuf {
        let mut path = OsString::from(self.base.as_os_str());
        path.push(suffix);
        PathBuf::from(path)
    }

    /// Contents of the failure log, if the compiler left one
    pub fn read_failure_log(&self) -> Option<String> {
        let path = self.failure_log_path();
        fs::read(&path)
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Remove the source and the aux/log/out files. Never fails.
    pub fn remove_secondary(&self) {
        remove_quietly(&self.base);
        for extension in SECONDARY_EXTENSIONS {
            remove_quietly(&self.with_extension(extension));
        }
    }

    /// Remove every file of the workspace, the PDF included
    pub fn remove_all(&self) {
        self.remove_secondary();
        remove_quietly(&self.failure_log_path());
        remove_quietly(&self.pdf_path());
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .map_err(|err| PdfError::workspace(dir, err))
}

fn strip_extension(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let stripped = extension_regex().replace(name, "");
    if stripped.is_empty() {
        return path.to_path_buf();
    }
    path.with_file_name(stripped.as_ref())
}

#[cfg(unix)]
fn set_mode(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
