//! Shared helpers for process tests: a shell-script stand-in for pdflatex.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tempfile::TempDir;
use texmill_pdf::{CompilationPipeline, PipelineConfig, RecordingSink};

/// Writes its outputs under `-output-directory` like pdflatex, resolved
/// from its own working directory. Behaviour keyed on markers in the source:
/// - `FAIL`: print an error, leave `.log`/`.aux`, exit 1
/// - `QUIRKLOG`: write `<job>log` (no dot), exit 1
/// - otherwise: copy the source to `<job>.pdf` and leave aux files behind
const STUB_SCRIPT: &str = r#"#!/bin/sh
if [ "$1" != "-output-directory" ]; then
  echo "unexpected arguments: $*" >&2
  exit 2
fi
dir="$2"
src="$3"
out="$dir/$(basename "$src")"
if [ ! -d "$dir" ]; then
  echo "! I can't write on file '$out.log'."
  exit 1
fi
if grep -q QUIRKLOG "$src"; then
  echo "quirk log diagnostic" > "${out}log"
  exit 1
fi
if grep -q FAIL "$src"; then
  echo "! Undefined control sequence."
  echo "l.1 FAIL" >&2
  echo "log written" > "$out.log"
  touch "$out.aux"
  exit 1
fi
cp "$src" "$out.pdf"
touch "$out.aux" "$out.log" "$out.out"
exit 0
"#;

/// Path of the stub compiler, written once per test binary
pub fn stub_compiler() -> &'static Path {
    static STUB: OnceLock<PathBuf> = OnceLock::new();
    STUB.get_or_init(|| {
        // Leaked on purpose: the script must outlive every test thread.
        let dir = Box::leak(Box::new(TempDir::new().unwrap()));
        let path = dir.path().join("fake-pdflatex");
        fs::write(&path, STUB_SCRIPT).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    })
}

/// Pipeline using the stub compiler in a fresh work directory
pub fn stub_pipeline() -> (TempDir, Arc<RecordingSink>, CompilationPipeline) {
    let work_dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::new());
    let config = PipelineConfig::default()
        .with_compiler(stub_compiler().to_string_lossy())
        .with_work_dir(work_dir.path());
    let pipeline = CompilationPipeline::new(config).with_events(sink.clone());
    (work_dir, sink, pipeline)
}

/// Names of the files currently in `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
