//! Process tests for the compilation pipeline, using a stub compiler

#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use common::{files_in, stub_compiler, stub_pipeline};
use texmill_pdf::{
    compile_tex, CompilationPipeline, DeliveryMode, PdfError, PipelineConfig, RecordingSink,
    Workspace,
};

#[test]
fn test_success_leaves_only_the_pdf() {
    let (work_dir, sink, pipeline) = stub_pipeline();

    let artifact = pipeline
        .compile("\\documentclass{article}", DeliveryMode::Download)
        .unwrap();

    assert!(artifact.exists());
    assert!(artifact.file_name().ends_with(".pdf"));
    assert_eq!(files_in(work_dir.path()), vec![artifact.file_name()]);
    assert_eq!(artifact.read().unwrap(), b"\\documentclass{article}");
    assert!(sink.failed_events().is_empty());

    drop(artifact);
    assert!(files_in(work_dir.path()).is_empty());
}

#[test]
fn test_failure_reports_output_and_cleans_up() {
    let (work_dir, sink, pipeline) = stub_pipeline();

    let err = pipeline
        .compile("\\FAIL", DeliveryMode::Inline)
        .unwrap_err();

    match &err {
        PdfError::Compilation {
            diagnostic,
            exit_code,
        } => {
            assert!(diagnostic.contains("! Undefined control sequence."));
            assert!(diagnostic.contains("l.1"));
            assert_eq!(*exit_code, Some(1));
        }
        other => panic!("expected compilation error, got {other:?}"),
    }

    let failed = sink.failed_events();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].mode, DeliveryMode::Inline);
    assert_eq!(failed[0].reason, err.diagnostic().unwrap());
    assert_eq!(failed[0].file_name.len(), 12);
    assert!(files_in(work_dir.path()).is_empty());
}

#[test]
fn test_relative_work_dir() {
    // Relative to the test's working directory, the package root
    let holder = tempfile::Builder::new()
        .prefix("texmill-work")
        .tempdir_in(".")
        .unwrap();
    let relative = PathBuf::from(holder.path().file_name().unwrap());
    let sink = Arc::new(RecordingSink::new());
    let config = PipelineConfig::default()
        .with_compiler(stub_compiler().to_string_lossy())
        .with_work_dir(&relative);
    let pipeline = CompilationPipeline::new(config).with_events(sink.clone());

    let artifact = pipeline
        .compile("relative", DeliveryMode::Download)
        .unwrap();

    assert!(artifact.path().is_absolute());
    assert_eq!(artifact.read().unwrap(), b"relative");
    assert_eq!(files_in(holder.path()), vec![artifact.file_name()]);
    assert!(sink.failed_events().is_empty());

    drop(artifact);
    assert!(files_in(holder.path()).is_empty());
}

#[test]
fn test_failure_prefers_dotless_log() {
    let (work_dir, _sink, pipeline) = stub_pipeline();

    let err = pipeline
        .compile("QUIRKLOG", DeliveryMode::Download)
        .unwrap_err();

    assert_eq!(err.diagnostic(), Some("quirk log diagnostic\n"));
    assert!(files_in(work_dir.path()).is_empty());
}

#[test]
fn test_keep_failed_workspace() {
    let (work_dir, _sink, pipeline) = stub_pipeline();
    let config = pipeline.config().clone().with_keep_failed_workspace(true);
    let pipeline = CompilationPipeline::new(config);

    pipeline
        .compile("\\FAIL", DeliveryMode::Download)
        .unwrap_err();

    let files = files_in(work_dir.path());
    assert!(files.iter().any(|f| f.ends_with(".log")));
    assert!(files.iter().any(|f| f.ends_with(".aux")));
    assert!(files.iter().any(|f| !f.contains('.')));
}

#[test]
fn test_concurrent_compiles_do_not_collide() {
    let (work_dir, _sink, pipeline) = stub_pipeline();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = pipeline.clone();
            thread::spawn(move || {
                let source = format!("document {i}");
                let artifact = pipeline.compile(&source, DeliveryMode::Content).unwrap();
                let bytes = artifact.read().unwrap();
                assert_eq!(bytes, source.as_bytes());
                artifact
            })
        })
        .collect();

    let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let mut names: Vec<_> = artifacts.iter().map(|a| a.file_name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 8);

    drop(artifacts);
    assert!(files_in(work_dir.path()).is_empty());
}

#[test]
fn test_workspace_source_is_executable() {
    let dir = tempfile::TempDir::new().unwrap();
    let workspace = Workspace::allocate(dir.path()).unwrap();

    let mode = fs::metadata(workspace.base()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert!(workspace.base().extension().is_none());

    workspace.remove_all();
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn test_compile_tex_returns_bytes() {
    let (work_dir, _sink, pipeline) = stub_pipeline();

    let bytes = compile_tex(pipeline.config().clone(), "hello").unwrap();

    assert_eq!(bytes, b"hello");
    assert!(files_in(work_dir.path()).is_empty());
}

#[test]
fn test_default_config_uses_pdflatex() {
    assert_eq!(PipelineConfig::default().compiler_program(), "pdflatex");
}
