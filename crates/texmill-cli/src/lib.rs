//! texmill CLI - Command-line interface library
//!
//! This library provides the CLI functionality for texmill:
//! - Convert: HTML fragment to LaTeX
//! - Compile: LaTeX (or HTML) to PDF
//! - Content: PDF bytes or base64 on stdout
//! - Bundle: several documents into one zip
//! - Dry run: check the LaTeX installation
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert HTML to LaTeX
//! texmill convert fragment.html --output fragment.tex
//!
//! # Compile with a specific compiler
//! texmill --compiler xelatex compile report.tex --output report.pdf
//!
//! # Base64 content for embedding
//! texmill content report.tex --type base64
//! ```

pub mod app;
pub mod config;

pub use app::{
    build_service, bundle_command, compile_command, content_command, convert_command,
    dry_run_command, run_cli, ContentFormat,
};
pub use config::{MarkupSettings, Settings, DEFAULT_CONFIG_FILE};
