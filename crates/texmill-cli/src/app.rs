//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use texmill_pdf::{
    CompilationPipeline, ContentOutcome, PdfBundle, PdfContent, PdfService, TexDocument,
    TracingSink,
};

use crate::config::Settings;

/// Representation of `content` output
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ContentFormat {
    /// PDF bytes
    #[default]
    Raw,
    /// Base64 in 76-character CRLF lines
    Base64,
}

impl ContentFormat {
    fn as_str(self) -> &'static str {
        match self {
            ContentFormat::Raw => "raw",
            ContentFormat::Base64 => "base64",
        }
    }
}

#[derive(Parser)]
#[command(name = "texmill")]
#[command(author, version, about = "HTML to LaTeX to PDF", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./texmill.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// LaTeX compiler binary
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Directory for temporary compilation files
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an HTML fragment to LaTeX
    Convert {
        /// Input HTML file
        input: PathBuf,

        /// Output LaTeX file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a LaTeX file (or HTML with --html) to PDF
    Compile {
        /// Input file
        input: PathBuf,

        /// Output PDF file (defaults to input with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transcode the input from HTML before compiling
        #[arg(long)]
        html: bool,
    },

    /// Compile a LaTeX file and write its PDF content
    Content {
        /// Input LaTeX file
        input: PathBuf,

        /// Content representation
        #[arg(short = 't', long = "type", value_enum, default_value = "raw")]
        kind: ContentFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile several LaTeX files into one zip archive
    Bundle {
        /// Input LaTeX files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output zip file
        #[arg(short, long, default_value = "bundle.zip")]
        output: PathBuf,
    },

    /// Compile a built-in test document to check the LaTeX installation
    DryRun {
        /// Output PDF file
        #[arg(short, long, default_value = "dryrun.pdf")]
        output: PathBuf,
    },
}

/// Run the CLI application
///
/// Parses arguments, loads settings and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let settings =
        Settings::load(cli.config.as_deref())?.with_overrides(cli.compiler, cli.work_dir);

    match cli.command {
        Commands::Convert { input, output } => {
            convert_command(&settings, &input, output.as_deref())?;
        }
        Commands::Compile {
            input,
            output,
            html,
        } => {
            compile_command(&settings, &input, output.as_deref(), html)?;
        }
        Commands::Content {
            input,
            kind,
            output,
        } => {
            content_command(&settings, &input, kind, output.as_deref())?;
        }
        Commands::Bundle { inputs, output } => {
            bundle_command(&settings, &inputs, &output)?;
        }
        Commands::DryRun { output } => {
            dry_run_command(&settings, &output)?;
        }
    }

    Ok(())
}

/// PDF service built from settings, reporting events through tracing
pub fn build_service(settings: &Settings) -> PdfService {
    let pipeline =
        CompilationPipeline::new(settings.pipeline.clone()).with_events(Arc::new(TracingSink));
    PdfService::new(pipeline)
}

fn read_input(input: &Path) -> Result<String> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read input file: {}", input.display()))
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => fs::write(path, bytes)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")
        }
    }
}

/// Execute the convert command
pub fn convert_command(settings: &Settings, input: &Path, output: Option<&Path>) -> Result<()> {
    let markup = read_input(input)?;
    let latex = settings.transcoder().transcode(&markup);
    write_output(output, latex.as_bytes())?;

    if let Some(path) = output {
        info!(input = %input.display(), output = %path.display(), "Converted");
    }
    Ok(())
}

/// Execute the compile command
pub fn compile_command(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    html: bool,
) -> Result<PathBuf> {
    let source = read_input(input)?;
    let source = if html {
        settings.transcoder().transcode(&source)
    } else {
        source
    };

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("pdf"),
    };

    let service = build_service(settings);
    let mut document = TexDocument::raw(source);
    let saved = service
        .save_pdf(&mut document, &output_path)
        .with_context(|| format!("Failed to compile {}", input.display()))?;

    println!("Created: {}", saved.display());
    Ok(saved)
}

/// Execute the content command
pub fn content_command(
    settings: &Settings,
    input: &Path,
    kind: ContentFormat,
    output: Option<&Path>,
) -> Result<()> {
    let source = read_input(input)?;
    let service = build_service(settings);
    let mut document = TexDocument::raw(source);

    let outcome = service
        .content(&mut document, kind.as_str())
        .with_context(|| format!("Failed to compile {}", input.display()))?;

    match outcome {
        ContentOutcome::Content(PdfContent::Raw(bytes)) => write_output(output, &bytes),
        ContentOutcome::Content(PdfContent::Base64(encoded)) => {
            write_output(output, encoded.as_bytes())
        }
        ContentOutcome::Rejected { status, message } => {
            anyhow::bail!("{} ({})", message, status)
        }
    }
}

/// Execute the bundle command
///
/// Each entry is named after its input file with a `.pdf` extension.
pub fn bundle_command(settings: &Settings, inputs: &[PathBuf], output: &Path) -> Result<PathBuf> {
    let mut bundle = PdfBundle::new();
    for input in inputs {
        let source = read_input(input)?;
        let name = input.with_extension("pdf");
        bundle.push(TexDocument::raw(source).with_name(&name.to_string_lossy()));
    }

    let service = build_service(settings);
    let saved = bundle
        .save_zip(&service, output)
        .with_context(|| format!("Failed to write bundle: {}", output.display()))?;

    println!("Created: {} ({} documents)", saved.display(), bundle.len());
    Ok(saved)
}

/// Execute the dry-run command
pub fn dry_run_command(settings: &Settings, output: &Path) -> Result<PathBuf> {
    let service = build_service(settings);
    let response = service
        .dry_run()
        .context("Dry run failed, check your LaTeX installation")?;

    let saved = response
        .artifact
        .persist(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Dry run succeeded: {} ({})", saved.display(), response.file_name);
    Ok(saved)
}
