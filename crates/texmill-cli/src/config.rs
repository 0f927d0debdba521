//! Configuration file (`texmill.toml`)
//!
//! ```toml
//! [pipeline]
//! compiler = "pdflatex"
//! work_dir = "/tmp/texmill"
//! keep_failed_workspace = false
//!
//! [[markup.rules]]
//! tag = "a"
//! extract = { attribute = "href" }
//! template = "\\url{$1}"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use texmill_markup::{TranscodeRule, Transcoder};
use texmill_pdf::PipelineConfig;

/// File looked up in the current directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "texmill.toml";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Compilation pipeline settings
    pub pipeline: PipelineConfig,
    /// Transcoder settings
    pub markup: MarkupSettings,
}

/// Transcoder configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MarkupSettings {
    /// Rule overrides applied on top of the defaults, in order
    pub rules: Vec<TranscodeRule>,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from `texmill.toml` in the current
    /// directory when it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        tracing::debug!(config = %path.display(), rules = settings.markup.rules.len(), "Loaded settings");
        Ok(settings)
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, compiler: Option<String>, work_dir: Option<PathBuf>) -> Self {
        if let Some(compiler) = compiler {
            self.pipeline.compiler = compiler;
        }
        if let Some(work_dir) = work_dir {
            self.pipeline.work_dir = work_dir;
        }
        self
    }

    /// Transcoder with the configured overrides
    pub fn transcoder(&self) -> Transcoder {
        Transcoder::with_overrides(self.markup.rules.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmill_markup::Extract;

    #[test]
    fn test_empty_config_is_default() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pipeline.compiler, "pdflatex");
        assert!(settings.markup.rules.is_empty());
    }

    #[test]
    fn test_full_config() {
        let settings = Settings::from_toml_str(
            r#"
[pipeline]
compiler = "xelatex"
work_dir = "/var/tmp/texmill"
keep_failed_workspace = true

[[markup.rules]]
tag = "code"
extract = "text"
template = "\\texttt{$1}"

[[markup.rules]]
tag = "a"
extract = { attribute = "href" }
template = "\\url{$1}"
"#,
        )
        .unwrap();

        assert_eq!(settings.pipeline.compiler, "xelatex");
        assert_eq!(settings.pipeline.work_dir, PathBuf::from("/var/tmp/texmill"));
        assert!(settings.pipeline.keep_failed_workspace);
        assert_eq!(settings.markup.rules.len(), 2);
        assert_eq!(
            settings.markup.rules[1].extract,
            Extract::Attribute("href".to_string())
        );
    }

    #[test]
    fn test_transcoder_uses_rules() {
        let settings = Settings::from_toml_str(
            r#"
[[markup.rules]]
tag = "code"
extract = "text"
template = "\\texttt{$1}"
"#,
        )
        .unwrap();

        let transcoder = settings.transcoder();
        assert_eq!(transcoder.transcode("<code>x</code>"), r"\texttt{x}");
        assert_eq!(transcoder.transcode("<b>y</b>"), r"\textbf{y}");
    }

    #[test]
    fn test_cli_overrides_win() {
        let settings = Settings::default()
            .with_overrides(Some("lualatex".to_string()), Some(PathBuf::from("/w")));
        assert_eq!(settings.pipeline.compiler, "lualatex");
        assert_eq!(settings.pipeline.work_dir, PathBuf::from("/w"));

        let untouched = Settings::default().with_overrides(None, None);
        assert_eq!(untouched, Settings::default());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/texmill.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml_str("[pipeline\ncompiler = ").is_err());
    }
}
