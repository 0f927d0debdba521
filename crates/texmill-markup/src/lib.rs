//! texmill-markup - HTML to LaTeX transcoding
//!
//! Converts a fixed, overridable vocabulary of HTML tags into LaTeX
//! commands. The conversion is pure: no I/O, and it never fails. Malformed
//! markup is handled best-effort by a lenient parser.
//!
//! # Example
//!
//! ```
//! use texmill_markup::{transcode, TranscodeRule};
//!
//! let latex = transcode("<h1>Intro</h1><p>Some <b>bold</b> text</p>", &[]);
//! assert_eq!(latex, r"\section{Intro}Some \textbf{bold} text \newline ");
//!
//! let link = TranscodeRule::attribute("a", "href", r"\url{$1}");
//! assert_eq!(
//!     transcode(r#"<a href="https://example.com">site</a>"#, &[link]),
//!     r"\url{https://example.com}"
//! );
//! ```

pub mod entities;
pub mod rules;
pub mod transcoder;
pub mod tree;

pub use rules::{Extract, RuleTable, TranscodeRule, PLACEHOLDER};
pub use transcoder::{transcode, Transcoder};
pub use tree::{MarkupNode, MarkupTree, NodeId, NodeKind};
