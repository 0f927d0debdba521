//! HTML to LaTeX transcoder
//!
//! Rewrites a restricted tag vocabulary into LaTeX commands:
//!
//! 1. Entity-encode text outside tags, leaving tag tokens untouched
//! 2. Parse the result leniently into a [`MarkupTree`]
//! 3. Snapshot every element, then rewrite matches last-to-first
//! 4. Serialize, strip leftover tags and decode entities

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::entities;
use crate::rules::{Extract, RuleTable, TranscodeRule};
use crate::tree::{MarkupTree, NodeId};

/// Tag-like tokens: opening or closing tags with optional attributes
fn tag_boundary() -> &'static Regex {
    static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
    BOUNDARY_RE.get_or_init(|| Regex::new(r"(?i)</?[a-z]+[^>]*>").unwrap())
}

fn any_tag() -> &'static Regex {
    static STRIP_RE: OnceLock<Regex> = OnceLock::new();
    STRIP_RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

/// Transcoder holding a rule table
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    rules: RuleTable,
}

impl Transcoder {
    /// Create a transcoder from an explicit rule table
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// Default rules with `overrides` applied on top
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = TranscodeRule>,
    {
        Self::new(RuleTable::defaults().with_overrides(overrides))
    }

    /// The active rule table
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Convert an HTML fragment to LaTeX
    pub fn transcode(&self, markup: &str) -> String {
        let escaped = escape_outside_tags(markup);
        let mut tree = MarkupTree::parse(&escaped);

        // Replacing a node only touches ids after it in this list, which
        // have already been visited.
        let snapshot = tree.elements();
        let mut replaced = 0usize;
        for id in snapshot.into_iter().rev() {
            let Some(tag) = tree.node(id).tag_name() else {
                continue;
            };
            let Some(rule) = self.rules.find(tag) else {
                continue;
            };
            let value = extract_value(&tree, id, &rule.extract);
            let latex = rule.render(&value);
            let container = tree.create_element("div", Vec::new());
            let text = tree.create_text(&latex);
            tree.append_child(container, text);
            tree.replace(id, container);
            replaced += 1;
        }

        debug!(
            op = "transcode",
            rules = self.rules.len(),
            replaced,
            input_bytes = markup.len(),
            "Transcoded markup"
        );

        let serialized = tree.to_markup();
        entities::decode(&any_tag().replace_all(&serialized, ""))
    }
}

fn extract_value(tree: &MarkupTree, id: NodeId, extract: &Extract) -> String {
    match extract {
        Extract::Text => tree.text_content(id),
        Extract::Attribute(name) => tree
            .node(id)
            .attribute(name)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Entity-encode every segment between tag tokens; tag tokens pass through.
pub fn escape_outside_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    for tag in tag_boundary().find_iter(markup) {
        out.push_str(&entities::encode_text(&markup[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&entities::encode_text(&markup[last..]));
    out
}

/// Convert an HTML fragment to LaTeX using the default rules plus
/// `overrides`.
///
/// # Example
///
/// ```
/// use texmill_markup::{transcode, TranscodeRule};
///
/// assert_eq!(transcode("<b>x</b>", &[]), r"\textbf{x}");
///
/// let code = TranscodeRule::text("code", r"\texttt{$1}");
/// assert_eq!(transcode("<code>ls</code>", &[code]), r"\texttt{ls}");
/// ```
pub fn transcode(markup: &str, overrides: &[TranscodeRule]) -> String {
    Transcoder::with_overrides(overrides.iter().cloned()).transcode(markup)
}
