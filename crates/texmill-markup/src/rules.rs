//! Tag to LaTeX rewrite rules
//!
//! A [`RuleTable`] is an ordered list of [`TranscodeRule`]s with unique
//! tags. Overrides replace a rule in place or append a new one.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the extracted value
pub const PLACEHOLDER: &str = "$1";

/// What a rule extracts from a matched element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extract {
    /// The element's text content, descendants included
    Text,
    /// The value of the named attribute (empty when absent)
    Attribute(String),
}

/// A single tag rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeRule {
    /// Lower-case tag name the rule matches
    pub tag: String,
    /// Value to extract from the element
    pub extract: Extract,
    /// LaTeX template containing [`PLACEHOLDER`]
    pub template: String,
}

impl TranscodeRule {
    /// Rule extracting the element's text content
    pub fn text(tag: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            extract: Extract::Text,
            template: template.into(),
        }
    }

    /// Rule extracting an attribute value
    pub fn attribute(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            extract: Extract::Attribute(attribute.into()),
            template: template.into(),
        }
    }

    /// Substitute `value` for every placeholder in the template
    pub fn render(&self, value: &str) -> String {
        self.template.replace(PLACEHOLDER, value)
    }
}

/// Ordered rule table keyed by tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<TranscodeRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl RuleTable {
    /// The built-in HTML vocabulary
    pub fn defaults() -> Self {
        let rules = vec![
            TranscodeRule::text("p", r"$1 \newline "),
            TranscodeRule::text("b", r"\textbf{$1}"),
            TranscodeRule::text("strong", r"\textbf{$1}"),
            TranscodeRule::text("i", r"\textit{$1}"),
            TranscodeRule::text("em", r"\textit{$1}"),
            TranscodeRule::text("u", r"\underline{$1}"),
            TranscodeRule::text("ins", r"\underline{$1}"),
            TranscodeRule::text("br", r"\newline "),
            TranscodeRule::text("sup", r"\textsuperscript{$1}"),
            TranscodeRule::text("sub", r"\textsubscript{$1}"),
            TranscodeRule::text("h1", r"\section{$1}"),
            TranscodeRule::text("h2", r"\subsection{$1}"),
            TranscodeRule::text("h3", r"\subsubsection{$1}"),
            TranscodeRule::text("h4", r"\paragraph{$1} \mbox{} \\"),
            TranscodeRule::text("h5", r"\subparagraph{$1} \mbox{} \\"),
            TranscodeRule::text("h6", r"\subparagraph{$1} \mbox{} \\"),
            TranscodeRule::text("li", r"\item $1"),
            TranscodeRule::text("ul", r"\begin{itemize}$1\end{itemize}"),
            TranscodeRule::text("ol", r"\begin{enumerate}$1\end{enumerate}"),
            TranscodeRule::attribute("img", "src", r"\includegraphics[scale=1]{$1}"),
        ];
        Self { rules }
    }

    /// Apply one override: replace the rule with the same tag in place,
    /// or append when the tag is new.
    pub fn apply_override(&mut self, rule: TranscodeRule) {
        match self.rules.iter().position(|r| r.tag == rule.tag) {
            Some(index) => self.rules[index] = rule,
            None => self.rules.push(rule),
        }
    }

    /// Apply overrides in order
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = TranscodeRule>,
    {
        for rule in overrides {
            self.apply_override(rule);
        }
        self
    }

    /// First rule matching `tag`
    pub fn find(&self, tag: &str) -> Option<&TranscodeRule> {
        self.rules.iter().find(|r| r.tag == tag)
    }

    /// Rules in table order
    pub fn rules(&self) -> &[TranscodeRule] {
        &self.rules
    }

    /// Tags in table order
    pub fn tags(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.tag.as_str()).collect()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let table = RuleTable::defaults();
        assert_eq!(
            table.tags(),
            vec![
                "p", "b", "strong", "i", "em", "u", "ins", "br", "sup", "sub", "h1", "h2", "h3",
                "h4", "h5", "h6", "li", "ul", "ol", "img"
            ]
        );
    }

    #[test]
    fn test_img_extracts_src() {
        let table = RuleTable::defaults();
        let img = table.find("img").unwrap();
        assert_eq!(img.extract, Extract::Attribute("src".to_string()));
    }

    #[test]
    fn test_override_keeps_position() {
        let mut table = RuleTable::defaults();
        let before = table.tags().iter().position(|t| *t == "b").unwrap();

        table.apply_override(TranscodeRule::text("b", r"\bfseries{$1}"));

        let tags = table.tags();
        assert_eq!(tags.iter().position(|t| *t == "b"), Some(before));
        assert_eq!(table.len(), 20);
        assert_eq!(table.find("b").unwrap().template, r"\bfseries{$1}");
    }

    #[test]
    fn test_override_appends_new_tag() {
        let table =
            RuleTable::defaults().with_overrides([TranscodeRule::text("code", r"\texttt{$1}")]);
        assert_eq!(table.len(), 21);
        assert_eq!(table.tags().last(), Some(&"code"));
    }

    #[test]
    fn test_override_can_change_extract() {
        let table = RuleTable::defaults().with_overrides([TranscodeRule::attribute(
            "p",
            "class",
            "[$1]",
        )]);
        assert_eq!(table.tags()[0], "p");
        assert_eq!(
            table.find("p").unwrap().extract,
            Extract::Attribute("class".to_string())
        );
    }

    #[test]
    fn test_empty_overrides_are_noop() {
        let table = RuleTable::defaults().with_overrides(Vec::new());
        assert_eq!(table, RuleTable::defaults());
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let rule = TranscodeRule::text("x", "$1-$1");
        assert_eq!(rule.render("a"), "a-a");
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            rules: Vec<TranscodeRule>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
[[rules]]
tag = "code"
extract = "text"
template = '\texttt{$1}'

[[rules]]
tag = "a"
extract = { attribute = "href" }
template = '\url{$1}'
"#,
        )
        .unwrap();

        assert_eq!(parsed.rules[0], TranscodeRule::text("code", r"\texttt{$1}"));
        assert_eq!(parsed.rules[1], TranscodeRule::attribute("a", "href", r"\url{$1}"));
    }
}
