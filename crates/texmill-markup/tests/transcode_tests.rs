//! Integration tests for HTML to LaTeX transcoding
//!
//! Exercises the public `transcode` entry point with realistic fragments.

use texmill_markup::{transcode, RuleTable, TranscodeRule, Transcoder};

#[test]
fn test_paragraph_with_inline_formatting() {
    let out = transcode("<p>Hello <b>bold</b> and <em>soft</em></p>", &[]);
    assert_eq!(out, r"Hello \textbf{bold} and \textit{soft} \newline ");
}

#[test]
fn test_unordered_list() {
    let out = transcode("<ul><li>one</li><li>two</li></ul>", &[]);
    assert_eq!(out, r"\begin{itemize}\item one\item two\end{itemize}");
}

#[test]
fn test_ordered_list_with_implied_item_ends() {
    let out = transcode("<ol><li>one<li>two</ol>", &[]);
    assert_eq!(out, r"\begin{enumerate}\item one\item two\end{enumerate}");
}

#[test]
fn test_line_break_and_scripts() {
    let out = transcode("E = mc<sup>2</sup><br>H<sub>2</sub>O", &[]);
    assert_eq!(
        out,
        r"E = mc\textsuperscript{2}\newline H\textsubscript{2}O"
    );
}

#[test]
fn test_image_inside_paragraph() {
    let out = transcode(r#"<p>See <img src="chart.png"></p>"#, &[]);
    assert_eq!(out, r"See \includegraphics[scale=1]{chart.png} \newline ");
}

#[test]
fn test_plain_text_with_markup_characters() {
    for text in ["a & b", "1 < 2", "3 > 2", "x & y < z > w", "\"it's\""] {
        assert_eq!(transcode(text, &[]), text, "round trip failed for {text:?}");
    }
}

#[test]
fn test_text_characters_inside_tags_are_preserved() {
    let out = transcode("<b>Fish & chips < 5</b>", &[]);
    assert_eq!(out, r"\textbf{Fish & chips < 5}");
}

#[test]
fn test_override_existing_tag() {
    let rule = TranscodeRule::text("b", r"{\bfseries $1}");
    assert_eq!(transcode("<b>x</b>", &[rule]), r"{\bfseries x}");
}

#[test]
fn test_override_new_tag_with_attribute() {
    let rule = TranscodeRule::attribute("a", "href", r"\href{$1}{link}");
    let out = transcode(r#"<p><a href="https://x.org">x</a></p>"#, &[rule]);
    assert_eq!(out, r"\href{https://x.org}{link} \newline ");
}

#[test]
fn test_override_position_in_table() {
    let transcoder = Transcoder::with_overrides([
        TranscodeRule::text("i", r"\emph{$1}"),
        TranscodeRule::text("code", r"\texttt{$1}"),
    ]);
    let defaults = RuleTable::defaults();

    assert_eq!(transcoder.rules().tags()[..20], defaults.tags()[..]);
    assert_eq!(transcoder.rules().tags()[20], "code");
    assert_eq!(transcoder.transcode("<i>x</i>"), r"\emph{x}");
}

#[test]
fn test_unknown_tags_are_stripped() {
    let out = transcode(r#"<div class="x"><span>plain</span></div>"#, &[]);
    assert_eq!(out, "plain");
}

#[test]
fn test_malformed_markup_does_not_panic() {
    let inputs = [
        "<b>unclosed",
        "</i>stray",
        "<p><b>overlap</p></b>",
        "<img src=unquoted.png>",
        "<<>>",
        "<b attr=\"unterminated>x</b>",
        "",
    ];
    for input in inputs {
        let _ = transcode(input, &[]);
    }
    assert_eq!(transcode("<b>unclosed", &[]), r"\textbf{unclosed}");
    assert_eq!(
        transcode("<img src=unquoted.png>", &[]),
        r"\includegraphics[scale=1]{unquoted.png}"
    );
}

#[test]
fn test_rule_output_is_not_reparsed() {
    let rule = TranscodeRule::text("kbd", "<b>$1</b>");
    assert_eq!(transcode("<kbd>k</kbd>", &[rule]), "<b>k</b>");
}

#[test]
fn test_html5_entities_in_text() {
    let out = transcode("<p>&alpha; &le; &beta;</p>", &[]);
    assert_eq!(out, "\u{3b1} \u{2264} \u{3b2} \\newline ");
}

#[test]
fn test_deeply_nested_markup() {
    let markup = "<span>".repeat(200_000) + "x";
    assert_eq!(transcode(&markup, &[]), "x");
}
