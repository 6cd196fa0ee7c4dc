//! HTML-to-text conversion for character descriptions
//!
//! Catalog descriptions are constrained HTML fragments (divs, line breaks,
//! anchors). The host form's summary field is plain text, so div boundaries
//! become paragraph breaks, `<br>` becomes a newline, anchors keep their
//! inner text, and everything else is stripped.

use regex::Regex;

/// Converter with pre-compiled patterns
pub struct HtmlToText {
    div_re: Regex,
    br_re: Regex,
    anchor_re: Regex,
    tag_re: Regex,
}

impl HtmlToText {
    pub fn new() -> Self {
        Self {
            div_re: Regex::new(r"(?i)</?div\b[^>]*>").unwrap(),
            br_re: Regex::new(r"(?i)<br\s*/?>").unwrap(),
            anchor_re: Regex::new(r"(?is)<a[^>]*>(.*?)</a>").unwrap(),
            tag_re: Regex::new(r"<[^>]+>").unwrap(),
        }
    }

    /// Convert an HTML fragment to clean multi-line plain text.
    ///
    /// Paragraphs (div boundaries) are separated by exactly one blank line,
    /// every line is trimmed, and other blank lines are dropped. Running the
    /// output through the converter again returns it unchanged, unless a
    /// decoded entity formed tag-like text (`&lt;C&gt;` becomes `<C>`, which
    /// a second pass strips as markup).
    pub fn convert(&self, html: &str) -> String {
        let text = self.div_re.replace_all(html, "\n\n");
        let text = self.anchor_re.replace_all(&text, "$1");
        let text = self.br_re.replace_all(&text, "\n");
        let text = self.tag_re.replace_all(&text, "");
        let text = decode_entities(&text);
        collapse_lines(&text)
    }
}

impl Default for HtmlToText {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot conversion with default patterns
pub fn html_to_text(html: &str) -> String {
    HtmlToText::new().convert(html)
}

/// Decode the handful of entities that show up in catalog descriptions
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Trim each line, keep a single blank line between paragraphs, and drop
/// leading/trailing blanks. Runs of 3+ newlines therefore collapse to 2.
fn collapse_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut pending_break = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !out.is_empty() {
                pending_break = true;
            }
        } else {
            if pending_break {
                out.push("");
                pending_break = false;
            }
            out.push(line);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_boundaries_become_paragraphs() {
        assert_eq!(html_to_text("<div>A</div><div>B</div>"), "A\n\nB");
    }

    #[test]
    fn test_br_becomes_newline() {
        assert_eq!(html_to_text("line one<br/>line two"), "line one\nline two");
        assert_eq!(html_to_text("line one<br>line two"), "line one\nline two");
    }

    #[test]
    fn test_anchor_keeps_inner_text() {
        assert_eq!(
            html_to_text(r#"see <a href="http://example.com">this page</a> for more"#),
            "see this page for more"
        );
    }

    #[test]
    fn test_unknown_tags_stripped() {
        assert_eq!(html_to_text("<span>hello</span> <b>world</b>"), "hello world");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(html_to_text("A &amp; B &lt;C&gt;"), "A & B <C>");
    }

    #[test]
    fn test_long_newline_runs_collapse_to_two() {
        assert_eq!(html_to_text("A\n\n\n\n\nB"), "A\n\nB");
    }

    #[test]
    fn test_lines_trimmed_and_blank_edges_dropped() {
        assert_eq!(html_to_text("<div>  A  </div>\n\n"), "A");
    }

    #[test]
    fn test_idempotent() {
        let input = "<div>First paragraph<br/>second line</div><div>Second &amp; last</div>";
        let once = html_to_text(input);
        let twice = html_to_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_full_description() {
        let html = concat!(
            "<div>Hero of the eastern valley.<br/>",
            r#"Appears in <a href="http://w.example.jp/pages/12.html">chapter 3</a>.</div>"#,
            "<div></div>",
            "<div>Wields a wooden sword.</div>"
        );
        insta::assert_snapshot!(html_to_text(html), @r###"
        Hero of the eastern valley.
        Appears in chapter 3.

        Wields a wooden sword.
        "###);
    }
}
