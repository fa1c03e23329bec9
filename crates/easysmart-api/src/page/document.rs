// Script locator for the switch's hand-written pages.
//
// The pages are too loose for a tree builder to be trusted: some firmwares
// emit the data script ahead of `<html>`, and an HTML5 parser would hoist
// it into `<head>`. This only records where each `<script>` element sits
// relative to `<head>` and `<body>` in the raw text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("script pattern is valid")
});
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head\b[^>]*>").expect("head pattern is valid"));
static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head close pattern is valid"));
static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<body\b[^>]*>").expect("body pattern is valid"));

#[derive(Debug, Clone)]
struct ScriptNode {
    /// Offset of the opening `<script` tag.
    start: usize,
    /// Byte range of the script's inner text.
    content: Range<usize>,
}

/// A fetched page with its script elements located.
///
/// Line endings are normalized to `\n` so the line-anchored variable
/// patterns behave the same on every firmware.
#[derive(Debug)]
pub(crate) struct Document {
    text: String,
    scripts: Vec<ScriptNode>,
    head: Option<Range<usize>>,
    body_start: Option<usize>,
}

impl Document {
    pub(crate) fn parse(raw: &str) -> Self {
        let text = raw.replace("\r\n", "\n");

        let scripts = SCRIPT_RE
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let content = caps.get(1)?;
                Some(ScriptNode {
                    start: whole.start(),
                    content: content.range(),
                })
            })
            .collect();

        let head = HEAD_OPEN_RE.find(&text).map(|open| {
            let end = HEAD_CLOSE_RE
                .find_at(&text, open.end())
                .map_or(text.len(), |close| close.start());
            open.end()..end
        });
        let body_start = BODY_OPEN_RE.find(&text).map(|m| m.end());

        Self {
            text,
            scripts,
            head,
            body_start,
        }
    }

    fn content(&self, node: &ScriptNode) -> &str {
        &self.text[node.content.clone()]
    }

    fn in_head(&self, node: &ScriptNode) -> bool {
        self.head
            .as_ref()
            .is_some_and(|head| head.contains(&node.start))
    }

    fn in_body(&self, node: &ScriptNode) -> bool {
        match self.body_start {
            Some(start) => node.start >= start,
            None => !self.in_head(node),
        }
    }

    /// Inner text of the first script in document order.
    pub(crate) fn first_script(&self) -> Option<&str> {
        self.scripts.first().map(|node| self.content(node))
    }

    /// Whether the first script of the document is also the first script
    /// of `<head>`. Pages without any script answer `false`.
    pub(crate) fn first_script_in_head(&self) -> bool {
        self.scripts.first().is_some_and(|node| self.in_head(node))
    }

    /// Inner text of every script inside `<head>`, in document order.
    pub(crate) fn head_scripts(&self) -> impl Iterator<Item = &str> {
        self.scripts
            .iter()
            .filter(|node| self.in_head(node))
            .map(|node| self.content(node))
    }

    /// Inner text of the first script inside `<body>`.
    pub(crate) fn first_body_script(&self) -> Option<&str> {
        self.scripts
            .iter()
            .find(|node| self.in_body(node))
            .map(|node| self.content(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_head_and_body_scripts() {
        let doc = Document::parse(
            "<html><head><script>var a = 1;</script></head>\
             <body><script>var b = 2;</script></body></html>",
        );
        assert!(doc.first_script_in_head());
        assert_eq!(doc.head_scripts().collect::<Vec<_>>(), vec!["var a = 1;"]);
        assert_eq!(doc.first_body_script(), Some("var b = 2;"));
    }

    #[test]
    fn script_before_html_is_not_in_head() {
        let doc = Document::parse(
            "<script>\nvar max_port_num = 8;\n</script>\n\
             <html><head><title>x</title></head><body></body></html>",
        );
        assert!(!doc.first_script_in_head());
        assert_eq!(doc.first_script(), Some("\nvar max_port_num = 8;\n"));
    }

    #[test]
    fn header_element_is_not_head() {
        let doc = Document::parse("<header><script>1</script></header>");
        assert!(!doc.first_script_in_head());
        assert_eq!(doc.first_body_script(), Some("1"));
    }

    #[test]
    fn normalizes_crlf() {
        let doc = Document::parse("<script>\r\nvar x = 1;\r\n</script>");
        assert_eq!(doc.first_script(), Some("\nvar x = 1;\n"));
    }

    #[test]
    fn empty_page_has_no_scripts() {
        let doc = Document::parse("");
        assert!(doc.first_script().is_none());
        assert!(!doc.first_script_in_head());
        assert!(doc.first_body_script().is_none());
    }
}
