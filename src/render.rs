//! Renderer: wraps a content fragment in the outer mail template and
//! derives the plaintext rendition.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

/// Elements that start a new line in the plaintext rendition.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["head", "noscript", "script", "style", "template", "title"];

/// `<title>` of the rendered page.
const PAGE_TITLE: &str = "UX Daily";

/// Class of the inbox-preview span, hidden from the rendered page.
const PREHEADER_CLASS: &str = "preheader";

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank-run pattern is valid"));

/// Result of rendering a digest body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub plain_text: String,
}

/// Renders the fixed outer page.
#[derive(Debug, Clone)]
pub struct Renderer {
    title: String,
}

impl Renderer {
    /// Wrap `html_inner` in the page and derive its plaintext.
    ///
    /// The fragment is embedded as-is; the preheader is escaped.
    pub fn render(&self, html_inner: &str, preheader: &str, date_human: &str) -> Rendered {
        let html = self.page(html_inner, preheader, date_human);
        let plain_text = to_plaintext(&html);
        Rendered { html, plain_text }
    }

    fn page(&self, html_inner: &str, preheader: &str, date_human: &str) -> String {
        let title = escape_html(&self.title);
        let preheader = escape_html(preheader);
        let date_human = escape_html(date_human);
        format!(
            r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width">
<title>{title}</title>
<style>
  body {{ margin:0; padding:0; background:#f6f6f8; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; }}
  .wrap {{ max-width:600px; margin:0 auto; background:#ffffff; }}
  .preheader {{ display:none !important; visibility:hidden; opacity:0; height:0; width:0; }}
  .inner {{ padding:24px; }}
  h1 {{ font-size:22px; margin:0 0 12px; }}
  h2 {{ font-size:18px; margin:24px 0 8px; }}
  p, li {{ font-size:15px; line-height:1.5; color:#222; }}
  a {{ color:#0b5ad9; text-decoration:none; }}
  .footer {{ color:#666; font-size:12px; padding:16px 24px 24px; }}
</style>
</head>
<body>
  <span class="{PREHEADER_CLASS}">{preheader}</span>
  <div class="wrap">
    <div class="inner">
      {html_inner}
    </div>
    <div class="footer">
      Odesláno automaticky • {date_human} • Pokud nechceš dostávat tento e-mail, odpověz „STOP“.
    </div>
  </div>
</body>
</html>"#
        )
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            title: PAGE_TITLE.to_string(),
        }
    }
}

// ── Plaintext derivation ────────────────────────────────────────────

/// Extract the visible text of an HTML document.
///
/// Inline text stays on one line, block elements break lines, whitespace
/// inside a line is collapsed, every line is trimmed and blank runs are
/// capped at one empty line. Applying it to its own output is a no-op.
pub fn to_plaintext(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_visible_text(document.root_element(), &mut raw);

    let lines: Vec<String> = raw
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    collapse_blank_lines(&lines.join("\n")).trim().to_string()
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                if HIDDEN_ELEMENTS.contains(&el.name())
                    || el.classes().any(|c| c == PREHEADER_CLASS)
                {
                    continue;
                }
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    end_line(out);
                }
                collect_visible_text(child_ref, out);
                if block {
                    end_line(out);
                }
            }
            _ => {}
        }
    }
}

/// Break the line unless the current one holds only whitespace, so adjacent
/// blocks are joined by a single newline.
fn end_line(out: &mut String) {
    let current = match out.rfind('\n') {
        Some(idx) => &out[idx + 1..],
        None => out.as_str(),
    };
    if !current.trim().is_empty() {
        out.push('\n');
    }
}

/// Replace every run of three or more newlines with exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

// ── Helpers (public for testing) ────────────────────────────────────

/// Strip markup from a fragment, keeping its text with normalized whitespace.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
