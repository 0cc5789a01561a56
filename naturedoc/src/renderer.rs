//! HTML renderer for document trees
//!
//! This module turns a [`Document`] into sanitized HTML:
//! - every node maps to exactly one element, children in order
//! - marks nest in a fixed order so output is byte-stable
//! - all text and attribute values are escaped, and URLs with unsafe schemes
//!   are neutralized
//! - optionally, the fragment is wrapped in a standalone page with CSS

use crate::document_model::{Alignment, Document, Image, Mark, Node, Text};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing rendered output
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// How image alignment is expressed in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// `class="align-left"`, styled by the site stylesheet
    #[default]
    Class,
    /// Inline `style` attribute, for output without a stylesheet
    Style,
}

/// Renderer settings, read from the `[render]` table of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// How image alignment is expressed
    pub alignment: AlignmentMode,

    /// Open absolute http(s) links in a new tab
    pub external_links_new_tab: bool,

    /// Wrap the fragment in a complete HTML page
    pub standalone: bool,

    /// Page title used in standalone mode
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            alignment: AlignmentMode::Class,
            external_links_new_tab: false,
            standalone: false,
            title: "Nature Magazine".to_string(),
        }
    }
}

/// Render a document to an HTML fragment with default options
pub fn render(doc: &Document) -> String {
    render_fragment(doc, &RenderOptions::default())
}

/// Render a document as a fragment or a page, as `options.standalone` says
pub fn render_with(doc: &Document, options: &RenderOptions) -> String {
    if options.standalone {
        render_page(doc, options)
    } else {
        render_fragment(doc, options)
    }
}

/// Render a document to an HTML fragment
pub fn render_fragment(doc: &Document, options: &RenderOptions) -> String {
    let mut writer = HtmlWriter::new(options);
    writer.write_node(doc.root(), Context::Block);
    writer.output
}

/// Render a document to a complete HTML page
pub fn render_page(doc: &Document, options: &RenderOptions) -> String {
    let mut output = String::new();

    write_html_header(&mut output, &options.title);
    output.push_str("<body>\n");
    output.push_str("<article class=\"container\">\n");
    output.push_str(&render_fragment(doc, options));
    output.push_str("</article>\n");
    output.push_str("</body>\n");
    output.push_str("</html>\n");

    output
}

/// Render a document and write it to a file
///
/// # Parameters
/// * `doc` - The document to render
/// * `options` - Renderer settings; `standalone` selects page or fragment
/// * `output_path` - Path where the HTML file will be written
///
/// # Returns
/// * `Ok(())` - Successfully written
/// * `Err(RenderError)` - Error creating directories or writing the file
pub fn write_html(
    doc: &Document,
    options: &RenderOptions,
    output_path: &Path,
) -> Result<(), RenderError> {
    let html = render_with(doc, options);

    // Write to file - create parent directories if they don't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(output_path)?;
    file.write_all(html.as_bytes())?;

    Ok(())
}

/// Whether a node is written as a block (own line) or inline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Block,
    Inline,
}

struct HtmlWriter<'a> {
    options: &'a RenderOptions,
    output: String,
}

impl<'a> HtmlWriter<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            output: String::new(),
        }
    }

    /// Write a node and its subtree, depth-first
    fn write_node(&mut self, node: &Node, context: Context) {
        match node {
            Node::Root { children } => self.write_children(children, Context::Block),

            Node::Paragraph { children } => {
                self.output.push_str("<p>");
                self.write_children(children, Context::Inline);
                self.output.push_str("</p>\n");
            }

            Node::Heading { level, children } => {
                self.output.push_str(&format!("<h{level}>"));
                self.write_children(children, Context::Inline);
                self.output.push_str(&format!("</h{level}>\n"));
            }

            Node::List { ordered, children } => {
                let tag = if *ordered { "ol" } else { "ul" };
                self.output.push_str(&format!("<{tag}>\n"));
                self.write_children(children, Context::Block);
                self.output.push_str(&format!("</{tag}>\n"));
            }

            Node::ListItem { children } => {
                self.output.push_str("<li>");
                for child in children {
                    let context = if child.kind().is_inline() {
                        Context::Inline
                    } else {
                        Context::Block
                    };
                    self.write_node(child, context);
                }
                self.output.push_str("</li>\n");
            }

            Node::Quote { children } => {
                self.output.push_str("<blockquote>\n");
                self.write_children(children, Context::Block);
                self.output.push_str("</blockquote>\n");
            }

            Node::Image(image) => self.write_image(image, context),

            Node::Link { url, children } => self.write_link(url, children),

            Node::Text(text) => self.output.push_str(&text_to_html(text)),
        }
    }

    fn write_children(&mut self, children: &[Node], context: Context) {
        for child in children {
            self.write_node(child, context);
        }
    }

    /// Write an image element; unsafe sources drop the image
    fn write_image(&mut self, image: &Image, context: Context) {
        let Some(src) = safe_image_src(&image.src) else {
            log::warn!("Dropping image with unsafe source: {}", image.src);
            return;
        };

        let align_attr = match self.options.alignment {
            AlignmentMode::Class => format!(" class=\"align-{}\"", image.alignment),
            AlignmentMode::Style => format!(" style=\"{}\"", alignment_style(image.alignment)),
        };

        self.output.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\"{}>",
            escape_html(src),
            escape_html(&image.alt_text),
            align_attr
        ));
        if context == Context::Block {
            self.output.push('\n');
        }
    }

    /// Write a link; unsafe targets are replaced with `#`
    fn write_link(&mut self, url: &str, children: &[Node]) {
        let href = safe_link_url(url).unwrap_or_else(|| {
            log::warn!("Neutralizing link with unsafe target: {}", url);
            "#"
        });

        let target = if self.options.external_links_new_tab && is_external(href) {
            " target=\"_blank\" rel=\"noopener noreferrer\""
        } else {
            ""
        };

        self.output
            .push_str(&format!("<a href=\"{}\"{}>", escape_html(href), target));
        self.write_children(children, Context::Inline);
        self.output.push_str("</a>");
    }
}

/// Convert a text run to HTML, wrapping marks innermost-first
fn text_to_html(text: &Text) -> String {
    let mut html = escape_html(&text.value).replace('\n', "<br>");

    for mark in text.marks.iter() {
        let tag = mark_tag(mark);
        html = format!("<{tag}>{html}</{tag}>");
    }

    html
}

/// Element used for a mark
fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Strikethrough => "del",
        Mark::Code => "code",
    }
}

/// Inline CSS for an image alignment
fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "float: left; margin: 0 1em 1em 0;",
        Alignment::Center => "display: block; margin: 0 auto;",
        Alignment::Right => "float: right; margin: 0 0 1em 1em;",
    }
}

/// URL scheme in lowercase, ignoring the whitespace and control characters
/// browsers skip when parsing (`java\tscript:`)
fn url_scheme(url: &str) -> Option<String> {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let end = cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#'))?;
    if !cleaned[end..].starts_with(':') {
        return None;
    }

    let scheme = &cleaned[..end];
    let valid = scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    // Malformed schemes come back empty so every allow-list rejects them
    Some(if valid {
        scheme.to_ascii_lowercase()
    } else {
        String::new()
    })
}

/// Link target if it is relative or uses an allowed scheme
fn safe_link_url(url: &str) -> Option<&str> {
    match url_scheme(url).as_deref() {
        None => Some(url),
        Some("http" | "https" | "mailto" | "tel") => Some(url),
        Some(_) => None,
    }
}

/// Image source if it is relative, http(s), or an inline image
fn safe_image_src(src: &str) -> Option<&str> {
    match url_scheme(src).as_deref() {
        None => Some(src),
        Some("http" | "https") => Some(src),
        Some("data") if src.trim_start().to_ascii_lowercase().starts_with("data:image/") => {
            Some(src)
        }
        Some(_) => None,
    }
}

/// Whether a link leaves the site
fn is_external(href: &str) -> bool {
    matches!(url_scheme(href).as_deref(), Some("http" | "https"))
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Write HTML header with CSS styling
fn write_html_header(output: &mut String, title: &str) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Article styles for standalone pages
const CSS_STYLES: &str = r#"
body {
    font-family: Georgia, 'Times New Roman', serif;
    line-height: 1.7;
    color: #2b2b2b;
    background-color: #f4f1ea;
    margin: 0;
    padding: 20px;
}

.container {
    max-width: 760px;
    margin: 0 auto;
    background: white;
    padding: 48px;
    border-radius: 4px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
}

h1, h2, h3, h4, h5, h6 {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif;
    color: #1f3a2b;
    margin: 1.4em 0 0.6em;
}

p {
    margin: 0 0 1em;
}

blockquote {
    border-left: 4px solid #4f7d5c;
    padding-left: 16px;
    margin: 16px 0;
    color: #555;
    font-style: italic;
}

ul, ol {
    margin: 0 0 1em;
    padding-left: 30px;
}

li {
    margin-bottom: 6px;
}

code {
    font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', 'Consolas', monospace;
    background-color: #f4f4f4;
    padding: 2px 6px;
    border-radius: 3px;
    font-size: 0.9em;
}

del {
    color: #888;
}

img {
    max-width: 100%;
    height: auto;
    border-radius: 4px;
}

img.align-left {
    float: left;
    margin: 0 1em 1em 0;
}

img.align-center {
    display: block;
    margin: 0 auto 1em;
}

img.align-right {
    float: right;
    margin: 0 0 1em 1em;
}

a {
    color: #2e6b45;
}

@media screen and (max-width: 768px) {
    .container {
        padding: 24px 16px;
    }

    img.align-left,
    img.align-right {
        float: none;
        display: block;
        margin: 0 auto 1em;
    }
}
"#;
