//! Document layout boundary for report output.
//!
//! The assembler builds a [`Document`] and hands it to a [`DocumentEngine`].
//! The default engine emits a single self-contained HTML file with every
//! image inlined, so a report can be mailed or archived as one artifact.

use crate::types::GeoResult;
use base64::Engine as _;
use std::fs;
use std::path::Path;

/// A laid-out report, independent of the output format
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub title: String,
    /// Label/value pairs rendered under the title
    pub meta: Vec<(String, String)>,
    pub sections: Vec<Section>,
    /// Closing lines rendered in a muted style
    pub footer: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub body: String,
    pub image: Option<ImageBlock>,
}

/// An image embedded directly into the document
#[derive(Debug, Clone)]
pub struct ImageBlock {
    /// Encoded PNG bytes
    pub png: Vec<u8>,
    /// Display width in pixels
    pub width_px: u32,
}

/// Seam to the layout engine that turns a [`Document`] into a file.
pub trait DocumentEngine {
    /// Write the document to `path`.
    fn render(&self, document: &Document, path: &Path) -> GeoResult<()>;

    /// File extension the engine emits, without the dot.
    fn extension(&self) -> &'static str;
}

/// Self-contained HTML layout engine
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentEngine;

impl DocumentEngine for HtmlDocumentEngine {
    fn render(&self, document: &Document, path: &Path) -> GeoResult<()> {
        fs::write(path, render_html(document))?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

fn render_html(document: &Document) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&document.title)));
    html.push_str("<style>\n");
    html.push_str("body { font-family: Helvetica, Arial, sans-serif; max-width: 720px; margin: 2em auto; color: #222; }\n");
    html.push_str("h1 { text-align: center; }\n");
    html.push_str("h2 { margin-top: 2em; }\n");
    html.push_str("img { display: block; margin: 1em auto; }\n");
    html.push_str(".meta b { margin-right: 0.3em; }\n");
    html.push_str(".footer { margin-top: 3em; font-size: 0.8em; font-style: italic; color: #666; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape(&document.title)));

    for (label, value) in &document.meta {
        html.push_str(&format!(
            "<p class=\"meta\"><b>{}:</b> {}</p>\n",
            escape(label),
            escape(value)
        ));
    }

    for section in &document.sections {
        html.push_str(&format!("<h2>{}</h2>\n", escape(&section.heading)));
        if !section.body.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape(&section.body)));
        }
        if let Some(image) = &section.image {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&image.png);
            html.push_str(&format!(
                "<img src=\"data:image/png;base64,{}\" width=\"{}\" alt=\"{}\">\n",
                encoded,
                image.width_px,
                escape(&section.heading)
            ));
        }
    }

    if !document.footer.is_empty() {
        html.push_str("<div class=\"footer\">\n");
        for line in &document.footer {
            html.push_str(&format!("<p>{}</p>\n", escape(line)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
