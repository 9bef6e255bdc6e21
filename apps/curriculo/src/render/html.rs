//! Markdown → HTML, and the print-ready HTML page handed to PDF backends.

use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

/// Paper sizes supported by the PDF backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// `(width, height)` in millimetres.
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }

    pub fn css_name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
        }
    }
}

/// Typography and page setup for exported résumés. Everything prints black.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfOptions {
    pub page_size: PageSize,
    pub margin_mm: f64,
    pub font_family: String,
    pub font_size_pt: f64,
    pub line_height: f64,
    /// h1, h2, h3 sizes in points.
    pub heading_sizes_pt: [f64; 3],
    pub underline_section_headings: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_mm: 20.0,
            font_family: "Helvetica".to_string(),
            font_size_pt: 11.0,
            line_height: 1.5,
            heading_sizes_pt: [24.0, 13.0, 11.0],
            underline_section_headings: true,
        }
    }
}

/// Renders Markdown to an HTML fragment. Raw HTML in the input passes through.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Wraps an HTML fragment in a complete UTF-8 page styled for print.
pub fn html_document(body: &str, options: &PdfOptions) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Curriculo</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        stylesheet(options),
        body
    )
}

fn stylesheet(options: &PdfOptions) -> String {
    let [h1, h2, h3] = options.heading_sizes_pt;
    let decoration = if options.underline_section_headings {
        "underline"
    } else {
        "none"
    };
    format!(
        "@page {{ size: {page}; margin: {margin}mm; }}
body {{ font-family: {font}, Arial, sans-serif; font-size: {size}pt; line-height: {lh}; color: #000; }}
h1 {{ font-size: {h1}pt; font-weight: bold; margin: 0 0 4pt; }}
h2 {{ font-size: {h2}pt; font-weight: bold; margin: 16pt 0 8pt; text-decoration: {decoration}; }}
h3 {{ font-size: {h3}pt; font-weight: bold; margin: 12pt 0 4pt; }}
p {{ margin: 0 0 6pt; }}
a {{ color: #000; }}
hr {{ border: 0; border-top: 1px solid #000; margin: 12pt 0; }}
",
        page = options.page_size.css_name(),
        margin = options.margin_mm,
        font = options.font_family,
        size = options.font_size_pt,
        lh = options.line_height,
    )
}
