//! Résumé rendering: Markdown → HTML → PDF.
//!
//! PDF generation is pluggable behind [`PdfRenderer`]. `AppState` holds an
//! `Arc<dyn PdfRenderer>` chosen at startup from `PDF_BACKEND`; every route
//! that produces a PDF goes through [`export_pdf`].

pub mod command;
pub mod hosted;
pub mod html;

#[cfg(feature = "browser")]
pub mod browser;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, PdfBackend};

pub use html::{html_document, render_html, PageSize, PdfOptions};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("converter exited with {status}: {stderr}")]
    Command { status: String, stderr: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("converter returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("converter produced an empty document")]
    Empty,
}

/// Converts a complete HTML page to PDF bytes.
///
/// Implementations acquire whatever they need (process, connection, browser)
/// inside `render` and release it before returning, on success and failure.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Bytes, RenderError>;
}

/// Markdown → styled HTML page → PDF.
pub async fn export_pdf(
    renderer: &dyn PdfRenderer,
    markdown: &str,
    options: &PdfOptions,
) -> Result<Bytes, RenderError> {
    let page = html_document(&render_html(markdown), options);
    debug!(
        "Rendering PDF via {} backend ({} bytes of HTML)",
        renderer.backend(),
        page.len()
    );
    let pdf = renderer.render(&page, options).await?;
    if pdf.is_empty() {
        return Err(RenderError::Empty);
    }
    Ok(pdf)
}

/// Builds the renderer selected by configuration.
pub fn renderer_from_config(config: &Config) -> Result<Arc<dyn PdfRenderer>> {
    let renderer: Arc<dyn PdfRenderer> = match config.pdf_backend {
        PdfBackend::Command => Arc::new(command::CommandPdfRenderer::new(&config.pdf_command)),
        PdfBackend::Hosted => {
            let url = config
                .pdf_converter_url
                .as_deref()
                .context("PDF_BACKEND=hosted requires PDF_CONVERTER_URL")?;
            Arc::new(hosted::HostedPdfRenderer::new(url)?)
        }
        PdfBackend::Browser => browser_renderer()?,
    };
    info!("PDF renderer initialized (backend: {})", renderer.backend());
    Ok(renderer)
}

#[cfg(feature = "browser")]
fn browser_renderer() -> Result<Arc<dyn PdfRenderer>> {
    Ok(Arc::new(browser::BrowserPdfRenderer::default()))
}

#[cfg(not(feature = "browser"))]
fn browser_renderer() -> Result<Arc<dyn PdfRenderer>> {
    bail!("PDF_BACKEND=browser requires building with the `browser` feature")
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records the HTML it is given and returns a fixed payload.
    #[derive(Default)]
    pub struct RecordingRenderer {
        pub pages: Mutex<Vec<String>>,
        pub output: Vec<u8>,
    }

    impl RecordingRenderer {
        pub fn returning(output: &[u8]) -> Self {
            Self {
                pages: Mutex::new(Vec::new()),
                output: output.to_vec(),
            }
        }
    }

    #[async_trait]
    impl PdfRenderer for RecordingRenderer {
        fn backend(&self) -> &'static str {
            "recording"
        }

        async fn render(&self, html: &str, _options: &PdfOptions) -> Result<Bytes, RenderError> {
            self.pages.lock().unwrap().push(html.to_string());
            Ok(Bytes::from(self.output.clone()))
        }
    }
}
