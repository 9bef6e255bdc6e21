//! Headless Chromium backend (`--features browser`).

use async_trait::async_trait;
use bytes::Bytes;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use tracing::{debug, warn};

use super::{PdfOptions, PdfRenderer, RenderError};

const MM_PER_INCH: f64 = 25.4;

/// Launches a browser per request and always shuts it down afterwards.
#[derive(Debug, Default, Clone)]
pub struct BrowserPdfRenderer;

fn browser_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Browser(e.to_string())
}

fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    let (width, height) = options.page_size.dimensions_mm();
    let margin = options.margin_mm / MM_PER_INCH;
    PrintToPdfParams {
        paper_width: Some(width / MM_PER_INCH),
        paper_height: Some(height / MM_PER_INCH),
        margin_top: Some(margin),
        margin_bottom: Some(margin),
        margin_left: Some(margin),
        margin_right: Some(margin),
        print_background: Some(true),
        ..Default::default()
    }
}

async fn print_page(
    browser: &Browser,
    html: &str,
    options: &PdfOptions,
) -> Result<Vec<u8>, RenderError> {
    let page = browser.new_page("about:blank").await.map_err(browser_error)?;
    page.set_content(html).await.map_err(browser_error)?;
    page.pdf(print_params(options)).await.map_err(browser_error)
}

#[async_trait]
impl PdfRenderer for BrowserPdfRenderer {
    fn backend(&self) -> &'static str {
        "browser"
    }

    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Bytes, RenderError> {
        let config = BrowserConfig::builder().build().map_err(browser_error)?;
        let (mut browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = print_page(&browser, html, options).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to reap browser process: {e}");
        }
        events.abort();

        let pdf = result?;
        debug!("Browser produced {} bytes of PDF", pdf.len());
        Ok(Bytes::from(pdf))
    }
}
