use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use super::{PdfOptions, PdfRenderer, RenderError};

const CONVERT_PATH: &str = "/forms/chromium/convert/html";
const MM_PER_INCH: f64 = 25.4;

/// Posts HTML to a Gotenberg-compatible conversion service.
#[derive(Clone)]
pub struct HostedPdfRenderer {
    client: Client,
    endpoint: String,
}

impl HostedPdfRenderer {
    pub fn new(base_url: &str) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{CONVERT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    fn form(html: &str, options: &PdfOptions) -> Result<Form, RenderError> {
        let index = Part::text(html.to_string())
            .file_name("index.html")
            .mime_str("text/html")?;

        let (width, height) = options.page_size.dimensions_mm();
        let margin = inches(options.margin_mm);

        Ok(Form::new()
            .part("files", index)
            .text("paperWidth", inches(width))
            .text("paperHeight", inches(height))
            .text("marginTop", margin.clone())
            .text("marginBottom", margin.clone())
            .text("marginLeft", margin.clone())
            .text("marginRight", margin)
            .text("printBackground", "true"))
    }
}

fn inches(mm: f64) -> String {
    format!("{:.2}", mm / MM_PER_INCH)
}

#[async_trait]
impl PdfRenderer for HostedPdfRenderer {
    fn backend(&self) -> &'static str {
        "hosted"
    }

    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Bytes, RenderError> {
        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(Self::form(html, options)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("PDF converter returned {status}: {message}");
            return Err(RenderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}
