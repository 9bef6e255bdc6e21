use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{PdfOptions, PdfRenderer, RenderError};

/// Converts HTML with an external `wkhtmltopdf`-compatible executable.
///
/// Input and output live in a per-call temporary directory that is removed
/// when the call returns. The child is killed if the request future is dropped.
pub struct CommandPdfRenderer {
    program: String,
}

impl CommandPdfRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(options: &PdfOptions, input: &str, output: &str) -> Vec<String> {
        let margin = format!("{}mm", options.margin_mm);
        let mut args = vec![
            "--quiet".to_string(),
            "--encoding".to_string(),
            "utf-8".to_string(),
            "--page-size".to_string(),
            options.page_size.css_name().to_string(),
        ];
        for side in ["top", "right", "bottom", "left"] {
            args.push(format!("--margin-{side}"));
            args.push(margin.clone());
        }
        args.push(input.to_string());
        args.push(output.to_string());
        args
    }
}

#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    fn backend(&self) -> &'static str {
        "command"
    }

    async fn render(&self, html: &str, options: &PdfOptions) -> Result<Bytes, RenderError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("resume.html");
        let output = dir.path().join("resume.pdf");
        tokio::fs::write(&input, html).await?;

        let args = Self::args(
            options,
            &input.to_string_lossy(),
            &output.to_string_lossy(),
        );
        debug!("Running {} {}", self.program, args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!("{} failed ({}): {stderr}", self.program, result.status);
            return Err(RenderError::Command {
                status: result.status.to_string(),
                stderr,
            });
        }

        let pdf = tokio::fs::read(&output).await?;
        Ok(Bytes::from(pdf))
    }
}
