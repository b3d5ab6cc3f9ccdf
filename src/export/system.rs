//! Platform-backed implementations of the export capabilities. Each one
//! shells out to the tool the platform provides; a missing tool surfaces
//! as a recoverable export error, never a crash.

use std::path::Path;
use std::process::Command;

use async_trait::async_trait;

use super::{DocumentPrinter, ExportError, LinkOpener, PdfOptions, PdfRenderer};

/// Rasterizes the rendered document with wkhtmltopdf.
pub struct WkhtmltopdfRenderer;

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render_pdf(
        &self,
        html_path: &Path,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<(), ExportError> {
        let margin = format!("{}mm", options.margin_mm);
        let quality = ((options.image_quality * 100.0) as u32).to_string();
        let status = tokio::process::Command::new("wkhtmltopdf")
            .args(["--quiet", "--enable-local-file-access"])
            .args(["--page-size", options.page_size])
            .args(["--orientation", options.orientation])
            .args(["--margin-top", &margin])
            .args(["--margin-bottom", &margin])
            .args(["--margin-left", &margin])
            .args(["--margin-right", &margin])
            .args(["--image-quality", &quality])
            .args(["--zoom", &options.scale.to_string()])
            .arg(html_path)
            .arg(pdf_path)
            .status()
            .await
            .map_err(|err| ExportError::Renderer(format!("wkhtmltopdf: {err}")))?;

        if !status.success() {
            return Err(ExportError::Renderer(format!(
                "wkhtmltopdf exited with {status}"
            )));
        }
        Ok(())
    }
}

/// Spools a document through `lp`. No completion is awaited; the platform
/// owns the rest of the print lifecycle.
pub struct SystemPrinter;

impl DocumentPrinter for SystemPrinter {
    fn print(&self, path: &Path) -> Result<(), ExportError> {
        let status = Command::new("lp")
            .arg(path)
            .status()
            .map_err(|err| ExportError::Printer(format!("lp: {err}")))?;
        if !status.success() {
            return Err(ExportError::Printer(format!("lp exited with {status}")));
        }
        Ok(())
    }
}

/// Opens a URL with the platform handler.
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> Result<(), ExportError> {
        #[cfg(target_os = "macos")]
        let command = "open";
        #[cfg(target_os = "windows")]
        let command = "explorer";
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = "xdg-open";

        Command::new(command)
            .arg(url)
            .spawn()
            .map(|_| ())
            .map_err(|err| ExportError::Opener(format!("{command}: {err}")))
    }
}
