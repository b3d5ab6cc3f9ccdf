//! Export side effects: printing, PDF generation, and the WhatsApp share
//! link. Everything operates on a snapshot of the invoice and company;
//! nothing here mutates editor state. The platform-facing pieces live
//! behind capability traits so the orchestration logic tests without a
//! print spooler or rasterizer installed.

pub mod system;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::locale;
use crate::models::{CompanyInfo, Invoice};
use crate::money;
use crate::render;

/// Base of the WhatsApp deep link.
const WHATSAPP_BASE: &str = "https://wa.me";
/// Egypt country code, prefixed onto local-format numbers.
const COUNTRY_CODE: &str = "20";
/// Greeting used when the invoice has no named client.
const GENERIC_RECIPIENT: &str = "عميلنا العزيز";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("جاري تصدير ملف PDF بالفعل")]
    ExportInProgress,
    #[error("لم يتم إدخال رقم هاتف")]
    NoRecipientPhone,
    #[error("تعذر إنشاء ملف PDF: {0}")]
    Renderer(String),
    #[error("تعذر إرسال المستند للطباعة: {0}")]
    Printer(String),
    #[error("تعذر فتح الرابط: {0}")]
    Opener(String),
    #[error("تعذر كتابة ملف التصدير: {0}")]
    Io(#[from] io::Error),
}

/// Fixed rasterization configuration. Not user-adjustable; these are the
/// values the exported invoices have always used.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// Equal margin on all four sides, millimeters.
    pub margin_mm: u32,
    /// Embedded image quality, 0..=1.
    pub image_quality: f64,
    /// Resolution scale factor.
    pub scale: u32,
    pub page_size: &'static str,
    pub orientation: &'static str,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margin_mm: 10,
            image_quality: 0.98,
            scale: 2,
            page_size: "A4",
            orientation: "Portrait",
        }
    }
}

/// Rasterizes a rendered HTML document into a PDF file.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_pdf(
        &self,
        html_path: &Path,
        pdf_path: &Path,
        options: &PdfOptions,
    ) -> Result<(), ExportError>;
}

/// Hands a document to the platform print spool. Fire-and-forget: the
/// platform owns the rest of the dialog lifecycle.
pub trait DocumentPrinter: Send + Sync {
    fn print(&self, path: &Path) -> Result<(), ExportError>;
}

/// Opens a URL with the platform's external handler.
pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<(), ExportError>;
}

pub struct ExportOrchestrator<R, P> {
    renderer: R,
    printer: P,
    export_dir: PathBuf,
    exporting: AtomicBool,
}

impl<R: PdfRenderer, P: DocumentPrinter> ExportOrchestrator<R, P> {
    pub fn new(renderer: R, printer: P, export_dir: PathBuf) -> Self {
        Self {
            renderer,
            printer,
            export_dir,
            exporting: AtomicBool::new(false),
        }
    }

    /// True while a PDF export is in flight; the UI shows the triggering
    /// control as busy.
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Render the current snapshot and hand it to the print spool.
    pub fn print(&self, invoice: &Invoice, company: &CompanyInfo) -> Result<(), ExportError> {
        let html = render::render_document(invoice, company);
        std::fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(format!("Invoice-{}.html", invoice.number));
        std::fs::write(&path, html)?;
        self.printer.print(&path)
    }

    /// Export the snapshot as `Invoice-<number>.pdf`. A single export may
    /// be outstanding: re-invocation while one is in flight is rejected
    /// here, not by the rasterizer, and the in-progress flag is cleared on
    /// every outcome so a failed export can be retried immediately.
    pub async fn export_pdf(
        &self,
        invoice: Invoice,
        company: CompanyInfo,
    ) -> Result<PathBuf, ExportError> {
        if self
            .exporting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::ExportInProgress);
        }
        let result = self.rasterize(&invoice, &company).await;
        self.exporting.store(false, Ordering::SeqCst);
        result
    }

    async fn rasterize(
        &self,
        invoice: &Invoice,
        company: &CompanyInfo,
    ) -> Result<PathBuf, ExportError> {
        let html = render::render_document(invoice, company);
        tokio::fs::create_dir_all(&self.export_dir).await?;
        let html_path = self.export_dir.join(format!("Invoice-{}.html", invoice.number));
        let pdf_path = self.export_dir.join(format!("Invoice-{}.pdf", invoice.number));
        tokio::fs::write(&html_path, html).await?;
        // On rasterizer failure the rendered HTML stays on disk.
        self.renderer
            .render_pdf(&html_path, &pdf_path, &PdfOptions::default())
            .await?;
        info!(path = %pdf_path.display(), "exported invoice");
        Ok(pdf_path)
    }

    /// Compose the WhatsApp deep link for this snapshot. The caller opens
    /// it; this only builds the URL.
    pub fn share_link(
        &self,
        invoice: &Invoice,
        company: &CompanyInfo,
        recipient_phone: &str,
    ) -> Result<String, ExportError> {
        build_share_link(invoice, company, recipient_phone)
    }
}

/// Normalize a phone number for the deep link: digits only, with the
/// country code. `01…` local numbers swap the leading zero for `20`; a
/// bare ten-digit mobile number gets `20` prepended. Returns `None` when
/// no digits survive.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if let Some(rest) = digits.strip_prefix("01") {
        return Some(format!("{COUNTRY_CODE}1{rest}"));
    }
    if digits.len() == 10 && digits.starts_with('1') {
        return Some(format!("{COUNTRY_CODE}{digits}"));
    }
    Some(digits)
}

pub fn build_share_link(
    invoice: &Invoice,
    company: &CompanyInfo,
    recipient_phone: &str,
) -> Result<String, ExportError> {
    let phone = normalize_phone(recipient_phone).ok_or(ExportError::NoRecipientPhone)?;

    let recipient = invoice
        .client
        .as_ref()
        .map(|client| client.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(GENERIC_RECIPIENT);
    let total = locale::format_currency(money::grand_total(invoice));

    let message = format!(
        "مرحباً {recipient}،\n\
         إليك تفاصيل الفاتورة من {company_name}:\n\
         \n\
         رقم الفاتورة: {number}\n\
         تاريخ الفاتورة: {date}\n\
         الإجمالي المستحق: {total}\n\
         \n\
         يرجى الاطلاع على الفاتورة المرفقة (PDF).\n\
         شكراً لتعاملكم معنا.",
        company_name = company.name,
        number = invoice.number,
        date = locale::format_date(&invoice.date),
    );

    Ok(format!(
        "{WHATSAPP_BASE}/{phone}?text={}",
        urlencoding::encode(&message)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, InvoiceItem, InvoiceStatus};
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Notify;

    fn invoice() -> Invoice {
        Invoice {
            id: "1".to_string(),
            number: "INV-042".to_string(),
            date: "2026-08-06".to_string(),
            due_date: "2026-08-13".to_string(),
            status: InvoiceStatus::Open,
            client: Some(Client {
                name: "أحمد".to_string(),
                address: String::new(),
                phone: "010-305-30580".to_string(),
            }),
            items: vec![InvoiceItem {
                id: "2".to_string(),
                description: "كنبة".to_string(),
                quantity: 3,
                unit_price: 100.0,
            }],
            discount: 50.0,
            notes: String::new(),
        }
    }

    fn scratch_dir() -> PathBuf {
        static SEQ: AtomicU32 = AtomicU32::new(0);
        std::env::temp_dir().join(format!(
            "thebaz-export-test-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::SeqCst)
        ))
    }

    struct NoopPrinter;

    impl DocumentPrinter for NoopPrinter {
        fn print(&self, _path: &Path) -> Result<(), ExportError> {
            Ok(())
        }
    }

    /// Renderer that parks until released, to hold an export in flight.
    struct ParkedRenderer {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PdfRenderer for ParkedRenderer {
        async fn render_pdf(
            &self,
            _html: &Path,
            _pdf: &Path,
            _options: &PdfOptions,
        ) -> Result<(), ExportError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl PdfRenderer for FailingRenderer {
        async fn render_pdf(
            &self,
            _html: &Path,
            _pdf: &Path,
            _options: &PdfOptions,
        ) -> Result<(), ExportError> {
            Err(ExportError::Renderer("rasterizer exploded".to_string()))
        }
    }

    #[test]
    fn normalizes_local_numbers() {
        assert_eq!(
            normalize_phone("01030530580").as_deref(),
            Some("201030530580")
        );
        assert_eq!(
            normalize_phone("1030530580").as_deref(),
            Some("201030530580")
        );
        assert_eq!(
            normalize_phone("010-305-30580").as_deref(),
            Some("201030530580")
        );
        // Already carrying the country code: left alone.
        assert_eq!(
            normalize_phone("+20 103 053 0580").as_deref(),
            Some("201030530580")
        );
    }

    #[test]
    fn rejects_numbers_with_no_digits() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("   "), None);
        assert_eq!(normalize_phone("abc"), None);
    }

    #[test]
    fn share_link_carries_normalized_phone_and_message() {
        let url = build_share_link(&invoice(), &CompanyInfo::default(), "010-305-30580").unwrap();
        assert!(url.starts_with("https://wa.me/201030530580?text="));

        let encoded = url.split_once("?text=").unwrap().1;
        let message = urlencoding::decode(encoded).unwrap();
        assert!(message.contains("أحمد"));
        assert!(message.contains("THEBAZ SHOWROOM"));
        assert!(message.contains("INV-042"));
        assert!(message.contains("٦ أغسطس ٢٠٢٦"));
        // 300 - 50, clamped total, fixed locale.
        assert!(message.contains("٢٥٠٫٠٠ ج.م."));
    }

    #[test]
    fn share_link_uses_generic_greeting_without_client() {
        let mut inv = invoice();
        inv.client = None;
        let url = build_share_link(&inv, &CompanyInfo::default(), "01030530580").unwrap();
        let message = urlencoding::decode(url.split_once("?text=").unwrap().1).unwrap();
        assert!(message.contains(GENERIC_RECIPIENT));
    }

    #[test]
    fn share_link_without_phone_is_a_validation_failure() {
        let err = build_share_link(&invoice(), &CompanyInfo::default(), " -- ").unwrap_err();
        assert!(matches!(err, ExportError::NoRecipientPhone));
    }

    #[tokio::test]
    async fn second_export_is_rejected_while_in_flight() {
        let renderer = ParkedRenderer {
            started: Notify::new(),
            release: Notify::new(),
        };
        let orch = std::sync::Arc::new(ExportOrchestrator::new(
            renderer,
            NoopPrinter,
            scratch_dir(),
        ));

        let running = {
            let orch = std::sync::Arc::clone(&orch);
            tokio::spawn(async move {
                orch.export_pdf(invoice(), CompanyInfo::default()).await
            })
        };

        orch.renderer.started.notified().await;
        assert!(orch.is_exporting());
        let second = orch.export_pdf(invoice(), CompanyInfo::default()).await;
        assert!(matches!(second, Err(ExportError::ExportInProgress)));

        orch.renderer.release.notify_one();
        running.await.unwrap().unwrap();
        assert!(!orch.is_exporting());
    }

    #[tokio::test]
    async fn failed_export_clears_the_flag_for_retry() {
        let orch = ExportOrchestrator::new(FailingRenderer, NoopPrinter, scratch_dir());
        let result = orch.export_pdf(invoice(), CompanyInfo::default()).await;
        assert!(matches!(result, Err(ExportError::Renderer(_))));
        assert!(!orch.is_exporting());

        // The rendered document stays behind for inspection.
        let html = orch.export_dir.join("Invoice-INV-042.html");
        assert!(html.exists());

        // And the next attempt is not blocked.
        let again = orch.export_pdf(invoice(), CompanyInfo::default()).await;
        assert!(matches!(again, Err(ExportError::Renderer(_))));
    }
}
