mod config;
mod draft;
mod export;
mod locale;
mod models;
mod money;
mod render;
mod store;
mod ui;

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::draft::{DraftStore, FileStore};
use crate::export::system::{SystemLinkOpener, SystemPrinter, WkhtmltopdfRenderer};
use crate::export::{ExportOrchestrator, LinkOpener};
use crate::store::InvoiceStore;
use crate::ui::editor::{self, EditorAction, EditorState};
use crate::ui::Activity;

const TOAST_SECONDS: u64 = 3;
// The share notice carries follow-up instructions, give it longer.
const SHARE_TOAST_SECONDS: u64 = 6;

/// Completion message from a background save or export.
struct Notice {
    message: String,
    seconds: u64,
}

impl Notice {
    fn new(message: String) -> Self {
        Self {
            message,
            seconds: TOAST_SECONDS,
        }
    }
}

struct Toast {
    message: String,
    until: Instant,
}

// Main application state
struct AppState {
    store: InvoiceStore,
    editor: EditorState,
    drafts: Arc<DraftStore<FileStore>>,
    exporter: Arc<ExportOrchestrator<WkhtmltopdfRenderer, SystemPrinter>>,
    opener: SystemLinkOpener,
    saving: Arc<AtomicBool>,
    notice_tx: mpsc::UnboundedSender<Notice>,
    notices: mpsc::UnboundedReceiver<Notice>,
    toast: Option<Toast>,
}

impl AppState {
    fn show_toast(&mut self, message: String, seconds: u64) {
        self.toast = Some(Toast {
            message,
            until: Instant::now() + Duration::from_secs(seconds),
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;
    init_logging(&config)?;

    // Draft storage, then the last session's state if any survives
    let drafts = Arc::new(draft::init(&config).await?);
    let mut store = InvoiceStore::with_defaults();
    let restored = drafts.restore_draft().await;
    if let Some(invoice) = restored.invoice {
        store.replace_invoice(invoice);
    }
    if let Some(company) = restored.company {
        store.replace_company(company);
    }

    let exporter = Arc::new(ExportOrchestrator::new(
        WkhtmltopdfRenderer,
        SystemPrinter,
        config.export_dir(),
    ));

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (notice_tx, notices) = mpsc::unbounded_channel();
    let mut app = AppState {
        store,
        editor: EditorState::new(),
        drafts,
        exporter,
        opener: SystemLinkOpener,
        saving: Arc::new(AtomicBool::new(false)),
        notice_tx,
        notices,
        toast: None,
    };

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    // The TUI owns the terminal, so diagnostics go to a file instead.
    std::fs::create_dir_all(config.data_dir())?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.data_dir().join("editor.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        // Drain completion notices from background saves/exports.
        while let Ok(notice) = app.notices.try_recv() {
            app.show_toast(notice.message, notice.seconds);
        }
        // Toasts dismiss themselves.
        if app
            .toast
            .as_ref()
            .is_some_and(|toast| Instant::now() >= toast.until)
        {
            app.toast = None;
        }

        let activity = Activity {
            saving: app.saving.load(Ordering::SeqCst),
            exporting: app.exporter.is_exporting(),
        };
        terminal.draw(|frame| {
            ui::render_app(
                frame,
                &mut app.editor,
                &app.store,
                activity,
                app.toast.as_ref().map(|toast| toast.message.as_str()),
            )
        })?;

        if let Some(action) = editor::handle_input(&mut app.editor, &mut app.store)? {
            if handle_action(app, action).await? {
                break;
            }
        }
    }

    Ok(())
}

/// Apply a top-level editor action. Returns true when the app should quit.
async fn handle_action(app: &mut AppState, action: EditorAction) -> Result<bool> {
    match action {
        EditorAction::Quit => return Ok(true),
        EditorAction::SaveDraft => {
            // One outstanding save at a time.
            if !app.saving.swap(true, Ordering::SeqCst) {
                let invoice = app.store.invoice().clone();
                let company = app.store.company().clone();
                let drafts = Arc::clone(&app.drafts);
                let saving = Arc::clone(&app.saving);
                let tx = app.notice_tx.clone();
                tokio::spawn(async move {
                    let message = match drafts.save_draft(&invoice, &company).await {
                        Ok(()) => "تم حفظ الفاتورة وإعدادات الشركة بنجاح!".to_string(),
                        Err(err) => {
                            warn!(%err, "draft save failed");
                            err.to_string()
                        }
                    };
                    saving.store(false, Ordering::SeqCst);
                    let _ = tx.send(Notice::new(message));
                });
            }
        }
        EditorAction::NewInvoice => {
            let fresh = app.store.new_invoice_template();
            app.store.replace_invoice(fresh);
            app.show_toast("تم إنشاء فاتورة جديدة".to_string(), TOAST_SECONDS);

            // Drop the stale draft so it cannot resurface next session.
            let drafts = Arc::clone(&app.drafts);
            let tx = app.notice_tx.clone();
            tokio::spawn(async move {
                if let Err(err) = drafts.clear_draft().await {
                    warn!(%err, "draft clear failed");
                    let _ = tx.send(Notice::new(err.to_string()));
                }
            });
        }
        EditorAction::Print => {
            let message = match app.exporter.print(app.store.invoice(), app.store.company()) {
                Ok(()) => "تم إرسال الفاتورة للطباعة".to_string(),
                Err(err) => {
                    warn!(%err, "print failed");
                    err.to_string()
                }
            };
            app.show_toast(message, TOAST_SECONDS);
        }
        EditorAction::ExportPdf => {
            let invoice = app.store.invoice().clone();
            let company = app.store.company().clone();
            let exporter = Arc::clone(&app.exporter);
            let tx = app.notice_tx.clone();
            tokio::spawn(async move {
                let message = match exporter.export_pdf(invoice, company).await {
                    Ok(_path) => "تم تحميل ملف PDF بنجاح".to_string(),
                    Err(err) => {
                        warn!(%err, "pdf export failed");
                        err.to_string()
                    }
                };
                let _ = tx.send(Notice::new(message));
            });
        }
        EditorAction::Share(phone) => {
            let link = app
                .exporter
                .share_link(app.store.invoice(), app.store.company(), &phone);
            match link {
                Ok(url) => match app.opener.open(&url) {
                    Ok(()) => app.show_toast(
                        "تم فتح واتساب. يرجى \"تصدير PDF\" ثم إرفاق الملف في المحادثة."
                            .to_string(),
                        SHARE_TOAST_SECONDS,
                    ),
                    Err(err) => {
                        warn!(%err, "share link open failed");
                        app.show_toast(err.to_string(), TOAST_SECONDS);
                    }
                },
                Err(err) => app.show_toast(err.to_string(), TOAST_SECONDS),
            }
        }
        EditorAction::LoadLogo(path) => match load_logo_data_uri(Path::new(path.trim())) {
            Ok(data_uri) => {
                app.store.set_logo(data_uri);
                app.show_toast("تم تحديث الشعار".to_string(), TOAST_SECONDS);
            }
            Err(err) => {
                warn!(%err, %path, "logo load failed");
                app.show_toast("تعذر قراءة ملف الشعار".to_string(), TOAST_SECONDS);
            }
        },
        EditorAction::ClearLogo => {
            app.store.clear_logo();
        }
    }

    Ok(false)
}

/// Read an image file and inline it as a `data:` URI, so the preview and
/// the PDF renderer never depend on the file staying around.
fn load_logo_data_uri(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        _ => "image/png",
    };
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}
