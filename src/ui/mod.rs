pub mod components;
pub mod editor;
pub mod preview;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::store::InvoiceStore;
use self::editor::EditorState;

/// Background work the header should reflect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Activity {
    pub saving: bool,
    pub exporting: bool,
}

/// Draw the whole screen: header, form + live preview, help bar, and the
/// toast overlay when a notice is up.
pub fn render_app<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut EditorState,
    store: &InvoiceStore,
    activity: Activity,
    toast: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Form + preview
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(frame.size());

    let mut header = vec![
        Span::styled(
            store.company().name.clone(),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  |  "),
        Span::raw(store.invoice().number.clone()),
    ];
    if activity.saving {
        header.push(Span::styled(
            "  جاري الحفظ...",
            Style::default().fg(Color::Yellow),
        ));
    }
    if activity.exporting {
        header.push(Span::styled(
            "  جاري تصدير PDF...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let title = Paragraph::new(Spans::from(header))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)].as_ref())
        .split(chunks[1]);

    editor::render_form(frame, state, store, body[0]);
    preview::render_preview(frame, store, body[1]);

    let help = Paragraph::new(editor::help_text(state))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(message) = toast {
        render_toast(frame, message);
    }

    if state.is_confirming_new() {
        render_confirm(frame);
    }
    if let Some(buffer) = state.share_prompt() {
        render_share_prompt(frame, buffer);
    }
}

fn render_toast<B: Backend>(frame: &mut Frame<B>, message: &str) {
    let area = centered_rect(60, 14, frame.size());
    let toast = Paragraph::new(vec![Spans::from(""), Spans::from(message)])
        .style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(toast, area);
}

fn render_confirm<B: Backend>(frame: &mut Frame<B>) {
    let area = centered_rect(70, 20, frame.size());
    let dialog = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("هل أنت متأكد من إنشاء فاتورة جديدة؟"),
        Spans::from("سيتم مسح البيانات الحالية غير المحفوظة."),
        Spans::from(""),
        Spans::from("Y - تأكيد | N - إلغاء"),
    ])
    .style(Style::default().fg(Color::Yellow))
    .block(Block::default().title("فاتورة جديدة").borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn render_share_prompt<B: Backend>(frame: &mut Frame<B>, buffer: &str) {
    let area = centered_rect(70, 20, frame.size());
    let dialog = Paragraph::new(vec![
        Spans::from("أدخل رقم واتساب العميل للإرسال:"),
        Spans::from(""),
        Spans::from(Span::styled(
            format!("{buffer}|"),
            Style::default().fg(Color::Green),
        )),
        Spans::from(""),
        Spans::from("Enter - إرسال | Esc - إلغاء"),
    ])
    .block(Block::default().title("إرسال واتساب").borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

// Helper to center a popup over the working area.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
