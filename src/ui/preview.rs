use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::locale;
use crate::models::InvoiceStatus;
use crate::money;
use crate::store::InvoiceStore;

fn status_style(status: InvoiceStatus) -> Style {
    match status {
        InvoiceStatus::Paid => Style::default().fg(Color::Green),
        InvoiceStatus::Open => Style::default().fg(Color::Blue),
        InvoiceStatus::Draft => Style::default().fg(Color::Gray),
    }
}

/// Live preview pane: the same derivations the exported document uses,
/// re-read from the store on every frame.
pub fn render_preview<B: Backend>(frame: &mut Frame<B>, store: &InvoiceStore, area: Rect) {
    let invoice = store.invoice();
    let company = store.company();

    let mut lines: Vec<Spans> = Vec::new();

    lines.push(Spans::from(Span::styled(
        company.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Spans::from(Span::styled(
        company.address.clone(),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Spans::from(vec![
        Span::styled("هاتف: ", Style::default().fg(Color::Gray)),
        Span::raw(company.phone.clone()),
    ]));
    lines.push(Spans::from(""));

    lines.push(Spans::from(vec![
        Span::styled("رقم الفاتورة: ", Style::default().fg(Color::Gray)),
        Span::raw(invoice.number.clone()),
    ]));
    lines.push(Spans::from(vec![
        Span::styled("التاريخ: ", Style::default().fg(Color::Gray)),
        Span::raw(locale::format_date(&invoice.date)),
    ]));
    lines.push(Spans::from(vec![
        Span::styled("الاستحقاق: ", Style::default().fg(Color::Gray)),
        Span::raw(locale::format_date(&invoice.due_date)),
    ]));
    lines.push(Spans::from(vec![
        Span::styled("الحالة: ", Style::default().fg(Color::Gray)),
        Span::styled(invoice.status.label(), status_style(invoice.status)),
    ]));
    lines.push(Spans::from(""));

    lines.push(Spans::from(Span::styled(
        "فاتورة إلى",
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    )));
    match invoice.client.as_ref().filter(|c| !c.name.is_empty()) {
        Some(client) => {
            lines.push(Spans::from(Span::styled(
                client.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if !client.address.is_empty() {
                lines.push(Spans::from(client.address.clone()));
            }
            if !client.phone.is_empty() {
                lines.push(Spans::from(client.phone.clone()));
            }
        }
        None => {
            lines.push(Spans::from(Span::styled(
                "-- لم يتم تحديد عميل --",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
    }
    lines.push(Spans::from(""));

    for item in &invoice.items {
        let description = if item.description.is_empty() {
            "(بدون وصف)"
        } else {
            item.description.as_str()
        };
        lines.push(Spans::from(format!(
            "{} — {} × {} = {}",
            description,
            item.quantity,
            locale::format_currency(item.unit_price),
            locale::format_currency(money::line_total(item)),
        )));
    }
    lines.push(Spans::from(""));

    lines.push(Spans::from(format!(
        "المجموع الفرعي: {}",
        locale::format_currency(money::subtotal(invoice))
    )));
    if invoice.discount > 0.0 {
        lines.push(Spans::from(Span::styled(
            format!("خصم: - {}", locale::format_currency(invoice.discount)),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Spans::from(Span::styled(
        format!(
            "الإجمالي الكلي: {}",
            locale::format_currency(money::grand_total(invoice))
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    if !invoice.notes.is_empty() {
        lines.push(Spans::from(""));
        lines.push(Spans::from(Span::styled(
            format!("ملاحظات: {}", invoice.notes),
            Style::default().fg(Color::Gray),
        )));
    }

    let preview = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("معاينة الفاتورة").borders(Borders::ALL));
    frame.render_widget(preview, area);
}
