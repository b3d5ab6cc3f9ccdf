//! Renders a state snapshot into the print/PDF-ready invoice document: a
//! self-contained RTL HTML page. Everything it needs, including the logo,
//! is inline, so the rasterizer never fetches anything.

use crate::locale;
use crate::models::{CompanyInfo, Invoice, InvoiceStatus};
use crate::money;

const NOTES_FALLBACK: &str = "لا توجد ملاحظات إضافية.";
const NO_CLIENT_PLACEHOLDER: &str = "-- لم يتم تحديد عميل --";

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn status_color(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Paid => "background:#dcfce7;color:#15803d",
        InvoiceStatus::Open => "background:#dbeafe;color:#1d4ed8",
        InvoiceStatus::Draft => "background:#f3f4f6;color:#374151",
    }
}

/// Build the full invoice document for the given snapshot.
pub fn render_document(invoice: &Invoice, company: &CompanyInfo) -> String {
    let subtotal = money::subtotal(invoice);
    let total = money::grand_total(invoice);

    let mut doc = String::new();

    doc.push_str("<!DOCTYPE html>\n<html dir=\"rtl\" lang=\"ar\">\n<head>\n");
    doc.push_str("<meta charset=\"utf-8\">\n");
    doc.push_str(&format!(
        "<title>فاتورة {}</title>\n",
        escape_html(&invoice.number)
    ));
    doc.push_str(
        "<style>\n\
         body { font-family: sans-serif; color: #1f2937; margin: 0; }\n\
         .page { padding: 32px; }\n\
         .header { display: flex; justify-content: space-between; border-bottom: 2px solid #1f2937; padding-bottom: 24px; margin-bottom: 24px; }\n\
         .logo { height: 80px; object-fit: contain; margin-bottom: 16px; }\n\
         .company-name { font-size: 28px; font-weight: bold; text-transform: uppercase; margin: 0 0 8px; }\n\
         .muted { color: #4b5563; font-size: 13px; margin: 2px 0; }\n\
         .title { font-size: 36px; font-weight: 300; color: #9ca3af; margin: 0 0 8px; text-align: left; }\n\
         .meta { font-size: 13px; min-width: 200px; }\n\
         .meta div { display: flex; justify-content: space-between; margin-bottom: 4px; }\n\
         .badge { padding: 2px 8px; border-radius: 4px; font-size: 11px; font-weight: bold; }\n\
         .bill-to { margin-bottom: 32px; }\n\
         .section-label { color: #6b7280; font-size: 12px; font-weight: bold; text-transform: uppercase; margin-bottom: 8px; }\n\
         .placeholder { color: #9ca3af; font-style: italic; }\n\
         table { width: 100%; border-collapse: collapse; margin-bottom: 32px; }\n\
         th { background: #f3f4f6; border-bottom: 1px solid #d1d5db; padding: 10px 14px; font-size: 13px; color: #4b5563; text-align: right; }\n\
         td { border-bottom: 1px solid #e5e7eb; padding: 10px 14px; font-size: 14px; }\n\
         .num { text-align: left; }\n\
         .center { text-align: center; }\n\
         .totals { width: 260px; margin-right: auto; margin-bottom: 32px; font-size: 14px; }\n\
         .totals div { display: flex; justify-content: space-between; margin-bottom: 6px; }\n\
         .totals .discount { color: #ef4444; }\n\
         .totals .grand { font-size: 18px; font-weight: bold; border-top: 2px solid #1f2937; padding-top: 8px; }\n\
         .notes { border-top: 1px solid #e5e7eb; padding-top: 20px; font-size: 13px; color: #6b7280; white-space: pre-wrap; }\n\
         .footer { margin-top: 32px; text-align: center; color: #9ca3af; font-size: 11px; }\n\
         </style>\n</head>\n<body>\n<div class=\"page\">\n",
    );

    // Header: company block on the right, invoice meta on the left.
    doc.push_str("<div class=\"header\">\n<div>\n");
    if let Some(logo) = company.logo_url.as_deref().filter(|url| !url.is_empty()) {
        doc.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"Company Logo\">\n",
            escape_html(logo)
        ));
    }
    doc.push_str(&format!(
        "<h1 class=\"company-name\">{}</h1>\n",
        escape_html(&company.name)
    ));
    doc.push_str(&format!(
        "<p class=\"muted\"><strong>{}</strong></p>\n",
        escape_html(&company.address)
    ));
    doc.push_str(&format!(
        "<p class=\"muted\">{}</p>\n",
        escape_html(&company.sub_address)
    ));
    doc.push_str(&format!(
        "<p class=\"muted\"><strong>هاتف:</strong> <span dir=\"ltr\">{}</span></p>\n",
        escape_html(&company.phone)
    ));
    doc.push_str("</div>\n<div>\n<h2 class=\"title\">فاتورة</h2>\n<div class=\"meta\">\n");
    doc.push_str(&format!(
        "<div><strong>رقم الفاتورة:</strong><span>{}</span></div>\n",
        escape_html(&invoice.number)
    ));
    doc.push_str(&format!(
        "<div><strong>التاريخ:</strong><span>{}</span></div>\n",
        locale::format_date(&invoice.date)
    ));
    doc.push_str(&format!(
        "<div><strong>الحالة:</strong><span class=\"badge\" style=\"{}\">{}</span></div>\n",
        status_color(invoice.status),
        invoice.status.label()
    ));
    doc.push_str("</div>\n</div>\n</div>\n");

    // Bill-to. A missing client renders a placeholder, never an error.
    doc.push_str("<div class=\"bill-to\">\n<div class=\"section-label\">فاتورة إلى</div>\n");
    match &invoice.client {
        Some(client) => {
            doc.push_str(&format!("<p><strong>{}</strong></p>\n", escape_html(&client.name)));
            if !client.address.is_empty() {
                doc.push_str(&format!(
                    "<p class=\"muted\">{}</p>\n",
                    escape_html(&client.address)
                ));
            }
            if !client.phone.is_empty() {
                doc.push_str(&format!(
                    "<p class=\"muted\" dir=\"ltr\">{}</p>\n",
                    escape_html(&client.phone)
                ));
            }
        }
        None => {
            doc.push_str(&format!(
                "<p class=\"placeholder\">{NO_CLIENT_PLACEHOLDER}</p>\n"
            ));
        }
    }
    doc.push_str("</div>\n");

    // Items table. Line totals derive on the spot.
    doc.push_str(
        "<table>\n<thead>\n<tr>\
         <th>الوصف / الصنف</th>\
         <th class=\"center\">الكمية</th>\
         <th class=\"num\">السعر</th>\
         <th class=\"num\">الإجمالي</th>\
         </tr>\n</thead>\n<tbody>\n",
    );
    for item in &invoice.items {
        doc.push_str(&format!(
            "<tr><td>{}</td><td class=\"center\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape_html(&item.description),
            item.quantity,
            locale::format_currency(item.unit_price),
            locale::format_currency(money::line_total(item)),
        ));
    }
    doc.push_str("</tbody>\n</table>\n");

    // Totals. The discount row only appears when a discount is set.
    doc.push_str("<div class=\"totals\">\n");
    doc.push_str(&format!(
        "<div><span>المجموع الفرعي:</span><span>{}</span></div>\n",
        locale::format_currency(subtotal)
    ));
    if invoice.discount > 0.0 {
        doc.push_str(&format!(
            "<div class=\"discount\"><span>خصم:</span><span>- {}</span></div>\n",
            locale::format_currency(invoice.discount)
        ));
    }
    doc.push_str(&format!(
        "<div class=\"grand\"><span>الإجمالي الكلي:</span><span>{}</span></div>\n",
        locale::format_currency(total)
    ));
    doc.push_str("</div>\n");

    // Notes and footer.
    doc.push_str("<div class=\"notes\">\n<h4>ملاحظات وشروط:</h4>\n");
    let notes = if invoice.notes.is_empty() {
        NOTES_FALLBACK
    } else {
        invoice.notes.as_str()
    };
    doc.push_str(&format!("<p>{}</p>\n", escape_html(notes)));
    doc.push_str("</div>\n");
    doc.push_str(&format!(
        "<div class=\"footer\">تم إنشاء هذه الفاتورة إلكترونياً بواسطة نظام {}</div>\n",
        escape_html(&company.name)
    ));

    doc.push_str("</div>\n</body>\n</html>\n");
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, InvoiceItem};

    fn invoice() -> Invoice {
        Invoice {
            id: "1".to_string(),
            number: "INV-042".to_string(),
            date: "2026-08-06".to_string(),
            due_date: "2026-08-13".to_string(),
            status: InvoiceStatus::Open,
            client: None,
            items: vec![InvoiceItem {
                id: "2".to_string(),
                description: "كنبة <جلد>".to_string(),
                quantity: 3,
                unit_price: 100.0,
            }],
            discount: 0.0,
            notes: String::new(),
        }
    }

    #[test]
    fn missing_client_renders_placeholder() {
        let doc = render_document(&invoice(), &CompanyInfo::default());
        assert!(doc.contains(NO_CLIENT_PLACEHOLDER));
    }

    #[test]
    fn named_client_replaces_placeholder() {
        let mut inv = invoice();
        inv.client = Some(Client {
            name: "أحمد".to_string(),
            address: String::new(),
            phone: String::new(),
        });
        let doc = render_document(&inv, &CompanyInfo::default());
        assert!(doc.contains("أحمد"));
        assert!(!doc.contains(NO_CLIENT_PLACEHOLDER));
    }

    #[test]
    fn discount_row_only_when_discounted() {
        let company = CompanyInfo::default();
        let without = render_document(&invoice(), &company);
        assert!(!without.contains("خصم:"));

        let mut inv = invoice();
        inv.discount = 50.0;
        let with = render_document(&inv, &company);
        assert!(with.contains("خصم:"));
        // 300 - 50, formatted in the fixed locale.
        assert!(with.contains("٢٥٠٫٠٠ ج.م."));
    }

    #[test]
    fn user_text_is_escaped() {
        let doc = render_document(&invoice(), &CompanyInfo::default());
        assert!(doc.contains("كنبة &lt;جلد&gt;"));
        assert!(!doc.contains("كنبة <جلد>"));
    }

    #[test]
    fn empty_notes_fall_back_to_stock_line() {
        let doc = render_document(&invoice(), &CompanyInfo::default());
        assert!(doc.contains(NOTES_FALLBACK));
    }
}
