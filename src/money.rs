//! Monetary derivations. Pure functions over the invoice; nothing here is
//! stored, totals are recomputed on every read.

use crate::models::{Invoice, InvoiceItem};

pub fn line_total(item: &InvoiceItem) -> f64 {
    item.quantity as f64 * item.unit_price
}

pub fn subtotal(invoice: &Invoice) -> f64 {
    invoice.items.iter().map(line_total).sum()
}

/// Subtotal minus the flat discount, clamped to zero. A discount larger
/// than the subtotal must never show a negative amount owed; the raw
/// discount value on the invoice is left untouched.
pub fn grand_total(invoice: &Invoice) -> f64 {
    (subtotal(invoice) - invoice.discount).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItem, InvoiceStatus};

    fn item(quantity: u32, unit_price: f64) -> InvoiceItem {
        InvoiceItem {
            id: format!("{}-{}", quantity, unit_price),
            description: String::new(),
            quantity,
            unit_price,
        }
    }

    fn invoice(items: Vec<InvoiceItem>, discount: f64) -> Invoice {
        Invoice {
            id: "1".to_string(),
            number: "INV-001".to_string(),
            date: "2026-08-06".to_string(),
            due_date: "2026-08-13".to_string(),
            status: InvoiceStatus::Draft,
            client: None,
            items,
            discount,
            notes: String::new(),
        }
    }

    #[test]
    fn line_total_is_quantity_times_price() {
        assert_eq!(line_total(&item(3, 100.0)), 300.0);
        assert_eq!(line_total(&item(0, 999.0)), 0.0);
        assert_eq!(line_total(&item(7, 0.0)), 0.0);
    }

    #[test]
    fn subtotal_is_order_independent() {
        let a = invoice(vec![item(1, 10.0), item(2, 20.0), item(3, 5.0)], 0.0);
        let b = invoice(vec![item(3, 5.0), item(1, 10.0), item(2, 20.0)], 0.0);
        assert_eq!(subtotal(&a), 65.0);
        assert_eq!(subtotal(&a), subtotal(&b));
    }

    #[test]
    fn discount_is_subtracted_exactly() {
        let inv = invoice(vec![item(3, 100.0)], 50.0);
        assert_eq!(subtotal(&inv), 300.0);
        assert_eq!(grand_total(&inv), 250.0);
    }

    #[test]
    fn oversized_discount_clamps_to_zero() {
        let inv = invoice(vec![item(1, 100.0)], 250.0);
        assert_eq!(grand_total(&inv), 0.0);
        // The discount itself is preserved unclamped.
        assert_eq!(inv.discount, 250.0);

        let exact = invoice(vec![item(1, 100.0)], 100.0);
        assert_eq!(grand_total(&exact), 0.0);
    }
}
