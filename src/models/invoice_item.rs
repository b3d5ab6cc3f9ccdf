use serde::{Deserialize, Serialize};

/// A single line on the invoice. The line total is always derived from
/// quantity and unit price, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl InvoiceItem {
    /// Blank line as appended by the "add item" control: quantity 1, price 0.
    pub fn blank(id: String) -> Self {
        Self {
            id,
            description: String::new(),
            quantity: 1,
            unit_price: 0.0,
        }
    }
}
