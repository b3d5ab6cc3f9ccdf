use serde::{Deserialize, Serialize};

use super::{Client, InvoiceItem, InvoiceStatus};

/// The invoice being edited. Dates are kept as ISO `YYYY-MM-DD` strings,
/// exactly as they are serialized; they are parsed only at the formatting
/// and date-entry edges. `items` is never empty after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub number: String,
    pub date: String,
    pub due_date: String,
    pub status: InvoiceStatus,
    pub client: Option<Client>,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub notes: String,
}
