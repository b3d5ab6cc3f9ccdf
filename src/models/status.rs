use serde::{Deserialize, Serialize};
use std::fmt;

/// Invoice status. Serialized as the Arabic labels the drafts have always
/// used. Any status may be assigned at any time; there is deliberately no
/// transition guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[default]
    #[serde(rename = "مسودة")]
    Draft,
    #[serde(rename = "مفتوحة")]
    Open,
    #[serde(rename = "مسددة")]
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Open,
        InvoiceStatus::Paid,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "مسودة",
            InvoiceStatus::Open => "مفتوحة",
            InvoiceStatus::Paid => "مسددة",
        }
    }

    /// Parse a label back into a status. Unknown text falls back to Draft
    /// rather than failing; the store never rejects input.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "مفتوحة" => InvoiceStatus::Open,
            "مسددة" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Draft,
        }
    }

    /// Following status in display order, wrapping around. Used by the
    /// status selector in the form.
    pub fn next(&self) -> Self {
        match self {
            InvoiceStatus::Draft => InvoiceStatus::Open,
            InvoiceStatus::Open => InvoiceStatus::Paid,
            InvoiceStatus::Paid => InvoiceStatus::Draft,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for status in InvoiceStatus::ALL {
            assert_eq!(InvoiceStatus::from_label(status.label()), status);
        }
    }

    #[test]
    fn unknown_label_falls_back_to_draft() {
        assert_eq!(InvoiceStatus::from_label("pending"), InvoiceStatus::Draft);
        assert_eq!(InvoiceStatus::from_label(""), InvoiceStatus::Draft);
    }

    #[test]
    fn serializes_as_arabic_label() {
        let json = serde_json::to_string(&InvoiceStatus::Paid).unwrap();
        assert_eq!(json, "\"مسددة\"");
        let back: InvoiceStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, InvoiceStatus::Paid);
    }
}
