use serde::{Deserialize, Serialize};

/// Issuing company profile. Longer-lived than any single invoice: "new
/// invoice" never resets it, only an explicit edit or draft restore does.
///
/// The logo is carried as an inline `data:` URI so the preview and the PDF
/// renderer never need a network fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub address: String,
    pub sub_address: String,
    pub phone: String,
}

// Showroom logo shipped as an inline SVG so a fresh install renders a
// complete header without any asset files.
const DEFAULT_LOGO_SVG: &str = "data:image/svg+xml;charset=utf-8,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20viewBox%3D%220%200%20400%20160%22%3E%3Cstyle%3Etext%7Bfont-family%3Asans-serif%3Bfont-weight%3A800%3Btext-anchor%3Amiddle%3Bfill%3Ablack%7D%3C%2Fstyle%3E%3Ctext%20x%3D%22200%22%20y%3D%2260%22%20font-size%3D%2250%22%20letter-spacing%3D%224%22%3ETHEBAZ%3C%2Ftext%3E%3Ctext%20x%3D%22200%22%20y%3D%22120%22%20font-size%3D%2250%22%20letter-spacing%3D%224%22%3ESHOWROOM%3C%2Ftext%3E%3C%2Fsvg%3E";

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: "THEBAZ SHOWROOM".to_string(),
            logo_url: Some(DEFAULT_LOGO_SVG.to_string()),
            address: "المنصورة، شارع سامية الجمل".to_string(),
            sub_address: "أول الشارع أمام رفعت علام، أول الإشارة".to_string(),
            phone: "01030530580".to_string(),
        }
    }
}
