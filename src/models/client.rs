use serde::{Deserialize, Serialize};

/// Recipient of the invoice. All fields are free text; empty strings are
/// treated as "not provided" by the preview, which matches the serialized
/// form the editor has always written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}
