//! Draft persistence. The invoice and the company profile are serialized
//! as JSON under two fixed keys in an opaque key-value store. Restore is
//! best-effort: a missing or corrupt key keeps the in-memory default and
//! the session continues.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::models::{CompanyInfo, Invoice};

/// Key holding the serialized invoice draft.
pub const INVOICE_KEY: &str = "thebaz_invoice_draft";
/// Key holding the serialized company profile.
pub const COMPANY_KEY: &str = "thebaz_company_info";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("تعذر تجهيز بيانات الحفظ: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("تعذر الوصول إلى ذاكرة الحفظ: {0}")]
    Backend(#[from] io::Error),
}

/// The persistence medium. Two implementations exist: files on disk for
/// the application, an in-memory map for tests.
#[async_trait]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> io::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> io::Result<()>;
    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// One UTF-8 file per key under the data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        tokio::fs::write(self.path_for(key), value).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// What `restore_draft` recovered. `None` means the key was absent or its
/// value did not parse; the caller keeps its default in either case.
#[derive(Debug, Default)]
pub struct RestoredDraft {
    pub invoice: Option<Invoice>,
    pub company: Option<CompanyInfo>,
}

pub struct DraftStore<S> {
    store: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serialize both records under their fixed keys. Failures are returned
    /// for the caller to surface as a notice; in-memory state is untouched.
    pub async fn save_draft(
        &self,
        invoice: &Invoice,
        company: &CompanyInfo,
    ) -> Result<(), DraftError> {
        let invoice_json = serde_json::to_string(invoice)?;
        let company_json = serde_json::to_string(company)?;
        self.store.set(INVOICE_KEY, &invoice_json).await?;
        self.store.set(COMPANY_KEY, &company_json).await?;
        Ok(())
    }

    /// Read back whatever survives from the previous session. Never fails:
    /// each key is applied independently, and a value that does not parse
    /// is logged and treated as absent rather than half-applied.
    pub async fn restore_draft(&self) -> RestoredDraft {
        let invoice = match self.read_key::<Invoice>(INVOICE_KEY).await {
            // No invoice this editor wrote has an empty item list; a draft
            // without lines is corrupt, not restorable.
            Some(invoice) if invoice.items.is_empty() => {
                warn!("stored draft has no items, keeping defaults");
                None
            }
            other => other,
        };
        RestoredDraft {
            invoice,
            company: self.read_key(COMPANY_KEY).await,
        }
    }

    async fn read_key<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(key, %err, "draft read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "stored draft did not parse, keeping defaults");
                None
            }
        }
    }

    /// Drop the persisted invoice only. The company profile outlives every
    /// "new invoice" command.
    pub async fn clear_draft(&self) -> Result<(), DraftError> {
        self.store.remove(INVOICE_KEY).await?;
        Ok(())
    }
}

pub async fn init(config: &Config) -> Result<DraftStore<FileStore>> {
    let store = FileStore::open(&config.data_dir()).await?;
    Ok(DraftStore::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, InvoiceItem, InvoiceStatus};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the key-value medium.
    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> io::Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> io::Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> io::Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn sample_invoice() -> Invoice {
        Invoice {
            id: "1754000000000".to_string(),
            number: "INV-042".to_string(),
            date: "2026-08-06".to_string(),
            due_date: "2026-08-13".to_string(),
            status: InvoiceStatus::Open,
            client: Some(Client {
                name: "أحمد".to_string(),
                address: "المنصورة".to_string(),
                phone: "01030530580".to_string(),
            }),
            items: vec![InvoiceItem {
                id: "1754000000001".to_string(),
                description: "كنبة".to_string(),
                quantity: 3,
                unit_price: 100.0,
            }],
            discount: 50.0,
            notes: "تسليم خلال أسبوع".to_string(),
        }
    }

    #[tokio::test]
    async fn save_then_restore_round_trips() {
        let drafts = DraftStore::new(MemoryStore::default());
        let invoice = sample_invoice();
        let company = CompanyInfo::default();

        drafts.save_draft(&invoice, &company).await.unwrap();
        let restored = drafts.restore_draft().await;

        assert_eq!(restored.invoice.unwrap(), invoice);
        assert_eq!(restored.company.unwrap(), company);
    }

    #[tokio::test]
    async fn wire_format_keeps_camel_case_field_names() {
        let drafts = DraftStore::new(MemoryStore::default());
        drafts
            .save_draft(&sample_invoice(), &CompanyInfo::default())
            .await
            .unwrap();

        let raw = drafts.store.get(INVOICE_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"dueDate\""));
        assert!(raw.contains("\"unitPrice\""));
        assert!(raw.contains("\"مفتوحة\""));

        let raw = drafts.store.get(COMPANY_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"logoUrl\""));
        assert!(raw.contains("\"subAddress\""));
    }

    #[tokio::test]
    async fn restore_with_nothing_stored_yields_no_overrides() {
        let drafts = DraftStore::new(MemoryStore::default());
        let restored = drafts.restore_draft().await;
        assert!(restored.invoice.is_none());
        assert!(restored.company.is_none());
    }

    #[tokio::test]
    async fn corrupt_key_is_skipped_without_touching_the_other() {
        let drafts = DraftStore::new(MemoryStore::default());
        drafts
            .save_draft(&sample_invoice(), &CompanyInfo::default())
            .await
            .unwrap();
        drafts
            .store
            .set(INVOICE_KEY, "{not json at all")
            .await
            .unwrap();

        let restored = drafts.restore_draft().await;
        assert!(restored.invoice.is_none());
        assert!(restored.company.is_some());
    }

    #[tokio::test]
    async fn draft_without_items_is_treated_as_corrupt() {
        let drafts = DraftStore::new(MemoryStore::default());
        let mut invoice = sample_invoice();
        invoice.items.clear();
        let raw = serde_json::to_string(&invoice).unwrap();
        drafts.store.set(INVOICE_KEY, &raw).await.unwrap();

        let restored = drafts.restore_draft().await;
        assert!(restored.invoice.is_none());
    }

    #[tokio::test]
    async fn clear_draft_leaves_company_behind() {
        let drafts = DraftStore::new(MemoryStore::default());
        drafts
            .save_draft(&sample_invoice(), &CompanyInfo::default())
            .await
            .unwrap();

        drafts.clear_draft().await.unwrap();

        let restored = drafts.restore_draft().await;
        assert!(restored.invoice.is_none());
        assert!(restored.company.is_some());
    }
}
