//! Canonical in-memory state for the invoice being edited and the company
//! profile. Every operation normalizes its input and produces a new, fully
//! valid state; nothing here ever returns an error. Malformed input
//! degrades to a safe default (zero, unchanged state, no-op) so the form
//! can feed raw keystrokes straight through.

use chrono::{Duration, Local, Utc};

use crate::models::{Client, CompanyInfo, Invoice, InvoiceItem, InvoiceStatus};

/// Scalar invoice fields addressable from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    Date,
    DueDate,
    Status,
    Discount,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Address,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Address,
    SubAddress,
    Phone,
}

/// Millisecond-clock id generator. Ids must be unique within an invoice at
/// creation time, so when the clock has not advanced since the last id the
/// value is bumped by one instead of reused.
pub struct IdSource {
    last: i64,
}

impl IdSource {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        self.last.to_string()
    }
}

/// Quantity entry: invalid or empty text becomes 0, like every numeric
/// field in the form.
fn coerce_quantity(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

/// Price/discount entry: invalid, non-finite, or negative text becomes 0.
fn coerce_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

pub struct InvoiceStore {
    invoice: Invoice,
    company: CompanyInfo,
    ids: IdSource,
}

impl InvoiceStore {
    /// First-run state: default company profile and a template invoice.
    pub fn with_defaults() -> Self {
        let mut ids = IdSource::new();
        let invoice = template(&mut ids);
        Self {
            invoice,
            company: CompanyInfo::default(),
            ids,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    /// Wholesale replacement, used by draft restore and "new invoice".
    pub fn replace_invoice(&mut self, invoice: Invoice) {
        self.invoice = invoice;
    }

    pub fn replace_company(&mut self, company: CompanyInfo) {
        self.company = company;
    }

    /// Fresh template invoice: new id, new display number, today's date,
    /// due in a week, one blank item, everything else zeroed.
    pub fn new_invoice_template(&mut self) -> Invoice {
        template(&mut self.ids)
    }

    pub fn set_field(&mut self, field: InvoiceField, raw: &str) {
        let mut next = self.invoice.clone();
        match field {
            InvoiceField::Date => next.date = raw.to_string(),
            InvoiceField::DueDate => next.due_date = raw.to_string(),
            InvoiceField::Status => next.status = InvoiceStatus::from_label(raw),
            InvoiceField::Discount => next.discount = coerce_amount(raw),
            InvoiceField::Notes => next.notes = raw.to_string(),
        }
        self.invoice = next;
    }

    /// Client edits create an empty client on first touch so the invoice is
    /// never left with a partially-absent client.
    pub fn set_client_field(&mut self, field: ClientField, raw: &str) {
        let mut next = self.invoice.clone();
        let client = next.client.get_or_insert_with(Client::default);
        match field {
            ClientField::Name => client.name = raw.to_string(),
            ClientField::Address => client.address = raw.to_string(),
            ClientField::Phone => client.phone = raw.to_string(),
        }
        self.invoice = next;
    }

    pub fn add_item(&mut self) {
        let mut next = self.invoice.clone();
        next.items.push(InvoiceItem::blank(self.ids.next_id()));
        self.invoice = next;
    }

    /// Unknown ids leave the invoice unchanged; there is nothing for the
    /// form to recover from.
    pub fn set_item_field(&mut self, item_id: &str, field: ItemField, raw: &str) {
        let mut next = self.invoice.clone();
        let Some(item) = next.items.iter_mut().find(|item| item.id == item_id) else {
            return;
        };
        match field {
            ItemField::Description => item.description = raw.to_string(),
            ItemField::Quantity => item.quantity = coerce_quantity(raw),
            ItemField::UnitPrice => item.unit_price = coerce_amount(raw),
        }
        self.invoice = next;
    }

    /// Removing the last remaining item is a no-op, not an error: the
    /// items list never goes empty.
    pub fn remove_item(&mut self, item_id: &str) {
        if self.invoice.items.len() <= 1 {
            return;
        }
        let mut next = self.invoice.clone();
        next.items.retain(|item| item.id != item_id);
        self.invoice = next;
    }

    pub fn set_company_field(&mut self, field: CompanyField, raw: &str) {
        let mut next = self.company.clone();
        match field {
            CompanyField::Name => next.name = raw.to_string(),
            CompanyField::Address => next.address = raw.to_string(),
            CompanyField::SubAddress => next.sub_address = raw.to_string(),
            CompanyField::Phone => next.phone = raw.to_string(),
        }
        self.company = next;
    }

    pub fn set_logo(&mut self, data_uri: String) {
        let mut next = self.company.clone();
        next.logo_url = Some(data_uri);
        self.company = next;
    }

    pub fn clear_logo(&mut self) {
        let mut next = self.company.clone();
        next.logo_url = None;
        self.company = next;
    }
}

fn template(ids: &mut IdSource) -> Invoice {
    let id = ids.next_id();
    // Short display number derived from the id's clock value, same scheme
    // the editor has always used. Not unique across sessions.
    let number = format!("INV-{}", id.parse::<i64>().unwrap_or(0) % 10_000);
    let today = Local::now().date_naive();
    let due = today + Duration::days(7);
    Invoice {
        id,
        number,
        date: today.format(crate::locale::ISO_DATE).to_string(),
        due_date: due.format(crate::locale::ISO_DATE).to_string(),
        status: InvoiceStatus::default(),
        client: Some(Client::default()),
        items: vec![InvoiceItem::blank(ids.next_id())],
        discount: 0.0,
        notes: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money;
    use std::collections::HashSet;

    #[test]
    fn template_has_one_blank_item_and_defaults() {
        let mut store = InvoiceStore::with_defaults();
        let invoice = store.new_invoice_template();
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].quantity, 1);
        assert_eq!(invoice.items[0].unit_price, 0.0);
        assert_eq!(invoice.discount, 0.0);
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.notes, "");
        assert_eq!(invoice.client, Some(Client::default()));
        assert!(invoice.number.starts_with("INV-"));
    }

    #[test]
    fn add_item_twice_yields_three_unique_items() {
        let mut store = InvoiceStore::with_defaults();
        store.add_item();
        store.add_item();

        let invoice = store.invoice();
        assert_eq!(invoice.items.len(), 3);
        let ids: HashSet<_> = invoice.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        for item in &invoice.items {
            assert_eq!(item.quantity, 1);
            assert_eq!(item.unit_price, 0.0);
        }
        assert_eq!(money::subtotal(invoice), 0.0);
    }

    #[test]
    fn remove_item_never_empties_the_list() {
        let mut store = InvoiceStore::with_defaults();
        let only_id = store.invoice().items[0].id.clone();
        store.remove_item(&only_id);
        assert_eq!(store.invoice().items.len(), 1);

        store.add_item();
        let second_id = store.invoice().items[1].id.clone();
        store.remove_item(&second_id);
        assert_eq!(store.invoice().items.len(), 1);
        assert_eq!(store.invoice().items[0].id, only_id);
    }

    #[test]
    fn numeric_entry_coerces_garbage_to_zero() {
        let mut store = InvoiceStore::with_defaults();
        let id = store.invoice().items[0].id.clone();

        store.set_item_field(&id, ItemField::Quantity, "3");
        store.set_item_field(&id, ItemField::UnitPrice, "12.5");
        assert_eq!(store.invoice().items[0].quantity, 3);
        assert_eq!(store.invoice().items[0].unit_price, 12.5);

        store.set_item_field(&id, ItemField::Quantity, "3x");
        store.set_item_field(&id, ItemField::UnitPrice, "");
        assert_eq!(store.invoice().items[0].quantity, 0);
        assert_eq!(store.invoice().items[0].unit_price, 0.0);

        store.set_field(InvoiceField::Discount, "-5");
        assert_eq!(store.invoice().discount, 0.0);
        store.set_field(InvoiceField::Discount, "NaN");
        assert_eq!(store.invoice().discount, 0.0);
    }

    #[test]
    fn unknown_item_id_leaves_invoice_unchanged() {
        let mut store = InvoiceStore::with_defaults();
        let before = store.invoice().clone();
        store.set_item_field("no-such-id", ItemField::UnitPrice, "100");
        assert_eq!(store.invoice(), &before);
    }

    #[test]
    fn client_edit_creates_client_when_absent() {
        let mut store = InvoiceStore::with_defaults();
        let mut invoice = store.invoice().clone();
        invoice.client = None;
        store.replace_invoice(invoice);

        store.set_client_field(ClientField::Phone, "01030530580");
        let client = store.invoice().client.as_ref().unwrap();
        assert_eq!(client.phone, "01030530580");
        assert_eq!(client.name, "");
        assert_eq!(client.address, "");
    }

    #[test]
    fn status_assignment_is_unrestricted() {
        let mut store = InvoiceStore::with_defaults();
        store.set_field(InvoiceField::Status, "مسددة");
        assert_eq!(store.invoice().status, InvoiceStatus::Paid);
        // Straight back to Draft, no transition rules.
        store.set_field(InvoiceField::Status, "مسودة");
        assert_eq!(store.invoice().status, InvoiceStatus::Draft);
    }

    #[test]
    fn id_source_is_strictly_increasing() {
        let mut ids = IdSource::new();
        let mut seen = HashSet::new();
        let mut prev = 0i64;
        for _ in 0..100 {
            let id = ids.next_id();
            let n: i64 = id.parse().unwrap();
            assert!(n > prev);
            prev = n;
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn new_invoice_keeps_company_untouched() {
        let mut store = InvoiceStore::with_defaults();
        store.set_company_field(CompanyField::Name, "معرض آخر");
        let fresh = store.new_invoice_template();
        store.replace_invoice(fresh);
        assert_eq!(store.company().name, "معرض آخر");
    }
}
