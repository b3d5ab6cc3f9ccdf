mod client;
mod company;
mod invoice;
mod invoice_item;
mod status;

pub use client::Client;
pub use company::CompanyInfo;
pub use invoice::Invoice;
pub use invoice_item::InvoiceItem;
pub use status::InvoiceStatus;
