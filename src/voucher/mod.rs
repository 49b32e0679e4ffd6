//! Receipt attachments on entries.
//!
//! Bytes are stored untyped; the content type is sniffed on every read and
//! used both for the inline data URI and the raw download.

pub mod handlers;
pub mod sniff;
pub mod store;

pub use sniff::{FALLBACK_MIME, data_uri, sniff_mime};
pub use store::{PgVoucherStore, VoucherLookup, VoucherStore};
