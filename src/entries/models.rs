//! Data models for income/expense entries

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::gateway::types::StrictDecimal;
use crate::voucher::data_uri;

/// Direction of an entry, stored as `'income'` / `'expense'`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    pub fn parse(v: &str) -> Option<Self> {
        match v {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

/// Entry row without the voucher blob
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub activity: String,
    pub code: Option<String>,
    pub amount: Decimal,
    pub has_voucher: bool,
}

/// Listing view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub activity: String,
    pub code: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub has_voucher: bool,
}

impl From<Entry> for EntrySummary {
    fn from(e: Entry) -> Self {
        Self {
            id: e.id,
            account_id: e.account_id,
            date: e.date,
            kind: e.kind,
            activity: e.activity,
            code: e.code,
            amount: e.amount,
            has_voucher: e.has_voucher,
        }
    }
}

/// Single-entry view with the voucher inlined as a data URI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: EntrySummary,
    pub voucher: Option<String>,
}

impl EntryDetail {
    pub fn new(entry: Entry, voucher: Option<Vec<u8>>) -> Self {
        Self {
            entry: entry.into(),
            voucher: voucher
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| data_uri(&bytes)),
        }
    }
}

/// POST /api/entries
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    /// Owner; defaults to the caller
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub kind: EntryKind,
    #[validate(length(min = 1, max = 255))]
    pub activity: String,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub amount: StrictDecimal,
    /// Base64 (standard alphabet), with or without a `data:` prefix
    pub voucher: Option<String>,
}

/// PATCH /api/entries/{id}; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    #[validate(length(min = 1, max = 255))]
    pub activity: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub amount: Option<StrictDecimal>,
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub account_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub activity: String,
    pub code: Option<String>,
    pub amount: Decimal,
    pub voucher: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry {
            id: 4,
            account_id: 2,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            kind: EntryKind::Expense,
            activity: "Printer paper".to_string(),
            code: None,
            amount: Decimal::new(4590, 2),
            has_voucher: true,
        }
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(EntryKind::parse("income"), Some(EntryKind::Income));
        assert_eq!(EntryKind::parse("expense"), Some(EntryKind::Expense));
        assert_eq!(EntryKind::parse("Ingreso"), None);
        assert_eq!(EntryKind::Expense.as_str(), "expense");
    }

    #[test]
    fn test_detail_json() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let json = serde_json::to_value(EntryDetail::new(entry(), Some(png))).unwrap();

        assert_eq!(json["id"], 4);
        assert_eq!(json["kind"], "expense");
        assert_eq!(json["amount"], "45.90");
        assert_eq!(json["date"], "2025-03-14");
        assert!(
            json["voucher"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn test_detail_without_voucher() {
        let json = serde_json::to_value(EntryDetail::new(entry(), Some(vec![]))).unwrap();
        assert!(json["voucher"].is_null());
    }

    #[test]
    fn test_create_request_rejects_bad_kind() {
        let body = r#"{"date":"2025-01-01","kind":"transfer","activity":"x","amount":"1"}"#;
        assert!(serde_json::from_str::<CreateEntryRequest>(body).is_err());
    }

    #[test]
    fn test_create_request_validates_activity() {
        let body = r#"{"date":"2025-01-01","kind":"income","activity":"","amount":"10.00"}"#;
        let req: CreateEntryRequest = serde_json::from_str(body).unwrap();
        assert!(req.validate().is_err());
    }
}
