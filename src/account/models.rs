//! Data models for user account management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account lifecycle status, stored as `'active'` / `'inactive'`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

impl From<&str> for AccountStatus {
    fn from(v: &str) -> Self {
        match v {
            "active" => AccountStatus::Active,
            // unknown values must never grant login
            _ => AccountStatus::Inactive,
        }
    }
}

/// User account, joined with its role name
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
    pub role_name: String,
    pub status: AccountStatus,
    pub committee_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn can_login(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
    pub committee_id: Option<i32>,
}

/// Public view of an account (no password hash)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: i32,
    pub role: String,
    pub status: AccountStatus,
    pub committee_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            email: a.email.clone(),
            role_id: a.role_id,
            role: a.role_name.clone(),
            status: a.status,
            committee_id: a.committee_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: AccountStatus) -> Account {
        Account {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            role_id: 1,
            role_name: "admin".to_string(),
            status,
            committee_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(AccountStatus::from("active"), AccountStatus::Active);
        assert_eq!(AccountStatus::from("inactive"), AccountStatus::Inactive);
        assert_eq!(AccountStatus::from("ACTIVE"), AccountStatus::Inactive);
        assert_eq!(AccountStatus::from(""), AccountStatus::Inactive);
    }

    #[test]
    fn test_can_login() {
        assert!(sample(AccountStatus::Active).can_login());
        assert!(!sample(AccountStatus::Inactive).can_login());
    }

    #[test]
    fn test_view_omits_password_hash() {
        let account = sample(AccountStatus::Active);
        let json = serde_json::to_value(AccountView::from(&account)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["status"], "active");
        assert_eq!(json["roleId"], 1);
        assert_eq!(account.display_name(), "Ana Quispe");
    }
}
