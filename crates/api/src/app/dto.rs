use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use artisan_auth::Account;
use artisan_core::AccountId;

// -------------------------
// Request DTOs
// -------------------------

/// Body of both `register` and `login`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsRequest {
    pub name: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCraftRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCraftRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Public view of an account. The password hash has no field here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountView {
    pub id: AccountId,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            phone: account.phone.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Returned by `register` and `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub account: AccountView,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artisan_auth::{NewAccount, PasswordHash};

    #[test]
    fn account_view_never_carries_the_hash() {
        let account = Account::from_new(
            AccountId::new(3),
            NewAccount {
                name: "Ana".to_string(),
                phone: "555".to_string(),
                password_hash: PasswordHash::from_stored("$2b$04$secret-hash-value"),
            },
            Utc::now(),
        );
        let json = serde_json::to_value(AccountView::from(&account)).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Ana");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("secret-hash-value"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<CredentialsRequest>(
            r#"{"name":"Ana","phone":"555","password":"pw1","role":"admin"}"#,
        );
        assert!(err.is_err());
        assert!(serde_json::from_str::<UpdateProfileRequest>(r#"{}"#).is_ok());
    }
}
