//! Account records.
//!
//! An account is looked up at login by its login key, the `(name, phone)`
//! pair. The stored credential is always a [`PasswordHash`]; plaintext never
//! reaches a record.

use chrono::{DateTime, Utc};

use artisan_core::validate::required_text;
use artisan_core::{AccountId, DomainError, DomainResult, Entity};

use crate::password::{MAX_PASSWORD_BYTES, PasswordHash};

/// A registered account as held by the account store.
///
/// # Invariants
/// - `id` is assigned by the store and never changes.
/// - `password_hash` is a salted bcrypt hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub phone: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

impl Account {
    /// Build the record a store persists for a freshly registered account.
    pub fn from_new(id: AccountId, new: NewAccount, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            phone: new.phone,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when this account is the one addressed by the given login key.
    pub fn matches_login_key(&self, name: &str, phone: &str) -> bool {
        self.name == name && self.phone == phone
    }

    /// Return the account with `changes` applied. Identity and creation time
    /// are preserved.
    pub fn apply(&self, changes: AccountChanges, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            phone: changes.phone.unwrap_or_else(|| self.phone.clone()),
            password_hash: changes
                .password_hash
                .unwrap_or_else(|| self.password_hash.clone()),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// Fields of an account that does not have an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub phone: String,
    pub password_hash: PasswordHash,
}

/// Partial profile update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<PasswordHash>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.password_hash.is_none()
    }
}

/// Validated registration / login input.
///
/// Name and phone are trimmed; the password is kept exactly as supplied and
/// must fit bcrypt's input limit.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    name: String,
    phone: String,
    password: String,
}

impl Credentials {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = required_text("name", name)?;
        let phone = required_text("phone", phone)?;
        let password = password.into();
        if password.is_empty() {
            return Err(DomainError::validation("password is required"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(DomainError::validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }
        Ok(Self { name, phone, password })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Account {
        Account::from_new(
            AccountId::new(1),
            NewAccount {
                name: "Ana".to_string(),
                phone: "555".to_string(),
                password_hash: PasswordHash::from_stored("$2b$04$stored"),
            },
            now,
        )
    }

    #[test]
    fn credentials_trim_identity_fields_but_not_password() {
        let creds = Credentials::new("  Ana ", " 555", " pw1 ").unwrap();
        assert_eq!(creds.name(), "Ana");
        assert_eq!(creds.phone(), "555");
        assert_eq!(creds.password(), " pw1 ");
    }

    #[test]
    fn credentials_reject_missing_fields() {
        assert!(matches!(Credentials::new("", "555", "pw"), Err(DomainError::Validation(_))));
        assert!(matches!(Credentials::new("Ana", "   ", "pw"), Err(DomainError::Validation(_))));
        assert!(matches!(Credentials::new("Ana", "555", ""), Err(DomainError::Validation(_))));
    }

    #[test]
    fn credentials_reject_passwords_bcrypt_would_truncate() {
        let at_limit = "p".repeat(MAX_PASSWORD_BYTES);
        assert!(Credentials::new("Ana", "555", at_limit.clone()).is_ok());
        assert!(matches!(
            Credentials::new("Ana", "555", format!("{at_limit}-real")),
            Err(DomainError::Validation(_))
        ));

        // The limit is in bytes: 37 two-byte characters are 74 bytes.
        assert!(matches!(
            Credentials::new("Ana", "555", "ñ".repeat(37)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("Ana", "555", "hunter2").unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn apply_keeps_identity_and_creation_time() {
        let created = Utc::now();
        let account = sample(created);
        let later = created + chrono::Duration::minutes(5);

        let updated = account.apply(
            AccountChanges {
                name: Some("Ana María".to_string()),
                ..Default::default()
            },
            later,
        );

        assert_eq!(updated.id, account.id);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.name, "Ana María");
        assert_eq!(updated.phone, "555");
        assert_eq!(updated.password_hash, account.password_hash);
        assert!(updated.matches_login_key("Ana María", "555"));
        assert!(!updated.matches_login_key("Ana", "555"));
    }
}
