//! Request-independent application services.
//!
//! Handlers stay thin: they parse input, call one method here, and shape the
//! response. bcrypt work is pushed onto the blocking pool.

use std::sync::Arc;

use chrono::Utc;

use artisan_auth::{
    Account, AccountChanges, Credentials, Hs256SessionTokens, IssuedToken, NewAccount,
    PasswordHash, PasswordHasher,
};
use artisan_catalog::{Category, CategoryChanges, Craft, CraftChanges, NewCategory, NewCraft};
use artisan_core::{AccountId, CategoryId, CraftId};
use artisan_core::validate::required_text;
use artisan_infra::{StoreError, Stores};

use crate::app::errors::ApiError;

/// A successful register/login: the account and its fresh session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: IssuedToken,
}

#[derive(Clone)]
pub struct AppServices {
    stores: Stores,
    tokens: Arc<Hs256SessionTokens>,
    hasher: Arc<PasswordHasher>,
}

impl AppServices {
    pub fn new(stores: Stores, tokens: Arc<Hs256SessionTokens>, hasher: Arc<PasswordHasher>) -> Self {
        Self {
            stores,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> Arc<Hs256SessionTokens> {
        self.tokens.clone()
    }

    // -------------------------
    // Accounts
    // -------------------------

    pub async fn register(&self, credentials: Credentials) -> Result<Session, ApiError> {
        let password_hash = self.hash(credentials.password().to_string()).await?;
        let account = self
            .stores
            .accounts
            .create(NewAccount {
                name: credentials.name().to_string(),
                phone: credentials.phone().to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        self.open_session(account)
    }

    /// Every failure (unknown login key, wrong password) yields the same
    /// `ApiError::Authentication`.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, ApiError> {
        let account = self
            .stores
            .accounts
            .find_by_login_key(credentials.name(), credentials.phone())
            .await?;

        let stored = account.as_ref().map(|a| a.password_hash.clone());
        let hasher = self.hasher.clone();
        let password = credentials.password().to_string();
        let verified = blocking(move || hasher.verify_login(&password, stored.as_ref())).await?;

        match account {
            Some(account) if verified => {
                tracing::info!(account_id = %account.id, "login succeeded");
                self.open_session(account)
            }
            _ => {
                tracing::info!("login rejected");
                Err(ApiError::Authentication)
            }
        }
    }

    pub async fn profile(&self, id: AccountId) -> Result<Account, ApiError> {
        self.stores
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("account"))
    }

    pub async fn update_profile(
        &self,
        id: AccountId,
        name: Option<String>,
        phone: Option<String>,
        password: Option<String>,
    ) -> Result<Account, ApiError> {
        let current = self.profile(id).await?;

        let name = name.map(|n| required_text("name", n)).transpose()?;
        let phone = phone.map(|p| required_text("phone", p)).transpose()?;
        let password_hash = match password {
            Some(p) => Some(self.hash(p).await?),
            None => None,
        };

        let changes = AccountChanges {
            name,
            phone,
            password_hash,
        };
        if changes.is_empty() {
            return Err(nothing_to_update());
        }

        let updated = current.apply(changes, Utc::now());
        self.stores.accounts.save(&updated).await?;
        tracing::info!(account_id = %id, "profile updated");
        Ok(updated)
    }

    pub async fn delete_profile(&self, id: AccountId) -> Result<(), ApiError> {
        let account = self.profile(id).await?;
        self.stores.accounts.delete(&account).await?;
        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }

    fn open_session(&self, account: Account) -> Result<Session, ApiError> {
        let token = self.tokens.issue(account.id, Utc::now())?;
        Ok(Session { account, token })
    }

    async fn hash(&self, plaintext: String) -> Result<PasswordHash, ApiError> {
        let hasher = self.hasher.clone();
        Ok(blocking(move || hasher.hash(&plaintext)).await??)
    }

    // -------------------------
    // Crafts
    // -------------------------

    pub async fn list_crafts(&self) -> Result<Vec<Craft>, ApiError> {
        Ok(self.stores.crafts.list().await?)
    }

    pub async fn get_craft(&self, id: CraftId) -> Result<Craft, ApiError> {
        self.stores
            .crafts
            .get(id)
            .await?
            .ok_or(ApiError::NotFound("craft"))
    }

    pub async fn create_craft(&self, new: NewCraft, by: AccountId) -> Result<Craft, ApiError> {
        let craft = self.stores.crafts.create(new).await?;
        tracing::info!(craft_id = %craft.id, account_id = %by, "craft created");
        Ok(craft)
    }

    pub async fn update_craft(&self, id: CraftId, changes: CraftChanges, by: AccountId) -> Result<Craft, ApiError> {
        if changes.is_empty() {
            return Err(nothing_to_update());
        }
        let updated = self.get_craft(id).await?.apply(changes, Utc::now());
        self.stores.crafts.save(&updated).await.map_err(|e| not_found_as(e, "craft"))?;
        tracing::info!(craft_id = %id, account_id = %by, "craft updated");
        Ok(updated)
    }

    pub async fn delete_craft(&self, id: CraftId, by: AccountId) -> Result<(), ApiError> {
        self.stores.crafts.delete(id).await.map_err(|e| not_found_as(e, "craft"))?;
        tracing::info!(craft_id = %id, account_id = %by, "craft deleted");
        Ok(())
    }

    // -------------------------
    // Categories
    // -------------------------

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.stores.categories.list().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.stores
            .categories
            .get(id)
            .await?
            .ok_or(ApiError::NotFound("category"))
    }

    pub async fn create_category(&self, new: NewCategory, by: AccountId) -> Result<Category, ApiError> {
        let category = self.stores.categories.create(new).await?;
        tracing::info!(category_id = %category.id, account_id = %by, "category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        changes: CategoryChanges,
        by: AccountId,
    ) -> Result<Category, ApiError> {
        if changes.is_empty() {
            return Err(nothing_to_update());
        }
        let updated = self.get_category(id).await?.apply(changes, Utc::now());
        self.stores
            .categories
            .save(&updated)
            .await
            .map_err(|e| not_found_as(e, "category"))?;
        tracing::info!(category_id = %id, account_id = %by, "category updated");
        Ok(updated)
    }

    pub async fn delete_category(&self, id: CategoryId, by: AccountId) -> Result<(), ApiError> {
        self.stores
            .categories
            .delete(id)
            .await
            .map_err(|e| not_found_as(e, "category"))?;
        tracing::info!(category_id = %id, account_id = %by, "category deleted");
        Ok(())
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("stores", &self.stores)
            .field("tokens", &self.tokens)
            .field("hasher", &self.hasher)
            .finish()
    }
}

fn nothing_to_update() -> ApiError {
    ApiError::Validation("request has no fields to update".to_string())
}

fn not_found_as(err: StoreError, what: &'static str) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound(what),
        other => other.into(),
    }
}

/// Run CPU-bound work (bcrypt) off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Persistence(format!("blocking task failed: {e}")))
}
