//! Repository interfaces for accounts, crafts and categories.
//!
//! Handlers depend only on these traits; [`Stores`] bundles one implementation
//! of each, chosen at startup.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use artisan_auth::{Account, NewAccount};
use artisan_catalog::{Category, Craft, NewCategory, NewCraft};
use artisan_core::{AccountId, CategoryId, CraftId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAccountStore, InMemoryCategoryStore, InMemoryCraftStore};
pub use postgres::{PostgresAccountStore, PostgresCategoryStore, PostgresCraftStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Backend(String),
}

/// Account persistence. Implementations guarantee identifier uniqueness,
/// login-key uniqueness, and that writes are durable before returning.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_login_key(&self, name: &str, phone: &str) -> StoreResult<Option<Account>>;

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Insert a new account and assign its identifier.
    /// Fails with `Conflict` when the login key is taken.
    async fn create(&self, new: NewAccount) -> StoreResult<Account>;

    /// Overwrite an existing account. Fails with `NotFound` or `Conflict`.
    async fn save(&self, account: &Account) -> StoreResult<()>;

    async fn delete(&self, account: &Account) -> StoreResult<()>;
}

#[async_trait]
pub trait CraftStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Craft>>;

    async fn get(&self, id: CraftId) -> StoreResult<Option<Craft>>;

    async fn create(&self, new: NewCraft) -> StoreResult<Craft>;

    async fn save(&self, craft: &Craft) -> StoreResult<()>;

    async fn delete(&self, id: CraftId) -> StoreResult<()>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Category>>;

    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    async fn create(&self, new: NewCategory) -> StoreResult<Category>;

    async fn save(&self, category: &Category) -> StoreResult<()>;

    async fn delete(&self, id: CategoryId) -> StoreResult<()>;
}

/// One store per record type, shared by all request handlers.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub crafts: Arc<dyn CraftStore>,
    pub categories: Arc<dyn CategoryStore>,
}

impl Stores {
    /// In-memory stores (dev/test). Contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountStore::new()),
            crafts: Arc::new(InMemoryCraftStore::new()),
            categories: Arc::new(InMemoryCategoryStore::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one connection pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            accounts: Arc::new(PostgresAccountStore::new(pool.clone())),
            crafts: Arc::new(PostgresCraftStore::new(pool.clone())),
            categories: Arc::new(PostgresCategoryStore::new(pool)),
        }
    }
}

impl core::fmt::Debug for Stores {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
