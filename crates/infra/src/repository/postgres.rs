//! PostgreSQL-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | `StoreError` |
//! |------------|-----------------|--------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Backend` |
//! | PoolClosed, Io, Tls, ... | n/a | `Backend` |
//!
//! An `UPDATE` or `DELETE` touching zero rows is reported as `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use artisan_auth::{Account, NewAccount, PasswordHash};
use artisan_catalog::{Category, Craft, NewCategory, NewCraft};
use artisan_core::{AccountId, CategoryId, CraftId};

use super::{AccountStore, CategoryStore, CraftStore, StoreError, StoreResult};

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn price_to_db(price: u64) -> StoreResult<i64> {
    i64::try_from(price).map_err(|_| StoreError::Backend("price exceeds BIGINT range".to_string()))
}

fn price_from_db(price: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(price).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

// SQLx row types

#[derive(Debug)]
struct AccountRow {
    id: i64,
    name: String,
    phone: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::new(row.id),
            name: row.name,
            phone: row.phone,
            password_hash: PasswordHash::from_stored(row.password_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct CraftRow {
    id: i64,
    title: String,
    description: Option<String>,
    price: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CraftRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CraftRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: price_from_db(row.try_get("price")?)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<CraftRow> for Craft {
    fn from(row: CraftRow) -> Self {
        Craft {
            id: CraftId::new(row.id),
            title: row.title,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode<R>(operation: &str, row: &PgRow) -> StoreResult<R>
where
    R: for<'r> sqlx::FromRow<'r, PgRow>,
{
    R::from_row(row).map_err(|e| StoreError::Backend(format!("failed to decode row in {operation}: {e}")))
}

fn expect_one_row(operation: &str, rows_affected: u64) -> StoreResult<()> {
    match rows_affected {
        0 => Err(StoreError::NotFound),
        1 => Ok(()),
        n => Err(StoreError::Backend(format!("{operation} touched {n} rows"))),
    }
}

/// Account store over the `accounts` table.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, phone), err)]
    async fn find_by_login_key(&self, name: &str, phone: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, password_hash, created_at, updated_at
            FROM accounts
            WHERE name = $1 AND phone = $2
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_login_key", e))?;

        row.map(|r| decode::<AccountRow>("find_by_login_key", &r).map(Account::from))
            .transpose()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, phone, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account", e))?;

        row.map(|r| decode::<AccountRow>("find_account", &r).map(Account::from))
            .transpose()
    }

    #[instrument(skip_all, err)]
    async fn create(&self, new: NewAccount) -> StoreResult<Account> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (name, phone, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, name, phone, password_hash, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.phone)
        .bind(new.password_hash.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        decode::<AccountRow>("create_account", &row).map(Account::from)
    }

    #[instrument(skip_all, fields(account_id = %account.id), err)]
    async fn save(&self, account: &Account) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2, phone = $3, password_hash = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(account.id.get())
        .bind(&account.name)
        .bind(&account.phone)
        .bind(account.password_hash.as_str())
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_account", e))?;

        expect_one_row("save_account", result.rows_affected())
    }

    #[instrument(skip_all, fields(account_id = %account.id), err)]
    async fn delete(&self, account: &Account) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account.id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account", e))?;

        expect_one_row("delete_account", result.rows_affected())
    }
}

/// Craft store over the `crafts` table.
#[derive(Debug, Clone)]
pub struct PostgresCraftStore {
    pool: PgPool,
}

impl PostgresCraftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CraftStore for PostgresCraftStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Craft>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, price, created_at, updated_at
            FROM crafts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_crafts", e))?;

        rows.iter()
            .map(|r| decode::<CraftRow>("list_crafts", r).map(Craft::from))
            .collect()
    }

    #[instrument(skip(self), fields(craft_id = %id), err)]
    async fn get(&self, id: CraftId) -> StoreResult<Option<Craft>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, price, created_at, updated_at
            FROM crafts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_craft", e))?;

        row.map(|r| decode::<CraftRow>("get_craft", &r).map(Craft::from))
            .transpose()
    }

    #[instrument(skip_all, err)]
    async fn create(&self, new: NewCraft) -> StoreResult<Craft> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO crafts (title, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, title, description, price, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(price_to_db(new.price)?)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_craft", e))?;

        decode::<CraftRow>("create_craft", &row).map(Craft::from)
    }

    #[instrument(skip_all, fields(craft_id = %craft.id), err)]
    async fn save(&self, craft: &Craft) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE crafts
            SET title = $2, description = $3, price = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(craft.id.get())
        .bind(&craft.title)
        .bind(&craft.description)
        .bind(price_to_db(craft.price)?)
        .bind(craft.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_craft", e))?;

        expect_one_row("save_craft", result.rows_affected())
    }

    #[instrument(skip(self), fields(craft_id = %id), err)]
    async fn delete(&self, id: CraftId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM crafts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_craft", e))?;

        expect_one_row("delete_craft", result.rows_affected())
    }
}

/// Category store over the `categories` table.
#[derive(Debug, Clone)]
pub struct PostgresCategoryStore {
    pool: PgPool,
}

impl PostgresCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PostgresCategoryStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter()
            .map(|r| decode::<CategoryRow>("list_categories", r).map(Category::from))
            .collect()
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_category", e))?;

        row.map(|r| decode::<CategoryRow>("get_category", &r).map(Category::from))
            .transpose()
    }

    #[instrument(skip_all, err)]
    async fn create(&self, new: NewCategory) -> StoreResult<Category> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_category", e))?;

        decode::<CategoryRow>("create_category", &row).map(Category::from)
    }

    #[instrument(skip_all, fields(category_id = %category.id), err)]
    async fn save(&self, category: &Category) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(category.id.get())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_category", e))?;

        expect_one_row("save_category", result.rows_affected())
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;

        expect_one_row("delete_category", result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_affected_is_not_found() {
        assert_eq!(expect_one_row("save_craft", 0), Err(StoreError::NotFound));
        assert_eq!(expect_one_row("save_craft", 1), Ok(()));
        assert!(matches!(expect_one_row("save_craft", 2), Err(StoreError::Backend(_))));
    }

    #[test]
    fn non_database_errors_are_backend_errors() {
        let err = map_sqlx_error("list_crafts", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("list_crafts")));
    }

    #[test]
    fn negative_stored_price_fails_to_decode() {
        assert!(price_from_db(-1).is_err());
        assert_eq!(price_from_db(2500).ok(), Some(2500));
        assert!(price_to_db(u64::MAX).is_err());
    }
}
