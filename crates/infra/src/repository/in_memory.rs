//! In-memory stores for tests/dev.
//!
//! Identifiers start at 1 and increase monotonically per store; deleted ids are
//! never reused.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use artisan_auth::{Account, NewAccount};
use artisan_catalog::{Category, Craft, NewCategory, NewCraft};
use artisan_core::{AccountId, CategoryId, CraftId, Entity};

use super::{AccountStore, CategoryStore, CraftStore, StoreError, StoreResult};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove(&mut self, id: i64) -> StoreResult<()> {
        self.rows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

impl<T> Table<T>
where
    T: Entity,
    T::Id: Into<i64>,
{
    fn insert(&mut self, value: T) {
        self.rows.insert(value.id().into(), value);
    }

    fn replace(&mut self, value: T) -> StoreResult<()> {
        let id: i64 = value.id().into();
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

fn read<T>(lock: &RwLock<Table<T>>) -> StoreResult<RwLockReadGuard<'_, Table<T>>> {
    lock.read()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<Table<T>>) -> StoreResult<RwLockWriteGuard<'_, Table<T>>> {
    lock.write()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn login_key_taken(table: &Table<Account>, name: &str, phone: &str, except: Option<AccountId>) -> bool {
    table
        .rows
        .values()
        .any(|a| Some(a.id) != except && a.matches_login_key(name, phone))
}

#[derive(Debug)]
pub struct InMemoryAccountStore {
    inner: RwLock<Table<Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_login_key(&self, name: &str, phone: &str) -> StoreResult<Option<Account>> {
        let table = read(&self.inner)?;
        Ok(table
            .rows
            .values()
            .find(|a| a.matches_login_key(name, phone))
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let table = read(&self.inner)?;
        Ok(table.rows.get(&id.get()).cloned())
    }

    async fn create(&self, new: NewAccount) -> StoreResult<Account> {
        let mut table = write(&self.inner)?;
        if login_key_taken(&table, &new.name, &new.phone, None) {
            return Err(StoreError::Conflict("login key already registered".to_string()));
        }
        let id = AccountId::new(table.next_id());
        let account = Account::from_new(id, new, Utc::now());
        table.insert(account.clone());
        Ok(account)
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        let mut table = write(&self.inner)?;
        if login_key_taken(&table, &account.name, &account.phone, Some(account.id)) {
            return Err(StoreError::Conflict("login key already registered".to_string()));
        }
        table.replace(account.clone())
    }

    async fn delete(&self, account: &Account) -> StoreResult<()> {
        write(&self.inner)?.remove(account.id.get())
    }
}

#[derive(Debug)]
pub struct InMemoryCraftStore {
    inner: RwLock<Table<Craft>>,
}

impl InMemoryCraftStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryCraftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CraftStore for InMemoryCraftStore {
    async fn list(&self) -> StoreResult<Vec<Craft>> {
        Ok(read(&self.inner)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: CraftId) -> StoreResult<Option<Craft>> {
        Ok(read(&self.inner)?.rows.get(&id.get()).cloned())
    }

    async fn create(&self, new: NewCraft) -> StoreResult<Craft> {
        let mut table = write(&self.inner)?;
        let id = CraftId::new(table.next_id());
        let craft = Craft::from_new(id, new, Utc::now());
        table.insert(craft.clone());
        Ok(craft)
    }

    async fn save(&self, craft: &Craft) -> StoreResult<()> {
        write(&self.inner)?.replace(craft.clone())
    }

    async fn delete(&self, id: CraftId) -> StoreResult<()> {
        write(&self.inner)?.remove(id.get())
    }
}

#[derive(Debug)]
pub struct InMemoryCategoryStore {
    inner: RwLock<Table<Category>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryCategoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        Ok(read(&self.inner)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(read(&self.inner)?.rows.get(&id.get()).cloned())
    }

    async fn create(&self, new: NewCategory) -> StoreResult<Category> {
        let mut table = write(&self.inner)?;
        let id = CategoryId::new(table.next_id());
        let category = Category::from_new(id, new, Utc::now());
        table.insert(category.clone());
        Ok(category)
    }

    async fn save(&self, category: &Category) -> StoreResult<()> {
        write(&self.inner)?.replace(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> StoreResult<()> {
        write(&self.inner)?.remove(id.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artisan_auth::{AccountChanges, PasswordHash};
    use artisan_catalog::CraftChanges;

    fn new_account(name: &str, phone: &str) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            phone: phone.to_string(),
            password_hash: PasswordHash::from_stored("$2b$04$placeholder"),
        }
    }

    #[tokio::test]
    async fn accounts_get_increasing_ids_and_are_found_by_login_key() {
        let store = InMemoryAccountStore::new();
        let ana = store.create(new_account("Ana", "555")).await.unwrap();
        let luis = store.create(new_account("Luis", "777")).await.unwrap();

        assert_eq!(ana.id, AccountId::new(1));
        assert_eq!(luis.id, AccountId::new(2));
        assert_eq!(store.find_by_login_key("Ana", "555").await.unwrap(), Some(ana.clone()));
        assert_eq!(store.find_by_login_key("Ana", "777").await.unwrap(), None);
        assert_eq!(store.find_by_id(luis.id).await.unwrap(), Some(luis));
    }

    #[tokio::test]
    async fn duplicate_login_key_is_a_conflict() {
        let store = InMemoryAccountStore::new();
        store.create(new_account("Ana", "555")).await.unwrap();
        let err = store.create(new_account("Ana", "555")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Same name with another phone is a different login key.
        assert!(store.create(new_account("Ana", "556")).await.is_ok());
    }

    #[tokio::test]
    async fn save_rejects_taking_another_accounts_login_key() {
        let store = InMemoryAccountStore::new();
        store.create(new_account("Ana", "555")).await.unwrap();
        let luis = store.create(new_account("Luis", "777")).await.unwrap();

        let clash = luis.apply(
            AccountChanges {
                name: Some("Ana".to_string()),
                phone: Some("555".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(matches!(store.save(&clash).await, Err(StoreError::Conflict(_))));

        // Saving an account under its own unchanged key is fine.
        assert!(store.save(&luis).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_accounts_are_gone_and_ids_are_not_reused() {
        let store = InMemoryAccountStore::new();
        let ana = store.create(new_account("Ana", "555")).await.unwrap();
        store.delete(&ana).await.unwrap();

        assert_eq!(store.find_by_id(ana.id).await.unwrap(), None);
        assert_eq!(store.delete(&ana).await, Err(StoreError::NotFound));

        let next = store.create(new_account("Ana", "555")).await.unwrap();
        assert_eq!(next.id, AccountId::new(2));
    }

    #[tokio::test]
    async fn craft_lifecycle() {
        let store = InMemoryCraftStore::new();
        let vase = store
            .create(NewCraft::new("Vase", None, 2500).unwrap())
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        let updated = vase.apply(CraftChanges::new(None, None, Some(3000)).unwrap(), Utc::now());
        store.save(&updated).await.unwrap();
        assert_eq!(store.get(vase.id).await.unwrap().map(|c| c.price), Some(3000));

        store.delete(vase.id).await.unwrap();
        assert_eq!(store.get(vase.id).await.unwrap(), None);
        assert_eq!(store.save(&updated).await, Err(StoreError::NotFound));
        assert_eq!(store.delete(vase.id).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn categories_list_in_id_order() {
        let store = InMemoryCategoryStore::new();
        for name in ["Textiles", "Ceramics", "Woodwork"] {
            store.create(NewCategory::new(name, None).unwrap()).await.unwrap();
        }
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Textiles", "Ceramics", "Woodwork"]);
    }
}
