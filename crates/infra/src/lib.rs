//! Infrastructure layer: record stores and database wiring.

pub mod db;
pub mod repository;

pub use repository::{
    AccountStore, CategoryStore, CraftStore, StoreError, StoreResult, Stores,
};
