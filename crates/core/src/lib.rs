//! `artisan-core` — shared domain building blocks.
//!
//! Identifiers, the domain error model and the `Entity` trait. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod validate;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, CategoryId, CraftId};
