//! `artisan-catalog` — craft listings and their categories.

pub mod category;
pub mod craft;

pub use category::{Category, CategoryChanges, NewCategory};
pub use craft::{Craft, CraftChanges, MAX_PRICE, NewCraft};
