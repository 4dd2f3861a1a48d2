use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use artisan_core::validate::{optional_text, required_text};
use artisan_core::{CraftId, DomainError, DomainResult, Entity};

/// Largest accepted price; prices are stored as signed 64-bit integers.
pub const MAX_PRICE: u64 = i64::MAX as u64;

/// A craft offered on the marketplace.
///
/// `price` is in the smallest currency unit (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Craft {
    pub id: CraftId,
    pub title: String,
    pub description: Option<String>,
    pub price: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Craft {
    type Id = CraftId;

    fn id(&self) -> CraftId {
        self.id
    }
}

impl Craft {
    pub fn from_new(id: CraftId, new: NewCraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            price: new.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return the craft with `changes` applied; id and `created_at` are kept.
    pub fn apply(&self, changes: CraftChanges, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            description: match changes.description {
                Some(d) => d,
                None => self.description.clone(),
            },
            price: changes.price.unwrap_or(self.price),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// A validated craft that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCraft {
    pub title: String,
    pub description: Option<String>,
    pub price: u64,
}

impl NewCraft {
    pub fn new(title: impl Into<String>, description: Option<String>, price: u64) -> DomainResult<Self> {
        Ok(Self {
            title: required_text("title", title)?,
            description: optional_text(description),
            price: checked_price(price)?,
        })
    }
}

/// Validated partial update of a craft.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CraftChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<u64>,
}

impl CraftChanges {
    pub fn new(title: Option<String>, description: Option<String>, price: Option<u64>) -> DomainResult<Self> {
        let title = title.map(|t| required_text("title", t)).transpose()?;
        let price = price.map(checked_price).transpose()?;
        Ok(Self {
            title,
            description: description.map(|d| optional_text(Some(d))),
            price,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.price.is_none()
    }
}

fn checked_price(price: u64) -> DomainResult<u64> {
    if price > MAX_PRICE {
        return Err(DomainError::validation("price is out of range"));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_craft_requires_a_title() {
        assert!(matches!(NewCraft::new("   ", None, 100), Err(DomainError::Validation(_))));
        let craft = NewCraft::new(" Clay vase ", Some("  ".to_string()), 2500).unwrap();
        assert_eq!(craft.title, "Clay vase");
        assert_eq!(craft.description, None);
    }

    #[test]
    fn changes_update_only_given_fields() {
        let now = Utc::now();
        let craft = Craft::from_new(
            CraftId::new(1),
            NewCraft::new("Basket", Some("woven".to_string()), 1200).unwrap(),
            now,
        );
        let later = now + chrono::Duration::seconds(30);

        let changes = CraftChanges::new(None, None, Some(1500)).unwrap();
        let updated = craft.apply(changes, later);
        assert_eq!(updated.title, "Basket");
        assert_eq!(updated.description.as_deref(), Some("woven"));
        assert_eq!(updated.price, 1500);
        assert_eq!(updated.created_at, now);
        assert_eq!(updated.updated_at, later);

        let cleared = updated.apply(CraftChanges::new(None, Some(String::new()), None).unwrap(), later);
        assert_eq!(cleared.description, None);
    }

    #[test]
    fn oversized_price_is_rejected() {
        assert!(matches!(NewCraft::new("Rug", None, u64::MAX), Err(DomainError::Validation(_))));
        assert!(NewCraft::new("Rug", None, MAX_PRICE).is_ok());
    }

    #[test]
    fn blank_title_in_changes_is_rejected() {
        assert!(matches!(
            CraftChanges::new(Some(" ".to_string()), None, None),
            Err(DomainError::Validation(_))
        ));
        assert!(CraftChanges::default().is_empty());
    }

    #[test]
    fn serializes_flat_json() {
        let now = Utc::now();
        let craft = Craft::from_new(CraftId::new(3), NewCraft::new("Rug", None, 9900).unwrap(), now);
        let json = serde_json::to_value(&craft).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Rug");
        assert_eq!(json["price"], 9900);
        assert!(json["description"].is_null());
    }

    proptest! {
        #[test]
        fn apply_never_changes_identity(price in 0..=MAX_PRICE, title in "[a-zA-Z][a-zA-Z ]{0,11}") {
            let now = Utc::now();
            let craft = Craft::from_new(CraftId::new(9), NewCraft::new("Mask", None, 1).unwrap(), now);
            let changes = CraftChanges::new(Some(title.clone()), None, Some(price)).unwrap();
            let updated = craft.apply(changes, now);
            prop_assert_eq!(updated.id, craft.id);
            prop_assert_eq!(updated.created_at, craft.created_at);
            prop_assert_eq!(updated.price, price);
            prop_assert_eq!(updated.title, title.trim());
        }
    }
}
