use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use artisan_core::validate::{optional_text, required_text};
use artisan_core::{CategoryId, DomainResult, Entity};

/// A grouping of crafts (e.g. "Ceramics", "Textiles").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Category {
    pub fn from_new(id: CategoryId, new: NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&self, changes: CategoryChanges, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            description: match changes.description {
                Some(d) => d,
                None => self.description.clone(),
            },
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: Option<String>) -> DomainResult<Self> {
        Ok(Self {
            name: required_text("name", name)?,
            description: optional_text(description),
        })
    }
}

/// Partial update of a category; `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl CategoryChanges {
    pub fn new(name: Option<String>, description: Option<String>) -> DomainResult<Self> {
        let name = name.map(|n| required_text("name", n)).transpose()?;
        Ok(Self {
            name,
            description: description.map(|d| optional_text(Some(d))),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artisan_core::DomainError;

    #[test]
    fn name_is_required() {
        assert!(matches!(NewCategory::new("", None), Err(DomainError::Validation(_))));
        assert!(matches!(
            CategoryChanges::new(Some("  ".to_string()), None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn rename_keeps_description() {
        let now = Utc::now();
        let category = Category::from_new(
            CategoryId::new(2),
            NewCategory::new("Ceramics", Some("fired clay".to_string())).unwrap(),
            now,
        );
        let renamed = category.apply(CategoryChanges::new(Some("Pottery".to_string()), None).unwrap(), now);
        assert_eq!(renamed.name, "Pottery");
        assert_eq!(renamed.description.as_deref(), Some("fired clay"));
        assert_eq!(renamed.id, category.id);
    }
}
