use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Catalog category of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Staple,
    Dairy,
    Protein,
    Condiment,
    Produce,
    Others,
}

/// Unit an ingredient is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MeasurementUnit {
    Grams,
    Millilitres,
    Pieces,
}

/// An ingredient referenced either by catalog id or by exact name.
#[derive(Debug, Clone, Copy)]
pub enum IngredientRef<'a> {
    Id(i64),
    Name(&'a str),
}

impl fmt::Display for IngredientRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngredientRef::Id(id) => write!(f, "#{id}"),
            IngredientRef::Name(name) => f.write_str(name),
        }
    }
}

/// Attributes of a new catalog entry.
#[derive(Debug, Clone)]
pub struct IngredientInsertion {
    pub name: String,
    pub category: Category,
    pub unit_type: MeasurementUnit,
}

/// Per-user stock attributes of a new inventory row.
#[derive(Debug, Clone)]
pub struct InventoryInsertion {
    pub quantity: f64,
    pub minimum_threshold: f64,
    /// `YYYY-MM-DD`, e.g. "2025-01-01".
    pub expiration_date: Option<String>,
}

/// Catalog and stock attributes together, for the two-phase add where
/// the catalog entry is created lazily if the name is new.
#[derive(Debug, Clone)]
pub struct IngredientItemInsertion {
    pub name: String,
    pub category: Category,
    pub unit_type: MeasurementUnit,
    pub quantity: f64,
    pub minimum_threshold: f64,
    pub expiration_date: Option<String>,
}

impl IngredientItemInsertion {
    pub fn catalog(&self) -> IngredientInsertion {
        IngredientInsertion {
            name: self.name.clone(),
            category: self.category,
            unit_type: self.unit_type,
        }
    }

    pub fn stock(&self) -> InventoryInsertion {
        InventoryInsertion {
            quantity: self.quantity,
            minimum_threshold: self.minimum_threshold,
            expiration_date: self.expiration_date.clone(),
        }
    }
}

/// Sparse patch over an inventory row. A `None` field is left
/// untouched; for the nullable `expiration_date`, `Some(None)` clears
/// the stored date while `None` omits it from the update.
#[derive(Debug, Clone, Default)]
pub struct InventoryUpdate {
    pub quantity: Option<f64>,
    pub minimum_threshold: Option<f64>,
    pub expiration_date: Option<Option<String>>,
}

impl InventoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.minimum_threshold.is_none() && self.expiration_date.is_none()
    }
}

/// Composed record joining catalog attributes with one user's
/// inventory row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryItemDetails {
    pub ingredient_id: i64,
    pub inventory_id: i64,
    pub user_id: i64,
    pub name: String,
    pub category: Category,
    pub unit_type: MeasurementUnit,
    pub quantity: f64,
    pub minimum_threshold: f64,
    pub expiration_date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_serialize_lowercase() {
        let json = serde_json::to_string(&Category::Staple).unwrap();
        assert_eq!(json, "\"staple\"");
        let back: Category = serde_json::from_str("\"produce\"").unwrap();
        assert_eq!(back, Category::Produce);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(serde_json::from_str::<Category>("\"fruit\"").is_err());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(InventoryUpdate::default().is_empty());
        let patch = InventoryUpdate {
            quantity: Some(9.0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn clearing_expiration_counts_as_an_update() {
        let patch = InventoryUpdate {
            expiration_date: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
