use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::ApiError;

use super::repo_types::{Category, IngredientItemInsertion, InventoryUpdate, MeasurementUnit};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AddIngredientRequest {
    pub name: String,
    pub category: Category,
    pub unit_type: MeasurementUnit,
    pub quantity: f64,
    pub minimum_threshold: f64,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

impl AddIngredientRequest {
    pub fn validate(self) -> Result<IngredientItemInsertion, ApiError> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LEN {
            return Err(ApiError::UnprocessableEntity(format!(
                "name must be between 1 and {MAX_NAME_LEN} characters"
            )));
        }
        check_non_negative("quantity", self.quantity)?;
        check_non_negative("minimum_threshold", self.minimum_threshold)?;
        if let Some(date) = &self.expiration_date {
            check_date(date)?;
        }
        Ok(IngredientItemInsertion {
            name: self.name,
            category: self.category,
            unit_type: self.unit_type,
            quantity: self.quantity,
            minimum_threshold: self.minimum_threshold,
            expiration_date: self.expiration_date,
        })
    }
}

/// Sparse update payload. `expiration_date` is tri-state: omitting the
/// key leaves the stored date alone, an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInventoryRequest {
    pub quantity: Option<f64>,
    pub minimum_threshold: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub expiration_date: Option<Option<String>>,
}

impl UpdateInventoryRequest {
    pub fn validate(self) -> Result<InventoryUpdate, ApiError> {
        if let Some(quantity) = self.quantity {
            check_non_negative("quantity", quantity)?;
        }
        if let Some(minimum_threshold) = self.minimum_threshold {
            check_non_negative("minimum_threshold", minimum_threshold)?;
        }
        if let Some(Some(date)) = &self.expiration_date {
            check_date(date)?;
        }
        Ok(InventoryUpdate {
            quantity: self.quantity,
            minimum_threshold: self.minimum_threshold,
            expiration_date: self.expiration_date,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct QuantityResponse {
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
pub struct UnitResponse {
    pub unit_type: MeasurementUnit,
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ApiError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ApiError::UnprocessableEntity(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

fn check_date(value: &str) -> Result<(), ApiError> {
    Date::parse(value, DATE_FORMAT).map_err(|_| {
        ApiError::UnprocessableEntity(format!("expiration_date '{value}' is not a YYYY-MM-DD date"))
    })?;
    Ok(())
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_expiration_is_not_an_update() {
        let req: UpdateInventoryRequest = serde_json::from_str(r#"{"quantity": 2.5}"#).unwrap();
        assert_eq!(req.expiration_date, None);
        let patch = req.validate().expect("valid patch");
        assert!(patch.expiration_date.is_none());
    }

    #[test]
    fn null_expiration_clears_the_date() {
        let req: UpdateInventoryRequest =
            serde_json::from_str(r#"{"expiration_date": null}"#).unwrap();
        assert_eq!(req.expiration_date, Some(None));
        let patch = req.validate().expect("valid patch");
        assert_eq!(patch.expiration_date, Some(None));
        assert!(!patch.is_empty());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let req: UpdateInventoryRequest = serde_json::from_str(r#"{"quantity": -1.0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn malformed_expiration_is_rejected() {
        let req = AddIngredientRequest {
            name: "flour".into(),
            category: Category::Staple,
            unit_type: MeasurementUnit::Grams,
            quantity: 500.0,
            minimum_threshold: 100.0,
            expiration_date: Some("01-01-2025".into()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn valid_request_converts() {
        let req = AddIngredientRequest {
            name: "milk".into(),
            category: Category::Dairy,
            unit_type: MeasurementUnit::Millilitres,
            quantity: 1000.0,
            minimum_threshold: 250.0,
            expiration_date: Some("2025-01-01".into()),
        };
        let item = req.validate().expect("valid request");
        assert_eq!(item.name, "milk");
        assert_eq!(item.expiration_date.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let req = AddIngredientRequest {
            name: String::new(),
            category: Category::Others,
            unit_type: MeasurementUnit::Pieces,
            quantity: 1.0,
            minimum_threshold: 0.0,
            expiration_date: None,
        };
        assert!(req.validate().is_err());
    }
}
