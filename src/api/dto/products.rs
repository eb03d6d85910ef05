/*
 * Responsibility
 * - Products request/response DTOs
 * - Every field is Option on input so a missing field reports "required" instead of a 422
 */
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::repos::{NewProduct, ProductRow};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 20;
const PRICE_MIN: i64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            errors.insert(field.to_string(), format!("field {field} is required"));
            String::new()
        }
    }
}

impl ProductRequest {
    /// Check every field and, if all pass, turn the request into a store record.
    pub fn into_validated(self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();

        let sku = required(&mut errors, "sku", self.sku);
        let description = required(&mut errors, "description", self.description);
        let name = required(&mut errors, "name", self.name);
        if !errors.contains_key("name") {
            let len = name.chars().count();
            if !(NAME_MIN..=NAME_MAX).contains(&len) {
                errors.insert(
                    "name".into(),
                    format!("field name must be between {NAME_MIN} and {NAME_MAX} characters"),
                );
            }
        }

        let price = match self.price {
            None => {
                errors.insert("price".into(), "field price is required".into());
                0
            }
            Some(p) if p < PRICE_MIN => {
                errors.insert(
                    "price".into(),
                    format!("field price must be at least {PRICE_MIN}"),
                );
                p
            }
            Some(p) => p,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProduct {
            sku,
            name,
            price,
            description,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub description: String,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            name: row.name,
            price: row.price,
            description: row.description,
        }
    }
}
