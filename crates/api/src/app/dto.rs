//! Request DTOs, validation, and JSON mapping helpers.
//!
//! Every request DTO carries an explicit `validate()` that returns the full
//! list of field errors at once, invoked by the handler before the service
//! is called.

use rust_decimal::Decimal;
use serde::Deserialize;

use agrobase_producers::{Crop, NewProducer, Producer, ProducerPatch};

// -------------------------
// Field validation
// -------------------------

/// One problem with one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn require_text(
    field: &'static str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            errors.push(FieldError::new(field, format!("{field} must not be empty")));
            String::new()
        }
        None => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            String::new()
        }
    }
}

fn check_text(field: &'static str, value: &Option<String>, errors: &mut Vec<FieldError>) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{field} must not be empty")));
        }
    }
}

fn check_state_code(value: &Option<String>, errors: &mut Vec<FieldError>) {
    if let Some(v) = value {
        if v.chars().count() != 2 {
            errors.push(FieldError::new(
                "state_code",
                "state_code must be exactly 2 characters",
            ));
        }
    }
}

/// Non-negative hectare quantity, normalized to two decimal places (the
/// storage precision, so both backends render identically).
fn require_area(
    field: &'static str,
    value: Option<Decimal>,
    errors: &mut Vec<FieldError>,
) -> Decimal {
    match value {
        Some(v) if v >= Decimal::ZERO => two_decimals(v),
        Some(_) => {
            errors.push(FieldError::new(field, format!("{field} must not be negative")));
            Decimal::ZERO
        }
        None => {
            errors.push(FieldError::new(field, format!("{field} is required")));
            Decimal::ZERO
        }
    }
}

fn check_area(field: &'static str, value: &Option<Decimal>, errors: &mut Vec<FieldError>) {
    if let Some(v) = value {
        if *v < Decimal::ZERO {
            errors.push(FieldError::new(field, format!("{field} must not be negative")));
        }
    }
}

fn two_decimals(value: Decimal) -> Decimal {
    let mut v = value;
    v.rescale(2);
    v
}

/// Parse crop tokens, deduplicating (the field is a set) and reporting
/// unknown values with the accepted options.
fn parse_crops(value: Vec<String>, errors: &mut Vec<FieldError>) -> Vec<Crop> {
    if value.is_empty() {
        errors.push(FieldError::new("crops", "crops must not be an empty array"));
        return Vec::new();
    }

    let mut crops: Vec<Crop> = Vec::with_capacity(value.len());
    for token in &value {
        match Crop::parse(token) {
            Some(crop) => {
                if !crops.contains(&crop) {
                    crops.push(crop);
                }
            }
            None => {
                errors.push(FieldError::new(
                    "crops",
                    format!("crops accepts: {}", Crop::accepted_values()),
                ));
                return Vec::new();
            }
        }
    }
    crops
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProducerRequest {
    pub tax_id: Option<String>,
    pub owner_name: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub farm_name: Option<String>,
    pub total_area_ha: Option<Decimal>,
    pub arable_area_ha: Option<Decimal>,
    pub vegetation_area_ha: Option<Decimal>,
    pub crops: Option<Vec<String>>,
}

impl CreateProducerRequest {
    pub fn validate(self) -> Result<NewProducer, Vec<FieldError>> {
        let mut errors = Vec::new();

        let tax_id = require_text("tax_id", self.tax_id, &mut errors);
        let owner_name = require_text("owner_name", self.owner_name, &mut errors);
        let city = require_text("city", self.city, &mut errors);
        check_state_code(&self.state_code, &mut errors);
        let state_code = require_text("state_code", self.state_code, &mut errors);
        let farm_name = require_text("farm_name", self.farm_name, &mut errors);
        let total_area_ha = require_area("total_area_ha", self.total_area_ha, &mut errors);
        let arable_area_ha = require_area("arable_area_ha", self.arable_area_ha, &mut errors);
        let vegetation_area_ha =
            require_area("vegetation_area_ha", self.vegetation_area_ha, &mut errors);
        let crops = match self.crops {
            Some(v) => parse_crops(v, &mut errors),
            None => {
                errors.push(FieldError::new("crops", "crops is required"));
                Vec::new()
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProducer {
            tax_id,
            owner_name,
            city,
            state_code,
            farm_name,
            total_area_ha,
            arable_area_ha,
            vegetation_area_ha,
            crops,
        })
    }
}

/// Partial update. There is deliberately no `tax_id` and no `deleted` here:
/// the document is immutable and soft deletion has its own endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateProducerRequest {
    pub owner_name: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub farm_name: Option<String>,
    pub total_area_ha: Option<Decimal>,
    pub arable_area_ha: Option<Decimal>,
    pub vegetation_area_ha: Option<Decimal>,
    pub crops: Option<Vec<String>>,
}

impl UpdateProducerRequest {
    pub fn validate(self) -> Result<ProducerPatch, Vec<FieldError>> {
        let mut errors = Vec::new();

        check_text("owner_name", &self.owner_name, &mut errors);
        check_text("city", &self.city, &mut errors);
        check_state_code(&self.state_code, &mut errors);
        check_text("farm_name", &self.farm_name, &mut errors);
        check_area("total_area_ha", &self.total_area_ha, &mut errors);
        check_area("arable_area_ha", &self.arable_area_ha, &mut errors);
        check_area("vegetation_area_ha", &self.vegetation_area_ha, &mut errors);
        let crops = match self.crops {
            Some(v) => Some(parse_crops(v, &mut errors)),
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProducerPatch {
            owner_name: self.owner_name,
            city: self.city,
            state_code: self.state_code,
            farm_name: self.farm_name,
            total_area_ha: self.total_area_ha.map(two_decimals),
            arable_area_ha: self.arable_area_ha.map(two_decimals),
            vegetation_area_ha: self.vegetation_area_ha.map(two_decimals),
            crops,
            deleted: None,
        })
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn producer_to_json(p: &Producer) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "tax_id": p.tax_id,
        "owner_name": p.owner_name,
        "city": p.city,
        "state_code": p.state_code,
        "farm_name": p.farm_name,
        "total_area_ha": p.total_area_ha.to_string(),
        "arable_area_ha": p.arable_area_ha.to_string(),
        "vegetation_area_ha": p.vegetation_area_ha.to_string(),
        "crops": p.crops.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
        "deleted": p.deleted,
    })
}
