//! The producer record and its input/update shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agrobase_core::ProducerId;

/// Crops a farm can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Soy,
    Corn,
    Cotton,
    Coffee,
    Sugarcane,
}

impl Crop {
    pub const ALL: [Crop; 5] = [
        Crop::Soy,
        Crop::Corn,
        Crop::Cotton,
        Crop::Coffee,
        Crop::Sugarcane,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Soy => "soy",
            Crop::Corn => "corn",
            Crop::Cotton => "cotton",
            Crop::Coffee => "coffee",
            Crop::Sugarcane => "sugarcane",
        }
    }

    /// Parse a lowercase crop token. `None` for unknown values; the caller
    /// owns the error message (DTO validation names the accepted options).
    pub fn parse(s: &str) -> Option<Crop> {
        Crop::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Accepted tokens, comma-joined, for validation messages.
    pub fn accepted_values() -> String {
        Crop::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl core::fmt::Display for Crop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered rural producer and their farm.
///
/// `tax_id` is always the normalized digit string (11-digit CPF or 14-digit
/// CNPJ). Area quantities are hectares at two-decimal precision. `deleted`
/// is a soft-delete flag; deleted records stay in storage but are invisible
/// to reads and aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: ProducerId,
    pub tax_id: String,
    pub owner_name: String,
    pub city: String,
    pub state_code: String,
    pub farm_name: String,
    pub total_area_ha: Decimal,
    pub arable_area_ha: Decimal,
    pub vegetation_area_ha: Decimal,
    pub crops: Vec<Crop>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

/// Input for registering a producer. `tax_id` arrives raw (separators
/// allowed); the service validates it and persists the normalized digits.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProducer {
    pub tax_id: String,
    pub owner_name: String,
    pub city: String,
    pub state_code: String,
    pub farm_name: String,
    pub total_area_ha: Decimal,
    pub arable_area_ha: Decimal,
    pub vegetation_area_ha: Decimal,
    pub crops: Vec<Crop>,
}

/// Partial update: only supplied fields change. There is deliberately no
/// `tax_id` here — the document is immutable after registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerPatch {
    pub owner_name: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub farm_name: Option<String>,
    pub total_area_ha: Option<Decimal>,
    pub arable_area_ha: Option<Decimal>,
    pub vegetation_area_ha: Option<Decimal>,
    pub crops: Option<Vec<Crop>>,
    pub deleted: Option<bool>,
}

impl ProducerPatch {
    /// Whether applying this patch requires re-checking the area invariant.
    pub fn touches_areas(&self) -> bool {
        self.total_area_ha.is_some()
            || self.arable_area_ha.is_some()
            || self.vegetation_area_ha.is_some()
    }

    /// The patch that soft-deletes a record.
    pub fn soft_delete() -> Self {
        Self {
            deleted: Some(true),
            ..Self::default()
        }
    }
}

/// Equality filters for listing producers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerFilter {
    pub state_code: Option<String>,
    pub city: Option<String>,
}
