//! Input validation at the boundary
//!
//! Everything the aggregation core receives passes through here first.
//! Bad quantities default to one serving, bad nutrient values become zero,
//! and a nutrition record that is missing a field is rejected outright.

use chrono::{DateTime, NaiveDate, Utc};
use rmcp::schemars;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::models::{Nutrient, Nutrition};
use crate::nutrition::DEFAULT_QUANTITY;

/// Boundary validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("Missing required nutrition field: {0}")]
    MissingField(&'static str),

    #[error("Unknown meal type: {0} (expected breakfast, lunch, dinner or snack)")]
    UnknownMealType(String),

    #[error("Unknown search filter: {0} (expected all, meals, ingredients or favorites)")]
    UnknownSearchFilter(String),

    #[error("Unknown stats period: {0} (expected week, month or year)")]
    UnknownPeriod(String),

    #[error("Unknown ingredient category: {0}")]
    UnknownCategory(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid timestamp '{0}', expected RFC 3339")]
    InvalidTimestamp(String),
}

/// Quantities must be positive and finite; anything else means one serving
pub fn coerce_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        DEFAULT_QUANTITY
    }
}

pub fn coerce_optional_quantity(quantity: Option<f64>) -> f64 {
    quantity.map(coerce_quantity).unwrap_or(DEFAULT_QUANTITY)
}

/// Parse a quantity text field (empty or invalid -> 1.0)
pub fn parse_quantity(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map(coerce_quantity)
        .unwrap_or(DEFAULT_QUANTITY)
}

/// Nutrient amounts must be non-negative and finite; anything else is 0
pub fn coerce_nutrient(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse a nutrient text field (empty or invalid -> 0)
pub fn parse_nutrient_field(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(coerce_nutrient).unwrap_or(0.0)
}

/// A numeric form value as it arrives: a number, or the text typed into the field
#[derive(Debug, Clone, PartialEq, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    pub fn quantity(&self) -> f64 {
        match self {
            NumberOrText::Number(v) => coerce_quantity(*v),
            NumberOrText::Text(raw) => parse_quantity(raw),
        }
    }

    pub fn nutrient(&self) -> f64 {
        match self {
            NumberOrText::Number(v) => coerce_nutrient(*v),
            NumberOrText::Text(raw) => parse_nutrient_field(raw),
        }
    }

    /// Unreadable confidence is 0, which never clears a threshold above 0
    pub fn confidence(&self) -> f64 {
        match self {
            NumberOrText::Number(v) => coerce_confidence(*v),
            NumberOrText::Text(raw) => raw.trim().parse().map(coerce_confidence).unwrap_or(0.0),
        }
    }
}

/// `deserialize_with` for optional quantity fields; absent stays `None`
pub fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(|v| v.quantity()))
}

/// `deserialize_with` for optional nutrient fields; absent stays `None`
pub fn lenient_nutrient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(|v| v.nutrient()))
}

/// Trimmed display name; blank names are rejected
pub fn require_name(raw: &str) -> Result<String, InputError> {
    let name = raw.trim();
    if name.is_empty() {
        Err(InputError::EmptyName)
    } else {
        Ok(name.to_string())
    }
}

/// Optional free text; blank means "no value"
pub fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Coerce every field of a vector
pub fn sanitize_nutrition(n: Nutrition) -> Nutrition {
    n.map(coerce_nutrient)
}

/// Confidence scores are probabilities
pub fn coerce_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A nutrition record as it arrives from a caller
///
/// Fields are optional on the wire so that absence can be reported by name.
/// Numeric text is accepted and coerced like any other value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NutritionInput {
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub carbohydrates: Option<f64>,
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub sugar: Option<f64>,
    #[serde(default, deserialize_with = "lenient_nutrient")]
    pub fiber: Option<f64>,
}

impl NutritionInput {
    fn field(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Fat => self.fat,
            Nutrient::Sugar => self.sugar,
            Nutrient::Fiber => self.fiber,
        }
    }

    /// Validate into a vector: every field required, negatives coerced to 0
    pub fn into_nutrition(self) -> Result<Nutrition, InputError> {
        let mut n = Nutrition::zero();
        for nutrient in Nutrient::ALL {
            let value = self
                .field(nutrient)
                .ok_or(InputError::MissingField(nutrient.as_str()))?;
            n.set(nutrient, coerce_nutrient(value));
        }
        Ok(n)
    }

    /// Overlay the provided fields onto an existing vector
    pub fn apply_to(self, base: Nutrition) -> Nutrition {
        let mut n = base;
        for nutrient in Nutrient::ALL {
            if let Some(value) = self.field(nutrient) {
                n.set(nutrient, coerce_nutrient(value));
            }
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        Nutrient::ALL.iter().all(|n| self.field(*n).is_none())
    }
}

/// Parse an ISO calendar date
pub fn parse_date(raw: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(raw.to_string()))
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, InputError> {
    crate::db::row::parse_timestamp(raw.trim())
        .map_err(|_| InputError::InvalidTimestamp(raw.to_string()))
}
