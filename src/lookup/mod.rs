//! Food lookup collaborators
//!
//! Barcode and recognition classifiers hand back a [`FoodCandidate`]. Applying
//! a candidate produces a direct-entry meal draft; nothing is logged until
//! the caller confirms.

pub mod openfoodfacts;
pub mod usda;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{coerce_confidence, sanitize_nutrition};
use crate::models::{MealType, Nutrition};
use crate::nutrition::{MealDraft, DEFAULT_QUANTITY};

pub use openfoodfacts::OpenFoodFactsClient;
pub use usda::UsdaClient;

/// Lookup errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No product found for barcode {0}")]
    ProductNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("USDA API key is not configured")]
    MissingApiKey,

    #[error("USDA API key was rejected")]
    InvalidApiKey,
}

pub type LookupResult<T> = Result<T, LookupError>;

/// A classifier result: what the food is, how sure, and its per-unit macros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCandidate {
    pub name: String,
    pub confidence: f64,
    pub nutrition: Nutrition,
    pub brand: Option<String>,
    pub serving_size: Option<String>,
}

impl FoodCandidate {
    /// Build a candidate with boundary coercion applied
    pub fn new(name: impl Into<String>, confidence: f64, nutrition: Nutrition) -> Self {
        Self {
            name: name.into(),
            confidence: coerce_confidence(confidence),
            nutrition: sanitize_nutrition(nutrition),
            brand: None,
            serving_size: None,
        }
    }
}

/// When a recognition result may be applied without asking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionPolicy {
    pub threshold: f64,
}

impl Default for RecognitionPolicy {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

impl RecognitionPolicy {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: coerce_confidence(threshold),
        }
    }

    pub fn should_auto_apply(&self, candidate: &FoodCandidate) -> bool {
        candidate.confidence >= self.threshold
    }
}

/// Barcode lookup service
#[async_trait]
pub trait BarcodeLookup: Send + Sync {
    async fn lookup(&self, barcode: &str) -> LookupResult<FoodCandidate>;
}

/// A meal pre-filled from a candidate, ready for review before logging
#[derive(Debug, Clone, Serialize)]
pub struct Prefill {
    pub name: String,
    pub meal_type: MealType,
    pub draft: MealDraft,
}

/// Direct-entry draft carrying the candidate's name and nutrition
pub fn prefill(candidate: &FoodCandidate, meal_type: MealType) -> Prefill {
    Prefill {
        name: candidate.name.clone(),
        meal_type,
        draft: MealDraft::new(
            sanitize_nutrition(candidate.nutrition),
            Vec::new(),
            false,
            DEFAULT_QUANTITY,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple(confidence: f64) -> FoodCandidate {
        FoodCandidate::new(
            "Apple",
            confidence,
            Nutrition {
                calories: 52.0,
                carbohydrates: 14.0,
                sugar: 10.0,
                fiber: 2.4,
                ..Nutrition::zero()
            },
        )
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = RecognitionPolicy::new(0.3);
        assert!(policy.should_auto_apply(&apple(0.3)));
        assert!(policy.should_auto_apply(&apple(0.9)));
        assert!(!policy.should_auto_apply(&apple(0.29)));
    }

    #[test]
    fn test_candidate_is_coerced() {
        let c = FoodCandidate::new(
            "Odd",
            4.0,
            Nutrition {
                calories: -10.0,
                ..Nutrition::zero()
            },
        );
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.nutrition.calories, 0.0);
    }

    #[test]
    fn test_prefill_builds_direct_draft() {
        let filled = prefill(&apple(0.8), MealType::Snack);
        assert_eq!(filled.name, "Apple");
        assert!(!filled.draft.compute_from_ingredients());
        assert_eq!(filled.draft.quantity(), 1.0);
        assert!((filled.draft.total().calories - 52.0).abs() < 1e-9);
    }
}
