//! Food Lookup MCP Tools
//!
//! Barcode and ingredient search return drafts for review. A recognised
//! food is logged straight away only when its confidence clears the
//! configured threshold, or when the caller confirms it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::meals::MealDetail;
use crate::db::Database;
use crate::input;
use crate::lookup::usda::UsdaIngredient;
use crate::lookup::{prefill, BarcodeLookup, FoodCandidate, LookupError, Prefill, RecognitionPolicy, UsdaClient};
use crate::models::{Meal, MealCreate, MealType};

/// Response for lookup_barcode
#[derive(Debug, Serialize)]
pub struct BarcodeLookupResponse {
    pub barcode: String,
    pub candidate: FoodCandidate,
    pub prefill: Prefill,
}

/// Response for search_ingredients
#[derive(Debug, Serialize)]
pub struct IngredientSearchResponse {
    pub query: String,
    pub count: usize,
    pub ingredients: Vec<UsdaIngredient>,
}

/// Response for apply_recognition
#[derive(Debug, Serialize)]
pub struct RecognitionResponse {
    pub candidate: FoodCandidate,
    pub threshold: f64,
    pub applied: bool,
    pub prefill: Prefill,
    /// Present when the food was logged
    pub meal: Option<MealDetail>,
}

fn parse_meal_type(meal_type: Option<&str>) -> Result<MealType, String> {
    meal_type
        .map(str::parse::<MealType>)
        .transpose()
        .map_err(|e| e.to_string())
        .map(|t| t.unwrap_or(MealType::Snack))
}

/// Look up a packaged product; unknown barcodes are `Ok(None)`
pub async fn lookup_barcode(
    lookup: &dyn BarcodeLookup,
    barcode: &str,
    meal_type: Option<&str>,
) -> Result<Option<BarcodeLookupResponse>, String> {
    let meal_type = parse_meal_type(meal_type)?;

    let candidate = match lookup.lookup(barcode).await {
        Ok(candidate) => candidate,
        Err(LookupError::ProductNotFound(code)) => {
            tracing::info!("No product for barcode {}", code);
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!("Barcode lookup failed for {}: {}", barcode, e);
            return Err(format!("Failed to look up barcode: {}", e));
        }
    };

    tracing::info!("Barcode {} matched '{}'", barcode, candidate.name);
    Ok(Some(BarcodeLookupResponse {
        barcode: barcode.trim().to_string(),
        prefill: prefill(&candidate, meal_type),
        candidate,
    }))
}

/// Search USDA FoodData Central for ingredients
pub async fn search_ingredients(
    client: &UsdaClient,
    query: &str,
    limit: Option<u32>,
) -> Result<IngredientSearchResponse, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("Query must not be empty".to_string());
    }

    let ingredients = client
        .search_foods(query, limit.unwrap_or(10))
        .await
        .map_err(|e| format!("Failed to search ingredients: {}", e))?;

    Ok(IngredientSearchResponse {
        query: query.to_string(),
        count: ingredients.len(),
        ingredients,
    })
}

/// Apply a recognition result
///
/// Logs the meal when `policy` allows it or `confirm` is set; otherwise only
/// the prefilled draft is returned. A candidate without a name is rejected
/// either way.
pub fn apply_recognition(
    db: &Database,
    policy: &RecognitionPolicy,
    user_id: &str,
    candidate: FoodCandidate,
    meal_type: Option<&str>,
    confirm: bool,
    now: DateTime<Utc>,
) -> Result<RecognitionResponse, String> {
    let meal_type = parse_meal_type(meal_type)?;
    let name = input::require_name(&candidate.name).map_err(|e| format!("Invalid recognition result: {}", e))?;
    let mut filled = prefill(&candidate, meal_type);
    filled.name = name;
    let applied = confirm || policy.should_auto_apply(&candidate);

    let meal = if applied {
        let draft = &filled.draft;
        let data = MealCreate {
            user_id: user_id.to_string(),
            meal_type,
            name: filled.name.clone(),
            ingredients: draft.ingredients().to_vec(),
            notes: None,
            image_url: None,
            quantity: draft.quantity(),
            base_nutrition: *draft.base_nutrition(),
            compute_from_ingredients: draft.compute_from_ingredients(),
            is_favorite: false,
            created_at: now,
        };
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;
        tracing::info!(
            "Applied recognised '{}' (confidence {:.2}) as meal {}",
            candidate.name,
            candidate.confidence,
            meal.id
        );
        Some(MealDetail::from(meal))
    } else {
        tracing::debug!(
            "Recognised '{}' below threshold ({:.2} < {:.2})",
            candidate.name,
            candidate.confidence,
            policy.threshold
        );
        None
    };

    Ok(RecognitionResponse {
        candidate,
        threshold: policy.threshold,
        applied,
        prefill: filled,
        meal,
    })
}
