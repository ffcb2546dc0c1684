//! Ingredient Preset MCP Tools
//!
//! Personal ingredient presets plus the recently used ingredient list
//! drawn from meal history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::input::{self, InputError, NutritionInput};
use crate::models::{IngredientPreset, IngredientPresetCreate, Meal};
use crate::nutrition::{categorize, Ingredient, IngredientCategory};

pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Request for save_ingredient_preset
#[derive(Debug, Clone, Deserialize)]
pub struct SavePresetRequest {
    pub user_id: String,
    pub name: String,
    /// protein, carbs, fats, vegetables, fruits, dairy, grains or other
    pub category: Option<String>,
    pub macros: NutritionInput,
}

impl SavePresetRequest {
    pub fn into_create(self, now: DateTime<Utc>) -> Result<IngredientPresetCreate, InputError> {
        let category = self
            .category
            .as_deref()
            .and_then(input::non_blank)
            .map(|c| c.parse::<IngredientCategory>())
            .transpose()?;
        Ok(IngredientPresetCreate {
            user_id: self.user_id,
            name: input::require_name(&self.name)?,
            category,
            macros: self.macros.into_nutrition()?,
            created_at: now,
        })
    }
}

/// Response for list_ingredient_presets
#[derive(Debug, Serialize)]
pub struct ListPresetsResponse {
    pub presets: Vec<IngredientPreset>,
    pub total: usize,
}

/// A recently used ingredient with its food group
#[derive(Debug, Serialize)]
pub struct RecentIngredient {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub category: IngredientCategory,
}

/// Response for get_recent_ingredients
#[derive(Debug, Serialize)]
pub struct RecentIngredientsResponse {
    pub ingredients: Vec<RecentIngredient>,
    pub total: usize,
}

pub fn save_ingredient_preset(
    db: &Database,
    request: SavePresetRequest,
    now: DateTime<Utc>,
) -> Result<IngredientPreset, String> {
    let data = request
        .into_create(now)
        .map_err(|e| format!("Invalid ingredient preset: {}", e))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let preset = IngredientPreset::create(&conn, &data)
        .map_err(|e| format!("Failed to save ingredient preset: {}", e))?;
    tracing::info!(
        "Saved ingredient preset {} '{}' ({})",
        preset.id,
        preset.name,
        preset.category.as_str()
    );
    Ok(preset)
}

pub fn list_ingredient_presets(db: &Database, user_id: &str) -> Result<ListPresetsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let presets = IngredientPreset::list(&conn, user_id)
        .map_err(|e| format!("Failed to list ingredient presets: {}", e))?;
    let total = presets.len();
    Ok(ListPresetsResponse { presets, total })
}

pub fn delete_ingredient_preset(db: &Database, id: i64, user_id: &str) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = IngredientPreset::delete(&conn, id, user_id)
        .map_err(|e| format!("Failed to delete ingredient preset: {}", e))?;
    if deleted {
        tracing::info!("Deleted ingredient preset {}", id);
    }
    Ok(deleted)
}

/// Ingredients from the user's latest meals, newest first
pub fn recent_ingredients(
    db: &Database,
    user_id: &str,
    limit: Option<usize>,
) -> Result<RecentIngredientsResponse, String> {
    let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_RECENT_LIMIT);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ingredients: Vec<RecentIngredient> = Meal::recent_ingredients(&conn, user_id, limit)
        .map_err(|e| format!("Failed to get recent ingredients: {}", e))?
        .into_iter()
        .map(|ingredient| RecentIngredient {
            category: categorize(&ingredient.name, &ingredient.macros),
            ingredient,
        })
        .collect();

    Ok(RecentIngredientsResponse {
        total: ingredients.len(),
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, category: Option<&str>) -> SavePresetRequest {
        SavePresetRequest {
            user_id: "alice".to_string(),
            name: name.to_string(),
            category: category.map(str::to_string),
            macros: NutritionInput {
                calories: Some(120.0),
                protein: Some(0.0),
                carbohydrates: Some(0.0),
                fat: Some(14.0),
                sugar: Some(0.0),
                fiber: Some(0.0),
            },
        }
    }

    #[test]
    fn test_into_create_validates() {
        let now = Utc::now();
        let data = request("Olive Oil", None).into_create(now).unwrap();
        assert_eq!(data.category, None);

        let data = request("Olive Oil", Some("Fats")).into_create(now).unwrap();
        assert_eq!(data.category, Some(IngredientCategory::Fats));

        assert_eq!(
            request(" ", None).into_create(now).unwrap_err(),
            InputError::EmptyName
        );
        assert!(matches!(
            request("Oil", Some("sweets")).into_create(now),
            Err(InputError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_into_create_requires_every_field() {
        let mut req = request("Oil", None);
        req.macros.fiber = None;
        assert_eq!(
            req.into_create(Utc::now()).unwrap_err(),
            InputError::MissingField("fiber")
        );
    }
}
