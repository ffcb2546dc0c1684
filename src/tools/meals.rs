//! Meal MCP Tools
//!
//! Tools for logging, editing and searching meals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::input::{self, coerce_optional_quantity, coerce_quantity, InputError, NutritionInput};
use crate::models::{Meal, MealCreate, MealType, MealUpdate, Nutrition, SearchFilter};
use crate::nutrition::Ingredient;

pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// One ingredient as supplied by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub macros: NutritionInput,
}

impl IngredientInput {
    pub fn into_ingredient(self) -> Result<Ingredient, InputError> {
        Ok(Ingredient::new(self.name, self.macros.into_nutrition()?))
    }
}

fn convert_ingredients(items: Vec<IngredientInput>) -> Result<Vec<Ingredient>, InputError> {
    items.into_iter().map(IngredientInput::into_ingredient).collect()
}

/// Request for log_meal
#[derive(Debug, Clone, Deserialize)]
pub struct LogMealRequest {
    pub user_id: String,
    pub meal_type: String,
    pub name: String,
    #[serde(default, deserialize_with = "input::lenient_quantity")]
    pub quantity: Option<f64>,
    /// Per-serving direct entry; required unless computing from ingredients
    pub nutrition: Option<NutritionInput>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
    #[serde(default)]
    pub compute_from_ingredients: bool,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    /// RFC 3339; defaults to now
    pub logged_at: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl LogMealRequest {
    /// Validate into a create record
    pub fn into_create(self, now: DateTime<Utc>) -> Result<MealCreate, InputError> {
        let meal_type: MealType = self.meal_type.parse()?;
        let name = input::require_name(&self.name)?;
        let base_nutrition = match self.nutrition {
            Some(n) => n.into_nutrition()?,
            None if self.compute_from_ingredients => Nutrition::zero(),
            None => return Err(InputError::MissingField("nutrition")),
        };
        let created_at = match self.logged_at.as_deref() {
            Some(raw) => input::parse_timestamp(raw)?,
            None => now,
        };

        Ok(MealCreate {
            user_id: self.user_id,
            meal_type,
            name,
            ingredients: convert_ingredients(self.ingredients)?,
            notes: self.notes,
            image_url: self.image_url,
            quantity: coerce_optional_quantity(self.quantity),
            base_nutrition,
            compute_from_ingredients: self.compute_from_ingredients,
            is_favorite: self.is_favorite,
            created_at,
        })
    }
}

/// Request for update_meal; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub meal_type: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "input::lenient_quantity")]
    pub quantity: Option<f64>,
    /// Partial overlay onto the stored per-serving entry
    pub nutrition: Option<NutritionInput>,
    pub ingredients: Option<Vec<IngredientInput>>,
    pub compute_from_ingredients: Option<bool>,
    /// An empty string clears the notes
    pub notes: Option<String>,
    /// An empty string clears the image
    pub image_url: Option<String>,
    pub is_favorite: Option<bool>,
}

/// Meal with its quantity-decorated display name
#[derive(Debug, Clone, Serialize)]
pub struct MealDetail {
    #[serde(flatten)]
    pub meal: Meal,
    pub display_name: String,
}

impl From<Meal> for MealDetail {
    fn from(meal: Meal) -> Self {
        let display_name = meal.display_name();
        Self { meal, display_name }
    }
}

/// Response for search_meals
#[derive(Debug, Serialize)]
pub struct SearchMealsResponse {
    pub query: String,
    pub filter: SearchFilter,
    pub count: usize,
    pub results: Vec<MealDetail>,
}

/// Log a meal
pub fn log_meal(db: &Database, request: LogMealRequest, now: DateTime<Utc>) -> Result<MealDetail, String> {
    let data = request.into_create(now).map_err(|e| format!("Invalid meal: {}", e))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;

    tracing::info!(
        "Logged meal {} ({}) for {}: {:.0} kcal",
        meal.id,
        meal.meal_type.as_str(),
        meal.user_id,
        meal.total_nutrition.calories
    );
    Ok(meal.into())
}

/// Get a meal by ID
pub fn get_meal(db: &Database, id: i64) -> Result<Option<MealDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::get_by_id(&conn, id).map_err(|e| format!("Failed to get meal: {}", e))?;
    Ok(meal.map(MealDetail::from))
}

/// Edit a meal
pub fn update_meal(
    db: &Database,
    id: i64,
    request: UpdateMealRequest,
    now: DateTime<Utc>,
) -> Result<Option<MealDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = match Meal::get_by_id(&conn, id).map_err(|e| format!("Failed to get meal: {}", e))? {
        Some(meal) => meal,
        None => return Ok(None),
    };

    let meal_type = request
        .meal_type
        .as_deref()
        .map(str::parse::<MealType>)
        .transpose()
        .map_err(|e| format!("Invalid update: {}", e))?;
    let ingredients = request
        .ingredients
        .map(convert_ingredients)
        .transpose()
        .map_err(|e| format!("Invalid update: {}", e))?;
    let base_nutrition = request
        .nutrition
        .filter(|n| !n.is_empty())
        .map(|n| n.apply_to(existing.base_nutrition));

    let name = request
        .name
        .as_deref()
        .map(input::require_name)
        .transpose()
        .map_err(|e| format!("Invalid update: {}", e))?;

    let data = MealUpdate {
        meal_type,
        name,
        ingredients,
        notes: request.notes,
        image_url: request.image_url,
        quantity: request.quantity.map(coerce_quantity),
        base_nutrition,
        compute_from_ingredients: request.compute_from_ingredients,
        is_favorite: request.is_favorite,
    };

    let updated = Meal::update(&conn, id, &data, now).map_err(|e| format!("Failed to update meal: {}", e))?;
    if let Some(ref meal) = updated {
        tracing::info!("Updated meal {}: {:.0} kcal", meal.id, meal.total_nutrition.calories);
    }
    Ok(updated.map(MealDetail::from))
}

/// Mark or unmark a meal as a favorite
pub fn set_meal_favorite(db: &Database, id: i64, is_favorite: bool, now: DateTime<Utc>) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::set_favorite(&conn, id, is_favorite, now).map_err(|e| format!("Failed to set favorite: {}", e))
}

/// Delete a meal
pub fn delete_meal(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = Meal::delete(&conn, id).map_err(|e| format!("Failed to delete meal: {}", e))?;
    if deleted {
        tracing::info!("Deleted meal {}", id);
    }
    Ok(deleted)
}

/// Search meal history
pub fn search_meals(
    db: &Database,
    user_id: &str,
    query: &str,
    filter: Option<&str>,
    limit: Option<usize>,
) -> Result<SearchMealsResponse, String> {
    let filter = filter
        .map(str::parse::<SearchFilter>)
        .transpose()
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_SEARCH_LIMIT);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::search(&conn, user_id, query, filter, limit)
        .map_err(|e| format!("Failed to search meals: {}", e))?;

    let results: Vec<MealDetail> = meals.into_iter().map(MealDetail::from).collect();
    Ok(SearchMealsResponse {
        query: query.to_string(),
        filter,
        count: results.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(calories: f64) -> NutritionInput {
        NutritionInput {
            calories: Some(calories),
            protein: Some(0.0),
            carbohydrates: Some(0.0),
            fat: Some(0.0),
            sugar: Some(0.0),
            fiber: Some(0.0),
        }
    }

    fn request() -> LogMealRequest {
        LogMealRequest {
            user_id: "alice".to_string(),
            meal_type: "snack".to_string(),
            name: "Apple".to_string(),
            quantity: None,
            nutrition: Some(full(52.0)),
            ingredients: Vec::new(),
            compute_from_ingredients: false,
            notes: None,
            image_url: None,
            logged_at: None,
            is_favorite: false,
        }
    }

    #[test]
    fn test_into_create_defaults() {
        let now = Utc::now();
        let data = request().into_create(now).unwrap();
        assert_eq!(data.quantity, 1.0);
        assert_eq!(data.created_at, now);
        assert_eq!(data.meal_type, MealType::Snack);
    }

    #[test]
    fn test_into_create_requires_nutrition_in_direct_mode() {
        let mut req = request();
        req.nutrition = None;
        assert_eq!(
            req.into_create(Utc::now()).unwrap_err(),
            InputError::MissingField("nutrition")
        );

        let mut req = request();
        req.nutrition = None;
        req.compute_from_ingredients = true;
        assert!(req.into_create(Utc::now()).is_ok());
    }

    #[test]
    fn test_into_create_rejects_incomplete_ingredient() {
        let mut req = request();
        req.ingredients = vec![IngredientInput {
            name: "Oats".to_string(),
            macros: NutritionInput {
                calories: Some(50.0),
                ..NutritionInput::default()
            },
        }];
        assert_eq!(
            req.into_create(Utc::now()).unwrap_err(),
            InputError::MissingField("protein")
        );
    }

    #[test]
    fn test_into_create_parses_logged_at_and_coerces_quantity() {
        let mut req = request();
        req.logged_at = Some("2026-01-13T08:30:00+01:00".to_string());
        req.quantity = Some(-1.0);
        let data = req.into_create(Utc::now()).unwrap();
        assert_eq!(data.quantity, 1.0);
        assert_eq!(crate::db::row::format_timestamp(&data.created_at), "2026-01-13T07:30:00.000Z");
    }

    #[test]
    fn test_into_create_rejects_blank_name() {
        let mut req = request();
        req.name = "  ".to_string();
        assert_eq!(req.into_create(Utc::now()).unwrap_err(), InputError::EmptyName);
    }

    #[test]
    fn test_request_accepts_text_quantity_and_nutrients() {
        let req: LogMealRequest = serde_json::from_str(
            r#"{
                "user_id": "alice",
                "meal_type": "lunch",
                "name": "Soup",
                "quantity": "abc",
                "nutrition": {"calories": "lots", "protein": 8, "carbohydrates": "20",
                              "fat": 4, "sugar": 2, "fiber": 3}
            }"#,
        )
        .unwrap();
        let data = req.into_create(Utc::now()).unwrap();
        assert_eq!(data.quantity, 1.0);
        assert_eq!(data.base_nutrition.calories, 0.0);
        assert_eq!(data.base_nutrition.carbohydrates, 20.0);
    }

    #[test]
    fn test_into_create_rejects_unknown_meal_type() {
        let mut req = request();
        req.meal_type = "brunch".to_string();
        assert!(matches!(
            req.into_create(Utc::now()),
            Err(InputError::UnknownMealType(_))
        ));
    }
}
