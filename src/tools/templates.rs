//! Saved Meal Template MCP Tools
//!
//! Save a logged meal for reuse and re-log it later in one call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::meals::MealDetail;
use crate::db::Database;
use crate::models::{Meal, MealType, SavedMeal};

/// Template with its display name
#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: SavedMeal,
    pub display_name: String,
}

impl From<SavedMeal> for TemplateDetail {
    fn from(template: SavedMeal) -> Self {
        let display_name = template.display_name();
        Self {
            template,
            display_name,
        }
    }
}

/// Template summary for listing
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub meal_type: MealType,
    pub total_calories: f64,
    pub is_favorite: bool,
}

/// Response for list_meal_templates
#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateSummary>,
    pub total: usize,
}

/// Copy a logged meal into a new template
pub fn save_meal_template(db: &Database, meal_id: i64, now: DateTime<Utc>) -> Result<Option<TemplateDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = match Meal::get_by_id(&conn, meal_id).map_err(|e| format!("Failed to get meal: {}", e))? {
        Some(meal) => meal,
        None => return Ok(None),
    };

    let saved = SavedMeal::save_from_meal(&conn, &meal, now)
        .map_err(|e| format!("Failed to save template: {}", e))?;
    tracing::info!("Saved meal {} as template {}", meal_id, saved.id);
    Ok(Some(saved.into()))
}

pub fn list_meal_templates(db: &Database, user_id: &str, favorites_only: bool) -> Result<ListTemplatesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let templates = SavedMeal::list(&conn, user_id, favorites_only)
        .map_err(|e| format!("Failed to list templates: {}", e))?;

    let templates: Vec<TemplateSummary> = templates
        .into_iter()
        .map(|t| TemplateSummary {
            id: t.id,
            display_name: t.display_name(),
            name: t.name,
            meal_type: t.meal_type,
            total_calories: t.total_nutrition.calories,
            is_favorite: t.is_favorite,
        })
        .collect();

    Ok(ListTemplatesResponse {
        total: templates.len(),
        templates,
    })
}

pub fn get_meal_template(db: &Database, id: i64) -> Result<Option<TemplateDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let template = SavedMeal::get_by_id(&conn, id).map_err(|e| format!("Failed to get template: {}", e))?;
    Ok(template.map(TemplateDetail::from))
}

pub fn set_template_favorite(db: &Database, id: i64, is_favorite: bool) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    SavedMeal::set_favorite(&conn, id, is_favorite).map_err(|e| format!("Failed to set favorite: {}", e))
}

pub fn delete_meal_template(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    SavedMeal::delete(&conn, id).map_err(|e| format!("Failed to delete template: {}", e))
}

/// Log a new meal from a template at `now`
pub fn add_template_to_today(
    db: &Database,
    template_id: i64,
    meal_type: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<MealDetail>, String> {
    let meal_type = meal_type
        .map(str::parse::<MealType>)
        .transpose()
        .map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let template = match SavedMeal::get_by_id(&conn, template_id)
        .map_err(|e| format!("Failed to get template: {}", e))?
    {
        Some(template) => template,
        None => return Ok(None),
    };

    let meal = Meal::create(&conn, &template.instantiate(meal_type, now))
        .map_err(|e| format!("Failed to log meal: {}", e))?;
    tracing::info!("Logged meal {} from template {}", meal.id, template_id);
    Ok(Some(meal.into()))
}
