//! Goal MCP Tools

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::db::Database;
use crate::input::coerce_nutrient;
use crate::models::MacroGoals;

/// Partial goal update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GoalsUpdate {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fat: Option<f64>,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
}

impl GoalsUpdate {
    /// Negative or non-finite goals become 0 (no goal)
    pub fn apply_to(&self, goals: MacroGoals) -> MacroGoals {
        MacroGoals {
            calories: self.calories.map(coerce_nutrient).unwrap_or(goals.calories),
            protein: self.protein.map(coerce_nutrient).unwrap_or(goals.protein),
            carbohydrates: self.carbohydrates.map(coerce_nutrient).unwrap_or(goals.carbohydrates),
            fat: self.fat.map(coerce_nutrient).unwrap_or(goals.fat),
            sugar: self.sugar.map(coerce_nutrient).unwrap_or(goals.sugar),
            fiber: self.fiber.map(coerce_nutrient).unwrap_or(goals.fiber),
        }
    }
}

/// Current goals, or the defaults when none are stored
pub fn get_goals(db: &Database, user_id: &str) -> Result<MacroGoals, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    MacroGoals::get_or_default(&conn, user_id).map_err(|e| format!("Failed to get goals: {}", e))
}

pub fn set_goals(
    db: &Database,
    user_id: &str,
    update: GoalsUpdate,
    now: DateTime<Utc>,
) -> Result<MacroGoals, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let current = MacroGoals::get_or_default(&conn, user_id)
        .map_err(|e| format!("Failed to get goals: {}", e))?;
    let goals = MacroGoals::set(&conn, user_id, &update.apply_to(current), now)
        .map_err(|e| format!("Failed to set goals: {}", e))?;

    tracing::info!(
        "Goals for {}: {:.0} kcal, {:.0}g protein, {:.0}g carbohydrates, {:.0}g fat",
        user_id,
        goals.calories,
        goals.protein,
        goals.carbohydrates,
        goals.fat
    );
    Ok(goals)
}
