//! Saved meal templates
//!
//! A template is a copy of a logged meal's data kept for quick re-logging.
//! It has no live link to its source: editing or deleting the original
//! meal leaves the template untouched.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{Meal, MealCreate, MealType, Nutrition};
use crate::db::row::{format_timestamp, json_column, nutrition_columns, timestamp_column};
use crate::db::{DbError, DbResult};
use crate::nutrition::{decorate_name, Ingredient};

/// A reusable meal template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMeal {
    pub id: i64,
    pub user_id: String,
    /// Meal the template was saved from, for reference only
    pub original_meal_id: Option<i64>,
    pub meal_type: MealType,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub quantity: f64,
    pub base_nutrition: Nutrition,
    pub compute_from_ingredients: bool,
    pub total_nutrition: Nutrition,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedMeal {
    pub fn display_name(&self) -> String {
        decorate_name(&self.name, self.quantity)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type_str: String = row.get("meal_type")?;
        let meal_type = meal_type_str.parse::<MealType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            original_meal_id: row.get("original_meal_id")?,
            meal_type,
            name: row.get("name")?,
            ingredients: json_column(row, "ingredients")?,
            notes: row.get("notes")?,
            image_url: row.get("image_url")?,
            quantity: row.get("quantity")?,
            base_nutrition: nutrition_columns(row, "base")?,
            compute_from_ingredients: row.get("compute_from_ingredients")?,
            total_nutrition: nutrition_columns(row, "total")?,
            is_favorite: row.get("is_favorite")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    /// Copy a logged meal into a new template
    pub fn save_from_meal(conn: &Connection, meal: &Meal, now: DateTime<Utc>) -> DbResult<Self> {
        let ingredients_json = serde_json::to_string(&meal.ingredients)?;
        let base = meal.base_nutrition;
        let total = meal.total_nutrition;

        conn.execute(
            r#"
            INSERT INTO saved_meals (
                user_id, original_meal_id, meal_type, name, ingredients, notes, image_url,
                quantity, compute_from_ingredients,
                base_calories, base_protein, base_carbohydrates, base_fat, base_sugar, base_fiber,
                total_calories, total_protein, total_carbohydrates, total_fat, total_sugar, total_fiber,
                is_favorite, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            "#,
            params![
                meal.user_id,
                meal.id,
                meal.meal_type.as_str(),
                meal.name,
                ingredients_json,
                meal.notes,
                meal.image_url,
                meal.quantity,
                meal.compute_from_ingredients,
                base.calories,
                base.protein,
                base.carbohydrates,
                base.fat,
                base.sugar,
                base.fiber,
                total.calories,
                total.protein,
                total.carbohydrates,
                total.fat,
                total.sugar,
                total.fiber,
                meal.is_favorite,
                format_timestamp(&now),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "SavedMeal", id })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM saved_meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(saved) => Ok(Some(saved)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Templates for a user, favorites first then by name
    pub fn list(conn: &Connection, user_id: &str, favorites_only: bool) -> DbResult<Vec<Self>> {
        let sql = if favorites_only {
            "SELECT * FROM saved_meals WHERE user_id = ?1 AND is_favorite = 1 ORDER BY name COLLATE NOCASE, id"
        } else {
            "SELECT * FROM saved_meals WHERE user_id = ?1 ORDER BY is_favorite DESC, name COLLATE NOCASE, id"
        };
        let mut stmt = conn.prepare(sql)?;

        let saved = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(saved)
    }

    pub fn set_favorite(conn: &Connection, id: i64, is_favorite: bool) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE saved_meals SET is_favorite = ?1 WHERE id = ?2",
            params![is_favorite, id],
        )?;
        Ok(rows > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM saved_meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Build a fresh meal from this template, logged at `now`
    ///
    /// The total is recomputed on create; the template's stored total is
    /// never copied across.
    pub fn instantiate(&self, meal_type: Option<MealType>, now: DateTime<Utc>) -> MealCreate {
        MealCreate {
            user_id: self.user_id.clone(),
            meal_type: meal_type.unwrap_or(self.meal_type),
            name: self.name.clone(),
            ingredients: self.ingredients.clone(),
            notes: self.notes.clone(),
            image_url: self.image_url.clone(),
            quantity: self.quantity,
            base_nutrition: self.base_nutrition,
            compute_from_ingredients: self.compute_from_ingredients,
            is_favorite: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::MealUpdate;
    use chrono::TimeZone;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn logged_meal(conn: &Connection) -> Meal {
        Meal::create(
            conn,
            &MealCreate {
                user_id: "alice".to_string(),
                meal_type: MealType::Lunch,
                name: "Chicken Bowl".to_string(),
                ingredients: vec![
                    Ingredient::new(
                        "Chicken",
                        Nutrition {
                            calories: 165.0,
                            protein: 31.0,
                            ..Nutrition::zero()
                        },
                    ),
                    Ingredient::new(
                        "Rice",
                        Nutrition {
                            calories: 130.0,
                            carbohydrates: 28.0,
                            ..Nutrition::zero()
                        },
                    ),
                ],
                notes: Some("Meal prep".to_string()),
                image_url: None,
                quantity: 1.0,
                base_nutrition: Nutrition::zero(),
                compute_from_ingredients: true,
                is_favorite: false,
                created_at: Utc.with_ymd_and_hms(2026, 1, 12, 12, 0, 0).unwrap(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_save_copies_meal_data() {
        let conn = conn();
        let meal = logged_meal(&conn);
        let saved = SavedMeal::save_from_meal(&conn, &meal, Utc::now()).unwrap();

        assert_eq!(saved.original_meal_id, Some(meal.id));
        assert_eq!(saved.name, meal.name);
        assert_eq!(saved.ingredients, meal.ingredients);
        assert_eq!(saved.total_nutrition, meal.total_nutrition);
    }

    #[test]
    fn test_template_survives_source_edit_and_delete() {
        let conn = conn();
        let meal = logged_meal(&conn);
        let saved = SavedMeal::save_from_meal(&conn, &meal, Utc::now()).unwrap();

        Meal::update(
            &conn,
            meal.id,
            &MealUpdate {
                quantity: Some(3.0),
                ..MealUpdate::default()
            },
            Utc::now(),
        )
        .unwrap();
        Meal::delete(&conn, meal.id).unwrap();

        let reloaded = SavedMeal::get_by_id(&conn, saved.id).unwrap().unwrap();
        assert_eq!(reloaded.quantity, 1.0);
        assert!((reloaded.total_nutrition.calories - 295.0).abs() < 1e-9);
    }

    #[test]
    fn test_instantiate_creates_new_meal_now() {
        let conn = conn();
        let meal = logged_meal(&conn);
        let saved = SavedMeal::save_from_meal(&conn, &meal, Utc::now()).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 1, 14, 13, 0, 0).unwrap();
        let fresh = Meal::create(&conn, &saved.instantiate(None, now)).unwrap();
        assert_ne!(fresh.id, meal.id);
        assert_eq!(fresh.created_at, now);
        assert_eq!(fresh.meal_type, MealType::Lunch);
        assert_eq!(fresh.total_nutrition, saved.total_nutrition);

        let as_dinner = saved.instantiate(Some(MealType::Dinner), now);
        assert_eq!(as_dinner.meal_type, MealType::Dinner);
    }

    #[test]
    fn test_list_and_favorite() {
        let conn = conn();
        let meal = logged_meal(&conn);
        let a = SavedMeal::save_from_meal(&conn, &meal, Utc::now()).unwrap();
        SavedMeal::save_from_meal(&conn, &meal, Utc::now()).unwrap();

        assert!(SavedMeal::set_favorite(&conn, a.id, true).unwrap());
        let favorites = SavedMeal::list(&conn, "alice", true).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(SavedMeal::list(&conn, "alice", false).unwrap()[0].id, a.id);

        assert!(SavedMeal::delete(&conn, a.id).unwrap());
        assert_eq!(SavedMeal::list(&conn, "alice", false).unwrap().len(), 1);
    }
}
