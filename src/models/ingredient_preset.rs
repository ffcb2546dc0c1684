//! User ingredient presets
//!
//! Ingredients a user saved with their own per-unit macros, for reuse when
//! composing meals.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Nutrition;
use crate::db::row::{format_timestamp, nutrition_columns, timestamp_column};
use crate::db::{DbError, DbResult};
use crate::nutrition::{categorize, Ingredient, IngredientCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientPreset {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub category: IngredientCategory,
    /// Per one unit
    pub macros: Nutrition,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientPresetCreate {
    pub user_id: String,
    pub name: String,
    /// Derived from the name and macros when not given
    pub category: Option<IngredientCategory>,
    pub macros: Nutrition,
    pub created_at: DateTime<Utc>,
}

impl IngredientPreset {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category_str: String = row.get("category")?;
        let category = category_str.parse::<IngredientCategory>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            category,
            macros: nutrition_columns(row, "unit")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    /// The preset as a meal ingredient line
    pub fn ingredient(&self) -> Ingredient {
        Ingredient::new(self.name.clone(), self.macros)
    }

    pub fn create(conn: &Connection, data: &IngredientPresetCreate) -> DbResult<Self> {
        let name = data.name.trim();
        let category = data
            .category
            .unwrap_or_else(|| categorize(name, &data.macros));
        let m = data.macros;

        conn.execute(
            r#"
            INSERT INTO ingredient_presets (
                user_id, name, category,
                unit_calories, unit_protein, unit_carbohydrates, unit_fat, unit_sugar, unit_fiber,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                data.user_id,
                name,
                category.as_str(),
                m.calories,
                m.protein,
                m.carbohydrates,
                m.fat,
                m.sugar,
                m.fiber,
                format_timestamp(&data.created_at),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "IngredientPreset", id })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_presets WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(preset) => Ok(Some(preset)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's presets ordered by name
    pub fn list(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM ingredient_presets WHERE user_id = ?1 ORDER BY name COLLATE NOCASE, id",
        )?;

        let presets = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(presets)
    }

    /// Delete one of `user_id`'s presets
    pub fn delete(conn: &Connection, id: i64, user_id: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM ingredient_presets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn preset(name: &str, protein: f64, carbohydrates: f64, fat: f64) -> IngredientPresetCreate {
        IngredientPresetCreate {
            user_id: "alice".to_string(),
            name: name.to_string(),
            category: None,
            macros: Nutrition {
                calories: protein * 4.0 + carbohydrates * 4.0 + fat * 9.0,
                protein,
                carbohydrates,
                fat,
                ..Nutrition::zero()
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_derives_category() {
        let conn = conn();
        let whey = IngredientPreset::create(&conn, &preset(" Whey Scoop ", 24.0, 3.0, 1.5)).unwrap();
        assert_eq!(whey.name, "Whey Scoop");
        assert_eq!(whey.category, IngredientCategory::Protein);

        let mut labelled = preset("Mystery Mix", 1.0, 1.0, 1.0);
        labelled.category = Some(IngredientCategory::Grains);
        let labelled = IngredientPreset::create(&conn, &labelled).unwrap();
        assert_eq!(labelled.category, IngredientCategory::Grains);
    }

    #[test]
    fn test_list_ordered_by_name_per_user() {
        let conn = conn();
        IngredientPreset::create(&conn, &preset("oat milk", 1.0, 7.0, 1.5)).unwrap();
        IngredientPreset::create(&conn, &preset("Almond Butter", 7.0, 6.0, 18.0)).unwrap();
        let mut other = preset("Bagel", 10.0, 50.0, 1.0);
        other.user_id = "bob".to_string();
        IngredientPreset::create(&conn, &other).unwrap();

        let names: Vec<String> = IngredientPreset::list(&conn, "alice")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Almond Butter", "oat milk"]);
    }

    #[test]
    fn test_delete_is_scoped_to_owner() {
        let conn = conn();
        let p = IngredientPreset::create(&conn, &preset("Honey", 0.0, 17.0, 0.0)).unwrap();
        assert!(!IngredientPreset::delete(&conn, p.id, "bob").unwrap());
        assert!(IngredientPreset::delete(&conn, p.id, "alice").unwrap());
        assert!(IngredientPreset::get_by_id(&conn, p.id).unwrap().is_none());
    }
}
