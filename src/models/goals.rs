//! Macro goals model
//!
//! Daily targets per user. Missing rows fall back to the application defaults.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::Nutrition;
use crate::db::row::format_timestamp;
use crate::db::DbResult;

/// Daily macro targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub sugar: f64,
    pub fiber: f64,
}

impl Default for MacroGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbohydrates: 250.0,
            fat: 65.0,
            sugar: 50.0,
            fiber: 25.0,
        }
    }
}

impl MacroGoals {
    pub fn as_nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            sugar: self.sugar,
            fiber: self.fiber,
        }
    }

    pub fn from_nutrition(n: Nutrition) -> Self {
        Self {
            calories: n.calories,
            protein: n.protein,
            carbohydrates: n.carbohydrates,
            fat: n.fat,
            sugar: n.sugar,
            fiber: n.fiber,
        }
    }

    /// Stored goals for a user, if any
    pub fn get_for_user(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let goals = conn
            .query_row(
                "SELECT calories, protein, carbohydrates, fat, sugar, fiber
                 FROM macro_goals WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(Self {
                        calories: row.get(0)?,
                        protein: row.get(1)?,
                        carbohydrates: row.get(2)?,
                        fat: row.get(3)?,
                        sugar: row.get(4)?,
                        fiber: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(goals)
    }

    /// Stored goals, or the defaults when the user has none yet
    pub fn get_or_default(conn: &Connection, user_id: &str) -> DbResult<Self> {
        Ok(Self::get_for_user(conn, user_id)?.unwrap_or_default())
    }

    /// Insert or replace a user's goals
    pub fn set(conn: &Connection, user_id: &str, goals: &MacroGoals, now: DateTime<Utc>) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO macro_goals (user_id, calories, protein, carbohydrates, fat, sugar, fiber, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                calories = excluded.calories,
                protein = excluded.protein,
                carbohydrates = excluded.carbohydrates,
                fat = excluded.fat,
                sugar = excluded.sugar,
                fiber = excluded.fiber,
                updated_at = excluded.updated_at
            "#,
            params![
                user_id,
                goals.calories,
                goals.protein,
                goals.carbohydrates,
                goals.fat,
                goals.sugar,
                goals.fiber,
                format_timestamp(&now),
            ],
        )?;
        Ok(*goals)
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

    #[test]
    fn test_defaults() {
        let g = MacroGoals::default();
        assert_eq!(g.calories, 2000.0);
        assert_eq!(g.protein, 150.0);
        assert_eq!(g.carbohydrates, 250.0);
        assert_eq!(g.fat, 65.0);
        assert_eq!(g.sugar, 50.0);
        assert_eq!(g.fiber, 25.0);
    }

    #[test]
    fn test_missing_row_uses_defaults() {
        let conn = conn();
        assert!(MacroGoals::get_for_user(&conn, "alice").unwrap().is_none());
        assert_eq!(MacroGoals::get_or_default(&conn, "alice").unwrap(), MacroGoals::default());
    }

    #[test]
    fn test_set_upserts() {
        let conn = conn();
        let now = Utc::now();
        let mut goals = MacroGoals::default();
        goals.calories = 1800.0;
        MacroGoals::set(&conn, "alice", &goals, now).unwrap();
        goals.protein = 0.0;
        MacroGoals::set(&conn, "alice", &goals, now).unwrap();

        let stored = MacroGoals::get_or_default(&conn, "alice").unwrap();
        assert_eq!(stored.calories, 1800.0);
        assert_eq!(stored.protein, 0.0);
        assert_eq!(MacroGoals::get_or_default(&conn, "bob").unwrap(), MacroGoals::default());
    }
}
