//! Meal model
//!
//! A logged item: one entry in a user's food log. Totals are computed by the
//! totals engine before every write that touches nutrition inputs, then
//! stored, so historical entries stay stable.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Nutrition;
use crate::db::row::{format_timestamp, json_column, nutrition_columns, timestamp_column};
use crate::db::{DbError, DbResult};
use crate::input::{non_blank, InputError};
use crate::nutrition::{decorate_name, named_only, Ingredient, MealDraft, NutritionSource, DateRange};

/// Meal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Fixed display order
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl FromStr for MealType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(InputError::UnknownMealType(s.to_string())),
        }
    }
}

/// History search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    All,
    Meals,
    Ingredients,
    Favorites,
}

impl FromStr for SearchFilter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(SearchFilter::All),
            "meals" => Ok(SearchFilter::Meals),
            "ingredients" => Ok(SearchFilter::Ingredients),
            "favorites" => Ok(SearchFilter::Favorites),
            _ => Err(InputError::UnknownSearchFilter(s.to_string())),
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: String,
    pub meal_type: MealType,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    /// Free-text preparation notes
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub quantity: f64,
    /// Per-unit direct entry
    pub base_nutrition: Nutrition,
    pub compute_from_ingredients: bool,
    pub total_nutrition: Nutrition,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub user_id: String,
    pub meal_type: MealType,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub quantity: f64,
    pub base_nutrition: Nutrition,
    pub compute_from_ingredients: bool,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

/// Data for editing a meal; id and creation time never change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealUpdate {
    pub meal_type: Option<MealType>,
    pub name: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    /// Blank text clears the stored value
    pub notes: Option<String>,
    /// Blank text clears the stored value
    pub image_url: Option<String>,
    pub quantity: Option<f64>,
    pub base_nutrition: Option<Nutrition>,
    pub compute_from_ingredients: Option<bool>,
    pub is_favorite: Option<bool>,
}

impl MealUpdate {
    /// Whether this update changes anything the total depends on
    pub fn touches_nutrition(&self) -> bool {
        self.ingredients.is_some()
            || self.quantity.is_some()
            || self.base_nutrition.is_some()
            || self.compute_from_ingredients.is_some()
    }
}

impl MealCreate {
    pub fn draft(&self) -> MealDraft {
        MealDraft::new(
            self.base_nutrition,
            self.ingredients.clone(),
            self.compute_from_ingredients,
            self.quantity,
        )
    }
}

impl Meal {
    /// Name shown in the log, with the quantity prefix when not one serving
    pub fn display_name(&self) -> String {
        decorate_name(&self.name, self.quantity)
    }

    /// The nutrition source selected by the stored mode flag
    pub fn source(&self) -> NutritionSource {
        self.draft().source()
    }

    pub fn draft(&self) -> MealDraft {
        MealDraft::new(
            self.base_nutrition,
            self.ingredients.clone(),
            self.compute_from_ingredients,
            self.quantity,
        )
    }

    /// Ingredient names, for search and display
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type_str: String = row.get("meal_type")?;
        let meal_type = MealType::from_str(&meal_type_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
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
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }

    /// Create a new meal, computing its total before the write
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        let ingredients = named_only(data.ingredients.clone());
        let draft = MealDraft::new(
            data.base_nutrition,
            ingredients,
            data.compute_from_ingredients,
            data.quantity,
        );
        let total = *draft.total();
        let ingredients_json = serde_json::to_string(draft.ingredients())?;
        let created_at = format_timestamp(&data.created_at);

        conn.execute(
            r#"
            INSERT INTO meals (
                user_id, meal_type, name, ingredients, notes, image_url,
                quantity, compute_from_ingredients,
                base_calories, base_protein, base_carbohydrates, base_fat, base_sugar, base_fiber,
                total_calories, total_protein, total_carbohydrates, total_fat, total_sugar, total_fiber,
                is_favorite, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            "#,
            params![
                data.user_id,
                data.meal_type.as_str(),
                data.name.trim(),
                ingredients_json,
                data.notes,
                data.image_url,
                draft.quantity(),
                draft.compute_from_ingredients(),
                data.base_nutrition.calories,
                data.base_nutrition.protein,
                data.base_nutrition.carbohydrates,
                data.base_nutrition.fat,
                data.base_nutrition.sugar,
                data.base_nutrition.fiber,
                total.calories,
                total.protein,
                total.carbohydrates,
                total.fat,
                total.sugar,
                total.fiber,
                data.is_favorite,
                created_at,
                created_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Meal", id })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Meals logged in `[range.start, range.end)`, oldest first
    pub fn list_in_range(
        conn: &Connection,
        user_id: &str,
        range: &DateRange,
        meal_type: Option<MealType>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from(
            "SELECT * FROM meals WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(user_id.to_string()),
            Box::new(format_timestamp(&range.start)),
            Box::new(format_timestamp(&range.end)),
        ];

        if let Some(meal_type) = meal_type {
            params_vec.push(Box::new(meal_type.as_str().to_string()));
            sql.push_str(&format!(" AND meal_type = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY created_at, id");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let meals = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Most recent meals, newest first
    pub fn list_recent(conn: &Connection, user_id: &str, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;

        let meals = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Distinct ingredients from the user's meals, most recently logged first
    ///
    /// Names are compared case-insensitively; the newest occurrence wins.
    pub fn recent_ingredients(conn: &Connection, user_id: &str, limit: usize) -> DbResult<Vec<Ingredient>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE user_id = ?1 AND ingredients != '[]'
             ORDER BY created_at DESC, id DESC",
        )?;
        let mut rows = stmt.query_map([user_id], Self::from_row)?;

        let mut seen = std::collections::HashSet::new();
        let mut recent = Vec::new();
        while recent.len() < limit {
            let meal = match rows.next() {
                Some(meal) => meal?,
                None => break,
            };
            for ingredient in meal.ingredients {
                if recent.len() < limit && seen.insert(ingredient.name.to_lowercase()) {
                    recent.push(ingredient);
                }
            }
        }

        Ok(recent)
    }

    /// Search meal history, newest first
    ///
    /// Matching is a case-insensitive substring test on the meal name and/or
    /// ingredient names depending on `filter`. An empty query lists recent
    /// meals (favorites only for the favorites filter).
    pub fn search(
        conn: &Connection,
        user_id: &str,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> DbResult<Vec<Self>> {
        let sql = if filter == SearchFilter::Favorites {
            "SELECT * FROM meals WHERE user_id = ?1 AND is_favorite = 1 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT * FROM meals WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        };
        let mut stmt = conn.prepare(sql)?;
        let candidates = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let needle = query.trim().to_lowercase();
        let matches = candidates
            .into_iter()
            .filter(|meal| meal.matches(&needle, filter))
            .take(limit)
            .collect();

        Ok(matches)
    }

    /// `needle` must already be lowercased and trimmed
    pub fn matches(&self, needle: &str, filter: SearchFilter) -> bool {
        if needle.is_empty() {
            return true;
        }
        let in_name = || self.name.to_lowercase().contains(needle);
        let in_ingredients = || {
            self.ingredient_names()
                .any(|name| name.to_lowercase().contains(needle))
        };
        match filter {
            SearchFilter::Meals => in_name(),
            SearchFilter::Ingredients => in_ingredients(),
            SearchFilter::All | SearchFilter::Favorites => in_name() || in_ingredients(),
        }
    }

    /// Edit a meal
    ///
    /// The stored total is recomputed only when a nutrition input changes.
    pub fn update(
        conn: &Connection,
        id: i64,
        data: &MealUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Self>> {
        let mut meal = match Self::get_by_id(conn, id)? {
            Some(meal) => meal,
            None => return Ok(None),
        };

        if let Some(meal_type) = data.meal_type {
            meal.meal_type = meal_type;
        }
        if let Some(ref name) = data.name {
            meal.name = name.trim().to_string();
        }
        if let Some(ref notes) = data.notes {
            meal.notes = non_blank(notes);
        }
        if let Some(ref image_url) = data.image_url {
            meal.image_url = non_blank(image_url);
        }
        if let Some(is_favorite) = data.is_favorite {
            meal.is_favorite = is_favorite;
        }

        if data.touches_nutrition() {
            let mut draft = meal.draft();
            if let Some(ref ingredients) = data.ingredients {
                draft.set_ingredients(named_only(ingredients.clone()));
            }
            if let Some(base) = data.base_nutrition {
                draft.set_base_nutrition(base);
            }
            if let Some(quantity) = data.quantity {
                draft.set_quantity(quantity);
            }
            if let Some(enabled) = data.compute_from_ingredients {
                draft.set_compute_from_ingredients(enabled);
            }
            let (quantity, base, ingredients, enabled, total) = draft.into_parts();
            meal.quantity = quantity;
            meal.base_nutrition = base;
            meal.ingredients = ingredients;
            meal.compute_from_ingredients = enabled;
            meal.total_nutrition = total;
        }

        let ingredients_json = serde_json::to_string(&meal.ingredients)?;
        let base = meal.base_nutrition;
        let total = meal.total_nutrition;

        conn.execute(
            r#"
            UPDATE meals SET
                meal_type = ?1, name = ?2, ingredients = ?3, notes = ?4, image_url = ?5,
                quantity = ?6, compute_from_ingredients = ?7,
                base_calories = ?8, base_protein = ?9, base_carbohydrates = ?10,
                base_fat = ?11, base_sugar = ?12, base_fiber = ?13,
                total_calories = ?14, total_protein = ?15, total_carbohydrates = ?16,
                total_fat = ?17, total_sugar = ?18, total_fiber = ?19,
                is_favorite = ?20, updated_at = ?21
            WHERE id = ?22
            "#,
            params![
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
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Toggle the favorite flag
    pub fn set_favorite(conn: &Connection, id: i64, is_favorite: bool, now: DateTime<Utc>) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE meals SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_favorite, format_timestamp(&now), id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a meal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::TimeZone;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn oatmeal() -> Nutrition {
        Nutrition {
            calories: 100.0,
            protein: 4.0,
            carbohydrates: 18.0,
            fat: 2.0,
            sugar: 1.0,
            fiber: 3.0,
        }
    }

    fn kcal(calories: f64) -> Nutrition {
        Nutrition {
            calories,
            ..Nutrition::zero()
        }
    }

    fn create_data(name: &str, at: DateTime<Utc>) -> MealCreate {
        MealCreate {
            user_id: "alice".to_string(),
            meal_type: MealType::Breakfast,
            name: name.to_string(),
            ingredients: Vec::new(),
            notes: None,
            image_url: None,
            quantity: 1.0,
            base_nutrition: oatmeal(),
            compute_from_ingredients: false,
            is_favorite: false,
            created_at: at,
        }
    }

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_create_direct_mode_stores_scaled_total() {
        let conn = conn();
        let at = Utc.with_ymd_and_hms(2026, 1, 13, 8, 30, 0).unwrap();
        let mut data = create_data("Oatmeal", at);
        data.quantity = 2.5;

        let meal = Meal::create(&conn, &data).unwrap();
        assert!((meal.total_nutrition.calories - 250.0).abs() < 1e-9);
        assert_eq!(meal.display_name(), "2.5 × Oatmeal");
        assert_eq!(meal.created_at, at);
    }

    #[test]
    fn test_create_ingredient_mode_drops_blank_slots() {
        let conn = conn();
        let mut data = create_data("Bowl", Utc::now());
        data.compute_from_ingredients = true;
        data.ingredients = vec![
            Ingredient::new("Oats", kcal(50.0)),
            Ingredient::new("Milk", kcal(75.0)),
            Ingredient::new("", kcal(400.0)),
            Ingredient::new("Honey", kcal(25.0)),
        ];

        let meal = Meal::create(&conn, &data).unwrap();
        assert_eq!(meal.ingredients.len(), 3);
        assert!((meal.total_nutrition.calories - 150.0).abs() < 1e-9);
        assert!(meal.source().is_ingredient_derived());
    }

    #[test]
    fn test_list_in_range_is_half_open() {
        let conn = conn();
        let start = Utc.with_ymd_and_hms(2026, 1, 13, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 14, 0, 0, 0).unwrap();
        Meal::create(&conn, &create_data("at start", start)).unwrap();
        Meal::create(&conn, &create_data("at end", end)).unwrap();

        let range = DateRange::new(start, end);
        let meals = Meal::list_in_range(&conn, "alice", &range, None).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "at start");

        let lunches = Meal::list_in_range(&conn, "alice", &range, Some(MealType::Lunch)).unwrap();
        assert!(lunches.is_empty());
    }

    #[test]
    fn test_update_recomputes_only_when_nutrition_changes() {
        let conn = conn();
        let meal = Meal::create(&conn, &create_data("Oatmeal", Utc::now())).unwrap();

        let renamed = Meal::update(
            &conn,
            meal.id,
            &MealUpdate {
                name: Some("Porridge".to_string()),
                ..MealUpdate::default()
            },
            Utc::now(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(renamed.name, "Porridge");
        assert_eq!(renamed.total_nutrition, meal.total_nutrition);
        assert_eq!(renamed.created_at, meal.created_at);

        let doubled = Meal::update(
            &conn,
            meal.id,
            &MealUpdate {
                quantity: Some(2.0),
                ..MealUpdate::default()
            },
            Utc::now(),
        )
        .unwrap()
        .unwrap();
        assert!((doubled.total_nutrition.calories - 200.0).abs() < 1e-9);
        assert_eq!(doubled.id, meal.id);
    }

    #[test]
    fn test_update_toggle_mode_keeps_direct_entry() {
        let conn = conn();
        let mut data = create_data("Eggs", Utc::now());
        data.ingredients = vec![Ingredient::new("Egg", kcal(70.0))];
        let meal = Meal::create(&conn, &data).unwrap();

        let toggled = Meal::update(
            &conn,
            meal.id,
            &MealUpdate {
                compute_from_ingredients: Some(true),
                ..MealUpdate::default()
            },
            Utc::now(),
        )
        .unwrap()
        .unwrap();
        assert!((toggled.total_nutrition.calories - 70.0).abs() < 1e-9);
        assert_eq!(toggled.base_nutrition, oatmeal());
    }

    #[test]
    fn test_update_missing_returns_none() {
        let conn = conn();
        assert!(Meal::update(&conn, 42, &MealUpdate::default(), Utc::now())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_search_filters() {
        let conn = conn();
        let mut salad = create_data("Chicken Salad", Utc::now());
        salad.ingredients = vec![Ingredient::new("Lettuce", kcal(5.0))];
        let salad = Meal::create(&conn, &salad).unwrap();
        let mut wrap = create_data("Wrap", Utc::now());
        wrap.ingredients = vec![Ingredient::new("Chicken breast", kcal(165.0))];
        wrap.is_favorite = true;
        Meal::create(&conn, &wrap).unwrap();

        let all = Meal::search(&conn, "alice", "chicken", SearchFilter::All, 50).unwrap();
        assert_eq!(all.len(), 2);

        let by_name = Meal::search(&conn, "alice", "CHICKEN", SearchFilter::Meals, 50).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, salad.id);

        let by_ingredient = Meal::search(&conn, "alice", "lettuce", SearchFilter::Ingredients, 50).unwrap();
        assert_eq!(by_ingredient.len(), 1);

        let favorites = Meal::search(&conn, "alice", "", SearchFilter::Favorites, 50).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Wrap");

        let other_user = Meal::search(&conn, "bob", "", SearchFilter::All, 50).unwrap();
        assert!(other_user.is_empty());
    }

    #[test]
    fn test_set_favorite_and_delete() {
        let conn = conn();
        let meal = Meal::create(&conn, &create_data("Toast", Utc::now())).unwrap();
        assert!(Meal::set_favorite(&conn, meal.id, true, Utc::now()).unwrap());
        assert!(Meal::get_by_id(&conn, meal.id).unwrap().unwrap().is_favorite);
        assert!(Meal::delete(&conn, meal.id).unwrap());
        assert!(!Meal::delete(&conn, meal.id).unwrap());
    }

    #[test]
    fn test_update_blank_text_clears_notes_and_image() {
        let conn = conn();
        let mut data = create_data("Toast", Utc::now());
        data.notes = Some("Sourdough".to_string());
        data.image_url = Some("https://example.com/toast.jpg".to_string());
        let meal = Meal::create(&conn, &data).unwrap();

        let cleared = Meal::update(
            &conn,
            meal.id,
            &MealUpdate {
                notes: Some(String::new()),
                image_url: Some("  ".to_string()),
                ..MealUpdate::default()
            },
            Utc::now(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(cleared.notes, None);
        assert_eq!(cleared.image_url, None);
    }

    #[test]
    fn test_recent_ingredients_newest_first_and_distinct() {
        let conn = conn();
        let early = Utc.with_ymd_and_hms(2026, 1, 12, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 1, 13, 8, 0, 0).unwrap();

        let mut first = create_data("Omelette", early);
        first.ingredients = vec![
            Ingredient::new("Egg", kcal(70.0)),
            Ingredient::new("Spinach", kcal(7.0)),
        ];
        Meal::create(&conn, &first).unwrap();
        let mut second = create_data("Fried Egg", late);
        second.ingredients = vec![Ingredient::new("egg", kcal(90.0))];
        Meal::create(&conn, &second).unwrap();
        Meal::create(&conn, &create_data("Oatmeal", late)).unwrap();

        let recent = Meal::recent_ingredients(&conn, "alice", 10).unwrap();
        let names: Vec<&str> = recent.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["egg", "Spinach"]);
        assert_eq!(recent[0].macros.calories, 90.0);

        assert_eq!(Meal::recent_ingredients(&conn, "alice", 1).unwrap().len(), 1);
        assert!(Meal::recent_ingredients(&conn, "bob", 10).unwrap().is_empty());
    }
}
