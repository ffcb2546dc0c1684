//! Integration tests for MacroTrackr
//!
//! These tests drive the tool layer against a pooled SQLite database:
//! - Logging and editing meals
//! - Daily view, statistics and widget snapshot
//! - Templates and recognition

use chrono::{TimeZone, Utc};
use macrotrackr::db::Database;
use macrotrackr::input::NutritionInput;
use macrotrackr::lookup::{FoodCandidate, RecognitionPolicy};
use macrotrackr::models::Nutrition;
use macrotrackr::tools::goals::GoalsUpdate;
use macrotrackr::tools::meals::{IngredientInput, LogMealRequest, UpdateMealRequest};
use macrotrackr::tools::ingredients::SavePresetRequest;
use macrotrackr::tools::{days, goals, ingredients, lookup, meals, templates};
use tempfile::TempDir;

/// Helper to create a migrated test database
fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let database = Database::new(&db_path).unwrap();
    database.migrate().unwrap();

    (database, temp_dir)
}

fn nutrition(calories: f64, protein: f64, carbohydrates: f64, fat: f64) -> NutritionInput {
    NutritionInput {
        calories: Some(calories),
        protein: Some(protein),
        carbohydrates: Some(carbohydrates),
        fat: Some(fat),
        sugar: Some(0.0),
        fiber: Some(0.0),
    }
}

fn log(meal_type: &str, name: &str, n: NutritionInput, logged_at: &str) -> LogMealRequest {
    LogMealRequest {
        user_id: "alice".to_string(),
        meal_type: meal_type.to_string(),
        name: name.to_string(),
        quantity: None,
        nutrition: Some(n),
        ingredients: Vec::new(),
        compute_from_ingredients: false,
        notes: None,
        image_url: None,
        logged_at: Some(logged_at.to_string()),
        is_favorite: false,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_end_to_end_daily_progress() {
    let (db, _temp) = create_test_db();
    let now = Utc.with_ymd_and_hms(2026, 1, 13, 20, 0, 0).unwrap();

    goals::set_goals(
        &db,
        "alice",
        GoalsUpdate {
            calories: Some(2000.0),
            protein: Some(150.0),
            carbohydrates: Some(250.0),
            fat: Some(65.0),
            ..GoalsUpdate::default()
        },
        now,
    )
    .unwrap();

    // Logged in reverse category order to check grouping
    meals::log_meal(&db, log("lunch", "Wrap", nutrition(400.0, 30.0, 40.0, 15.0), "2026-01-13T12:30:00Z"), now).unwrap();
    meals::log_meal(&db, log("breakfast", "Eggs", nutrition(200.0, 20.0, 10.0, 5.0), "2026-01-13T08:00:00Z"), now).unwrap();
    // Previous day, excluded
    meals::log_meal(&db, log("dinner", "Pizza", nutrition(900.0, 30.0, 100.0, 40.0), "2026-01-12T23:59:59Z"), now).unwrap();

    let day = days::get_day(&db, "alice", "2026-01-13", None).unwrap();
    assert_eq!(day.meal_count, 2);
    assert_eq!(day.meals.breakfast.len(), 1);
    assert_eq!(day.meals.lunch.len(), 1);
    assert!(day.meals.dinner.is_empty());

    // Sections follow breakfast, lunch, dinner, snack order, empty ones skipped
    let labels: Vec<&str> = day.sections.iter().map(|s| s.label).collect();
    assert_eq!(labels, vec!["Breakfast", "Lunch"]);
    assert!(close(day.sections[1].total.calories, 400.0));

    let total = day.nutrition_total;
    assert!(close(total.calories, 600.0));
    assert!(close(total.protein, 50.0));
    assert!(close(total.carbohydrates, 50.0));
    assert!(close(total.fat, 20.0));

    assert!(close(day.progress.calories, 30.0));
    assert!((day.progress.protein - 33.3).abs() < 0.05);
    assert!(close(day.progress.carbohydrates, 20.0));
    assert!((day.progress.fat - 30.8).abs() < 0.05);

    assert!(close(day.remaining.calories, 1400.0));
    assert!(close(day.remaining.protein, 100.0));
    assert!(close(day.remaining.carbohydrates, 200.0));
    assert!(close(day.remaining.fat, 45.0));
    assert_eq!(day.breakdown[0].label, "1400 kcal left");

    let lunch_only = days::get_day(&db, "alice", "2026-01-13", Some("lunch")).unwrap();
    assert_eq!(lunch_only.meal_count, 1);
    assert!(close(lunch_only.nutrition_total.calories, 400.0));

    let snapshot = days::widget_snapshot(&db, "alice", "2026-01-13").unwrap();
    assert!(close(snapshot.total.calories, 600.0));
    assert!(close(snapshot.progress.calories, 30.0));
}

#[test]
fn test_empty_day_is_zero_not_error() {
    let (db, _temp) = create_test_db();
    let day = days::get_day(&db, "alice", "2026-02-01", None).unwrap();
    assert_eq!(day.meal_count, 0);
    assert_eq!(day.nutrition_total, Nutrition::zero());
    assert_eq!(day.progress.calories, 0.0);
    assert!(days::get_day(&db, "alice", "02/01/2026", None).is_err());
}

#[test]
fn test_ingredient_meal_and_mode_toggle() {
    let (db, _temp) = create_test_db();
    let now = Utc::now();

    let mut request = log("breakfast", "Oat Bowl", nutrition(999.0, 0.0, 0.0, 0.0), "2026-01-13T07:00:00Z");
    request.compute_from_ingredients = true;
    request.ingredients = vec![
        IngredientInput { name: "Oats".to_string(), macros: nutrition(50.0, 2.0, 9.0, 1.0) },
        IngredientInput { name: "Milk".to_string(), macros: nutrition(75.0, 4.0, 6.0, 4.0) },
        IngredientInput { name: "Honey".to_string(), macros: nutrition(25.0, 0.0, 6.0, 0.0) },
    ];
    request.quantity = Some(2.0);

    let meal = meals::log_meal(&db, request, now).unwrap();
    assert!(close(meal.meal.total_nutrition.calories, 300.0));
    assert_eq!(meal.display_name, "2 × Oat Bowl");

    let direct = meals::update_meal(
        &db,
        meal.meal.id,
        UpdateMealRequest {
            compute_from_ingredients: Some(false),
            ..UpdateMealRequest::default()
        },
        now,
    )
    .unwrap()
    .unwrap();
    assert!(close(direct.meal.total_nutrition.calories, 1998.0));
    assert_eq!(direct.meal.ingredients.len(), 3);

    let single = meals::update_meal(
        &db,
        meal.meal.id,
        UpdateMealRequest {
            quantity: Some(0.0),
            nutrition: Some(NutritionInput {
                calories: Some(150.0),
                ..NutritionInput::default()
            }),
            ..UpdateMealRequest::default()
        },
        now,
    )
    .unwrap()
    .unwrap();
    assert_eq!(single.meal.quantity, 1.0);
    assert!(close(single.meal.total_nutrition.calories, 150.0));
    assert_eq!(single.display_name, "Oat Bowl");
}

#[test]
fn test_week_stats_average_per_logged_day() {
    let (db, _temp) = create_test_db();
    let now = Utc::now();

    meals::log_meal(&db, log("lunch", "A", nutrition(1000.0, 0.0, 0.0, 0.0), "2026-01-12T12:00:00Z"), now).unwrap();
    meals::log_meal(&db, log("dinner", "B", nutrition(800.0, 0.0, 0.0, 0.0), "2026-01-12T19:00:00Z"), now).unwrap();
    meals::log_meal(&db, log("lunch", "C", nutrition(1200.0, 0.0, 0.0, 0.0), "2026-01-18T12:00:00Z"), now).unwrap();
    // Following Monday, outside the week
    meals::log_meal(&db, log("lunch", "D", nutrition(5000.0, 0.0, 0.0, 0.0), "2026-01-19T00:00:00Z"), now).unwrap();

    let stats = days::get_stats(&db, "alice", "week", "2026-01-15").unwrap();
    assert_eq!(stats.stats.meal_count, 3);
    assert_eq!(stats.stats.days_logged, 2);
    assert!(close(stats.stats.total_nutrition.calories, 3000.0));
    assert!(close(stats.stats.average_nutrition.calories, 1500.0));
    assert!(close(stats.stats.average_progress.calories, 75.0));

    let empty = days::get_stats(&db, "alice", "month", "2025-06-10").unwrap();
    assert_eq!(empty.stats.days_logged, 0);
    assert_eq!(empty.stats.average_nutrition, Nutrition::zero());

    assert!(days::get_stats(&db, "alice", "decade", "2026-01-15").is_err());
}

#[test]
fn test_search_and_templates() {
    let (db, _temp) = create_test_db();
    let now = Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap();

    let mut salad = log("lunch", "Chicken Salad", nutrition(350.0, 30.0, 10.0, 20.0), "2026-01-13T12:00:00Z");
    salad.ingredients = vec![IngredientInput { name: "Lettuce".to_string(), macros: nutrition(5.0, 0.0, 1.0, 0.0) }];
    let salad = meals::log_meal(&db, salad, now).unwrap();
    meals::log_meal(&db, log("dinner", "Chicken Curry", nutrition(600.0, 40.0, 50.0, 25.0), "2026-01-14T19:00:00Z"), now).unwrap();

    let found = meals::search_meals(&db, "alice", "chicken", None, None).unwrap();
    assert_eq!(found.count, 2);
    assert_eq!(found.results[0].meal.name, "Chicken Curry");

    let by_ingredient = meals::search_meals(&db, "alice", "lettuce", Some("ingredients"), None).unwrap();
    assert_eq!(by_ingredient.count, 1);

    assert!(meals::set_meal_favorite(&db, salad.meal.id, true, now).unwrap());
    let favorites = meals::search_meals(&db, "alice", "", Some("favorites"), None).unwrap();
    assert_eq!(favorites.count, 1);
    assert!(meals::search_meals(&db, "alice", "x", Some("starred"), None).is_err());

    let template = templates::save_meal_template(&db, salad.meal.id, now).unwrap().unwrap();
    assert_eq!(template.template.original_meal_id, Some(salad.meal.id));
    assert!(meals::delete_meal(&db, salad.meal.id).unwrap());

    let relogged = templates::add_template_to_today(&db, template.template.id, Some("dinner"), now)
        .unwrap()
        .unwrap();
    assert_ne!(relogged.meal.id, salad.meal.id);
    assert_eq!(relogged.meal.created_at, now);
    assert!(close(relogged.meal.total_nutrition.calories, 350.0));

    let listed = templates::list_meal_templates(&db, "alice", false).unwrap();
    assert_eq!(listed.total, 1);
    assert!(templates::delete_meal_template(&db, template.template.id).unwrap());
    assert!(templates::add_template_to_today(&db, template.template.id, None, now).unwrap().is_none());
}

#[test]
fn test_recognition_threshold() {
    let (db, _temp) = create_test_db();
    let policy = RecognitionPolicy::new(0.3);
    let now = Utc.with_ymd_and_hms(2026, 1, 13, 15, 0, 0).unwrap();
    let banana = Nutrition {
        calories: 89.0,
        carbohydrates: 23.0,
        ..Nutrition::zero()
    };

    let low = lookup::apply_recognition(&db, &policy, "alice", FoodCandidate::new("Banana", 0.2, banana), None, false, now).unwrap();
    assert!(!low.applied);
    assert!(low.meal.is_none());
    assert_eq!(low.prefill.name, "Banana");

    let confirmed = lookup::apply_recognition(&db, &policy, "alice", FoodCandidate::new("Banana", 0.2, banana), None, true, now).unwrap();
    assert!(confirmed.applied);

    let high = lookup::apply_recognition(&db, &policy, "alice", FoodCandidate::new("Banana", 0.3, banana), Some("snack"), false, now).unwrap();
    assert!(high.applied);
    let meal = high.meal.unwrap();
    assert!(close(meal.meal.total_nutrition.calories, 89.0));

    let day = days::get_day(&db, "alice", "2026-01-13", None).unwrap();
    assert_eq!(day.meal_count, 2);
}

#[test]
fn test_missing_nutrition_field_is_rejected() {
    let (db, _temp) = create_test_db();
    let mut request = log("snack", "Mystery", nutrition(100.0, 1.0, 1.0, 1.0), "2026-01-13T10:00:00Z");
    request.nutrition = Some(NutritionInput {
        fiber: None,
        ..nutrition(100.0, 1.0, 1.0, 1.0)
    });
    let err = meals::log_meal(&db, request, Utc::now()).unwrap_err();
    assert!(err.contains("fiber"));
}

#[test]
fn test_ingredient_presets_and_recent_ingredients() {
    let (db, _temp) = create_test_db();
    let now = Utc.with_ymd_and_hms(2026, 1, 13, 9, 0, 0).unwrap();

    for (name, macros) in [
        ("Whey Scoop", nutrition(120.0, 24.0, 3.0, 1.5)),
        ("banana", nutrition(105.0, 1.3, 27.0, 0.4)),
    ] {
        ingredients::save_ingredient_preset(
            &db,
            SavePresetRequest {
                user_id: "alice".to_string(),
                name: name.to_string(),
                category: None,
                macros,
            },
            now,
        )
        .unwrap();
    }

    let listed = ingredients::list_ingredient_presets(&db, "alice").unwrap();
    assert_eq!(listed.total, 2);
    assert_eq!(listed.presets[0].name, "banana");
    assert_eq!(listed.presets[0].category.as_str(), "fruits");
    assert_eq!(listed.presets[1].category.as_str(), "protein");

    let whey_id = listed.presets[1].id;
    assert!(!ingredients::delete_ingredient_preset(&db, whey_id, "bob").unwrap());
    assert!(ingredients::delete_ingredient_preset(&db, whey_id, "alice").unwrap());
    assert_eq!(ingredients::list_ingredient_presets(&db, "alice").unwrap().total, 1);

    let mut shake = log("breakfast", "Shake", nutrition(0.0, 0.0, 0.0, 0.0), "2026-01-13T08:00:00Z");
    shake.compute_from_ingredients = true;
    shake.ingredients = vec![
        IngredientInput {
            name: "Banana".to_string(),
            macros: nutrition(105.0, 1.3, 27.0, 0.4),
        },
        IngredientInput {
            name: "Milk".to_string(),
            macros: nutrition(100.0, 8.0, 12.0, 2.5),
        },
    ];
    meals::log_meal(&db, shake, now).unwrap();

    let recent = ingredients::recent_ingredients(&db, "alice", None).unwrap();
    assert_eq!(recent.total, 2);
    assert_eq!(recent.ingredients[0].ingredient.name, "Banana");
    assert_eq!(recent.ingredients[1].category.as_str(), "dairy");
}
