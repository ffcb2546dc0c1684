//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MEALS
        -- Logged items; total_* is computed before the write and never
        -- recomputed lazily
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
            name TEXT NOT NULL,
            ingredients TEXT NOT NULL DEFAULT '[]',   -- JSON [{name, macros}]
            notes TEXT,
            image_url TEXT,
            quantity REAL NOT NULL DEFAULT 1.0 CHECK(quantity > 0),
            compute_from_ingredients INTEGER NOT NULL DEFAULT 0,

            -- Per-unit direct entry
            base_calories REAL NOT NULL DEFAULT 0,
            base_protein REAL NOT NULL DEFAULT 0,
            base_carbohydrates REAL NOT NULL DEFAULT 0,
            base_fat REAL NOT NULL DEFAULT 0,
            base_sugar REAL NOT NULL DEFAULT 0,
            base_fiber REAL NOT NULL DEFAULT 0,

            -- Stored totals
            total_calories REAL NOT NULL DEFAULT 0,
            total_protein REAL NOT NULL DEFAULT 0,
            total_carbohydrates REAL NOT NULL DEFAULT 0,
            total_fat REAL NOT NULL DEFAULT 0,
            total_sugar REAL NOT NULL DEFAULT 0,
            total_fiber REAL NOT NULL DEFAULT 0,

            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,                 -- RFC 3339 UTC
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_meals_user_created ON meals(user_id, created_at);
        CREATE INDEX idx_meals_favorite ON meals(user_id, is_favorite);

        -- ============================================
        -- SAVED MEALS
        -- Reusable templates; own copy of nutrition, no live link
        -- ============================================
        CREATE TABLE saved_meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            original_meal_id INTEGER,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),
            name TEXT NOT NULL,
            ingredients TEXT NOT NULL DEFAULT '[]',
            notes TEXT,
            image_url TEXT,
            quantity REAL NOT NULL DEFAULT 1.0 CHECK(quantity > 0),
            compute_from_ingredients INTEGER NOT NULL DEFAULT 0,

            base_calories REAL NOT NULL DEFAULT 0,
            base_protein REAL NOT NULL DEFAULT 0,
            base_carbohydrates REAL NOT NULL DEFAULT 0,
            base_fat REAL NOT NULL DEFAULT 0,
            base_sugar REAL NOT NULL DEFAULT 0,
            base_fiber REAL NOT NULL DEFAULT 0,

            total_calories REAL NOT NULL DEFAULT 0,
            total_protein REAL NOT NULL DEFAULT 0,
            total_carbohydrates REAL NOT NULL DEFAULT 0,
            total_fat REAL NOT NULL DEFAULT 0,
            total_sugar REAL NOT NULL DEFAULT 0,
            total_fiber REAL NOT NULL DEFAULT 0,

            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_saved_meals_user ON saved_meals(user_id);

        -- ============================================
        -- MACRO GOALS
        -- One row per user
        -- ============================================
        CREATE TABLE macro_goals (
            user_id TEXT PRIMARY KEY,
            calories REAL NOT NULL,
            protein REAL NOT NULL,
            carbohydrates REAL NOT NULL,
            fat REAL NOT NULL,
            sugar REAL NOT NULL,
            fiber REAL NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Migration v2: per-user ingredient presets
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE ingredient_presets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'other',

            -- Per one unit of the ingredient
            unit_calories REAL NOT NULL DEFAULT 0,
            unit_protein REAL NOT NULL DEFAULT 0,
            unit_carbohydrates REAL NOT NULL DEFAULT 0,
            unit_fat REAL NOT NULL DEFAULT 0,
            unit_sugar REAL NOT NULL DEFAULT 0,
            unit_fiber REAL NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_ingredient_presets_user ON ingredient_presets(user_id, name);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
