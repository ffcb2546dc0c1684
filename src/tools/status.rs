//! MacroTrackr Status Tool
//!
//! Provides runtime status information about the MacroTrackr service, plus
//! the usage guide handed to assistants at the start of a logging session.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal logging instructions for AI assistants
pub const MEAL_INSTRUCTIONS: &str = r#"
# MacroTrackr Meal Logging Instructions

This guide explains how to log meals and read progress with the MacroTrackr tools.

## Overview

Every logged meal carries:
1. **Meal type** - one of `breakfast`, `lunch`, `dinner`, `snack`
2. **Name** - what was eaten
3. **Quantity** - number of servings (defaults to 1; zero, negative or missing means 1)
4. **Nutrition** - either a direct per-serving entry OR a list of ingredients

The six tracked nutrients are calories (kcal), protein, carbohydrates, fat,
sugar and fiber (grams).

---

## Two Ways to Enter Nutrition

### Direct entry
Pass `nutrition` with all six fields for ONE serving:

```
log_meal({
  meal_type: "breakfast",
  name: "Oatmeal",
  quantity: 2.5,
  nutrition: { calories: 100, protein: 4, carbohydrates: 18, fat: 2, sugar: 1, fiber: 3 }
})
```

Total = per-serving nutrition × quantity (250 kcal above).

### Ingredient list
Set `compute_from_ingredients: true` and pass `ingredients`, each with a name
and six-field macros. The per-serving base is the sum of the ingredients, then
multiplied by quantity. Ingredients with a blank name are dropped.

```
log_meal({
  meal_type: "lunch",
  name: "Chicken Bowl",
  compute_from_ingredients: true,
  ingredients: [
    { name: "Chicken", macros: { calories: 165, protein: 31, carbohydrates: 0, fat: 3.6, sugar: 0, fiber: 0 } },
    { name: "Rice",    macros: { calories: 130, protein: 2.7, carbohydrates: 28, fat: 0.3, sugar: 0, fiber: 0.4 } }
  ]
})
```

A meal keeps both the direct entry and the ingredient list. Toggling
`compute_from_ingredients` with `update_meal` switches which one is used
without losing the other.

**Every nutrition record must include all six fields.** A record missing a
field is rejected. Negative values are stored as 0.

---

## Timestamps

Meals are bucketed into days by their `logged_at` timestamp in UTC. Omit
`logged_at` to log at the current time. Pass an RFC 3339 timestamp
(`2026-01-13T08:30:00Z`) to back-date an entry.

---

## Reading Progress

- `get_day(date)` - meals grouped breakfast, lunch, dinner, snack; totals;
  percent of goal; remaining; a status label per nutrient
- `get_stats(period, date)` - `week` (Monday start), `month` or `year`
  containing the date; the average is per day that has meals
- `get_widget_snapshot(date)` - compact totals + goals + progress
- `get_goals` / `set_goals` - daily targets (defaults 2000 kcal, 150 g protein,
  250 g carbohydrates, 65 g fat, 50 g sugar, 25 g fiber)

Progress can exceed 100%. A goal of 0 shows 0% and "no goal set".

---

## Re-logging

- `search_meals(query, filter)` - filter `all`, `meals`, `ingredients` or `favorites`
- `save_meal_template(meal_id)` then `add_template_to_today(template_id)`
- `set_meal_favorite(id, true)` marks a meal as a favorite

---

## Ingredients

- `save_ingredient_preset(name, macros, category?)` - per-unit macros; the
  food group is worked out from the name and macros when omitted
- `list_ingredient_presets()` / `delete_ingredient_preset(id)`
- `get_recent_ingredients(limit?)` - ingredients from the latest meals

---

## Lookups

- `lookup_barcode(barcode)` - OpenFoodFacts product, per-100g nutrition;
  returns a draft to review, nothing is logged
- `search_ingredients(query)` - USDA FoodData Central (needs an API key)
- `apply_recognition(name, confidence, nutrition)` - applies a recognised food
  when its confidence meets the configured threshold
"#;

/// Resident memory and uptime of this server process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub uptime_seconds: u64,
    pub memory_bytes: u64,
}

/// Payload of the `macrotrackr_status` tool
#[derive(Debug, Clone, Serialize)]
pub struct MacroTrackrStatus {
    pub build: BuildInfo,
    pub database_path: String,
    /// `None` until the database file exists
    pub database_size_bytes: Option<u64>,
    pub process: ProcessSnapshot,
    pub user_id: String,
    pub usda_search_enabled: bool,
}

pub struct StatusTracker {
    started: Instant,
    database_path: PathBuf,
    user_id: String,
    usda_search_enabled: bool,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, user_id: String, usda_search_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
            database_path,
            user_id,
            usda_search_enabled,
        }
    }

    fn process_snapshot(&self) -> ProcessSnapshot {
        let pid = Pid::from_u32(std::process::id());
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        ProcessSnapshot {
            pid: pid.as_u32(),
            uptime_seconds: self.started.elapsed().as_secs(),
            memory_bytes: sys.process(pid).map_or(0, |p| p.memory()),
        }
    }

    pub fn get_status(&self) -> MacroTrackrStatus {
        MacroTrackrStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes: std::fs::metadata(&self.database_path).ok().map(|m| m.len()),
            process: self.process_snapshot(),
            user_id: self.user_id.clone(),
            usda_search_enabled: self.usda_search_enabled,
        }
    }
}
