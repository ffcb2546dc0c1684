//! Nutrition calculation module
//!
//! Quantity scaling, ingredient aggregation, meal totals, rollups and goal
//! progress. Everything here is a pure function of its inputs.

pub mod ingredients;
pub mod progress;
pub mod rollup;
pub mod scaling;
pub mod totals;

pub use ingredients::{aggregate, categorize, named_only, Ingredient, IngredientCategory};
pub use progress::{
    breakdown, goal_status, percent_of_goal, progress, remaining, remaining_amount, GoalStatus,
    NutrientProgress, ProgressVector,
};
pub use rollup::{
    average_per_day, daily_totals, group_by_meal_type, period_stats, rollup, DailyTotal,
    DateRange, MealGroups, PeriodRollup, PeriodStats, StatsPeriod,
};
pub use scaling::{decorate_name, format_amount, is_single_serving, scale_by_quantity, DEFAULT_QUANTITY};
pub use totals::{compute_total, MealDraft, NutritionSource};
