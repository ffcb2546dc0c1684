//! Day and Statistics MCP Tools
//!
//! Read-side tools: the daily view, period statistics and the widget
//! snapshot. Meals are loaded once per call and handed to the pure rollup
//! and progress functions.

use chrono::NaiveDate;
use serde::Serialize;

use super::meals::MealDetail;
use crate::db::Database;
use crate::input;
use crate::models::{MacroGoals, Meal, MealType, Nutrition};
use crate::nutrition::{
    breakdown, group_by_meal_type, period_stats, progress, remaining, rollup, DateRange,
    NutrientProgress, PeriodStats, ProgressVector, StatsPeriod,
};

/// Meals organized by type
#[derive(Debug, Serialize)]
pub struct DayMeals {
    pub breakfast: Vec<MealDetail>,
    pub lunch: Vec<MealDetail>,
    pub dinner: Vec<MealDetail>,
    pub snack: Vec<MealDetail>,
}

/// One non-empty meal category of the day, in display order
#[derive(Debug, Serialize)]
pub struct MealSection {
    pub meal_type: MealType,
    pub label: &'static str,
    pub meal_count: usize,
    pub total: Nutrition,
}

/// Day with meals, totals and goal progress
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub meal_type: Option<MealType>,
    pub meal_count: usize,
    pub sections: Vec<MealSection>,
    pub meals: DayMeals,
    pub nutrition_total: Nutrition,
    pub goals: MacroGoals,
    pub progress: ProgressVector,
    pub remaining: Nutrition,
    pub breakdown: Vec<NutrientProgress>,
}

/// Response for get_stats
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub period: StatsPeriod,
    pub anchor_date: NaiveDate,
    pub goals: MacroGoals,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

/// Read-only summary for a home-screen widget
#[derive(Debug, Serialize)]
pub struct WidgetSnapshot {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub total: Nutrition,
    pub goals: MacroGoals,
    pub progress: ProgressVector,
}

fn load_meals(db: &Database, user_id: &str, range: &DateRange) -> Result<(Vec<Meal>, MacroGoals), String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::list_in_range(&conn, user_id, range, None)
        .map_err(|e| format!("Failed to get meals: {}", e))?;
    let goals = MacroGoals::get_or_default(&conn, user_id)
        .map_err(|e| format!("Failed to get goals: {}", e))?;
    Ok((meals, goals))
}

/// Full day view, optionally restricted to one meal type
pub fn get_day(
    db: &Database,
    user_id: &str,
    date: &str,
    meal_type: Option<&str>,
) -> Result<DayDetail, String> {
    let date = input::parse_date(date).map_err(|e| e.to_string())?;
    let meal_type = meal_type
        .map(str::parse::<MealType>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let range = DateRange::day(date);

    let (meals, goals) = load_meals(db, user_id, &range)?;
    let day = rollup(&meals, &range, meal_type);
    let groups = group_by_meal_type(&day.meals);
    let sections = groups
        .ordered()
        .into_iter()
        .map(|(meal_type, meals)| MealSection {
            meal_type,
            label: meal_type.display_name(),
            meal_count: meals.len(),
            total: meals.iter().fold(Nutrition::zero(), |acc, m| acc + m.total_nutrition),
        })
        .collect();

    let details = |meals: Vec<Meal>| -> Vec<MealDetail> { meals.into_iter().map(MealDetail::from).collect() };
    let meals = DayMeals {
        breakfast: details(groups.breakfast),
        lunch: details(groups.lunch),
        dinner: details(groups.dinner),
        snack: details(groups.snack),
    };

    Ok(DayDetail {
        date,
        meal_type,
        meal_count: day.meal_count,
        sections,
        meals,
        nutrition_total: day.total_nutrition,
        goals,
        progress: progress(&day.total_nutrition, &goals),
        remaining: remaining(&day.total_nutrition, &goals),
        breakdown: breakdown(&day.total_nutrition, &goals),
    })
}

/// Week, month or year statistics around an anchor date
pub fn get_stats(db: &Database, user_id: &str, period: &str, anchor: &str) -> Result<StatsResponse, String> {
    let period: StatsPeriod = period.parse().map_err(|e: input::InputError| e.to_string())?;
    let anchor_date = input::parse_date(anchor).map_err(|e| e.to_string())?;
    let range = period
        .range(anchor_date)
        .ok_or_else(|| format!("Date out of range: {}", anchor_date))?;

    let (meals, goals) = load_meals(db, user_id, &range)?;
    let stats = period_stats(&meals, &range, &goals);
    tracing::debug!(
        "Stats for {} {}: {} meals over {} days",
        period.as_str(),
        anchor_date,
        stats.meal_count,
        stats.days_logged
    );

    Ok(StatsResponse {
        period,
        anchor_date,
        goals,
        stats,
    })
}

/// Totals, goals and progress for one day
pub fn widget_snapshot(db: &Database, user_id: &str, date: &str) -> Result<WidgetSnapshot, String> {
    let date = input::parse_date(date).map_err(|e| e.to_string())?;
    let range = DateRange::day(date);

    let (meals, goals) = load_meals(db, user_id, &range)?;
    let day = rollup(&meals, &range, None);

    Ok(WidgetSnapshot {
        date,
        meal_count: day.meal_count,
        total: day.total_nutrition,
        goals,
        progress: progress(&day.total_nutrition, &goals),
    })
}
