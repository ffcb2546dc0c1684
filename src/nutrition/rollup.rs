//! Daily and period rollups
//!
//! Pure reductions over meals the caller has already loaded. Nothing here
//! touches the database or holds state between calls.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::progress::{progress, ProgressVector};
use crate::input::InputError;
use crate::models::{MacroGoals, Meal, MealType, Nutrition};

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Start of `date` to start of the next day
    pub fn day(date: NaiveDate) -> Self {
        let start = midnight(date);
        Self::new(start, start + Duration::days(1))
    }

    /// ISO week (Monday start) containing `date`
    pub fn week(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        let start = midnight(date - Duration::days(offset));
        Self::new(start, start + Duration::days(7))
    }

    /// Calendar month containing `date`
    pub fn month(date: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
        let next = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)?
        };
        Some(Self::new(midnight(first), midnight(next)))
    }

    /// Calendar year containing `date`
    pub fn year(date: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
        let next = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?;
        Some(Self::new(midnight(first), midnight(next)))
    }

    /// Start inclusive, end exclusive
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts < self.end
    }

    /// Calendar days covered by the range
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut day = self.start.date_naive();
        while midnight(day) < self.end {
            dates.push(day);
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        dates
    }
}

/// Length of a statistics period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
        }
    }

    /// The period containing `anchor`
    pub fn range(&self, anchor: NaiveDate) -> Option<DateRange> {
        match self {
            StatsPeriod::Week => Some(DateRange::week(anchor)),
            StatsPeriod::Month => DateRange::month(anchor),
            StatsPeriod::Year => DateRange::year(anchor),
        }
    }
}

impl FromStr for StatsPeriod {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(StatsPeriod::Week),
            "month" => Ok(StatsPeriod::Month),
            "year" => Ok(StatsPeriod::Year),
            _ => Err(InputError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Meals and totals for one range
#[derive(Debug, Clone, Serialize)]
pub struct PeriodRollup {
    pub range: DateRange,
    pub meal_type: Option<MealType>,
    pub meal_count: usize,
    pub total_nutrition: Nutrition,
    pub meals: Vec<Meal>,
}

/// Reduce meals to the ones inside `range` (and matching `meal_type`)
pub fn rollup(meals: &[Meal], range: &DateRange, meal_type: Option<MealType>) -> PeriodRollup {
    let included: Vec<Meal> = meals
        .iter()
        .filter(|m| range.contains(&m.created_at))
        .filter(|m| meal_type.map_or(true, |t| m.meal_type == t))
        .cloned()
        .collect();
    let total_nutrition = included.iter().map(|m| m.total_nutrition).sum();

    PeriodRollup {
        range: *range,
        meal_type,
        meal_count: included.len(),
        total_nutrition,
        meals: included,
    }
}

/// Meals grouped by category
#[derive(Debug, Clone, Default, Serialize)]
pub struct MealGroups {
    pub breakfast: Vec<Meal>,
    pub lunch: Vec<Meal>,
    pub dinner: Vec<Meal>,
    pub snack: Vec<Meal>,
}

impl MealGroups {
    pub fn get(&self, meal_type: MealType) -> &[Meal] {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }

    /// Non-empty groups in breakfast, lunch, dinner, snack order
    pub fn ordered(&self) -> Vec<(MealType, &[Meal])> {
        MealType::ALL
            .iter()
            .map(|&t| (t, self.get(t)))
            .filter(|(_, meals)| !meals.is_empty())
            .collect()
    }
}

/// Group meals by type, keeping logged order within each group
pub fn group_by_meal_type(meals: &[Meal]) -> MealGroups {
    let mut groups = MealGroups::default();
    for meal in meals {
        let bucket = match meal.meal_type {
            MealType::Breakfast => &mut groups.breakfast,
            MealType::Lunch => &mut groups.lunch,
            MealType::Dinner => &mut groups.dinner,
            MealType::Snack => &mut groups.snack,
        };
        bucket.push(meal.clone());
    }
    groups
}

/// One day-bucket of a period
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub total_nutrition: Nutrition,
}

/// Per-day totals for every day in `range`, including empty days
pub fn daily_totals(meals: &[Meal], range: &DateRange) -> Vec<DailyTotal> {
    range
        .dates()
        .into_iter()
        .map(|date| {
            let day = rollup(meals, &DateRange::day(date), None);
            DailyTotal {
                date,
                meal_count: day.meal_count,
                total_nutrition: day.total_nutrition,
            }
        })
        .collect()
}

/// Period total divided by the number of days with at least one meal
pub fn average_per_day(days: &[DailyTotal]) -> Nutrition {
    let contributing: Vec<&DailyTotal> = days.iter().filter(|d| d.meal_count > 0).collect();
    if contributing.is_empty() {
        return Nutrition::zero();
    }
    let total: Nutrition = contributing.iter().map(|d| d.total_nutrition).sum();
    total.scale(1.0 / contributing.len() as f64)
}

/// Summary of a week, month or year
#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub range: DateRange,
    pub meal_count: usize,
    pub days_logged: usize,
    pub total_nutrition: Nutrition,
    pub average_nutrition: Nutrition,
    /// Progress of the daily average against daily goals
    pub average_progress: ProgressVector,
    /// Only days with at least one meal
    pub days: Vec<DailyTotal>,
}

pub fn period_stats(meals: &[Meal], range: &DateRange, goals: &MacroGoals) -> PeriodStats {
    let period = rollup(meals, range, None);
    let days = daily_totals(&period.meals, range);
    let average_nutrition = average_per_day(&days);
    let days: Vec<DailyTotal> = days.into_iter().filter(|d| d.meal_count > 0).collect();

    PeriodStats {
        range: *range,
        meal_count: period.meal_count,
        days_logged: days.len(),
        total_nutrition: period.total_nutrition,
        average_nutrition,
        average_progress: progress(&average_nutrition, goals),
        days,
    }
}
