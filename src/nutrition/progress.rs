//! Goal progress
//!
//! Converts totals and goals into percent-of-goal, remaining amounts and
//! status labels. A goal of zero (or less) never divides: its progress is 0.

use serde::{Deserialize, Serialize};

use super::scaling::format_amount;
use crate::models::{MacroGoals, Nutrient, Nutrition};

/// Percent of goal per nutrient (may exceed 100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressVector {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub sugar: f64,
    pub fiber: f64,
}

impl ProgressVector {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Fat => self.fat,
            Nutrient::Sugar => self.sugar,
            Nutrient::Fiber => self.fiber,
        }
    }
}

/// Goal status for a single nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "remaining", rename_all = "snake_case")]
pub enum GoalStatus {
    /// Goal is zero or unset
    NoGoal,
    GoalReached,
    OnTrack(f64),
}

impl GoalStatus {
    pub fn label(&self, unit: &str) -> String {
        match self {
            GoalStatus::NoGoal => "no goal set".to_string(),
            GoalStatus::GoalReached => "goal reached".to_string(),
            GoalStatus::OnTrack(left) => format!("{} {} left", format_amount(*left), unit),
        }
    }
}

/// `(total / goal) * 100`, or 0 when the goal is not positive
pub fn percent_of_goal(total: f64, goal: f64) -> f64 {
    if goal <= 0.0 || !goal.is_finite() {
        return 0.0;
    }
    let percent = (total / goal) * 100.0;
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}

/// `max(goal - total, 0)`
pub fn remaining_amount(total: f64, goal: f64) -> f64 {
    (goal - total).max(0.0)
}

pub fn goal_status(total: f64, goal: f64) -> GoalStatus {
    if goal <= 0.0 {
        GoalStatus::NoGoal
    } else if total >= goal {
        GoalStatus::GoalReached
    } else {
        GoalStatus::OnTrack(remaining_amount(total, goal))
    }
}

pub fn progress(total: &Nutrition, goals: &MacroGoals) -> ProgressVector {
    let goal = goals.as_nutrition();
    ProgressVector {
        calories: percent_of_goal(total.calories, goal.calories),
        protein: percent_of_goal(total.protein, goal.protein),
        carbohydrates: percent_of_goal(total.carbohydrates, goal.carbohydrates),
        fat: percent_of_goal(total.fat, goal.fat),
        sugar: percent_of_goal(total.sugar, goal.sugar),
        fiber: percent_of_goal(total.fiber, goal.fiber),
    }
}

/// Remaining-to-goal, clamped at zero per nutrient
pub fn remaining(total: &Nutrition, goals: &MacroGoals) -> Nutrition {
    let goal = goals.as_nutrition();
    let mut left = Nutrition::zero();
    for nutrient in Nutrient::ALL {
        left.set(nutrient, remaining_amount(total.get(nutrient), goal.get(nutrient)));
    }
    left
}

/// One row of the dashboard breakdown
#[derive(Debug, Clone, Serialize)]
pub struct NutrientProgress {
    pub nutrient: Nutrient,
    pub total: f64,
    pub goal: f64,
    pub percent: f64,
    pub remaining: f64,
    pub status: GoalStatus,
    pub label: String,
}

/// Per-nutrient breakdown in display order
pub fn breakdown(total: &Nutrition, goals: &MacroGoals) -> Vec<NutrientProgress> {
    let goal = goals.as_nutrition();
    Nutrient::ALL
        .iter()
        .map(|&nutrient| {
            let t = total.get(nutrient);
            let g = goal.get(nutrient);
            let status = goal_status(t, g);
            NutrientProgress {
                nutrient,
                total: t,
                goal: g,
                percent: percent_of_goal(t, g),
                remaining: remaining_amount(t, g),
                status,
                label: status.label(nutrient.unit()),
            }
        })
        .collect()
}
