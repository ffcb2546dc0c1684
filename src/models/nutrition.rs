//! Shared nutrition data structure
//!
//! The six-field macro vector used for per-unit nutrition, meal totals,
//! day rollups and goals. Element-wise addition forms a commutative monoid
//! with `Nutrition::zero()` as identity; `scale` multiplies every field by a
//! scalar.

use serde::{Deserialize, Serialize};

/// Nutritional information
///
/// Every field is required on deserialization: a record missing a field is a
/// schema mismatch and fails immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,      // kcal
    pub protein: f64,       // grams
    pub carbohydrates: f64, // grams
    pub fat: f64,           // grams
    pub sugar: f64,         // grams
    pub fiber: f64,         // grams
}

/// One of the six tracked macro fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbohydrates,
    Fat,
    Sugar,
    Fiber,
}

impl Nutrient {
    /// All nutrients in display order
    pub const ALL: [Nutrient; 6] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
        Nutrient::Sugar,
        Nutrient::Fiber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fat => "fat",
            Nutrient::Sugar => "sugar",
            Nutrient::Fiber => "fiber",
        }
    }

    /// Unit label used in status text
    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            _ => "g",
        }
    }
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Read a single field
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

    /// Overwrite a single field
    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbohydrates => self.carbohydrates = value,
            Nutrient::Fat => self.fat = value,
            Nutrient::Sugar => self.sugar = value,
            Nutrient::Fiber => self.fiber = value,
        }
    }

    /// Apply `f` to every field
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            calories: f(self.calories),
            protein: f(self.protein),
            carbohydrates: f(self.carbohydrates),
            fat: f(self.fat),
            sugar: f(self.sugar),
            fiber: f(self.fiber),
        }
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        self.map(|v| v * multiplier)
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            fat: self.fat + other.fat,
            sugar: self.sugar + other.sugar,
            fiber: self.fiber + other.fiber,
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::AddAssign for Nutrition {
    fn add_assign(&mut self, other: Nutrition) {
        *self = Nutrition::add(self, &other);
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + *n)
    }
}
