//! Data models
//!
//! Rust structs representing database entities.

mod goals;
mod ingredient_preset;
mod meal;
mod nutrition;
mod saved_meal;

pub use goals::MacroGoals;
pub use ingredient_preset::{IngredientPreset, IngredientPresetCreate};
pub use meal::{Meal, MealCreate, MealType, MealUpdate, SearchFilter};
pub use nutrition::{Nutrient, Nutrition};
pub use saved_meal::SavedMeal;
