//! Meal totals engine
//!
//! A meal's nutrition comes either from a direct per-unit entry or from the
//! sum of its ingredients. Either way the base is multiplied by the logged
//! quantity.

use serde::{Deserialize, Serialize};

use super::ingredients::{aggregate, Ingredient};
use super::scaling::{scale_by_quantity, DEFAULT_QUANTITY};
use crate::models::{Nutrient, Nutrition};

/// Where a meal's per-unit nutrition comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NutritionSource {
    DirectEntry { base_nutrition: Nutrition },
    IngredientDerived { ingredients: Vec<Ingredient> },
}

impl NutritionSource {
    /// Per-unit nutrition before quantity scaling
    pub fn base(&self) -> Nutrition {
        match self {
            NutritionSource::DirectEntry { base_nutrition } => *base_nutrition,
            NutritionSource::IngredientDerived { ingredients } => aggregate(ingredients),
        }
    }

    pub fn is_ingredient_derived(&self) -> bool {
        matches!(self, NutritionSource::IngredientDerived { .. })
    }
}

/// Final nutrition for a meal
pub fn compute_total(source: &NutritionSource, quantity: f64) -> Nutrition {
    scale_by_quantity(&source.base(), quantity)
}

/// Editable meal nutrition state
///
/// Holds the direct entry and the ingredient list side by side so toggling
/// the mode never discards either. `total` is recomputed by every mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDraft {
    quantity: f64,
    base_nutrition: Nutrition,
    ingredients: Vec<Ingredient>,
    compute_from_ingredients: bool,
    total: Nutrition,
}

impl Default for MealDraft {
    fn default() -> Self {
        Self::new(Nutrition::zero(), Vec::new(), false, DEFAULT_QUANTITY)
    }
}

impl MealDraft {
    pub fn new(
        base_nutrition: Nutrition,
        ingredients: Vec<Ingredient>,
        compute_from_ingredients: bool,
        quantity: f64,
    ) -> Self {
        let mut draft = Self {
            quantity,
            base_nutrition,
            ingredients,
            compute_from_ingredients,
            total: Nutrition::zero(),
        };
        draft.recompute();
        draft
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn base_nutrition(&self) -> &Nutrition {
        &self.base_nutrition
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn compute_from_ingredients(&self) -> bool {
        self.compute_from_ingredients
    }

    pub fn total(&self) -> &Nutrition {
        &self.total
    }

    /// The source selected by the current mode
    pub fn source(&self) -> NutritionSource {
        if self.compute_from_ingredients {
            NutritionSource::IngredientDerived {
                ingredients: self.ingredients.clone(),
            }
        } else {
            NutritionSource::DirectEntry {
                base_nutrition: self.base_nutrition,
            }
        }
    }

    /// Recompute `total` from the held data in the current mode
    pub fn recompute(&mut self) -> &Nutrition {
        self.total = compute_total(&self.source(), self.quantity);
        &self.total
    }

    pub fn set_compute_from_ingredients(&mut self, enabled: bool) {
        self.compute_from_ingredients = enabled;
        self.recompute();
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_base_nutrition(&mut self, base: Nutrition) {
        self.base_nutrition = base;
        self.recompute();
    }

    pub fn set_base_field(&mut self, nutrient: Nutrient, value: f64) {
        self.base_nutrition.set(nutrient, value);
        self.recompute();
    }

    pub fn set_ingredients(&mut self, ingredients: Vec<Ingredient>) {
        self.ingredients = ingredients;
        self.recompute();
    }

    pub fn push_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
        self.recompute();
    }

    /// Edit one ingredient's macro field; out-of-range indexes are ignored
    pub fn set_ingredient_field(&mut self, index: usize, nutrient: Nutrient, value: f64) {
        if let Some(ingredient) = self.ingredients.get_mut(index) {
            ingredient.macros.set(nutrient, value);
            self.recompute();
        }
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        if index >= self.ingredients.len() {
            return None;
        }
        let removed = self.ingredients.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Split into `(quantity, base, ingredients, compute_from_ingredients, total)`
    pub fn into_parts(self) -> (f64, Nutrition, Vec<Ingredient>, bool, Nutrition) {
        (
            self.quantity,
            self.base_nutrition,
            self.ingredients,
            self.compute_from_ingredients,
            self.total,
        )
    }
}
