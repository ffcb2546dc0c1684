//! Ingredient aggregation
//!
//! Ingredients are kept as `{name, macros}` pairs so every nutrition entry
//! belongs to exactly one named slot. Only named entries count toward a
//! meal's compositional nutrition.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::models::Nutrition;

/// A single ingredient line with its own nutrition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub macros: Nutrition,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, macros: Nutrition) -> Self {
        Self {
            name: name.into(),
            macros,
        }
    }

    /// A blank name marks an unused form slot
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Sum the nutrition of every named ingredient
pub fn aggregate(ingredients: &[Ingredient]) -> Nutrition {
    ingredients
        .iter()
        .filter(|i| i.is_named())
        .fold(Nutrition::zero(), |acc, i| acc.add(&i.macros))
}

/// Drop blank slots and trim names before persisting
pub fn named_only(ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    ingredients
        .into_iter()
        .filter(Ingredient::is_named)
        .map(|i| Ingredient {
            name: i.name.trim().to_string(),
            macros: i.macros,
        })
        .collect()
}

/// Food group an ingredient is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Protein,
    Carbs,
    Fats,
    Vegetables,
    Fruits,
    Dairy,
    Grains,
    Other,
}

impl IngredientCategory {
    pub const ALL: [IngredientCategory; 8] = [
        IngredientCategory::Protein,
        IngredientCategory::Carbs,
        IngredientCategory::Fats,
        IngredientCategory::Vegetables,
        IngredientCategory::Fruits,
        IngredientCategory::Dairy,
        IngredientCategory::Grains,
        IngredientCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Protein => "protein",
            IngredientCategory::Carbs => "carbs",
            IngredientCategory::Fats => "fats",
            IngredientCategory::Vegetables => "vegetables",
            IngredientCategory::Fruits => "fruits",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Grains => "grains",
            IngredientCategory::Other => "other",
        }
    }
}

impl FromStr for IngredientCategory {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| InputError::UnknownCategory(s.to_string()))
    }
}

const PROTEIN_WORDS: &[&str] = &["chicken", "beef", "pork", "fish", "salmon", "tuna", "turkey", "lamb", "egg"];
const GRAIN_WORDS: &[&str] = &["rice", "bread", "pasta", "potato", "oats", "quinoa"];
const FRUIT_WORDS: &[&str] = &["apple", "banana", "orange", "berry", "fruit"];
const VEGETABLE_WORDS: &[&str] = &["broccoli", "spinach", "carrot", "tomato", "onion", "pepper"];
const DAIRY_WORDS: &[&str] = &["milk", "cheese", "yogurt", "butter", "cream"];
const FAT_WORDS: &[&str] = &["oil", "avocado", "nut"];

/// File an ingredient under a food group
///
/// Protein-dominant macros win outright. Then name keywords are tried in
/// protein, grains, fruits, vegetables, dairy, fats order ("seed" only
/// counts as a fat above 10 g fat). Anything left goes by its largest macro.
pub fn categorize(name: &str, macros: &Nutrition) -> IngredientCategory {
    let (protein, carbs, fat) = (macros.protein, macros.carbohydrates, macros.fat);
    if protein > carbs && protein > fat {
        return IngredientCategory::Protein;
    }

    let name = name.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if mentions(PROTEIN_WORDS) {
        IngredientCategory::Protein
    } else if mentions(GRAIN_WORDS) {
        IngredientCategory::Grains
    } else if mentions(FRUIT_WORDS) {
        IngredientCategory::Fruits
    } else if mentions(VEGETABLE_WORDS) {
        IngredientCategory::Vegetables
    } else if mentions(DAIRY_WORDS) {
        IngredientCategory::Dairy
    } else if mentions(FAT_WORDS) || (name.contains("seed") && fat > 10.0) {
        IngredientCategory::Fats
    } else if carbs > protein && carbs > fat {
        IngredientCategory::Carbs
    } else if fat > protein && fat > carbs {
        IngredientCategory::Fats
    } else {
        IngredientCategory::Other
    }
}
