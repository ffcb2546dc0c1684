//! USDA FoodData Central ingredient search
//!
//! Search results become ingredient candidates. Only the six tracked
//! nutrients are read; everything else USDA reports is ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{FoodCandidate, LookupError, LookupResult};
use crate::models::Nutrition;
use crate::nutrition::{categorize, IngredientCategory};

pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

const NUTRIENT_CALORIES: i64 = 1008;
const NUTRIENT_PROTEIN: i64 = 1003;
const NUTRIENT_CARBOHYDRATES: i64 = 1005;
const NUTRIENT_FAT: i64 = 1004;
const NUTRIENT_SUGAR: i64 = 2000;
const NUTRIENT_FIBER: i64 = 1079;

/// Qualifiers stripped from food descriptions
const NAME_SUFFIXES: &[&str] = &[
    ", raw",
    ", cooked",
    ", roasted",
    ", grilled",
    ", fresh",
    ", frozen",
    ", canned",
    ", without salt",
    ", with salt",
    ", USDA",
    ", generic",
];

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub foods: Vec<Food>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub fdc_id: i64,
    pub description: String,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

/// Search results use `nutrientId`/`value`; detail records nest `nutrient.id`/`amount`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    pub nutrient_id: Option<i64>,
    pub value: Option<f64>,
    pub nutrient: Option<NutrientRef>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NutrientRef {
    pub id: i64,
}

impl FoodNutrient {
    fn id(&self) -> Option<i64> {
        self.nutrient_id.or_else(|| self.nutrient.as_ref().map(|n| n.id))
    }

    fn amount(&self) -> f64 {
        self.value.or(self.amount).unwrap_or(0.0)
    }
}

/// An ingredient found in FoodData Central
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsdaIngredient {
    pub fdc_id: i64,
    pub name: String,
    pub category: IngredientCategory,
    pub macros: Nutrition,
}

impl UsdaIngredient {
    pub fn candidate(&self) -> FoodCandidate {
        FoodCandidate::new(self.name.clone(), 1.0, self.macros)
    }
}

/// Drop parenthesised detail and preparation qualifiers, then title-case
pub fn clean_food_name(description: &str) -> String {
    let mut name = String::with_capacity(description.len());
    let mut depth = 0usize;
    for c in description.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => name.push(c),
            _ => {}
        }
    }

    for suffix in NAME_SUFFIXES {
        while let Some(pos) = name.find(suffix) {
            name.replace_range(pos..pos + suffix.len(), "");
        }
    }

    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Map a USDA food to an ingredient; foods without any macro data are skipped
pub fn convert_food(food: &Food) -> Option<UsdaIngredient> {
    let mut macros = Nutrition::zero();
    for nutrient in &food.food_nutrients {
        let amount = nutrient.amount();
        match nutrient.id() {
            Some(NUTRIENT_CALORIES) => macros.calories = amount,
            Some(NUTRIENT_PROTEIN) => macros.protein = amount,
            Some(NUTRIENT_CARBOHYDRATES) => macros.carbohydrates = amount,
            Some(NUTRIENT_FAT) => macros.fat = amount,
            Some(NUTRIENT_SUGAR) => macros.sugar = amount,
            Some(NUTRIENT_FIBER) => macros.fiber = amount,
            _ => {}
        }
    }

    let meaningful =
        macros.calories > 0.0 || macros.protein > 0.0 || macros.carbohydrates > 0.0 || macros.fat > 0.0;
    if !meaningful {
        return None;
    }

    let name = clean_food_name(&food.description);
    let macros = crate::input::sanitize_nutrition(macros);
    Some(UsdaIngredient {
        fdc_id: food.fdc_id,
        category: categorize(&name, &macros),
        name,
        macros,
    })
}

/// FoodData Central search client
#[derive(Clone)]
pub struct UsdaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UsdaClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> LookupResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("MacroTrackr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search Foundation foods by free text
    pub async fn search_foods(&self, query: &str, page_size: u32) -> LookupResult<Vec<UsdaIngredient>> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;
        let url = format!("{}/foods/search", self.base_url);
        let page_size = page_size.clamp(1, 50).to_string();

        tracing::debug!("USDA search: {}", query);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("api_key", api_key),
                ("dataType", "Foundation"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(LookupError::InvalidApiKey)
            }
            status if !status.is_success() => {
                return Err(LookupError::InvalidResponse(format!("HTTP {}", status)))
            }
            _ => {}
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;
        Ok(body.foods.iter().filter_map(convert_food).collect())
    }
}
