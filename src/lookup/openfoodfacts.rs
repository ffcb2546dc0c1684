//! OpenFoodFacts barcode client

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{BarcodeLookup, FoodCandidate, LookupError, LookupResult};
use crate::models::Nutrition;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org/api/v0/product";

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub status: i64,
    pub product: Option<Product>,
}

#[derive(Debug, Deserialize)]
pub struct Product {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub serving_size: Option<String>,
    /// Values are usually numbers but the API sometimes sends strings
    #[serde(default)]
    pub nutriments: HashMap<String, Value>,
}

impl Product {
    fn nutriment(&self, key: &str) -> Option<f64> {
        match self.nutriments.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Per-100g nutrition
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self
                .nutriment("energy-kcal_100g")
                .or_else(|| self.nutriment("energy_100g"))
                .unwrap_or(0.0),
            protein: self.nutriment("proteins_100g").unwrap_or(0.0),
            carbohydrates: self.nutriment("carbohydrates_100g").unwrap_or(0.0),
            fat: self.nutriment("fat_100g").unwrap_or(0.0),
            sugar: self.nutriment("sugars_100g").unwrap_or(0.0),
            fiber: self.nutriment("fiber_100g").unwrap_or(0.0),
        }
    }
}

/// Turn an API response into a candidate
pub fn parse_response(barcode: &str, response: ProductResponse) -> LookupResult<FoodCandidate> {
    let product = match (response.status, response.product) {
        (1, Some(product)) => product,
        _ => return Err(LookupError::ProductNotFound(barcode.to_string())),
    };

    let name = product
        .product_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown Product")
        .to_string();

    let mut candidate = FoodCandidate::new(name, 1.0, product.nutrition());
    candidate.brand = product.brands.filter(|b| !b.trim().is_empty());
    candidate.serving_size = product.serving_size;
    Ok(candidate)
}

/// Barcode lookup against the OpenFoodFacts product API
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> LookupResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("MacroTrackr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}/{}.json", self.base_url, barcode)
    }
}

#[async_trait]
impl BarcodeLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> LookupResult<FoodCandidate> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(LookupError::InvalidResponse(format!(
                "barcode must be digits only: '{}'",
                barcode
            )));
        }

        let url = self.product_url(barcode);
        tracing::debug!("OpenFoodFacts lookup: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::ProductNotFound(barcode.to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ProductResponse = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;
        parse_response(barcode, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LookupResult<FoodCandidate> {
        let response: ProductResponse = serde_json::from_str(json).unwrap();
        parse_response("3017620422003", response)
    }

    #[test]
    fn test_parse_found_product() {
        let candidate = parse(
            r#"{
                "status": 1,
                "product": {
                    "product_name": "Hazelnut Spread",
                    "brands": "Acme",
                    "serving_size": "15 g",
                    "nutriments": {
                        "energy-kcal_100g": 539,
                        "energy_100g": 2252,
                        "proteins_100g": 6.3,
                        "carbohydrates_100g": 57.5,
                        "fat_100g": 30.9,
                        "sugars_100g": "56.3"
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(candidate.name, "Hazelnut Spread");
        assert_eq!(candidate.confidence, 1.0);
        assert_eq!(candidate.brand.as_deref(), Some("Acme"));
        assert_eq!(candidate.nutrition.calories, 539.0);
        assert!((candidate.nutrition.sugar - 56.3).abs() < 1e-9);
        assert_eq!(candidate.nutrition.fiber, 0.0);
    }

    #[test]
    fn test_energy_fallback_and_unknown_name() {
        let candidate = parse(
            r#"{"status": 1, "product": {"nutriments": {"energy_100g": 120, "fat_100g": -3}}}"#,
        )
        .unwrap();
        assert_eq!(candidate.name, "Unknown Product");
        assert_eq!(candidate.nutrition.calories, 120.0);
        assert_eq!(candidate.nutrition.fat, 0.0);
    }

    #[test]
    fn test_missing_product_is_not_found() {
        let err = parse(r#"{"status": 0, "status_verbose": "product not found"}"#).unwrap_err();
        assert!(matches!(err, LookupError::ProductNotFound(code) if code == "3017620422003"));
    }

    #[test]
    fn test_product_url() {
        let client = OpenFoodFactsClient::new(
            "https://off.example/api/v0/product/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.product_url("123"),
            "https://off.example/api/v0/product/123.json"
        );
    }
}
