//! MacroTrackr MCP Server Implementation
//!
//! Implements the MCP server with all MacroTrackr tools.

use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::Database;
use crate::input::{NumberOrText, NutritionInput};
use crate::lookup::{BarcodeLookup, FoodCandidate, LookupResult, OpenFoodFactsClient, RecognitionPolicy, UsdaClient};
use crate::tools::goals::GoalsUpdate;
use crate::tools::ingredients::SavePresetRequest;
use crate::tools::meals::{IngredientInput, LogMealRequest, UpdateMealRequest};
use crate::tools::status::StatusTracker;
use crate::tools::{days, goals, ingredients, lookup, meals, templates};

/// MacroTrackr MCP Service
#[derive(Clone)]
pub struct MacroTrackrService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    barcode_lookup: Arc<dyn BarcodeLookup>,
    usda: UsdaClient,
    recognition: RecognitionPolicy,
    default_user_id: String,
    tool_router: ToolRouter<MacroTrackrService>,
}

impl MacroTrackrService {
    pub fn new(config: &Config, database: Database) -> LookupResult<Self> {
        let barcode_lookup = OpenFoodFactsClient::new(config.openfoodfacts_url.clone(), config.lookup_timeout)?;
        let usda = UsdaClient::new(config.usda_url.clone(), config.usda_api_key.clone(), config.lookup_timeout)?;
        Ok(Self::with_lookups(config, database, Arc::new(barcode_lookup), usda))
    }

    /// Build with caller-supplied lookup collaborators
    pub fn with_lookups(
        config: &Config,
        database: Database,
        barcode_lookup: Arc<dyn BarcodeLookup>,
        usda: UsdaClient,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                config.database_path.clone(),
                config.user_id.clone(),
                usda.has_api_key(),
            ))),
            database,
            barcode_lookup,
            usda,
            recognition: RecognitionPolicy::new(config.recognition_threshold),
            default_user_id: config.user_id.clone(),
            tool_router: Self::tool_router(),
        }
    }

    fn user(&self, user_id: Option<String>) -> String {
        user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.default_user_id.clone())
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

fn not_found(entity: &str, id: i64) -> String {
    format!(r#"{{"error": "{} not found", "id": {}}}"#, entity, id)
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

fn nutrient(value: Option<NumberOrText>) -> Option<f64> {
    value.as_ref().map(NumberOrText::nutrient)
}

fn quantity(value: Option<NumberOrText>) -> Option<f64> {
    value.as_ref().map(NumberOrText::quantity)
}

/// Six-field nutrition record; every field is required when logging
///
/// Values may be numbers or numeric text. Unreadable or negative values
/// count as 0.
#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct NutritionParams {
    pub calories: Option<NumberOrText>,
    pub protein: Option<NumberOrText>,
    pub carbohydrates: Option<NumberOrText>,
    pub fat: Option<NumberOrText>,
    pub sugar: Option<NumberOrText>,
    pub fiber: Option<NumberOrText>,
}

impl From<NutritionParams> for NutritionInput {
    fn from(p: NutritionParams) -> Self {
        NutritionInput {
            calories: nutrient(p.calories),
            protein: nutrient(p.protein),
            carbohydrates: nutrient(p.carbohydrates),
            fat: nutrient(p.fat),
            sugar: nutrient(p.sugar),
            fiber: nutrient(p.fiber),
        }
    }
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    pub name: String,
    pub macros: NutritionParams,
}

impl From<IngredientParams> for IngredientInput {
    fn from(p: IngredientParams) -> Self {
        IngredientInput {
            name: p.name,
            macros: p.macros.into(),
        }
    }
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    pub name: String,
    /// Servings; defaults to 1 when absent or unreadable
    pub quantity: Option<NumberOrText>,
    /// Per-serving nutrition (direct entry)
    pub nutrition: Option<NutritionParams>,
    #[serde(default)]
    pub ingredients: Vec<IngredientParams>,
    /// Sum the ingredients instead of using the direct entry
    #[serde(default)]
    pub compute_from_ingredients: bool,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    /// RFC 3339 timestamp; defaults to now
    pub logged_at: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    pub id: i64,
    pub meal_type: Option<String>,
    pub name: Option<String>,
    /// Unreadable values mean 1 serving
    pub quantity: Option<NumberOrText>,
    /// Fields to change in the per-serving direct entry
    pub nutrition: Option<NutritionParams>,
    /// Replaces the ingredient list
    pub ingredients: Option<Vec<IngredientParams>>,
    pub compute_from_ingredients: Option<bool>,
    /// An empty string clears the notes
    pub notes: Option<String>,
    /// An empty string clears the image
    pub image_url: Option<String>,
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFavoriteParams {
    pub id: i64,
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchMealsParams {
    #[serde(default)]
    pub query: String,
    /// all, meals, ingredients or favorites
    pub filter: Option<String>,
    pub limit: Option<usize>,
    pub user_id: Option<String>,
}

// ============================================================================
// Day / Stats / Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// YYYY-MM-DD; defaults to today (UTC)
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetStatsParams {
    /// week, month or year
    pub period: String,
    /// Any date inside the period; defaults to today (UTC)
    pub date: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WidgetSnapshotParams {
    pub date: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetGoalsParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalsParams {
    pub calories: Option<NumberOrText>,
    pub protein: Option<NumberOrText>,
    pub carbohydrates: Option<NumberOrText>,
    pub fat: Option<NumberOrText>,
    pub sugar: Option<NumberOrText>,
    pub fiber: Option<NumberOrText>,
    pub user_id: Option<String>,
}

// ============================================================================
// Template Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveTemplateParams {
    pub meal_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListTemplatesParams {
    #[serde(default)]
    pub favorites_only: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TemplateIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddTemplateToTodayParams {
    pub template_id: i64,
    /// Overrides the template's meal type
    pub meal_type: Option<String>,
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SavePresetParams {
    pub name: String,
    /// protein, carbs, fats, vegetables, fruits, dairy, grains or other;
    /// derived from the name and macros when omitted
    pub category: Option<String>,
    /// Per one unit of the ingredient
    pub macros: NutritionParams,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPresetsParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeletePresetParams {
    pub id: i64,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecentIngredientsParams {
    pub limit: Option<usize>,
    pub user_id: Option<String>,
}

// ============================================================================
// Lookup Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupBarcodeParams {
    pub barcode: String,
    pub meal_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchIngredientsParams {
    pub query: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApplyRecognitionParams {
    pub name: String,
    /// Classifier confidence in [0, 1]
    pub confidence: NumberOrText,
    pub nutrition: NutritionParams,
    pub meal_type: Option<String>,
    /// Log even when the confidence is below the threshold
    #[serde(default)]
    pub confirm: bool,
    pub user_id: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacroTrackrService {
    // --- Status ---

    #[tool(description = "Get the current status of the MacroTrackr service including build info, database status, and process information")]
    async fn macrotrackr_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for logging meals. Call this when starting a new food logging session or when unsure how to use the meal tracking tools.")]
    fn meal_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::MEAL_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(MEAL_INSTRUCTIONS)]))
    }

    // --- Meals ---

    #[tool(description = "Log a meal. Provide per-serving nutrition (all six fields) OR set compute_from_ingredients with an ingredient list. Total = base × quantity.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let request = LogMealRequest {
            user_id: self.user(p.user_id),
            meal_type: p.meal_type,
            name: p.name,
            quantity: quantity(p.quantity),
            nutrition: p.nutrition.map(NutritionInput::from),
            ingredients: p.ingredients.into_iter().map(IngredientInput::from).collect(),
            compute_from_ingredients: p.compute_from_ingredients,
            notes: p.notes,
            image_url: p.image_url,
            logged_at: p.logged_at,
            is_favorite: p.is_favorite,
        };
        let result = meals::log_meal(&self.database, request, Utc::now()).map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a meal by ID with full details")]
    fn get_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => to_json(&meal)?,
            None => not_found("Meal", p.id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a meal. Totals are recomputed when quantity, nutrition, ingredients or compute_from_ingredients change.")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let request = UpdateMealRequest {
            meal_type: p.meal_type,
            name: p.name,
            quantity: quantity(p.quantity),
            nutrition: p.nutrition.map(NutritionInput::from),
            ingredients: p.ingredients.map(|items| items.into_iter().map(IngredientInput::from).collect()),
            compute_from_ingredients: p.compute_from_ingredients,
            notes: p.notes,
            image_url: p.image_url,
            is_favorite: p.is_favorite,
        };
        let result = meals::update_meal(&self.database, p.id, request, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => to_json(&meal)?,
            None => not_found("Meal", p.id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Mark or unmark a meal as a favorite")]
    fn set_meal_favorite(&self, Parameters(p): Parameters<SetFavoriteParams>) -> Result<CallToolResult, McpError> {
        let updated = meals::set_meal_favorite(&self.database, p.id, p.is_favorite, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": updated, "id": p.id, "is_favorite": p.is_favorite}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a meal")]
    fn delete_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = meals::delete_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search meal history by name and/or ingredient. Filter: all (default), meals, ingredients, favorites. An empty query lists recent meals.")]
    fn search_meals(&self, Parameters(p): Parameters<SearchMealsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let result = meals::search_meals(&self.database, &user_id, &p.query, p.filter.as_deref(), p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Days & Stats ---

    #[tool(description = "Get a day's meals grouped by type (breakfast, lunch, dinner, snack) with totals, percent of goal, remaining and status labels")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let date = p.date.unwrap_or_else(today);
        let result = days::get_day(&self.database, &user_id, &date, p.meal_type.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get week (Monday start), month or year statistics: per-day totals, period totals, average per logged day and progress of the average against goals")]
    fn get_stats(&self, Parameters(p): Parameters<GetStatsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let date = p.date.unwrap_or_else(today);
        let result = days::get_stats(&self.database, &user_id, &p.period, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a compact snapshot of a day's totals, goals and progress")]
    fn get_widget_snapshot(&self, Parameters(p): Parameters<WidgetSnapshotParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let date = p.date.unwrap_or_else(today);
        let result = days::widget_snapshot(&self.database, &user_id, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Goals ---

    #[tool(description = "Get daily macro goals (defaults apply when none are set)")]
    fn get_goals(&self, Parameters(p): Parameters<GetGoalsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let result = goals::get_goals(&self.database, &user_id).map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Set daily macro goals. Omitted fields keep their current value; 0 means no goal.")]
    fn set_goals(&self, Parameters(p): Parameters<SetGoalsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let update = GoalsUpdate {
            calories: nutrient(p.calories),
            protein: nutrient(p.protein),
            carbohydrates: nutrient(p.carbohydrates),
            fat: nutrient(p.fat),
            sugar: nutrient(p.sugar),
            fiber: nutrient(p.fiber),
        };
        let result = goals::set_goals(&self.database, &user_id, update, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Templates ---

    #[tool(description = "Save a logged meal as a reusable template (a copy; later edits to the meal do not affect it)")]
    fn save_meal_template(&self, Parameters(p): Parameters<SaveTemplateParams>) -> Result<CallToolResult, McpError> {
        let result = templates::save_meal_template(&self.database, p.meal_id, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(template) => to_json(&template)?,
            None => not_found("Meal", p.meal_id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List saved meal templates, favorites first")]
    fn list_meal_templates(&self, Parameters(p): Parameters<ListTemplatesParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let result = templates::list_meal_templates(&self.database, &user_id, p.favorites_only)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a saved meal template by ID")]
    fn get_meal_template(&self, Parameters(p): Parameters<TemplateIdParams>) -> Result<CallToolResult, McpError> {
        let result = templates::get_meal_template(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(template) => to_json(&template)?,
            None => not_found("Template", p.id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Mark or unmark a saved meal template as a favorite")]
    fn set_template_favorite(&self, Parameters(p): Parameters<SetFavoriteParams>) -> Result<CallToolResult, McpError> {
        let updated = templates::set_template_favorite(&self.database, p.id, p.is_favorite)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": updated, "id": p.id, "is_favorite": p.is_favorite}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a saved meal template")]
    fn delete_meal_template(&self, Parameters(p): Parameters<TemplateIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = templates::delete_meal_template(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Log a new meal now from a saved template. Totals are recomputed from the template's data.")]
    fn add_template_to_today(&self, Parameters(p): Parameters<AddTemplateToTodayParams>) -> Result<CallToolResult, McpError> {
        let result = templates::add_template_to_today(&self.database, p.template_id, p.meal_type.as_deref(), Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => to_json(&meal)?,
            None => not_found("Template", p.template_id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Ingredients ---

    #[tool(description = "Save a personal ingredient preset with per-unit macros (all six fields). The food group is derived when no category is given.")]
    fn save_ingredient_preset(&self, Parameters(p): Parameters<SavePresetParams>) -> Result<CallToolResult, McpError> {
        let request = SavePresetRequest {
            user_id: self.user(p.user_id),
            name: p.name,
            category: p.category,
            macros: p.macros.into(),
        };
        let result = ingredients::save_ingredient_preset(&self.database, request, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "List personal ingredient presets ordered by name")]
    fn list_ingredient_presets(&self, Parameters(p): Parameters<ListPresetsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let result = ingredients::list_ingredient_presets(&self.database, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Delete a personal ingredient preset")]
    fn delete_ingredient_preset(&self, Parameters(p): Parameters<DeletePresetParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let deleted = ingredients::delete_ingredient_preset(&self.database, p.id, &user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get recently used ingredients from meal history, newest first, with their food group")]
    fn get_recent_ingredients(&self, Parameters(p): Parameters<RecentIngredientsParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let result = ingredients::recent_ingredients(&self.database, &user_id, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Lookups ---

    #[tool(description = "Look up a packaged food by barcode (OpenFoodFacts). Returns per-100g nutrition and a draft meal; nothing is logged.")]
    async fn lookup_barcode(&self, Parameters(p): Parameters<LookupBarcodeParams>) -> Result<CallToolResult, McpError> {
        let result = lookup::lookup_barcode(self.barcode_lookup.as_ref(), &p.barcode, p.meal_type.as_deref())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(found) => to_json(&found)?,
            None => serde_json::json!({"error": "Product not found", "barcode": p.barcode}).to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search USDA FoodData Central for ingredient nutrition (requires MACROTRACKR_USDA_API_KEY)")]
    async fn search_ingredients(&self, Parameters(p): Parameters<SearchIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = lookup::search_ingredients(&self.usda, &p.query, p.limit)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Apply a food recognition result. Logged immediately when confidence meets the configured threshold or confirm=true; otherwise returns a draft.")]
    fn apply_recognition(&self, Parameters(p): Parameters<ApplyRecognitionParams>) -> Result<CallToolResult, McpError> {
        let user_id = self.user(p.user_id);
        let nutrition = NutritionInput::from(p.nutrition)
            .into_nutrition()
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let candidate = FoodCandidate::new(p.name, p.confidence.confidence(), nutrition);
        let result = lookup::apply_recognition(
            &self.database,
            &self.recognition,
            &user_id,
            candidate,
            p.meal_type.as_deref(),
            p.confirm,
            Utc::now(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }
}

#[tool_handler]
impl ServerHandler for MacroTrackrService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrotrackr".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("MacroTrackr".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MacroTrackr - macro-nutrient logging and goal progress. \
                 IMPORTANT: Call meal_instructions before logging food. \
                 Meals: log_meal/get_meal/update_meal/delete_meal, set_meal_favorite, search_meals. \
                 Progress: get_day, get_stats (week/month/year), get_widget_snapshot. \
                 Goals: get_goals/set_goals. \
                 Templates: save_meal_template, list/get/delete_meal_template, set_template_favorite, add_template_to_today. \
                 Ingredients: save/list/delete_ingredient_preset, get_recent_ingredients. \
                 Lookups: lookup_barcode, search_ingredients, apply_recognition."
                    .into(),
            ),
        }
    }
}
