//! MacroTrackr Library
//!
//! Meal logging, nutrition totals, daily and period rollups, and goal
//! progress, served over MCP.

pub mod build_info;
pub mod config;
pub mod db;
pub mod input;
pub mod lookup;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
