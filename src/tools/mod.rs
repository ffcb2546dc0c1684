//! MacroTrackr Tools module
//!
//! Operation layer behind the MCP tools. Each function composes the
//! database with the pure nutrition core and returns a serializable response.

pub mod days;
pub mod goals;
pub mod ingredients;
pub mod lookup;
pub mod meals;
pub mod status;
pub mod templates;
