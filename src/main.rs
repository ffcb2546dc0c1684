//! MacroTrackr MCP server over stdio

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use macrotrackr::build_info::{self, BuildInfo};
use macrotrackr::config::Config;
use macrotrackr::db::Database;
use macrotrackr::mcp::MacroTrackrService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is the MCP channel, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("macrotrackr=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = Config::from_env()?;
    tracing::info!(
        user = %config.user_id,
        threshold = config.recognition_threshold,
        usda_search = config.usda_api_key.is_some(),
        "Loaded configuration"
    );

    let database = Database::new(&config.database_path)?;
    let version = database.migrate()?;
    tracing::info!(path = %database.path().display(), version, "Database ready");

    let service = MacroTrackrService::new(&config, database)?;
    tracing::info!("{} serving on stdio", BuildInfo::current());

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
