//! Build metadata stamped by `build.rs`

use std::fmt;

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Raw build counter as written by the build script
const RAW_BUILD_NUMBER: &str = env!("MACROTRACKR_BUILD_NUMBER");

/// UTC compile time, ISO 8601
pub const BUILD_TIMESTAMP: &str = env!("MACROTRACKR_BUILD_TIMESTAMP");

/// Compile-time identity of this binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: build_number(RAW_BUILD_NUMBER),
            build_timestamp: BUILD_TIMESTAMP,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} (build {}, {})",
            self.name, self.version, self.build_number, self.build_timestamp
        )
    }
}

/// A counter that fails to parse reads as build 0
fn build_number(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// Startup banner on stderr; stdout carries the MCP stream
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    let rule = "=".repeat(47);
    eprintln!("{}", rule);
    eprintln!("  MacroTrackr {}", VERSION);
    eprintln!("  Build {} compiled {}", info.build_number, info.build_timestamp);
    eprintln!("{}", rule);
}
