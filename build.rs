//! Stamps a build counter and compile time into the binary.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn bump_counter(path: &Path) -> u64 {
    let next = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(1, |n| n + 1);
    if let Err(e) = fs::write(path, next.to_string()) {
        println!("cargo:warning=could not persist build counter: {}", e);
    }
    next
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let build_number = bump_counter(Path::new(COUNTER_FILE));
    let compiled_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=MACROTRACKR_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=MACROTRACKR_BUILD_TIMESTAMP={}", compiled_at);
}
