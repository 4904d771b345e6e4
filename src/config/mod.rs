use std::env;

/// Config holds all mapper configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub inventory_path: String,
    pub output_path: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            inventory_path: get_env("INVENTORY_PATH", "testbed-inventory.json"),
            output_path: get_env("OUTPUT_PATH", "testbed-map.json"),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
