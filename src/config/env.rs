//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "API_BATTLE";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Endpoint A base URL from API_BATTLE_A_URL
    pub a_url: Option<String>,
    /// Endpoint B base URL from API_BATTLE_B_URL
    pub b_url: Option<String>,
    /// Endpoint A label from API_BATTLE_A_LABEL
    pub a_label: Option<String>,
    /// Endpoint B label from API_BATTLE_B_LABEL
    pub b_label: Option<String>,
    /// Timeout from API_BATTLE_TIMEOUT
    pub timeout: Option<u64>,
    /// Batch size from API_BATTLE_BATCH_SIZE
    pub batch_size: Option<usize>,
    /// Config file from API_BATTLE_CONFIG
    pub config_file: Option<String>,
    /// Output format from API_BATTLE_FORMAT
    pub format: Option<String>,
    /// Verbose from API_BATTLE_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            a_url: get_env("A_URL"),
            b_url: get_env("B_URL"),
            a_label: get_env("A_LABEL"),
            b_label: get_env("B_LABEL"),
            timeout: get_env_parse("TIMEOUT"),
            batch_size: get_env_parse("BATCH_SIZE"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.a_url.is_some()
            || self.b_url.is_some()
            || self.a_label.is_some()
            || self.b_label.is_some()
            || self.timeout.is_some()
            || self.batch_size.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.verbose.is_some()
    }

    /// Get timeout with fallback
    pub fn timeout_or(&self, default: u64) -> u64 {
        self.timeout.unwrap_or(default)
    }

    /// Get batch size with fallback
    pub fn batch_size_or(&self, default: usize) -> usize {
        self.batch_size.unwrap_or(default)
    }

    /// Get output format with fallback
    pub fn format_or(&self, default: &str) -> String {
        self.format.clone().unwrap_or_else(|| default.to_string())
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_A_URL:       {:?}", ENV_PREFIX, self.a_url);
        println!("  {}_B_URL:       {:?}", ENV_PREFIX, self.b_url);
        println!("  {}_A_LABEL:     {:?}", ENV_PREFIX, self.a_label);
        println!("  {}_B_LABEL:     {:?}", ENV_PREFIX, self.b_label);
        println!("  {}_TIMEOUT:     {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_BATCH_SIZE:  {:?}", ENV_PREFIX, self.batch_size);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_FORMAT:      {:?}", ENV_PREFIX, self.format);
        println!("  {}_VERBOSE:     {:?}", ENV_PREFIX, self.verbose);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all API_BATTLE environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_A_URL        Endpoint A base URL (default http://localhost:8080)");
    println!("  {ENV_PREFIX}_B_URL        Endpoint B base URL (default http://localhost:8081)");
    println!("  {ENV_PREFIX}_A_LABEL      Endpoint A display label");
    println!("  {ENV_PREFIX}_B_LABEL      Endpoint B display label");
    println!("  {ENV_PREFIX}_TIMEOUT      Per-request timeout in seconds");
    println!("  {ENV_PREFIX}_BATCH_SIZE   Requests per load-test batch");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT       Output format (table, json, json-pretty, csv, summary)");
    println!("  {ENV_PREFIX}_VERBOSE      Enable debug logging (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_A_URL=http://10.0.0.10:8080");
    println!("  export {ENV_PREFIX}_B_URL=http://10.0.0.11:8081");
    println!("  api-battle battle --text 'some document'");
}
