use crate::app_config::{AppConfig, Environment};
use crate::{Category, ConfigError};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("NEWSENT_ENV", "development"))?;

    let raw_addr = or_default("NEWSENT_BIND_ADDR", "0.0.0.0:3001");
    let bind_addr = raw_addr
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "NEWSENT_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("NEWSENT_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("NEWSENT_DATA_DIR", "./data"));
    let counter_path = PathBuf::from(or_default("NEWSENT_COUNTER_PATH", "./request_count.json"));

    let categories = match lookup("NEWSENT_CATEGORIES") {
        Ok(raw) => parse_categories(&raw)?,
        Err(_) => Category::ALL.to_vec(),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        counter_path,
        categories,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEWSENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated category list, dropping blanks and duplicates.
fn parse_categories(raw: &str) -> Result<Vec<Category>, ConfigError> {
    let mut categories = Vec::new();
    for label in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let category = label
            .parse::<Category>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "NEWSENT_CATEGORIES".to_string(),
                reason: e.to_string(),
            })?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    if categories.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "NEWSENT_CATEGORIES".to_string(),
            reason: "at least one category is required".to_string(),
        });
    }

    Ok(categories)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
