//! Shared domain types and configuration for the news sentiment service.

mod app_config;
mod category;
mod config;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use category::{Category, UnknownCategory};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
