use std::net::SocketAddr;
use std::path::PathBuf;

use crate::{Category, ConfigError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory holding the `news_<category>_predicted.csv` files.
    pub data_dir: PathBuf,
    /// JSON file backing the request counter.
    pub counter_path: PathBuf,
    /// Categories served by this deployment, in declaration order.
    pub categories: Vec<Category>,
}

impl AppConfig {
    /// Production refuses to start without its dataset directory. Other
    /// environments serve every category as not found instead.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for `NEWSENT_DATA_DIR` when the
    /// environment is production and the directory does not exist.
    pub fn check_data_dir(&self) -> Result<(), ConfigError> {
        if self.env != Environment::Production || self.data_dir.is_dir() {
            return Ok(());
        }
        Err(ConfigError::InvalidEnvVar {
            var: "NEWSENT_DATA_DIR".to_string(),
            reason: format!("directory {} does not exist", self.data_dir.display()),
        })
    }
}
