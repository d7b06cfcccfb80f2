use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::domain::error::{AppError, Result};
use crate::domain::import_config::ImportConfig;

pub const ENV_PREFIX: &str = "TABULAR_IMPORT_";

pub struct ConfigService {
    config_file: Option<PathBuf>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self { config_file: None }
    }

    pub fn with_file(path: &Path) -> Self {
        Self {
            config_file: Some(path.to_path_buf()),
        }
    }

    /// Defaults, then the TOML file (if any), then `TABULAR_IMPORT_*` variables
    pub fn load(&self) -> Result<ImportConfig> {
        let mut figment = Figment::from(Serialized::defaults(ImportConfig::default()));
        if let Some(path) = &self.config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: ImportConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid import config: {}", e)))?;

        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
