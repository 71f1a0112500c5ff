use crate::core::filter::{PageSize, ALLOWED_PAGE_SIZES};
use crate::core::ConfigProvider;
use crate::domain::model::GeoPoint;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub repository: RepositoryConfig,
    pub search: Option<SearchConfig>,
    pub origin: Option<OriginConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_page_size: Option<u32>,
    pub rank_by_distance: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OriginConfig {
    pub lat: f64,
    pub lng: f64,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RegistryError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("repository.endpoint", &self.repository.endpoint)?;

        if let Some(timeout) = self.repository.timeout_seconds {
            validation::validate_positive_number("repository.timeout_seconds", timeout, 1)?;
        }

        if let Some(size) = self.search.as_ref().and_then(|s| s.default_page_size) {
            validation::validate_one_of("search.default_page_size", size, &ALLOWED_PAGE_SIZES)?;
        }

        if let Some(origin) = self.origin {
            validation::validate_range("origin.lat", origin.lat, -90.0, 90.0)?;
            validation::validate_range("origin.lng", origin.lng, -180.0, 180.0)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        &self.repository.endpoint
    }

    fn api_token(&self) -> Option<&str> {
        self.repository
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.repository
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn default_page_size(&self) -> PageSize {
        self.search
            .as_ref()
            .and_then(|s| s.default_page_size)
            .and_then(PageSize::new)
            .unwrap_or_default()
    }

    fn rank_by_distance(&self) -> bool {
        self.search
            .as_ref()
            .and_then(|s| s.rank_by_distance)
            .unwrap_or(false)
    }

    fn origin(&self) -> Option<GeoPoint> {
        self.origin.and_then(|o| GeoPoint::new(o.lat, o.lng))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
