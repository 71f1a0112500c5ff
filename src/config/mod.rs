#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::filter::PageSize;
use crate::core::ConfigProvider;
use crate::domain::model::GeoPoint;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1337";

/// Effective settings after merging defaults, the TOML file and CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySettings {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    pub default_page_size: PageSize,
    pub rank_by_distance: bool,
    pub origin: Option<GeoPoint>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout_seconds: toml_config::DEFAULT_TIMEOUT_SECONDS,
            default_page_size: PageSize::default(),
            rank_by_distance: false,
            origin: None,
        }
    }
}

impl RegistrySettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(provider: &C) -> Self {
        Self {
            endpoint: provider.endpoint().to_string(),
            api_token: provider.api_token().map(str::to_string),
            timeout_seconds: provider.timeout_seconds(),
            default_page_size: provider.default_page_size(),
            rank_by_distance: provider.rank_by_distance(),
            origin: provider.origin(),
        }
    }
}

impl ConfigProvider for RegistrySettings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn default_page_size(&self) -> PageSize {
        self.default_page_size
    }

    fn rank_by_distance(&self) -> bool {
        self.rank_by_distance
    }

    fn origin(&self) -> Option<GeoPoint> {
        self.origin
    }
}

impl Validate for RegistrySettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        if let Some(token) = &self.api_token {
            validation::validate_non_empty_string("api_token", token)?;
        }
        Ok(())
    }
}
