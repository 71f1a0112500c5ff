use crate::config::{RegistrySettings, TomlConfig};
use crate::core::filter::{PageSize, RawFilters, ALLOWED_PAGE_SIZES};
use crate::domain::model::GeoPoint;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "breed-registry")]
#[command(about = "Search the breeding registry, show pedigrees and manage litter availability")]
pub struct CliConfig {
    /// Content repository base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// API token sent as bearer authorization
    #[arg(long, env = "BREED_REGISTRY_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Results per page (5, 10, 20, 50 or 100)
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serve queries from a JSON fixtures file instead of the repository
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Latitude of the visitor's position
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub origin_lat: Option<f64>,

    /// Longitude of the visitor's position
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub origin_lng: Option<f64>,

    /// Order each page by distance from the origin
    #[arg(long, global = true)]
    pub rank_by_distance: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search dogs
    Dogs(FilterArgs),
    /// Search litters
    Litters(FilterArgs),
    /// Search breeders
    Breeders(FilterArgs),
    /// List articles of a category
    Articles(FilterArgs),
    /// Show the three-generation pedigree of a dog
    Pedigree { id: String },
    /// Great-circle distance between two coordinates
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lng1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lng2: f64,
        /// Flag the distance when it exceeds this many kilometres
        #[arg(long)]
        max_km: Option<f64>,
    },
    /// Stage and save litter edits
    LitterEdit(LitterEditArgs),
}

/// Raw filter values; options that do not apply to a collection are ignored.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub chip: Option<String>,
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub fertile: Option<String>,
    #[arg(long)]
    pub hd: Option<String>,
    #[arg(long)]
    pub sod1: Option<String>,
    #[arg(long)]
    pub heart: Option<String>,
    #[arg(long)]
    pub eyes: Option<String>,
    #[arg(long)]
    pub breeder: Option<String>,
    #[arg(long)]
    pub breeder_id: Option<String>,
    #[arg(long)]
    pub mother: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub letter: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub male_colors: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub female_colors: Vec<String>,
    #[arg(long)]
    pub active: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub max_distance: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

impl FilterArgs {
    pub fn to_raw(&self, page_size: PageSize) -> RawFilters {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        RawFilters {
            name: value(&self.name),
            chip_no: value(&self.chip),
            sex: value(&self.sex),
            color: value(&self.color),
            fertile: value(&self.fertile),
            hd: value(&self.hd),
            sod1: value(&self.sod1),
            heart_check: value(&self.heart),
            eyes_check: value(&self.eyes),
            breeder: value(&self.breeder),
            breeder_id: value(&self.breeder_id),
            mother: value(&self.mother),
            status: value(&self.status),
            order_letter: value(&self.letter),
            male_colors: self.male_colors.clone(),
            female_colors: self.female_colors.clone(),
            active: value(&self.active),
            category: value(&self.category),
            max_distance: value(&self.max_distance),
            page: self.page.to_string(),
            page_size: page_size.to_string(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct LitterEditArgs {
    pub id: String,
    /// Puppy slot: rs, rsm, rb, hs, hsm or hb
    #[arg(long)]
    pub slot: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub total: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub available: Option<i64>,
    /// New lifecycle status
    #[arg(long)]
    pub status: Option<String>,
    /// Status message draft
    #[arg(long)]
    pub message: Option<String>,
}

impl CliConfig {
    /// Defaults, then the TOML file, then explicit flags.
    pub fn settings(&self) -> Result<RegistrySettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let toml = TomlConfig::from_file(path)?;
                toml.validate()?;
                RegistrySettings::from_provider(&toml)
            }
            None => RegistrySettings::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.token {
            settings.api_token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_seconds = timeout;
        }
        if let Some(size) = self.page_size {
            validation::validate_one_of("page_size", size, &ALLOWED_PAGE_SIZES)?;
            settings.default_page_size = PageSize::new(size).unwrap_or_default();
        }
        if self.origin_lat.is_some() || self.origin_lng.is_some() {
            let lat = *validation::validate_required_field("origin_lat", &self.origin_lat)?;
            let lng = *validation::validate_required_field("origin_lng", &self.origin_lng)?;
            settings.origin =
                Some(GeoPoint::new(lat, lng).ok_or_else(|| RegistryError::InvalidConfigValueError {
                    field: "origin".to_string(),
                    value: format!("{}, {}", lat, lng),
                    reason: "Latitude must be within [-90, 90] and longitude within [-180, 180]"
                        .to_string(),
                })?);
        }
        if self.rank_by_distance {
            settings.rank_by_distance = true;
        }

        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.settings()?.validate()
    }
}
