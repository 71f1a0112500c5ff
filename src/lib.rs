pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{RegistrySettings, TomlConfig};

pub use adapters::{GraphQlRepository, InMemoryRepository};
pub use core::filter::{compose_filters, FilterForm, FilterRequest, PageSize, RawFilters, TriState};
pub use core::geo::{compute_distance, evaluate, DistanceLimit, Proximity};
pub use core::ledger::{validate_amounts, AmountReport, LitterLedger};
pub use core::pedigree::{resolve_pedigree, PedigreeTree};
pub use core::search::{PageCount, SearchError, SearchSession, SearchState, Searchable};
pub use domain::ports::{ConfigProvider, ContentRepository, SessionContext};
pub use utils::error::{RegistryError, Result};
