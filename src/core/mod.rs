pub mod filter;
pub mod geo;
pub mod ledger;
pub mod pedigree;
pub mod search;

pub use crate::domain::model::{Article, Breeder, Collection, Dog, GeoPoint, Litter, Page};
pub use crate::domain::ports::{ConfigProvider, ContentRepository, SessionContext};
pub use crate::utils::error::Result;
