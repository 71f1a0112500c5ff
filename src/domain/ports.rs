use crate::core::filter::{FilterRequest, PageSize};
use crate::domain::model::{Article, Breeder, Dog, GeoPoint, Litter, LitterUpdate, Page};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Per-user scope for repository calls, passed explicitly into every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn default_page_size(&self) -> PageSize;
    fn rank_by_distance(&self) -> bool;
    fn origin(&self) -> Option<GeoPoint>;
}

/// The external system of record for dogs, litters, breeders and articles.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn search_dogs(&self, request: &FilterRequest, session: &SessionContext)
        -> Result<Page<Dog>>;

    async fn search_litters(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Page<Litter>>;

    async fn search_breeders(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Page<Breeder>>;

    /// Category-scoped listing; the repository reports no total.
    async fn list_articles(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Vec<Article>>;

    /// Looks up a dog with its ancestors populated three generations deep.
    async fn find_dog(&self, id: &str, session: &SessionContext) -> Result<Option<Dog>>;

    async fn find_litter(&self, id: &str, session: &SessionContext) -> Result<Option<Litter>>;

    /// Applies the update atomically and returns the repository's post-write litter.
    async fn update_litter(
        &self,
        id: &str,
        update: &LitterUpdate,
        session: &SessionContext,
    ) -> Result<Litter>;
}
