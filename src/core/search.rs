//! Search orchestration: one session per result list, driving
//! `Idle -> Loading -> Success | Error` against the content repository.

use crate::core::filter::FilterRequest;
use crate::core::geo::{evaluate, DistanceLimit, Located, Proximity};
use crate::domain::model::{Article, Breeder, Collection, Dog, GeoPoint, Litter, Page};
use crate::domain::ports::{ContentRepository, SessionContext};
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A collection the orchestrator can page through.
#[async_trait]
pub trait Searchable: Located + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Shown when the failure carries no message of its own.
    const DEFAULT_ERROR: &'static str;

    async fn fetch<R>(
        repo: &R,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Page<Self>>
    where
        R: ContentRepository + ?Sized;
}

#[async_trait]
impl Searchable for Dog {
    const COLLECTION: Collection = Collection::Dogs;
    const DEFAULT_ERROR: &'static str = "Dogs could not be loaded. Please try again later.";

    async fn fetch<R>(repo: &R, request: &FilterRequest, session: &SessionContext) -> Result<Page<Self>>
    where
        R: ContentRepository + ?Sized,
    {
        repo.search_dogs(request, session).await
    }
}

#[async_trait]
impl Searchable for Litter {
    const COLLECTION: Collection = Collection::Litters;
    const DEFAULT_ERROR: &'static str = "Litters could not be loaded. Please try again later.";

    async fn fetch<R>(repo: &R, request: &FilterRequest, session: &SessionContext) -> Result<Page<Self>>
    where
        R: ContentRepository + ?Sized,
    {
        repo.search_litters(request, session).await
    }
}

#[async_trait]
impl Searchable for Breeder {
    const COLLECTION: Collection = Collection::Breeders;
    const DEFAULT_ERROR: &'static str = "Breeders could not be loaded. Please try again later.";

    async fn fetch<R>(repo: &R, request: &FilterRequest, session: &SessionContext) -> Result<Page<Self>>
    where
        R: ContentRepository + ?Sized,
    {
        repo.search_breeders(request, session).await
    }
}

#[async_trait]
impl Searchable for Article {
    const COLLECTION: Collection = Collection::Articles;
    const DEFAULT_ERROR: &'static str = "Articles could not be loaded. Please try again later.";

    async fn fetch<R>(repo: &R, request: &FilterRequest, session: &SessionContext) -> Result<Page<Self>>
    where
        R: ContentRepository + ?Sized,
    {
        let articles = repo.list_articles(request, session).await?;
        Ok(Page::without_info(articles))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Failure surfaced to the presentation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SearchError {
    pub message: String,
    pub transient: bool,
}

impl SearchError {
    pub fn from_registry(err: &RegistryError, default_message: &str) -> Self {
        Self {
            message: err
                .message()
                .unwrap_or_else(|| default_message.to_string()),
            transient: err.is_transient(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// `ceil(total / page_size)` from a reported total.
    Exact(u32),
    /// Guessed from whether the current page came back full.
    Estimated(u32),
}

impl PageCount {
    pub fn value(&self) -> u32 {
        match self {
            PageCount::Exact(n) | PageCount::Estimated(n) => *n,
        }
    }
}

pub fn exact_page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// `page + 1` when a full page came back, else `page`.
pub fn estimate_page_count(page: u32, returned: usize, page_size: u32) -> u32 {
    if returned >= page_size as usize {
        page.saturating_add(1)
    } else {
        page
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<T> {
    pub entity: T,
    pub proximity: Proximity,
}

/// Issued by [`SearchSession::begin`]; only the newest ticket may apply results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    seq: u64,
    request: FilterRequest,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &FilterRequest {
        &self.request
    }
}

pub struct SearchSession<R: ContentRepository + ?Sized, T: Searchable> {
    repo: Arc<R>,
    origin: Option<GeoPoint>,
    rank_by_distance: bool,
    state: SearchState,
    results: Vec<SearchHit<T>>,
    total: Option<u64>,
    page_count: Option<PageCount>,
    error: Option<SearchError>,
    issued: u64,
    applied_request: Option<FilterRequest>,
}

impl<R: ContentRepository + ?Sized, T: Searchable> SearchSession<R, T> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            origin: None,
            rank_by_distance: false,
            state: SearchState::Idle,
            results: Vec::new(),
            total: None,
            page_count: None,
            error: None,
            issued: 0,
            applied_request: None,
        }
    }

    /// The visitor's position used to annotate results with distances.
    pub fn with_origin(mut self, origin: Option<GeoPoint>) -> Self {
        self.origin = origin;
        self
    }

    /// Orders each page by ascending distance, unknown distances last.
    pub fn with_distance_ranking(mut self, enabled: bool) -> Self {
        self.rank_by_distance = enabled;
        self
    }

    /// Marks a new submission as the newest and enters `Loading`.
    ///
    /// A request composed for another collection is rejected and leaves the
    /// session untouched.
    pub fn begin(&mut self, request: FilterRequest) -> Result<SearchTicket> {
        if request.collection != T::COLLECTION {
            return Err(RegistryError::ValidationError {
                message: format!(
                    "A {} search cannot run against {}",
                    request.collection,
                    T::COLLECTION
                ),
            });
        }
        self.issued += 1;
        self.state = SearchState::Loading;
        debug!(collection = %T::COLLECTION, seq = self.issued, "Search submitted");
        Ok(SearchTicket {
            seq: self.issued,
            request,
        })
    }

    /// Applies a finished query. Returns `false` if a newer submission
    /// superseded `ticket` and the outcome was dropped.
    pub fn complete(&mut self, ticket: SearchTicket, outcome: Result<Page<T>>) -> bool {
        if ticket.seq != self.issued {
            warn!(
                collection = %T::COLLECTION,
                seq = ticket.seq,
                newest = self.issued,
                "Discarding superseded search result"
            );
            return false;
        }

        match outcome {
            Ok(page) => self.apply(ticket.request, page),
            Err(e) => {
                error!(collection = %T::COLLECTION, "Search failed: {}", e);
                self.error = Some(SearchError::from_registry(&e, T::DEFAULT_ERROR));
                self.state = SearchState::Error;
            }
        }
        true
    }

    fn apply(&mut self, request: FilterRequest, page: Page<T>) {
        let pagination = request.pagination;
        let returned = page.nodes.len();
        let (total, page_count) = match page.page_info {
            Some(info) => (
                Some(info.total),
                PageCount::Exact(exact_page_count(info.total, pagination.limit())),
            ),
            None => (
                None,
                PageCount::Estimated(estimate_page_count(
                    pagination.page,
                    returned,
                    pagination.limit(),
                )),
            ),
        };

        let limit = DistanceLimit::from(request.filters.max_distance_km);
        let mut hits: Vec<SearchHit<T>> = page
            .nodes
            .into_iter()
            .map(|entity| {
                let proximity = evaluate(self.origin, entity.location(), limit);
                SearchHit { entity, proximity }
            })
            .collect();
        if self.rank_by_distance {
            rank_by_distance(&mut hits);
        }

        info!(
            collection = %T::COLLECTION,
            returned,
            total = ?total,
            pages = page_count.value(),
            "Search succeeded"
        );

        self.results = hits;
        self.total = total;
        self.page_count = Some(page_count);
        self.error = None;
        self.state = SearchState::Success;
        self.applied_request = Some(request);
    }

    /// Runs one query to completion. Failures end up in [`Self::error`];
    /// earlier results stay in place.
    pub async fn search(&mut self, request: FilterRequest, session: &SessionContext) -> SearchState {
        let ticket = match self.begin(request) {
            Ok(ticket) => ticket,
            Err(e) => {
                error!(collection = %T::COLLECTION, "Search rejected: {}", e);
                self.error = Some(SearchError::from_registry(&e, T::DEFAULT_ERROR));
                self.state = SearchState::Error;
                return self.state;
            }
        };
        let outcome = T::fetch(&*self.repo, ticket.request(), session).await;
        self.complete(ticket, outcome);
        self.state
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SearchState::Loading
    }

    pub fn results(&self) -> &[SearchHit<T>] {
        &self.results
    }

    /// Results within the requested distance (or of unknown distance).
    pub fn in_range(&self) -> impl Iterator<Item = &SearchHit<T>> {
        self.results.iter().filter(|hit| !hit.proximity.exceeded)
    }

    /// `None` for sources that report no total.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn page_count(&self) -> Option<PageCount> {
        self.page_count
    }

    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    /// The request whose results are currently shown.
    pub fn applied_request(&self) -> Option<&FilterRequest> {
        self.applied_request.as_ref()
    }
}

/// Stable ascending order by distance; unknown distances sort last.
pub fn rank_by_distance<T>(hits: &mut [SearchHit<T>]) {
    hits.sort_by(|a, b| match (a.proximity.distance_km, b.proximity.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{compose_filters, RawFilters};
    use crate::domain::model::{LitterUpdate, PageInfo};
    use std::sync::Mutex;

    /// Serves dogs from a queue of scripted outcomes.
    struct ScriptedRepository {
        outcomes: Mutex<Vec<Result<Page<Dog>>>>,
        articles: Vec<Article>,
    }

    impl ScriptedRepository {
        fn new(mut outcomes: Vec<Result<Page<Dog>>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                articles: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ContentRepository for ScriptedRepository {
        async fn search_dogs(&self, _: &FilterRequest, _: &SessionContext) -> Result<Page<Dog>> {
            self.outcomes.lock().unwrap().pop().unwrap()
        }

        async fn search_litters(
            &self,
            _: &FilterRequest,
            _: &SessionContext,
        ) -> Result<Page<Litter>> {
            unimplemented!()
        }

        async fn search_breeders(
            &self,
            _: &FilterRequest,
            _: &SessionContext,
        ) -> Result<Page<Breeder>> {
            unimplemented!()
        }

        async fn list_articles(&self, _: &FilterRequest, _: &SessionContext) -> Result<Vec<Article>> {
            Ok(self.articles.clone())
        }

        async fn find_dog(&self, _: &str, _: &SessionContext) -> Result<Option<Dog>> {
            Ok(None)
        }

        async fn find_litter(&self, _: &str, _: &SessionContext) -> Result<Option<Litter>> {
            Ok(None)
        }

        async fn update_litter(
            &self,
            _: &str,
            _: &LitterUpdate,
            _: &SessionContext,
        ) -> Result<Litter> {
            unimplemented!()
        }
    }

    fn dog_at(name: &str, lat: f64, lng: f64) -> Dog {
        Dog {
            id: name.to_string(),
            given_name: Some(name.to_string()),
            location: GeoPoint::new(lat, lng),
            ..Default::default()
        }
    }

    fn page_of(dogs: Vec<Dog>, total: u64) -> Page<Dog> {
        let info = PageInfo {
            total,
            page: 1,
            page_size: 10,
            page_count: 0,
        };
        Page::new(dogs, info)
    }

    fn dogs_request() -> FilterRequest {
        compose_filters(Collection::Dogs, &RawFilters::default())
    }

    #[test]
    fn test_page_count_rules() {
        assert_eq!(exact_page_count(12, 10), 2);
        assert_eq!(exact_page_count(10, 10), 1);
        assert_eq!(exact_page_count(0, 10), 0);
        assert_eq!(estimate_page_count(3, 10, 10), 4);
        assert_eq!(estimate_page_count(3, 4, 10), 3);
    }

    #[test]
    fn test_default_error_when_message_missing() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = SearchError::from_registry(&RegistryError::from(json_err), Dog::DEFAULT_ERROR);
        assert_eq!(err.message, Dog::DEFAULT_ERROR);
        assert!(!err.transient);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_results() {
        let repo = ScriptedRepository::new(vec![
            Ok(page_of(vec![dog_at("Rex", 50.0, 8.0)], 1)),
            Err(RegistryError::QueryError {
                message: String::new(),
            }),
        ]);
        let mut session: SearchSession<_, Dog> = SearchSession::new(Arc::new(repo));
        let anonymous = SessionContext::anonymous();

        assert_eq!(session.search(dogs_request(), &anonymous).await, SearchState::Success);
        assert_eq!(session.search(dogs_request(), &anonymous).await, SearchState::Error);

        assert!(!session.is_loading());
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.total(), Some(1));
        assert_eq!(session.error().unwrap().message, Dog::DEFAULT_ERROR);
    }

    #[tokio::test]
    async fn test_request_for_another_collection_is_rejected() {
        let repo = ScriptedRepository::new(vec![Ok(page_of(vec![dog_at("Rex", 50.0, 8.0)], 1))]);
        let mut session: SearchSession<_, Dog> = SearchSession::new(Arc::new(repo));
        let anonymous = SessionContext::anonymous();

        assert_eq!(session.search(dogs_request(), &anonymous).await, SearchState::Success);

        let litters = compose_filters(Collection::Litters, &RawFilters::default());
        assert!(session.begin(litters.clone()).is_err());
        assert_eq!(session.state(), SearchState::Success);

        // The repository is never queried for the mismatched request.
        assert_eq!(session.search(litters, &anonymous).await, SearchState::Error);
        let error = session.error().unwrap();
        assert_eq!(error.message, "A litters search cannot run against dogs");
        assert!(!error.transient);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.applied_request(), Some(&dogs_request()));
    }

    #[tokio::test]
    async fn test_superseded_completion_is_discarded() {
        let mut session: SearchSession<ScriptedRepository, Dog> =
            SearchSession::new(Arc::new(ScriptedRepository::new(Vec::new())));

        let slow = session.begin(dogs_request()).unwrap();
        let fast = session.begin(dogs_request()).unwrap();
        assert!(session.is_loading());

        assert!(session.complete(fast, Ok(page_of(vec![dog_at("Fresh", 0.0, 0.0)], 1))));
        assert!(!session.complete(slow, Ok(page_of(vec![dog_at("Stale", 0.0, 0.0)], 1))));

        assert_eq!(session.state(), SearchState::Success);
        assert_eq!(session.results()[0].entity.id, "Fresh");
    }

    #[tokio::test]
    async fn test_results_annotated_and_ranked_by_distance() {
        let far = dog_at("Far", 48.0, 11.0);
        let near = dog_at("Near", 52.1, 13.1);
        let nowhere = Dog {
            id: "Nowhere".to_string(),
            ..Default::default()
        };
        let repo = ScriptedRepository::new(vec![Ok(page_of(vec![nowhere, far, near], 3))]);
        let mut session: SearchSession<_, Dog> = SearchSession::new(Arc::new(repo))
            .with_origin(GeoPoint::new(52.0, 13.0))
            .with_distance_ranking(true);

        let raw = RawFilters {
            max_distance: "300".to_string(),
            ..Default::default()
        };
        session
            .search(compose_filters(Collection::Dogs, &raw), &SessionContext::anonymous())
            .await;

        let ids: Vec<&str> = session.results().iter().map(|h| h.entity.id.as_str()).collect();
        assert_eq!(ids, vec!["Near", "Far", "Nowhere"]);
        assert!(session.results()[1].proximity.exceeded);
        assert_eq!(session.in_range().count(), 2);
    }

    #[tokio::test]
    async fn test_article_feed_page_count_is_estimated() {
        let mut repo = ScriptedRepository::new(Vec::new());
        repo.articles = vec![Article::default(); 5];
        let mut session: SearchSession<_, Article> = SearchSession::new(Arc::new(repo));

        let raw = RawFilters {
            page: "2".to_string(),
            page_size: "5".to_string(),
            category: "news".to_string(),
            ..Default::default()
        };
        session
            .search(compose_filters(Collection::Articles, &raw), &SessionContext::anonymous())
            .await;

        assert_eq!(session.total(), None);
        assert_eq!(session.page_count(), Some(PageCount::Estimated(3)));
    }
}
