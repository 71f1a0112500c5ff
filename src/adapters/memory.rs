use crate::core::filter::{Criterion, Field, FilterRequest, SortKey};
use crate::core::search::exact_page_count;
use crate::domain::model::{
    AmountSlot, Article, Breeder, Dog, Litter, LitterUpdate, Page, PageInfo, PuppyAmount,
};
use crate::domain::ports::{ContentRepository, SessionContext};
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::cmp::Ordering;
use std::path::Path;
use tokio::sync::RwLock;

/// Field access used to evaluate composed criteria against local records.
trait Queryable {
    fn text(&self, field: Field) -> Option<String>;

    fn flag(&self, _field: Field) -> Option<bool> {
        None
    }

    fn amount(&self, _slot: AmountSlot) -> Option<PuppyAmount> {
        None
    }
}

impl Queryable for Dog {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::GivenName => self.given_name.clone(),
            Field::FullKennelName => self.full_kennel_name.clone(),
            Field::MicrochipNo => self.microchip_no.clone(),
            Field::Sex => self.sex.map(|s| s.code().to_string()),
            Field::Color => self.color.map(|c| c.code().to_string()),
            Field::DateOfBirth => self.date_of_birth.map(|d| d.to_string()),
            _ => None,
        }
    }

    fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::Fertile => self.is_fertile,
            Field::HdTest => self.hd_test,
            Field::Sod1Test => self.sod1_test,
            Field::HeartCheck => self.heart_check,
            Field::EyesCheck => self.eyes_check,
            _ => None,
        }
    }
}

impl Queryable for Litter {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::BreederKennelName => self.breeder.as_ref()?.kennel_name.clone(),
            Field::BreederId => self.breeder.as_ref().map(|b| b.id.clone()),
            Field::MotherFullKennelName => self.mother.as_ref()?.full_kennel_name.clone(),
            Field::MotherGivenName => self.mother.as_ref()?.given_name.clone(),
            Field::LitterStatus => Some(self.status.wire_name().to_string()),
            Field::OrderLetter => self.order_letter.clone(),
            Field::DateOfBirth => self.date_of_birth.map(|d| d.to_string()),
            Field::ExpectedDateOfBirth => self.expected_date_of_birth.map(|d| d.to_string()),
            _ => None,
        }
    }

    fn amount(&self, slot: AmountSlot) -> Option<PuppyAmount> {
        Some(self.amounts.get(slot))
    }
}

impl Queryable for Breeder {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::KennelName => self.kennel_name.clone(),
            _ => None,
        }
    }

    fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::Active => Some(self.is_listed()),
            _ => None,
        }
    }
}

impl Queryable for Article {
    fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Category => self.category.clone(),
            Field::PublishedAt => self.published_at.map(|t| t.to_rfc3339()),
            _ => None,
        }
    }
}

fn matches<T: Queryable>(record: &T, criterion: &Criterion) -> bool {
    match criterion {
        Criterion::ContainsAny { fields, needle } => {
            let needle = needle.to_lowercase();
            fields.iter().any(|field| {
                record
                    .text(*field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            })
        }
        Criterion::Equals { field, value } => record.text(*field).as_deref() == Some(value.as_str()),
        Criterion::Flag { field, value } => record.flag(*field) == Some(*value),
        Criterion::AnyAvailable { slots } => slots
            .iter()
            .any(|slot| record.amount(*slot).is_some_and(|a| a.available > 0)),
    }
}

/// Missing values sort last in either direction.
fn compare<T: Queryable>(a: &T, b: &T, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = match (a.text(key.field), b.text(key.field)) {
            (Some(x), Some(y)) if key.descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn select<T: Queryable + Clone>(records: &[T], request: &FilterRequest) -> (Vec<T>, u64) {
    let criteria = request.criteria();
    let mut matched: Vec<T> = records
        .iter()
        .filter(|record| criteria.iter().all(|c| matches(*record, c)))
        .cloned()
        .collect();
    matched.sort_by(|a, b| compare(a, b, &request.sort));

    let total = matched.len() as u64;
    let pagination = request.pagination;
    let nodes = matched
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(pagination.limit() as usize)
        .collect();
    (nodes, total)
}

fn paged<T: Queryable + Clone>(records: &[T], request: &FilterRequest) -> Page<T> {
    let (nodes, total) = select(records, request);
    let pagination = request.pagination;
    Page::new(
        nodes,
        PageInfo {
            total,
            page: pagination.page,
            page_size: pagination.limit(),
            page_count: exact_page_count(total, pagination.limit()),
        },
    )
}

#[derive(Debug, Default, Deserialize)]
struct Fixtures {
    #[serde(default)]
    dogs: Vec<Dog>,
    #[serde(default)]
    litters: Vec<Litter>,
    #[serde(default)]
    breeders: Vec<Breeder>,
    #[serde(default)]
    articles: Vec<Article>,
}

/// Content repository held in memory, for fixtures and offline use.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    dogs: RwLock<Vec<Dog>>,
    litters: RwLock<Vec<Litter>>,
    breeders: RwLock<Vec<Breeder>>,
    articles: RwLock<Vec<Article>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dogs(mut self, dogs: Vec<Dog>) -> Self {
        self.dogs = RwLock::new(dogs);
        self
    }

    pub fn with_litters(mut self, litters: Vec<Litter>) -> Self {
        self.litters = RwLock::new(litters);
        self
    }

    pub fn with_breeders(mut self, breeders: Vec<Breeder>) -> Self {
        self.breeders = RwLock::new(breeders);
        self
    }

    pub fn with_articles(mut self, articles: Vec<Article>) -> Self {
        self.articles = RwLock::new(articles);
        self
    }

    /// Loads `{ "dogs": [...], "litters": [...], "breeders": [...], "articles": [...] }`
    /// using the repository's own field names.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let fixtures: Fixtures = serde_json::from_str(content)?;
        Ok(Self::new()
            .with_dogs(fixtures.dogs)
            .with_litters(fixtures.litters)
            .with_breeders(fixtures.breeders)
            .with_articles(fixtures.articles))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    async fn dog_by_id(&self, id: &str) -> Result<Dog> {
        self.dogs
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                entity: "dog",
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn search_dogs(&self, request: &FilterRequest, _: &SessionContext) -> Result<Page<Dog>> {
        let dogs = self.dogs.read().await;
        tracing::debug!("Searching {} in-memory dogs", dogs.len());
        Ok(paged(dogs.as_slice(), request))
    }

    async fn search_litters(
        &self,
        request: &FilterRequest,
        _: &SessionContext,
    ) -> Result<Page<Litter>> {
        let litters = self.litters.read().await;
        Ok(paged(litters.as_slice(), request))
    }

    async fn search_breeders(
        &self,
        request: &FilterRequest,
        _: &SessionContext,
    ) -> Result<Page<Breeder>> {
        let breeders = self.breeders.read().await;
        Ok(paged(breeders.as_slice(), request))
    }

    async fn list_articles(
        &self,
        request: &FilterRequest,
        _: &SessionContext,
    ) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let (nodes, _) = select(articles.as_slice(), request);
        Ok(nodes)
    }

    async fn find_dog(&self, id: &str, _: &SessionContext) -> Result<Option<Dog>> {
        Ok(self.dogs.read().await.iter().find(|d| d.id == id).cloned())
    }

    async fn find_litter(&self, id: &str, _: &SessionContext) -> Result<Option<Litter>> {
        Ok(self.litters.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn update_litter(
        &self,
        id: &str,
        update: &LitterUpdate,
        _: &SessionContext,
    ) -> Result<Litter> {
        // Resolve references before taking the write lock.
        let mother = match &update.mother_id {
            Some(Some(mother_id)) => Some(Some(self.dog_by_id(mother_id).await?)),
            Some(None) => Some(None),
            None => None,
        };
        let stunt_dog = match &update.stunt_dog_id {
            Some(Some(stunt_id)) => Some(Some(self.dog_by_id(stunt_id).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let mut litters = self.litters.write().await;
        let litter = litters
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RegistryError::NotFound {
                entity: "litter",
                id: id.to_string(),
            })?;

        litter.status = update.status;
        if let Some(draft) = &update.status_message_draft {
            litter.status_message_dirty = Some(draft) != litter.status_message.as_ref();
            litter.status_message_draft = Some(draft.clone());
        }
        // `Some(None)` clears; absent fields keep their stored value.
        if let Some(mother) = mother {
            litter.mother = mother;
        }
        if let Some(stunt_dog) = stunt_dog {
            litter.stunt_dog = stunt_dog;
        }
        if let Some(date) = update.planned_date_of_birth {
            litter.planned_date_of_birth = date;
        }
        if let Some(date) = update.expected_date_of_birth {
            litter.expected_date_of_birth = date;
        }
        if let Some(date) = update.date_of_birth {
            litter.date_of_birth = date;
        }
        litter.amounts = update.amounts;

        tracing::debug!("Updated in-memory litter {}", id);
        Ok(litter.clone())
    }
}
