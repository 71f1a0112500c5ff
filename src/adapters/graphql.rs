//! Content repository adapter for the registry's Strapi GraphQL API.

use crate::core::filter::{Criterion, Field, FilterRequest};
use crate::core::pedigree::PEDIGREE_DEPTH;
use crate::domain::model::{Article, Breeder, Dog, Litter, LitterUpdate, Page, PageInfo};
use crate::domain::ports::{ConfigProvider, ContentRepository, SessionContext};
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

const DOG_FIELDS: &str = "documentId givenName fullKennelName sex color dateOfBirth dateOfDeath \
     microchipNo cFertile HDTest Sod1Test HeartCheck EyesCheck Location { lat lng }";

const BREEDER_FIELDS: &str = "documentId kennelName isActive disabled isDirty \
     GeoLocation { lat lng } WebsiteUrl WebsiteUrlDraft BreedersIntroduction BreedersIntroDraft \
     member { firstName lastName email phone Location { lat lng } \
     Address { FullName Address1 Address2 CountryCode Zip City } }";

const LITTER_FIELDS: &str = "documentId OrderLetter LitterStatus plannedDateOfBirth \
     expectedDateOfBirth dateOfBirth dateOfManting StatusMessage StatusMessageDraft \
     StatusMessageDirtyFlag AmountRS { Total Available } AmountRSM { Total Available } \
     AmountRB { Total Available } AmountHS { Total Available } AmountHSM { Total Available } \
     AmountHB { Total Available }";

const ARTICLE_FIELDS: &str = "documentId title slug excerpt publishedAt";

const PAGE_INFO: &str = "pageInfo { total page pageSize pageCount }";

/// Dog fields plus `depth` generations of parents.
fn dog_selection(depth: usize) -> String {
    if depth == 0 {
        return DOG_FIELDS.to_string();
    }
    let parent = dog_selection(depth - 1);
    format!("{DOG_FIELDS} father {{ {parent} }} mother {{ {parent} }}")
}

fn litter_selection() -> String {
    let dog = dog_selection(0);
    format!(
        "{LITTER_FIELDS} breeder {{ {BREEDER_FIELDS} }} mother {{ {dog} }} stuntDog {{ {dog} }}"
    )
}

fn connection_query(name: &str, connection: &str, filter_type: &str, selection: &str) -> String {
    format!(
        "query {name}($filters: {filter_type}, $pagination: PaginationArg, $sort: [String]) {{ \
         {connection}(filters: $filters, pagination: $pagination, sort: $sort) {{ \
         nodes {{ {selection} }} {PAGE_INFO} }} }}"
    )
}

/// Wraps `leaf` in the nested objects named by `path`.
fn nested(path: &[&str], leaf: Value) -> Value {
    path.iter().rev().fold(leaf, |inner, key| {
        let mut object = Map::new();
        object.insert((*key).to_string(), inner);
        Value::Object(object)
    })
}

/// The repository's filter expression for one criterion.
fn condition(criterion: &Criterion) -> Value {
    match criterion {
        Criterion::ContainsAny { fields, needle } => {
            let mut alternatives: Vec<Value> = fields
                .iter()
                .map(|field| nested(field.path(), json!({ "containsi": needle })))
                .collect();
            if alternatives.len() == 1 {
                alternatives.remove(0)
            } else {
                json!({ "or": alternatives })
            }
        }
        Criterion::Equals { field, value } => nested(field.path(), json!({ "eq": value })),
        // Listed means active and not disabled.
        Criterion::Flag {
            field: Field::Active,
            value: true,
        } => json!({
            "and": [
                { "isActive": { "eq": true } },
                { "or": [ { "disabled": { "eq": false } }, { "disabled": { "null": true } } ] }
            ]
        }),
        Criterion::Flag {
            field: Field::Active,
            value: false,
        } => json!({
            "or": [
                { "isActive": { "eq": false } },
                { "isActive": { "null": true } },
                { "disabled": { "eq": true } }
            ]
        }),
        Criterion::Flag { field, value } => nested(field.path(), json!({ "eq": value })),
        Criterion::AnyAvailable { slots } => {
            let alternatives: Vec<Value> = slots
                .iter()
                .map(|slot| nested(&[slot.wire_name().as_str()], json!({ "Available": { "gt": 0 } })))
                .collect();
            json!({ "or": alternatives })
        }
    }
}

/// `filters`, `pagination` and `sort` variables for a search request.
pub fn render_variables(request: &FilterRequest) -> Value {
    let mut variables = json!({
        "pagination": {
            "page": request.pagination.page,
            "pageSize": request.pagination.limit(),
        },
        "sort": request.sort.iter().map(|key| key.as_param()).collect::<Vec<_>>(),
    });

    let conditions: Vec<Value> = request.criteria().iter().map(condition).collect();
    if !conditions.is_empty() {
        variables["filters"] = json!({ "and": conditions });
    }
    variables
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: String,
}

fn joined_messages(errors: &[GraphQlErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| e.message.trim())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
    #[serde(rename = "pageInfo")]
    page_info: Option<PageInfo>,
}

impl<T> From<Connection<T>> for Page<T> {
    fn from(connection: Connection<T>) -> Self {
        Page {
            nodes: connection.nodes,
            page_info: connection.page_info,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DogsData {
    #[serde(rename = "hzdPluginDogs_connection")]
    connection: Option<Connection<Dog>>,
}

#[derive(Debug, Deserialize)]
struct LittersData {
    #[serde(rename = "hzdPluginLitters_connection")]
    connection: Option<Connection<Litter>>,
}

#[derive(Debug, Deserialize)]
struct BreedersData {
    #[serde(rename = "hzdPluginBreeders_connection")]
    connection: Option<Connection<Breeder>>,
}

#[derive(Debug, Deserialize)]
struct ArticlesData {
    #[serde(rename = "newsArticles", default)]
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct DogData {
    #[serde(rename = "hzdPluginDog")]
    dog: Option<Dog>,
}

#[derive(Debug, Deserialize)]
struct LitterData {
    #[serde(rename = "hzdPluginLitter")]
    litter: Option<Litter>,
}

#[derive(Debug, Deserialize)]
struct UpdateLitterData {
    #[serde(rename = "updateHzdPluginLitter")]
    litter: Option<Litter>,
}

fn empty_page<T>(request: &FilterRequest) -> Page<T> {
    Page::new(
        Vec::new(),
        PageInfo {
            total: 0,
            page: request.pagination.page,
            page_size: request.pagination.limit(),
            page_count: 0,
        },
    )
}

pub struct GraphQlRepository {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl GraphQlRepository {
    /// `base_url` is the repository root; queries go to `<base_url>/graphql`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/graphql", base_url.trim().trim_end_matches('/')),
            api_token: None,
        })
    }

    /// Token used when the session carries none.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Ok(Self::new(config.endpoint(), config.timeout_seconds())?
            .with_api_token(config.api_token().map(str::to_string)))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        session: &SessionContext,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = session.token().or(self.api_token.as_deref()) {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Sending GraphQL request to {}", self.endpoint);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("GraphQL response status: {}", status);

        if !status.is_success() {
            // Strapi reports rejected queries with a 4xx and an `errors` array.
            let message = serde_json::from_str::<GraphQlResponse<Value>>(&body)
                .map(|parsed| joined_messages(&parsed.errors))
                .unwrap_or_default();
            return Err(RegistryError::StatusError {
                status: status.as_u16(),
                body: if message.is_empty() { body } else { message },
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)?;
        if !parsed.errors.is_empty() {
            return Err(RegistryError::QueryError {
                message: joined_messages(&parsed.errors),
            });
        }
        parsed.data.ok_or_else(|| RegistryError::QueryError {
            message: "response contained no data".to_string(),
        })
    }
}

#[async_trait]
impl ContentRepository for GraphQlRepository {
    async fn search_dogs(&self, request: &FilterRequest, session: &SessionContext) -> Result<Page<Dog>> {
        let query = connection_query(
            "SearchDogs",
            "hzdPluginDogs_connection",
            "HzdPluginDogFiltersInput",
            &dog_selection(0),
        );
        let data: DogsData = self
            .execute(&query, render_variables(request), session)
            .await?;
        Ok(data
            .connection
            .map(Page::from)
            .unwrap_or_else(|| empty_page(request)))
    }

    async fn search_litters(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Page<Litter>> {
        let query = connection_query(
            "SearchLitters",
            "hzdPluginLitters_connection",
            "HzdPluginLitterFiltersInput",
            &litter_selection(),
        );
        let data: LittersData = self
            .execute(&query, render_variables(request), session)
            .await?;
        Ok(data
            .connection
            .map(Page::from)
            .unwrap_or_else(|| empty_page(request)))
    }

    async fn search_breeders(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Page<Breeder>> {
        let query = connection_query(
            "SearchBreeders",
            "hzdPluginBreeders_connection",
            "HzdPluginBreederFiltersInput",
            BREEDER_FIELDS,
        );
        let data: BreedersData = self
            .execute(&query, render_variables(request), session)
            .await?;
        Ok(data
            .connection
            .map(Page::from)
            .unwrap_or_else(|| empty_page(request)))
    }

    async fn list_articles(
        &self,
        request: &FilterRequest,
        session: &SessionContext,
    ) -> Result<Vec<Article>> {
        let query = format!(
            "query ArticlesByCategory($filters: NewsArticleFiltersInput, $pagination: PaginationArg, \
             $sort: [String]) {{ newsArticles(filters: $filters, pagination: $pagination, \
             sort: $sort) {{ {ARTICLE_FIELDS} }} }}"
        );
        let data: ArticlesData = self
            .execute(&query, render_variables(request), session)
            .await?;
        Ok(data.articles.unwrap_or_default())
    }

    async fn find_dog(&self, id: &str, session: &SessionContext) -> Result<Option<Dog>> {
        let query = format!(
            "query GetDog($documentId: ID!) {{ hzdPluginDog(documentId: $documentId) {{ {} }} }}",
            dog_selection(PEDIGREE_DEPTH)
        );
        let data: DogData = self
            .execute(&query, json!({ "documentId": id }), session)
            .await?;
        Ok(data.dog)
    }

    async fn find_litter(&self, id: &str, session: &SessionContext) -> Result<Option<Litter>> {
        let query = format!(
            "query GetLitter($documentId: ID!) {{ hzdPluginLitter(documentId: $documentId) {{ {} }} }}",
            litter_selection()
        );
        let data: LitterData = self
            .execute(&query, json!({ "documentId": id }), session)
            .await?;
        Ok(data.litter)
    }

    async fn update_litter(
        &self,
        id: &str,
        update: &LitterUpdate,
        session: &SessionContext,
    ) -> Result<Litter> {
        let query = format!(
            "mutation UpdateLitter($documentId: ID!, $data: HzdPluginLitterInput!) {{ \
             updateHzdPluginLitter(documentId: $documentId, data: $data) {{ {} }} }}",
            litter_selection()
        );
        let variables = json!({ "documentId": id, "data": serde_json::to_value(update)? });
        let data: UpdateLitterData = self.execute(&query, variables, session).await?;
        data.litter.ok_or_else(|| RegistryError::NotFound {
            entity: "litter",
            id: id.to_string(),
        })
    }
}
