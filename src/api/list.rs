//! Single-page and single-record fetch operations.

use tracing::debug;

use crate::BubbleClient;
use crate::api::Constraint;
use crate::api::Page;
use crate::api::constraint::validate_constraints;
use crate::api::page::parse_envelope;
use crate::api::page::parse_page;
use crate::error::ApiError;
use crate::error::ConfigError;
use crate::error::Error;
use crate::model::Record;

/// Server default and maximum page size.
pub const MAX_PAGE_SIZE: u32 = 100;

impl BubbleClient {
    /// Starts a single-page list request for the given collection type.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let page = client
    ///     .list("fooType")
    ///     .limit(50)
    ///     .constraint(Constraint::equals("status", "active"))
    ///     .send()
    ///     .await?;
    /// ```
    pub fn list(&self, type_name: impl Into<String>) -> ListRequest<'_> {
        ListRequest {
            client: self,
            type_name: type_name.into(),
            limit: None,
            cursor: None,
            constraints: Vec::new(),
        }
    }

    /// Fetches a single record by its unique ID.
    pub async fn retrieve(&self, type_name: &str, id: &str) -> Result<Record, Error> {
        let url = format!("{}/{}", self.type_url(type_name), id);
        debug!(type_name, id, "GET single record");

        let response = self.get(&url, &[]).await?;
        let body = response.text().await.map_err(ApiError::from)?;
        Ok(parse_envelope(&body)?)
    }
}

/// A single-page list request.
///
/// Fetches at most one page of up to 100 records. Use
/// [`BubbleClient::fetch_all`] to walk an entire collection.
#[derive(Debug)]
pub struct ListRequest<'a> {
    client: &'a BubbleClient,
    type_name: String,
    limit: Option<u32>,
    cursor: Option<u64>,
    constraints: Vec<Constraint>,
}

impl ListRequest<'_> {
    /// Sets the number of records to return (1..=100, server default 100).
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the rank of the first record to return.
    pub fn cursor(mut self, cursor: u64) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Adds a search constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds several search constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Sends the request and returns the fetched page.
    pub async fn send(self) -> Result<Page, Error> {
        if let Some(limit) = self.limit
            && !(1..=MAX_PAGE_SIZE).contains(&limit)
        {
            return Err(ConfigError::LimitOutOfRange { limit }.into());
        }
        validate_constraints(&self.constraints)?;

        let query = build_query(self.limit, self.cursor, &self.constraints)?;
        let url = self.client.type_url(&self.type_name);
        debug!(
            type_name = %self.type_name,
            limit = ?self.limit,
            cursor = ?self.cursor,
            "GET page"
        );

        let response = self.client.get(&url, &query).await?;
        let body = response.text().await.map_err(ApiError::from)?;
        Ok(parse_page(&body)?)
    }
}

/// Builds the query parameters for a list request. Constraints are carried
/// as a JSON-encoded array in a single `constraints` parameter.
fn build_query(
    limit: Option<u32>,
    cursor: Option<u64>,
    constraints: &[Constraint],
) -> Result<Vec<(&'static str, String)>, Error> {
    let mut query = Vec::new();
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(cursor) = cursor {
        query.push(("cursor", cursor.to_string()));
    }
    if !constraints.is_empty() {
        let encoded = serde_json::to_string(constraints)
            .map_err(|e| ApiError::parse(format!("Failed to encode constraints: {e}")))?;
        query.push(("constraints", encoded));
    }
    Ok(query)
}
