//! Page type and response envelope for paginated results.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::model::Record;

/// One page of records from a paginated Data API call.
///
/// `cursor` is the zero-based offset of the first record in the page,
/// `count` the number of records in this page, and `remaining` the number
/// of records after it. Across sequential fetches at a fixed page size,
/// `remaining` decreases to zero while `cursor` advances by the page size.
#[derive(Debug, Clone)]
pub struct Page {
    records: Vec<Record>,
    cursor: u64,
    count: usize,
    remaining: u64,
}

impl Page {
    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the offset of the first record in this page.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Returns the server-reported size of this page.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the number of records remaining after this page.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns `true` if there are more pages available.
    pub fn has_more(&self) -> bool {
        self.remaining > 0
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Top-level envelope wrapping every Data API response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) response: T,
}

/// Body of a list response. All keys are required; a response missing any
/// of them is malformed.
#[derive(Debug, Deserialize)]
struct ListBody {
    cursor: u64,
    results: Vec<Record>,
    count: usize,
    remaining: u64,
}

/// Parses a response body into the expected envelope, surfacing unexpected
/// shapes as [`ApiError::Parse`] with the raw body attached.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::parse_with_body(format!("Unexpected response shape: {e}"), body))?;
    Ok(envelope.response)
}

pub(crate) fn parse_page(body: &str) -> Result<Page, ApiError> {
    let list: ListBody = parse_envelope(body)?;
    Ok(Page {
        records: list.results,
        cursor: list.cursor,
        count: list.count,
        remaining: list.remaining,
    })
}
