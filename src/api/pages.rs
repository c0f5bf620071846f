//! Full-collection retrieval across all pages.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::BubbleClient;
use crate::api::Constraint;
use crate::api::ProgressSink;
use crate::api::constraint::validate_constraints;
use crate::api::progress::ProgressThrottle;
use crate::error::ConfigError;
use crate::error::Error;
use crate::model::Record;

/// Fixed page size used when walking a collection. The server default and
/// maximum limit is 100, so the cursor advances by 100 per call.
pub(crate) const PAGE_SIZE: u64 = 100;

/// Default resolution for throttling progress callbacks.
pub const DEFAULT_PROGRESS_RESOLUTION: f64 = 0.1;

impl BubbleClient {
    /// Starts a full-collection retrieval for the given type.
    ///
    /// The request pages through the entire collection sequentially, one
    /// fetch at a time, and returns every record in cursor order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let records = client
    ///     .fetch_all("fooType")
    ///     .constraint(Constraint::equals("status", "active"))
    ///     .on_progress(ProgressFn::new(|f| println!("{:.0}%", f * 100.0)))
    ///     .run()
    ///     .await?;
    /// ```
    pub fn fetch_all(&self, type_name: impl Into<String>) -> FetchAllRequest<'_> {
        FetchAllRequest {
            client: self,
            type_name: type_name.into(),
            constraints: Vec::new(),
            progress: None,
            resolution: DEFAULT_PROGRESS_RESOLUTION,
            cancel: None,
        }
    }
}

/// A full-collection retrieval request.
pub struct FetchAllRequest<'a> {
    client: &'a BubbleClient,
    type_name: String,
    constraints: Vec<Constraint>,
    progress: Option<Arc<dyn ProgressSink>>,
    resolution: f64,
    cancel: Option<CancellationToken>,
}

impl FetchAllRequest<'_> {
    /// Adds a search constraint, applied to every page fetch.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds several search constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Sets a progress sink. See [`ProgressSink`] for the callback contract.
    pub fn on_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Sets the minimum progress advance between callbacks (default 0.1).
    ///
    /// Must be in `(0.0, 1.0]`; validated before any network call.
    pub fn progress_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets a cancellation token, checked between page fetches.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Retrieves every record of the collection.
    pub async fn run(self) -> Result<Vec<Record>, Error> {
        if !(self.resolution > 0.0 && self.resolution <= 1.0) {
            return Err(ConfigError::InvalidResolution {
                resolution: self.resolution,
            }
            .into());
        }
        validate_constraints(&self.constraints)?;

        let mut throttle = ProgressThrottle::new(self.resolution);

        // First page at the server default limit, no cursor.
        let first = self
            .client
            .list(self.type_name.as_str())
            .constraints(self.constraints.iter().cloned())
            .send()
            .await?;

        let mut remaining = first.remaining();
        // Fixed once known; later pages' remaining is still trusted as
        // ground truth since the collection can drift under concurrent
        // writes.
        let item_count = first.len() as u64 + remaining;
        let mut records = first.into_records();

        info!(type_name = %self.type_name, item_count, "Fetching full collection");

        if let Some(sink) = &self.progress {
            let fraction = progress_fraction(records.len(), item_count);
            if let Some(fraction) = throttle.advance(fraction) {
                sink.progress(fraction).await;
            }
        }

        let mut cursor = PAGE_SIZE;
        while remaining > 0 {
            if let Some(cancel) = &self.cancel
                && cancel.is_cancelled()
            {
                return Err(Error::Cancelled);
            }

            let page = self
                .client
                .list(self.type_name.as_str())
                .cursor(cursor)
                .constraints(self.constraints.iter().cloned())
                .send()
                .await?;

            remaining = page.remaining();
            records.extend(page.into_records());
            debug!(type_name = %self.type_name, remaining, "Page fetched");

            if let Some(sink) = &self.progress {
                let fraction = progress_fraction(records.len(), item_count);
                if let Some(fraction) = throttle.advance(fraction) {
                    sink.progress(fraction).await;
                    info!(
                        type_name = %self.type_name,
                        processed = records.len(),
                        item_count,
                        "Progress callback sent"
                    );
                }
            }

            cursor += PAGE_SIZE;
        }

        // Completion always reports exactly 1.0, even when drift kept the
        // computed fraction short of it.
        if let Some(sink) = &self.progress
            && !throttle.finished()
        {
            sink.progress(1.0).await;
        }

        Ok(records)
    }
}

/// Fraction of the collection processed so far. An empty collection counts
/// as complete.
fn progress_fraction(processed: usize, item_count: u64) -> f64 {
    if item_count == 0 {
        1.0
    } else {
        processed as f64 / item_count as f64
    }
}
