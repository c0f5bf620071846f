//! Full-collection retrieval as joined tables.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::BubbleClient;
use crate::api::Constraint;
use crate::api::ProgressSink;
use crate::api::pages::DEFAULT_PROGRESS_RESOLUTION;
use crate::error::Error;
use crate::table::Relation;
use crate::table::Table;
use crate::table::merge_left;

impl BubbleClient {
    /// Starts a full-collection retrieval that assembles the result into a
    /// [`Table`], optionally resolving foreign-key relations.
    ///
    /// Each relation triggers a full retrieval of its target collection;
    /// there is no caching across relations, so repeated targets are
    /// fetched repeatedly.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let table = client
    ///     .fetch_all_as_table("fooType")
    ///     .relation(Relation::new("fooBar", "barType"))
    ///     .run()
    ///     .await?;
    /// ```
    pub fn fetch_all_as_table(&self, type_name: impl Into<String>) -> TableRequest<'_> {
        TableRequest {
            client: self,
            type_name: type_name.into(),
            relations: Vec::new(),
            constraints: Vec::new(),
            progress: None,
            resolution: DEFAULT_PROGRESS_RESOLUTION,
            cancel: None,
        }
    }
}

/// A full-collection retrieval request producing a joined [`Table`].
pub struct TableRequest<'a> {
    client: &'a BubbleClient,
    type_name: String,
    relations: Vec<Relation>,
    constraints: Vec<Constraint>,
    progress: Option<Arc<dyn ProgressSink>>,
    resolution: f64,
    cancel: Option<CancellationToken>,
}

impl TableRequest<'_> {
    /// Adds a foreign-key relation to resolve after retrieval.
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Adds several relations.
    pub fn relations(mut self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.relations.extend(relations);
        self
    }

    /// Adds a search constraint on the source collection.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds several search constraints on the source collection.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Sets a progress sink for the source collection retrieval.
    pub fn on_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Sets the minimum progress advance between callbacks (default 0.1).
    pub fn progress_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets a cancellation token, propagated to relation retrievals.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Retrieves the collection and resolves all declared relations.
    pub async fn run(self) -> Result<Table, Error> {
        let mut request = self
            .client
            .fetch_all(self.type_name.as_str())
            .constraints(self.constraints.iter().cloned())
            .progress_resolution(self.resolution);
        if let Some(sink) = &self.progress {
            request = request.on_progress(SharedSink(sink.clone()));
        }
        if let Some(cancel) = &self.cancel {
            request = request.cancel_token(cancel.clone());
        }

        let records = request.run().await?;
        let mut table = Table::from_records(&records);

        for relation in &self.relations {
            table = self.resolve(table, relation).await?;
        }

        Ok(table)
    }

    /// Resolves one relation against `source`.
    ///
    /// A missing source column skips the relation (and its target fetch)
    /// with a warning; remaining relations still resolve. Transport errors
    /// while fetching the target collection are fatal.
    async fn resolve(&self, source: Table, relation: &Relation) -> Result<Table, Error> {
        if source.column_index(relation.field()).is_none() {
            warn!(
                field = relation.field(),
                type_name = relation.type_name(),
                "Join skipped: field not present in source table"
            );
            return Ok(source);
        }

        let mut request = self
            .client
            .fetch_all_as_table(relation.type_name())
            .relations(relation.nested().iter().cloned());
        if let Some(cancel) = &self.cancel {
            request = request.cancel_token(cancel.clone());
        }

        // Boxed: resolving a relation recurses back into run().
        let target = Box::pin(request.run()).await?;

        Ok(merge_left(source, &target, relation.field()))
    }
}

/// Forwards progress to a shared sink. Lets one caller-supplied sink back
/// both the table request and the inner collection retrieval.
struct SharedSink(Arc<dyn ProgressSink>);

#[async_trait::async_trait]
impl ProgressSink for SharedSink {
    async fn progress(&self, fraction: f64) {
        self.0.progress(fraction).await
    }
}
