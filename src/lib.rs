//! Bubble.io Data API client library
//!
//! An async Rust client for the Bubble.io Data API: authenticated reads of
//! cursor-paginated, schema-less record collections, with optional
//! foreign-key joins into a single tabular result.

pub mod api;
pub mod error;
pub mod model;
pub mod table;

mod client;

pub use api::Constraint;
pub use api::Page;
pub use api::ProgressFn;
pub use api::ProgressSink;
pub use client::*;
pub use model::Record;
pub use model::Value;
pub use table::Relation;
pub use table::Table;
