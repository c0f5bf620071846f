//! Data API read operations

mod constraint;
mod list;
mod page;
mod pages;
mod progress;
mod tables;

pub use constraint::*;
pub use list::*;
pub use page::*;
pub use pages::*;
pub use progress::*;
pub use tables::*;
