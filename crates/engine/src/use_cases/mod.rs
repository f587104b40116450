//! Use cases - request orchestration over the storage ports.

pub mod catalog;
pub mod layout;

pub use catalog::{CatalogError, CatalogService};
pub use layout::LayoutService;
