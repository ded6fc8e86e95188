//! Product membership lookups.
//!
//! Product CRUD lives in the catalog service; the hierarchy only needs to
//! know whether a category still has products attached before deleting it.

pub mod stores;

pub use stores::{InMemoryProductCatalog, PgProductCatalog, ProductCatalog};
