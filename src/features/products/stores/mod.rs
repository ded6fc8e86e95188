mod memory_product_catalog;
mod pg_product_catalog;
mod product_catalog;

pub use memory_product_catalog::InMemoryProductCatalog;
pub use pg_product_catalog::PgProductCatalog;
pub use product_catalog::ProductCatalog;
