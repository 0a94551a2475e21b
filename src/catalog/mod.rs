// Catalog Module
//
// Read/write access to the shop's products and taxonomies. The pricing engine only
// talks to the `Catalog` trait; the host store is either the in-memory catalog
// (tests, demo mode) or PostgreSQL.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryCatalog;
pub use models::{
    PriceFields, Product, ProductId, ProductKind, ProductQuery, ProductStatus, Taxonomy, Term,
    TermId,
};
pub use postgres::PgCatalog;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by catalog backends
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Product referenced by id does not exist
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Writing prices for a single product failed
    #[error("Failed to save prices for product {product_id}: {reason}")]
    WriteFailed { product_id: ProductId, reason: String },

    /// Stored row could not be mapped to a domain type
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
}

/// Catalog collaborator consumed by the pricing engine
///
/// `find_products` is a structural query only; price-range filtering and
/// variation expansion happen in the scope matcher.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Top-level products matching the query, ordered by id ascending
    async fn find_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError>;

    /// Variations of a variable product in catalog order
    async fn variations(&self, parent_id: ProductId) -> Result<Vec<Product>, CatalogError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;

    /// Overwrite both price fields of a product and persist them
    async fn save_price_fields(&self, id: ProductId, fields: &PriceFields)
        -> Result<(), CatalogError>;

    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, CatalogError>;

    /// Published adjustable products whose name or SKU contains `term`
    async fn search_products(&self, term: &str, limit: usize) -> Result<Vec<Product>, CatalogError>;
}
