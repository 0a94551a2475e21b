// In-memory catalog used by tests and by the server when no database is configured

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use super::{
    Catalog, CatalogError, PriceFields, Product, ProductId, ProductQuery, Taxonomy, Term,
};

/// In-memory catalog
///
/// Products are kept ordered by id. Writes for selected products can be made
/// to fail, which lets callers exercise partial-failure handling.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: RwLock<BTreeMap<ProductId, Product>>,
    terms: RwLock<Vec<Term>>,
    failing_writes: RwLock<HashSet<ProductId>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn insert_term(&self, term: Term) {
        self.terms.write().await.push(term);
    }

    pub async fn remove(&self, id: ProductId) -> Option<Product> {
        self.products.write().await.remove(&id)
    }

    /// Make every future price write for `id` fail
    pub async fn fail_writes_for(&self, id: ProductId) {
        self.failing_writes.write().await.insert(id);
    }

    /// Undo `fail_writes_for`
    pub async fn allow_writes_for(&self, id: ProductId) {
        self.failing_writes.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn find_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect())
    }

    async fn variations(&self, parent_id: ProductId) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|product| product.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn save_price_fields(
        &self,
        id: ProductId,
        fields: &PriceFields,
    ) -> Result<(), CatalogError> {
        if self.failing_writes.read().await.contains(&id) {
            return Err(CatalogError::WriteFailed {
                product_id: id,
                reason: "write rejected by catalog".to_string(),
            });
        }

        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        product.regular_price = fields.regular;
        product.sale_price = fields.sale;
        Ok(())
    }

    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, CatalogError> {
        let products = self.products.read().await;
        let mut terms: Vec<Term> = self
            .terms
            .read()
            .await
            .iter()
            .filter(|term| term.taxonomy == taxonomy)
            .map(|term| {
                let count = products
                    .values()
                    .filter(|product| match taxonomy {
                        Taxonomy::Category => product.category_ids.contains(&term.id),
                        Taxonomy::Tag => product.tag_ids.contains(&term.id),
                    })
                    .count() as i64;
                Term { count, ..term.clone() }
            })
            .collect();
        terms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(terms)
    }

    async fn search_products(&self, term: &str, limit: usize) -> Result<Vec<Product>, CatalogError> {
        let needle = term.to_lowercase();
        let query = ProductQuery::default();
        let products = self.products.read().await;
        Ok(products
            .values()
            .filter(|product| query.matches(product))
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.sku.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProductKind, ProductStatus};
    use rust_decimal_macros::dec;

    fn simple(id: ProductId, name: &str) -> Product {
        Product {
            id,
            parent_id: None,
            name: name.to_string(),
            sku: format!("SKU-{}", id),
            kind: ProductKind::Simple,
            status: ProductStatus::Publish,
            regular_price: Some(dec!(10.00)),
            sale_price: None,
            category_ids: vec![1],
            tag_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_find_products_is_ordered_by_id() {
        let catalog = MemoryCatalog::new();
        catalog.insert(simple(3, "C")).await;
        catalog.insert(simple(1, "A")).await;
        catalog.insert(simple(2, "B")).await;

        let found = catalog.find_products(&ProductQuery::default()).await.unwrap();
        let ids: Vec<ProductId> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failing_write_leaves_product_untouched() {
        let catalog = MemoryCatalog::new();
        catalog.insert(simple(1, "A")).await;
        catalog.fail_writes_for(1).await;

        let result = catalog
            .save_price_fields(1, &PriceFields { regular: Some(dec!(99)), sale: None })
            .await;
        assert!(matches!(result, Err(CatalogError::WriteFailed { product_id: 1, .. })));

        let product = catalog.get_product(1).await.unwrap().unwrap();
        assert_eq!(product.regular_price, Some(dec!(10.00)));
    }

    #[tokio::test]
    async fn test_save_missing_product_is_not_found() {
        let catalog = MemoryCatalog::new();
        let result = catalog.save_price_fields(42, &PriceFields::default()).await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound(42))));
    }

    #[tokio::test]
    async fn test_search_matches_name_or_sku() {
        let catalog = MemoryCatalog::new();
        catalog.insert(simple(1, "Blue Mug")).await;
        catalog.insert(simple(2, "Red Cup")).await;

        let by_name = catalog.search_products("mug", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
        let by_sku = catalog.search_products("sku-2", 10).await.unwrap();
        assert_eq!(by_sku[0].id, 2);
    }

    #[tokio::test]
    async fn test_list_terms_counts_products() {
        let catalog = MemoryCatalog::new();
        catalog.insert(simple(1, "A")).await;
        catalog.insert(simple(2, "B")).await;
        catalog
            .insert_term(Term {
                id: 1,
                taxonomy: Taxonomy::Category,
                name: "Kitchen".to_string(),
                slug: "kitchen".to_string(),
                count: 0,
            })
            .await;

        let terms = catalog.list_terms(Taxonomy::Category).await.unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].count, 2);
        assert!(catalog.list_terms(Taxonomy::Tag).await.unwrap().is_empty());
    }
}
