// PostgreSQL-backed catalog

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use super::{
    Catalog, CatalogError, PriceFields, Product, ProductId, ProductKind, ProductQuery,
    ProductStatus, Taxonomy, Term, TermId,
};

const PRODUCT_COLUMNS: &str = r#"
    p.id,
    p.parent_id,
    p.name,
    p.sku,
    p.kind,
    p.status,
    p.regular_price,
    p.sale_price,
    ARRAY(
        SELECT pt.term_id FROM product_terms pt
        JOIN terms t ON t.id = pt.term_id
        WHERE pt.product_id = p.id AND t.taxonomy = 'product_cat'
    ) AS category_ids,
    ARRAY(
        SELECT pt.term_id FROM product_terms pt
        JOIN terms t ON t.id = pt.term_id
        WHERE pt.product_id = p.id AND t.taxonomy = 'product_tag'
    ) AS tag_ids
"#;

/// Raw product row; kind and status are stored as text
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    parent_id: Option<i64>,
    name: String,
    sku: String,
    kind: String,
    status: String,
    regular_price: Option<Decimal>,
    sale_price: Option<Decimal>,
    category_ids: Vec<i64>,
    tag_ids: Vec<i64>,
}

impl TryFrom<ProductRow> for Product {
    type Error = CatalogError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            parent_id: row.parent_id,
            name: row.name,
            sku: row.sku,
            kind: ProductKind::from_str(&row.kind).map_err(CatalogError::InvalidData)?,
            status: ProductStatus::from_str(&row.status).map_err(CatalogError::InvalidData)?,
            regular_price: row.regular_price,
            sale_price: row.sale_price,
            category_ids: row.category_ids,
            tag_ids: row.tag_ids,
        })
    }
}

#[derive(Debug, FromRow)]
struct TermRow {
    id: i64,
    name: String,
    slug: String,
    count: i64,
}

/// Catalog stored in the `products`, `terms` and `product_terms` tables
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, CatalogError> {
        rows.into_iter().map(Product::try_from).collect()
    }
}

/// `None` when the list is empty so the SQL filter is skipped
fn term_filter(ids: &[TermId]) -> Option<Vec<i64>> {
    if ids.is_empty() {
        None
    } else {
        Some(ids.to_vec())
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn find_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError> {
        let kinds: Vec<String> = query.kinds.iter().map(|kind| kind.to_string()).collect();
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            WHERE p.parent_id IS NULL
              AND p.status = $1
              AND p.kind = ANY($2)
              AND ($3::BIGINT[] IS NULL OR EXISTS (
                    SELECT 1 FROM product_terms pt
                    WHERE pt.product_id = p.id AND pt.term_id = ANY($3)))
              AND ($4::BIGINT[] IS NULL OR EXISTS (
                    SELECT 1 FROM product_terms pt
                    WHERE pt.product_id = p.id AND pt.term_id = ANY($4)))
            ORDER BY p.id ASC
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(query.status.to_string())
            .bind(kinds)
            .bind(term_filter(&query.category_ids))
            .bind(term_filter(&query.tag_ids))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Catalog query returned {} products", rows.len());
        Self::into_products(rows)
    }

    async fn variations(&self, parent_id: ProductId) -> Result<Vec<Product>, CatalogError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.parent_id = $1 ORDER BY p.menu_order ASC, p.id ASC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Self::into_products(rows)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Product::try_from).transpose()
    }

    async fn save_price_fields(
        &self,
        id: ProductId,
        fields: &PriceFields,
    ) -> Result<(), CatalogError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET regular_price = $1, sale_price = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(fields.regular)
        .bind(fields.sale)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, CatalogError> {
        let rows = sqlx::query_as::<_, TermRow>(
            r#"
            SELECT t.id, t.name, t.slug, COUNT(pt.product_id) AS count
            FROM terms t
            LEFT JOIN product_terms pt ON pt.term_id = t.id
            WHERE t.taxonomy = $1
            GROUP BY t.id, t.name, t.slug
            ORDER BY t.name ASC
            "#,
        )
        .bind(taxonomy.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Term {
                id: row.id,
                taxonomy,
                name: row.name,
                slug: row.slug,
                count: row.count,
            })
            .collect())
    }

    async fn search_products(&self, term: &str, limit: usize) -> Result<Vec<Product>, CatalogError> {
        let kinds: Vec<String> = ProductKind::ADJUSTABLE
            .iter()
            .map(|kind| kind.to_string())
            .collect();
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            WHERE p.parent_id IS NULL
              AND p.status = 'publish'
              AND p.kind = ANY($1)
              AND (p.name ILIKE $2 OR p.sku ILIKE $2)
            ORDER BY p.id ASC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(kinds)
            .bind(format!("%{}%", term))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Self::into_products(rows)
    }
}
