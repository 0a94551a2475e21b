// Catalog domain types shared by every catalog backend

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identifier as stored by the host catalog
pub type ProductId = i64;

/// Taxonomy term identifier (category or tag)
pub type TermId = i64;

/// Kind of catalog product
///
/// Only simple and variable products carry prices the engine can rewrite.
/// Variations are children of a variable product and hold the real prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Variable,
    Variation,
    Grouped,
    External,
}

impl ProductKind {
    /// Product kinds whose prices can be adjusted
    pub const ADJUSTABLE: [ProductKind; 2] = [ProductKind::Simple, ProductKind::Variable];

    pub fn is_adjustable(&self) -> bool {
        Self::ADJUSTABLE.contains(self)
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Simple => write!(f, "simple"),
            ProductKind::Variable => write!(f, "variable"),
            ProductKind::Variation => write!(f, "variation"),
            ProductKind::Grouped => write!(f, "grouped"),
            ProductKind::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for ProductKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(ProductKind::Simple),
            "variable" => Ok(ProductKind::Variable),
            "variation" => Ok(ProductKind::Variation),
            "grouped" => Ok(ProductKind::Grouped),
            "external" => Ok(ProductKind::External),
            _ => Err(format!("Invalid product kind: {}", s)),
        }
    }
}

/// Publication status of a product or variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Publish,
    Draft,
    Pending,
    Private,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Publish => write!(f, "publish"),
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Pending => write!(f, "pending"),
            ProductStatus::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(ProductStatus::Publish),
            "draft" => Ok(ProductStatus::Draft),
            "pending" => Ok(ProductStatus::Pending),
            "private" => Ok(ProductStatus::Private),
            _ => Err(format!("Invalid product status: {}", s)),
        }
    }
}

/// Taxonomies a product can be classified under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    #[serde(alias = "product_cat", alias = "categories")]
    Category,
    #[serde(alias = "product_tag", alias = "tags")]
    Tag,
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Taxonomy::Category => write!(f, "product_cat"),
            Taxonomy::Tag => write!(f, "product_tag"),
        }
    }
}

/// A catalog product or variation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub parent_id: Option<ProductId>,
    pub name: String,
    pub sku: String,
    pub kind: ProductKind,
    pub status: ProductStatus,
    pub regular_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub category_ids: Vec<TermId>,
    pub tag_ids: Vec<TermId>,
}

impl Product {
    /// Current price fields of this product
    pub fn price_fields(&self) -> PriceFields {
        PriceFields {
            regular: self.regular_price,
            sale: self.sale_price,
        }
    }

    /// Regular price if it is set and positive
    pub fn positive_regular_price(&self) -> Option<Decimal> {
        self.regular_price.filter(|price| *price > Decimal::ZERO)
    }

    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Publish
    }
}

/// Regular and sale price of one product; `None` means the field is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFields {
    pub regular: Option<Decimal>,
    pub sale: Option<Decimal>,
}

/// Taxonomy term (category or tag)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: Taxonomy,
    pub name: String,
    pub slug: String,
    pub count: i64,
}

/// Structural product query
///
/// Only top-level products are returned. Empty term lists mean "no
/// taxonomy filter"; a non-empty list matches products carrying ANY of the ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub status: ProductStatus,
    pub kinds: Vec<ProductKind>,
    pub category_ids: Vec<TermId>,
    pub tag_ids: Vec<TermId>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            status: ProductStatus::Publish,
            kinds: ProductKind::ADJUSTABLE.to_vec(),
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
        }
    }
}

impl ProductQuery {
    /// Whether a product satisfies this query
    pub fn matches(&self, product: &Product) -> bool {
        if product.parent_id.is_some() || product.status != self.status {
            return false;
        }
        if !self.kinds.contains(&product.kind) {
            return false;
        }
        if !self.category_ids.is_empty()
            && !product.category_ids.iter().any(|id| self.category_ids.contains(id))
        {
            return false;
        }
        if !self.tag_ids.is_empty() && !product.tag_ids.iter().any(|id| self.tag_ids.contains(id)) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn product(kind: ProductKind) -> Product {
        Product {
            id: 1,
            parent_id: None,
            name: "Mug".to_string(),
            sku: "MUG-1".to_string(),
            kind,
            status: ProductStatus::Publish,
            regular_price: Some(dec!(12.00)),
            sale_price: None,
            category_ids: vec![10, 11],
            tag_ids: vec![],
        }
    }

    #[test]
    fn test_product_kind_round_trip_through_str() {
        for kind in [
            ProductKind::Simple,
            ProductKind::Variable,
            ProductKind::Variation,
            ProductKind::Grouped,
            ProductKind::External,
        ] {
            assert_eq!(ProductKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(ProductKind::from_str("bundle").is_err());
    }

    #[test]
    fn test_only_simple_and_variable_are_adjustable() {
        assert!(ProductKind::Simple.is_adjustable());
        assert!(ProductKind::Variable.is_adjustable());
        assert!(!ProductKind::Grouped.is_adjustable());
        assert!(!ProductKind::External.is_adjustable());
        assert!(!ProductKind::Variation.is_adjustable());
    }

    #[test]
    fn test_taxonomy_accepts_host_aliases() {
        let category: Taxonomy = serde_json::from_str("\"product_cat\"").unwrap();
        assert_eq!(category, Taxonomy::Category);
        let tag: Taxonomy = serde_json::from_str("\"tags\"").unwrap();
        assert_eq!(tag, Taxonomy::Tag);
    }

    #[test]
    fn test_query_matches_any_category() {
        let query = ProductQuery {
            category_ids: vec![11, 99],
            ..ProductQuery::default()
        };
        assert!(query.matches(&product(ProductKind::Simple)));

        let query = ProductQuery {
            category_ids: vec![99],
            ..ProductQuery::default()
        };
        assert!(!query.matches(&product(ProductKind::Simple)));
    }

    #[test]
    fn test_query_excludes_disallowed_kinds_and_children() {
        let query = ProductQuery::default();
        assert!(!query.matches(&product(ProductKind::External)));

        let mut child = product(ProductKind::Simple);
        child.parent_id = Some(5);
        assert!(!query.matches(&child));
    }

    #[test]
    fn test_positive_regular_price() {
        let mut p = product(ProductKind::Simple);
        assert_eq!(p.positive_regular_price(), Some(dec!(12.00)));
        p.regular_price = Some(Decimal::ZERO);
        assert_eq!(p.positive_regular_price(), None);
        p.regular_price = None;
        assert_eq!(p.positive_regular_price(), None);
    }
}
