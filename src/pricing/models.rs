// Candidate and PriceChange models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{PriceFields, Product, ProductId, ProductKind};
use crate::pricing::types::{ChangeDirection, TouchedFields};

/// A priced, eligible sellable unit
///
/// Either a simple product or one variation of a variable product. Variable
/// parents are never candidates themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ProductId,
    pub parent_id: Option<ProductId>,
    pub name: String,
    /// Kind of the owning product (simple or variable)
    pub kind: ProductKind,
    /// Always positive
    pub regular: Decimal,
    /// `Some` only when positive
    pub sale: Option<Decimal>,
}

impl Candidate {
    /// Build a candidate from a simple product; `None` when it has no positive price
    pub fn from_simple(product: &Product) -> Option<Self> {
        let regular = product.positive_regular_price()?;
        Some(Self {
            id: product.id,
            parent_id: None,
            name: product.name.clone(),
            kind: product.kind,
            regular,
            sale: positive(product.sale_price),
        })
    }

    /// Build a candidate from a variation of `parent`
    pub fn from_variation(parent: &Product, variation: &Product) -> Option<Self> {
        let regular = variation.positive_regular_price()?;
        Some(Self {
            id: variation.id,
            parent_id: Some(parent.id),
            name: format!("{} - {}", parent.name, variation.name),
            kind: parent.kind,
            regular,
            sale: positive(variation.sale_price),
        })
    }

    pub fn has_sale(&self) -> bool {
        self.sale.is_some()
    }

    /// Current price fields, as stored in a backup snapshot
    pub fn price_fields(&self) -> PriceFields {
        PriceFields {
            regular: Some(self.regular),
            sale: self.sale,
        }
    }
}

fn positive(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|price| *price > Decimal::ZERO)
}

/// Result of applying a rule to one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub id: ProductId,
    pub parent_id: Option<ProductId>,
    pub name: String,
    pub touched: TouchedFields,
    pub old_regular: Decimal,
    pub new_regular: Decimal,
    pub old_sale: Option<Decimal>,
    pub new_sale: Option<Decimal>,
    /// Sale price removed because it was no longer below the regular price
    pub sale_cleared: bool,
    /// Signed change of the primary touched field
    pub delta: Decimal,
    pub direction: ChangeDirection,
    pub label: String,
}

impl PriceChange {
    /// Price fields to persist for this change
    pub fn new_fields(&self) -> PriceFields {
        PriceFields {
            regular: Some(self.new_regular),
            sale: self.new_sale,
        }
    }
}
