// Scope Matcher
//
// Two-phase candidate selection: a structural catalog query first, then
// variation expansion and price-range filtering in memory.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::catalog::{Catalog, Product, ProductKind, ProductQuery};
use crate::pricing::{error::PricingResult, models::Candidate, rule::Scope};

/// Selects the candidates a rule scope applies to
pub struct ScopeMatcher {
    catalog: Arc<dyn Catalog>,
}

impl ScopeMatcher {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Select every eligible candidate for a scope
    ///
    /// Order is product id ascending; variations follow catalog order within
    /// their parent.
    pub async fn select_candidates(&self, scope: &Scope) -> PricingResult<Vec<Candidate>> {
        let Some(query) = Self::structural_query(scope) else {
            tracing::debug!("Scope {} requests no adjustable product kinds", scope.kind());
            return Ok(Vec::new());
        };

        let products = self.catalog.find_products(&query).await?;
        tracing::debug!("Structural query matched {} products", products.len());

        let mut candidates = Vec::with_capacity(products.len());
        for product in &products {
            self.expand(product, &mut candidates).await?;
        }

        if let Scope::PriceRange { min, max } = scope {
            candidates.retain(|candidate| in_price_range(candidate.regular, *min, *max));
        }

        tracing::debug!("Scope {} selected {} candidates", scope.kind(), candidates.len());
        Ok(candidates)
    }

    /// Catalog query for the structural part of a scope
    ///
    /// `None` when the requested product types share nothing with the
    /// adjustable kinds.
    pub fn structural_query(scope: &Scope) -> Option<ProductQuery> {
        let mut query = ProductQuery::default();
        match scope {
            Scope::All | Scope::PriceRange { .. } => {}
            Scope::Categories { ids } => query.category_ids = ids.clone(),
            Scope::Tags { ids } => query.tag_ids = ids.clone(),
            Scope::ProductTypes { kinds } => {
                query.kinds = ProductKind::ADJUSTABLE
                    .into_iter()
                    .filter(|kind| kinds.contains(kind))
                    .collect();
                if query.kinds.is_empty() {
                    return None;
                }
            }
        }
        Some(query)
    }

    async fn expand(&self, product: &Product, out: &mut Vec<Candidate>) -> PricingResult<()> {
        match product.kind {
            ProductKind::Simple => {
                if let Some(candidate) = Candidate::from_simple(product) {
                    out.push(candidate);
                }
            }
            ProductKind::Variable => {
                let variations = self.catalog.variations(product.id).await?;
                out.extend(
                    variations
                        .iter()
                        .filter(|variation| variation.is_published())
                        .filter_map(|variation| Candidate::from_variation(product, variation)),
                );
            }
            _ => {}
        }
        Ok(())
    }
}

/// Inclusive range check; a zero bound is open on that side
fn in_price_range(price: Decimal, min: Decimal, max: Decimal) -> bool {
    if min > Decimal::ZERO && price < min {
        return false;
    }
    if max > Decimal::ZERO && price > max {
        return false;
    }
    true
}
