// Catalog statistics shown on the dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product, ProductKind, ProductQuery};
use crate::pricing::error::PricingResult;

/// Count of priced products per price band
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBuckets {
    pub under_10: usize,
    #[serde(rename = "10_to_50")]
    pub from_10_to_50: usize,
    #[serde(rename = "50_to_100")]
    pub from_50_to_100: usize,
    pub over_100: usize,
}

impl PriceBuckets {
    fn record(&mut self, price: Decimal) {
        if price < Decimal::TEN {
            self.under_10 += 1;
        } else if price < Decimal::from(50) {
            self.from_10_to_50 += 1;
        } else if price < Decimal::ONE_HUNDRED {
            self.from_50_to_100 += 1;
        } else {
            self.over_100 += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_products: usize,
    pub simple_products: usize,
    pub variable_products: usize,
    pub products_with_price: usize,
    /// Mean of the representative prices, rounded to cents
    pub average_price: Decimal,
    pub price_ranges: PriceBuckets,
    /// Unix time of the last logged apply or undo
    pub last_update: Option<i64>,
}

impl CatalogStatistics {
    /// Walk every published adjustable product
    ///
    /// Variable products are represented by their lowest positive variation price.
    pub async fn collect(catalog: &dyn Catalog) -> PricingResult<Self> {
        let products = catalog.find_products(&ProductQuery::default()).await?;
        let mut stats = Self::default();
        let mut total = Decimal::ZERO;

        for product in &products {
            stats.total_products += 1;
            match product.kind {
                ProductKind::Simple => stats.simple_products += 1,
                ProductKind::Variable => stats.variable_products += 1,
                _ => {}
            }

            if let Some(price) = representative_price(catalog, product).await? {
                stats.products_with_price += 1;
                total += price;
                stats.price_ranges.record(price);
            }
        }

        if stats.products_with_price > 0 {
            stats.average_price = (total / Decimal::from(stats.products_with_price)).round_dp(2);
        }
        Ok(stats)
    }
}

async fn representative_price(
    catalog: &dyn Catalog,
    product: &Product,
) -> PricingResult<Option<Decimal>> {
    match product.kind {
        ProductKind::Variable => {
            let variations = catalog.variations(product.id).await?;
            Ok(variations
                .iter()
                .filter(|variation| variation.is_published())
                .filter_map(Product::positive_regular_price)
                .min())
        }
        _ => Ok(product.positive_regular_price()),
    }
}
