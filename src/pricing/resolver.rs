// Target-Price-Kind Resolver
//
// Decides which price fields a rule rewrites for one candidate and builds
// the resulting PriceChange.

use rust_decimal::Decimal;

use crate::pricing::{
    calculator::PriceCalculator,
    error::PricingResult,
    models::{Candidate, PriceChange},
    rule::Rule,
    types::{ChangeDirection, TargetPriceKind, TouchedFields},
};

/// Compute the change a rule makes to one candidate
///
/// Returns `Ok(None)` only for `sale_only` rules on candidates without a sale,
/// and `InvalidRule` when the adjusted price overflows.
///
/// * smart: sale if active (capped at the regular price), else regular
/// * regular_only: regular; a sale that is no longer below it is cleared
/// * sale_only: sale, capped at the regular price
/// * both: regular, then sale capped at the NEW regular price
pub fn resolve(candidate: &Candidate, rule: &Rule) -> PricingResult<Option<PriceChange>> {
    let calc = |price: Decimal| PriceCalculator::calculate(price, rule);

    let change = match rule.target_price_kind {
        TargetPriceKind::Smart => match candidate.sale {
            Some(sale) => sale_change(candidate, calc(sale)?.min(candidate.regular)),
            None => regular_change(candidate, calc(candidate.regular)?),
        },
        TargetPriceKind::RegularOnly => regular_change(candidate, calc(candidate.regular)?),
        TargetPriceKind::SaleOnly => {
            let Some(sale) = candidate.sale else {
                return Ok(None);
            };
            sale_change(candidate, calc(sale)?.min(candidate.regular))
        }
        TargetPriceKind::Both => {
            let new_regular = calc(candidate.regular)?;
            match candidate.sale {
                // capped at the new regular price; this can compress the discount
                Some(sale) => both_change(candidate, new_regular, calc(sale)?.min(new_regular)),
                None => regular_change(candidate, new_regular),
            }
        }
    };
    Ok(Some(change))
}

fn regular_change(candidate: &Candidate, new_regular: Decimal) -> PriceChange {
    let sale_cleared = matches!(candidate.sale, Some(sale) if sale >= new_regular);
    let new_sale = if sale_cleared { None } else { candidate.sale };
    let delta = new_regular - candidate.regular;

    let mut label = format!("Regular price {} -> {}", candidate.regular, new_regular);
    if sale_cleared {
        label.push_str(" (sale removed)");
    }

    PriceChange {
        id: candidate.id,
        parent_id: candidate.parent_id,
        name: candidate.name.clone(),
        touched: TouchedFields::Regular,
        old_regular: candidate.regular,
        new_regular,
        old_sale: candidate.sale,
        new_sale,
        sale_cleared,
        delta,
        direction: ChangeDirection::from_delta(delta),
        label,
    }
}

fn sale_change(candidate: &Candidate, new_sale: Decimal) -> PriceChange {
    let old_sale = candidate.sale.unwrap_or_default();
    let delta = new_sale - old_sale;

    PriceChange {
        id: candidate.id,
        parent_id: candidate.parent_id,
        name: candidate.name.clone(),
        touched: TouchedFields::Sale,
        old_regular: candidate.regular,
        new_regular: candidate.regular,
        old_sale: candidate.sale,
        new_sale: Some(new_sale),
        sale_cleared: false,
        delta,
        direction: ChangeDirection::from_delta(delta),
        label: format!("Sale price {} -> {}", old_sale, new_sale),
    }
}

fn both_change(candidate: &Candidate, new_regular: Decimal, new_sale: Decimal) -> PriceChange {
    let old_sale = candidate.sale.unwrap_or_default();
    let delta = new_regular - candidate.regular;

    PriceChange {
        id: candidate.id,
        parent_id: candidate.parent_id,
        name: candidate.name.clone(),
        touched: TouchedFields::Both,
        old_regular: candidate.regular,
        new_regular,
        old_sale: candidate.sale,
        new_sale: Some(new_sale),
        sale_cleared: false,
        delta,
        direction: ChangeDirection::from_delta(delta),
        label: format!(
            "Regular price {} -> {}, sale price {} -> {}",
            candidate.regular, new_regular, old_sale, new_sale
        ),
    }
}
