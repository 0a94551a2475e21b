// Price Adjustment Rule
//
// Immutable description of one bulk adjustment: what to add, which products
// it targets, which price fields change and how the result is rounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::catalog::{ProductKind, TermId};
use crate::pricing::{
    error::{PricingError, PricingResult},
    types::{AdjustmentKind, RoundingKind, ScopeKind, TargetPriceKind},
};

/// Lowest accepted percentage adjustment
pub const MIN_PERCENTAGE: Decimal = Decimal::from_parts(100, 0, 0, true, 0);

/// Highest accepted percentage adjustment
pub const MAX_PERCENTAGE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Products a rule applies to
///
/// Taxonomy scopes use OR semantics. A price-range bound of zero means the
/// range is open on that side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    #[default]
    All,
    Categories {
        ids: Vec<TermId>,
    },
    Tags {
        ids: Vec<TermId>,
    },
    ProductTypes {
        kinds: Vec<ProductKind>,
    },
    PriceRange {
        #[serde(default)]
        min: Decimal,
        #[serde(default)]
        max: Decimal,
    },
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::All => ScopeKind::All,
            Scope::Categories { .. } => ScopeKind::Categories,
            Scope::Tags { .. } => ScopeKind::Tags,
            Scope::ProductTypes { .. } => ScopeKind::ProductTypes,
            Scope::PriceRange { .. } => ScopeKind::PriceRange,
        }
    }

    fn validate(&self) -> PricingResult<()> {
        match self {
            Scope::All => Ok(()),
            Scope::Categories { ids } if ids.is_empty() => Err(PricingError::InvalidRule(
                "Please select at least one category.".to_string(),
            )),
            Scope::Tags { ids } if ids.is_empty() => Err(PricingError::InvalidRule(
                "Please select at least one tag.".to_string(),
            )),
            Scope::ProductTypes { kinds } if kinds.is_empty() => Err(PricingError::InvalidRule(
                "Please select at least one product type.".to_string(),
            )),
            Scope::PriceRange { min, max } => {
                if *min < Decimal::ZERO || *max < Decimal::ZERO {
                    return Err(PricingError::InvalidRule(
                        "Price range bounds cannot be negative.".to_string(),
                    ));
                }
                if min.is_zero() && max.is_zero() {
                    return Err(PricingError::InvalidRule(
                        "Please enter a minimum or maximum price.".to_string(),
                    ));
                }
                if !min.is_zero() && !max.is_zero() && min >= max {
                    return Err(PricingError::InvalidRule(
                        "Minimum price must be less than maximum price.".to_string(),
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// A bulk price adjustment rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub adjustment_kind: AdjustmentKind,
    pub adjustment_value: Decimal,
    #[serde(default)]
    pub target_price_kind: TargetPriceKind,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub apply_rounding: bool,
    #[serde(default)]
    pub rounding_kind: RoundingKind,
    /// Fractional ending for `custom` rounding, expected in `[0, 1)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ending: Option<Decimal>,
}

impl Rule {
    /// Percentage rule targeting every product, no rounding
    pub fn percentage(value: Decimal) -> Self {
        Self::new(AdjustmentKind::Percentage, value)
    }

    /// Fixed-amount rule targeting every product, no rounding
    pub fn fixed(value: Decimal) -> Self {
        Self::new(AdjustmentKind::Fixed, value)
    }

    fn new(adjustment_kind: AdjustmentKind, adjustment_value: Decimal) -> Self {
        Self {
            adjustment_kind,
            adjustment_value,
            target_price_kind: TargetPriceKind::default(),
            scope: Scope::All,
            apply_rounding: false,
            rounding_kind: RoundingKind::default(),
            custom_ending: None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_target(mut self, target: TargetPriceKind) -> Self {
        self.target_price_kind = target;
        self
    }

    /// Enable rounding with the given kind
    pub fn with_rounding(mut self, kind: RoundingKind) -> Self {
        self.apply_rounding = true;
        self.rounding_kind = kind;
        self
    }

    /// Enable custom rounding with the given ending
    pub fn with_custom_ending(mut self, ending: Decimal) -> Self {
        self.apply_rounding = true;
        self.rounding_kind = RoundingKind::Custom;
        self.custom_ending = Some(ending);
        self
    }

    /// Check the rule invariants
    ///
    /// Runs before any catalog access so a rejected rule has no side effects.
    pub fn validate(&self) -> PricingResult<()> {
        if self.adjustment_value.is_zero() {
            return Err(PricingError::InvalidRule(
                "Rule value cannot be zero.".to_string(),
            ));
        }

        if self.adjustment_kind == AdjustmentKind::Percentage
            && (self.adjustment_value < MIN_PERCENTAGE || self.adjustment_value > MAX_PERCENTAGE)
        {
            return Err(PricingError::InvalidRule(
                "Percentage must be between -100% and 1000%.".to_string(),
            ));
        }

        self.scope.validate()
    }

    /// Human-readable summary used in activity log entries
    pub fn describe(&self) -> String {
        let value = self.adjustment_value.normalize();
        let sign = if value > Decimal::ZERO { "+" } else { "" };
        let mut description = match self.adjustment_kind {
            AdjustmentKind::Percentage => format!("{}{}% price adjustment", sign, value),
            AdjustmentKind::Fixed => format!("{}{:.2} price adjustment", sign, value),
        };

        match &self.scope {
            Scope::All => description.push_str(" to all products"),
            Scope::Categories { ids } => {
                let _ = write!(description, " to {} selected categories", ids.len());
            }
            Scope::Tags { ids } => {
                let _ = write!(description, " to {} selected tags", ids.len());
            }
            Scope::ProductTypes { kinds } => {
                let names: Vec<String> = kinds.iter().map(|kind| kind.to_string()).collect();
                let _ = write!(description, " to {} products", names.join(", "));
            }
            Scope::PriceRange { min, max } => {
                if !min.is_zero() && !max.is_zero() {
                    let _ = write!(description, " to products priced between {:.2} and {:.2}", min, max);
                } else if !min.is_zero() {
                    let _ = write!(description, " to products priced above {:.2}", min);
                } else if !max.is_zero() {
                    let _ = write!(description, " to products priced below {:.2}", max);
                }
            }
        }

        if self.apply_rounding {
            let _ = write!(description, " with {} rounding", self.rounding_kind);
        }

        description
    }
}

fn default_rule_type() -> String {
    "percentage".to_string()
}

fn default_target_scope() -> String {
    "all".to_string()
}

/// Flat rule form as posted by the admin screen
///
/// Every field is optional on the wire; `into_rule` applies defaults and
/// turns unknown values into `InvalidRule`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleRequest {
    #[serde(default = "default_rule_type")]
    pub rule_type: String,
    pub rule_value: Option<Decimal>,
    #[serde(default = "default_target_scope")]
    pub target_scope: String,
    #[serde(default)]
    pub categories: Vec<TermId>,
    #[serde(default)]
    pub tags: Vec<TermId>,
    #[serde(default)]
    pub product_types: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    #[serde(default)]
    pub apply_rounding: bool,
    pub rounding_type: Option<String>,
    pub custom_ending: Option<Decimal>,
    pub target_price: Option<String>,
}

impl RuleRequest {
    /// Convert the form into a rule
    ///
    /// `default_rounding` is used when the form leaves the rounding type out.
    pub fn into_rule(self, default_rounding: RoundingKind) -> PricingResult<Rule> {
        let adjustment_kind =
            AdjustmentKind::from_str(&self.rule_type).map_err(PricingError::InvalidRule)?;

        let adjustment_value = self
            .rule_value
            .ok_or_else(|| PricingError::InvalidRule("Rule value is required.".to_string()))?;

        let scope = match self.target_scope.as_str() {
            "all" => Scope::All,
            "categories" => Scope::Categories { ids: self.categories },
            "tags" => Scope::Tags { ids: self.tags },
            "product_types" => {
                let kinds = self
                    .product_types
                    .iter()
                    .map(|kind| ProductKind::from_str(kind))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(PricingError::InvalidRule)?;
                Scope::ProductTypes { kinds }
            }
            "price_range" => Scope::PriceRange {
                min: self.price_min.unwrap_or_default(),
                max: self.price_max.unwrap_or_default(),
            },
            other => {
                return Err(PricingError::InvalidRule(format!(
                    "Invalid target scope: {}",
                    other
                )))
            }
        };

        let rounding_kind = match self.rounding_type.as_deref() {
            Some(value) => RoundingKind::from_str(value).map_err(PricingError::InvalidRule)?,
            None => default_rounding,
        };

        let target_price_kind = match self.target_price.as_deref() {
            Some(value) => TargetPriceKind::from_str(value).map_err(PricingError::InvalidRule)?,
            None => TargetPriceKind::default(),
        };

        Ok(Rule {
            adjustment_kind,
            adjustment_value,
            target_price_kind,
            scope,
            apply_rounding: self.apply_rounding,
            rounding_kind,
            custom_ending: self.custom_ending,
        })
    }
}
