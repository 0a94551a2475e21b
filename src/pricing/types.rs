// Domain type definitions for bulk price adjustment
// Shared enums used by rules, the calculator and the activity log

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the adjustment value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Value is a percentage of the current price (10 = +10%)
    Percentage,

    /// Value is added to the current price (-2.50 = 2.50 off)
    Fixed,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentKind::Percentage => write!(f, "percentage"),
            AdjustmentKind::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for AdjustmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(AdjustmentKind::Percentage),
            "fixed" => Ok(AdjustmentKind::Fixed),
            _ => Err("Invalid rule type.".to_string()),
        }
    }
}

/// Which price field(s) a rule rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPriceKind {
    /// The price the shopper currently sees: sale price if active, else regular
    #[default]
    Smart,

    RegularOnly,

    /// Only candidates with an active sale are touched
    SaleOnly,

    /// Regular price, plus the sale price when one exists
    #[serde(alias = "both_prices")]
    Both,
}

impl fmt::Display for TargetPriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPriceKind::Smart => write!(f, "smart"),
            TargetPriceKind::RegularOnly => write!(f, "regular_only"),
            TargetPriceKind::SaleOnly => write!(f, "sale_only"),
            TargetPriceKind::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for TargetPriceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(TargetPriceKind::Smart),
            "regular_only" => Ok(TargetPriceKind::RegularOnly),
            "sale_only" => Ok(TargetPriceKind::SaleOnly),
            "both" | "both_prices" => Ok(TargetPriceKind::Both),
            _ => Err(format!("Invalid target price: {}", s)),
        }
    }
}

/// Psychological rounding applied after the adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundingKind {
    #[default]
    #[serde(rename = "end_99", alias = "0.99")]
    End99,

    #[serde(rename = "end_95", alias = "0.95")]
    End95,

    #[serde(rename = "end_97", alias = "0.97")]
    End97,

    #[serde(rename = "end_89", alias = "0.89")]
    End89,

    /// Round half away from zero to an integer
    #[serde(rename = "whole", alias = "0.00")]
    Whole,

    /// Use the rule's custom ending
    #[serde(rename = "custom")]
    Custom,
}

impl RoundingKind {
    /// Fractional ending for the fixed-ending kinds
    pub fn ending(&self) -> Option<Decimal> {
        match self {
            RoundingKind::End99 => Some(Decimal::new(99, 2)),
            RoundingKind::End95 => Some(Decimal::new(95, 2)),
            RoundingKind::End97 => Some(Decimal::new(97, 2)),
            RoundingKind::End89 => Some(Decimal::new(89, 2)),
            RoundingKind::Whole | RoundingKind::Custom => None,
        }
    }
}

impl fmt::Display for RoundingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingKind::End99 => write!(f, "end_99"),
            RoundingKind::End95 => write!(f, "end_95"),
            RoundingKind::End97 => write!(f, "end_97"),
            RoundingKind::End89 => write!(f, "end_89"),
            RoundingKind::Whole => write!(f, "whole"),
            RoundingKind::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for RoundingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_99" | "0.99" => Ok(RoundingKind::End99),
            "end_95" | "0.95" => Ok(RoundingKind::End95),
            "end_97" | "0.97" => Ok(RoundingKind::End97),
            "end_89" | "0.89" => Ok(RoundingKind::End89),
            "whole" | "0.00" => Ok(RoundingKind::Whole),
            "custom" => Ok(RoundingKind::Custom),
            _ => Err(format!("Invalid rounding type: {}", s)),
        }
    }
}

/// Scope discriminant as submitted by the admin form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    #[default]
    All,
    Categories,
    Tags,
    ProductTypes,
    PriceRange,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::All => write!(f, "all"),
            ScopeKind::Categories => write!(f, "categories"),
            ScopeKind::Tags => write!(f, "tags"),
            ScopeKind::ProductTypes => write!(f, "product_types"),
            ScopeKind::PriceRange => write!(f, "price_range"),
        }
    }
}

/// Kind of action recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Apply,
    Undo,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Apply => "Applied Rules",
            ActionKind::Undo => "Undone Changes",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Apply => write!(f, "apply"),
            ActionKind::Undo => write!(f, "undo"),
        }
    }
}

/// Price fields rewritten by a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchedFields {
    Regular,
    Sale,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Unchanged,
}

impl ChangeDirection {
    pub fn from_delta(delta: Decimal) -> Self {
        if delta > Decimal::ZERO {
            ChangeDirection::Increase
        } else if delta < Decimal::ZERO {
            ChangeDirection::Decrease
        } else {
            ChangeDirection::Unchanged
        }
    }
}
