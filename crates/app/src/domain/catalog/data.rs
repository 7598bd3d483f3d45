//! Catalog Data

use grocer::{
    pricing::{PricingError, percent_from_points},
    varieties::VarietyDiscount,
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    domain::catalog::records::{CategoryUuid, ProductUuid, VarietyUuid},
    money::to_money,
};

/// Variety discount as stored: minor units or percent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VarietyDiscountData {
    Fixed { amount: u64 },
    Percentage { percent: Decimal },
}

impl VarietyDiscountData {
    pub fn type_as_str(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Percentage { .. } => "percentage",
        }
    }

    /// Engine discount in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] for an out of range amount or a negative percentage.
    pub fn to_discount(
        &self,
        currency: &'static Currency,
    ) -> Result<VarietyDiscount<'static>, PricingError> {
        Ok(match self {
            Self::Fixed { amount } => VarietyDiscount::Fixed(to_money(*amount, currency)?),
            Self::Percentage { percent } => {
                VarietyDiscount::Percentage(percent_from_points(*percent)?)
            }
        })
    }
}

/// New Category Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub uuid: CategoryUuid,
    pub name: String,
    pub code: String,
    pub image_url: Option<String>,
}

/// New Variety Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariety {
    pub uuid: VarietyUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub discount: Option<VarietyDiscountData>,
}

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub category_uuid: CategoryUuid,
    pub name: String,
    pub is_offer: bool,
    pub varieties: Vec<NewVariety>,
}
