//! Catalog Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::data::VarietyDiscountData;

pub use grocer::ids::{CategoryUuid, ProductUuid, VarietyUuid};

/// Category Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub uuid: CategoryUuid,
    pub name: String,
    pub code: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Variety Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyRecord {
    pub uuid: VarietyUuid,
    pub product_uuid: ProductUuid,
    pub name: String,

    /// Base price in minor units
    pub price: u64,

    /// Price after the variety discount, in minor units
    pub effective_price: u64,

    pub stock: u32,
    pub discount: Option<VarietyDiscountData>,
    pub position: u32,
}

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub category_uuid: CategoryUuid,
    pub name: String,
    pub is_offer: bool,
    pub varieties: Vec<VarietyRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
