//! Coupon Wire Models

use grocer::{cart::CartLine, coupons::CouponScope};
use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use grocer_app::domain::coupons::{
    data::{CouponDiscountData, CouponUpdate, NewCoupon},
    records::{CouponRecord, CouponUuid, CouponValidation},
};

use crate::extensions::*;

/// Shown when a valid coupon covers nothing in the cart.
pub(crate) const NOT_APPLICABLE_MESSAGE: &str = "Coupon not applicable to items in your cart";

/// Coupon discount: percent points or minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum CouponDiscountBody {
    Percentage {
        #[serde(with = "rust_decimal::serde::float")]
        #[salvo(schema(value_type = f64))]
        percent: Decimal,
    },
    Fixed {
        amount: u64,
    },
}

impl From<CouponDiscountData> for CouponDiscountBody {
    fn from(discount: CouponDiscountData) -> Self {
        match discount {
            CouponDiscountData::Percentage { percent } => Self::Percentage { percent },
            CouponDiscountData::Fixed { amount } => Self::Fixed { amount },
        }
    }
}

impl From<CouponDiscountBody> for CouponDiscountData {
    fn from(discount: CouponDiscountBody) -> Self {
        match discount {
            CouponDiscountBody::Percentage { percent } => Self::Percentage { percent },
            CouponDiscountBody::Fixed { amount } => Self::Fixed { amount },
        }
    }
}

/// Products a coupon covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "applyTo", rename_all = "snake_case")]
pub(crate) enum CouponScopeBody {
    All,
    Category {
        #[serde(rename = "categoryUuid")]
        category_uuid: Uuid,
    },
    Product {
        #[serde(rename = "productUuid")]
        product_uuid: Uuid,
    },
}

impl From<CouponScope> for CouponScopeBody {
    fn from(scope: CouponScope) -> Self {
        match scope {
            CouponScope::All => Self::All,
            CouponScope::Category(category) => Self::Category {
                category_uuid: category.into(),
            },
            CouponScope::Product(product) => Self::Product {
                product_uuid: product.into(),
            },
        }
    }
}

impl From<CouponScopeBody> for CouponScope {
    fn from(scope: CouponScopeBody) -> Self {
        match scope {
            CouponScopeBody::All => Self::All,
            CouponScopeBody::Category { category_uuid } => Self::Category(category_uuid.into()),
            CouponScopeBody::Product { product_uuid } => Self::Product(product_uuid.into()),
        }
    }
}

/// Parse an RFC 3339 timestamp from the wire.
pub(crate) fn parse_expiry(value: &str) -> Result<Timestamp, StatusError> {
    value.trim().parse::<Timestamp>().or_400("Invalid expiresAt")
}

/// Distinguish an explicit `null` from an absent field.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CouponResponse {
    pub uuid: Uuid,
    pub code: String,
    pub discount: CouponDiscountBody,
    pub scope: CouponScopeBody,
    pub is_active: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        CouponResponse {
            uuid: coupon.uuid.into(),
            code: coupon.code,
            discount: coupon.discount.into(),
            scope: coupon.scope.into(),
            is_active: coupon.is_active,
            expires_at: coupon.expires_at.as_ref().map(ToString::to_string),
            created_at: coupon.created_at.to_string(),
            updated_at: coupon.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CouponsResponse {
    pub coupons: Vec<CouponResponse>,
}

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCouponRequest {
    pub uuid: Option<Uuid>,

    /// Matched case-insensitively, stored uppercase
    pub code: String,

    pub discount: CouponDiscountBody,
    pub scope: CouponScopeBody,

    #[serde(default = "active_by_default")]
    pub is_active: bool,

    /// RFC 3339 expiry
    pub expires_at: Option<String>,
}

fn active_by_default() -> bool {
    true
}

impl CreateCouponRequest {
    pub(crate) fn into_new_coupon(self) -> Result<NewCoupon, StatusError> {
        Ok(NewCoupon {
            uuid: self.uuid.map_or_else(CouponUuid::new, Into::into),
            code: self.code,
            discount: self.discount.into(),
            scope: self.scope.into(),
            is_active: self.is_active,
            expires_at: self.expires_at.as_deref().map(parse_expiry).transpose()?,
        })
    }
}

/// Update Coupon Request. Omitted fields are left as they are; `expiresAt: null` clears it.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdateCouponRequest {
    pub code: Option<String>,
    pub discount: Option<CouponDiscountBody>,
    pub scope: Option<CouponScopeBody>,
    pub is_active: Option<bool>,

    #[serde(deserialize_with = "explicit_null")]
    #[salvo(schema(value_type = Option<String>))]
    pub expires_at: Option<Option<String>>,
}

impl UpdateCouponRequest {
    pub(crate) fn into_update(self) -> Result<CouponUpdate, StatusError> {
        let expires_at = match self.expires_at {
            None => None,
            Some(None) => Some(None),
            Some(Some(value)) => Some(Some(parse_expiry(&value)?)),
        };

        Ok(CouponUpdate {
            code: self.code,
            discount: self.discount.map(Into::into),
            scope: self.scope.map(Into::into),
            is_active: self.is_active,
            expires_at,
        })
    }
}

/// A cart line as product/category pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineBody {
    pub product_uuid: Uuid,
    pub category_uuid: Uuid,
}

impl From<CartLineBody> for CartLine {
    fn from(line: CartLineBody) -> Self {
        CartLine {
            product: line.product_uuid.into(),
            category: line.category_uuid.into(),
        }
    }
}

/// Validate Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateCouponRequest {
    #[serde(default)]
    pub code: Option<String>,

    /// One entry per cart line
    #[serde(default)]
    pub items: Vec<CartLineBody>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidatedCoupon {
    pub uuid: Uuid,
    pub code: String,

    /// `percentage` or `fixed`
    #[serde(rename = "type")]
    pub kind: String,

    /// Percent points or minor units, depending on `type`
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub value: Decimal,

    /// `all`, `category` or `product`
    pub apply_to: String,

    pub applies_to_text: String,

    #[salvo(schema(value_type = Vec<Uuid>))]
    pub applicable_product_uuids: SmallVec<[Uuid; 4]>,
    pub is_applicable: bool,
}

/// Validate Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateCouponResponse {
    pub valid: bool,
    pub coupon: ValidatedCoupon,

    /// Present when the coupon covers nothing in the cart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<CouponValidation> for ValidateCouponResponse {
    fn from(validation: CouponValidation) -> Self {
        let CouponValidation {
            coupon,
            applicability,
        } = validation;

        let value = match coupon.discount {
            CouponDiscountData::Percentage { percent } => percent,
            CouponDiscountData::Fixed { amount } => Decimal::from(amount),
        };

        let message = (!applicability.is_applicable).then(|| NOT_APPLICABLE_MESSAGE.to_string());

        ValidateCouponResponse {
            valid: true,
            coupon: ValidatedCoupon {
                uuid: coupon.uuid.into(),
                code: coupon.code,
                kind: coupon.discount.type_as_str().to_string(),
                value,
                apply_to: coupon.scope.as_str().to_string(),
                applies_to_text: applicability.applies_to_text,
                applicable_product_uuids: applicability
                    .applicable_products
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                is_applicable: applicability.is_applicable,
            },
            message,
        }
    }
}
