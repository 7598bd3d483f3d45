//! Catalog Wire Models

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use grocer_app::domain::catalog::{
    data::{NewCategory, NewProduct, NewVariety, VarietyDiscountData},
    records::{CategoryRecord, CategoryUuid, ProductRecord, ProductUuid, VarietyRecord, VarietyUuid},
};

/// Variety discount: minor units or percent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum VarietyDiscountBody {
    Fixed {
        amount: u64,
    },
    Percentage {
        #[serde(with = "rust_decimal::serde::float")]
        #[salvo(schema(value_type = f64))]
        percent: Decimal,
    },
}

impl From<VarietyDiscountData> for VarietyDiscountBody {
    fn from(discount: VarietyDiscountData) -> Self {
        match discount {
            VarietyDiscountData::Fixed { amount } => Self::Fixed { amount },
            VarietyDiscountData::Percentage { percent } => Self::Percentage { percent },
        }
    }
}

impl From<VarietyDiscountBody> for VarietyDiscountData {
    fn from(discount: VarietyDiscountBody) -> Self {
        match discount {
            VarietyDiscountBody::Fixed { amount } => Self::Fixed { amount },
            VarietyDiscountBody::Percentage { percent } => Self::Percentage { percent },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryResponse {
    pub uuid: Uuid,
    pub name: String,

    /// Unique short code
    pub code: String,

    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryRecord> for CategoryResponse {
    fn from(category: CategoryRecord) -> Self {
        CategoryResponse {
            uuid: category.uuid.into(),
            name: category.name,
            code: category.code,
            image_url: category.image_url,
            created_at: category.created_at.to_string(),
            updated_at: category.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VarietyResponse {
    pub uuid: Uuid,
    pub name: String,

    /// Base price in minor units
    pub price: u64,

    /// Price after the variety discount, in minor units
    pub effective_price: u64,

    pub stock: u32,
    pub discount: Option<VarietyDiscountBody>,
}

impl From<VarietyRecord> for VarietyResponse {
    fn from(variety: VarietyRecord) -> Self {
        VarietyResponse {
            uuid: variety.uuid.into(),
            name: variety.name,
            price: variety.price,
            effective_price: variety.effective_price,
            stock: variety.stock,
            discount: variety.discount.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,
    pub category_uuid: Uuid,
    pub name: String,
    pub is_offer: bool,

    /// Varieties in display order
    pub varieties: Vec<VarietyResponse>,

    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            uuid: product.uuid.into(),
            category_uuid: product.category_uuid.into(),
            name: product.name,
            is_offer: product.is_offer,
            varieties: product.varieties.into_iter().map(Into::into).collect(),
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

impl From<Vec<CategoryRecord>> for CategoriesResponse {
    fn from(categories: Vec<CategoryRecord>) -> Self {
        CategoriesResponse {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductsResponse {
    pub products: Vec<ProductResponse>,
}

impl From<Vec<ProductRecord>> for ProductsResponse {
    fn from(products: Vec<ProductRecord>) -> Self {
        ProductsResponse {
            products: products.into_iter().map(Into::into).collect(),
        }
    }
}

/// Create Category Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCategoryRequest {
    /// Client supplied identifier, generated when omitted
    pub uuid: Option<Uuid>,

    pub name: String,
    pub code: String,
    pub image_url: Option<String>,
}

impl From<CreateCategoryRequest> for NewCategory {
    fn from(request: CreateCategoryRequest) -> Self {
        NewCategory {
            uuid: request.uuid.map_or_else(CategoryUuid::new, Into::into),
            name: request.name.trim().to_string(),
            code: request.code.trim().to_string(),
            image_url: request.image_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateVarietyRequest {
    pub uuid: Option<Uuid>,

    /// e.g. `"1kg"`
    pub name: String,

    /// Price in minor units
    pub price: u64,

    #[serde(default)]
    pub stock: u32,

    pub discount: Option<VarietyDiscountBody>,
}

impl From<CreateVarietyRequest> for NewVariety {
    fn from(request: CreateVarietyRequest) -> Self {
        NewVariety {
            uuid: request.uuid.map_or_else(VarietyUuid::new, Into::into),
            name: request.name.trim().to_string(),
            price: request.price,
            stock: request.stock,
            discount: request.discount.map(Into::into),
        }
    }
}

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProductRequest {
    pub uuid: Option<Uuid>,
    pub category_uuid: Uuid,
    pub name: String,

    #[serde(default)]
    pub is_offer: bool,

    pub varieties: Vec<CreateVarietyRequest>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        NewProduct {
            uuid: request.uuid.map_or_else(ProductUuid::new, Into::into),
            category_uuid: request.category_uuid.into(),
            name: request.name.trim().to_string(),
            is_offer: request.is_offer,
            varieties: request.varieties.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jiff::Timestamp;

    use super::*;

    pub(crate) fn make_category(uuid: CategoryUuid) -> CategoryRecord {
        CategoryRecord {
            uuid,
            name: "Rice".to_string(),
            code: "RICE".to_string(),
            image_url: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub(crate) fn make_product(uuid: ProductUuid, category_uuid: CategoryUuid) -> ProductRecord {
        ProductRecord {
            uuid,
            category_uuid,
            name: "Miniket Rice".to_string(),
            is_offer: false,
            varieties: vec![VarietyRecord {
                uuid: VarietyUuid::new(),
                product_uuid: uuid,
                name: "5kg".to_string(),
                price: 45_000,
                effective_price: 40_500,
                stock: 12,
                discount: Some(VarietyDiscountData::Percentage {
                    percent: Decimal::TEN,
                }),
                position: 0,
            }],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn percentage_discounts_are_numbers_on_the_wire() -> Result<(), serde_json::Error> {
        let body = VarietyDiscountBody::Percentage {
            percent: Decimal::new(125, 1),
        };

        assert_eq!(
            serde_json::to_value(body)?,
            serde_json::json!({ "type": "percentage", "percent": 12.5 })
        );

        Ok(())
    }

    #[test]
    fn omitted_uuids_are_generated() {
        let product: NewProduct = CreateProductRequest {
            uuid: None,
            category_uuid: Uuid::nil(),
            name: " Lentils ".to_string(),
            is_offer: false,
            varieties: vec![],
        }
        .into();

        assert_ne!(product.uuid.into_uuid(), Uuid::nil());
        assert_eq!(product.name, "Lentils");
    }
}
