//! Products Repository

use grocer::{pricing::PricingError, varieties::effective_price};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    domain::{
        catalog::{
            data::{NewProduct, NewVariety, VarietyDiscountData},
            records::{CategoryUuid, ProductUuid, VarietyRecord, VarietyUuid},
        },
        columns::{
            try_get_optional_u64, try_get_timestamp, try_get_u32, try_get_u64, try_i32_from_u32,
            try_i64_from_u64, try_optional_i64_from_u64,
        },
    },
    money::{to_minor, to_money},
};

const CREATE_PRODUCT_SQL: &str = include_str!("../sql/create_product.sql");
const CREATE_VARIETY_SQL: &str = include_str!("../sql/create_variety.sql");
const GET_PRODUCT_SQL: &str = include_str!("../sql/get_product.sql");
const GET_PRODUCT_NAME_SQL: &str = include_str!("../sql/get_product_name.sql");
const GET_PRODUCT_CATEGORIES_SQL: &str = include_str!("../sql/get_product_categories.sql");
const LIST_PRODUCT_VARIETIES_SQL: &str = include_str!("../sql/list_product_varieties.sql");
const GET_VARIETIES_SQL: &str = include_str!("../sql/get_varieties.sql");
const LIST_PRODUCTS_SQL: &str = include_str!("../sql/list_products.sql");
const LIST_VARIETIES_FOR_PRODUCTS_SQL: &str =
    include_str!("../sql/list_varieties_for_products.sql");

/// Product row without its varieties.
#[derive(Debug, Clone)]
pub(crate) struct ProductRow {
    pub(crate) uuid: ProductUuid,
    pub(crate) category_uuid: CategoryUuid,
    pub(crate) name: String,
    pub(crate) is_offer: bool,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

/// Variety row before its effective price is computed.
#[derive(Debug, Clone)]
pub(crate) struct VarietyRow {
    uuid: VarietyUuid,
    product_uuid: ProductUuid,
    name: String,
    price: u64,
    stock: u32,
    discount: Option<VarietyDiscountData>,
    position: u32,
}

impl VarietyRow {
    /// Price the variety in the store currency.
    pub(crate) fn into_record(
        self,
        currency: &'static Currency,
    ) -> Result<VarietyRecord, PricingError> {
        let discount = self
            .discount
            .map(|discount| discount.to_discount(currency))
            .transpose()?;

        let price = effective_price(to_money(self.price, currency)?, discount.as_ref())?;

        Ok(VarietyRecord {
            uuid: self.uuid,
            product_uuid: self.product_uuid,
            name: self.name,
            price: self.price,
            effective_price: to_minor(price),
            stock: self.stock,
            discount: self.discount,
            position: self.position,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRow, sqlx::Error> {
        let row = query_as::<Postgres, ProductRow>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.category_uuid.into_uuid())
            .bind(product.name.trim())
            .bind(product.is_offer)
            .fetch_one(&mut **tx)
            .await?;

        for (position, variety) in product.varieties.into_iter().enumerate() {
            let position = u32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(e),
            })?;

            self.create_variety(tx, product.uuid, position, variety)
                .await?;
        }

        Ok(row)
    }

    async fn create_variety(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        position: u32,
        variety: NewVariety,
    ) -> Result<(), sqlx::Error> {
        let (discount_type, discount_amount, discount_percent) = match variety.discount {
            None => (None, None, None),
            Some(VarietyDiscountData::Fixed { amount }) => (Some("fixed"), Some(amount), None),
            Some(VarietyDiscountData::Percentage { percent }) => {
                (Some("percentage"), None, Some(percent))
            }
        };

        query(CREATE_VARIETY_SQL)
            .bind(variety.uuid.into_uuid())
            .bind(product.into_uuid())
            .bind(variety.name.trim())
            .bind(try_i64_from_u64(variety.price, "price")?)
            .bind(try_i32_from_u32(variety.stock, "stock")?)
            .bind(variety.discount.is_some())
            .bind(discount_type)
            .bind(try_optional_i64_from_u64(discount_amount, "discount_amount")?)
            .bind(discount_percent)
            .bind(try_i32_from_u32(position, "position")?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRow, sqlx::Error> {
        query_as::<Postgres, ProductRow>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Newest first, optionally restricted to one category.
    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Option<CategoryUuid>,
    ) -> Result<Vec<ProductRow>, sqlx::Error> {
        query_as::<Postgres, ProductRow>(LIST_PRODUCTS_SQL)
            .bind(category.map(CategoryUuid::into_uuid))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<String>, sqlx::Error> {
        query_scalar(GET_PRODUCT_NAME_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Category of each known product. Unknown products are absent from the map.
    pub(crate) async fn get_product_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, CategoryUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|product| product.into_uuid()).collect();

        let rows: Vec<(Uuid, Uuid)> = query_as(GET_PRODUCT_CATEGORIES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product, category)| {
                (
                    ProductUuid::from_uuid(product),
                    CategoryUuid::from_uuid(category),
                )
            })
            .collect())
    }

    pub(crate) async fn list_product_varieties(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<VarietyRow>, sqlx::Error> {
        query_as::<Postgres, VarietyRow>(LIST_PRODUCT_VARIETIES_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Varieties of every listed product, grouped by product.
    pub(crate) async fn list_varieties_for_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, Vec<VarietyRow>>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|product| product.into_uuid()).collect();

        let rows = query_as::<Postgres, VarietyRow>(LIST_VARIETIES_FOR_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut grouped: FxHashMap<ProductUuid, Vec<VarietyRow>> = FxHashMap::default();

        for row in rows {
            grouped.entry(row.product_uuid).or_default().push(row);
        }

        Ok(grouped)
    }

    pub(crate) async fn get_varieties(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        varieties: &[VarietyUuid],
    ) -> Result<Vec<VarietyRow>, sqlx::Error> {
        let uuids: Vec<Uuid> = varieties.iter().map(|variety| variety.into_uuid()).collect();

        query_as::<Postgres, VarietyRow>(GET_VARIETIES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            category_uuid: CategoryUuid::from_uuid(row.try_get("category_uuid")?),
            name: row.try_get("name")?,
            is_offer: row.try_get("is_offer")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VarietyRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let has_discount: bool = row.try_get("has_discount")?;
        let discount_type: Option<String> = row.try_get("discount_type")?;

        let discount = match (has_discount, discount_type.as_deref()) {
            (true, Some("fixed")) => try_get_optional_u64(row, "discount_amount")?
                .map(|amount| VarietyDiscountData::Fixed { amount }),
            (true, Some("percentage")) => row
                .try_get::<Option<Decimal>, _>("discount_percent")?
                .map(|percent| VarietyDiscountData::Percentage { percent }),
            _ => None,
        };

        Ok(Self {
            uuid: VarietyUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            price: try_get_u64(row, "price")?,
            stock: try_get_u32(row, "stock")?,
            discount,
            position: try_get_u32(row, "position")?,
        })
    }
}
