//! Catalog Service

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rusty_money::iso::Currency;
use sqlx::{Postgres, Transaction};
use tracing::{Span, debug, info};

use crate::{
    cache::{CATALOG_TTL, TtlCache},
    database::Db,
    domain::{
        catalog::{
            CatalogServiceError,
            data::{NewCategory, NewProduct},
            records::{
                CategoryRecord, CategoryUuid, ProductRecord, ProductUuid, VarietyRecord,
                VarietyUuid,
            },
            repositories::{
                categories::PgCategoriesRepository,
                products::{PgProductsRepository, ProductRow, VarietyRow},
            },
        },
        settings::repository::PgSettingsRepository,
    },
};

const CATEGORIES_CACHE_PREFIX: &str = "categories:";
const PRODUCTS_CACHE_PREFIX: &str = "products:";

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    cache: Arc<TtlCache>,
    categories: PgCategoriesRepository,
    products: PgProductsRepository,
    settings: PgSettingsRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db, cache: Arc<TtlCache>) -> Self {
        Self {
            db,
            cache,
            categories: PgCategoriesRepository::new(),
            products: PgProductsRepository::new(),
            settings: PgSettingsRepository::new(),
        }
    }

    async fn store_currency(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<&'static Currency, CatalogServiceError> {
        let settings = self.settings.get_settings(tx).await?;

        settings
            .store_currency()
            .ok_or(CatalogServiceError::UnknownCurrency(settings.currency))
    }

    async fn load_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: ProductRow,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let currency = self.store_currency(tx).await?;
        let varieties = self.products.list_product_varieties(tx, row.uuid).await?;

        assemble_product(row, varieties, currency)
    }
}

fn assemble_product(
    row: ProductRow,
    varieties: Vec<VarietyRow>,
    currency: &'static Currency,
) -> Result<ProductRecord, CatalogServiceError> {
    Ok(ProductRecord {
        uuid: row.uuid,
        category_uuid: row.category_uuid,
        name: row.name,
        is_offer: row.is_offer,
        varieties: price_varieties(varieties, currency)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn product_list_key(category: Option<CategoryUuid>) -> String {
    match category {
        Some(category) => format!("{PRODUCTS_CACHE_PREFIX}category:{category}"),
        None => format!("{PRODUCTS_CACHE_PREFIX}all"),
    }
}

fn price_varieties(
    rows: Vec<VarietyRow>,
    currency: &'static Currency,
) -> Result<Vec<VarietyRecord>, CatalogServiceError> {
    rows.into_iter()
        .map(|row| row.into_record(currency).map_err(CatalogServiceError::from))
        .collect()
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(
        name = "catalog.service.create_category",
        skip(self, category),
        fields(category_uuid = %category.uuid),
        err
    )]
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.categories.create_category(&mut tx, category).await?;

        tx.commit().await?;

        self.cache.invalidate_prefix(CATEGORIES_CACHE_PREFIX);

        info!(category_uuid = %record.uuid, code = %record.code, "created category");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.get_category",
        skip(self),
        fields(category_uuid = %category),
        err
    )]
    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CatalogServiceError> {
        let key = format!("{CATEGORIES_CACHE_PREFIX}{category}");

        if let Some(record) = self.cache.get::<CategoryRecord>(&key) {
            debug!("category cache hit");

            return Ok(record);
        }

        let mut tx = self.db.begin().await?;

        let record = self.categories.get_category(&mut tx, category).await?;

        tx.commit().await?;

        self.cache.set(key, &record, CATALOG_TTL);

        Ok(record)
    }

    #[tracing::instrument(name = "catalog.service.list_categories", skip(self), err)]
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CatalogServiceError> {
        let key = format!("{CATEGORIES_CACHE_PREFIX}all");

        if let Some(records) = self.cache.get::<Vec<CategoryRecord>>(&key) {
            debug!("category list cache hit");

            return Ok(records);
        }

        let mut tx = self.db.begin().await?;

        let records = self.categories.list_categories(&mut tx).await?;

        tx.commit().await?;

        self.cache.set(key, &records, CATALOG_TTL);

        Ok(records)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(
            product_uuid = %product.uuid,
            category_uuid = %product.category_uuid,
            variety_count = tracing::field::Empty
        ),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError> {
        Span::current().record(
            "variety_count",
            tracing::field::display(product.varieties.len()),
        );

        let mut tx = self.db.begin().await?;

        let row = self.products.create_product(&mut tx, product).await?;
        let record = self.load_product(&mut tx, row).await?;

        tx.commit().await?;

        self.cache.invalidate_prefix(PRODUCTS_CACHE_PREFIX);

        info!(product_uuid = %record.uuid, "created product");

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.get_product",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError> {
        let key = format!("{PRODUCTS_CACHE_PREFIX}{product}");

        if let Some(record) = self.cache.get::<ProductRecord>(&key) {
            debug!("product cache hit");

            return Ok(record);
        }

        let mut tx = self.db.begin().await?;

        let row = self.products.get_product(&mut tx, product).await?;
        let record = self.load_product(&mut tx, row).await?;

        tx.commit().await?;

        self.cache.set(key, &record, CATALOG_TTL);

        Ok(record)
    }

    #[tracing::instrument(
        name = "catalog.service.list_products",
        skip(self),
        fields(category_uuid = tracing::field::Empty, count = tracing::field::Empty),
        err
    )]
    async fn list_products(
        &self,
        category: Option<CategoryUuid>,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        if let Some(category) = category {
            Span::current().record("category_uuid", tracing::field::display(category));
        }

        let key = product_list_key(category);

        if let Some(records) = self.cache.get::<Vec<ProductRecord>>(&key) {
            debug!("product list cache hit");

            return Ok(records);
        }

        let mut tx = self.db.begin().await?;

        let currency = self.store_currency(&mut tx).await?;
        let rows = self.products.list_products(&mut tx, category).await?;
        let uuids: Vec<ProductUuid> = rows.iter().map(|row| row.uuid).collect();
        let mut varieties = self
            .products
            .list_varieties_for_products(&mut tx, &uuids)
            .await?;

        tx.commit().await?;

        let records = rows
            .into_iter()
            .map(|row| {
                let rows = varieties.remove(&row.uuid).unwrap_or_default();

                assemble_product(row, rows, currency)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("count", records.len());

        self.cache.set(key, &records, CATALOG_TTL);

        Ok(records)
    }

    #[tracing::instrument(
        name = "catalog.service.get_varieties",
        skip(self, varieties),
        fields(requested = varieties.len()),
        err
    )]
    async fn get_varieties(
        &self,
        varieties: Vec<VarietyUuid>,
    ) -> Result<Vec<VarietyRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let currency = self.store_currency(&mut tx).await?;
        let rows = self.products.get_varieties(&mut tx, &varieties).await?;

        tx.commit().await?;

        price_varieties(rows, currency)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create a category.
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CatalogServiceError>;

    /// Retrieve a single category.
    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CatalogServiceError>;

    /// All categories, newest first.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CatalogServiceError>;

    /// Create a product together with its varieties.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieve a product with its varieties and their effective prices.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CatalogServiceError>;

    /// Products with priced varieties, newest first, optionally in one category.
    async fn list_products(
        &self,
        category: Option<CategoryUuid>,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError>;

    /// Retrieve the requested varieties that exist, priced.
    async fn get_varieties(
        &self,
        varieties: Vec<VarietyUuid>,
    ) -> Result<Vec<VarietyRecord>, CatalogServiceError>;
}
