//! Categories Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    catalog::{
        data::NewCategory,
        records::{CategoryRecord, CategoryUuid},
    },
    columns::try_get_timestamp,
};

const CREATE_CATEGORY_SQL: &str = include_str!("../sql/create_category.sql");
const GET_CATEGORY_SQL: &str = include_str!("../sql/get_category.sql");
const GET_CATEGORY_NAME_SQL: &str = include_str!("../sql/get_category_name.sql");
const LIST_CATEGORIES_SQL: &str = include_str!("../sql/list_categories.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: NewCategory,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(CREATE_CATEGORY_SQL)
            .bind(category.uuid.into_uuid())
            .bind(category.name.trim())
            .bind(category.code.trim())
            .bind(category.image_url)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_CATEGORY_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(LIST_CATEGORIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_category_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<Option<String>, sqlx::Error> {
        query_scalar(GET_CATEGORY_NAME_SQL)
            .bind(category.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            code: row.try_get("code")?,
            image_url: row.try_get("image_url")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
