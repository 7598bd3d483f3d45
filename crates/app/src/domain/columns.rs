//! Column conversions shared by the Postgres repositories.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Row, postgres::PgRow};

/// Encode an unsigned amount for a BIGINT column.
pub(crate) fn try_i64_from_u64(value: u64, column: &'static str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_optional_i64_from_u64(
    value: Option<u64>,
    column: &'static str,
) -> Result<Option<i64>, sqlx::Error> {
    value.map(|v| try_i64_from_u64(v, column)).transpose()
}

/// Encode a quantity for an INTEGER column.
pub(crate) fn try_i32_from_u32(value: u32, column: &'static str) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Decode a non-negative BIGINT column.
pub(crate) fn try_get_u64(row: &PgRow, column: &'static str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_optional_u64(
    row: &PgRow,
    column: &'static str,
) -> Result<Option<u64>, sqlx::Error> {
    let value: Option<i64> = row.try_get(column)?;

    value
        .map(|v| {
            u64::try_from(v).map_err(|e| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Decode a non-negative INTEGER column.
pub(crate) fn try_get_u32(row: &PgRow, column: &'static str) -> Result<u32, sqlx::Error> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_timestamp(row: &PgRow, column: &'static str) -> Result<Timestamp, sqlx::Error> {
    Ok(row.try_get::<SqlxTimestamp, _>(column)?.to_jiff())
}

pub(crate) fn try_get_optional_timestamp(
    row: &PgRow,
    column: &'static str,
) -> Result<Option<Timestamp>, sqlx::Error> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(column)?
        .map(SqlxTimestamp::to_jiff))
}
