//! Catalog Errors

use salvo::http::StatusError;
use tracing::error;

use grocer_app::domain::catalog::CatalogServiceError;

pub(crate) fn into_status_error(error: CatalogServiceError) -> StatusError {
    match error {
        CatalogServiceError::AlreadyExists => {
            StatusError::conflict().brief("Catalog entry already exists")
        }
        CatalogServiceError::NotFound => StatusError::not_found().brief("Not found"),
        CatalogServiceError::InvalidReference => {
            StatusError::bad_request().brief("Category does not exist")
        }
        CatalogServiceError::MissingRequiredData
        | CatalogServiceError::InvalidData
        | CatalogServiceError::Pricing(_) => {
            StatusError::bad_request().brief("Invalid catalog payload")
        }
        CatalogServiceError::UnknownCurrency(code) => {
            error!("store currency {code} is not a known currency");

            StatusError::internal_server_error()
        }
        CatalogServiceError::Sql(source) => {
            error!("failed to access catalog: {source}");

            StatusError::internal_server_error()
        }
    }
}
