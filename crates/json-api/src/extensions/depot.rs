//! Depot helper extensions.

use std::any::{Any, type_name};

use salvo::prelude::{Depot, StatusError};
use tracing::error;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    /// Borrow an injected value, or fail the request with 500 when it was never injected.
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_missing| {
            error!(kind = type_name::<T>(), "depot has no injected value");

            StatusError::internal_server_error().brief("Service state unavailable")
        })
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn missing_values_are_500() {
        let mut depot = Depot::new();

        assert!(depot.obtain_or_500::<u32>().is_err(), "expected missing value to fail");

        depot.inject(7_u32);

        assert_eq!(depot.obtain_or_500::<u32>().ok(), Some(&7));
        assert_eq!(
            Depot::new().obtain_or_500::<u32>().err().map(|status| status.code),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
