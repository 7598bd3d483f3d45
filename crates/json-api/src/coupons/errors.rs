//! Coupon Errors

use salvo::http::StatusError;
use tracing::error;

use grocer_app::domain::coupons::CouponsServiceError;

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon code already exists")
        }
        CouponsServiceError::NotFound => StatusError::not_found().brief("Coupon not found"),
        CouponsServiceError::InvalidReference => {
            StatusError::bad_request().brief("Coupon category or product does not exist")
        }
        CouponsServiceError::MissingCode => {
            StatusError::bad_request().brief("Coupon code is required")
        }
        CouponsServiceError::InvalidValue | CouponsServiceError::Pricing(_) => {
            StatusError::bad_request().brief("Coupon value is out of range")
        }
        CouponsServiceError::MissingRequiredData | CouponsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid coupon payload")
        }
        CouponsServiceError::Inactive => {
            StatusError::bad_request().brief("This coupon is not active")
        }
        CouponsServiceError::Expired => StatusError::bad_request().brief("This coupon has expired"),
        CouponsServiceError::UnknownCurrency(code) => {
            error!("store currency {code} is not a known currency");

            StatusError::internal_server_error()
        }
        CouponsServiceError::Sql(source) => {
            error!("failed to access coupons: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Customer-facing mapping for code validation.
pub(crate) fn into_validation_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::NotFound => StatusError::not_found().brief("Invalid coupon code"),
        CouponsServiceError::Sql(source) => {
            error!("failed to validate coupon: {source}");

            StatusError::internal_server_error().brief("Failed to validate coupon")
        }
        other => into_status_error(other),
    }
}

/// Metric label for a failed validation.
pub(crate) fn validation_outcome(error: &CouponsServiceError) -> &'static str {
    match error {
        CouponsServiceError::MissingCode => "missing_code",
        CouponsServiceError::NotFound => "invalid",
        CouponsServiceError::Inactive => "inactive",
        CouponsServiceError::Expired => "expired",
        _ => "error",
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn validation_messages_distinguish_each_failure() {
        let cases = [
            (CouponsServiceError::NotFound, StatusCode::NOT_FOUND, "Invalid coupon code"),
            (CouponsServiceError::Inactive, StatusCode::BAD_REQUEST, "This coupon is not active"),
            (CouponsServiceError::Expired, StatusCode::BAD_REQUEST, "This coupon has expired"),
            (CouponsServiceError::MissingCode, StatusCode::BAD_REQUEST, "Coupon code is required"),
        ];

        for (error, code, brief) in cases {
            let status = into_validation_error(error);

            assert_eq!(status.code, code);
            assert_eq!(status.brief, brief);
        }
    }

    #[test]
    fn admin_lookups_report_missing_coupons_plainly() {
        let status = into_status_error(CouponsServiceError::NotFound);

        assert_eq!(status.brief, "Coupon not found");
    }
}
