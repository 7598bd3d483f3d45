//! Update Settings Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    settings::{
        errors::into_status_error,
        models::{SettingsResponse, UpdateSettingsRequest},
    },
    state::State,
};

/// Update Settings Handler
#[endpoint(
    tags("admin"),
    summary = "Update Site Settings",
    responses(
        (status_code = StatusCode::OK, description = "Settings updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "settings.update", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<UpdateSettingsRequest>,
    depot: &mut Depot,
) -> Result<Json<SettingsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let settings = state
        .app
        .settings
        .update_settings(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(settings.into()))
}

#[cfg(test)]
mod tests {
    use grocer_app::domain::settings::{
        SettingsServiceError, data::SettingsUpdate, records::SettingsRecord,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{settings::models::tests::make_settings, test_helpers::Mocks};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        mocks.into_service(Router::with_path("admin/settings").put(handler))
    }

    #[tokio::test]
    async fn test_update_settings_forwards_only_provided_fields() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .settings
            .expect_update_settings()
            .once()
            .withf(|update| {
                *update
                    == SettingsUpdate {
                        delivery_charge: Some(8_000),
                        whatsapp: Some("01800000000".to_string()),
                        ..SettingsUpdate::default()
                    }
            })
            .return_once(|_| {
                Ok(SettingsRecord {
                    delivery_charge: 8_000,
                    ..make_settings()
                })
            });

        let mut res = TestClient::put("http://example.com/admin/settings")
            .json(&json!({ "deliveryCharge": 8000, "whatsapp": "01800000000" }))
            .send(&make_service(mocks))
            .await;

        let body: SettingsResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.delivery_charge, 8_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_settings_unknown_currency_returns_400() {
        let mut mocks = Mocks::default();

        mocks
            .settings
            .expect_update_settings()
            .once()
            .return_once(|_| Err(SettingsServiceError::UnknownCurrency("XYZ".to_string())));

        let res = TestClient::put("http://example.com/admin/settings")
            .json(&json!({ "currency": "XYZ" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
