//! Steadfast-style courier HTTP client.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::domain::courier::{
    CourierError,
    models::{Consignment, ConsignmentRequest, CourierConfig},
};

/// Successful `status` value in courier response bodies.
const STATUS_OK: u16 = 200;

#[automock]
#[async_trait]
pub trait CourierClient: Send + Sync {
    /// Submit a consignment and return the courier's record of it.
    async fn create_consignment(
        &self,
        request: ConsignmentRequest,
    ) -> Result<Consignment, CourierError>;

    /// Current delivery status by consignment id.
    async fn status_by_consignment(&self, consignment_id: String) -> Result<String, CourierError>;

    /// Current delivery status by invoice.
    async fn status_by_invoice(&self, invoice: String) -> Result<String, CourierError>;

    /// Current delivery status by tracking code.
    async fn status_by_tracking_code(&self, tracking_code: String)
    -> Result<String, CourierError>;
}

/// HTTP client for the Steadfast courier API.
#[derive(Debug, Clone)]
pub struct SteadfastClient {
    config: CourierConfig,
    http: Client,
}

impl SteadfastClient {
    #[must_use]
    pub fn new(config: CourierConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.config.api_key)
            .header("Secret-Key", &self.config.secret_key)
    }

    async fn delivery_status(&self, path: String) -> Result<String, CourierError> {
        let response = self
            .authorised(self.http.get(self.url(&path)))
            .send()
            .await?;

        let parsed: DeliveryStatusResponse = successful(response, "status").await?.json().await?;

        debug!(%path, status = parsed.status, "courier status lookup");

        parsed.delivery_status.ok_or_else(|| {
            CourierError::UnexpectedResponse(format!(
                "status lookup returned no delivery status (status {})",
                parsed.status
            ))
        })
    }
}

async fn successful(response: Response, operation: &str) -> Result<Response, CourierError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(CourierError::UnexpectedResponse(format!(
        "{operation} request failed with status {status}: {text}"
    )))
}

#[async_trait]
impl CourierClient for SteadfastClient {
    async fn create_consignment(
        &self,
        request: ConsignmentRequest,
    ) -> Result<Consignment, CourierError> {
        let response = self
            .authorised(self.http.post(self.url("create_order")))
            .json(&request)
            .send()
            .await?;

        let parsed: CreateOrderResponse = successful(response, "create_order").await?.json().await?;

        match parsed.consignment {
            Some(consignment) if parsed.status == STATUS_OK => Ok(consignment),
            _ => Err(CourierError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| format!("status {}", parsed.status)),
            )),
        }
    }

    async fn status_by_consignment(&self, consignment_id: String) -> Result<String, CourierError> {
        self.delivery_status(format!("status_by_cid/{consignment_id}"))
            .await
    }

    async fn status_by_invoice(&self, invoice: String) -> Result<String, CourierError> {
        self.delivery_status(format!("status_by_invoice/{invoice}"))
            .await
    }

    async fn status_by_tracking_code(
        &self,
        tracking_code: String,
    ) -> Result<String, CourierError> {
        self.delivery_status(format!("status_by_trackingcode/{tracking_code}"))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    status: u16,
    message: Option<String>,
    consignment: Option<Consignment>,
}

#[derive(Debug, Deserialize)]
struct DeliveryStatusResponse {
    status: u16,
    delivery_status: Option<String>,
}
