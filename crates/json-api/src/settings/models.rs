//! Settings Wire Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use grocer_app::domain::settings::{data::SettingsUpdate, records::SettingsRecord};

/// Site Settings Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingsResponse {
    /// Delivery charge in minor units
    pub delivery_charge: u64,

    /// ISO 4217 currency code
    pub currency: String,

    pub store_name: String,
    pub store_logo: Option<String>,
    pub store_favicon: Option<String>,
    pub phone: Option<String>,
    pub facebook: Option<String>,
    pub messenger: Option<String>,
    pub whatsapp: Option<String>,
    pub about_us: Option<String>,
    pub privacy_policy: Option<String>,
    pub terms_condition: Option<String>,
    pub refund_policy: Option<String>,
    pub updated_at: String,
}

impl From<SettingsRecord> for SettingsResponse {
    fn from(settings: SettingsRecord) -> Self {
        SettingsResponse {
            delivery_charge: settings.delivery_charge,
            currency: settings.currency,
            store_name: settings.store_name,
            store_logo: settings.store_logo,
            store_favicon: settings.store_favicon,
            phone: settings.phone,
            facebook: settings.facebook,
            messenger: settings.messenger,
            whatsapp: settings.whatsapp,
            about_us: settings.about_us,
            privacy_policy: settings.privacy_policy,
            terms_condition: settings.terms_condition,
            refund_policy: settings.refund_policy,
            updated_at: settings.updated_at.to_string(),
        }
    }
}

/// Update Settings Request. Omitted fields are left as they are.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UpdateSettingsRequest {
    pub delivery_charge: Option<u64>,
    pub currency: Option<String>,
    pub store_name: Option<String>,
    pub store_logo: Option<String>,
    pub store_favicon: Option<String>,
    pub phone: Option<String>,
    pub facebook: Option<String>,
    pub messenger: Option<String>,
    pub whatsapp: Option<String>,
    pub about_us: Option<String>,
    pub privacy_policy: Option<String>,
    pub terms_condition: Option<String>,
    pub refund_policy: Option<String>,
}

impl From<UpdateSettingsRequest> for SettingsUpdate {
    fn from(request: UpdateSettingsRequest) -> Self {
        SettingsUpdate {
            delivery_charge: request.delivery_charge,
            currency: request.currency,
            store_name: request.store_name,
            store_logo: request.store_logo,
            store_favicon: request.store_favicon,
            phone: request.phone,
            facebook: request.facebook,
            messenger: request.messenger,
            whatsapp: request.whatsapp,
            about_us: request.about_us,
            privacy_policy: request.privacy_policy,
            terms_condition: request.terms_condition,
            refund_policy: request.refund_policy,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jiff::Timestamp;

    use super::*;

    pub(crate) fn make_settings() -> SettingsRecord {
        SettingsRecord {
            delivery_charge: 6_000,
            currency: "BDT".to_string(),
            store_name: "Lumina Grocery".to_string(),
            store_logo: None,
            store_favicon: None,
            phone: Some("01700000000".to_string()),
            facebook: None,
            messenger: None,
            whatsapp: None,
            about_us: None,
            privacy_policy: None,
            terms_condition: None,
            refund_policy: None,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
