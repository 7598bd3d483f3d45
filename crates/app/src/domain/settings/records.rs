//! Settings Records

use jiff::Timestamp;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::money::find_currency;

/// Site Settings Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Delivery charge in minor units
    pub delivery_charge: u64,

    /// ISO 4217 store currency
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
    pub updated_at: Timestamp,
}

impl SettingsRecord {
    /// The store currency, if the stored code is a known ISO currency.
    pub fn store_currency(&self) -> Option<&'static Currency> {
        find_currency(&self.currency)
    }
}
