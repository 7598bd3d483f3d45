//! Settings Data

/// Settings Update Data
///
/// `None` leaves a field untouched. For optional text fields an empty string clears
/// the value, and an empty store name restores the default name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
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
