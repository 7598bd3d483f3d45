//! Analytics Data

use jiff::{SignedDuration, Timestamp, ToSpan, tz::TimeZone};

use crate::domain::{analytics::records::EventUuid, catalog::records::ProductUuid};

/// Products listed in each dashboard ranking.
pub const TOP_PRODUCTS_LIMIT: u32 = 10;

/// A storefront product page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductView {
    pub uuid: EventUuid,
    pub product_uuid: ProductUuid,

    /// Anonymous views carry no token; unknown tokens are stored as anonymous
    pub visitor_token: Option<String>,
}

/// A product added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartAdd {
    pub uuid: EventUuid,
    pub product_uuid: ProductUuid,
    pub visitor_token: Option<String>,
    pub quantity: u32,
}

/// Lower bounds of the dashboard's visitor counts, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    /// Midnight at the start of `now`'s day
    pub today: Timestamp,

    /// Seven days before `now`
    pub week: Timestamp,

    /// One calendar month before `now`
    pub month: Timestamp,
}

impl ReportWindows {
    /// Windows ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error when a bound falls outside the supported timestamp range.
    pub fn ending_at(now: Timestamp) -> Result<Self, jiff::Error> {
        let zoned = now.to_zoned(TimeZone::UTC);

        Ok(Self {
            today: zoned.start_of_day()?.timestamp(),
            week: now.checked_sub(SignedDuration::from_hours(7 * 24))?,
            month: zoned.checked_sub(1.month())?.timestamp(),
        })
    }
}
