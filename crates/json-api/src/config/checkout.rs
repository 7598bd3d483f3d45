//! Checkout Config

use clap::Args;

/// Checkout validation settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Accepted gap between a claimed and a computed order total, in minor units
    #[arg(long, env = "TOTAL_TOLERANCE_MINOR", default_value_t = 1_u64)]
    pub total_tolerance_minor: u64,
}
