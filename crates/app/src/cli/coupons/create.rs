use clap::{ArgGroup, Args, ValueEnum};
use grocer::{
    coupons::CouponScope,
    ids::{CategoryUuid, CouponUuid, ProductUuid},
};
use grocer_app::{
    database::{self, Db},
    domain::coupons::{
        CouponsService, PgCouponsService,
        data::{CouponDiscountData, NewCoupon},
    },
};
use jiff::Timestamp;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    All,
    Category,
    Product,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("discount").required(true).args(["percent", "amount"])))]
pub(crate) struct CreateCouponArgs {
    /// Coupon code; stored uppercase
    #[arg(long)]
    code: String,

    /// Percentage off, in percent points
    #[arg(long)]
    percent: Option<Decimal>,

    /// Fixed amount off, in minor units
    #[arg(long)]
    amount: Option<u64>,

    /// Which cart lines the coupon covers
    #[arg(long, value_enum, default_value_t = ScopeArg::All)]
    scope: ScopeArg,

    /// Target category for category coupons
    #[arg(long, required_if_eq("scope", "category"))]
    category: Option<CategoryUuid>,

    /// Target product for product coupons
    #[arg(long, required_if_eq("scope", "product"))]
    product: Option<ProductUuid>,

    /// Expiry as an RFC 3339 timestamp
    #[arg(long)]
    expires_at: Option<Timestamp>,

    /// Create the coupon switched off
    #[arg(long)]
    inactive: bool,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

impl CreateCouponArgs {
    fn discount(&self) -> Result<CouponDiscountData, String> {
        match (self.percent, self.amount) {
            (Some(percent), None) => Ok(CouponDiscountData::Percentage { percent }),
            (None, Some(amount)) => Ok(CouponDiscountData::Fixed { amount }),
            _ => Err("exactly one of --percent or --amount is required".to_string()),
        }
    }

    fn coupon_scope(&self) -> Result<CouponScope, String> {
        match self.scope {
            ScopeArg::All => Ok(CouponScope::All),
            ScopeArg::Category => self
                .category
                .map(CouponScope::Category)
                .ok_or_else(|| "--category is required for category coupons".to_string()),
            ScopeArg::Product => self
                .product
                .map(CouponScope::Product)
                .ok_or_else(|| "--product is required for product coupons".to_string()),
        }
    }
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let coupon = NewCoupon {
        uuid: CouponUuid::new(),
        code: args.code.clone(),
        discount: args.discount()?,
        scope: args.coupon_scope()?,
        is_active: !args.inactive,
        expires_at: args.expires_at,
    };

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let record = PgCouponsService::new(Db::new(pool))
        .create_coupon(coupon)
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", record.uuid);
    println!("coupon_code: {}", record.code);
    println!("scope: {}", record.scope.as_str());

    Ok(())
}
