//! Orders Service

use std::sync::Arc;

use async_trait::async_trait;
use grocer::{
    cart::{Cart, CartItem},
    coupons::{normalise_code, resolve_applicability},
    discounts::{AppliedCoupon, AppliedCoupons},
    ids::{CategoryUuid, ProductUuid, VarietyUuid},
    pricing::{CheckoutTotals, line_total},
    sessions::{CustomerDetails, TerminalAction},
};
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::iso::Currency;
use sqlx::{Postgres, Transaction};
use tracing::{Span, debug, info, warn};

use crate::{
    database::Db,
    domain::{
        catalog::repositories::products::PgProductsRepository,
        coupons::repository::PgCouponsRepository,
        courier::{
            CourierClient,
            models::{ConsignmentRequest, CourierNotification, NotificationKind, normalise_courier_status},
        },
        orders::{
            OrdersServiceError,
            data::{
                MAX_TRACKED_ORDERS, NewOrder, OrderFilter, OrderUpdate, generate_invoice,
                normalise_phone,
            },
            records::{
                CourierHandoff, CourierTracking, OrderCouponRecord, OrderItemRecord,
                OrderItemUuid, OrderRecord, OrderStatus, OrderUuid,
            },
            repositories::{
                items::PgOrderItemsRepository,
                orders::{OrderHeader, PgOrdersRepository},
            },
        },
        sessions::{SessionsService, data::TerminalUpdate},
        settings::repository::PgSettingsRepository,
    },
    money::{to_major, to_minor, to_money},
};

/// Attempts at inserting an order before a duplicate invoice is surfaced.
const INVOICE_ATTEMPTS: usize = 2;

const COURIER_HANDOFF_MESSAGE: &str = "Order sent to Steadfast Courier";

/// Order header, lines and coupon usages as priced by the server.
#[derive(Debug)]
struct PricedOrder {
    header: OrderHeader,
    items: Vec<OrderItemRecord>,
    coupons: Vec<OrderCouponRecord>,
}

pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    products: PgProductsRepository,
    coupons: PgCouponsRepository,
    settings: PgSettingsRepository,
    sessions: Arc<dyn SessionsService>,
    courier: Arc<dyn CourierClient>,

    /// Allowed gap between claimed and computed totals, in minor units
    total_tolerance: u64,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(
        db: Db,
        sessions: Arc<dyn SessionsService>,
        courier: Arc<dyn CourierClient>,
        total_tolerance: u64,
    ) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            products: PgProductsRepository::new(),
            coupons: PgCouponsRepository::new(),
            settings: PgSettingsRepository::new(),
            sessions,
            courier,
            total_tolerance,
        }
    }

    async fn store_currency(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(&'static Currency, u64), OrdersServiceError> {
        let settings = self.settings.get_settings(tx).await?;

        let currency = settings
            .store_currency()
            .ok_or_else(|| OrdersServiceError::UnknownCurrency(settings.currency.clone()))?;

        Ok((currency, settings.delivery_charge))
    }

    /// Recompute the order against live prices, coupons and settings.
    async fn price_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrder,
        now: Timestamp,
    ) -> Result<PricedOrder, OrdersServiceError> {
        let (currency, delivery_charge) = self.store_currency(tx).await?;

        let product_uuids: Vec<ProductUuid> =
            order.items.iter().filter_map(|item| item.product_uuid).collect();
        let categories = self.products.get_product_categories(tx, &product_uuids).await?;

        let variety_uuids: Vec<VarietyUuid> =
            order.items.iter().filter_map(|item| item.variety_uuid).collect();
        let live_prices: FxHashMap<VarietyUuid, u64> = self
            .products
            .get_varieties(tx, &variety_uuids)
            .await?
            .into_iter()
            .map(|row| {
                row.into_record(currency)
                    .map(|variety| (variety.uuid, variety.effective_price))
            })
            .collect::<Result<_, _>>()?;

        let mut cart = Cart::new(currency);
        let mut items = Vec::with_capacity(order.items.len());

        for item in order.items {
            if let Some(variety) = item.variety_uuid
                && live_prices.get(&variety) != Some(&item.price)
            {
                return Err(OrdersServiceError::PriceMismatch { item: item.name });
            }

            // Lines without a known product get fresh ids so no scoped coupon can cover them.
            let product = item.product_uuid.unwrap_or_else(ProductUuid::new);
            let category = categories
                .get(&product)
                .copied()
                .unwrap_or_else(CategoryUuid::new);
            let unit_price = to_money(item.price, currency)?;

            cart.add(CartItem {
                product,
                category,
                name: item.name.clone(),
                variety: item.variety_name.clone().unwrap_or_default(),
                unit_price,
                quantity: item.quantity,
            })?;

            items.push(OrderItemRecord {
                uuid: OrderItemUuid::new(),
                product_uuid: item.product_uuid,
                product_name: item.name,
                variety_name: item.variety_name,
                price: item.price,
                quantity: item.quantity,
                total: to_minor(line_total(unit_price, item.quantity)?),
            });
        }

        let mut codes: Vec<String> = order
            .coupon_codes
            .iter()
            .map(|code| normalise_code(code))
            .filter(|code| !code.is_empty())
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();

        codes.sort();

        let lines = cart.lines();
        let mut applied = AppliedCoupons::new();

        for record in self.coupons.find_by_codes(tx, &codes).await? {
            let coupon = record.to_coupon(currency)?;

            if let Err(error) = coupon.check_usable(now) {
                debug!(code = %coupon.code, %error, "skipping unusable coupon");

                continue;
            }

            let applicability = resolve_applicability(&coupon, &lines, None);

            applied.apply(AppliedCoupon::new(&coupon, applicability, &cart)?)?;
        }

        let totals = CheckoutTotals::compute(
            &cart,
            &applied,
            &order.customer_address,
            to_money(delivery_charge, currency)?,
        )?;

        if !totals.agrees_with(to_money(order.claimed_total, currency)?, self.total_tolerance) {
            return Err(OrdersServiceError::TotalMismatch {
                expected: to_minor(totals.total),
                claimed: order.claimed_total,
            });
        }

        let coupons = applied
            .as_slice()
            .iter()
            .map(|coupon| OrderCouponRecord {
                coupon_uuid: Some(coupon.coupon),
                code: coupon.code.clone(),
                discount: to_minor(coupon.discount),
            })
            .collect();

        Ok(PricedOrder {
            header: OrderHeader {
                uuid: order.uuid,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                customer_email: order.customer_email,
                customer_address: order.customer_address,
                subtotal: to_minor(totals.subtotal),
                discount: to_minor(totals.discount),
                delivery_charge: to_minor(totals.delivery),
                total: to_minor(totals.total),
                session_uuid: order.session_uuid,
            },
            items,
            coupons,
        })
    }

    /// Insert the order with its items and coupon usages in one transaction.
    async fn insert_order(
        &self,
        priced: &PricedOrder,
        invoice: &str,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders
            .create_order(&mut tx, &priced.header, invoice)
            .await?;

        for (position, item) in (0_u32..).zip(&priced.items) {
            let item = self
                .items
                .create_item(&mut tx, record.uuid, position, item)
                .await?;

            record.items.push(item);
        }

        for coupon in &priced.coupons {
            let coupon = self.items.create_coupon(&mut tx, record.uuid, coupon).await?;

            record.coupons.push(coupon);
        }

        tx.commit().await?;

        Ok(record)
    }

    /// Attach items and coupon usages to order rows.
    async fn hydrate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let mut items = self.items.list_items(tx, &uuids).await?;
        let mut coupons = self.items.list_coupons(tx, &uuids).await?;

        for order in &mut orders {
            order.items = items.remove(&order.uuid).unwrap_or_default();
            order.coupons = coupons.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }

    async fn hydrate_one(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderRecord,
    ) -> Result<OrderRecord, OrdersServiceError> {
        self.hydrate(tx, vec![order])
            .await?
            .pop()
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn current_delivery_status(
        &self,
        order: &OrderRecord,
    ) -> Result<String, OrdersServiceError> {
        if let Some(consignment_id) = &order.consignment_id {
            return match self
                .courier
                .status_by_consignment(consignment_id.clone())
                .await
            {
                Ok(status) => Ok(status),
                Err(error) => {
                    warn!(%error, "consignment lookup failed, falling back to invoice");

                    Ok(self.courier.status_by_invoice(order.invoice.clone()).await?)
                }
            };
        }

        match &order.tracking_code {
            Some(tracking_code) => Ok(self
                .courier
                .status_by_tracking_code(tracking_code.clone())
                .await?),
            None => Err(OrdersServiceError::NotSentToCourier),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            item_count = order.items.len(),
            invoice = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let order = NewOrder {
            customer_name: order.customer_name.trim().to_string(),
            customer_phone: order.customer_phone.trim().to_string(),
            customer_address: order.customer_address.trim().to_string(),
            customer_email: order
                .customer_email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
            ..order
        };

        if order.customer_name.is_empty()
            || order.customer_phone.is_empty()
            || order.customer_address.is_empty()
        {
            return Err(OrdersServiceError::MissingCustomerDetails);
        }

        if order.items.is_empty() {
            return Err(OrdersServiceError::EmptyOrder);
        }

        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let priced = self.price_order(&mut tx, order, now).await?;

        tx.commit().await?;

        let mut attempt = 1;

        let record = loop {
            let invoice = generate_invoice(Timestamp::now(), &mut rand::thread_rng());

            match self.insert_order(&priced, &invoice).await {
                Err(OrdersServiceError::DuplicateInvoice) if attempt < INVOICE_ATTEMPTS => {
                    warn!(%invoice, attempt, "invoice collision, regenerating");

                    attempt += 1;
                }
                result => break result?,
            }
        };

        let span = Span::current();

        span.record("invoice", tracing::field::display(&record.invoice));
        span.record("total", record.total);

        info!(
            order_uuid = %record.uuid,
            invoice = %record.invoice,
            total = record.total,
            "placed order"
        );

        if let Some(session) = record.session_uuid {
            let completion = TerminalUpdate {
                action: TerminalAction::Complete,
                customer: CustomerDetails {
                    name: Some(record.customer_name.clone()),
                    phone: Some(record.customer_phone.clone()),
                    address: Some(record.customer_address.clone()),
                },
            };

            if let Err(error) = self
                .sessions
                .terminate_session(session, completion, Timestamp::now())
                .await
            {
                warn!(session_uuid = %session, %error, "could not complete checkout session");
            }
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;
        let record = self.hydrate_one(&mut tx, record).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(name = "orders.service.list_orders", skip(self), err)]
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let filter = OrderFilter {
            search: filter
                .search
                .map(|search| search.trim().to_string())
                .filter(|search| !search.is_empty()),
            ..filter
        };

        let mut tx = self.db.begin().await?;

        let records = self.orders.list_orders(&mut tx, &filter).await?;
        let records = self.hydrate(&mut tx, records).await?;

        tx.commit().await?;

        Ok(records)
    }

    #[tracing::instrument(
        name = "orders.service.track_orders_by_phone",
        skip(self, phone),
        fields(results = tracing::field::Empty),
        err
    )]
    async fn track_orders_by_phone(
        &self,
        phone: String,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let phone = normalise_phone(&phone);

        if phone.is_empty() {
            return Err(OrdersServiceError::MissingPhone);
        }

        let mut tx = self.db.begin().await?;

        let records = self
            .orders
            .track_orders_by_phone(&mut tx, &phone, MAX_TRACKED_ORDERS)
            .await?;
        let records = self.hydrate(&mut tx, records).await?;

        tx.commit().await?;

        Span::current().record("results", records.len());

        Ok(records)
    }

    #[tracing::instrument(
        name = "orders.service.update_order",
        skip(self, update),
        fields(order_uuid = %order, status = ?update.status),
        err
    )]
    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.update_order(&mut tx, order, update).await?;
        let record = self.hydrate_one(&mut tx, record).await?;

        tx.commit().await?;

        info!(order_uuid = %order, status = %record.status, "updated order");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.orders.delete_order(&mut tx, order).await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        tx.commit().await?;

        info!(order_uuid = %order, "deleted order");

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.send_to_courier",
        skip(self),
        fields(order_uuid = %order, consignment_id = tracing::field::Empty),
        err
    )]
    async fn send_to_courier(&self, order: OrderUuid) -> Result<CourierHandoff, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;
        let record = self.hydrate_one(&mut tx, record).await?;
        let (currency, _) = self.store_currency(&mut tx).await?;

        tx.commit().await?;

        if record.consignment_id.is_some() {
            return Err(OrdersServiceError::AlreadySentToCourier);
        }

        if record.status != OrderStatus::Approved {
            return Err(OrdersServiceError::NotApproved);
        }

        let consignment = self
            .courier
            .create_consignment(ConsignmentRequest {
                invoice: record.invoice.clone(),
                recipient_name: record.customer_name.clone(),
                recipient_phone: record.customer_phone.clone(),
                recipient_address: record.customer_address.clone(),
                cod_amount: to_major(record.total, currency),
                note: record.admin_note.clone(),
                item_description: record.item_description(),
                delivery_type: 0,
            })
            .await?;

        let consignment_id = consignment.consignment_id.to_string();

        Span::current().record("consignment_id", tracing::field::display(&consignment_id));

        let mut tx = self.db.begin().await?;

        let locked = self.orders.get_order_for_update(&mut tx, order).await?;

        if locked.consignment_id.is_some() {
            return Err(OrdersServiceError::AlreadySentToCourier);
        }

        let updated = self
            .orders
            .update_order(
                &mut tx,
                order,
                OrderUpdate {
                    status: Some(OrderStatus::Processing),
                    courier_status: Some(consignment.status.clone()),
                    tracking_code: Some(consignment.tracking_code.clone()),
                    consignment_id: Some(consignment_id),
                    tracking_message: Some(COURIER_HANDOFF_MESSAGE.to_string()),
                    ..OrderUpdate::default()
                },
            )
            .await?;
        let updated = self.hydrate_one(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            order_uuid = %order,
            consignment_id = consignment.consignment_id,
            tracking_code = %consignment.tracking_code,
            "sent order to courier"
        );

        Ok(CourierHandoff {
            order: updated,
            consignment,
        })
    }

    #[tracing::instrument(
        name = "orders.service.refresh_courier_status",
        skip(self),
        fields(order_uuid = %order, delivery_status = tracing::field::Empty),
        err
    )]
    async fn refresh_courier_status(
        &self,
        order: OrderUuid,
    ) -> Result<CourierTracking, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        tx.commit().await?;

        let delivery_status =
            normalise_courier_status(Some(&self.current_delivery_status(&record).await?));

        Span::current().record("delivery_status", tracing::field::display(&delivery_status));

        let mut tx = self.db.begin().await?;

        let updated = self
            .orders
            .update_order(
                &mut tx,
                order,
                OrderUpdate {
                    status: OrderStatus::from_courier_status(&delivery_status),
                    courier_status: Some(delivery_status.clone()),
                    ..OrderUpdate::default()
                },
            )
            .await?;
        let updated = self.hydrate_one(&mut tx, updated).await?;

        tx.commit().await?;

        info!(order_uuid = %order, %delivery_status, "refreshed courier status");

        Ok(CourierTracking {
            order: updated,
            delivery_status,
        })
    }

    #[tracing::instrument(
        name = "orders.service.apply_courier_notification",
        skip(self, notification),
        fields(
            kind = ?notification.kind,
            invoice = ?notification.invoice,
            consignment_id = ?notification.consignment_id,
            order_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn apply_courier_notification(
        &self,
        notification: CourierNotification,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let consignment_id = notification.consignment_id.map(|id| id.to_string());

        let mut tx = self.db.begin().await?;

        let record = self
            .orders
            .find_order_for_courier(
                &mut tx,
                notification.invoice.as_deref(),
                consignment_id.as_deref(),
            )
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        Span::current().record("order_uuid", tracing::field::display(record.uuid));

        let update = match notification.kind {
            NotificationKind::DeliveryStatus => {
                let courier_status = normalise_courier_status(notification.status.as_deref());

                OrderUpdate {
                    status: OrderStatus::from_courier_status(&courier_status),
                    courier_status: Some(courier_status),
                    tracking_message: notification.tracking_message,
                    ..OrderUpdate::default()
                }
            }
            NotificationKind::TrackingUpdate => OrderUpdate {
                tracking_message: notification.tracking_message,
                ..OrderUpdate::default()
            },
        };

        let updated = self.orders.update_order(&mut tx, record.uuid, update).await?;
        let updated = self.hydrate_one(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            order_uuid = %updated.uuid,
            status = %updated.status,
            courier_status = ?updated.courier_status,
            "applied courier notification"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price, validate and store an order, then complete its checkout session.
    async fn place_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order with its items.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders newest first.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Recent orders whose customer phone contains `phone`.
    async fn track_orders_by_phone(
        &self,
        phone: String,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Merge admin and courier fields into an order.
    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Permanently delete an order and its items.
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError>;

    /// Hand an approved order to the courier.
    async fn send_to_courier(&self, order: OrderUuid) -> Result<CourierHandoff, OrdersServiceError>;

    /// Poll the courier for the order's delivery status.
    async fn refresh_courier_status(
        &self,
        order: OrderUuid,
    ) -> Result<CourierTracking, OrdersServiceError>;

    /// Apply a pushed courier notification to the order it names.
    async fn apply_courier_notification(
        &self,
        notification: CourierNotification,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
