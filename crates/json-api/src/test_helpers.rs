//! Test helpers.

use std::sync::Arc;

use grocer_app::{
    cache::TtlCache,
    context::AppContext,
    domain::{
        analytics::MockAnalyticsService, catalog::MockCatalogService,
        coupons::MockCouponsService, orders::MockOrdersService, sessions::MockSessionsService,
        settings::MockSettingsService, visitors::MockVisitorsService,
    },
};
use salvo::{affix_state::inject, prelude::*};

use crate::state::State;

/// Service mocks behind a test router. Unconfigured mocks fail on any call.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) catalog: MockCatalogService,
    pub(crate) coupons: MockCouponsService,
    pub(crate) settings: MockSettingsService,
    pub(crate) visitors: MockVisitorsService,
    pub(crate) sessions: MockSessionsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) analytics: MockAnalyticsService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            catalog: Arc::new(self.catalog),
            coupons: Arc::new(self.coupons),
            settings: Arc::new(self.settings),
            visitors: Arc::new(self.visitors),
            sessions: Arc::new(self.sessions),
            orders: Arc::new(self.orders),
            analytics: Arc::new(self.analytics),
            cache: Arc::new(TtlCache::new()),
        })
    }

    pub(crate) fn into_service(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
    }
}
