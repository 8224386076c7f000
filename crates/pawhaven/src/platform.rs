use std::sync::Arc;

use axum::Router;

use crate::accounts::{account_router, authenticate, AccountService};
use crate::adoptions::{adoption_router, AdoptionService};
use crate::config::EmailConfig;
use crate::dashboard::{dashboard_router, DashboardService};
use crate::http::PageLimits;
use crate::notifications::{
    notification_router, Mailer, NotificationDispatcher, NotificationService,
};
use crate::pets::{pet_router, PetService};
use crate::stats::{stats_router, StatsService};
use crate::store::PlatformStore;

/// Every service of the adoption platform wired over one store and one mailer.
pub struct Platform<S, M> {
    pub store: Arc<S>,
    pub accounts: Arc<AccountService<S>>,
    pub pets: Arc<PetService<S>>,
    pub adoptions: Arc<AdoptionService<S, M>>,
    pub notifications: Arc<NotificationService<S>>,
    pub dispatcher: Arc<NotificationDispatcher<S, M>>,
    pub stats: Arc<StatsService<S>>,
    pub dashboard: Arc<DashboardService<S>>,
}

impl<S, M> Platform<S, M>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, email: EmailConfig, limits: PageLimits) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), mailer, email));

        Self {
            accounts: Arc::new(AccountService::new(store.clone())),
            pets: Arc::new(PetService::new(store.clone(), limits)),
            adoptions: Arc::new(AdoptionService::new(
                store.clone(),
                dispatcher.clone(),
                limits,
            )),
            notifications: Arc::new(NotificationService::new(store.clone())),
            stats: Arc::new(StatsService::new(store.clone())),
            dashboard: Arc::new(DashboardService::new(store.clone())),
            dispatcher,
            store,
        }
    }

    /// All `/api/v1` routes behind token resolution.
    pub fn router(&self) -> Router {
        let routes = Router::new()
            .merge(account_router(self.accounts.clone()))
            .merge(pet_router(self.pets.clone()))
            .merge(adoption_router(self.adoptions.clone()))
            .merge(notification_router(self.notifications.clone()))
            .merge(stats_router(self.stats.clone()))
            .merge(dashboard_router(self.dashboard.clone()));

        authenticate(routes, self.accounts.clone())
    }
}
