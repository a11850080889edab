//! Shared application state handed to every request handler

use crate::config::WaitlistConfig;
use crate::entry_listing_service::EntryListingService;
use crate::rate_limit_manager::RateLimitManager;
use crate::signup_service::SignupService;
use crate::stats_service::StatsService;
use crate::waitlist_store::WaitlistStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub signups: Arc<SignupService>,
    pub stats: Arc<StatsService>,
    pub listing: Arc<EntryListingService>,
    pub signup_rate_limiter: Arc<RateLimitManager>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn WaitlistStore>, config: &WaitlistConfig) -> Self {
        let rate_limiter = RateLimitManager::new(
            config.rate_limit_max_requests,
            config.rate_limit_window,
        );
        Self::with_rate_limiter(store, Arc::new(rate_limiter), config.admin_token.as_deref())
    }

    pub fn with_rate_limiter(
        store: Arc<dyn WaitlistStore>,
        signup_rate_limiter: Arc<RateLimitManager>,
        admin_token: Option<&str>,
    ) -> Self {
        Self {
            signups: Arc::new(SignupService::new(store.clone())),
            stats: Arc::new(StatsService::new(store.clone())),
            listing: Arc::new(EntryListingService::new(store)),
            signup_rate_limiter,
            admin_token: admin_token.map(Arc::from),
        }
    }
}
