pub mod config;
pub mod entry_listing_service;
pub mod error;
pub mod rate_limit_manager;
pub mod routes;
pub mod signup_service;
pub mod signup_validator;
pub mod sqlite_store;
pub mod state;
pub mod stats_service;
pub mod waitlist_entry;
pub mod waitlist_store;

#[cfg(test)]
mod tests;

pub use config::WaitlistConfig;
pub use entry_listing_service::EntryListingService;
pub use error::AppError;
pub use rate_limit_manager::{Clock, RateLimitManager, SystemClock};
pub use routes::router;
pub use signup_service::{SignupError, SignupReceipt, SignupService};
pub use signup_validator::{validate_signup, SignupRequest, ValidationError};
pub use sqlite_store::SqliteWaitlistStore;
pub use state::AppState;
pub use stats_service::{StatsService, WaitlistStats};
pub use waitlist_entry::{
    EntryStatus, FarmSize, FarmType, Interest, NewWaitlistEntry, NormalizedEmail, WaitlistEntry,
};
pub use waitlist_store::{
    CountFilter, GroupCount, GroupField, SortDirection, SortField, StoreError, WaitlistStore,
};
