mod error_tests;
mod sqlite_store_tests;

use crate::signup_validator::SignupRequest;
use crate::sqlite_store::SqliteWaitlistStore;
use crate::waitlist_entry::{
    EntryStatus, FarmSize, FarmType, Interest, NewWaitlistEntry, NormalizedEmail,
};
use crate::waitlist_store::WaitlistStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub(crate) fn create_test_store() -> Arc<dyn WaitlistStore> {
    Arc::new(SqliteWaitlistStore::open_in_memory().unwrap())
}

pub(crate) fn create_test_request(email: &str) -> SignupRequest {
    SignupRequest {
        email: Some(email.to_string()),
        name: Some("Ann".to_string()),
        farm_type: Some("vegetable".to_string()),
        farm_size: Some("small".to_string()),
        interests: Some("composting".to_string()),
    }
}

pub(crate) fn create_test_entry(
    email: &str,
    farm_type: FarmType,
    interests: Interest,
    signup_date: DateTime<Utc>,
) -> NewWaitlistEntry {
    NewWaitlistEntry {
        email: NormalizedEmail::parse(email).unwrap(),
        name: format!("Farmer {email}"),
        farm_type,
        farm_size: FarmSize::Medium,
        interests,
        signup_date,
        status: EntryStatus::Active,
    }
}
