use crate::waitlist_entry::WaitlistEntry;
use crate::waitlist_store::{SortDirection, SortField, StoreError, WaitlistStore};
use std::sync::Arc;

/// Admin view of the waitlist: every entry, newest signup first
pub struct EntryListingService {
    store: Arc<dyn WaitlistStore>,
}

impl EntryListingService {
    pub fn new(store: Arc<dyn WaitlistStore>) -> Self {
        Self { store }
    }

    pub async fn list_entries(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        self.store
            .list_all(SortField::SignupDate, SortDirection::Descending)
            .await
    }
}
