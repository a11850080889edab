//! Aggregate waitlist statistics

use crate::waitlist_store::{CountFilter, GroupCount, GroupField, StoreError, WaitlistStore};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Length of the trailing window reported as `thisWeek`
pub const TRAILING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistStats {
    pub total_signups: u64,
    pub this_week: u64,
    pub farm_type_stats: Vec<GroupCount>,
    pub interest_stats: Vec<GroupCount>,
}

pub struct StatsService {
    store: Arc<dyn WaitlistStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn WaitlistStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<WaitlistStats, StoreError> {
        self.stats_at(Utc::now()).await
    }

    /// Statistics as seen at `now`. The four figures are independent reads
    /// and are not a consistent snapshot of each other.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<WaitlistStats, StoreError> {
        let week_ago = now - TimeDelta::days(TRAILING_WINDOW_DAYS);

        Ok(WaitlistStats {
            total_signups: self.store.count(CountFilter::all()).await?,
            this_week: self.store.count(CountFilter::since(week_ago)).await?,
            farm_type_stats: self.store.group_by(GroupField::FarmType).await?,
            interest_stats: self.store.group_by(GroupField::Interests).await?,
        })
    }
}
