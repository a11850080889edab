use super::{create_test_entry, create_test_store};
use crate::sqlite_store::SqliteWaitlistStore;
use crate::waitlist_entry::{FarmType, Interest};
use crate::waitlist_store::{
    CountFilter, GroupCount, GroupField, SortDirection, SortField, StoreError, WaitlistStore,
};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_insert_and_count() {
    let store = create_test_store();
    let now = Utc::now();

    let first = store
        .insert_unique(create_test_entry("a@b.com", FarmType::Fruit, Interest::Composting, now))
        .await
        .unwrap();
    let second = store
        .insert_unique(create_test_entry("c@d.com", FarmType::Grain, Interest::Composting, now))
        .await
        .unwrap();

    assert!(second > first);
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_email_rejected_by_index() {
    let store = create_test_store();
    let now = Utc::now();

    store
        .insert_unique(create_test_entry("a@b.com", FarmType::Fruit, Interest::Composting, now))
        .await
        .unwrap();
    let result = store
        .insert_unique(create_test_entry("A@B.com ", FarmType::Grain, Interest::SoilHealth, now))
        .await;

    assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_inserts_store_one_entry() {
    let store = create_test_store();
    let now = Utc::now();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_unique(create_test_entry(
                        "race@farm.io",
                        FarmType::Urban,
                        Interest::Sustainability,
                        now,
                    ))
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let inserted = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(StoreError::DuplicateEmail))))
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(duplicates, 9);
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_count_since_threshold() {
    let store = create_test_store();
    let now = Utc::now();

    for (email, age_days) in [("old@farm.io", 8), ("recent@farm.io", 1), ("today@farm.io", 0)] {
        store
            .insert_unique(create_test_entry(
                email,
                FarmType::Vegetable,
                Interest::Composting,
                now - TimeDelta::days(age_days),
            ))
            .await
            .unwrap();
    }

    let since = now - TimeDelta::days(7);
    assert_eq!(store.count(CountFilter::since(since)).await.unwrap(), 2);
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_group_by_orders_by_count_then_first_seen() {
    let store = create_test_store();
    let now = Utc::now();

    let rows = [
        ("1@f.io", FarmType::Grain),
        ("2@f.io", FarmType::Fruit),
        ("3@f.io", FarmType::Livestock),
        ("4@f.io", FarmType::Livestock),
        ("5@f.io", FarmType::Fruit),
        ("6@f.io", FarmType::Livestock),
    ];
    for (email, farm_type) in rows {
        store
            .insert_unique(create_test_entry(email, farm_type, Interest::Composting, now))
            .await
            .unwrap();
    }

    let groups = store.group_by(GroupField::FarmType).await.unwrap();
    assert_eq!(
        groups,
        vec![
            GroupCount { value: "livestock".to_string(), count: 3 },
            GroupCount { value: "fruit".to_string(), count: 2 },
            GroupCount { value: "grain".to_string(), count: 1 },
        ]
    );

    let statuses = store.group_by(GroupField::Status).await.unwrap();
    assert_eq!(statuses, vec![GroupCount { value: "active".to_string(), count: 6 }]);
}

#[tokio::test]
async fn test_group_by_ties_keep_insertion_order() {
    let store = create_test_store();
    let now = Utc::now();

    for (email, interest) in [
        ("1@f.io", Interest::YieldPrediction),
        ("2@f.io", Interest::PestManagement),
        ("3@f.io", Interest::AiOptimization),
    ] {
        store
            .insert_unique(create_test_entry(email, FarmType::Other, interest, now))
            .await
            .unwrap();
    }

    let values: Vec<String> = store
        .group_by(GroupField::Interests)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.value)
        .collect();
    assert_eq!(values, vec!["yield-prediction", "pest-management", "ai-optimization"]);
}

#[tokio::test]
async fn test_group_by_on_empty_store() {
    let store = create_test_store();
    assert!(store.group_by(GroupField::FarmType).await.unwrap().is_empty());
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_all_sorted_by_signup_date() {
    let store = create_test_store();
    let now = Utc::now();

    for (email, age_days) in [("mid@f.io", 2), ("new@f.io", 0), ("old@f.io", 5)] {
        store
            .insert_unique(create_test_entry(
                email,
                FarmType::Greenhouse,
                Interest::WaterManagement,
                now - TimeDelta::days(age_days),
            ))
            .await
            .unwrap();
    }

    let newest_first: Vec<String> = store
        .list_all(SortField::SignupDate, SortDirection::Descending)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.email.to_string())
        .collect();
    assert_eq!(newest_first, vec!["new@f.io", "mid@f.io", "old@f.io"]);

    let oldest_first: Vec<String> = store
        .list_all(SortField::SignupDate, SortDirection::Ascending)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.email.to_string())
        .collect();
    assert_eq!(oldest_first, vec!["old@f.io", "mid@f.io", "new@f.io"]);
}

#[tokio::test]
async fn test_list_all_round_trips_entry_fields() {
    let store = create_test_store();
    let signup_date = Utc::now() - TimeDelta::hours(3);
    let entry = create_test_entry("a@b.com", FarmType::Livestock, Interest::SoilHealth, signup_date);

    let id = store.insert_unique(entry.clone()).await.unwrap();
    let listed = store
        .list_all(SortField::Email, SortDirection::Ascending)
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    let stored = &listed[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.email, entry.email);
    assert_eq!(stored.name, entry.name);
    assert_eq!(stored.farm_type, FarmType::Livestock);
    assert_eq!(stored.interests, Interest::SoilHealth);
    assert_eq!(
        stored.signup_date.timestamp_millis(),
        signup_date.timestamp_millis()
    );
}

#[tokio::test]
async fn test_file_store_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("waitlist.db");
    let now = Utc::now();

    {
        let store = SqliteWaitlistStore::open(&db_path).unwrap();
        store
            .insert_unique(create_test_entry("a@b.com", FarmType::Fruit, Interest::Composting, now))
            .await
            .unwrap();
    }

    let store: Arc<dyn WaitlistStore> = Arc::new(SqliteWaitlistStore::open(&db_path).unwrap());
    assert_eq!(store.count(CountFilter::all()).await.unwrap(), 1);

    let result = store
        .insert_unique(create_test_entry("a@b.com", FarmType::Grain, Interest::Composting, now))
        .await;
    assert!(matches!(result, Err(StoreError::DuplicateEmail)));
}
