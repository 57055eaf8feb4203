//! Scheduled runs without any HTTP trigger.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};

mod common;

use common::Reply;

#[tokio::test]
async fn test_schedule_stores_records_on_its_own() {
    let replies: HashMap<String, Reply> = common::locations()
        .into_iter()
        .map(|loc| (loc, Reply::Json(json!(5))))
        .collect();

    let upstream = common::start_upstream(replies).await;
    let (store_url, store) = common::start_store(201, Value::Null).await;
    let mut config = common::config_for(&upstream, &store_url);
    config.schedule.enabled = true;
    config.schedule.interval_secs = 1;
    let (_addr, shutdown) = common::start_aggregator(config).await;

    // The first tick fires immediately; allow a few seconds on slow CI.
    for _ in 0..50 {
        if store.insert_count() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(store.insert_count() >= 1, "scheduler never inserted");
    assert_eq!(store.last_insert().as_array().unwrap().len(), 25);

    shutdown.trigger();
}

#[tokio::test]
async fn test_disabled_schedule_does_nothing() {
    let (store_url, store) = common::start_store(201, Value::Null).await;
    let config = common::config_for("http://127.0.0.1:9/member_visits_v2", &store_url);
    let (_addr, shutdown) = common::start_aggregator(config).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.insert_count(), 0);

    shutdown.trigger();
}
