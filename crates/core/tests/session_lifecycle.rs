//! End-to-end session lifecycle against the in-memory store.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use common::{cookie_header, memory_manager, test_config, test_ttl};
use gymstew_core::memory::MemorySessionStore;
use gymstew_core::store::SessionStore;
use gymstew_core::SessionManager;

#[tokio::test]
async fn test_login_authenticate_logout() {
    let manager = memory_manager();

    let set_cookie = manager.login(42).await.unwrap();
    let header = cookie_header(&set_cookie);
    assert_eq!(manager.authenticate(Some(&header)).await.unwrap(), Some(42));

    let cleared = manager.logout(Some(&header)).await;
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(manager.authenticate(Some(&header)).await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_twice_is_noop() {
    let manager = memory_manager();
    let header = cookie_header(&manager.login(7).await.unwrap());

    let first = manager.logout(Some(&header)).await;
    let second = manager.logout(Some(&header)).await;
    assert_eq!(first, second, "both calls clear the cookie the same way");
    assert!(manager.store().is_empty());
}

#[tokio::test]
async fn test_logout_with_garbage_cookie_still_clears() {
    let manager = memory_manager();
    let keep = cookie_header(&manager.login(1).await.unwrap());

    for header in [None, Some("session=garbage"), Some("session=a.b"), Some("")] {
        let cleared = manager.logout(header).await;
        assert!(cleared.starts_with("session=;"));
    }
    assert_eq!(manager.authenticate(Some(&keep)).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_cookie_past_ttl_is_anonymous() {
    let manager = memory_manager();
    let header = cookie_header(&manager.login(42).await.unwrap());
    let later = Utc::now() + test_ttl() + chrono::Duration::seconds(1);
    assert_eq!(manager.authenticate_at(Some(&header), later).await.unwrap(), None);
}

#[tokio::test]
async fn test_sessions_are_shared_across_replicas() {
    // Two managers over one store with one secret behave as a single service.
    let store = Arc::new(MemorySessionStore::new());
    let a = SessionManager::new(&test_config(), Arc::clone(&store));
    let b = SessionManager::new(&test_config(), Arc::clone(&store));

    let header = cookie_header(&a.login(11).await.unwrap());
    assert_eq!(b.authenticate(Some(&header)).await.unwrap(), Some(11));
    b.logout(Some(&header)).await;
    assert_eq!(a.authenticate(Some(&header)).await.unwrap(), None);
}

#[tokio::test]
async fn test_multiple_devices_per_user() {
    let manager = memory_manager();
    let phone = cookie_header(&manager.login(5).await.unwrap());
    let laptop = cookie_header(&manager.login(5).await.unwrap());
    assert_ne!(phone, laptop);

    manager.logout(Some(&phone)).await;
    assert_eq!(manager.authenticate(Some(&phone)).await.unwrap(), None);
    assert_eq!(manager.authenticate(Some(&laptop)).await.unwrap(), Some(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_yield_distinct_ids() {
    const CALLERS: usize = 256;
    let store = Arc::new(MemorySessionStore::new());

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(i as i64).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        assert!(ids.insert(record.id), "duplicate session id {}", record.id);
    }

    assert_eq!(ids.len(), CALLERS);
    assert_eq!(store.len(), CALLERS, "no write was lost");
    for id in ids {
        assert!(store.read(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_purge_expired_keeps_live_sessions() {
    let manager = memory_manager();
    let header = cookie_header(&manager.login(8).await.unwrap());
    assert_eq!(manager.purge_expired().await.unwrap(), 0);
    assert_eq!(manager.authenticate(Some(&header)).await.unwrap(), Some(8));
}
