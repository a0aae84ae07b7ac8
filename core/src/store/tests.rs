use super::*;
use crate::pagination::{PageRequest, Paginator};

fn fixture_directory() -> UserDirectory {
    let mut directory = UserDirectory::new();
    let users = [
        (1u64, 50.0, 50.0),
        (2, 50.0, 51.0),
        (3, 50.5, 50.2),
        (4, 49.5, 50.4),
        (5, 49.7, 50.123_456),
        (6, 49.9, 50.05),
    ];
    for (id, latitude, longitude) in users {
        directory
            .register_user(id, format!("user{id}"), format!("user{id}@example.com"), true)
            .expect("user must register");
        directory
            .update_location(id, latitude, longitude)
            .expect("location must be stored");
    }
    directory
        .register_user(7, "nowhere", "nowhere@example.com", true)
        .expect("user must register");
    directory
}

#[test]
fn fetch_origin_returns_point_or_none() {
    let directory = fixture_directory();
    let origin = directory
        .fetch_origin(1)
        .expect("read must succeed")
        .expect("origin must exist");
    assert_eq!(origin.owner_id, 1);

    assert_eq!(directory.fetch_origin(7).expect("read must succeed"), None);
    assert_eq!(directory.fetch_origin(99).expect("read must succeed"), None);
}

#[test]
fn fetch_candidates_returns_window_and_full_count() {
    let directory = fixture_directory();
    let origin = directory
        .fetch_origin(1)
        .expect("read must succeed")
        .expect("origin must exist");
    let query = ProximityQuery::around(origin, 100.0);
    let window = Paginator::new(100).window(PageRequest::new(2, 2));

    let slice = directory
        .fetch_candidates(&query, window)
        .expect("read must succeed");
    assert_eq!(slice.total, 5);
    let owners: Vec<OwnerId> = slice.hits.iter().map(|hit| hit.owner_id).collect();
    assert_eq!(owners, vec![3, 4]);
    assert!(slice.hits.iter().all(|hit| hit.item.id == hit.owner_id));
}

#[test]
fn shared_directory_reads_through_lock() {
    let shared = SharedDirectory::new(fixture_directory());
    let origin = shared
        .fetch_origin(6)
        .expect("read must succeed")
        .expect("origin must exist");
    let query = ProximityQuery::around(origin, 20.0);
    let window = Paginator::default().window(PageRequest::new(1, 10));

    let slice = shared
        .fetch_candidates(&query, window)
        .expect("read must succeed");
    assert_eq!(slice.total, 1);
    assert_eq!(slice.hits[0].owner_id, 1);

    shared
        .write()
        .expect("write lock must be available")
        .update_location(2, 49.9, 50.06)
        .expect("update must succeed");
    let slice = shared
        .fetch_candidates(&query, window)
        .expect("read must succeed");
    assert_eq!(slice.total, 2);
}

#[test]
fn poisoned_lock_reports_unavailable() {
    let shared = SharedDirectory::new(fixture_directory());
    let poisoner = shared.clone();
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.write().expect("write lock must be available");
        panic!("poison the directory lock");
    })
    .join();

    let error = shared
        .fetch_origin(1)
        .expect_err("poisoned lock must fail");
    assert!(matches!(error, StoreError::Unavailable(_)));
}
