//! Integration tests for the container registry.
//!
//! These exercise the registry through its public API only:
//! 1. Add / get / remove lifecycle
//! 2. Ordering of listings
//! 3. Exact-match filters

#![allow(clippy::expect_used, clippy::unwrap_used)]

use berth_common::error::BerthError;
use berth_common::types::{ContainerConfig, ListFilter, NewContainer, RecordId};
use berth_registry::Registry;

fn open() -> (tempfile::TempDir, Registry) {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = Registry::open(dir.path().join("registry.json")).expect("open");
    (dir, registry)
}

fn names(records: &[ContainerConfig]) -> Vec<&str> {
    records.iter().map(|c| c.name.as_str()).collect()
}

// ── Lifecycle ────────────────────────────────────────────────────────

#[test]
fn add_get_remove_roundtrip() {
    let (_dir, registry) = open();

    let added = registry
        .add(NewContainer::new("test", "test:latest").host("test.com"))
        .expect("add");
    let expected = ContainerConfig {
        id: RecordId::new(1),
        name: "test".into(),
        image: "test:latest".into(),
        host: Some("test.com".into()),
        ports: String::new(),
        volumes: String::new(),
    };
    assert_eq!(added, expected);
    assert_eq!(registry.list(&ListFilter::default()).expect("list"), vec![expected.clone()]);
    assert_eq!(registry.get("test").expect("get"), Some(expected));

    registry.remove("test").expect("remove");
    assert!(registry.list(&ListFilter::default()).expect("list").is_empty());

    let err = registry.remove("test").unwrap_err();
    assert!(matches!(err, BerthError::NotFound { .. }));
}

// ── Ordering ─────────────────────────────────────────────────────────

#[test]
fn list_is_sorted_by_name() {
    let (_dir, registry) = open();
    for (name, host) in [("zest", "zest.com"), ("best", "best.com"), ("test", "test.com")] {
        let _ = registry
            .add(NewContainer::new(name, "test:latest").host(host))
            .expect("add");
    }

    let listed = registry.list(&ListFilter::default()).expect("list");
    assert_eq!(names(&listed), vec!["best", "test", "zest"]);
    let ids: Vec<u64> = listed.iter().map(|c| c.id.get()).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

// ── Filters ──────────────────────────────────────────────────────────

#[test]
fn list_filters_by_name_image_or_host() {
    let (_dir, registry) = open();
    for name in ["zest", "best", "test"] {
        let _ = registry
            .add(NewContainer::new(name, format!("{name}:latest")).host(format!("{name}.com")))
            .expect("add");
    }

    let by_name = registry
        .list(&ListFilter {
            name: Some("zest".into()),
            ..ListFilter::default()
        })
        .expect("by name");
    assert_eq!(names(&by_name), vec!["zest"]);

    let by_image = registry
        .list(&ListFilter {
            image: Some("test:latest".into()),
            ..ListFilter::default()
        })
        .expect("by image");
    assert_eq!(names(&by_image), vec!["test"]);

    let by_host = registry
        .list(&ListFilter {
            host: Some("best.com".into()),
            ..ListFilter::default()
        })
        .expect("by host");
    assert_eq!(names(&by_host), vec!["best"]);
}

#[test]
fn combined_filter_requires_every_field() {
    let (_dir, registry) = open();
    let _ = registry.add(NewContainer::new("a", "shared:1")).expect("add a");
    let _ = registry.add(NewContainer::new("b", "shared:1")).expect("add b");

    let filter = ListFilter {
        name: Some("b".into()),
        image: Some("shared:1".into()),
        host: None,
    };
    assert_eq!(names(&registry.list(&filter).expect("list")), vec!["b"]);

    let mismatch = ListFilter {
        name: Some("b".into()),
        image: Some("other".into()),
        host: None,
    };
    assert!(registry.list(&mismatch).expect("list").is_empty());
}
