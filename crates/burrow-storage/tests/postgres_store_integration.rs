use std::sync::Arc;
use std::time::Duration;

use burrow_core::{IndexStore, LinkStore, ShortCode, StorageError};
use burrow_storage::{IndexRegistry, LinkRepository, PgStore, ShardRouter, StorageSettings};
use burrow_test_infra::postgres::{PostgresConfig, PostgresServer};

struct Fixture {
    _postgres: PostgresServer,
    store: PgStore,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let store = connect_with_retry(&url).await;
        store.ensure_schema().await.expect("create schema");

        Self {
            _postgres: postgres,
            store,
        }
    }
}

async fn connect_with_retry(url: &str) -> PgStore {
    let mut last_error = None;

    for _ in 0..20 {
        match PgStore::connect(url).await {
            Ok(store) => return store,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn insert_returns_generated_id() {
    let fixture = Fixture::start().await;

    let first = fixture
        .store
        .insert_link(&code("abc123"), "https://example.com")
        .await
        .unwrap();
    let second = fixture
        .store
        .insert_link(&code("def456"), "https://example.org")
        .await
        .unwrap();

    assert!(second.id > first.id);
    let got = fixture.store.get_link(&code("abc123")).await.unwrap().unwrap();
    assert_eq!(got, first);
}

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn duplicate_codes_conflict() {
    let fixture = Fixture::start().await;

    fixture
        .store
        .insert_link(&code("abc123"), "https://one.example")
        .await
        .unwrap();
    let err = fixture
        .store
        .insert_link(&code("abc123"), "https://two.example")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    fixture.store.insert_entry(&code("abc123")).await.unwrap();
    let err = fixture.store.insert_entry(&code("abc123")).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn index_counts_hits() {
    let fixture = Fixture::start().await;
    let c = code("abc123");

    assert!(!fixture.store.entry_exists(&c).await.unwrap());
    assert!(!fixture.store.increment_hits(&c).await.unwrap());

    fixture.store.insert_entry(&c).await.unwrap();
    assert!(fixture.store.entry_exists(&c).await.unwrap());
    for _ in 0..3 {
        assert!(fixture.store.increment_hits(&c).await.unwrap());
    }
    assert_eq!(fixture.store.get_entry(&c).await.unwrap().unwrap().hit_count, 3);

    assert!(fixture.store.delete_entry(&c).await.unwrap());
    assert!(fixture.store.get_entry(&c).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running docker daemon"]
async fn routed_repositories_over_a_single_pool() {
    let fixture = Fixture::start().await;
    let router = Arc::new(ShardRouter::single(fixture.store.clone()));
    let settings = StorageSettings::default();
    let links = LinkRepository::new(Arc::clone(&router), settings.operation_timeout);
    let registry = IndexRegistry::new(router, settings);
    let c = code("Ab3dEf12");

    links.insert(&c, "https://example.com").await.unwrap();
    registry.register(&c).await.unwrap();
    assert!(registry.increment(&c).await.unwrap());

    assert_eq!(registry.count(&c).await.unwrap(), Some(1));
    assert!(links.delete(&c).await.unwrap());
    assert!(registry.unregister(&c).await.unwrap());
    assert!(links.get(&c).await.unwrap().is_none());
}
