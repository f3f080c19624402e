use std::time::Duration;

use qrbridge_core::{Group, MappingId, NewMapping, RandomLink};
use qrbridge_storage::{
    GroupRepository, MappingRepository, PostgresRepository, ReadRepository, StorageError,
};
use qrbridge_test_infra::postgres::{PostgresConfig, PostgresServer};
use sqlx::postgres::PgPoolOptions;

struct Fixture {
    _postgres: PostgresServer,
    repo: PostgresRepository,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let pool = connect_with_retry(&url).await;

        let repo = PostgresRepository::new(pool);
        repo.migrate().await.expect("create schema");

        Self {
            _postgres: postgres,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::PgPool {
    let mut last_error = None;

    for _ in 0..20 {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn new_mapping(link: &str, url: &str, group: Option<&str>) -> NewMapping {
    NewMapping {
        random_link: RandomLink::new_unchecked(link),
        website_link: url.to_string(),
        group_name: group.map(str::to_string),
    }
}

fn group(name: &str) -> Group {
    Group {
        name: name.to_string(),
        image_url: None,
    }
}

#[tokio::test]
async fn insert_and_resolve_mapping() {
    let fixture = Fixture::start().await;

    let mapping = fixture
        .repo
        .insert_mapping(new_mapping("ab12xy", "https://example.com", None))
        .await
        .unwrap();
    assert_eq!(mapping.random_link.as_str(), "ab12xy");
    assert_eq!(mapping.website_link, "https://example.com");

    let destination = fixture
        .repo
        .find_destination(&RandomLink::new_unchecked("ab12xy"))
        .await
        .unwrap();
    assert_eq!(destination.as_deref(), Some("https://example.com"));

    let stored = fixture.repo.get_mapping(mapping.id).await.unwrap().unwrap();
    assert_eq!(stored, mapping);
}

#[tokio::test]
async fn insert_conflicts_when_link_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert_mapping(new_mapping("ab12xy", "https://one.example", None))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert_mapping(new_mapping("ab12xy", "https://two.example", None))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn list_orders_newest_first() {
    let fixture = Fixture::start().await;

    for link in ["first", "second", "third"] {
        fixture
            .repo
            .insert_mapping(new_mapping(link, "https://example.com", None))
            .await
            .unwrap();
    }

    let links: Vec<String> = fixture
        .repo
        .list_mappings()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.random_link.to_string())
        .collect();
    assert_eq!(links, ["third", "second", "first"]);
}

#[tokio::test]
async fn updates_are_visible_on_refetch() {
    let fixture = Fixture::start().await;
    let mapping = fixture
        .repo
        .insert_mapping(new_mapping("ab12xy", "https://old.example", Some("A")))
        .await
        .unwrap();

    assert!(fixture
        .repo
        .update_destination(mapping.id, "https://new.example")
        .await
        .unwrap());
    assert!(fixture
        .repo
        .update_group(mapping.id, Some("B"))
        .await
        .unwrap());
    assert!(!fixture
        .repo
        .update_destination(MappingId::new(424242), "https://x.example")
        .await
        .unwrap());

    let stored = fixture.repo.get_mapping(mapping.id).await.unwrap().unwrap();
    assert_eq!(stored.website_link, "https://new.example");
    assert_eq!(stored.group_name.as_deref(), Some("B"));
}

#[tokio::test]
async fn deleting_a_group_in_two_steps() {
    let fixture = Fixture::start().await;
    fixture.repo.insert_group(group("Marketing")).await.unwrap();
    fixture.repo.insert_group(group("Products")).await.unwrap();
    fixture
        .repo
        .insert_mapping(new_mapping("m1", "https://a.example", Some("Marketing")))
        .await
        .unwrap();
    fixture
        .repo
        .insert_mapping(new_mapping("m2", "https://b.example", Some("Marketing")))
        .await
        .unwrap();
    fixture
        .repo
        .insert_mapping(new_mapping("p1", "https://c.example", Some("Products")))
        .await
        .unwrap();

    let removed = fixture
        .repo
        .delete_mappings_in_group("Marketing")
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(fixture.repo.delete_group("Marketing").await.unwrap());

    let groups = fixture.repo.list_groups().await.unwrap();
    assert_eq!(groups, vec![group("Products")]);
    let mappings = fixture.repo.list_mappings().await.unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].random_link.as_str(), "p1");
}

#[tokio::test]
async fn duplicate_group_names_conflict() {
    let fixture = Fixture::start().await;
    fixture.repo.insert_group(group("General")).await.unwrap();

    let err = fixture
        .repo
        .insert_group(group("General"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn probe_succeeds_on_empty_and_populated_tables() {
    let fixture = Fixture::start().await;
    assert_eq!(fixture.repo.probe().await.unwrap(), None);

    let mapping = fixture
        .repo
        .insert_mapping(new_mapping("ab12xy", "https://example.com", None))
        .await
        .unwrap();
    assert_eq!(fixture.repo.probe().await.unwrap(), Some(mapping.id));
}
