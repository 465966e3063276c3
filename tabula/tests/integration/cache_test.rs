use std::sync::Arc;
use std::time::Duration;

use tabula::prelude::*;
use tabula::test_utils::memory_connection::MemoryConnection;
use tabula::test_utils::schema::{PEOPLE_TABLE, people_schema, person};
use tabula_telemetry::init_test_tracing;

async fn people_database(ttl: CacheTtl) -> (Database<MemoryConnection>, MemoryConnection) {
    let connection = MemoryConnection::new();
    let database = Database::new(connection.clone(), ttl, people_schema())
        .await
        .unwrap();

    (database, connection)
}

#[tokio::test]
async fn repeated_reads_hit_the_cache_until_a_write() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::from_secs(Some(300))).await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();

    let first = people.get_all("name", "Dave").await.unwrap();
    let second = people.get_all("name", "Dave").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(connection.executed("SELECT").await, 1);

    people
        .update(Row::new().with("id", 1).with("name", "David"))
        .await
        .unwrap();

    let after = people.get_all("name", "Dave").await.unwrap();
    assert!(after.is_empty());
    assert_eq!(connection.executed("SELECT").await, 2);
}

#[tokio::test]
async fn get_results_are_cached_including_misses() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::default()).await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    assert_eq!(people.get(1).await.unwrap(), None);
    assert_eq!(people.get(1).await.unwrap(), None);
    assert_eq!(connection.executed("SELECT").await, 1);

    // The insert invalidates the cached miss.
    people.insert(person(1, "Dave", None)).await.unwrap();
    assert_eq!(
        people.get(1).await.unwrap(),
        Some(person(1, "Dave", None))
    );
    assert_eq!(connection.executed("SELECT").await, 2);
}

#[tokio::test]
async fn different_parameters_are_cached_separately() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::default()).await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();
    people.insert(person(2, "Bob", None)).await.unwrap();

    people.get(1).await.unwrap();
    people.get(2).await.unwrap();
    people.get(1).await.unwrap();

    assert_eq!(connection.executed("SELECT").await, 2);
    assert_eq!(database.cache().len().await, 2);
}

#[tokio::test(start_paused = true)]
async fn entries_expire_after_the_ttl() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::from_secs(Some(60))).await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();

    people.get(1).await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    people.get(1).await.unwrap();
    assert_eq!(connection.executed("SELECT").await, 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    people.get(1).await.unwrap();
    assert_eq!(connection.executed("SELECT").await, 2);
}

#[tokio::test(start_paused = true)]
async fn expired_entries_do_not_accumulate_on_read_only_tables() {
    init_test_tracing();
    let (database, _connection) = people_database(CacheTtl::from_secs(Some(1))).await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    for id in 0..100 {
        assert_eq!(people.get(id).await.unwrap(), None);
    }
    assert_eq!(database.cache().len().await, 100);

    tokio::time::advance(Duration::from_secs(3600)).await;
    people.get(100).await.unwrap();

    assert_eq!(database.cache().len().await, 1);
}

#[tokio::test]
async fn negative_ttl_disables_the_cache() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::from_secs(Some(-1))).await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();

    people.get(1).await.unwrap();
    people.get(1).await.unwrap();

    assert_eq!(connection.executed("SELECT").await, 2);
    assert!(database.cache().is_empty().await);
}

#[tokio::test]
async fn failed_writes_keep_the_cache() {
    init_test_tracing();
    let (database, connection) = people_database(CacheTtl::default()).await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();
    people.get(1).await.unwrap();

    connection
        .fail_next(tabula_error!(ErrorKind::QueryError, "Lock wait timeout"))
        .await;
    assert!(people.delete(1).await.is_err());

    assert_eq!(
        people.get(1).await.unwrap(),
        Some(person(1, "Dave", None))
    );
    assert_eq!(connection.executed("SELECT").await, 1);
}

#[tokio::test]
async fn writes_only_invalidate_their_own_table() {
    init_test_tracing();
    let connection = MemoryConnection::new();
    let database = Database::new(
        connection.clone(),
        CacheTtl::default(),
        tabula::test_utils::schema::people_and_pets_schema(),
    )
    .await
    .unwrap();
    let people = database.table(PEOPLE_TABLE).unwrap();
    let pets = database.table("pets").unwrap();

    people.get(1).await.unwrap();
    pets.get("rex").await.unwrap();
    pets.delete("rex").await.unwrap();
    people.get(1).await.unwrap();
    pets.get("rex").await.unwrap();

    assert_eq!(connection.executed("SELECT id").await, 1);
    assert_eq!(connection.executed("SELECT tag").await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_are_all_visible() {
    init_test_tracing();
    let (database, _connection) = people_database(CacheTtl::default()).await;
    let database = Arc::new(database);

    // Prime the cache so both inserts have something to invalidate.
    assert!(
        database
            .table(PEOPLE_TABLE)
            .unwrap()
            .get_all("name", "Dave")
            .await
            .unwrap()
            .is_empty()
    );

    let mut handles = Vec::new();
    for id in 1..=2 {
        let database = database.clone();
        handles.push(tokio::spawn(async move {
            database
                .table(PEOPLE_TABLE)?
                .insert(person(id, "Dave", None))
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }

    let daves = database
        .table(PEOPLE_TABLE)
        .unwrap()
        .get_all("name", "Dave")
        .await
        .unwrap();
    assert_eq!(daves.len(), 2);
}
