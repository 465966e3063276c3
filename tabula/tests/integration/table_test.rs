use chrono::NaiveDate;
use serde_json::json;
use tabula::prelude::*;
use tabula::test_utils::memory_connection::MemoryConnection;
use tabula::test_utils::schema::{PEOPLE_TABLE, people_and_pets_schema, people_schema, person};
use tabula_telemetry::init_test_tracing;

fn born() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

async fn people_database() -> (Database<MemoryConnection>, MemoryConnection) {
    let connection = MemoryConnection::new();
    let database = Database::new(connection.clone(), CacheTtl::default(), people_schema())
        .await
        .unwrap();
    connection.clear_statements().await;

    (database, connection)
}

#[tokio::test]
async fn insert_binds_unpadded_dates() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    people
        .insert(person(1, "Dave", Some(born())))
        .await
        .unwrap();

    let statements = connection.statements().await;
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].sql,
        "INSERT INTO people (id, name, born) VALUES (?, ?, ?)"
    );
    assert_eq!(
        statements[0].params,
        vec![
            BackendValue::Int(1),
            BackendValue::from("Dave"),
            BackendValue::from("1990-1-1"),
        ]
    );
}

#[tokio::test]
async fn get_decodes_inserted_row() {
    init_test_tracing();
    let (database, _connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    people
        .insert(person(1, "Dave", Some(born())))
        .await
        .unwrap();

    let dave = people.get(1).await.unwrap().unwrap();
    assert_eq!(dave, person(1, "Dave", Some(born())));
    assert_eq!(dave.get("born"), Some(&Value::Date(born())));

    assert_eq!(people.get(2).await.unwrap(), None);
}

#[tokio::test]
async fn insert_requires_every_required_column() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    let err = people
        .insert(Row::new().with("id", 1).with("born", born()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = people
        .insert(Row::new().with("id", 1).with("name", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    assert!(connection.statements().await.is_empty());

    // Optional columns may be left out.
    people
        .insert(Row::new().with("id", 1).with("name", "Dave"))
        .await
        .unwrap();
    assert_eq!(
        people.get(1).await.unwrap(),
        Some(Row::new().with("id", 1).with("name", "Dave").with("born", Value::Null))
    );
}

#[tokio::test]
async fn insert_rejects_unknown_columns() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    let err = people
        .insert(person(1, "Dave", None).with("age", 34))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::QueryError);
    assert!(connection.statements().await.is_empty());
}

#[tokio::test]
async fn get_all_rejects_primary_key_and_unknown_columns() {
    init_test_tracing();
    let (database, _connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    let err = people.get_all("id", 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);

    let err = people.get_all("age", 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
}

#[tokio::test]
async fn get_all_returns_every_match() {
    init_test_tracing();
    let (database, _connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    people.insert(person(1, "Dave", None)).await.unwrap();
    people.insert(person(2, "Dave", Some(born()))).await.unwrap();
    people.insert(person(3, "Bob", None)).await.unwrap();

    let daves = people.get_all("name", "Dave").await.unwrap();
    let ids = daves
        .iter()
        .map(|row| row.get("id").and_then(Value::as_i64).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2]);

    let born_in_1990 = people.get_all("born", born()).await.unwrap();
    assert_eq!(born_in_1990, vec![person(2, "Dave", Some(born()))]);
}

#[tokio::test]
async fn update_changes_only_supplied_columns() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people
        .insert(person(1, "Dave", Some(born())))
        .await
        .unwrap();

    let affected = people
        .update(Row::new().with("id", 1).with("name", "David"))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let statements = connection.statements().await;
    let update = statements.last().unwrap();
    assert_eq!(update.sql, "UPDATE people SET name = ? WHERE id = ?");
    assert_eq!(
        update.params,
        vec![BackendValue::from("David"), BackendValue::Int(1)]
    );

    assert_eq!(
        people.get(1).await.unwrap(),
        Some(person(1, "David", Some(born())))
    );
}

#[tokio::test]
async fn update_requires_primary_key_and_a_change() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    let err = people
        .update(Row::new().with("name", "David"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = people.update(Row::new().with("id", 1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let err = people
        .update(Row::new().with("id", 1).with("name", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    assert!(connection.statements().await.is_empty());
}

#[tokio::test]
async fn delete_removes_row() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();

    assert_eq!(people.delete(1).await.unwrap(), 1);
    assert_eq!(people.delete(1).await.unwrap(), 0);

    assert_eq!(people.get(1).await.unwrap(), None);
    assert!(connection.rows(PEOPLE_TABLE).await.is_empty());
}

#[tokio::test]
async fn json_and_boolean_columns_round_trip() {
    init_test_tracing();
    let connection = MemoryConnection::new();
    let database = Database::new(
        connection.clone(),
        CacheTtl::default(),
        people_and_pets_schema(),
    )
    .await
    .unwrap();
    let pets = database.table("pets").unwrap();

    let rex = Row::new()
        .with("tag", "rex")
        .with("owner", 1)
        .with("chip", "123456789012345")
        .with("vaccinated", true)
        .with("details", json!({"breed": "beagle", "toys": ["ball"]}));
    pets.insert(rex.clone()).await.unwrap();

    let stored = connection.rows("pets").await;
    assert_eq!(stored[0].get("vaccinated"), Some(&BackendValue::Int(1)));
    assert_eq!(
        stored[0].get("details"),
        Some(&BackendValue::from(r#"{"breed":"beagle","toys":["ball"]}"#))
    );

    assert_eq!(pets.get("rex").await.unwrap(), Some(rex.clone()));
    assert_eq!(pets.get_all("vaccinated", true).await.unwrap(), vec![rex]);
}

#[tokio::test]
async fn backend_errors_surface_as_query_errors() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();

    let err = people.insert(person(1, "Bob", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);

    connection
        .fail_next(tabula_error!(ErrorKind::QueryError, "Lost connection"))
        .await;
    let err = people.get(1).await.unwrap_err();
    assert_eq!(err.description(), "Lost connection");
}

#[tokio::test]
async fn mismatched_values_are_codec_errors() {
    init_test_tracing();
    let (database, connection) = people_database().await;
    let people = database.table(PEOPLE_TABLE).unwrap();

    let err = people
        .insert(Row::new().with("id", "one").with("name", "Dave"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CodecError);

    let err = people.get(true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CodecError);

    assert!(connection.statements().await.is_empty());
}
