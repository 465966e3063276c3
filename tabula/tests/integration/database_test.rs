use tabula::prelude::*;
use tabula::test_utils::memory_connection::MemoryConnection;
use tabula::test_utils::schema::{
    PEOPLE_TABLE, people_and_pets_schema, people_schema, people_table_schema, person,
};
use tabula_telemetry::init_test_tracing;

#[tokio::test]
async fn construction_creates_every_table() {
    init_test_tracing();
    let connection = MemoryConnection::new();

    let database = Database::new(
        connection.clone(),
        CacheTtl::default(),
        people_and_pets_schema(),
    )
    .await
    .unwrap();

    let statements = connection.statements().await;
    assert_eq!(statements.len(), 2);

    let people = &statements[0].sql;
    assert!(people.starts_with("CREATE TABLE IF NOT EXISTS people ("));
    assert!(people.contains("id int NOT NULL"));
    assert!(people.contains("name varChar(100) NOT NULL"));
    assert!(people.contains("born date"));
    assert!(!people.contains("born date NOT NULL"));
    assert!(people.contains("PRIMARY KEY (id)"));

    let pets = &statements[1].sql;
    assert!(pets.contains("chip char(15) NOT NULL UNIQUE"));
    assert!(pets.contains("PRIMARY KEY (tag)"));

    let names = database.tables().map(Table::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["people", "pets"]);
}

#[tokio::test]
async fn construction_is_idempotent() {
    init_test_tracing();
    let connection = MemoryConnection::new();

    let first = Database::new(connection.clone(), CacheTtl::default(), people_schema())
        .await
        .unwrap();
    first
        .table(PEOPLE_TABLE)
        .unwrap()
        .insert(person(1, "Dave", None))
        .await
        .unwrap();

    let second = Database::new(connection.clone(), CacheTtl::default(), people_schema())
        .await
        .unwrap();
    assert_eq!(
        second.table(PEOPLE_TABLE).unwrap().get(1).await.unwrap(),
        Some(person(1, "Dave", None))
    );
}

#[tokio::test]
async fn invalid_schemas_fail_before_any_statement() {
    init_test_tracing();
    let schemas = [
        DatabaseSchema::new().table("people", RawTableSchema::new().column("id", "int")),
        DatabaseSchema::new().table(
            "people",
            RawTableSchema::new()
                .column("id", "primary int")
                .column("other", "primary int"),
        ),
        DatabaseSchema::new().table(
            "people",
            people_table_schema().column("_secret", "text"),
        ),
        DatabaseSchema::new().table("close", people_table_schema()),
        people_schema().table(PEOPLE_TABLE, people_table_schema()),
        // A valid table declared before an invalid one is not created either.
        people_schema().table("pets", RawTableSchema::new().column("tag", "primary blob")),
    ];

    for schema in schemas {
        let connection = MemoryConnection::new();

        let err = Database::new(connection.clone(), CacheTtl::default(), schema)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SchemaError);
        assert!(connection.statements().await.is_empty());
    }
}

#[tokio::test]
async fn schema_can_be_declared_in_json() {
    init_test_tracing();
    let schema: DatabaseSchema = serde_json::from_str(
        r#"{
            "people": {
                "id": "primary int",
                "name": ["varChar", 100],
                "born": "optional date"
            }
        }"#,
    )
    .unwrap();
    assert_eq!(schema, people_schema());

    let connection = MemoryConnection::new();
    Database::new(connection.clone(), CacheTtl::default(), schema)
        .await
        .unwrap();

    assert_eq!(
        connection.statements().await[0].sql,
        "CREATE TABLE IF NOT EXISTS people (id int NOT NULL, name varChar(100) NOT NULL, \
         born date, PRIMARY KEY (id))"
    );
}

#[tokio::test]
async fn unknown_tables_are_query_errors() {
    init_test_tracing();
    let database = Database::new(MemoryConnection::new(), CacheTtl::default(), people_schema())
        .await
        .unwrap();

    let err = database.table("pets").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::QueryError);
}

#[tokio::test]
async fn execute_passes_statements_through() {
    init_test_tracing();
    let connection = MemoryConnection::new();
    let database = Database::new(connection.clone(), CacheTtl::default(), people_schema())
        .await
        .unwrap();
    let people = database.table(PEOPLE_TABLE).unwrap();
    people.insert(person(1, "Dave", None)).await.unwrap();
    people.get(1).await.unwrap();

    let result = database
        .execute(
            "SELECT id, name FROM people WHERE name = ?",
            &[BackendValue::from("Dave")],
        )
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(database.cache().len().await, 1);

    let result = database
        .execute("DELETE FROM people WHERE id = ?", &[BackendValue::Int(1)])
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert!(database.cache().is_empty().await);

    assert_eq!(people.get(1).await.unwrap(), None);
}

#[tokio::test]
async fn close_rejects_every_later_operation() {
    init_test_tracing();
    let connection = MemoryConnection::new();
    let database = Database::new(connection.clone(), CacheTtl::default(), people_schema())
        .await
        .unwrap();
    let people = database.table(PEOPLE_TABLE).unwrap().clone();
    people.insert(person(1, "Dave", None)).await.unwrap();
    people.get(1).await.unwrap();

    database.close().await.unwrap();
    assert!(database.is_closed());
    assert!(connection.is_closed().await);
    assert!(database.cache().is_empty().await);

    let statements = connection.statements().await.len();
    let results = [
        people.get(1).await.map(|_| ()),
        people.get_all("name", "Dave").await.map(|_| ()),
        people.insert(person(2, "Bob", None)).await.map(|_| ()),
        people
            .update(Row::new().with("id", 1).with("name", "Bob"))
            .await
            .map(|_| ()),
        people.delete(1).await.map(|_| ()),
        database.execute("SELECT 1", &[]).await.map(|_| ()),
        database.close().await,
    ];

    for result in results {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ClosedError);
    }
    assert_eq!(connection.statements().await.len(), statements);
}
