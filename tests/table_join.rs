//! Integration tests for tabular retrieval and foreign-key joins.

mod common;

use bubble_lib::Constraint;
use bubble_lib::Relation;
use bubble_lib::Value;
use serde_json::json;

use common::MockApi;
use common::client_for;

#[tokio::test]
async fn fetch_all_as_table_assembles_columns() {
    let api = MockApi::start().await;
    api.insert_collection(
        "fooType",
        vec![
            json!({"_id": "idFoo1", "name": "first", "rank": 1}),
            json!({"_id": "idFoo2", "rank": 2}),
        ],
    );
    let client = client_for(&api);

    let table = client.fetch_all_as_table("fooType").run().await.unwrap();

    assert_eq!(table.columns(), ["_id", "name", "rank"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "name"), Some(&Value::from("first")));
    // Fields absent from a record are padded with nulls.
    assert_eq!(table.get(1, "name"), Some(&Value::Null));
    assert_eq!(table.get(1, "rank"), Some(&Value::from(2)));
}

#[tokio::test]
async fn relation_joins_target_columns_with_prefix() {
    let api = MockApi::start().await;
    api.insert_collection(
        "fooType",
        vec![
            json!({"_id": "idFoo1", "name": "first", "fooBar": "idBar1"}),
            json!({"_id": "idFoo2", "name": "second", "fooBar": "idBar2"}),
        ],
    );
    api.insert_collection(
        "barType",
        vec![
            json!({"_id": "idBar1", "barField": "one"}),
            json!({"_id": "idBar2", "barField": "two"}),
        ],
    );
    let client = client_for(&api);

    let table = client
        .fetch_all_as_table("fooType")
        .relation(Relation::new("fooBar", "barType"))
        .run()
        .await
        .unwrap();

    assert_eq!(
        table.columns(),
        ["_id", "fooBar", "name", "fooBar__id", "fooBar_barField"]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "fooBar_barField"), Some(&Value::from("one")));
    assert_eq!(table.get(1, "fooBar_barField"), Some(&Value::from("two")));
    assert_eq!(table.get(0, "fooBar__id"), Some(&Value::from("idBar1")));
}

#[tokio::test]
async fn unmatched_foreign_ids_fill_with_nulls() {
    let api = MockApi::start().await;
    api.insert_collection(
        "fooType",
        vec![
            json!({"_id": "idFoo1", "fooBar": "idBar1"}),
            json!({"_id": "idFoo2", "fooBar": "dangling"}),
        ],
    );
    api.insert_collection("barType", vec![json!({"_id": "idBar1", "barField": "one"})]);
    let client = client_for(&api);

    let table = client
        .fetch_all_as_table("fooType")
        .relation(Relation::new("fooBar", "barType"))
        .run()
        .await
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "fooBar_barField"), Some(&Value::from("one")));
    assert_eq!(table.get(1, "fooBar_barField"), Some(&Value::Null));
    assert_eq!(table.get(1, "fooBar__id"), Some(&Value::Null));
}

#[tokio::test]
async fn missing_relation_field_skips_join_without_error() {
    let api = MockApi::start().await;
    api.insert_collection("fooType", vec![json!({"_id": "idFoo1", "name": "first"})]);
    api.insert_collection("barType", vec![json!({"_id": "idBar1"})]);
    let client = client_for(&api);

    let table = client
        .fetch_all_as_table("fooType")
        .relation(Relation::new("noSuchField", "barType"))
        .run()
        .await
        .unwrap();

    assert_eq!(table.columns(), ["_id", "name"]);
    assert_eq!(table.len(), 1);
    // The target collection is never fetched for a skipped relation.
    let requests = api.requests();
    assert!(requests.iter().all(|r| r.type_name == "fooType"));
}

#[tokio::test]
async fn join_round_trips_through_column_removal() {
    let api = MockApi::start().await;
    api.insert_collection(
        "fooType",
        vec![json!({"_id": "idFoo1", "name": "first", "fooBar": "idBar1"})],
    );
    api.insert_collection("barType", vec![json!({"_id": "idBar1", "barField": "one"})]);
    let client = client_for(&api);

    let plain = client.fetch_all_as_table("fooType").run().await.unwrap();
    let joined = client
        .fetch_all_as_table("fooType")
        .relation(Relation::new("fooBar", "barType"))
        .run()
        .await
        .unwrap();

    let stripped = joined.without_columns(&["fooBar__id", "fooBar_barField"]);
    assert_eq!(stripped, plain);
}

#[tokio::test]
async fn nested_relations_join_through_two_collections() {
    let api = MockApi::start().await;
    api.insert_collection(
        "fooType",
        vec![json!({"_id": "idFoo1", "fooBar": "idBar1"})],
    );
    api.insert_collection(
        "barType",
        vec![json!({"_id": "idBar1", "barBaz": "idBaz1"})],
    );
    api.insert_collection(
        "bazType",
        vec![json!({"_id": "idBaz1", "bazField": "deep"})],
    );
    let client = client_for(&api);

    let table = client
        .fetch_all_as_table("fooType")
        .relation(Relation::new("fooBar", "barType").nest(Relation::new("barBaz", "bazType")))
        .run()
        .await
        .unwrap();

    // The nested join runs on the target first, so its columns arrive
    // double-prefixed.
    assert_eq!(
        table.columns(),
        [
            "_id",
            "fooBar",
            "fooBar__id",
            "fooBar_barBaz",
            "fooBar_barBaz__id",
            "fooBar_barBaz_bazField",
        ]
    );
    assert_eq!(
        table.get(0, "fooBar_barBaz_bazField"),
        Some(&Value::from("deep"))
    );
}

#[tokio::test]
async fn constrained_table_can_be_empty() {
    let api = MockApi::start().await;
    api.insert_collection("fooType", vec![json!({"_id": "idFoo1", "status": "active"})]);
    let client = client_for(&api);

    let table = client
        .fetch_all_as_table("fooType")
        .constraint(Constraint::equals("status", "archived"))
        .run()
        .await
        .unwrap();

    assert!(table.is_empty());
    assert!(table.columns().is_empty());
}
