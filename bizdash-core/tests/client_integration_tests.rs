//! Integration tests for the API client and importer using a wiremock server

use bizdash_core::import::RejectKind;
use bizdash_core::{Client, ClientError, EntityKind, Importer};

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const TOKEN: &str = "test-token";

#[tokio::test]
async fn test_import_customers_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), Some(TOKEN.to_string()));
    let importer = Importer::new(client, EntityKind::Customers);

    let summary = importer
        .import_text(
            "customers.csv",
            "first_name,last_name\nJohn,Doe\n,\nJane,Smith",
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.refreshed, Some(2));
}

#[tokio::test]
async fn test_create_sends_defaults_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(body_partial_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "zip_code": "02139",
            "country": "USA",
            "pipeline_status": "lead",
            "estimated_value": null
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), Some(TOKEN.to_string()));
    let importer = Importer::new(client, EntityKind::Customers);

    let summary = importer
        .import_text("c.csv", "First_Name,Last_Name,Zip\nAda,Lovelace,02139", |_| {})
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_server_error_message_is_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(body_partial_json(json!({ "first_name": "Jane" })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "duplicate email"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), Some(TOKEN.to_string()));
    let importer = Importer::new(client, EntityKind::Customers);

    let summary = importer
        .import_text(
            "c.csv",
            "first_name,last_name\nJane,Smith\nJohn,Doe",
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.rejected[0].row, 2);
    assert_eq!(summary.rejected[0].error, "duplicate email");
    assert_eq!(summary.rejected[0].kind, RejectKind::Transport);
}

#[tokio::test]
async fn test_error_without_json_body_uses_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), Some(TOKEN.to_string()));
    let importer = Importer::new(client, EntityKind::Inventory);

    let summary = importer
        .import_text("items.csv", "name,unit\nBolt,unit", |_| {})
        .await
        .unwrap();

    assert!(summary.is_total_failure());
    assert_eq!(summary.rejected[0].error, "Request failed with status 500");
    assert_eq!(summary.refreshed, None);
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), None);
    let importer = Importer::new(client, EntityKind::Customers);

    let summary = importer
        .import_text("c.csv", "first_name,last_name\nJohn,Doe", |_| {})
        .await
        .unwrap();

    assert!(summary.is_total_failure());
    assert_eq!(summary.rejected[0].error, "Not authenticated");
}

#[tokio::test]
async fn test_list_entities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Bolt" }
        ])))
        .mount(&mock_server)
        .await;

    let client = Client::new(&format!("{}/", mock_server.uri()), Some(TOKEN.to_string()));
    let items = client.list_entities(EntityKind::Inventory).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Bolt");
}

#[tokio::test]
async fn test_list_entities_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/customers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid token"
        })))
        .mount(&mock_server)
        .await;

    let client = Client::new(&mock_server.uri(), Some(TOKEN.to_string()));
    let err = client
        .list_entities(EntityKind::Customers)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid token");
}

#[tokio::test]
async fn test_connection_refused_is_recorded_per_row() {
    // Bind then drop a listener so the port is known to be closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = Client::new(&format!("http://127.0.0.1:{}", port), Some(TOKEN.to_string()));
    let importer = Importer::new(client, EntityKind::Customers);

    let summary = importer
        .import_text("c.csv", "first_name,last_name\nJohn,Doe\nJane,Smith", |_| {})
        .await
        .unwrap();

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.failed, 2);
    assert!(summary.is_total_failure());
    assert_eq!(summary.refreshed, None);

    let rows: Vec<usize> = summary.rejected.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![2, 3]);
    for rejected in &summary.rejected {
        assert_eq!(rejected.kind, RejectKind::Transport);
        assert!(
            rejected.error.starts_with("Request failed: "),
            "unexpected message: {}",
            rejected.error
        );
    }
}

#[tokio::test]
async fn test_timeout_is_recorded_and_next_row_runs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .and(body_partial_json(json!({ "name": "Slow" })))
        .respond_with(ResponseTemplate::new(201).set_delay(std::time::Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&mock_server)
        .await;

    let client = Client::with_timeout(
        &mock_server.uri(),
        Some(TOKEN.to_string()),
        std::time::Duration::from_millis(200),
    )
    .unwrap();
    let importer = Importer::new(client, EntityKind::Inventory);

    let summary = importer
        .import_text("items.csv", "name,unit\nSlow,unit\nFast,unit", |_| {})
        .await
        .unwrap();

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].row, 2);
    assert_eq!(summary.rejected[0].kind, RejectKind::Transport);
    assert!(summary.rejected[0].error.starts_with("Request failed: "));
}
