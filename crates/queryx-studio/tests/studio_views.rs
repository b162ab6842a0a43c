//! End-to-end tests of the studio pages against an in-process fake API server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_test::TestServer;
use queryx_studio::config::StudioConfig;
use queryx_studio::create_router;
use queryx_studio::state::AppState;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Backend {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Backend {
    fn record(&self, path: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push((path.into(), body));
    }

    fn paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    fn body_of(&self, path: &str) -> Value {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
            .expect("request not recorded")
    }
}

fn users_schema() -> Value {
    json!({
        "id": { "column_name": "id", "data_type": "integer", "is_nullable": "NO", "primaryKey": true },
        "name": { "column_name": "name", "data_type": "varchar", "character_maximum_length": 100 },
        "active": { "column_name": "active", "data_type": "boolean" }
    })
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/schema/tables", get(|| async { Json(json!(["users", "orders"])) }))
        .route(
            "/schema/tablesSchema",
            get(|| async {
                Json(json!({
                    "users": users_schema(),
                    "orders": { "id": { "type": "INTEGER" }, "total": { "type": "NUMERIC" } }
                }))
            }),
        )
        .route(
            "/schema/:table",
            get(|Path(table): Path<String>| async move {
                if table == "users" {
                    (StatusCode::OK, Json(json!({ "columns": users_schema() })))
                } else {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "rc": "404", "message": format!("Table {table} not found") })),
                    )
                }
            }),
        )
        .route(
            "/schema/create",
            post(|State(b): State<Backend>, Json(body): Json<Value>| async move {
                b.record("/schema/create", body);
                Json(json!({ "rc": "200", "message": "Table created" }))
            }),
        )
        .route(
            "/schema/update",
            post(|State(b): State<Backend>, Json(body): Json<Value>| async move {
                b.record("/schema/update", body);
                Json(json!({ "rc": "200", "message": "Table updated" }))
            }),
        )
        .route(
            "/schema/delete/:table",
            delete(|State(b): State<Backend>, Path(table): Path<String>| async move {
                b.record(format!("/schema/delete/{table}"), Value::Null);
                Json(json!({ "rc": "200", "message": "Table deleted" }))
            }),
        )
        .route(
            "/tabledata/insert",
            post(|State(b): State<Backend>, Json(body): Json<Value>| async move {
                b.record("/tabledata/insert", body);
                Json(json!({ "rc": "200", "message": "Data inserted successfully!" }))
            }),
        )
        .route(
            "/query/execute",
            post(
                |State(b): State<Backend>, Query(params): Query<HashMap<String, String>>| async move {
                    let query = params.get("query").cloned().unwrap_or_default();
                    b.record("/query/execute", json!(query));
                    Json(json!({
                        "rc": "200",
                        "message": "ok",
                        "data": [
                            { "id": 1, "name": "<Alice>", "email": null }
                        ],
                        "executedQuery": query,
                        "executionTimeMs": 4
                    }))
                },
            ),
        )
        .route(
            "/query/ai-query",
            post(|State(b): State<Backend>, Json(body): Json<Value>| async move {
                b.record("/query/ai-query", body);
                Json(json!({
                    "rc": "200",
                    "message": "ok",
                    "data": [{ "count": 2 }],
                    "columns": ["count"],
                    "executedQuery": "SELECT COUNT(*) AS count FROM users",
                    "executionTimeMs": 30,
                    "rowsAffected": 1
                }))
            }),
        )
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

fn studio(api_url: String) -> TestServer {
    let config = StudioConfig {
        api_url,
        api_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let state = AppState::new(config).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

async fn setup() -> (TestServer, Backend) {
    let (url, backend) = spawn_backend().await;
    (studio(url), backend)
}

async fn dead_api_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn dashboard_shows_totals() {
    let (server, _backend) = setup().await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"id="total-tables">2<"#));
    assert!(html.contains(r#"id="total-columns">5<"#));
    assert!(html.contains(r#"href="/query?type=ai""#));
    assert!(html.contains(r#"<a href="/" class="active">Dashboard</a>"#));
}

#[tokio::test]
async fn dashboard_renders_when_api_is_down() {
    let server = studio(dead_api_url().await);

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("banner-error"));
    assert!(html.contains("Failed to load stats"));
    assert!(html.contains(r#"id="total-tables">-<"#));

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"]["reachable"], false);
}

#[tokio::test]
async fn health_reports_backend() {
    let (server, _backend) = setup().await;

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["service"], "queryx-studio");
    assert_eq!(health["backend"]["reachable"], true);
}

#[tokio::test]
async fn lists_tables_and_selected_schema() {
    let (server, _backend) = setup().await;

    let html = server.get("/tables").add_query_param("table", "users").await.text();
    assert!(html.contains(r#"href="/tables?table=orders""#));
    assert!(html.contains("<td>id</td><td>INTEGER</td><td>NO</td><td>PK</td>"));
    assert!(html.contains("<td>name</td><td>VARCHAR(100)</td><td>YES</td>"));

    let html = server.get("/tables").add_query_param("table", "ghosts").await.text();
    assert!(html.contains("Table ghosts not found"));
}

#[tokio::test]
async fn editor_adds_and_removes_columns() {
    let (server, backend) = setup().await;

    let html = server
        .post("/tables/new")
        .form(&[
            ("table_name", "posts"),
            ("col0_name", "id"),
            ("col0_type", "INTEGER"),
            ("action", "add_column"),
        ])
        .await
        .text();
    assert!(html.contains(r#"name="col1_name" value="""#));
    assert!(html.contains(r#"name="table_name" value="posts""#));

    let html = server
        .post("/tables/new")
        .form(&[
            ("col0_name", "id"),
            ("col1_name", "title"),
            ("action", "remove_column:0"),
        ])
        .await
        .text();
    assert!(html.contains(r#"name="col0_name" value="title""#));
    assert!(!html.contains("col1_name"));

    assert!(backend.paths().is_empty());
}

#[tokio::test]
async fn creates_table_and_returns_to_list() {
    let (server, backend) = setup().await;

    let response = server
        .post("/tables/new")
        .form(&[
            ("table_name", "posts"),
            ("col0_name", "id"),
            ("col0_type", "INTEGER"),
            ("col0_length", "255"),
            ("col0_pk", "on"),
            ("col1_name", "title"),
            ("col1_type", "VARCHAR"),
            ("col1_length", "120"),
            ("col1_nullable", "on"),
            ("col2_name", ""),
            ("col2_type", "TEXT"),
            ("action", "submit"),
        ])
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("banner-success"));
    assert!(html.contains("Table created"));

    assert_eq!(
        backend.body_of("/schema/create"),
        json!({
            "tableName": "posts",
            "columns": [
                { "name": "id", "type": "INTEGER", "length": 255, "primaryKey": true, "nullable": false },
                { "name": "title", "type": "VARCHAR", "length": 120, "primaryKey": false, "nullable": true }
            ]
        })
    );
}

#[tokio::test]
async fn rejects_incomplete_table_forms() {
    let (server, backend) = setup().await;

    let html = server
        .post("/tables/new")
        .form(&[("table_name", " "), ("col0_name", "id"), ("action", "submit")])
        .await
        .text();
    assert!(html.contains("Please enter a table name"));

    let html = server
        .post("/tables/new")
        .form(&[("table_name", "posts"), ("col0_name", ""), ("action", "submit")])
        .await
        .text();
    assert!(html.contains("Please add at least one column"));

    assert!(backend.paths().is_empty());
}

#[tokio::test]
async fn edits_existing_table() {
    let (server, backend) = setup().await;

    let html = server.get("/tables/users/edit").await.text();
    assert!(html.contains(r#"name="col0_name" value="id""#));
    assert!(html.contains(r#"name="col1_length" value="100""#));
    assert!(html.contains("readonly"));

    server
        .post("/tables/users/edit")
        .form(&[
            ("table_name", "renamed"),
            ("col0_name", "id"),
            ("col0_type", "INTEGER"),
            ("action", "submit"),
        ])
        .await
        .assert_status_ok();
    assert_eq!(backend.body_of("/schema/update")["tableName"], "users");
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let (server, backend) = setup().await;

    let html = server
        .post("/tables/old%20orders/delete")
        .form(&[("confirm", "")])
        .await
        .text();
    assert!(html.contains("Are you sure you want to delete table"));
    assert!(html.contains(r#"name="confirm" value="yes""#));
    assert!(backend.paths().is_empty());

    let html = server
        .post("/tables/old%20orders/delete")
        .form(&[("confirm", "yes")])
        .await
        .text();
    assert!(html.contains("Table deleted"));
    assert_eq!(backend.paths(), vec!["/schema/delete/old orders"]);
}

#[tokio::test]
async fn runs_sql_queries() {
    let (server, backend) = setup().await;

    let html = server
        .post("/query/sql")
        .form(&[("query", "SELECT * FROM users WHERE name <> 'x'")])
        .await
        .text();
    assert_eq!(
        backend.body_of("/query/execute"),
        json!("SELECT * FROM users WHERE name <> 'x'")
    );
    assert!(html.contains("&lt;Alice&gt;"));
    assert!(html.contains(r#"<td class="null">NULL</td>"#));
    assert!(html.contains("Execution time: 4ms"));

    let html = server.post("/query/sql").form(&[("query", "")]).await.text();
    assert!(html.contains("banner-error"));
}

#[tokio::test]
async fn runs_ai_queries() {
    let (server, backend) = setup().await;

    let html = server.get("/query").add_query_param("type", "ai").await.text();
    assert!(html.contains(r#"<option value="orders">orders</option>"#));

    let html = server
        .post("/query/ai")
        .form(&[
            ("tables", "users"),
            ("tables", "orders"),
            ("question", "How many users?"),
        ])
        .await
        .text();
    assert_eq!(
        backend.body_of("/query/ai-query"),
        json!({ "naturalLanguageQuery": "How many users?", "tableNames": ["users", "orders"] })
    );
    assert!(html.contains("SELECT COUNT(*) AS count FROM users"));
    assert!(html.contains(r#"<option value="users" selected>users</option>"#));

    let html = server
        .post("/query/ai")
        .form(&[("question", "How many users?")])
        .await
        .text();
    assert!(html.contains("Please select at least one table"));
}

#[tokio::test]
async fn inserts_rows_and_resets_form() {
    let (server, backend) = setup().await;

    let html = server.get("/data").add_query_param("table", "users").await.text();
    assert!(html.contains(r#"name="cell0_0""#));

    let html = server
        .post("/data")
        .form(&[
            ("table", "users"),
            ("rows", "1"),
            ("cell0_0", "1"),
            ("cell0_1", "Alice"),
            ("action", "add_row"),
        ])
        .await
        .text();
    assert!(html.contains(r#"name="rows" value="2""#));
    assert!(html.contains(r#"name="cell0_1" value="Alice""#));

    let html = server
        .post("/data")
        .form(&[
            ("table", "users"),
            ("rows", "2"),
            ("cell0_0", "1"),
            ("cell0_1", "Alice"),
            ("cell0_2", "true"),
            ("cell1_0", "2"),
            ("cell1_1", ""),
            ("action", "submit"),
        ])
        .await
        .text();
    assert!(html.contains("Data inserted successfully!"));
    assert!(html.contains(r#"name="rows" value="1""#));
    assert!(html.contains(r#"name="cell0_1" value="""#));

    let body = backend.body_of("/tabledata/insert");
    assert_eq!(body["tableName"], "users");
    assert_eq!(
        body["rows"],
        json!([
            [
                { "name": "id", "value": 1 },
                { "name": "name", "value": "Alice" },
                { "name": "active", "value": true }
            ],
            [
                { "name": "id", "value": 2 },
                { "name": "name", "value": null },
                { "name": "active", "value": null }
            ]
        ])
    );
}

#[tokio::test]
async fn bad_cells_keep_the_form() {
    let (server, backend) = setup().await;

    let html = server
        .post("/data")
        .form(&[("table", "users"), ("cell0_0", "one"), ("action", "submit")])
        .await
        .text();
    assert!(html.contains("banner-error"));
    assert!(html.contains(r#"name="cell0_0" value="one""#));
    assert!(!backend.paths().contains(&"/tabledata/insert".to_string()));
}

#[tokio::test]
async fn unknown_actions_are_rejected() {
    let (server, _backend) = setup().await;

    let response = server
        .post("/data")
        .form(&[("table", "users"), ("action", "add_column")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNKNOWN_ACTION");
}

#[tokio::test]
async fn data_post_without_table_shows_banner() {
    let (server, backend) = setup().await;

    let response = server.post("/data").form(&[("action", "submit")]).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("banner-error"));
    assert!(html.contains("Please select a table"));
    assert!(!backend.paths().contains(&"/tabledata/insert".to_string()));
}

#[tokio::test]
async fn oversized_forms_are_rejected() {
    let (server, backend) = setup().await;

    let response = server
        .post("/data")
        .form(&[("table", "users"), ("rows", "3000000"), ("action", "add_row")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_FIELD");

    let response = server
        .post("/data")
        .form(&[("table", "users"), ("rows", "1"), ("cell4000000_0", "1")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/tables/new")
        .form(&[("table_name", "wide"), ("col2000000_name", "x"), ("action", "add_column")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_FIELD");

    assert!(!backend.paths().contains(&"/tabledata/insert".to_string()));
    assert!(!backend.paths().contains(&"/schema/create".to_string()));
}
