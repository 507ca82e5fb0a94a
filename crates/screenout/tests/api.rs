use alerts::AlertStore;
use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use conversion::store::MemoryTaskStore;
use conversion::{TaskSettings, TaskStore};
use pretty_assertions::assert_eq;
use screenout::App;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ALERTS: &str = "\
ACTIVE_WELL,STAGE,ALERT_TYPE,ALERT_TIME,SAND,FLUID_VOLUME
W1,S1,Screen Out,01-01-2022 10:00,1200,300
W2,S2,Screen Out,02-01-2022 11:00,,
W1,S3,Offset,02-01-2022 12:00,800,100
";

struct Fixture {
    router: axum::Router,
    tasks: MemoryTaskStore,
    export_dir: tempfile::TempDir,
}

fn fixture(tasks: Option<MemoryTaskStore>, stage_filter: bool) -> Fixture {
    let export_dir = tempfile::tempdir().unwrap();

    let app = App {
        alerts: AlertStore::from_reader(ALERTS.as_bytes()).unwrap(),
        tasks: tasks
            .clone()
            .map(|tasks| Arc::new(tasks) as Arc<dyn TaskStore>),
        settings: TaskSettings::default(),
        export_dir: export_dir.path().to_path_buf(),
        stage_filter,
    };

    Fixture {
        router: screenout::api::build_router(Arc::new(app)),
        tasks: tasks.unwrap_or_default(),
        export_dir,
    }
}

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn post(router: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .header(http::header::CONTENT_TYPE, "application/json")
                .uri(uri)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    // Rejections of malformed requests have plain-text bodies.
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

fn well_stages(rows: &Value) -> Vec<&str> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["ACTIVE WELL - STAGE"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_alerts() {
    let Fixture { router, .. } = fixture(None, false);

    let (status, rows) = get(&router, "/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(well_stages(&rows), vec!["W1 - S1", "W2 - S2", "W1 - S3"]);
    assert_eq!(rows[0]["row"], json!(0));
    assert_eq!(rows[0]["ALERT_TIME"], json!("01-01-2022 10:00"));
    assert_eq!(rows[1]["SAND"], Value::Null);

    let (status, rows) = get(&router, "/alerts?well=W1&sort=sand&direction=desc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(well_stages(&rows), vec!["W1 - S1", "W1 - S3"]);

    // Selector placeholders select everything.
    let (_, rows) = get(&router, "/alerts?well=Select%20Well").await;
    assert_eq!(rows.as_array().unwrap().len(), 3);

    let (status, _) = get(&router, "/alerts?sort=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stage_filter() {
    let Fixture { router, .. } = fixture(None, false);
    let (status, body) = get(&router, "/alerts?stage=S3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": 400,
            "error": "filtering by stage is disabled, but stage \"S3\" was selected",
        })
    );

    let Fixture { router, .. } = fixture(None, true);
    let (status, rows) = get(&router, "/alerts?stage=S3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(well_stages(&rows), vec!["W1 - S3"]);

    let (_, summary) = get(&router, "/summary").await;
    assert_eq!(summary["stages"], json!(["S1", "S2", "S3"]));
}

#[tokio::test]
async fn test_summary() {
    let Fixture { router, .. } = fixture(Some(MemoryTaskStore::new()), false);

    let (status, summary) = get(&router, "/summary").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        summary["cards"],
        json!({
            "screenout_alerts": 2,
            "offset_alerts": 1,
            "cost_communication_alerts": 0,
            "open_alerts": 2,
            "new_alerts": 1,
            "change_percentage": 50.0,
            "converted": {"total": 0, "today": 0},
            "converted_today_percentage": null,
        })
    );
    assert_eq!(
        summary["alerts_by_well"],
        json!([{"label": "W1", "count": 2}, {"label": "W2", "count": 1}])
    );
    assert_eq!(summary["wells"], json!(["W1", "W2"]));
    assert_eq!(summary["stages"], Value::Null);
    assert_eq!(summary["last_updated"], json!("02-01-2022 12:00"));

    // Selecting a well narrows the charts, but not the cards.
    let (_, summary) = get(&router, "/summary?well=W2").await;
    assert_eq!(summary["cards"]["screenout_alerts"], json!(2));
    assert_eq!(
        summary["alerts_by_well"],
        json!([{"label": "W2", "count": 1}])
    );
    assert_eq!(summary["wells"], json!(["W1", "W2"]));
}

#[tokio::test]
async fn test_summary_of_well_after_converting_another() {
    let Fixture { router, .. } = fixture(Some(MemoryTaskStore::new()), false);

    let (status, _) = post(&router, "/tasks", json!({"rows": [0]})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = get(&router, "/summary?well=W2").await;
    assert_eq!(summary["cards"]["screenout_alerts"], json!(2));
    assert_eq!(summary["cards"]["open_alerts"], json!(1));
    assert_eq!(summary["cards"]["converted"], json!({"total": 1, "today": 1}));
    assert_eq!(
        summary["alerts_by_date"],
        json!([{"date": "2022-01-02", "count": 1}])
    );
}

#[tokio::test]
async fn test_summary_without_task_database() {
    let Fixture { router, .. } = fixture(Some(MemoryTaskStore::new().unreachable()), false);

    let (status, summary) = get(&router, "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["cards"]["converted"], Value::Null);
    assert_eq!(summary["cards"]["open_alerts"], json!(2));
}

#[tokio::test]
async fn test_export() {
    let fixture = fixture(None, false);

    let (status, body) = post(&fixture.router, "/export", json!({"well": "W1"})).await;
    assert_eq!(status, StatusCode::OK);

    let path = std::path::PathBuf::from(body["path"].as_str().unwrap());
    assert_eq!(path, fixture.export_dir.path().join("Notification_Table_Data.csv"));

    let content = std::fs::read_to_string(path).unwrap();
    let lines: Vec<_> = content.lines().skip(1).collect();
    assert_eq!(
        lines,
        vec![
            "W1 - S1,01-01-2022 10:00,,300.0,1200.0,,,,,,,,",
            "W1 - S3,02-01-2022 12:00,,100.0,800.0,,,,,,,,",
        ]
    );
}

#[tokio::test]
async fn test_create_tasks() {
    let Fixture { router, tasks, .. } = fixture(Some(MemoryTaskStore::new()), false);

    let (status, result) = post(&router, "/tasks", json!({"rows": [0, 1]})).await;
    assert_eq!(status, StatusCode::OK);

    let subjects: Vec<_> = result["converted"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["subject"].as_str().unwrap())
        .collect();
    assert_eq!(
        subjects,
        vec![
            "Murphy Screenout Alert - W1 - S1",
            "Murphy Screenout Alert - W2 - S2"
        ]
    );
    assert_eq!(result["failed"], json!([]));
    assert_eq!(result["not_attempted"], json!([]));
    assert_eq!(tasks.tables().task_events.len(), 2);

    // Each request uses its own session.
    post(&router, "/tasks", json!({"rows": [2]})).await;
    assert_eq!(tasks.sessions_opened(), 2);
    assert_eq!(tasks.sessions_closed(), 2);

    let (_, summary) = get(&router, "/summary").await;
    assert_eq!(summary["cards"]["converted"], json!({"total": 3, "today": 3}));
    // One of the converted rows was an offset alert.
    assert_eq!(summary["cards"]["open_alerts"], json!(0));
}

#[tokio::test]
async fn test_create_tasks_rejections() {
    let Fixture { router, tasks, .. } = fixture(Some(MemoryTaskStore::new()), false);

    let (status, body) = post(&router, "/tasks", json!({"rows": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("no alerts were selected"));

    let (status, body) = post(&router, "/tasks", json!({"rows": [0, 9]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("alert row 9 does not exist"));
    assert_eq!(tasks.sessions_opened(), 0);

    let Fixture { router, .. } = fixture(None, false);
    let (status, body) = post(&router, "/tasks", json!({"rows": [0]})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], json!("task database is not configured"));

    let Fixture { router, .. } = fixture(Some(MemoryTaskStore::new().unreachable()), false);
    let (status, body) = post(&router, "/tasks", json!({"rows": [0]})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"],
        json!("task database is unreachable: connection refused")
    );
}
