use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use lunara_backend::{router, store::Database, AppState};

async fn app() -> Router {
    let db = Database::in_memory().await.unwrap();
    router(AppState::new(db))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

#[tokio::test]
async fn health_probe() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn draft_save_updates_profile_average() {
    let app = app().await;
    let user = Uuid::new_v4();

    // a prior completed period, 28 days before the one we are about to draft
    let (status, _) = send(
        &app,
        "POST",
        "/period",
        Some(json!({
            "user_id": user,
            "start_date": today() - Duration::days(32),
            "end_date": today() - Duration::days(28),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/period/start",
        Some(json!({ "user_id": user, "date": today() - Duration::days(4) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, preview) = send(
        &app,
        "POST",
        "/period/end",
        Some(json!({ "user_id": user, "date": today() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["days"].as_array().unwrap().len(), 5);

    let (status, saved) = send(
        &app,
        "POST",
        "/period/save",
        Some(json!({ "user_id": user })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["average_cycle_length"], json!(28));

    let (status, profile) = send(&app, "GET", &format!("/profile?user_id={}", user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["average_cycle_length"], json!(28));

    let (status, summary) = send(&app, "GET", &format!("/period?user_id={}", user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["average_cycle_length"], json!(28));
    assert_eq!(summary["cycle_day"], json!(5));
}

#[tokio::test]
async fn future_start_is_rejected() {
    let app = app().await;
    let user = Uuid::new_v4();

    let (status, body) = send(
        &app,
        "POST",
        "/period/start",
        Some(json!({ "user_id": user, "date": today() + Duration::days(3) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("future"));
}

#[tokio::test]
async fn overlapping_start_returns_the_existing_record() {
    let app = app().await;
    let user = Uuid::new_v4();

    send(
        &app,
        "POST",
        "/period",
        Some(json!({
            "user_id": user,
            "start_date": today() - Duration::days(10),
            "end_date": today() - Duration::days(6),
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/period/start",
        Some(json!({ "user_id": user, "date": today() - Duration::days(8) })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["existing"]["id"].is_string());
}

#[tokio::test]
async fn end_before_start_resets_the_draft() {
    let app = app().await;
    let user = Uuid::new_v4();

    send(
        &app,
        "POST",
        "/period/start",
        Some(json!({ "user_id": user, "date": today() - Duration::days(2) })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/period/end",
        Some(json!({ "user_id": user, "date": today() - Duration::days(5) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // the draft is gone, so saving has nothing to persist
    let (status, _) = send(
        &app,
        "POST",
        "/period/save",
        Some(json!({ "user_id": user })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleting_a_period_recalculates_the_average() {
    let app = app().await;
    let user = Uuid::new_v4();

    for (start, end) in [(60i64, 56i64), (32, 28), (4, 0)] {
        let (status, _) = send(
            &app,
            "POST",
            "/period",
            Some(json!({
                "user_id": user,
                "start_date": today() - Duration::days(start),
                "end_date": today() - Duration::days(end),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, periods) = send(&app, "GET", &format!("/periods?user_id={}", user), None).await;
    let periods = periods.as_array().unwrap().clone();
    assert_eq!(periods.len(), 3);

    // drop the oldest record; only one 28-day gap remains
    let oldest_id = periods.last().unwrap()["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/period/{}?user_id={}", oldest_id, user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, profile) = send(&app, "GET", &format!("/profile?user_id={}", user), None).await;
    assert_eq!(profile["average_cycle_length"], json!(28));

    // dropping another leaves a single record: insufficient data again
    let (_, periods) = send(&app, "GET", &format!("/periods?user_id={}", user), None).await;
    let id = periods.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();
    send(&app, "DELETE", &format!("/period/{}?user_id={}", id, user), None).await;

    let (_, profile) = send(&app, "GET", &format!("/profile?user_id={}", user), None).await;
    assert_eq!(profile["average_cycle_length"], json!(0));
}

#[tokio::test]
async fn symptom_logging_and_grouping() {
    let app = app().await;
    let user = Uuid::new_v4();
    let date = today() - Duration::days(1);

    let (status, _) = send(
        &app,
        "POST",
        "/symptom",
        Some(json!({
            "user_id": user,
            "date": date,
            "symptom_type": "cramps",
            "severity": 4,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/symptom",
        Some(json!({
            "user_id": user,
            "date": date,
            "symptom_type": "headache",
            "severity": 9,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("severity"));

    let (_, grouped) = send(&app, "GET", &format!("/symptoms?user_id={}", user), None).await;
    let grouped = grouped.as_array().unwrap().clone();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0]["symptoms"], json!(["cramps"]));

    let (status, _) = send(
        &app,
        "DELETE",
        "/symptom",
        Some(json!({
            "user_id": user,
            "date": date,
            "symptom_type": "cramps",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, flat) = send(&app, "GET", &format!("/symptom/all?user_id={}", user), None).await;
    assert!(flat.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn birth_control_toggle_and_adherence() {
    let app = app().await;
    let user = Uuid::new_v4();
    let start = today() - Duration::days(6);

    for n in 0..7 {
        let (status, record) = send(
            &app,
            "POST",
            "/birth-control/toggle",
            Some(json!({ "user_id": user, "date": start + Duration::days(n) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["taken"], json!(true));
    }

    // toggling the same day again clears it
    let (_, record) = send(
        &app,
        "POST",
        "/birth-control/toggle",
        Some(json!({ "user_id": user, "date": start })),
    )
    .await;
    assert_eq!(record["taken"], json!(false));

    let (status, report) = send(
        &app,
        "GET",
        &format!(
            "/birth-control/adherence?user_id={}&start={}&end={}",
            user,
            start,
            today()
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_days"], json!(7));
    assert_eq!(report["taken_count"], json!(6));
}

#[tokio::test]
async fn history_merges_all_record_kinds() {
    let app = app().await;
    let user = Uuid::new_v4();

    send(
        &app,
        "POST",
        "/period",
        Some(json!({
            "user_id": user,
            "start_date": today() - Duration::days(20),
            "end_date": today() - Duration::days(16),
        })),
    )
    .await;
    send(
        &app,
        "POST",
        "/birth-control/toggle",
        Some(json!({ "user_id": user, "date": today() - Duration::days(2) })),
    )
    .await;
    send(
        &app,
        "POST",
        "/symptom",
        Some(json!({
            "user_id": user,
            "date": today() - Duration::days(1),
            "symptom_type": "fatigue",
            "severity": 2,
        })),
    )
    .await;

    let (status, items) = send(&app, "GET", &format!("/history?user_id={}", user), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 3);
    // newest first
    assert_eq!(items[0]["kind"], json!("symptom"));
    assert_eq!(items[1]["kind"], json!("birth_control"));
    assert_eq!(items[2]["kind"], json!("period"));
}

#[tokio::test]
async fn profile_update_preserves_computed_fields() {
    let app = app().await;
    let user = Uuid::new_v4();

    // two completed periods give a real average
    for (start, end) in [(34i64, 30i64), (4, 0)] {
        send(
            &app,
            "POST",
            "/period",
            Some(json!({
                "user_id": user,
                "start_date": today() - Duration::days(start),
                "end_date": today() - Duration::days(end),
            })),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "PUT",
        "/profile",
        Some(json!({ "user_id": user, "name": "Hana", "height_cm": 300.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("height"));

    let (status, profile) = send(
        &app,
        "PUT",
        "/profile",
        Some(json!({ "user_id": user, "name": "Hana", "height_cm": 165.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], json!("Hana"));
    assert_eq!(profile["average_cycle_length"], json!(30));
}
