use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bootstrap a wizard root with an instant submission backend.
fn init_project(dir: &TempDir) {
    init_with_config(dir, "submission:\n  latency_ms: 0\n");
}

fn init_with_config(dir: &TempDir, yaml: &str) {
    wizard_core::io::ensure_dir(&wizard_core::paths::storage_dir(dir.path())).unwrap();
    std::fs::write(wizard_core::paths::config_path(dir.path()), yaml).unwrap();
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header("content-type", "application/json");
            axum::body::Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => axum::body::Body::empty(),
    };
    app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

async fn json_of(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    json_of(send(app, "GET", uri, None).await).await
}

/// GET and return (status, Location header) for redirect checks.
async fn get_location(app: &axum::Router, uri: &str) -> (StatusCode, Option<String>) {
    let response = send(app, "GET", uri, None).await;
    let location = response
        .headers()
        .get(axum::http::header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    (response.status(), location)
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    json_of(send(app, "POST", uri, Some(body)).await).await
}

async fn put_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    json_of(send(app, "PUT", uri, Some(body)).await).await
}

async fn complete_all_steps(app: &axum::Router) {
    for (step, body) in [
        ("personalInfo", serde_json::json!({ "name": "Jo", "nationalId": "123" })),
        ("professionalInfo", serde_json::json!({ "income": 1200, "dependents": 2 })),
        ("additionalInfo", serde_json::json!({ "situation": "laid off in May" })),
    ] {
        let (status, _) = post_json(app, &format!("/api/steps/{step}/submit"), body).await;
        assert_eq!(status, StatusCode::OK, "submitting {step}");
    }
}

fn is_application_number(value: &serde_json::Value) -> bool {
    value
        .as_str()
        .is_some_and(wizard_core::summary::is_valid_application_number)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn fresh_wizard_routes_everything_to_step1() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    for uri in ["/", "/step2", "/step3", "/summary", "/no-such-page"] {
        let (status, location) = get_location(&app, uri).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT, "{uri}");
        assert_eq!(location.as_deref(), Some("/step1"), "{uri}");
    }
}

#[tokio::test]
async fn step1_page_returns_model() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = get(&app, "/step1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "personalInfo");
    assert_eq!(json["descriptor"]["step"], 1);
    assert_eq!(json["completion"]["isCompleted"], false);
    assert!(json["fields"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn submitting_step1_unlocks_step2() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        &app,
        "/api/steps/personalInfo/submit",
        serde_json::json!({ "name": "Jo" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "next");
    assert_eq!(json["step"], 2);

    let (status, page) = get(&app, "/step2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["descriptor"]["step"], 2);

    let (_, state) = get(&app, "/api/state").await;
    assert_eq!(state["steps"]["personalInfo"]["isCompleted"], true);
    assert_eq!(state["progress"], 1);
    assert_eq!(state["nextAllowedStep"], 2);

    let (status, location) = get_location(&app, "/").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/step2"));
}

#[tokio::test]
async fn submitting_locked_step_is_conflict() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        &app,
        "/api/steps/additionalInfo/submit",
        serde_json::json!({ "situation": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["redirect"], "/step1");
}

#[tokio::test]
async fn full_flow_issues_stable_application_number() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    complete_all_steps(&app).await;

    let (status, first) = get(&app, "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert!(is_application_number(&first["applicationNumber"]), "{first}");
    assert_eq!(first["data"]["additionalInfo"]["situation"], "laid off in May");

    let (_, second) = get(&app, "/summary").await;
    assert_eq!(first["applicationNumber"], second["applicationNumber"]);

    let (_, state) = get(&app, "/api/state").await;
    assert_eq!(state["progress"], 3);
    assert_eq!(state["allCompleted"], true);
    assert_eq!(state["applicationNumber"], first["applicationNumber"]);

    let (_, location) = get_location(&app, "/").await;
    assert_eq!(location.as_deref(), Some("/summary"));
}

#[tokio::test]
async fn state_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    {
        let app = wizard_server::build_router(dir.path().to_path_buf());
        post_json(
            &app,
            "/api/steps/personalInfo/submit",
            serde_json::json!({ "name": "Jo" }),
        )
        .await;
    }

    let app = wizard_server::build_router(dir.path().to_path_buf());
    let (status, page) = get(&app, "/step1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["fields"]["name"], "Jo");
    assert_eq!(page["completion"]["isCompleted"], true);
}

#[tokio::test]
async fn rejected_submission_reports_failure() {
    let dir = TempDir::new().unwrap();
    init_with_config(&dir, "submission:\n  fail_with: service offline\n");
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        &app,
        "/api/steps/personalInfo/submit",
        serde_json::json!({ "name": "Jo" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["hasError"], true);
    assert_eq!(json["error"], "service offline");

    let (_, location) = get_location(&app, "/step2").await;
    assert_eq!(location.as_deref(), Some("/step1"));
}

#[tokio::test]
async fn draft_validation_and_scheduling() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = put_json(
        &app,
        "/api/steps/personalInfo/draft",
        serde_json::json!({ "name": "J" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "scheduled");
    assert_eq!(json["invalidated"], false);

    let (status, _) = put_json(&app, "/api/steps/step9/draft", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put_json(
        &app,
        "/api/steps/personalInfo/draft",
        serde_json::json!(["not", "an", "object"]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editing_completed_step_relocks_later_steps() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());
    complete_all_steps(&app).await;

    let (_, json) = put_json(
        &app,
        "/api/steps/professionalInfo/draft",
        serde_json::json!({ "income": 900 }),
    )
    .await;
    assert_eq!(json["invalidated"], true);

    let (status, location) = get_location(&app, "/step3").await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/step2"));
}

#[tokio::test]
async fn redrafting_submitted_values_keeps_completion() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());
    let name = serde_json::json!({ "name": "Jo" });
    post_json(&app, "/api/steps/personalInfo/submit", name.clone()).await;
    post_json(
        &app,
        "/api/steps/professionalInfo/submit",
        serde_json::json!({ "income": 1200 }),
    )
    .await;

    let (status, json) = put_json(&app, "/api/steps/personalInfo/draft", name.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "unchanged");

    // A fresh server has no in-memory snapshot; stored data is the baseline.
    let app = wizard_server::build_router(dir.path().to_path_buf());
    let (_, json) = put_json(&app, "/api/steps/personalInfo/draft", name).await;
    assert_eq!(json["status"], "unchanged");

    let (status, _) = get(&app, "/step2").await;
    assert_eq!(status, StatusCode::OK);
    let (_, state) = get(&app, "/api/state").await;
    assert_eq!(state["lastCompletedStep"], 2);
}

#[tokio::test]
async fn navigation_actions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(&app, "/api/navigation/next", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["progress"], 1);

    let (_, json) = post_json(&app, "/api/navigation/previous", serde_json::json!({})).await;
    assert_eq!(json["progress"], 0);

    let (status, _) = post_json(&app, "/api/navigation/sideways", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_starts_a_new_application() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());
    complete_all_steps(&app).await;
    get(&app, "/summary").await;

    let (status, json) = post_json(&app, "/api/reset", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["allCompleted"], false);
    assert_eq!(json["progress"], 0);
    assert!(json.get("applicationNumber").is_none());

    let (_, page) = get(&app, "/step1").await;
    assert!(page["fields"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn reset_can_keep_answers() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());
    complete_all_steps(&app).await;

    let (status, json) =
        post_json(&app, "/api/reset?keep_answers=true", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["lastCompletedStep"], 0);

    let (_, page) = get(&app, "/step1").await;
    assert_eq!(page["fields"]["name"], "Jo");
}

#[tokio::test]
async fn assist_returns_suggestion_text() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let app = wizard_server::build_router(dir.path().to_path_buf());

    let (status, json) = post_json(
        &app,
        "/api/assist",
        serde_json::json!({ "prompt": "my housing situation", "context": "Rent went up." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = json["text"].as_str().unwrap();
    assert!(text.starts_with("Regarding my housing situation:"));

    let (status, _) = post_json(&app, "/api/assist", serde_json::json!({ "prompt": "" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
