use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use lms_client::domain::{
    ActivityType, CreateActivityRequest, CreateSectionRequest, UpdateActivityRequest,
};
use lms_client::{LmsClient, LmsError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn push(&self, line: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push((line.into(), body));
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn get_course(
    State(state): State<Recorded>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if let Some(auth) = headers.get("authorization") {
        state
            .auth_headers
            .lock()
            .unwrap()
            .push(auth.to_str().unwrap_or_default().to_string());
    }
    if id != "course-1" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "id": "course-1",
        "title": "Rust 101",
        "updatedAt": "2024-03-01T10:00:00Z",
        "CourseSection": [
            {
                "id": "sec-2",
                "title": "Ownership",
                "order": 2,
                "activities": []
            },
            {
                "id": "sec-1",
                "title": "Intro",
                "order": 1,
                "activities": [
                    { "id": "act-1", "title": "Welcome", "type": "page", "order": 1, "sectionId": "sec-1" },
                    { "id": "act-2", "title": "Slides", "type": "file", "order": 2, "sectionId": "sec-1" }
                ]
            }
        ]
    })))
}

async fn create_section(State(state): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    state.push("POST /course-sections", body.clone());
    Json(json!({
        "id": "sec-new",
        "courseId": body["courseId"],
        "title": body["title"],
        "order": body["order"],
    }))
}

async fn create_activity(State(state): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    state.push("POST /activities", body.clone());
    Json(json!({
        "id": "act-new",
        "title": body["title"],
        "type": body["type"],
        "order": body["order"],
        "sectionId": body["sectionId"],
    }))
}

async fn patch_activity(
    State(state): State<Recorded>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    if id == "act-broken" {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    state.push(format!("PATCH /activities/{}", id), body);
    StatusCode::OK
}

async fn delete_section(State(state): State<Recorded>, Path(id): Path<String>) -> StatusCode {
    state.push(format!("DELETE /courses/sections/{}", id), Value::Null);
    StatusCode::NO_CONTENT
}

async fn forbidden() -> StatusCode {
    StatusCode::FORBIDDEN
}

async fn spawn_server(state: Recorded) -> String {
    let app = Router::new()
        .route("/api/courses/:id", get(get_course))
        .route("/api/course-sections", post(create_section))
        .route("/api/courses/sections/:id", delete(delete_section))
        .route("/api/activities", post(create_activity))
        .route("/api/activities/:id", patch(patch_activity).delete(forbidden))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

#[tokio::test]
async fn get_course_decodes_nested_sections_and_sends_token() {
    let state = Recorded::default();
    let base_url = spawn_server(state.clone()).await;
    let client = LmsClient::new(&base_url, None).unwrap().with_token("secret");

    let course = client.get_course("course-1").await.unwrap();

    assert_eq!(course.title, "Rust 101");
    assert!(course.updated_at.is_some());
    assert_eq!(course.sections.len(), 2);
    let intro = course.sections.iter().find(|s| s.id == "sec-1").unwrap();
    assert_eq!(intro.activities.len(), 2);
    assert_eq!(intro.activities[1].activity_type, ActivityType::File);
    assert_eq!(
        state.auth_headers.lock().unwrap().as_slice(),
        ["Bearer secret".to_string()]
    );
}

#[tokio::test]
async fn missing_course_maps_to_not_found() {
    let base_url = spawn_server(Recorded::default()).await;
    let client = LmsClient::new(&base_url, None).unwrap();

    let err = client.get_course("nope").await.unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));
}

#[tokio::test]
async fn create_calls_send_expected_bodies() {
    let state = Recorded::default();
    let base_url = spawn_server(state.clone()).await;
    let client = LmsClient::new(&base_url, None).unwrap();

    let section = client
        .create_section(&CreateSectionRequest {
            course_id: "course-1",
            title: "Traits",
            description: None,
            order: 3,
        })
        .await
        .unwrap();
    assert_eq!(section.id, "sec-new");
    assert_eq!(section.order, 3);

    let activity = client
        .create_activity(&CreateActivityRequest {
            title: "Quiz 1",
            activity_type: ActivityType::Quiz,
            content: Some("q.json"),
            order: 1,
            section_id: "sec-new",
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(activity.id, "act-new");
    assert_eq!(activity.activity_type, ActivityType::Quiz);

    let requests = state.requests();
    assert_eq!(
        requests[0],
        (
            "POST /course-sections".to_string(),
            json!({ "courseId": "course-1", "title": "Traits", "description": null, "order": 3 })
        )
    );
    assert_eq!(
        requests[1].1,
        json!({
            "title": "Quiz 1",
            "type": "quiz",
            "content": "q.json",
            "order": 1,
            "sectionId": "sec-new",
            "description": null
        })
    );
}

#[tokio::test]
async fn activity_position_patch_and_error_statuses() {
    let state = Recorded::default();
    let base_url = spawn_server(state.clone()).await;
    let client = LmsClient::new(&base_url, None).unwrap();

    client
        .update_activity("act-2", &UpdateActivityRequest::position(1, "sec-2"))
        .await
        .unwrap();
    assert_eq!(
        state.requests(),
        vec![(
            "PATCH /activities/act-2".to_string(),
            json!({ "order": 1, "sectionId": "sec-2" })
        )]
    );

    let err = client
        .update_activity("act-broken", &UpdateActivityRequest::position(1, "sec-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Status { status: 500, .. }));

    let err = client.delete_activity("act-2").await.unwrap_err();
    assert!(matches!(err, LmsError::Unauthorized));
}

#[tokio::test]
async fn delete_section_uses_nested_courses_path() {
    let state = Recorded::default();
    let base_url = spawn_server(state.clone()).await;
    let client = LmsClient::new(&base_url, None).unwrap();

    client.delete_section("sec-1").await.unwrap();
    assert_eq!(state.requests()[0].0, "DELETE /courses/sections/sec-1");
}

#[tokio::test]
async fn truncated_success_body_is_a_request_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\nconnection: close\r\n\r\n{\"ok\":")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = LmsClient::new(&format!("http://{}/api/", addr), None).unwrap();
    let err = client.delete_activity("act-1").await.unwrap_err();

    assert!(matches!(err, LmsError::Request(_)));
}
