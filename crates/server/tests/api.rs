//! In-process router tests: roles, status codes and report shapes.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use models::Role;
use serde_json::{json, Value};
use service::identity::StaticIdentityStore;
use service::school::Settings;
use service::Services;
use std::sync::Arc;
use tower::ServiceExt;

use server::{build_app, AppState};

const TEACHER: &str = "teacher-key";
const STUDENT: &str = "student-key";
const ORPHAN: &str = "orphan-key";
const ODD_KEY: &str = "t+k%y&1";

async fn app() -> Router {
    let services = Services::in_memory(Settings::default());
    services.classes.seed_defaults().await.unwrap();
    let mut identity = StaticIdentityStore::default();
    identity.insert(TEACHER, "msmith", "Mary Smith", Role::Teacher, None).unwrap();
    identity
        .insert(STUDENT, "ada", "Ada Lovelace", Role::Student, Some("ST-1001".into()))
        .unwrap();
    identity
        .insert(ORPHAN, "ghost", "No Record", Role::Student, Some("ST-9999".into()))
        .unwrap();
    identity.insert(ODD_KEY, "jdoe", "Jo Doe", Role::Teacher, None).unwrap();
    build_app(AppState::new(services, Arc::new(identity)))
}

async fn call(app: &Router, method: Method, uri: &str, key: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(k) = key {
        req = req.header("X-API-Key", k);
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
}

fn student_body(code: &str, first: &str, class: &str) -> Value {
    json!({
        "studentId": code,
        "firstName": first,
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "className": class,
    })
}

async fn create_student(app: &Router, code: &str, first: &str, class: &str) -> u64 {
    let (status, body) = call(app, Method::POST, "/api/students", Some(TEACHER), Some(student_body(code, first, class))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_u64().unwrap()
}

async fn mark(app: &Router, student: u64, date: &str, status: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/api/attendance",
        Some(TEACHER),
        Some(json!({"studentId": student, "date": date, "status": status, "time": "08:05"})),
    )
    .await
}

#[tokio::test]
async fn health_is_public_and_api_requires_a_key() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(&app, Method::GET, "/api/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(&app, Method::GET, "/api/classes", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, Method::GET, &format!("/api/classes?api_key={TEACHER}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn student_crud_status_codes() {
    let app = app().await;
    let id = create_student(&app, "ST-1001", "Ada", "Class 10-A").await;

    let (status, body) = call(&app, Method::GET, &format!("/api/students/{id}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["studentId"], "ST-1001");
    assert_eq!(body["active"], true);

    let (status, _) = call(&app, Method::POST, "/api/students", Some(TEACHER), Some(student_body("ST-1001", "Bob", "Class 10-A"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::POST, "/api/students", Some(TEACHER), Some(student_body("ST-1002", "Bob", "Class 99-Z"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = call(&app, Method::POST, "/api/students", Some(TEACHER), Some(json!({"studentId": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::PUT, &format!("/api/students/{id}"), Some(TEACHER), Some(student_body("ST-1001", "Augusta", "Class 10-B"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Augusta");
    assert_eq!(body["className"], "Class 10-B");

    let (status, body) = call(&app, Method::GET, "/api/students?className=Class%2010-B", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::GET, "/api/students/abc", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/students/{id}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::DELETE, &format!("/api/students/{id}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_only_see_themselves() {
    let app = app().await;
    let ada = create_student(&app, "ST-1001", "Ada", "Class 10-A").await;
    let bob = create_student(&app, "ST-1002", "Bob", "Class 10-A").await;
    mark(&app, ada, "2024-03-04", "present").await;
    mark(&app, bob, "2024-03-04", "absent").await;

    let (status, _) = call(&app, Method::GET, "/api/students", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::GET, &format!("/api/students/{ada}"), Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Ada");

    let (status, _) = call(&app, Method::GET, &format!("/api/students/{bob}"), Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // asking for someone else's records still yields only their own
    let (status, body) = call(&app, Method::GET, &format!("/api/attendance?studentId={bob}"), Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["studentId"], ada);
    assert_eq!(rows[0]["student"]["firstName"], "Ada");

    let (status, _) = call(&app, Method::POST, "/api/classes", Some(STUDENT), Some(json!({"name": "Class 9-A"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::GET, "/api/reports/students", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::GET, "/api/my-attendance", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&app, Method::GET, "/api/my-profile", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["student"]["studentId"], "ST-1001");

    let (status, body) = call(&app, Method::GET, &format!("/api/students/{ada}/summary"), Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendancePercentage"], 100);
    let (status, _) = call(&app, Method::GET, &format!("/api/students/{bob}/summary"), Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_without_record_gets_not_found() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/my-profile", Some(ORPHAN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student record not found");
    let (status, _) = call(&app, Method::GET, "/api/attendance", Some(ORPHAN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/api/my-profile", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("student").is_none());
}

#[tokio::test]
async fn attendance_rules() {
    let app = app().await;
    let ada = create_student(&app, "ST-1001", "Ada", "Class 10-A").await;

    let (status, body) = mark(&app, ada, "2024-03-04", "late").await;
    assert_eq!(status, StatusCode::CREATED);
    let record = body["id"].as_u64().unwrap();
    assert_eq!(body["status"], "late");

    let (status, _) = mark(&app, ada, "2024-03-04", "present").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = mark(&app, ada, "2024-03-05", "sleeping").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = mark(&app, 999, "2024-03-05", "present").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::PUT, &format!("/api/attendance/{record}"), Some(TEACHER), Some(json!({"status": "excused", "notes": "doctor"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "excused");
    assert_eq!(body["notes"], "doctor");
    assert_eq!(body["time"], "08:05");

    let (status, _) = call(&app, Method::GET, "/api/attendance?date=yesterday", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/api/attendance?date=2024-03-04&className=Class%2010-A", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = call(&app, Method::GET, "/api/activities?limit=1", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["type"], "attendance");

    let (status, _) = call(&app, Method::DELETE, &format!("/api/attendance/{record}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &format!("/api/attendance/{record}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn class_with_students_cannot_be_deleted() {
    let app = app().await;
    let (_, classes) = call(&app, Method::GET, "/api/classes", Some(TEACHER), None).await;
    let class_id = classes[0]["id"].as_u64().unwrap();
    let class_name = classes[0]["name"].as_str().unwrap().to_string();
    create_student(&app, "ST-1001", "Ada", &class_name).await;

    let (status, _) = call(&app, Method::DELETE, &format!("/api/classes/{class_id}"), Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::POST, "/api/classes", Some(TEACHER), Some(json!({"name": "  Class 9-A ", "description": "Junior"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Class 9-A");
    let (status, _) = call(&app, Method::POST, "/api/classes", Some(TEACHER), Some(json!({"name": "Class 9-A"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reports_and_dashboard() {
    let app = app().await;
    let ada = create_student(&app, "ST-1001", "Ada", "Class 10-A").await;
    let bob = create_student(&app, "ST-1002", "Bob", "Class 10-B").await;
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    mark(&app, ada, &today, "present").await;
    mark(&app, bob, &today, "late").await;
    mark(&app, ada, "2024-03-04", "absent").await;

    let (status, body) = call(&app, Method::GET, "/api/dashboard/stats", Some(STUDENT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"totalStudents": 2, "presentToday": 1, "absentToday": 0, "lateToday": 1, "excusedToday": 0}));

    let (status, body) = call(&app, Method::GET, "/api/reports/attendance?startDate=2024-03-03&endDate=2024-03-05", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[1], json!({"date": "2024-03-04", "present": 0, "absent": 1, "late": 0, "excused": 0}));
    assert_eq!(days[0]["absent"], 0);

    let (status, body) = call(&app, Method::GET, "/api/reports/attendance?startDate=2024-03-03&endDate=2024-03-05&className=Class%2010-B", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[1]["absent"], 0);

    let (status, body) = call(&app, Method::GET, "/api/reports/attendance?startDate=2024-03-03", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Start date and end date are required");
    let (status, _) = call(&app, Method::GET, "/api/reports/attendance?startDate=2024-03-05&endDate=2024-03-01", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, Method::GET, "/api/reports/attendance?startDate=2020-01-01&endDate=2024-01-01", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/api/reports/students", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total"], 2);
    assert_eq!(rows[0]["attendancePercentage"], 50);
    assert_eq!(rows[1]["attendancePercentage"], 0);
}

#[tokio::test]
async fn metrics_and_openapi_are_public() {
    let app = app().await;
    call(&app, Method::GET, "/health", None, None).await;

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("attendance_http_requests_total"));

    let (status, body) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/attendance").is_some());
}

#[tokio::test]
async fn query_api_key_is_percent_decoded_and_used_after_a_blank_header() {
    let app = app().await;
    let (status, _) = call(&app, Method::GET, "/api/classes?api_key=t%2Bk%25y%261", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/api/classes?api_key=t+k%25y%261", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, &format!("/api/classes?api_key={TEACHER}"), Some("  "), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/api/classes", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_class_filter_is_trimmed() {
    let app = app().await;
    create_student(&app, "ST-1001", "Ada", "Class 10-A").await;
    create_student(&app, "ST-1002", "Bob", "Class 10-B").await;

    let (status, body) = call(&app, Method::GET, "/api/students?className=%20Class%2010-A%20", Some(TEACHER), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["studentId"], "ST-1001");

    let (_, body) = call(&app, Method::GET, "/api/students?className=%20%20", Some(TEACHER), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn openapi_documents_every_item_route() {
    let app = app().await;
    let (_, doc) = call(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    let paths = &doc["paths"];
    assert!(paths["/api/classes/{id}"].get("get").is_some());
    assert!(paths["/api/attendance/{id}"].get("get").is_some());
    assert!(paths["/api/attendance/{id}"].get("delete").is_some());
    assert!(doc["components"]["schemas"]["HealthResponse"]["properties"].get("version").is_some());
    assert!(paths["/health"]["get"]["responses"]["200"].get("content").is_some());
}
