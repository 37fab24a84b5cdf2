#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate, NaiveTime};
use classbook::router::init_router;
use classbook::state::AppState;
use classbook_auth::create_access_token;
use classbook_config::{CorsConfig, JwtConfig};
use classbook_db::{MemoryStore, SchoolStore};
use classbook_models::validation::today;
use classbook_models::{
    AcademicLevel, Classroom, ClassroomData, ClassroomId, DaysOfWeek, Grade, GradeData, GradeId,
    MemberData, Money, Sex, Student, StudentData, Teacher, TeacherData,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
    }
}

/// A router over a fresh in-memory store, plus a token it accepts.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn SchoolStore>,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let store: Arc<dyn SchoolStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), jwt_config(), CorsConfig::default());
        let token = create_access_token(1, "registrar@school.test", &jwt_config()).unwrap();

        Self {
            router: init_router(state),
            store,
            token,
        }
    }

    /// Sends a request with the test token.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(&self.router, method, uri, Some(&self.token), body).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// ============================================================================
// Stored fixtures
// ============================================================================

pub async fn sample_grade(store: &Arc<dyn SchoolStore>, name: &str, rank: i32) -> Grade {
    store
        .create_grade(GradeData {
            name: name.to_string(),
            rank,
        })
        .await
        .unwrap()
}

pub async fn sample_classroom(
    store: &Arc<dyn SchoolStore>,
    identifier: &str,
    grade: Option<GradeId>,
) -> Classroom {
    store
        .create_classroom(ClassroomData {
            name: format!("Class {}", identifier),
            identifier: identifier.to_string(),
            room: "B12".to_string(),
            days_of_week: DaysOfWeek::new("1,3,5").unwrap(),
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            grade,
        })
        .await
        .unwrap()
}

pub fn member_data(fullname: &str, id_doc: &str, active: bool) -> MemberData {
    MemberData {
        fullname: fullname.to_string(),
        id_doc: id_doc.to_string(),
        birthdate: date(2012, 4, 9),
        sex: Sex::Female,
        monthly_payment: Money::from_cents(45_000),
        active,
        departure_date: None,
        email: "family@example.com".to_string(),
        phone_number: "555-0100".to_string(),
        address: "12 School Street".to_string(),
    }
}

pub async fn sample_student(
    store: &Arc<dyn SchoolStore>,
    fullname: &str,
    id_doc: &str,
    grade: Option<GradeId>,
    classes: &[ClassroomId],
    active: bool,
) -> Student {
    store
        .create_student(StudentData {
            member: member_data(fullname, id_doc, active),
            grade,
            guardian1: "Paula Souza".to_string(),
            guardian2: String::new(),
            classes: classes.to_vec(),
        })
        .await
        .unwrap()
}

pub async fn sample_teacher(
    store: &Arc<dyn SchoolStore>,
    fullname: &str,
    id_doc: &str,
    academic_level: AcademicLevel,
    classes: &[ClassroomId],
    active: bool,
) -> Teacher {
    let mut member = member_data(fullname, id_doc, active);
    member.birthdate = date(1980, 1, 20);
    store
        .create_teacher(TeacherData {
            member,
            academic_level,
            bank_agency: 1234,
            bank_account: 998877,
            classes: classes.to_vec(),
        })
        .await
        .unwrap()
}

// ============================================================================
// Request payloads
// ============================================================================

pub fn student_payload(fullname: &str, id_doc: &str) -> Value {
    json!({
        "fullname": fullname,
        "id_doc": id_doc,
        "birthdate": "2011-06-15",
        "sex": "F",
        "monthly_payment": "450.00",
        "email": "ana@example.com",
        "phone_number": "555-0101",
        "address": "1 Main Street",
        "guardian1": "Maria Souza",
    })
}

pub fn classroom_payload(identifier: &str) -> Value {
    json!({
        "name": "Mathematics",
        "identifier": identifier,
        "room": "B12",
        "days_of_week": "1,3,5",
        "time": "10:30",
    })
}

pub fn future_date() -> String {
    (today() + Duration::days(30)).to_string()
}
