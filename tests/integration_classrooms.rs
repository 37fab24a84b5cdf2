mod common;

use axum::http::StatusCode;
use classbook_models::AcademicLevel;
use common::{
    TestApp, classroom_payload, sample_classroom, sample_grade, sample_student, sample_teacher,
};
use serde_json::json;

#[tokio::test]
async fn test_create_classroom_returns_bare_grade_id() {
    let app = TestApp::new();
    let grade = sample_grade(&app.store, "5th", 5).await;

    let mut payload = classroom_payload("MATH-5A");
    payload["grade"] = json!(grade.id.get());
    let (status, body) = app.post("/api/classrooms", payload).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["identifier"], "MATH-5A");
    assert_eq!(body["days_of_week"], "1,3,5");
    assert_eq!(body["time"], "10:30:00");
    assert_eq!(body["grade"], json!(grade.id.get()));
}

#[tokio::test]
async fn test_grade_is_optional() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/classrooms", classroom_payload("ART-1")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["grade"].is_null());
}

#[tokio::test]
async fn test_weekday_out_of_range() {
    let app = TestApp::new();

    let mut payload = classroom_payload("MATH-5A");
    payload["days_of_week"] = json!("1,8");
    let (status, body) = app.post("/api/classrooms", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["days_of_week"],
        json!(["Days of the week must be between 1 and 7"])
    );
}

#[tokio::test]
async fn test_non_numeric_weekdays_report_both_reasons() {
    let app = TestApp::new();

    let mut payload = classroom_payload("MATH-5A");
    payload["days_of_week"] = json!("a,b");
    let (status, body) = app.post("/api/classrooms", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["days_of_week"],
        json!([
            "Enter only digits separated by commas.",
            "Days of the week must be a comma separated integer list"
        ])
    );
}

#[tokio::test]
async fn test_bad_time_is_rejected() {
    let app = TestApp::new();

    let mut payload = classroom_payload("MATH-5A");
    payload["time"] = json!("noon");
    let (status, body) = app.post("/api/classrooms", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["time"].is_array());
}

#[tokio::test]
async fn test_identifier_is_unique() {
    let app = TestApp::new();
    sample_classroom(&app.store, "MATH-5A", None).await;

    let (status, body) = app.post("/api/classrooms", classroom_payload("MATH-5A")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["identifier"][0],
        "classroom with this identifier already exists."
    );
}

#[tokio::test]
async fn test_update_may_keep_own_identifier() {
    let app = TestApp::new();
    let classroom = sample_classroom(&app.store, "MATH-5A", None).await;

    let mut payload = classroom_payload("MATH-5A");
    payload["room"] = json!("C3");
    let (status, body) = app
        .put(&format!("/api/classrooms/{}", classroom.id), payload)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"], "C3");
}

#[tokio::test]
async fn test_unknown_grade_reference() {
    let app = TestApp::new();

    let mut payload = classroom_payload("MATH-5A");
    payload["grade"] = json!(99);
    let (status, body) = app.post("/api/classrooms", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["grade"][0],
        "Invalid pk \"99\" - object does not exist."
    );
    assert!(app.store.list_classrooms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_and_detail_shapes() {
    let app = TestApp::new();
    let grade = sample_grade(&app.store, "5th", 5).await;
    sample_classroom(&app.store, "SCI-5A", None).await;
    let math = sample_classroom(&app.store, "MATH-5A", Some(grade.id)).await;

    let (status, list) = app.get("/api/classrooms").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["identifier"], "MATH-5A");
    assert_eq!(list[0]["grade"], json!(grade.id.get()));

    let (status, detail) = app.get(&format!("/api/classrooms/{}", math.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        detail["grade"],
        json!({"id": grade.id.get(), "name": "5th", "rank": 5})
    );
    assert_eq!(detail["name"], "Class MATH-5A");
}

#[tokio::test]
async fn test_patch_grade_null_detaches() {
    let app = TestApp::new();
    let grade = sample_grade(&app.store, "5th", 5).await;
    let classroom = sample_classroom(&app.store, "MATH-5A", Some(grade.id)).await;
    let uri = format!("/api/classrooms/{}", classroom.id);

    let (status, body) = app.patch(&uri, json!({"room": "D4"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"], "D4");
    assert_eq!(body["grade"], json!(grade.id.get()));

    let (status, body) = app.patch(&uri, json!({"grade": null})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["grade"].is_null());
    assert_eq!(body["room"], "D4");
}

#[tokio::test]
async fn test_patch_validates_present_fields_only() {
    let app = TestApp::new();
    let classroom = sample_classroom(&app.store, "MATH-5A", None).await;

    let (status, body) = app
        .patch(
            &format!("/api/classrooms/{}", classroom.id),
            json!({"days_of_week": "0"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fields"].as_object().unwrap();
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["days_of_week"]);
}

#[tokio::test]
async fn test_delete_classroom_removes_memberships() {
    let app = TestApp::new();
    let math = sample_classroom(&app.store, "MATH-5A", None).await;
    let art = sample_classroom(&app.store, "ART-5A", None).await;
    let student =
        sample_student(&app.store, "Ana Souza", "S-1", None, &[math.id, art.id], true).await;
    let teacher = sample_teacher(
        &app.store,
        "Helena Prado",
        "T-1",
        AcademicLevel::Master,
        &[math.id],
        true,
    )
    .await;

    let (status, _) = app.delete(&format!("/api/classrooms/{}", math.id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let student = app.store.get_student(student.id()).await.unwrap().unwrap();
    assert_eq!(student.classes, vec![art.id]);
    let teacher = app.store.get_teacher(teacher.id()).await.unwrap().unwrap();
    assert!(teacher.classes.is_empty());

    let (status, _) = app.delete(&format!("/api/classrooms/{}", math.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_classroom_id() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/classrooms/first").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found.");
}
