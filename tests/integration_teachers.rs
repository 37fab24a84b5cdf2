mod common;

use axum::http::StatusCode;
use classbook_models::AcademicLevel;
use common::{TestApp, sample_classroom, sample_teacher, student_payload};
use serde_json::{Value, json};

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|teacher| teacher["fullname"].as_str().unwrap())
        .collect()
}

async fn faculty(app: &TestApp) {
    let math = sample_classroom(&app.store, "MATH-5A", None).await;
    let art = sample_classroom(&app.store, "ART-5A", None).await;
    let faculty = [
        ("Helena Prado", "T-1", AcademicLevel::Doctor, vec![math.id], true),
        ("Igor Ramos", "T-2", AcademicLevel::Master, vec![art.id], true),
        ("Davi Nunes", "T-3", AcademicLevel::Graduate, vec![], true),
        ("Eva Costa", "T-4", AcademicLevel::Master, vec![math.id], false),
    ];
    for (fullname, id_doc, level, classes, active) in faculty {
        sample_teacher(&app.store, fullname, id_doc, level, &classes, active).await;
    }
}

#[tokio::test]
async fn test_list_shape_and_order() {
    let app = TestApp::new();
    faculty(&app).await;

    let (status, body) = app.get("/api/members/teachers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Davi Nunes", "Helena Prado", "Igor Ramos"]);

    let helena = body[1].as_object().unwrap();
    assert_eq!(helena["firstname"], "Helena");
    assert_eq!(helena["academic_level"], "Dr");
    assert_eq!(helena["active"], true);
    for hidden in [
        "monthly_payment",
        "register_date",
        "departure_date",
        "bank_agency",
        "bank_account",
        "classes",
    ] {
        assert!(!helena.contains_key(hidden), "{hidden} must not be listed");
    }
}

#[tokio::test]
async fn test_show_inactive() {
    let app = TestApp::new();
    faculty(&app).await;

    let (_, body) = app.get("/api/members/teachers?show_inactive=1").await;

    assert_eq!(
        names(&body),
        vec!["Davi Nunes", "Eva Costa", "Helena Prado", "Igor Ramos"]
    );
}

#[tokio::test]
async fn test_repeated_query_key_keeps_last_value() {
    let app = TestApp::new();
    faculty(&app).await;

    let (status, body) = app
        .get("/api/members/teachers?academic_level=Dr&academic_level=Ms")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Igor Ramos"]);
}

#[tokio::test]
async fn test_filter_by_academic_level() {
    let app = TestApp::new();
    faculty(&app).await;

    let (_, body) = app.get("/api/members/teachers?academic_level=Ms").await;
    assert_eq!(names(&body), vec!["Igor Ramos"]);

    let (_, body) = app
        .get("/api/members/teachers?academic_level=Gr,Dr&show_inactive=1")
        .await;
    assert_eq!(names(&body), vec!["Davi Nunes", "Helena Prado"]);

    let (status, body) = app.get("/api/members/teachers?academic_level=Phd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_filter_by_classes() {
    let app = TestApp::new();
    faculty(&app).await;
    let math = app.store.list_classrooms().await.unwrap()[1].id;

    let (_, body) = app
        .get(&format!("/api/members/teachers?classes={}", math))
        .await;
    assert_eq!(names(&body), vec!["Helena Prado"]);

    let (_, body) = app
        .get(&format!("/api/members/teachers?classes={}&show_inactive=1", math))
        .await;
    assert_eq!(names(&body), vec!["Eva Costa", "Helena Prado"]);

    // Ignored when malformed.
    let (_, body) = app.get("/api/members/teachers?classes=x").await;
    assert_eq!(names(&body).len(), 3);
}

#[tokio::test]
async fn test_detail_includes_bank_and_classes() {
    let app = TestApp::new();
    let math = sample_classroom(&app.store, "MATH-5A", None).await;
    let teacher = sample_teacher(
        &app.store,
        "Helena Prado",
        "T-1",
        AcademicLevel::Doctor,
        &[math.id],
        false,
    )
    .await;

    let (status, body) = app
        .get(&format!("/api/members/teachers/{}", teacher.id()))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bank_agency"], 1234);
    assert_eq!(body["bank_account"], 998877);
    assert_eq!(body["academic_level"], "Dr");
    assert_eq!(body["monthly_payment"], "450.00");
    assert_eq!(body["active"], false);
    assert_eq!(body["classes"][0]["identifier"], "MATH-5A");
    assert_eq!(body["birthdate"], "1980-01-20");
}

#[tokio::test]
async fn test_unknown_teacher_is_not_found() {
    let app = TestApp::new();

    for uri in ["/api/members/teachers/404", "/api/members/teachers/abc"] {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_writes_are_not_allowed() {
    let app = TestApp::new();
    let teacher =
        sample_teacher(&app.store, "Helena Prado", "T-1", AcademicLevel::Doctor, &[], true).await;
    let uri = format!("/api/members/teachers/{}", teacher.id());

    let (status, body) = app
        .post("/api/members/teachers", student_payload("Igor Ramos", "T-2"))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method \"POST\" not allowed.");

    let (status, _) = app.put(&uri, json!({"fullname": "Other"})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = app.patch(&uri, json!({"fullname": "Other"})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method \"DELETE\" not allowed.");

    let stored = app.store.get_teacher(teacher.id()).await.unwrap().unwrap();
    assert_eq!(stored, teacher);
}
