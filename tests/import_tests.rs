// tests/import_tests.rs

mod common;

use common::{TestApp, spawn_app, subject_with_questions, test_pool};
use exam_portal::{
    error::AppError,
    services::{catalog, import},
};
use serde_json::Value;

const HEADER: &str = "question_text,option_a,option_b,option_c,option_d,correct_answer,explanation";

async fn upload(app: &TestApp, token: &str, subject_id: i64, csv: String) -> reqwest::Response {
    let part = reqwest::multipart::Part::text(csv)
        .file_name("questions.csv")
        .mime_str("text/csv")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    app.client
        .post(app.url(&format!(
            "/api/admin/subjects/{}/questions/import",
            subject_id
        )))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn import_keeps_good_rows_and_reports_bad_ones() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let waec = app.exam_id("WAEC").await;
    let subject_id = subject_with_questions(&app.pool, waec, "English Language", 0).await;

    let csv = format!(
        "{HEADER}\n\
         \"Choose the synonym of 'big'\",small,large,thin,short,B,Large means big\n\
         Opposite of hot,cold,warm,boiling,tepid,a,\n\
         Missing answer row,one,two,three,four,,no key\n"
    );

    let response = upload(&app, &admin, subject_id, csv).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["imported"], 2);

    let rejected = body["rejected"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["line"], 4);
    assert!(rejected[0]["reason"].as_str().unwrap().contains("correct_answer"));

    let stored = catalog::list_questions(&app.pool, subject_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().any(|q| q.correct_answer == "A"));
}

#[tokio::test]
async fn import_requires_admin() {
    let app = spawn_app().await;
    let student = app.student_token().await;
    let waec = app.exam_id("WAEC").await;
    let subject_id = subject_with_questions(&app.pool, waec, "Literature", 0).await;

    let response = upload(&app, &student, subject_id, format!("{HEADER}\nQ,a,b,c,d,A,\n")).await;
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn import_with_missing_column_is_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let waec = app.exam_id("WAEC").await;
    let subject_id = subject_with_questions(&app.pool, waec, "History", 0).await;

    let csv = "question_text,option_a,option_b,option_c,option_d\nQ,a,b,c,d\n".to_string();
    let response = upload(&app, &admin, subject_id, csv).await;
    assert_eq!(response.status().as_u16(), 400);

    assert!(catalog::list_questions(&app.pool, subject_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn import_into_unknown_subject_is_not_found() {
    let pool = test_pool().await;
    let rows = import::parse_csv(&format!("{HEADER}\nQ,a,b,c,d,A,\n")).unwrap();

    let result = import::import_questions(&pool, 31337, rows).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn imported_rows_are_served_in_exams() {
    let pool = test_pool().await;
    let neco = catalog::find_exam_by_name(&pool, "NECO").await.unwrap().unwrap();
    let subject_id = subject_with_questions(&pool, neco.id, "Biology", 0).await;

    let rows = import::parse_csv(&format!(
        "{HEADER}\nCell powerhouse?,Nucleus,Mitochondria,Ribosome,Golgi,B,\nBad,a,b,c,d,X,\n"
    ))
    .unwrap();
    let outcome = import::import_questions(&pool, subject_id, rows).await.unwrap();
    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].line, 3);

    let ids = catalog::question_ids_for_subject(&pool, subject_id).await.unwrap();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn database_failure_rolls_back_whole_import() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    let subject_id = subject_with_questions(&pool, waec.id, "Geography", 0).await;

    sqlx::query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON questions \
         WHEN NEW.question_text = 'Boom' \
         BEGIN SELECT RAISE(ABORT, 'boom'); END;",
    )
    .execute(&pool)
    .await
    .unwrap();

    let rows = import::parse_csv(&format!(
        "{HEADER}\nLongest river?,Nile,Niger,Benue,Congo,A,\nBoom,a,b,c,d,B,\nLargest desert?,Kalahari,Sahara,Namib,Gobi,B,\n"
    ))
    .unwrap();

    let result = import::import_questions(&pool, subject_id, rows).await;
    assert!(matches!(result, Err(AppError::InternalServerError(_))));

    let ids = catalog::question_ids_for_subject(&pool, subject_id).await.unwrap();
    assert!(ids.is_empty());
}
