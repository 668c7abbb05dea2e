// tests/catalog_tests.rs

mod common;

use common::{question, subject_with_questions, test_pool};
use exam_portal::{
    error::AppError,
    models::{
        exam::CreateExamRequest,
        question::UpdateQuestionRequest,
        subject::{CreateSubjectRequest, UpdateSubjectRequest},
    },
    services::catalog,
};

#[tokio::test]
async fn seed_is_idempotent() {
    let pool = test_pool().await;
    catalog::seed_exams(&pool).await.unwrap();
    catalog::seed_exams(&pool).await.unwrap();

    let names: Vec<String> = catalog::list_exams(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["JAMB", "WAEC", "NECO"]);
}

#[tokio::test]
async fn duplicate_subject_in_same_exam_conflicts() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    let neco = catalog::find_exam_by_name(&pool, "NECO").await.unwrap().unwrap();

    let req = |exam_id, name: &str| CreateSubjectRequest {
        exam_id,
        name: name.to_string(),
    };

    catalog::create_subject(&pool, req(waec.id, "Biology")).await.unwrap();

    let dup = catalog::create_subject(&pool, req(waec.id, "  Biology ")).await;
    assert!(matches!(dup, Err(AppError::Conflict(msg)) if msg.contains("WAEC")));

    // Same name under another exam is fine.
    catalog::create_subject(&pool, req(neco.id, "Biology")).await.unwrap();

    let blank = catalog::create_subject(&pool, req(waec.id, "   ")).await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let unknown = catalog::create_subject(&pool, req(9999, "Physics")).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn renaming_onto_existing_subject_conflicts() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    subject_with_questions(&pool, waec.id, "Physics", 0).await;
    let chem = subject_with_questions(&pool, waec.id, "Chemistry", 0).await;

    let result = catalog::update_subject(
        &pool,
        chem,
        UpdateSubjectRequest {
            name: "Physics".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn deleting_subject_removes_its_questions() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    let keep = subject_with_questions(&pool, waec.id, "Economics", 2).await;
    let doomed = subject_with_questions(&pool, waec.id, "Geography", 3).await;

    let removed = catalog::delete_subject(&pool, doomed).await.unwrap();
    assert_eq!(removed, 3);

    assert!(matches!(
        catalog::get_subject(&pool, doomed).await,
        Err(AppError::NotFound(_))
    ));
    assert!(catalog::question_ids_for_subject(&pool, doomed).await.unwrap().is_empty());
    assert_eq!(catalog::question_ids_for_subject(&pool, keep).await.unwrap().len(), 2);

    assert!(matches!(
        catalog::delete_subject(&pool, doomed).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_exam_removes_subjects_and_questions() {
    let pool = test_pool().await;
    let exam = catalog::create_exam(
        &pool,
        CreateExamRequest {
            name: "POST-UTME".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    let subject = subject_with_questions(&pool, exam.id, "Literature", 4).await;

    catalog::delete_exam(&pool, exam.id).await.unwrap();

    assert!(matches!(catalog::get_subject(&pool, subject).await, Err(AppError::NotFound(_))));
    assert!(catalog::question_ids_for_subject(&pool, subject).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_exam_name_conflicts() {
    let pool = test_pool().await;
    let result = catalog::create_exam(
        &pool,
        CreateExamRequest {
            name: "JAMB".to_string(),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn questions_always_hold_a_valid_letter() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    let subject = subject_with_questions(&pool, waec.id, "Mathematics", 0).await;

    let created = catalog::create_question(&pool, subject, question("1 + 1?", " c "))
        .await
        .unwrap();
    assert_eq!(created.correct_answer, "C");

    let bad = catalog::create_question(&pool, subject, question("2 + 2?", "F")).await;
    assert!(matches!(bad, Err(AppError::BadRequest(_))));

    let bad_update = catalog::update_question(
        &pool,
        created.id,
        UpdateQuestionRequest {
            correct_answer: Some("Z".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_update, Err(AppError::BadRequest(_))));

    let updated = catalog::update_question(
        &pool,
        created.id,
        UpdateQuestionRequest {
            correct_answer: Some("d".to_string()),
            explanation: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.correct_answer, "D");
    assert_eq!(updated.explanation, None);
    assert_eq!(updated.question_text, "1 + 1?");

    for q in catalog::list_questions(&pool, subject).await.unwrap() {
        assert!(["A", "B", "C", "D"].contains(&q.correct_answer.as_str()));
        let option = match q.correct_answer.as_str() {
            "A" => &q.option_a,
            "B" => &q.option_b,
            "C" => &q.option_c,
            _ => &q.option_d,
        };
        assert!(!option.is_empty());
    }
}

#[tokio::test]
async fn questions_listed_newest_first() {
    let pool = test_pool().await;
    let waec = catalog::find_exam_by_name(&pool, "WAEC").await.unwrap().unwrap();
    let subject = subject_with_questions(&pool, waec.id, "Civic Education", 3).await;

    let ids: Vec<i64> = catalog::list_questions(&pool, subject)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn overview_counts_questions_per_subject() {
    let pool = test_pool().await;
    let jamb = catalog::find_exam_by_name(&pool, "JAMB").await.unwrap().unwrap();
    subject_with_questions(&pool, jamb.id, "Physics", 5).await;
    subject_with_questions(&pool, jamb.id, "Biology", 0).await;

    let overview = catalog::exam_overview(&pool).await.unwrap();
    let jamb_view = overview.iter().find(|o| o.exam.name == "JAMB").unwrap();
    let counts: Vec<(String, i64)> = jamb_view
        .subjects
        .iter()
        .map(|s| (s.name.clone(), s.question_count))
        .collect();
    assert_eq!(
        counts,
        vec![("Biology".to_string(), 0), ("Physics".to_string(), 5)]
    );
}
