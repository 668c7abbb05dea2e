// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        exam::{CreateExamRequest, UpdateExamRequest},
        question::{CreateQuestionRequest, UpdateQuestionRequest},
        subject::{CreateSubjectRequest, UpdateSubjectRequest},
    },
    services::{catalog, import},
};

/// Lists all exams.
/// Admin only.
pub async fn list_exams(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_exams(&pool).await?))
}

/// Creates a new exam type.
/// Admin only.
pub async fn create_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = catalog::create_exam(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

/// Updates an exam's name or description.
/// Admin only.
pub async fn update_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_exam(&pool, id, payload).await?))
}

/// Deletes an exam with all of its subjects and questions.
/// Admin only.
pub async fn delete_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_exam(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists subjects grouped by exam, with question counts.
/// Admin only.
pub async fn list_subjects(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_subject_summaries(&pool, None).await?))
}

/// Adds a subject to an exam.
/// Admin only.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subject = catalog::create_subject(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

/// Admin only.
pub async fn get_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_subject(&pool, id).await?))
}

/// Renames a subject.
/// Admin only.
pub async fn update_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_subject(&pool, id, payload).await?))
}

/// Deletes a subject and its questions.
/// Admin only.
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_subject(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists a subject's questions, newest first, answers included.
/// Admin only.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_questions(&pool, subject_id).await?))
}

/// Creates a new question under a subject.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = catalog::create_question(&pool, subject_id, payload).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Admin only.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_question(&pool, id).await?))
}

/// Updates a question by ID.
/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::update_question(&pool, id, payload).await?))
}

/// Deletes a question by ID.
/// Admin only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_question(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk-imports questions from an uploaded CSV (multipart field `file`).
///
/// Responds with the imported count and the rejected rows.
/// Admin only.
pub async fn import_questions(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::BadRequest("The uploaded file must be UTF-8 text.".to_string()))?;
        upload = Some(text);
        break;
    }

    let text = upload.ok_or(AppError::BadRequest("No file uploaded.".to_string()))?;
    let rows = import::parse_csv(&text)?;
    let outcome = import::import_questions(&pool, subject_id, rows).await?;

    Ok(Json(json!({
        "imported": outcome.imported,
        "rejected": outcome.rejected,
    })))
}
