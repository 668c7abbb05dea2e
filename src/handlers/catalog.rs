// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, services::catalog};

/// Lists every exam with its subjects and question counts.
pub async fn list_exams(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::exam_overview(&pool).await?))
}

/// Lists the subjects of one exam.
pub async fn list_exam_subjects(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::get_exam(&pool, exam_id).await?;
    Ok(Json(catalog::list_subject_summaries(&pool, Some(exam_id)).await?))
}
