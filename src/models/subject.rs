// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' table in the database.
/// (name, exam_id) is unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub exam_id: i64,
}

/// Subject row joined with its question count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubjectSummary {
    pub id: i64,
    pub name: String,
    pub exam_id: i64,
    pub question_count: i64,
}

/// DTO for creating a subject under an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    pub exam_id: i64,
    #[validate(length(min = 1, max = 50, message = "Subject name must be between 1 and 50 characters"))]
    pub name: String,
}

/// DTO for renaming a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubjectRequest {
    #[validate(length(min = 1, max = 50, message = "Subject name must be between 1 and 50 characters"))]
    pub name: String,
}
