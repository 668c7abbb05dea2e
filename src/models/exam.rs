// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::subject::SubjectSummary;

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: i64,

    /// Unique exam type name (e.g., "JAMB").
    pub name: String,

    pub description: Option<String>,
}

/// Dashboard view: an exam with its subjects.
#[derive(Debug, Serialize)]
pub struct ExamOverview {
    #[serde(flatten)]
    pub exam: Exam,
    pub subjects: Vec<SubjectSummary>,
}

/// DTO for creating a new exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 50, message = "Exam name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

/// DTO for updating an exam. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 50, message = "Exam name must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}
