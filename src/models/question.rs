// src/models/question.rs

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// The only letters a correct answer may take.
pub const ANSWER_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub subject_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    /// One of A/B/C/D.
    pub correct_answer: String,

    pub explanation: Option<String>,
}

impl Question {
    pub fn options(&self) -> OptionSet {
        OptionSet {
            a: self.option_a.clone(),
            b: self.option_b.clone(),
            c: self.option_c.clone(),
            d: self.option_d.clone(),
        }
    }
}

/// The four options of a question, keyed by letter on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionSet {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

/// DTO for sending a question to a student (excludes answer and explanation).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub subject_id: i64,
    pub question_text: String,
    pub options: OptionSet,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        let options = q.options();
        Self {
            id: q.id,
            subject_id: q.subject_id,
            question_text: q.question_text,
            options,
        }
    }
}

/// DTO for creating a new question. Also the target of each imported row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000, message = "Question text is required"))]
    pub question_text: String,
    #[validate(length(min = 1, max = 500, message = "Option A is required"))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500, message = "Option B is required"))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500, message = "Option C is required"))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500, message = "Option D is required"))]
    pub option_d: String,
    #[validate(custom(function = validate_answer_letter))]
    pub correct_answer: String,
    #[validate(length(max = 5000))]
    pub explanation: Option<String>,
}

impl CreateQuestionRequest {
    /// Trims every field, upper-cases the answer letter and drops a blank explanation.
    pub fn normalized(self) -> Self {
        Self {
            question_text: self.question_text.trim().to_string(),
            option_a: self.option_a.trim().to_string(),
            option_b: self.option_b.trim().to_string(),
            option_c: self.option_c.trim().to_string(),
            option_d: self.option_d.trim().to_string(),
            correct_answer: self.correct_answer.trim().to_uppercase(),
            explanation: normalize_optional(self.explanation),
        }
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub question_text: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_a: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_b: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_c: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_d: Option<String>,
    #[validate(custom(function = validate_answer_letter))]
    pub correct_answer: Option<String>,
    #[validate(length(max = 5000))]
    pub explanation: Option<String>,
}

impl UpdateQuestionRequest {
    pub fn normalized(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            question_text: trim(self.question_text),
            option_a: trim(self.option_a),
            option_b: trim(self.option_b),
            option_c: trim(self.option_c),
            option_d: trim(self.option_d),
            correct_answer: self.correct_answer.map(|s| s.trim().to_uppercase()),
            explanation: trim(self.explanation),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
            && self.option_a.is_none()
            && self.option_b.is_none()
            && self.option_c.is_none()
            && self.option_d.is_none()
            && self.correct_answer.is_none()
            && self.explanation.is_none()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_answer_letter(letter: &str) -> Result<(), ValidationError> {
    if !ANSWER_LETTERS.contains(&letter) {
        return Err(ValidationError::new("invalid_answer_letter")
            .with_message(Cow::Borrowed("Correct answer must be A, B, C, or D.")));
    }
    Ok(())
}
