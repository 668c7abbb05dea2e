// src/models/attempt.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::question::{OptionSet, PublicQuestion},
};

/// Questions drawn from one subject, in serving order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptSection {
    pub subject_id: i64,
    pub subject_name: String,
    pub question_ids: Vec<i64>,
}

/// The fixed set of questions served to one student.
///
/// Once assembled it never changes; grading walks exactly these ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attempt {
    pub subject_label: String,
    pub sections: Vec<AttemptSection>,
    pub started_at: DateTime<Utc>,
}

impl Attempt {
    /// All served question ids, grouped by subject.
    pub fn served_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.sections.iter().flat_map(|s| s.question_ids.iter().copied())
    }

    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.question_ids.len()).sum()
    }
}

/// Grading of a single served question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionResult {
    pub question_id: i64,
    pub question_text: String,
    pub options: OptionSet,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// Result report for a submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub subject_label: String,
    pub score: usize,
    pub total_questions: usize,
    pub started_at: DateTime<Utc>,
    pub results: Vec<QuestionResult>,
}

/// A graded attempt waiting to be read.
///
/// Only the served ids and the answers are kept; the report is rebuilt from
/// the catalog when it is read. `receipt` identifies the submission so it can
/// be redeemed once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub attempt: Attempt,
    pub answers: HashMap<i64, String>,
    pub receipt: String,
}

/// Lifecycle of one student's attempt.
///
/// `NotStarted -> Assembled -> Submitted -> Consumed`. A new attempt may be
/// started from any state and replaces whatever was there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum AttemptState {
    #[default]
    NotStarted,
    Assembled(Attempt),
    Submitted(Submission),
    Consumed,
}

impl AttemptState {
    /// The attempt awaiting submission, if any.
    pub fn assembled(&self) -> Result<&Attempt, AppError> {
        match self {
            AttemptState::Assembled(attempt) => Ok(attempt),
            _ => Err(AppError::BadRequest(
                "No exam in progress. Start an exam before submitting.".to_string(),
            )),
        }
    }

    /// Moves an assembled attempt to `Submitted`.
    ///
    /// Answers for questions that were not served are dropped.
    pub fn submit(
        self,
        mut answers: HashMap<i64, String>,
        receipt: String,
    ) -> Result<Self, AppError> {
        match self {
            AttemptState::Assembled(attempt) => {
                let served: HashSet<i64> = attempt.served_ids().collect();
                answers.retain(|id, _| served.contains(id));
                Ok(AttemptState::Submitted(Submission {
                    attempt,
                    answers,
                    receipt,
                }))
            }
            _ => Err(AppError::BadRequest(
                "No exam in progress. Start an exam before submitting.".to_string(),
            )),
        }
    }

    /// Hands out the submission once. Every later call yields `None`.
    pub fn take_submission(&mut self) -> Option<Submission> {
        match std::mem::take(self) {
            AttemptState::Submitted(submission) => {
                *self = AttemptState::Consumed;
                Some(submission)
            }
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Claims of the client-held exam-session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username the session belongs to.
    pub sub: String,
    pub exp: usize,
    pub attempt: AttemptState,
}

/// Request body for starting a JAMB mock.
#[derive(Debug, Deserialize)]
pub struct CompositeAttemptRequest {
    pub subject_ids: Vec<i64>,
}

/// Response for a freshly assembled attempt.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub session: String,
    pub subject_label: String,
    pub total_questions: usize,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for submitting answers.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    /// Key: question id. Value: selected letter.
    #[serde(default)]
    pub answers: HashMap<i64, String>,
}
