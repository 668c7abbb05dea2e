// src/services/import.rs
//
// Bulk question import from comma-separated text.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::CreateQuestionRequest,
    services::catalog,
};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "question_text",
    "option_a",
    "option_b",
    "option_c",
    "option_d",
    "correct_answer",
];

pub const OPTIONAL_COLUMNS: [&str; 1] = ["explanation"];

/// One decoded data row, keyed by lower-cased header name.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based line in the upload where the record starts.
    pub line: usize,
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Splits delimited text into records, honouring double quotes.
///
/// Quoted fields may contain commas, newlines and `""` escapes. Returns each
/// record with the line it starts on.
fn split_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                buf.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut buf)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut buf));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            '\n' => {
                buf.push(ch);
                line += 1;
            }
            _ => buf.push(ch),
        }
    }

    if !buf.is_empty() || !fields.is_empty() {
        fields.push(buf);
        records.push((record_line, fields));
    }

    records
        .into_iter()
        .filter(|(_, f)| !(f.len() == 1 && f[0].trim().is_empty()))
        .collect()
}

/// Decodes an upload into header-keyed rows.
///
/// Fails when the header is absent or lacks a required column.
pub fn parse_csv(text: &str) -> Result<Vec<ImportRow>, AppError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text).into_iter();

    let (_, header) = records
        .next()
        .ok_or(AppError::BadRequest("The uploaded file is empty.".to_string()))?;
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|&c| !header.iter().any(|h| h == c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    }

    Ok(records
        .map(|(line, values)| ImportRow {
            line,
            fields: header.iter().cloned().zip(values).collect(),
        })
        .collect())
}

/// Turns a row into a validated question request, or explains why not.
pub fn row_to_request(row: &ImportRow) -> Result<CreateQuestionRequest, String> {
    let value = |column: &str| {
        row.fields
            .get(column)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|&c| value(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required field(s): {}", missing.join(", ")));
    }

    let req = CreateQuestionRequest {
        question_text: value("question_text").unwrap_or_default(),
        option_a: value("option_a").unwrap_or_default(),
        option_b: value("option_b").unwrap_or_default(),
        option_c: value("option_c").unwrap_or_default(),
        option_d: value("option_d").unwrap_or_default(),
        correct_answer: value("correct_answer").unwrap_or_default(),
        explanation: value(OPTIONAL_COLUMNS[0]),
    }
    .normalized();

    req.validate().map_err(|e| e.to_string())?;
    Ok(req)
}

/// Imports rows into a subject.
///
/// Malformed rows are skipped and reported. Valid rows go in a single
/// transaction: a database failure rolls the whole batch back.
pub async fn import_questions(
    pool: &SqlitePool,
    subject_id: i64,
    rows: Vec<ImportRow>,
) -> Result<ImportOutcome, AppError> {
    let subject = catalog::get_subject(pool, subject_id).await?;

    let mut valid = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in &rows {
        match row_to_request(row) {
            Ok(req) => valid.push(req),
            Err(reason) => rejected.push(RejectedRow {
                line: row.line,
                reason,
            }),
        }
    }

    let mut tx = pool.begin().await?;
    for req in &valid {
        if let Err(e) = catalog::insert_question(&mut *tx, subject.id, req).await {
            tracing::error!("Import into '{}' failed, rolling back: {:?}", subject.name, e);
            tx.rollback().await?;
            return Err(e.into());
        }
    }
    tx.commit().await?;

    tracing::info!(
        "Imported {} questions into '{}' ({} rejected)",
        valid.len(),
        subject.name,
        rejected.len()
    );

    Ok(ImportOutcome {
        imported: valid.len(),
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "question_text,option_a,option_b,option_c,option_d,correct_answer,explanation";

    #[test]
    fn test_parse_quoted_fields() {
        let text = format!(
            "{HEADER}\r\n\"What is 1,000 + 1?\",1001,1000,\"say \"\"hi\"\"\",0,a,\"multi\nline\"\r\n"
        );
        let rows = parse_csv(&text).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.line, 2);
        assert_eq!(row.fields["question_text"], "What is 1,000 + 1?");
        assert_eq!(row.fields["option_c"], "say \"hi\"");
        assert_eq!(row.fields["explanation"], "multi\nline");
    }

    #[test]
    fn test_header_is_case_insensitive_and_reorderable() {
        let text = "Correct_Answer,Option_D,Option_C,Option_B,Option_A,Question_Text\nB,d,c,b,a,Q?";
        let rows = parse_csv(text).unwrap();
        let req = row_to_request(&rows[0]).unwrap();
        assert_eq!(req.correct_answer, "B");
        assert_eq!(req.option_a, "a");
        assert_eq!(req.explanation, None);
    }

    #[test]
    fn test_missing_required_column_rejects_upload() {
        let err = parse_csv("question_text,option_a,option_b\nQ,a,b").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_blank_lines_are_skipped_and_lines_counted() {
        let text = format!("{HEADER}\n\nQ1,a,b,c,d,A,\n\nQ2,a,b,c,d,B,why\n");
        let rows = parse_csv(&text).unwrap();
        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_row_rejections() {
        let text = format!("{HEADER}\nQ1,a,b,c,d,,x\nQ2,a,b,c,d,E,\nQ3,a,b\n");
        let rows = parse_csv(&text).unwrap();

        let missing_answer = row_to_request(&rows[0]).unwrap_err();
        assert!(missing_answer.contains("correct_answer"));

        let bad_letter = row_to_request(&rows[1]).unwrap_err();
        assert!(bad_letter.contains("A, B, C, or D"));

        let short = row_to_request(&rows[2]).unwrap_err();
        assert!(short.contains("option_c"));
    }
}
