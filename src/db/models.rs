use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::db::types::{AnswerOption, Subject, UserRole};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub login: String,
    pub password: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub email: String,
    pub password: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_login: OffsetDateTime,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The four labeled option texts of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl QuestionOptions {
    pub fn get(&self, option: AnswerOption) -> &str {
        match option {
            AnswerOption::A => &self.a,
            AnswerOption::B => &self.b,
            AnswerOption::C => &self.c,
            AnswerOption::D => &self.d,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnswerOption, &str)> {
        AnswerOption::ALL.into_iter().map(move |option| (option, self.get(option)))
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub number: i64,
    pub subject: Subject,
    pub subject_name: String,
    pub text: String,
    pub formula: Option<String>,
    pub options: Json<QuestionOptions>,
    pub correct_answer: AnswerOption,
    pub explanation: Option<String>,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub used: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub used_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_class: String,
    pub total_score: i64,
    pub total_questions: i64,
    pub percentage: i64,
    pub subject_scores: Json<BTreeMap<Subject, i64>>,
    pub subject_totals: Json<BTreeMap<Subject, i64>>,
    pub test_duration_ms: i64,
    pub answers: Json<BTreeMap<usize, AnswerOption>>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub data: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct CurrentSession {
    pub user: Json<serde_json::Value>,
    pub role: UserRole,
    pub login_time: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> QuestionOptions {
        QuestionOptions {
            a: "go".to_string(),
            b: "goes".to_string(),
            c: "going".to_string(),
            d: "went".to_string(),
        }
    }

    #[test]
    fn options_lookup_by_label() {
        let options = options();
        assert_eq!(options.get(AnswerOption::A), "go");
        assert_eq!(options.get(AnswerOption::D), "went");

        let labels: Vec<&str> =
            options.iter().map(|(option, _)| option.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn options_serialize_with_uppercase_keys() {
        let json = serde_json::to_value(options()).unwrap();
        assert_eq!(json["A"], "go");
        assert_eq!(json["C"], "going");
    }
}
