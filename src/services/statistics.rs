use std::collections::BTreeMap;

use serde::Serialize;

use thiserror::Error;

use crate::core::state::AppState;
use crate::db::models::{Student, TestResult};
use crate::db::types::Subject;
use crate::exam::recommendations;
use crate::repositories::{results, students};

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("student {0} not found")]
    StudentNotFound(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Serialize, PartialEq)]
pub struct Statistics {
    pub total_students: i64,
    pub total_tests: i64,
    /// Mean percentage across all results, rounded to two decimals.
    pub average_score: f64,
    /// Mean per-subject success rate over results that include the subject.
    pub subject_averages: BTreeMap<Subject, f64>,
}

pub async fn overview(state: &AppState) -> Result<Statistics, sqlx::Error> {
    let total_students = students::count(state.db()).await?;
    let all_results = results::list(state.db()).await?;
    Ok(compute(total_students, &all_results))
}

/// A student's personal dashboard: their result history plus earned badges.
#[derive(Debug, Serialize)]
pub struct StudentProgress {
    pub student: Student,
    pub results: Vec<TestResult>,
    pub achievements: Vec<String>,
}

pub async fn student_progress(
    state: &AppState,
    student_id: &str,
) -> Result<StudentProgress, StatisticsError> {
    let Some(student) = students::find_by_id(state.db(), student_id).await? else {
        return Err(StatisticsError::StudentNotFound(student_id.to_string()));
    };
    let history = results::list_by_student(state.db(), student_id).await?;
    let achievements = recommendations::achievements(&history);
    Ok(StudentProgress { student, results: history, achievements })
}

fn compute(total_students: i64, all_results: &[TestResult]) -> Statistics {
    let total_tests = all_results.len() as i64;

    let average_score = if all_results.is_empty() {
        0.0
    } else {
        let sum: i64 = all_results.iter().map(|result| result.percentage).sum();
        round2(sum as f64 / all_results.len() as f64)
    };

    let mut subject_averages = BTreeMap::new();
    for subject in Subject::ALL {
        let mut rates = Vec::new();
        for result in all_results {
            let total = result.subject_totals.0.get(&subject).copied().unwrap_or(0);
            if total > 0 {
                let correct = result.subject_scores.0.get(&subject).copied().unwrap_or(0);
                rates.push(100.0 * correct as f64 / total as f64);
            }
        }
        if !rates.is_empty() {
            let mean = rates.iter().sum::<f64>() / rates.len() as f64;
            subject_averages.insert(subject, round2(mean));
        }
    }

    Statistics { total_students, total_tests, average_score, subject_averages }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
