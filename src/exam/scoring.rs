use std::collections::BTreeMap;

use sqlx::types::Json;
use uuid::Uuid;

use crate::core::time::elapsed_ms;
use crate::db::models::{Student, TestResult};
use crate::db::types::Subject;
use crate::exam::session::ExamSession;

/// Reduce a finished session into a persistable result.
///
/// Pure over the session's snapshot and answer map: an unanswered index
/// counts as incorrect, correctness is exact label equality against the
/// snapshot's designated option, and per-subject pairs cover every fixed
/// subject even when the snapshot has no questions for it.
pub fn score(session: &ExamSession, student: &Student) -> TestResult {
    let questions = session.questions();
    let answers = session.answers();

    let mut total_score: i64 = 0;
    let mut subject_scores: BTreeMap<Subject, i64> =
        Subject::ALL.iter().map(|subject| (*subject, 0)).collect();
    let mut subject_totals: BTreeMap<Subject, i64> =
        Subject::ALL.iter().map(|subject| (*subject, 0)).collect();

    for (index, question) in questions.iter().enumerate() {
        let correct = answers.get(&index) == Some(&question.correct_answer);
        if correct {
            total_score += 1;
            *subject_scores.entry(question.subject).or_default() += 1;
        }
        *subject_totals.entry(question.subject).or_default() += 1;
    }

    let total_questions = questions.len() as i64;
    let percentage = percentage_of(total_score, total_questions);

    let finished_at = session.finished_at().unwrap_or_else(crate::core::time::now_utc);
    let test_duration_ms = session
        .started_at()
        .map(|started| elapsed_ms(started, finished_at))
        .unwrap_or_default();

    TestResult {
        id: Uuid::new_v4().to_string(),
        student_id: student.id.clone(),
        student_name: student.display_name(),
        student_class: student.class_name.clone(),
        total_score,
        total_questions,
        percentage,
        subject_scores: Json(subject_scores),
        subject_totals: Json(subject_totals),
        test_duration_ms,
        answers: Json(session.answers().clone()),
        timestamp: finished_at,
    }
}

/// Half-up integer percentage.
fn percentage_of(correct: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as i64
}
