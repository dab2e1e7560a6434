use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::types::Json;
use time::{Date, Month, OffsetDateTime, Time};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::core::{bootstrap, config::Settings, state::AppState};
use crate::db;
use crate::db::models::{Question, QuestionOptions, Student, TestResult};
use crate::db::types::{AnswerOption, Subject};
use crate::exam::session::ExamSession;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

fn set_test_env() {
    std::env::set_var("CHSB_ENV", "test");
    std::env::remove_var("DATABASE_URL");
    std::env::remove_var("EXAM_TIME_LIMIT_MINUTES");
    std::env::remove_var("EXAM_VIOLATION_LIMIT");
    std::env::remove_var("ACCESS_CODE_LENGTH");
    std::env::remove_var("ACCESS_CODE_TTL_HOURS");
    std::env::remove_var("EXAM_TICK_INTERVAL_MS");
    std::env::remove_var("ADMIN_LOGIN");
    std::env::remove_var("ADMIN_PASSWORD");
}

/// Fresh in-memory store with migrations applied and the default data
/// seeded. One connection so the in-memory database survives the test.
pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(settings, pool);
    bootstrap::run(&state).await.expect("bootstrap");

    // Env vars are only read during setup above; release the lock so a test
    // may hold several contexts at once without deadlocking.
    drop(guard);
    TestContext { state }
}

/// Fixed instant for deterministic timer arithmetic.
pub(crate) fn test_instant() -> OffsetDateTime {
    let date = Date::from_calendar_date(2025, Month::January, 2).expect("date");
    time::PrimitiveDateTime::new(date, Time::from_hms(9, 0, 0).expect("time")).assume_utc()
}

pub(crate) fn question_fixture(
    number: i64,
    subject: Subject,
    correct: AnswerOption,
) -> Question {
    let now = test_instant();
    Question {
        id: Uuid::new_v4().to_string(),
        number,
        subject,
        subject_name: subject.display_name().to_string(),
        text: format!("Вопрос {number}"),
        formula: None,
        options: Json(QuestionOptions {
            a: "вариант А".to_string(),
            b: "вариант Б".to_string(),
            c: "вариант В".to_string(),
            d: "вариант Г".to_string(),
        }),
        correct_answer: correct,
        explanation: None,
        image: None,
        created: now,
        updated: now,
    }
}

pub(crate) fn sample_questions(count: usize) -> Vec<Question> {
    (1..=count as i64)
        .map(|number| question_fixture(number, Subject::Algebra, AnswerOption::A))
        .collect()
}

pub(crate) fn session_with_questions(
    questions: Vec<Question>,
    now: OffsetDateTime,
) -> ExamSession {
    let mut session = ExamSession::new(time::Duration::minutes(90), 3);
    session.start(questions, now).expect("start");
    session
}

pub(crate) fn started_session(count: usize, now: OffsetDateTime) -> ExamSession {
    session_with_questions(sample_questions(count), now)
}

pub(crate) fn student_fixture() -> Student {
    let now = test_instant();
    Student {
        id: Uuid::new_v4().to_string(),
        first_name: "Тест".to_string(),
        last_name: "Ученик".to_string(),
        class_name: "9А".to_string(),
        email: "student@example.com".to_string(),
        password: "secret99".to_string(),
        created: now,
        last_login: now,
    }
}

/// A result with the given totals, zeroed per-subject maps and a half-up
/// percentage, matching what the scorer produces.
pub(crate) fn result_fixture(total_score: i64, total_questions: i64) -> TestResult {
    let zeroed: BTreeMap<Subject, i64> =
        Subject::ALL.iter().map(|subject| (*subject, 0)).collect();
    let percentage = if total_questions == 0 {
        0
    } else {
        (100.0 * total_score as f64 / total_questions as f64).round() as i64
    };

    TestResult {
        id: Uuid::new_v4().to_string(),
        student_id: Uuid::new_v4().to_string(),
        student_name: "Тест Ученик".to_string(),
        student_class: "9А".to_string(),
        total_score,
        total_questions,
        percentage,
        subject_scores: Json(zeroed.clone()),
        subject_totals: Json(zeroed),
        test_duration_ms: 0,
        answers: Json(BTreeMap::new()),
        timestamp: test_instant(),
    }
}
