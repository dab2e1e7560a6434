use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{Student, TestResult};
use crate::db::types::AnswerOption;
use crate::exam::driver::{SessionDriver, SessionEvent};
use crate::exam::proctor::ProctorSignal;
use crate::exam::scoring::score;
use crate::exam::session::{Resolution, SessionError, SessionState};
use crate::repositories::{questions, results};
use crate::services::{access_gate, auth};

#[derive(Debug, Error)]
pub enum ExamFlowError {
    #[error("invalid or expired access code")]
    AccessDenied,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] auth::AuthError),
}

/// One student's exam attempt from access code to persisted result.
///
/// Wraps a [`SessionDriver`] configured from settings and adds the pieces the
/// pure session cannot do itself: gate entry on a single-use code, check
/// admin override codes, and persist the scored result. Terminated attempts
/// persist nothing.
pub struct ExamFlow {
    state: AppState,
    student: Student,
    driver: SessionDriver,
}

impl ExamFlow {
    pub fn new(
        state: AppState,
        student: Student,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let exam = state.settings().exam();
        let driver = SessionDriver::new(
            exam.time_limit(),
            exam.violation_limit,
            StdDuration::from_millis(exam.tick_interval_ms),
            events,
        );
        Self { state, student, driver }
    }

    pub async fn session_state(&self) -> SessionState {
        self.driver.state().await
    }

    pub fn driver(&self) -> &SessionDriver {
        &self.driver
    }

    /// Consume the access code and start the attempt over the full ordered
    /// question bank.
    pub async fn start(&mut self, access_code: &str) -> Result<(), ExamFlowError> {
        let now = now_utc();
        if !access_gate::consume(&self.state, access_code, now).await? {
            return Err(ExamFlowError::AccessDenied);
        }

        let bank = questions::list_ordered(self.state.db()).await?;
        self.driver.start(bank, now).await?;
        tracing::info!(student_id = %self.student.id, "Exam attempt started");
        Ok(())
    }

    pub async fn select_answer(
        &mut self,
        index: usize,
        option: AnswerOption,
    ) -> Result<(), ExamFlowError> {
        Ok(self.driver.select_answer(index, option).await?)
    }

    pub async fn navigate(&mut self, target: usize) -> Result<(), ExamFlowError> {
        Ok(self.driver.navigate(target).await?)
    }

    /// Pull fresh question content from the bank into the running snapshot.
    pub async fn sync_question_content(&mut self) -> Result<(), ExamFlowError> {
        let bank = questions::list_ordered(self.state.db()).await?;
        self.driver.refresh_question_content(&bank).await;
        Ok(())
    }

    pub async fn report_signal(&mut self, signal: ProctorSignal) -> Option<u32> {
        self.driver.observe(signal).await
    }

    /// Resolve a violation pause with a code typed at the overlay. The code
    /// is checked against the admin password; the session decides the rest.
    pub async fn resolve_with_code(&mut self, code: &str) -> Result<Resolution, ExamFlowError> {
        let accepted = auth::verify_admin_code(&self.state, code).await?;
        Ok(self.driver.resolve_violation(accepted).await?)
    }

    /// Complete the attempt, score it and persist the result.
    pub async fn finish(&mut self) -> Result<TestResult, ExamFlowError> {
        self.driver.finish(now_utc()).await?;
        let result = self.driver.with_session(|session| score(session, &self.student)).await;
        results::insert(self.state.db(), &result).await?;
        tracing::info!(
            student_id = %self.student.id,
            score = result.total_score,
            percentage = result.percentage,
            "Exam result recorded"
        );
        Ok(result)
    }

    /// Abandon the attempt. No result is scored or stored.
    pub async fn terminate(&mut self) -> Result<(), ExamFlowError> {
        self.driver.terminate().await?;
        tracing::warn!(student_id = %self.student.id, "Exam attempt terminated, result discarded");
        Ok(())
    }
}
