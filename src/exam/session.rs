use std::collections::BTreeMap;

use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::db::models::Question;
use crate::db::types::AnswerOption;

/// Lifecycle of a proctored exam attempt.
///
/// `NotStarted -> Active -> {Paused, Completed, Terminated}`. A paused
/// session either resumes (admin override below the violation limit) or is
/// terminated (limit reached). `Completed` and `Terminated` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Active,
    Paused,
    Completed,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("operation requires state {required:?}, session is {actual:?}")]
    InvalidState { required: SessionState, actual: SessionState },
    #[error("question index {index} out of range for a set of {len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("cannot start an exam with an empty question set")]
    EmptyQuestionSet,
}

/// Result of delivering an admin override to a paused session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Override accepted, session is active again.
    Resumed,
    /// Override rejected, session stays paused. The counter is unchanged:
    /// only new violations increase it, never failed override attempts.
    Rejected,
    /// The violation limit was reached; the attempt is void.
    Terminated,
}

/// Outcome of a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session is not active; the tick had no effect.
    Idle,
    Running { remaining: Duration },
    /// The deadline passed and the session was force-finished. Reported at
    /// most once; later ticks observe a completed session and return `Idle`.
    Expired,
}

/// A single exam attempt: the question snapshot taken at start, the answer
/// map, the timer bookkeeping and the violation counter.
///
/// The snapshot's cardinality and ordering are fixed for the attempt's
/// lifetime; external question-bank edits reach it only through
/// [`ExamSession::refresh_question_content`], which patches content in place.
pub struct ExamSession {
    state: SessionState,
    questions: Vec<Question>,
    answers: BTreeMap<usize, AnswerOption>,
    current_index: usize,
    violation_count: u32,
    violation_limit: u32,
    time_limit: Duration,
    started_at: Option<OffsetDateTime>,
    deadline: Option<OffsetDateTime>,
    finished_at: Option<OffsetDateTime>,
}

impl ExamSession {
    pub fn new(time_limit: Duration, violation_limit: u32) -> Self {
        Self {
            state: SessionState::NotStarted,
            questions: Vec::new(),
            answers: BTreeMap::new(),
            current_index: 0,
            violation_count: 0,
            violation_limit,
            time_limit,
            started_at: None,
            deadline: None,
            finished_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerOption> {
        &self.answers
    }

    pub fn violation_count(&self) -> u32 {
        self.violation_count
    }

    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<OffsetDateTime> {
        self.finished_at
    }

    pub fn remaining(&self, now: OffsetDateTime) -> Option<Duration> {
        self.deadline.map(|deadline| deadline - now)
    }

    /// Take the question snapshot and begin the attempt.
    pub fn start(
        &mut self,
        questions: Vec<Question>,
        now: OffsetDateTime,
    ) -> Result<(), SessionError> {
        self.require(SessionState::NotStarted)?;
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }

        self.questions = questions;
        self.answers.clear();
        self.current_index = 0;
        self.violation_count = 0;
        self.started_at = Some(now);
        self.deadline = Some(now + self.time_limit);
        self.state = SessionState::Active;
        tracing::info!(questions = self.questions.len(), "Exam session started");
        Ok(())
    }

    /// Record or overwrite the answer for a question. Correctness is not
    /// checked here; scoring happens once, at the end.
    pub fn select_answer(
        &mut self,
        index: usize,
        option: AnswerOption,
    ) -> Result<(), SessionError> {
        self.require(SessionState::Active)?;
        self.check_bounds(index)?;
        self.answers.insert(index, option);
        Ok(())
    }

    pub fn navigate(&mut self, target: usize) -> Result<(), SessionError> {
        self.require(SessionState::Active)?;
        self.check_bounds(target)?;
        self.current_index = target;
        Ok(())
    }

    /// Advance the clock. While active, the first tick at or past the
    /// deadline force-finishes the session.
    ///
    /// Pausing does not move the deadline: time spent paused still counts
    /// against the limit. Preserved from the observed product behavior.
    pub fn tick(&mut self, now: OffsetDateTime) -> TickOutcome {
        if self.state != SessionState::Active {
            return TickOutcome::Idle;
        }

        let Some(deadline) = self.deadline else {
            return TickOutcome::Idle;
        };

        let remaining = deadline - now;
        if remaining <= Duration::ZERO {
            self.finished_at = Some(now);
            self.state = SessionState::Completed;
            tracing::info!("Exam time limit reached, session auto-finished");
            TickOutcome::Expired
        } else {
            TickOutcome::Running { remaining }
        }
    }

    /// Patch the snapshot's question content from the current bank.
    ///
    /// Count and order stay fixed to the original snapshot; only per-question
    /// fields are updated, matched by id. Questions deleted from the bank
    /// keep their snapshot content.
    pub fn refresh_question_content(&mut self, updated: &[Question]) {
        if matches!(self.state, SessionState::NotStarted | SessionState::Completed | SessionState::Terminated)
        {
            return;
        }

        for question in &mut self.questions {
            if let Some(fresh) = updated.iter().find(|candidate| candidate.id == question.id) {
                question.subject_name = fresh.subject_name.clone();
                question.text = fresh.text.clone();
                question.formula = fresh.formula.clone();
                question.options = fresh.options.clone();
                question.correct_answer = fresh.correct_answer;
                question.explanation = fresh.explanation.clone();
                question.image = fresh.image.clone();
                question.updated = fresh.updated;
            }
        }
    }

    /// A proctoring violation: count it and pause the attempt.
    pub fn record_violation(&mut self) -> Result<u32, SessionError> {
        self.require(SessionState::Active)?;
        self.violation_count += 1;
        self.state = SessionState::Paused;
        tracing::warn!(violations = self.violation_count, "Proctoring violation recorded");
        Ok(self.violation_count)
    }

    /// Deliver the outcome of an admin override check to a paused session.
    ///
    /// Once the violation limit is reached, any resolution attempt terminates
    /// the attempt regardless of the code.
    pub fn resolve_violation(&mut self, override_accepted: bool) -> Result<Resolution, SessionError> {
        self.require(SessionState::Paused)?;

        if self.violation_count >= self.violation_limit {
            self.state = SessionState::Terminated;
            tracing::warn!(
                violations = self.violation_count,
                "Violation limit reached, session terminated"
            );
            return Ok(Resolution::Terminated);
        }

        if override_accepted {
            self.state = SessionState::Active;
            Ok(Resolution::Resumed)
        } else {
            Ok(Resolution::Rejected)
        }
    }

    /// Manual completion from the last question.
    pub fn finish(&mut self, now: OffsetDateTime) -> Result<(), SessionError> {
        self.require(SessionState::Active)?;
        self.finished_at = Some(now);
        self.state = SessionState::Completed;
        tracing::info!(answered = self.answers.len(), "Exam session finished");
        Ok(())
    }

    /// Forced abandonment. The attempt is void and its result is discarded.
    pub fn terminate(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active | SessionState::Paused => {
                self.state = SessionState::Terminated;
                Ok(())
            }
            actual => Err(SessionError::InvalidState { required: SessionState::Active, actual }),
        }
    }

    fn require(&self, required: SessionState) -> Result<(), SessionError> {
        if self.state == required {
            Ok(())
        } else {
            Err(SessionError::InvalidState { required, actual: self.state })
        }
    }

    fn check_bounds(&self, index: usize) -> Result<(), SessionError> {
        if index < self.questions.len() {
            Ok(())
        } else {
            Err(SessionError::OutOfBounds { index, len: self.questions.len() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{question_fixture, started_session, test_instant};
    use crate::db::types::Subject;

    #[test]
    fn start_requires_not_started() {
        let now = test_instant();
        let mut session = started_session(4, now);
        let err = session.start(vec![question_fixture(1, Subject::Algebra, AnswerOption::A)], now);
        assert_eq!(
            err,
            Err(SessionError::InvalidState {
                required: SessionState::NotStarted,
                actual: SessionState::Active,
            })
        );
    }

    #[test]
    fn start_rejects_empty_question_set() {
        let mut session = ExamSession::new(Duration::minutes(90), 3);
        assert_eq!(session.start(Vec::new(), test_instant()), Err(SessionError::EmptyQuestionSet));
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn select_and_overwrite_answer() {
        let mut session = started_session(4, test_instant());
        session.select_answer(2, AnswerOption::B).unwrap();
        session.select_answer(2, AnswerOption::D).unwrap();
        assert_eq!(session.answers().get(&2), Some(&AnswerOption::D));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn navigate_checks_bounds() {
        let mut session = started_session(4, test_instant());
        session.navigate(3).unwrap();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.current_question().map(|q| q.number), Some(4));
        assert_eq!(session.navigate(4), Err(SessionError::OutOfBounds { index: 4, len: 4 }));
        assert_eq!(session.current_index(), 3);
    }

    #[test]
    fn paused_session_rejects_answers_and_navigation() {
        let mut session = started_session(4, test_instant());
        session.record_violation().unwrap();
        assert_eq!(session.state(), SessionState::Paused);

        let expected = Err(SessionError::InvalidState {
            required: SessionState::Active,
            actual: SessionState::Paused,
        });
        assert_eq!(session.select_answer(0, AnswerOption::A), expected);
        assert_eq!(session.navigate(1), expected);
    }

    #[test]
    fn tick_before_deadline_reports_remaining() {
        let now = test_instant();
        let mut session = started_session(4, now);
        let outcome = session.tick(now + Duration::minutes(30));
        assert_eq!(outcome, TickOutcome::Running { remaining: Duration::minutes(60) });
        assert_eq!(session.remaining(now + Duration::minutes(30)), Some(Duration::minutes(60)));
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn tick_past_deadline_finishes_exactly_once() {
        let now = test_instant();
        let mut session = started_session(4, now);
        let late = now + Duration::minutes(91);

        assert_eq!(session.tick(late), TickOutcome::Expired);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.finished_at(), Some(late));

        // Extra ticks after expiry are inert.
        assert_eq!(session.tick(late + Duration::seconds(1)), TickOutcome::Idle);
        assert_eq!(session.tick(late + Duration::seconds(2)), TickOutcome::Idle);
        assert_eq!(session.finished_at(), Some(late));
    }

    #[test]
    fn paused_time_still_counts_against_deadline() {
        // Flagged policy: pausing freezes the ticker but not the deadline, so
        // a long enough pause burns the whole remaining time.
        let now = test_instant();
        let mut session = started_session(4, now);
        session.record_violation().unwrap();
        session.resolve_violation(true).unwrap();

        assert_eq!(session.tick(now + Duration::minutes(95)), TickOutcome::Expired);
    }

    #[test]
    fn tick_while_paused_is_idle() {
        let now = test_instant();
        let mut session = started_session(4, now);
        session.record_violation().unwrap();
        assert_eq!(session.tick(now + Duration::minutes(10)), TickOutcome::Idle);
    }

    #[test]
    fn violation_pauses_and_correct_override_resumes() {
        let mut session = started_session(4, test_instant());
        assert_eq!(session.record_violation(), Ok(1));
        assert_eq!(session.state(), SessionState::Paused);

        assert_eq!(session.resolve_violation(true), Ok(Resolution::Resumed));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.violation_count(), 1);
    }

    #[test]
    fn wrong_override_keeps_paused_without_counting() {
        let mut session = started_session(4, test_instant());
        session.record_violation().unwrap();

        assert_eq!(session.resolve_violation(false), Ok(Resolution::Rejected));
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(session.violation_count(), 1);
    }

    #[test]
    fn third_violation_terminates_on_any_resolution() {
        let mut session = started_session(4, test_instant());
        for _ in 0..2 {
            session.record_violation().unwrap();
            session.resolve_violation(true).unwrap();
        }
        assert_eq!(session.record_violation(), Ok(3));

        // Correct code no longer helps once the limit is reached.
        assert_eq!(session.resolve_violation(true), Ok(Resolution::Terminated));
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn terminated_is_absorbing() {
        let mut session = started_session(4, test_instant());
        session.record_violation().unwrap();
        session.terminate().unwrap();

        assert!(session.terminate().is_err());
        assert!(session.record_violation().is_err());
        assert_eq!(session.tick(test_instant() + Duration::hours(2)), TickOutcome::Idle);
    }

    #[test]
    fn refresh_patches_content_but_keeps_count_and_order() {
        let now = test_instant();
        let mut session = started_session(3, now);
        let original_ids: Vec<String> =
            session.questions().iter().map(|q| q.id.clone()).collect();

        // The bank gained a question and the second one was reworded.
        let mut bank: Vec<Question> = session.questions().to_vec();
        bank[1].text = "Исправленный вопрос".to_string();
        bank[1].correct_answer = AnswerOption::D;
        bank.push(question_fixture(99, Subject::English, AnswerOption::A));

        session.refresh_question_content(&bank);

        assert_eq!(session.questions().len(), 3);
        let ids: Vec<String> = session.questions().iter().map(|q| q.id.clone()).collect();
        assert_eq!(ids, original_ids);
        assert_eq!(session.questions()[1].text, "Исправленный вопрос");
        assert_eq!(session.questions()[1].correct_answer, AnswerOption::D);
    }

    #[test]
    fn refresh_keeps_snapshot_content_for_deleted_questions() {
        let now = test_instant();
        let mut session = started_session(2, now);
        let kept_text = session.questions()[0].text.clone();

        // Bank emptied entirely mid-exam.
        session.refresh_question_content(&[]);

        assert_eq!(session.questions().len(), 2);
        assert_eq!(session.questions()[0].text, kept_text);
    }

    #[test]
    fn finish_requires_active() {
        let now = test_instant();
        let mut session = started_session(2, now);
        session.record_violation().unwrap();
        assert!(session.finish(now).is_err());

        session.resolve_violation(true).unwrap();
        session.finish(now + Duration::minutes(10)).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.finished_at(), Some(now + Duration::minutes(10)));
    }
}
