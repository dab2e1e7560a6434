use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::OffsetDateTime;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::core::time::now_utc;
use crate::db::models::Question;
use crate::db::types::AnswerOption;
use crate::exam::proctor::{self, ProctorSignal};
use crate::exam::session::{
    ExamSession, Resolution, SessionError, SessionState, TickOutcome,
};

/// State change notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Tick { remaining_seconds: i64 },
    Paused { violations: u32 },
    Resumed,
    /// The deadline passed and the session auto-finished.
    Expired,
    Completed,
    Terminated,
}

/// Ticker task handle. Aborting on drop is what makes timer cancellation
/// structural: the driver replaces or clears this field on every transition
/// out of `Active`, so a stale 1 Hz task can never keep firing.
struct TickerHandle(JoinHandle<()>);

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Single-writer owner of an [`ExamSession`] plus its timer.
///
/// All mutation funnels through `&mut self` methods, which serializes
/// handlers exactly like the single UI event loop the session semantics
/// assume. The ticker task only calls [`ExamSession::tick`].
pub struct SessionDriver {
    session: Arc<Mutex<ExamSession>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    ticker: Option<TickerHandle>,
    tick_interval: StdDuration,
}

impl SessionDriver {
    pub fn new(
        time_limit: time::Duration,
        violation_limit: u32,
        tick_interval: StdDuration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(ExamSession::new(time_limit, violation_limit))),
            events,
            ticker: None,
            tick_interval,
        }
    }

    /// Read-only access to the underlying session.
    pub async fn with_session<R>(&self, read: impl FnOnce(&ExamSession) -> R) -> R {
        let session = self.session.lock().await;
        read(&session)
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    pub async fn start(
        &mut self,
        questions: Vec<Question>,
        now: OffsetDateTime,
    ) -> Result<(), SessionError> {
        self.session.lock().await.start(questions, now)?;
        self.spawn_ticker();
        Ok(())
    }

    pub async fn select_answer(
        &mut self,
        index: usize,
        option: AnswerOption,
    ) -> Result<(), SessionError> {
        self.session.lock().await.select_answer(index, option)
    }

    pub async fn navigate(&mut self, target: usize) -> Result<(), SessionError> {
        self.session.lock().await.navigate(target)
    }

    pub async fn refresh_question_content(&mut self, updated: &[Question]) {
        self.session.lock().await.refresh_question_content(updated);
    }

    /// Route a proctoring signal to the session, stopping the timer when it
    /// records a violation.
    pub async fn observe(&mut self, signal: ProctorSignal) -> Option<u32> {
        let recorded = {
            let mut session = self.session.lock().await;
            proctor::observe(&mut session, signal)
        };
        if let Some(violations) = recorded {
            self.ticker = None;
            self.send(SessionEvent::Paused { violations });
        }
        recorded
    }

    pub async fn resolve_violation(
        &mut self,
        override_accepted: bool,
    ) -> Result<Resolution, SessionError> {
        let resolution = self.session.lock().await.resolve_violation(override_accepted)?;
        match resolution {
            Resolution::Resumed => {
                self.spawn_ticker();
                self.send(SessionEvent::Resumed);
            }
            Resolution::Terminated => {
                self.ticker = None;
                self.send(SessionEvent::Terminated);
            }
            Resolution::Rejected => {}
        }
        Ok(resolution)
    }

    /// Complete the exam. Idempotent against a racing timer expiry: if the
    /// ticker already auto-finished the session, this only clears the timer.
    pub async fn finish(&mut self, now: OffsetDateTime) -> Result<(), SessionError> {
        {
            let mut session = self.session.lock().await;
            if session.state() != SessionState::Completed {
                session.finish(now)?;
            }
        }
        self.ticker = None;
        self.send(SessionEvent::Completed);
        Ok(())
    }

    pub async fn terminate(&mut self) -> Result<(), SessionError> {
        self.session.lock().await.terminate()?;
        self.ticker = None;
        self.send(SessionEvent::Terminated);
        Ok(())
    }

    fn spawn_ticker(&mut self) {
        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        // Replacing the handle aborts any previous task, so at most one
        // ticker exists per driver.
        self.ticker = Some(TickerHandle(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let outcome = session.lock().await.tick(now_utc());
                match outcome {
                    TickOutcome::Running { remaining } => {
                        let _ = events.send(SessionEvent::Tick {
                            remaining_seconds: remaining.whole_seconds(),
                        });
                    }
                    TickOutcome::Expired => {
                        let _ = events.send(SessionEvent::Expired);
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        })));
    }

    fn send(&self, event: SessionEvent) {
        // A dropped receiver just means nothing is rendering.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_questions;
    use time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::timeout;

    const TICK: StdDuration = StdDuration::from_millis(20);

    fn driver(time_limit: Duration) -> (SessionDriver, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SessionDriver::new(time_limit, 3, TICK, tx), rx)
    }

    async fn next_event(rx: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
        timeout(StdDuration::from_secs(2), rx.recv()).await.expect("event").expect("channel open")
    }

    #[tokio::test]
    async fn ticker_emits_ticks_while_active() {
        let (mut driver, mut rx) = driver(Duration::minutes(90));
        driver.start(sample_questions(3), now_utc()).await.unwrap();

        match next_event(&mut rx).await {
            SessionEvent::Tick { remaining_seconds } => {
                assert!(remaining_seconds > 0 && remaining_seconds <= 90 * 60);
            }
            other => panic!("expected tick, got {other:?}"),
        }

        driver.finish(now_utc()).await.unwrap();
    }

    #[tokio::test]
    async fn violation_stops_the_ticker() {
        let (mut driver, mut rx) = driver(Duration::minutes(90));
        driver.start(sample_questions(3), now_utc()).await.unwrap();

        assert_eq!(driver.observe(ProctorSignal::WindowBlur).await, Some(1));
        assert_eq!(driver.state().await, SessionState::Paused);

        // Drain whatever was in flight, then confirm silence: a cancelled
        // timer must not keep ticking.
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(
                event,
                SessionEvent::Tick { .. } | SessionEvent::Paused { .. }
            ));
        }
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn resume_restarts_the_ticker() {
        let (mut driver, mut rx) = driver(Duration::minutes(90));
        driver.start(sample_questions(3), now_utc()).await.unwrap();
        driver.observe(ProctorSignal::PageHidden).await;

        assert_eq!(driver.resolve_violation(true).await, Ok(Resolution::Resumed));

        loop {
            match next_event(&mut rx).await {
                SessionEvent::Resumed => break,
                SessionEvent::Tick { .. } | SessionEvent::Paused { .. } => {}
                other => panic!("unexpected event {other:?}"),
            }
        }
        // Ticks flow again after the resume.
        assert!(matches!(next_event(&mut rx).await, SessionEvent::Tick { .. }));
    }

    #[tokio::test]
    async fn deadline_expiry_emits_expired_once_and_stops() {
        let (mut driver, mut rx) = driver(Duration::milliseconds(60));
        driver.start(sample_questions(2), now_utc()).await.unwrap();

        loop {
            match next_event(&mut rx).await {
                SessionEvent::Expired => break,
                SessionEvent::Tick { .. } => {}
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(driver.state().await, SessionState::Completed);

        tokio::time::sleep(StdDuration::from_millis(100)).await;
        assert!(rx.try_recv().is_err(), "no events after expiry");
    }

    #[tokio::test]
    async fn finish_after_auto_expiry_is_idempotent() {
        let (mut driver, _rx) = driver(Duration::milliseconds(40));
        driver.start(sample_questions(2), now_utc()).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(120)).await;
        assert_eq!(driver.state().await, SessionState::Completed);

        // Manual completion racing the timer must not error out.
        driver.finish(now_utc()).await.unwrap();
    }

    #[tokio::test]
    async fn terminated_session_discards_and_silences_events() {
        let (mut driver, mut rx) = driver(Duration::minutes(90));
        driver.start(sample_questions(2), now_utc()).await.unwrap();

        for _ in 0..3 {
            driver.observe(ProctorSignal::FullscreenExit).await;
            if driver.state().await == SessionState::Paused {
                let _ = driver.resolve_violation(true).await;
            }
        }
        // Third resolution terminates regardless of the override.
        assert_eq!(driver.state().await, SessionState::Terminated);

        while rx.try_recv().is_ok() {}
        tokio::time::sleep(StdDuration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }
}
