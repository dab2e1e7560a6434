use crate::exam::session::{ExamSession, SessionState};

/// Environment signal observed while a proctored exam runs. Delivered as an
/// explicit payload by the embedding shell; the monitor never reads ambient
/// event state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProctorSignal {
    FullscreenExit,
    PageHidden,
    WindowBlur,
    /// Informational only; never affects session state.
    FocusRegained,
}

impl ProctorSignal {
    fn is_violation(self) -> bool {
        !matches!(self, ProctorSignal::FocusRegained)
    }
}

/// Feed one signal to the session. Each violation signal counts once while
/// the session is active; rapid repeats are not debounced, so a blur followed
/// immediately by a hidden tab records two violations. Signals arriving when
/// the session is paused or terminal are dropped.
///
/// Returns the new violation count when one was recorded.
pub fn observe(session: &mut ExamSession, signal: ProctorSignal) -> Option<u32> {
    if !signal.is_violation() {
        return None;
    }
    if session.state() != SessionState::Active {
        return None;
    }
    session.record_violation().ok()
}
