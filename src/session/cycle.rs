use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::content::{ContentError, ContentRequest, ModeContent};
use crate::session::diagnostic::{DiagnosticController, DiagnosticStep};
use crate::session::explanation::ExplanationController;
use crate::session::practice::{PracticeController, difficulty_for};
use crate::session::reflection::ReflectionController;
use crate::session::state::{Mode, PracticeHistory, SessionState, Topic, TransitionError};
use crate::session::verification::{VerificationController, VerificationStep};
use crate::session::{InteractionState, Loadable};

/// Time a learner gets to read the explanation of a failed verification step
/// before being sent back to practice.
pub const RESTART_DELAY: Duration = Duration::from_secs(3);

/// Identifies one content fetch. Replies carrying any other ticket are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentTicket {
    pub session: u64,
    pub serial: u64,
    pub mode: Mode,
}

/// A fetch the host must dispatch to the content provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetch {
    pub ticket: ContentTicket,
    pub request: ContentRequest,
}

/// Controller for whichever mode is active. Content lives here and is replaced,
/// never mutated, when a new fetch lands.
#[derive(Clone, Debug)]
pub enum ModeController {
    Diagnostic(DiagnosticController),
    Explanation(ExplanationController),
    Practice(PracticeController),
    Verification(VerificationController),
    Reflection(ReflectionController),
    Complete,
}

impl ModeController {
    fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Diagnostic => ModeController::Diagnostic(DiagnosticController::default()),
            Mode::Explanation => ModeController::Explanation(ExplanationController::default()),
            Mode::Practice => ModeController::Practice(PracticeController::default()),
            Mode::Verification => ModeController::Verification(VerificationController::default()),
            Mode::Reflection => ModeController::Reflection(ReflectionController::default()),
            Mode::Complete => ModeController::Complete,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            ModeController::Diagnostic(_) => Mode::Diagnostic,
            ModeController::Explanation(_) => Mode::Explanation,
            ModeController::Practice(_) => Mode::Practice,
            ModeController::Verification(_) => Mode::Verification,
            ModeController::Reflection(_) => Mode::Reflection,
            ModeController::Complete => Mode::Complete,
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            ModeController::Diagnostic(c) => c.questions.is_loading(),
            ModeController::Explanation(c) => c.content.is_loading(),
            ModeController::Practice(c) => c.item.is_loading(),
            ModeController::Verification(c) => c.scenario.is_loading(),
            ModeController::Reflection(_) | ModeController::Complete => false,
        }
    }

    pub fn load_error(&self) -> Option<&ContentError> {
        match self {
            ModeController::Diagnostic(c) => c.questions.error(),
            ModeController::Explanation(c) => c.content.error(),
            ModeController::Practice(c) => c.item.error(),
            ModeController::Verification(c) => c.scenario.error(),
            ModeController::Reflection(_) | ModeController::Complete => None,
        }
    }

    pub fn interaction(&self) -> Option<&InteractionState> {
        match self {
            ModeController::Diagnostic(c) => Some(&c.interaction),
            ModeController::Practice(c) => Some(&c.interaction),
            ModeController::Verification(c) => Some(&c.interaction),
            _ => None,
        }
    }

    fn store(&mut self, content: ModeContent) {
        match (self, content) {
            (ModeController::Diagnostic(c), ModeContent::Diagnostic(questions)) => {
                c.questions = Loadable::Ready(questions);
            }
            (ModeController::Explanation(c), ModeContent::Explanation(explanation)) => {
                c.content = Loadable::Ready(explanation);
                c.index = 0;
            }
            (ModeController::Practice(c), ModeContent::Practice(item)) => {
                c.item = Loadable::Ready(item);
            }
            (ModeController::Verification(c), ModeContent::Verification(scenario)) => {
                c.scenario = Loadable::Ready(scenario);
                c.index = 0;
            }
            (controller, content) => {
                warn!(
                    controller = %controller.mode(),
                    content = %content.mode(),
                    "content does not match controller"
                );
            }
        }
    }

    fn fail(&mut self, err: ContentError) {
        match self {
            ModeController::Diagnostic(c) => c.questions = Loadable::Failed(err),
            ModeController::Explanation(c) => c.content = Loadable::Failed(err),
            ModeController::Practice(c) => c.item = Loadable::Failed(err),
            ModeController::Verification(c) => c.scenario = Loadable::Failed(err),
            ModeController::Reflection(_) | ModeController::Complete => {}
        }
    }
}

/// One learning session for one topic: the state machine, the practice
/// history, the active controller and the forced-restart timer.
pub struct LearningSession {
    id: u64,
    topic: Topic,
    state: SessionState,
    history: PracticeHistory,
    controller: ModeController,
    pending: Option<ContentTicket>,
    serial: u64,
    restart_due: Option<Instant>,
}

impl LearningSession {
    /// Create a session in diagnostic mode along with its first fetch.
    pub fn start(id: u64, topic: Topic) -> (Self, Fetch) {
        info!(session = id, topic = %topic.query, "learning session started");
        let mut session = Self {
            id,
            topic,
            state: SessionState::new(),
            history: PracticeHistory::default(),
            controller: ModeController::for_mode(Mode::Diagnostic),
            pending: None,
            serial: 0,
            restart_due: None,
        };
        let request = ContentRequest::Diagnostic {
            topic: session.topic.query.clone(),
        };
        let fetch = session.send_request(request);
        (session, fetch)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn history(&self) -> &PracticeHistory {
        &self.history
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn pending_ticket(&self) -> Option<ContentTicket> {
        self.pending
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn verification_unlocked(&self) -> bool {
        self.state.verification_unlocked()
    }

    pub fn restart_due_at(&self) -> Option<Instant> {
        self.restart_due
    }

    pub fn restart_remaining(&self, now: Instant) -> Option<Duration> {
        self.restart_due.map(|due| due.saturating_duration_since(now))
    }

    /// The request for the current mode; `None` for modes without content.
    fn content_request(&self) -> Option<ContentRequest> {
        let topic = self.topic.query.clone();
        let request = match self.state.mode() {
            Mode::Diagnostic => ContentRequest::Diagnostic { topic },
            Mode::Explanation => ContentRequest::Explanation { topic },
            Mode::Practice => ContentRequest::Practice {
                topic,
                difficulty: difficulty_for(self.state.questions_answered()),
            },
            Mode::Verification => ContentRequest::Verification { topic },
            Mode::Reflection | Mode::Complete => return None,
        };
        Some(request)
    }

    fn issue_fetch(&mut self) -> Option<Fetch> {
        let request = self.content_request()?;
        Some(self.send_request(request))
    }

    fn send_request(&mut self, request: ContentRequest) -> Fetch {
        self.serial += 1;
        let ticket = ContentTicket {
            session: self.id,
            serial: self.serial,
            mode: self.state.mode(),
        };
        if let (ModeController::Practice(practice), ContentRequest::Practice { difficulty, .. }) =
            (&mut self.controller, &request)
        {
            practice.begin_fetch(*difficulty);
        }
        self.pending = Some(ticket);
        Fetch { ticket, request }
    }

    /// Install the controller for the mode the state machine just moved to.
    /// Any scheduled restart and outstanding fetch are abandoned.
    fn enter_current_mode(&mut self) -> Option<Fetch> {
        self.restart_due = None;
        self.pending = None;
        let mode = self.state.mode();
        self.controller = ModeController::for_mode(mode);
        self.issue_fetch()
    }

    /// Apply a provider reply. Returns false when the reply was stale.
    pub fn apply_content(
        &mut self,
        ticket: ContentTicket,
        result: Result<ModeContent, ContentError>,
    ) -> bool {
        if self.pending != Some(ticket) || self.state.mode() != ticket.mode {
            debug!(?ticket, current = ?self.pending, "discarding stale content");
            return false;
        }
        self.pending = None;
        match result {
            Ok(content) if content.mode() == ticket.mode => self.controller.store(content),
            Ok(content) => {
                self.controller.fail(ContentError::Schema(format!(
                    "expected {} content, got {}",
                    ticket.mode,
                    content.mode()
                )));
            }
            Err(err) => {
                warn!(mode = %ticket.mode, %err, "content unavailable");
                self.controller.fail(err);
            }
        }
        true
    }

    /// Re-request content after a failure. Never called automatically.
    pub fn retry(&mut self) -> Option<Fetch> {
        if self.controller.load_error().is_none() {
            return None;
        }
        info!(mode = %self.mode(), "retrying content fetch");
        let mode = self.state.mode();
        self.controller = ModeController::for_mode(mode);
        self.issue_fetch()
    }

    /// Grade an option in the current question mode. `None` means the answer
    /// was not accepted (no question, already answered, bad index).
    pub fn answer(&mut self, index: usize) -> Option<bool> {
        match &mut self.controller {
            ModeController::Diagnostic(diag) => diag.answer(index),
            ModeController::Practice(practice) => {
                let correct = practice.answer(index)?;
                self.history.push(correct);
                self.state.record_practice(&self.history);
                debug!(
                    correct,
                    accuracy = self.state.practice_accuracy(),
                    answered = self.state.questions_answered(),
                    "practice answer"
                );
                Some(correct)
            }
            ModeController::Verification(verif) => {
                let correct = verif.answer(index)?;
                if !correct {
                    info!(step = verif.index, "verification failed, restart scheduled");
                    self.restart_due = Some(Instant::now() + RESTART_DELAY);
                }
                Some(correct)
            }
            _ => None,
        }
    }

    /// Acknowledge feedback: next diagnostic question, next practice item, or
    /// next verification step, transitioning modes at the end of each.
    pub fn proceed(&mut self) -> Option<Fetch> {
        match &mut self.controller {
            ModeController::Diagnostic(diag) => match diag.proceed()? {
                DiagnosticStep::NextQuestion => None,
                DiagnosticStep::Finished { score } => {
                    self.state.finish_diagnostic(score).ok()?;
                    self.enter_current_mode()
                }
            },
            ModeController::Practice(practice) => {
                if !practice.interaction.is_answered() {
                    return None;
                }
                self.issue_fetch()
            }
            ModeController::Verification(verif) => match verif.proceed()? {
                VerificationStep::NextStep => None,
                VerificationStep::Passed => {
                    self.state.finish_verification().ok()?;
                    self.enter_current_mode()
                }
            },
            _ => None,
        }
    }

    pub fn next_slide(&mut self) {
        if let ModeController::Explanation(expl) = &mut self.controller {
            expl.next();
        }
    }

    pub fn previous_slide(&mut self) {
        if let ModeController::Explanation(expl) = &mut self.controller {
            expl.previous();
        }
    }

    pub fn finish_explanation(&mut self) -> Option<Fetch> {
        match &self.controller {
            ModeController::Explanation(expl) if expl.can_finish() => {}
            _ => return None,
        }
        self.state.finish_explanation().ok()?;
        self.enter_current_mode()
    }

    pub fn request_verification(&mut self) -> Result<Fetch, TransitionError> {
        self.state.enter_verification()?;
        self.enter_current_mode().ok_or(TransitionError::Illegal {
            from: Mode::Practice,
            to: Mode::Verification,
        })
    }

    pub fn set_reflection_text(&mut self, text: &str) {
        if let ModeController::Reflection(reflection) = &mut self.controller {
            reflection.set_text(text);
        }
    }

    pub fn commit_reflection(&mut self) -> bool {
        match &self.controller {
            ModeController::Reflection(reflection) if reflection.can_commit() => {}
            _ => return false,
        }
        if self.state.commit_reflection().is_err() {
            return false;
        }
        self.enter_current_mode();
        true
    }

    /// Fire the forced restart once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<Fetch> {
        let due = self.restart_due?;
        if now < due {
            return None;
        }
        self.restart_due = None;
        if self.state.restart_practice().is_err() {
            return None;
        }
        info!("returning to practice after failed verification");
        self.enter_current_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Difficulty, PracticeItem};
    use crate::session::test_support::question;

    fn started() -> (LearningSession, Fetch) {
        LearningSession::start(1, Topic::new("Rust").unwrap())
    }

    fn practice_item(correct: usize) -> ModeContent {
        ModeContent::Practice(PracticeItem {
            question: question("p", correct),
            difficulty: Difficulty::Medium,
        })
    }

    #[test]
    fn test_start_requests_diagnostic() {
        let (session, fetch) = started();
        assert_eq!(session.mode(), Mode::Diagnostic);
        assert!(session.is_loading());
        assert_eq!(fetch.request, ContentRequest::Diagnostic { topic: "Rust".to_string() });
        assert_eq!(session.pending_ticket(), Some(fetch.ticket));
    }

    #[test]
    fn test_reply_for_other_session_dropped() {
        let (mut session, fetch) = started();
        let foreign = ContentTicket { session: 2, ..fetch.ticket };
        assert!(!session.apply_content(foreign, Ok(ModeContent::Diagnostic(vec![]))));
        assert!(session.is_loading());
    }

    #[test]
    fn test_failure_leaves_empty_mode_and_retry_reissues() {
        let (mut session, fetch) = started();
        assert!(session.apply_content(fetch.ticket, Err(ContentError::Fetch("offline".into()))));
        assert!(!session.is_loading());
        assert!(session.controller().load_error().is_some());
        assert_eq!(session.answer(0), None);

        let retry = session.retry().unwrap();
        assert_ne!(retry.ticket, fetch.ticket);
        assert!(session.is_loading());
        // The old ticket is no longer honored.
        assert!(!session.apply_content(fetch.ticket, Err(ContentError::Fetch("late".into()))));
    }

    #[test]
    fn test_retry_without_failure_is_noop() {
        let (mut session, _) = started();
        assert!(session.retry().is_none());
    }

    #[test]
    fn test_mismatched_content_counts_as_failure() {
        let (mut session, fetch) = started();
        assert!(session.apply_content(fetch.ticket, Ok(practice_item(0))));
        assert!(matches!(
            session.controller().load_error(),
            Some(ContentError::Schema(_))
        ));
    }

    #[test]
    fn test_practice_proceed_requires_answer() {
        let (mut session, fetch) = started();
        session.apply_content(
            fetch.ticket,
            Ok(ModeContent::Diagnostic(vec![question("1", 0), question("2", 0), question("3", 0)])),
        );
        for _ in 0..3 {
            session.answer(0);
            session.proceed();
        }
        assert_eq!(session.mode(), Mode::Explanation);
        let ticket = session.pending_ticket().unwrap();
        session.apply_content(
            ticket,
            Ok(ModeContent::Explanation(crate::content::ExplanationContent {
                title: "t".into(),
                sections: vec![crate::content::ExplanationSection {
                    title: "only".into(),
                    content: "body".into(),
                }],
            })),
        );
        let practice_fetch = session.finish_explanation().unwrap();
        assert!(session.proceed().is_none());
        session.apply_content(practice_fetch.ticket, Ok(practice_item(2)));
        assert_eq!(session.answer(2), Some(true));
        let next = session.proceed().unwrap();
        assert_eq!(next.ticket.mode, Mode::Practice);
        assert!(session.is_loading());
    }

    #[test]
    fn test_reflection_and_complete_request_nothing() {
        let (mut session, _) = started();
        let mut state = SessionState::new();
        state.finish_diagnostic(3).unwrap();
        state.finish_explanation().unwrap();
        state.enter_verification().unwrap();
        state.finish_verification().unwrap();
        session.state = state;

        assert_eq!(session.mode(), Mode::Reflection);
        assert!(session.content_request().is_none());
        assert!(session.enter_current_mode().is_none());
        assert!(session.pending_ticket().is_none());
        assert!(matches!(session.controller(), ModeController::Reflection(_)));

        session.state.commit_reflection().unwrap();
        assert!(session.content_request().is_none());
        assert!(session.enter_current_mode().is_none());
    }
}
