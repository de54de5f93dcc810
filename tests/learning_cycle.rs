use std::sync::Mutex;
use std::time::Duration;

use learnloop::content::{
    ContentError, ContentProvider, Difficulty, ExplanationContent, ExplanationSection,
    PracticeItem, Question, VerificationScenario,
};
use learnloop::session::cycle::{Fetch, LearningSession, ModeController, RESTART_DELAY};
use learnloop::session::state::{MasteryLevel, Mode, Topic, TransitionError};

const DIAGNOSTIC_CORRECT: usize = 0;
const PRACTICE_CORRECT: usize = 1;
const VERIFICATION_CORRECT: usize = 2;

/// Deterministic provider: fixed answer positions, eight explanation sections,
/// and a log of every practice difficulty requested.
#[derive(Default)]
struct ScriptedProvider {
    difficulties: Mutex<Vec<Difficulty>>,
}

fn question(id: &str, correct: usize) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {id}"),
        options: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        correct_index: correct,
        explanation: format!("Because {id}"),
    }
}

impl ContentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_diagnostic(&self, _topic: &str) -> Result<Vec<Question>, ContentError> {
        Ok((1..=3)
            .map(|i| question(&format!("d{i}"), DIAGNOSTIC_CORRECT))
            .collect())
    }

    fn fetch_explanation(&self, topic: &str) -> Result<ExplanationContent, ContentError> {
        Ok(ExplanationContent {
            title: topic.to_string(),
            sections: (1..=8)
                .map(|i| ExplanationSection {
                    title: format!("Section {i}"),
                    content: format!("Body {i}"),
                })
                .collect(),
        })
    }

    fn fetch_practice(
        &self,
        _topic: &str,
        difficulty: Difficulty,
    ) -> Result<PracticeItem, ContentError> {
        let mut log = self.difficulties.lock().unwrap();
        log.push(difficulty);
        Ok(PracticeItem {
            question: question(&format!("p{}", log.len()), PRACTICE_CORRECT),
            difficulty,
        })
    }

    fn fetch_verification(&self, _topic: &str) -> Result<VerificationScenario, ContentError> {
        Ok(VerificationScenario {
            scenario: "A production incident".to_string(),
            questions: (1..=3)
                .map(|i| question(&format!("v{i}"), VERIFICATION_CORRECT))
                .collect(),
        })
    }
}

struct Harness {
    provider: ScriptedProvider,
    session: LearningSession,
}

impl Harness {
    fn start() -> Self {
        let provider = ScriptedProvider::default();
        let (session, fetch) = LearningSession::start(1, Topic::new("Rust Ownership").unwrap());
        let mut harness = Self { provider, session };
        harness.deliver(Some(fetch));
        harness
    }

    fn deliver(&mut self, fetch: Option<Fetch>) {
        let fetch = fetch.expect("expected a content fetch");
        let result = self.provider.fetch(&fetch.request);
        assert!(self.session.apply_content(fetch.ticket, result));
    }

    fn diagnostic(&mut self, answers: [usize; 3]) {
        for (i, answer) in answers.into_iter().enumerate() {
            self.session.answer(answer).unwrap();
            let fetch = self.session.proceed();
            if i < 2 {
                assert!(fetch.is_none());
            } else {
                self.deliver(fetch);
            }
        }
    }

    fn explanation(&mut self) {
        for _ in 0..7 {
            self.session.next_slide();
        }
        let fetch = self.session.finish_explanation();
        self.deliver(fetch);
    }

    fn practice(&mut self, correct: bool) {
        let index = if correct {
            PRACTICE_CORRECT
        } else {
            PRACTICE_CORRECT + 1
        };
        assert_eq!(self.session.answer(index), Some(correct));
        let fetch = self.session.proceed();
        self.deliver(fetch);
    }

    fn to_verification(&mut self) {
        self.diagnostic([0, 0, 0]);
        self.explanation();
        self.practice(true);
        let fetch = self.session.request_verification().unwrap();
        self.deliver(Some(fetch));
    }
}

#[test]
fn diagnostic_records_score_and_moves_to_explanation() {
    let mut h = Harness::start();
    assert_eq!(h.session.mode(), Mode::Diagnostic);
    h.diagnostic([DIAGNOSTIC_CORRECT, DIAGNOSTIC_CORRECT, 3]);

    assert_eq!(h.session.mode(), Mode::Explanation);
    assert_eq!(h.session.state().diagnostic_score(), Some(2));
    assert_eq!(h.session.state().mastery(), MasteryLevel::Novice);
}

#[test]
fn explanation_only_finishes_on_last_slide() {
    let mut h = Harness::start();
    h.diagnostic([0, 0, 0]);

    assert!(h.session.finish_explanation().is_none());
    for _ in 0..6 {
        h.session.next_slide();
    }
    assert!(h.session.finish_explanation().is_none());
    h.session.next_slide();
    h.session.previous_slide();
    h.session.next_slide();

    let fetch = h.session.finish_explanation();
    h.deliver(fetch);
    assert_eq!(h.session.mode(), Mode::Practice);
    assert_eq!(h.session.state().mastery(), MasteryLevel::Foundation);
}

#[test]
fn practice_switches_to_hard_after_five_answers() {
    let mut h = Harness::start();
    h.diagnostic([0, 0, 0]);
    h.explanation();
    for _ in 0..6 {
        h.practice(true);
    }

    assert_eq!(h.session.state().questions_answered(), 6);
    let log = h.provider.difficulties.lock().unwrap().clone();
    // One initial fetch plus one per answer.
    assert_eq!(log.len(), 7);
    assert!(log[..6].iter().all(|d| *d == Difficulty::Medium));
    assert_eq!(log[6], Difficulty::Hard);

    // The loading practice controller remembers what it asked for.
    assert_eq!(h.session.answer(PRACTICE_CORRECT), Some(true));
    let next = h.session.proceed();
    assert!(h.session.is_loading());
    assert!(matches!(
        h.session.controller(),
        ModeController::Practice(p) if p.requested == Some(Difficulty::Hard)
    ));
    h.deliver(next);
    assert_eq!(h.session.history().outcomes(), &[true; 7]);
}

#[test]
fn verification_gate_follows_practice_accuracy() {
    let mut h = Harness::start();
    h.diagnostic([0, 0, 0]);
    h.explanation();

    // No answers yet: the gate is open.
    assert!(h.session.verification_unlocked());

    h.practice(false);
    assert_eq!(h.session.state().practice_accuracy(), 0);
    assert_eq!(
        h.session.request_verification(),
        Err(TransitionError::VerificationLocked { accuracy: 0 })
    );
    assert_eq!(h.session.mode(), Mode::Practice);

    h.practice(true);
    assert_eq!(h.session.state().practice_accuracy(), 50);
    assert!(!h.session.verification_unlocked());

    h.practice(true);
    assert_eq!(h.session.state().practice_accuracy(), 67);
    assert!(h.session.verification_unlocked());
    let fetch = h.session.request_verification().unwrap();
    h.deliver(Some(fetch));
    assert_eq!(h.session.mode(), Mode::Verification);
}

#[test]
fn failed_verification_returns_to_practice_after_delay() {
    let mut h = Harness::start();
    h.to_verification();
    let answered = h.session.state().questions_answered();

    assert_eq!(h.session.answer(0), Some(false));
    let due = h.session.restart_due_at().unwrap();

    // The failed step cannot be skipped or re-answered.
    assert!(h.session.proceed().is_none());
    assert_eq!(h.session.answer(VERIFICATION_CORRECT), None);

    assert!(h.session.tick(due - Duration::from_millis(1)).is_none());
    assert_eq!(h.session.mode(), Mode::Verification);
    let remaining = h.session.restart_remaining(due - RESTART_DELAY).unwrap();
    assert_eq!(remaining, RESTART_DELAY);

    let fetch = h.session.tick(due);
    assert_eq!(h.session.mode(), Mode::Practice);
    assert!(h.session.restart_due_at().is_none());
    assert_eq!(h.session.state().mastery(), MasteryLevel::Foundation);
    assert_eq!(h.session.state().questions_answered(), answered);
    h.deliver(fetch);
    assert!(matches!(h.session.controller(), ModeController::Practice(_)));

    // The timer fires once only.
    assert!(h.session.tick(due + RESTART_DELAY).is_none());
}

#[test]
fn stale_verification_reply_dropped_after_restart() {
    let mut h = Harness::start();
    h.diagnostic([0, 0, 0]);
    h.explanation();
    h.practice(true);
    let verification = h.session.request_verification().unwrap();
    h.deliver(Some(verification.clone()));

    h.session.answer(0);
    let due = h.session.restart_due_at().unwrap();
    let practice = h.session.tick(due).unwrap();

    // A late duplicate of the verification reply must not land in practice.
    let late = h.provider.fetch(&verification.request);
    assert!(!h.session.apply_content(verification.ticket, late));
    assert!(h.session.is_loading());

    let result = h.provider.fetch(&practice.request);
    assert!(h.session.apply_content(practice.ticket, result));
    assert!(!h.session.is_loading());
}

#[test]
fn full_cycle_reaches_master() {
    let mut h = Harness::start();
    h.to_verification();

    for step in 0..3 {
        assert_eq!(h.session.answer(VERIFICATION_CORRECT), Some(true));
        let fetch = h.session.proceed();
        assert!(fetch.is_none(), "step {step} should not fetch");
    }
    assert_eq!(h.session.mode(), Mode::Reflection);
    assert_eq!(h.session.state().mastery(), MasteryLevel::Proficient);
    assert!(h.session.restart_due_at().is_none());

    h.session.set_reflection_text(&"x".repeat(19));
    assert!(!h.session.commit_reflection());
    assert_eq!(h.session.mode(), Mode::Reflection);

    h.session.set_reflection_text(&"x".repeat(20));
    assert!(h.session.commit_reflection());
    assert_eq!(h.session.mode(), Mode::Complete);
    assert_eq!(h.session.state().mastery(), MasteryLevel::Master);
    assert!(matches!(h.session.controller(), ModeController::Complete));
}

#[test]
fn provider_shape_errors_surface_as_failures() {
    struct ShortDiagnostic;
    impl ContentProvider for ShortDiagnostic {
        fn name(&self) -> &str {
            "short"
        }
        fn fetch_diagnostic(&self, _: &str) -> Result<Vec<Question>, ContentError> {
            Ok(vec![question("only", 0)])
        }
        fn fetch_explanation(&self, _: &str) -> Result<ExplanationContent, ContentError> {
            Err(ContentError::Fetch("unused".into()))
        }
        fn fetch_practice(&self, _: &str, _: Difficulty) -> Result<PracticeItem, ContentError> {
            Err(ContentError::Fetch("unused".into()))
        }
        fn fetch_verification(&self, _: &str) -> Result<VerificationScenario, ContentError> {
            Err(ContentError::Fetch("unused".into()))
        }
    }

    let (mut session, fetch) = LearningSession::start(9, Topic::new("Optics").unwrap());
    let result = ShortDiagnostic.fetch(&fetch.request);
    assert!(matches!(result, Err(ContentError::Schema(_))));
    assert!(session.apply_content(fetch.ticket, result));
    assert!(session.controller().load_error().is_some());
    assert_eq!(session.answer(0), None);

    let retry = session.retry().unwrap();
    let good = ScriptedProvider::default().fetch(&retry.request);
    assert!(session.apply_content(retry.ticket, good));
    assert!(matches!(
        session.controller(),
        ModeController::Diagnostic(d) if d.total() == 3
    ));
}
