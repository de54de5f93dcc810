use std::fmt;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

/// Practice accuracy needed before verification unlocks.
pub const VERIFICATION_ACCURACY_FLOOR: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Diagnostic,
    Explanation,
    Practice,
    Verification,
    Reflection,
    Complete,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Diagnostic => "Diagnostic",
            Mode::Explanation => "Explanation",
            Mode::Practice => "Practice",
            Mode::Verification => "Verification",
            Mode::Reflection => "Reflection",
            Mode::Complete => "Complete",
        }
    }

    /// Learning depth shown in the session progress bar.
    pub fn progress_percent(self) -> u16 {
        match self {
            Mode::Diagnostic => 10,
            Mode::Explanation => 30,
            Mode::Practice => 50,
            Mode::Verification => 75,
            Mode::Reflection => 90,
            Mode::Complete => 100,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MasteryLevel {
    Novice,
    Foundation,
    Proficient,
    Master,
}

impl MasteryLevel {
    pub fn label(self) -> &'static str {
        match self {
            MasteryLevel::Novice => "Novice",
            MasteryLevel::Foundation => "Foundation",
            MasteryLevel::Proficient => "Proficient",
            MasteryLevel::Master => "Master",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub query: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Topic {
    /// Returns `None` when the query is blank after trimming.
    pub fn new(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(Self {
            query: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {from} to {to}")]
    Illegal { from: Mode, to: Mode },

    #[error("verification locked at {accuracy}% practice accuracy")]
    VerificationLocked { accuracy: u32 },
}

/// Append-only record of practice outcomes for one session.
#[derive(Clone, Debug, Default)]
pub struct PracticeHistory {
    outcomes: Vec<bool>,
}

impl PracticeHistory {
    pub fn push(&mut self, correct: bool) {
        self.outcomes.push(correct);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|&&c| c).count()
    }

    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    /// round(100 * correct / total), halves rounding up; 0 when empty.
    pub fn accuracy(&self) -> u32 {
        let total = self.outcomes.len();
        if total == 0 {
            return 0;
        }
        ((200 * self.correct_count() + total) / (2 * total)) as u32
    }
}

/// Mode, mastery and scoring for one learning session. Mutated only through
/// the transition methods below.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    mode: Mode,
    mastery: MasteryLevel,
    practice_accuracy: u32,
    questions_answered: u32,
    diagnostic_score: Option<u32>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Diagnostic,
            mastery: MasteryLevel::Novice,
            practice_accuracy: 0,
            questions_answered: 0,
            diagnostic_score: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn mastery(&self) -> MasteryLevel {
        self.mastery
    }

    pub fn practice_accuracy(&self) -> u32 {
        self.practice_accuracy
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn diagnostic_score(&self) -> Option<u32> {
        self.diagnostic_score
    }

    /// The first practice question never blocks verification.
    pub fn verification_unlocked(&self) -> bool {
        self.practice_accuracy >= VERIFICATION_ACCURACY_FLOOR || self.questions_answered == 0
    }

    fn advance(&mut self, from: Mode, to: Mode) -> Result<(), TransitionError> {
        if self.mode != from {
            return Err(TransitionError::Illegal {
                from: self.mode,
                to,
            });
        }
        info!(%from, %to, "mode transition");
        self.mode = to;
        Ok(())
    }

    fn raise_mastery(&mut self, level: MasteryLevel) {
        self.mastery = self.mastery.max(level);
    }

    pub fn finish_diagnostic(&mut self, score: u32) -> Result<(), TransitionError> {
        self.advance(Mode::Diagnostic, Mode::Explanation)?;
        self.diagnostic_score = Some(score);
        Ok(())
    }

    pub fn finish_explanation(&mut self) -> Result<(), TransitionError> {
        self.advance(Mode::Explanation, Mode::Practice)?;
        self.raise_mastery(MasteryLevel::Foundation);
        Ok(())
    }

    pub fn enter_verification(&mut self) -> Result<(), TransitionError> {
        if self.mode == Mode::Practice && !self.verification_unlocked() {
            return Err(TransitionError::VerificationLocked {
                accuracy: self.practice_accuracy,
            });
        }
        self.advance(Mode::Practice, Mode::Verification)
    }

    /// Failed verification: back to practice, mastery untouched.
    pub fn restart_practice(&mut self) -> Result<(), TransitionError> {
        self.advance(Mode::Verification, Mode::Practice)
    }

    pub fn finish_verification(&mut self) -> Result<(), TransitionError> {
        self.advance(Mode::Verification, Mode::Reflection)?;
        self.raise_mastery(MasteryLevel::Proficient);
        Ok(())
    }

    pub fn commit_reflection(&mut self) -> Result<(), TransitionError> {
        self.advance(Mode::Reflection, Mode::Complete)?;
        self.raise_mastery(MasteryLevel::Master);
        Ok(())
    }

    /// Refresh the scoring figures after a practice answer was appended.
    pub fn record_practice(&mut self, history: &PracticeHistory) {
        self.practice_accuracy = history.accuracy();
        self.questions_answered += 1;
    }
}
