//! Quiz outcome bookkeeping for one session.

use crate::Vault;
use crate::error::{Result, VaultError};
use crate::models::Outcome;
use log::debug;

/// Tracks the word currently being quizzed and the misses recorded since the
/// session started.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTracker {
    current_quiz: Option<i64>,
    misses_since_start: u64,
}

impl OutcomeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_quiz(&self) -> Option<i64> {
        self.current_quiz
    }

    pub fn misses_since_start(&self) -> u64 {
        self.misses_since_start
    }

    /// Makes `ordinal` the word under quiz, replacing any unanswered draw.
    pub fn record_draw(&mut self, ordinal: i64) {
        if let Some(previous) = self.current_quiz {
            debug!("Quiz word {} replaced by {} before an outcome", previous, ordinal);
        }
        self.current_quiz = Some(ordinal);
    }

    /// Applies the outcome of the current quiz round to the store.
    ///
    /// The quiz word is consumed once the outcome is stored; on error the
    /// tracker is left untouched.
    pub fn report_outcome(&mut self, vault: &Vault, succeeded: bool) -> Result<Outcome> {
        let ordinal = self.current_quiz.ok_or(VaultError::NoActiveQuiz)?;
        let outcome = vault.update_outcome(ordinal, succeeded)?;
        if !succeeded {
            self.misses_since_start += 1;
        }
        self.current_quiz = None;
        Ok(outcome)
    }
}
