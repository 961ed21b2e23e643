//! Per-session state: the quiz in progress, the browsing cursor and the
//! translation waiting to be saved.
//!
//! A `Session` is created when a user starts working with a vault and is passed
//! explicitly to every operation, so several sessions can share one `Vault`.
//! Within a session only one quiz word is active at a time: drawing again
//! before reporting an outcome replaces the earlier word.

use crate::Vault;
use crate::error::{Result, VaultError};
use crate::models::{Outcome, PageInfo, Translation, WordEntry};
use crate::pager::{DEFAULT_PAGE_SIZE, Pager};
use crate::selector::select_weighted;
use crate::tracker::OutcomeTracker;
use crate::translate::Translator;
use log::{debug, info, warn};
use rand::Rng;

/// Options for a new session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub page_size: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A word that was translated and can be saved next.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWord {
    pub word: String,
    pub translation: Translation,
    /// Whether the translation came from the vault rather than the translator.
    pub saved: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    tracker: OutcomeTracker,
    pager: Pager,
    pending: Option<PendingWord>,
}

impl Session {
    /// Starts a session over `vault`.
    pub fn start(vault: &Vault, config: SessionConfig) -> Result<Self> {
        info!(
            "Starting session (page size {}, {} misses on record)",
            config.page_size,
            vault.total_misses()?
        );
        Ok(Session {
            tracker: OutcomeTracker::new(),
            pager: Pager::new(config.page_size),
            pending: None,
        })
    }

    pub fn pending(&self) -> Option<&PendingWord> {
        self.pending.as_ref()
    }

    pub fn tracker(&self) -> &OutcomeTracker {
        &self.tracker
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    // --- Lookup & Save ---

    /// Looks `word` up in the vault only.
    pub fn lookup(&self, vault: &Vault, word: &str) -> Result<Option<WordEntry>> {
        vault.lookup_by_word(word)
    }

    /// Translates `word`, preferring the saved translation over the translator.
    ///
    /// The result becomes the pending word. A blank word yields `None` and
    /// leaves the pending word alone. If the vault lookup fails the translator
    /// is still tried.
    pub async fn translate<T>(
        &mut self,
        vault: &Vault,
        translator: &T,
        word: &str,
    ) -> Result<Option<&PendingWord>>
    where
        T: Translator,
    {
        let word = word.trim();
        if word.is_empty() {
            return Ok(None);
        }

        match vault.lookup_by_word(word) {
            Ok(Some(entry)) => {
                debug!("'{}' found in vault at ordinal {}", word, entry.ordinal);
                self.pending = Some(PendingWord {
                    word: entry.word,
                    translation: entry.translation,
                    saved: true,
                });
                return Ok(self.pending.as_ref());
            }
            Ok(None) => debug!("'{}' not saved yet, asking translator", word),
            Err(e) => warn!("Vault lookup of '{}' failed, asking translator: {}", word, e),
        }

        let translation = translator.translate(word).await?;
        self.pending = Some(PendingWord {
            word: word.to_string(),
            translation,
            saved: false,
        });
        Ok(self.pending.as_ref())
    }

    /// Saves the pending word; returns the number of saved words.
    pub fn save_pending(&mut self, vault: &Vault) -> Result<u64> {
        let pending = self.pending.as_mut().ok_or(VaultError::NothingPending)?;
        let total = vault.insert(&pending.word, &pending.translation)?;
        pending.saved = true;
        Ok(total)
    }

    // --- Quiz ---

    /// Draws the next quiz word, favouring words that were missed before.
    pub fn draw_quiz_word<R>(&mut self, vault: &Vault, rng: &mut R) -> Result<WordEntry>
    where
        R: Rng,
    {
        let entry = select_weighted(vault, rng)?;
        self.tracker.record_draw(entry.ordinal);
        Ok(entry)
    }

    /// The word under quiz, with its full translation.
    pub fn current_quiz_word(&self, vault: &Vault) -> Result<WordEntry> {
        let ordinal = self.tracker.current_quiz().ok_or(VaultError::NoActiveQuiz)?;
        vault
            .lookup_by_ordinal(ordinal)?
            .ok_or(VaultError::OrdinalNotFound(ordinal))
    }

    pub fn report_outcome(&mut self, vault: &Vault, succeeded: bool) -> Result<Outcome> {
        self.tracker.report_outcome(vault, succeeded)
    }

    // --- Browsing ---

    /// Words on the current page, newest first.
    pub fn render_page(&mut self, vault: &Vault, reset: bool) -> Result<Vec<WordEntry>> {
        if reset {
            self.pager.first();
        }
        let total = vault.count()?;
        let Some((limit, offset)) = self.pager.window(total) else {
            return Ok(Vec::new());
        };
        let mut page = vault.get_range(limit, offset)?;
        page.reverse();
        Ok(page)
    }

    pub fn page_info(&self, vault: &Vault, reset: bool) -> Result<PageInfo> {
        Ok(self.pager.page_info(vault.count()?, reset))
    }

    pub fn next_page(&mut self, vault: &Vault) -> Result<()> {
        let total = vault.count()?;
        self.pager.next(total);
        Ok(())
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }

    pub fn first_page(&mut self) {
        self.pager.first();
    }

    pub fn last_page(&mut self, vault: &Vault) -> Result<()> {
        let total = vault.count()?;
        self.pager.last(total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultOptions;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Translator that upper-cases words and counts calls.
    #[derive(Default)]
    struct FakeTranslator {
        calls: AtomicUsize,
    }

    impl Translator for FakeTranslator {
        async fn translate(&self, word: &str) -> Result<Translation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if word == "fail" {
                return Err(VaultError::Translation("unknown word".to_string()));
            }
            Ok(Translation::new(word.to_uppercase()))
        }
    }

    fn words(entries: &[WordEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.word.as_str()).collect()
    }

    fn filled_vault(n: usize) -> Vault {
        let vault = Vault::open_in_memory().unwrap();
        for i in 1..=n {
            vault
                .insert(&format!("w{}", i), &Translation::new(format!("t{}", i)))
                .unwrap();
        }
        vault
    }

    #[tokio::test]
    async fn translate_then_save() {
        let _ = env_logger::builder().is_test(true).try_init();
        let vault = Vault::open_in_memory().unwrap();
        let translator = FakeTranslator::default();
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();

        assert!(matches!(
            session.save_pending(&vault),
            Err(VaultError::NothingPending)
        ));

        let pending = session
            .translate(&vault, &translator, " cat ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.word, "cat");
        assert_eq!(pending.translation.text, "CAT");
        assert!(!pending.saved);

        assert_eq!(session.save_pending(&vault).unwrap(), 1);
        assert!(session.pending().unwrap().saved);

        // Second lookup is served from the vault.
        let pending = session
            .translate(&vault, &translator, "cat")
            .await
            .unwrap()
            .unwrap();
        assert!(pending.saved);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_and_failed_translations() {
        let vault = Vault::open_in_memory().unwrap();
        let translator = FakeTranslator::default();
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();

        assert!(session.translate(&vault, &translator, "  ").await.unwrap().is_none());
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);

        session.translate(&vault, &translator, "dog").await.unwrap();
        let err = session
            .translate(&vault, &translator, "fail")
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::Translation(_)));
        // The earlier pending word survives the failure.
        assert_eq!(session.pending().unwrap().word, "dog");
    }

    #[test]
    fn quiz_round_updates_counters() {
        let vault = filled_vault(3);
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        assert!(matches!(
            session.current_quiz_word(&vault),
            Err(VaultError::NoActiveQuiz)
        ));
        assert!(matches!(
            session.report_outcome(&vault, true),
            Err(VaultError::NoActiveQuiz)
        ));

        let drawn = session.draw_quiz_word(&vault, &mut rng).unwrap();
        let shown = session.current_quiz_word(&vault).unwrap();
        assert_eq!(drawn.ordinal, shown.ordinal);

        let outcome = session.report_outcome(&vault, false).unwrap();
        assert_eq!(outcome, Outcome { guesses: 0, misses: 1 });
        assert_eq!(session.tracker().misses_since_start(), 1);
        assert_eq!(vault.total_misses().unwrap(), 1);
    }

    #[test]
    fn draws_follow_misses_from_other_sessions() {
        let vault = filled_vault(3);
        let mut first = Session::start(&vault, SessionConfig::default()).unwrap();
        let mut second = Session::start(&vault, SessionConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(23);

        // The second session misses w1 ten times while the first one is idle.
        for _ in 0..10 {
            while second.draw_quiz_word(&vault, &mut rng).unwrap().ordinal != 1 {}
            second.report_outcome(&vault, false).unwrap();
        }
        assert_eq!(first.tracker().misses_since_start(), 0);
        assert_eq!(vault.total_misses().unwrap(), 10);

        // Shares follow (1 + misses) / (N + M) = 11/13, 1/13, 1/13.
        let rounds = 26_000u32;
        let mut hits = [0u32; 3];
        for _ in 0..rounds {
            let entry = first.draw_quiz_word(&vault, &mut rng).unwrap();
            hits[(entry.ordinal - 1) as usize] += 1;
        }
        let expected = [11.0 / 13.0, 1.0 / 13.0, 1.0 / 13.0];
        for (h, want) in hits.into_iter().zip(expected) {
            let share = f64::from(h) / f64::from(rounds);
            assert!((share - want).abs() < 0.02, "share {} too far from {}", share, want);
        }
    }

    #[test]
    fn reopened_vault_keeps_miss_weights() {
        let dir = tempfile::tempdir().unwrap();
        let options = VaultOptions {
            db_path: Some(dir.path().join("words.db")),
            force_reset: false,
        };
        {
            let vault = Vault::open(options.clone()).unwrap();
            vault.insert("a", &Translation::new("A")).unwrap();
            vault.insert("b", &Translation::new("B")).unwrap();
            for _ in 0..3 {
                vault.update_outcome(2, false).unwrap();
            }
        }

        let vault = Vault::open(options).unwrap();
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(31);
        let rounds = 20_000u32;
        let mut b_hits = 0u32;
        for _ in 0..rounds {
            if session.draw_quiz_word(&vault, &mut rng).unwrap().word == "b" {
                b_hits += 1;
            }
        }
        let share = f64::from(b_hits) / f64::from(rounds);
        assert!((share - 0.8).abs() < 0.02, "share {} too far from 4/5", share);
    }

    #[test]
    fn empty_vault_has_no_quiz_word() {
        let vault = Vault::open_in_memory().unwrap();
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            session.draw_quiz_word(&vault, &mut rng),
            Err(VaultError::EmptyStore)
        ));
    }

    #[test]
    fn pages_run_newest_to_oldest() {
        let vault = filled_vault(12);
        let mut session = Session::start(&vault, SessionConfig { page_size: 5 }).unwrap();

        let page = session.render_page(&vault, false).unwrap();
        assert_eq!(words(&page), vec!["w12", "w11", "w10", "w9", "w8"]);
        assert_eq!(session.page_info(&vault, false).unwrap().to_string(), "Page 1 of 3");

        session.next_page(&vault).unwrap();
        let page = session.render_page(&vault, false).unwrap();
        assert_eq!(words(&page), vec!["w7", "w6", "w5", "w4", "w3"]);

        session.last_page(&vault).unwrap();
        let page = session.render_page(&vault, false).unwrap();
        assert_eq!(words(&page), vec!["w2", "w1"]);
        assert_eq!(session.page_info(&vault, false).unwrap().current, 3);
        assert_eq!(session.page_info(&vault, true).unwrap().current, 1);

        session.prev_page();
        assert_eq!(session.pager().cursor(), 5);

        let page = session.render_page(&vault, true).unwrap();
        assert_eq!(words(&page), vec!["w12", "w11", "w10", "w9", "w8"]);

        session.last_page(&vault).unwrap();
        session.first_page();
        assert_eq!(session.pager().cursor(), 0);
    }

    #[test]
    fn empty_vault_renders_nothing() {
        let vault = Vault::open_in_memory().unwrap();
        let mut session = Session::start(&vault, SessionConfig::default()).unwrap();
        assert!(session.render_page(&vault, true).unwrap().is_empty());
        assert_eq!(session.page_info(&vault, false).unwrap().to_string(), "Page 0 of 0");
    }
}
