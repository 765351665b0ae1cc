//! Suggestion state and the request cycle that feeds it.
//!
//! The controller never awaits anything itself. A text or limit change
//! hands back a `QueryTicket`; whoever drives the network resolves it and
//! passes the result to `apply_response`. Tickets carry a sequence number so
//! a slow early response cannot overwrite the list produced by a later one.

use std::sync::Arc;

use crate::document::Document;
use crate::error::Result;
use crate::prefix::extract_token;
use crate::sequence::RequestSequencer;
use crate::spellcheck::{DEFAULT_SUGGESTIONS, SpellCorrector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Completion,
    Spelling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    pub text: String,
    pub kind: SuggestionKind,
}

impl SuggestionItem {
    pub fn completion(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SuggestionKind::Completion }
    }

    pub fn spelling(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SuggestionKind::Spelling }
    }
}

/// The rendered list plus the keyboard highlight. Completions come first in
/// service order, then spelling candidates not already among them, so no
/// word is listed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    items: Vec<SuggestionItem>,
    active_index: Option<usize>,
}

impl SuggestionState {
    pub fn items(&self) -> &[SuggestionItem] {
        &self.items
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_item(&self) -> Option<&SuggestionItem> {
        self.active_index.and_then(|i| self.items.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn completions(&self) -> impl Iterator<Item = &str> {
        self.items_of(SuggestionKind::Completion)
    }

    pub fn spelling(&self) -> impl Iterator<Item = &str> {
        self.items_of(SuggestionKind::Spelling)
    }

    fn items_of(&self, kind: SuggestionKind) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(move |item| item.kind == kind)
            .map(|item| item.text.as_str())
    }

    fn replace(&mut self, items: Vec<SuggestionItem>) {
        self.items = items;
        self.active_index = None;
    }

    fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn select_next(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.active_index = Some(match self.active_index {
            Some(i) => (i + 1) % len,
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.active_index = Some(match self.active_index {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub seq: u64,
    pub token: String,
    pub limit: usize,
}

/// What `apply_response` did with a resolved ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    Superseded,
    Failed,
}

/// A committed suggestion, for the ranking feedback call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub prefix: String,
    pub word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitRange {
    pub min: usize,
    pub max: usize,
}

impl LimitRange {
    pub fn clamp(&self, limit: usize) -> usize {
        limit.clamp(self.min, self.max)
    }
}

impl Default for LimitRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

pub struct SuggestionController {
    state: SuggestionState,
    sequencer: RequestSequencer,
    limit: usize,
    limit_range: LimitRange,
    spell_limit: usize,
    corrector: Option<Arc<SpellCorrector>>,
}

impl SuggestionController {
    pub fn new(limit: usize, limit_range: LimitRange) -> Self {
        Self {
            state: SuggestionState::default(),
            sequencer: RequestSequencer::default(),
            limit: limit_range.clamp(limit),
            limit_range,
            spell_limit: DEFAULT_SUGGESTIONS,
            corrector: None,
        }
    }

    pub fn with_spell_limit(mut self, spell_limit: usize) -> Self {
        self.spell_limit = spell_limit;
        self
    }

    /// Spelling candidates are only produced once a dictionary is attached.
    pub fn attach_dictionary(&mut self, corrector: Arc<SpellCorrector>) {
        self.corrector = Some(corrector);
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn on_text_changed(&mut self, doc: &Document) -> Option<QueryTicket> {
        let token = extract_token(doc.text());
        if token.is_empty() {
            // anything still in flight is now stale
            self.sequencer.issue();
            self.state.clear();
            return None;
        }
        let ticket = QueryTicket {
            seq: self.sequencer.issue(),
            token,
            limit: self.limit,
        };
        log::debug!(
            "Issuing completion request #{} for {:?} (k={})",
            ticket.seq,
            ticket.token,
            ticket.limit
        );
        Some(ticket)
    }

    pub fn on_limit_changed(&mut self, new_limit: usize, doc: &Document) -> Option<QueryTicket> {
        self.limit = self.limit_range.clamp(new_limit);
        self.on_text_changed(doc)
    }

    pub fn apply_response(
        &mut self,
        ticket: &QueryTicket,
        response: Result<Vec<String>>,
    ) -> ResponseOutcome {
        if !self.sequencer.is_current(ticket.seq) {
            log::debug!(
                "Discarding response #{} (latest is #{})",
                ticket.seq,
                self.sequencer.latest()
            );
            return ResponseOutcome::Superseded;
        }

        let completions = match response {
            Ok(words) => words,
            Err(e) => {
                log::warn!("Completion request for {:?} failed: {e}", ticket.token);
                return ResponseOutcome::Failed;
            }
        };

        let spelling: Vec<String> = self
            .spelling_candidates(&ticket.token)
            .into_iter()
            .filter(|word| !completions.contains(word))
            .collect();
        let mut items: Vec<SuggestionItem> =
            completions.into_iter().map(SuggestionItem::completion).collect();
        items.extend(spelling.into_iter().map(SuggestionItem::spelling));
        self.state.replace(items);
        ResponseOutcome::Applied
    }

    fn spelling_candidates(&self, token: &str) -> Vec<String> {
        match &self.corrector {
            Some(corrector) => corrector
                .suggest_single_word_corrections(token, self.spell_limit)
                .into_words(),
            None => Vec::new(),
        }
    }

    /// Replaces the token under edit with `word` and clears the list.
    pub fn on_select(&mut self, doc: &mut Document, word: &str) -> Selection {
        let prefix = extract_token(doc.text());
        doc.replace_trailing_token(word);
        self.sequencer.issue();
        self.state.clear();
        Selection {
            prefix,
            word: word.to_string(),
        }
    }

    /// Keyboard handling. Returns a selection only when `Accept` committed
    /// the highlighted item.
    pub fn on_key(&mut self, key: NavKey, doc: &mut Document) -> Option<Selection> {
        match key {
            NavKey::Next => {
                self.state.select_next();
                None
            }
            NavKey::Previous => {
                self.state.select_previous();
                None
            }
            NavKey::Accept => {
                let word = self.state.active_item()?.text.clone();
                Some(self.on_select(doc, &word))
            }
        }
    }
}
