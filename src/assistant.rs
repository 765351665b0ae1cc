//! Ties the document, suggestion controller, trie renderer and grammar
//! annotator to one service handle. This is the event surface a UI calls.
//!
//! Input handlers never wait on the network. Each one updates local state,
//! spawns whatever requests it needs and returns. Finished requests land on
//! a channel and take effect when the caller drains it with `apply_pending`,
//! `resolve_next` or `settle`; the controller and renderer drop anything that
//! was superseded in the meantime.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SuggestConfig;
use crate::controller::{
    NavKey, QueryTicket, ResponseOutcome, Selection, SuggestionController, SuggestionState,
};
use crate::document::Document;
use crate::error::Result;
use crate::grammar::{AnnotatedText, GrammarAnnotator};
use crate::prefix::extract_token;
use crate::service::CompletionService;
use crate::spellcheck::SpellCorrector;
use crate::trie_view::{SnapshotTicket, TrieLayout, TrieNodeView, TrieRenderer};

/// A request that finished in the background.
#[derive(Debug)]
enum Resolved {
    Query(QueryTicket, Result<Vec<String>>),
    Snapshot(SnapshotTicket, Result<TrieNodeView>),
    Inserted(String, Result<()>),
    Deleted(String, Result<()>),
}

pub struct Assistant<S: ?Sized> {
    service: Arc<S>,
    runtime: Handle,
    document: Document,
    controller: SuggestionController,
    renderer: TrieRenderer,
    annotator: GrammarAnnotator,
    tx: mpsc::UnboundedSender<Resolved>,
    rx: mpsc::UnboundedReceiver<Resolved>,
    in_flight: usize,
}

impl<S> Assistant<S>
where
    S: CompletionService + ?Sized + 'static,
{
    /// Spawns requests on the runtime this is called from.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use `with_runtime` to
    /// build one from plain threads.
    pub fn new(service: Arc<S>, config: &SuggestConfig) -> Self {
        Self::with_runtime(service, config, Handle::current())
    }

    pub fn with_runtime(service: Arc<S>, config: &SuggestConfig, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            runtime,
            document: Document::default(),
            controller: SuggestionController::new(config.limit, config.limit_range())
                .with_spell_limit(config.spell_limit),
            renderer: TrieRenderer::new(),
            annotator: GrammarAnnotator::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn attach_dictionary(&mut self, corrector: Arc<SpellCorrector>) {
        self.controller.attach_dictionary(corrector);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn suggestions(&self) -> &SuggestionState {
        self.controller.state()
    }

    pub fn limit(&self) -> usize {
        self.controller.limit()
    }

    pub fn trie_layout(&self) -> &TrieLayout {
        self.renderer.layout()
    }

    pub fn annotated(&self) -> Option<&AnnotatedText> {
        self.annotator.annotated()
    }

    /// Requests spawned but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn type_text(&mut self, text: &str) {
        self.document.push_str(text);
        self.on_text_changed();
    }

    pub fn backspace(&mut self) {
        self.document.backspace();
        self.on_text_changed();
    }

    pub fn set_text(&mut self, text: &str) {
        self.document.set_text(text);
        self.on_text_changed();
    }

    pub fn set_limit(&mut self, limit: usize) {
        let ticket = self.controller.on_limit_changed(limit, &self.document);
        self.request_completions(ticket);
        self.refresh_trie();
    }

    fn on_text_changed(&mut self) {
        let ticket = self.controller.on_text_changed(&self.document);
        self.request_completions(ticket);
        self.refresh_trie();
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = Resolved> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            // the receiver only goes away with the assistant
            let _ = tx.send(request.await);
        });
    }

    fn request_completions(&mut self, ticket: Option<QueryTicket>) {
        let Some(ticket) = ticket else { return };
        let service = Arc::clone(&self.service);
        self.spawn_request(async move {
            let response = service.query(&ticket.token, ticket.limit).await;
            Resolved::Query(ticket, response)
        });
    }

    pub fn refresh_trie(&mut self) {
        let prefix = extract_token(self.document.text());
        let ticket = self.renderer.begin(&prefix, self.controller.limit());
        let service = Arc::clone(&self.service);
        self.spawn_request(async move {
            let snapshot = service.snapshot().await;
            Resolved::Snapshot(ticket, snapshot)
        });
    }

    /// Commits `word` immediately and reports it in the background. The
    /// returned handle resolves once the report finished or failed.
    pub fn select(&mut self, word: &str) -> JoinHandle<()> {
        let selection = self.controller.on_select(&mut self.document, word);
        self.report(selection)
    }

    pub fn on_key(&mut self, key: NavKey) -> Option<JoinHandle<()>> {
        self.controller
            .on_key(key, &mut self.document)
            .map(|selection| self.report(selection))
    }

    fn report(&self, selection: Selection) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        self.runtime.spawn(async move {
            if let Err(e) = service.select(&selection.prefix, &selection.word).await {
                log::warn!("Selection feedback for {:?} failed: {e}", selection.word);
            }
        })
    }

    /// Adds `word` to the service; the trie view refreshes once it is done.
    pub fn insert_word(&mut self, word: &str) {
        let service = Arc::clone(&self.service);
        let word = word.to_string();
        self.spawn_request(async move {
            let result = service.insert(&word).await;
            Resolved::Inserted(word, result)
        });
    }

    /// Deletes `word` remotely. Once that succeeds the completion pipeline
    /// re-runs so the list stops offering it.
    pub fn delete_word(&mut self, word: &str) {
        let service = Arc::clone(&self.service);
        let word = word.to_string();
        self.spawn_request(async move {
            let result = service.delete(&word).await;
            Resolved::Deleted(word, result)
        });
    }

    fn apply(&mut self, resolved: Resolved) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match resolved {
            Resolved::Query(ticket, response) => {
                if self.controller.apply_response(&ticket, response) == ResponseOutcome::Applied {
                    log::debug!(
                        "Showing {} suggestions for {:?}",
                        self.controller.state().items().len(),
                        ticket.token
                    );
                }
            }
            Resolved::Snapshot(ticket, snapshot) => {
                self.renderer.apply(&ticket, snapshot);
            }
            Resolved::Inserted(word, result) => match result {
                Ok(()) => {
                    log::info!("Inserted {word:?}");
                    self.refresh_trie();
                }
                Err(e) => log::warn!("Insert of {word:?} failed: {e}"),
            },
            Resolved::Deleted(word, result) => match result {
                Ok(()) => {
                    log::info!("Deleted {word:?}");
                    self.on_text_changed();
                }
                Err(e) => log::warn!("Delete of {word:?} failed: {e}"),
            },
        }
    }

    /// Applies every request that has already finished, without waiting.
    /// Returns how many were applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(resolved) = self.rx.try_recv() {
            self.apply(resolved);
            applied += 1;
        }
        applied
    }

    /// Waits for the next request to finish and applies it. Returns false
    /// when nothing is in flight.
    pub async fn resolve_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(resolved) => {
                self.apply(resolved);
                true
            }
            None => false,
        }
    }

    /// Waits until every request in flight, including follow-ups they
    /// trigger, has been applied. A request that never answers keeps this
    /// pending; callers bound it with a timeout.
    pub async fn settle(&mut self) {
        while self.resolve_next().await {}
    }

    /// Switches between the plain and annotated view. Returns whether the
    /// annotated view is now showing.
    pub fn toggle_grammar(&mut self) -> bool {
        self.annotator.toggle(&mut self.document)
    }
}
