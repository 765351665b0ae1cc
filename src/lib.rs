//! Typing assistant engine: prefix completion against a remote ranked
//! suggestion service, single-edit spelling candidates from a local word
//! list, a drawable view of the service's prefix tree, and a togglable
//! grammar annotation of the document.

pub mod assistant;
pub mod config;
pub mod controller;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod grammar;
pub mod prefix;
pub mod sequence;
pub mod service;
pub mod spellcheck;
pub mod stats;
pub mod trie_view;

pub use assistant::Assistant;
pub use config::AssistConfig;
pub use controller::{NavKey, SuggestionController, SuggestionItem, SuggestionKind, SuggestionState};
pub use dictionary::Dictionary;
pub use document::Document;
pub use error::{AssistError, Result};
pub use grammar::{GrammarAnnotator, annotate};
pub use prefix::extract_token;
pub use service::{CompletionService, HttpService};
pub use spellcheck::{SpellCorrector, SuggestedCorrection, is_edit_distance_one};
pub use trie_view::{TrieLayout, TrieNodeView, TrieRenderer};
