//! Heuristic grammar marks and the plain/annotated toggle.
//!
//! Annotation never edits the document. `annotate` produces byte ranges with
//! a reason over the plain text; `AnnotatedText::to_html` is one way to paint
//! them. Leaving the annotated state puts back the exact text that was
//! snapshotted on entry.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::document::Document;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static DOCUMENT_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*([a-z])").unwrap());
static SENTENCE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+([a-z])").unwrap());
static LOWERCASE_I: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bi\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    RepeatedWord,
    Capitalization,
    LowercaseI,
    MissingPunctuation,
}

impl IssueKind {
    pub fn reason(&self) -> &'static str {
        match self {
            IssueKind::RepeatedWord => "Repeated word",
            IssueKind::Capitalization => "Sentence should start with a capital letter",
            IssueKind::LowercaseI => "\"i\" should be capitalized",
            IssueKind::MissingPunctuation => "Missing punctuation at end of sentence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    /// Byte range into the plain text.
    pub range: Range<usize>,
    pub kind: IssueKind,
}

fn repeated_words(text: &str, marks: &mut Vec<Mark>) {
    let mut previous: Option<regex::Match<'_>> = None;
    for word in WORD.find_iter(text) {
        if let Some(prev) = previous {
            let gap = &text[prev.end()..word.start()];
            let only_space = !gap.is_empty() && gap.chars().all(char::is_whitespace);
            if only_space && prev.as_str().to_lowercase() == word.as_str().to_lowercase() {
                marks.push(Mark { range: word.range(), kind: IssueKind::RepeatedWord });
            }
        }
        previous = Some(word);
    }
}

fn capitalization(text: &str, marks: &mut Vec<Mark>) {
    for re in [&*DOCUMENT_START, &*SENTENCE_START] {
        for caps in re.captures_iter(text) {
            if let Some(letter) = caps.get(1) {
                marks.push(Mark { range: letter.range(), kind: IssueKind::Capitalization });
            }
        }
    }
    for m in LOWERCASE_I.find_iter(text) {
        marks.push(Mark { range: m.range(), kind: IssueKind::LowercaseI });
    }
}

fn terminal_punctuation(text: &str, marks: &mut Vec<Mark>) {
    let line_start = text.rfind('\n').map_or(0, |idx| idx + 1);
    let line = text[line_start..].trim_end();
    if line.split_whitespace().count() < 2 {
        return;
    }
    if let Some(last) = line.chars().last() {
        if !matches!(last, '.' | '!' | '?') {
            let end = line_start + line.len();
            marks.push(Mark {
                range: end - last.len_utf8()..end,
                kind: IssueKind::MissingPunctuation,
            });
        }
    }
}

/// Runs the three passes and returns non-overlapping marks in text order.
/// A mark overlapping an earlier one is dropped.
pub fn analyze(text: &str) -> Vec<Mark> {
    let mut found = Vec::new();
    repeated_words(text, &mut found);
    capitalization(text, &mut found);
    terminal_punctuation(text, &mut found);

    // stable: on equal starts the earlier pass wins
    found.sort_by_key(|m| m.range.start);
    let mut marks: Vec<Mark> = Vec::with_capacity(found.len());
    for mark in found {
        match marks.last() {
            Some(prev) if mark.range.start < prev.range.end => {
                log::debug!("Dropping overlapping {:?} at {:?}", mark.kind, mark.range);
            }
            _ => marks.push(mark),
        }
    }
    marks
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText {
    plain: String,
    marks: Vec<Mark>,
}

impl AnnotatedText {
    pub fn plain_text(&self) -> &str {
        &self.plain
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Escaped text with each mark wrapped in a titled `<mark>` element.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.plain.len());
        let mut pos = 0;
        for mark in &self.marks {
            html.push_str(&escape_html(&self.plain[pos..mark.range.start]));
            html.push_str(r#"<mark class="grammar-issue" title=""#);
            html.push_str(&escape_html(mark.kind.reason()));
            html.push_str(r#"">"#);
            html.push_str(&escape_html(&self.plain[mark.range.clone()]));
            html.push_str("</mark>");
            pos = mark.range.end;
        }
        html.push_str(&escape_html(&self.plain[pos..]));
        html
    }
}

pub fn annotate(text: &str) -> AnnotatedText {
    AnnotatedText {
        plain: text.to_string(),
        marks: analyze(text),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnnotationState {
    #[default]
    Plain,
    Annotated {
        snapshot: String,
        annotated: AnnotatedText,
    },
}

#[derive(Debug, Default)]
pub struct GrammarAnnotator {
    state: AnnotationState,
}

impl GrammarAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AnnotationState::Annotated { .. })
    }

    pub fn annotated(&self) -> Option<&AnnotatedText> {
        match &self.state {
            AnnotationState::Annotated { annotated, .. } => Some(annotated),
            AnnotationState::Plain => None,
        }
    }

    /// Enters the annotated state, or restores the snapshot if already in
    /// it. Returns whether annotation is now active.
    pub fn toggle(&mut self, doc: &mut Document) -> bool {
        match std::mem::take(&mut self.state) {
            AnnotationState::Plain => {
                let snapshot = doc.text().to_string();
                let annotated = annotate(&snapshot);
                log::debug!("Annotated document with {} marks", annotated.marks.len());
                self.state = AnnotationState::Annotated { snapshot, annotated };
                true
            }
            AnnotationState::Annotated { snapshot, .. } => {
                doc.set_text(snapshot);
                false
            }
        }
    }
}
