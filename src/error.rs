//! Error types for dictionary building and artifact parsing.

use std::fmt;

use indicatif::style::TemplateError;

use crate::types::{ContextKey, Token, unpack_key};

/// Errors that can occur while building the vocabulary and transition table.
#[derive(Debug)]
pub enum BuildError {
    /// Distinct token count exceeds the 32-bit identifier space.
    ///
    /// Packing a context pair into a `u64` would become lossy, so the build
    /// hard-fails instead of truncating.
    VocabularyOverflow(usize),
    /// A triplet token was missing from the vocabulary.
    ///
    /// The vocabulary is built from the same triplet set, so this indicates
    /// a bug rather than bad input.
    UnknownToken(Token),
    /// The corpus held no real tokens and the caller demanded at least one.
    EmptyCorpus,
    /// The encoder detected an internal inconsistency.
    Encoding(EncodeError),
    /// Progress bar template string was invalid.
    ProgressBarSetup(TemplateError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VocabularyOverflow(count) => {
                write!(f, "vocabulary of {count} tokens exceeds the 32-bit identifier space")
            }
            Self::UnknownToken(t) => write!(f, "token {t:?} is missing from the vocabulary"),
            Self::EmptyCorpus => write!(f, "corpus contains no tokens besides sentinels"),
            Self::Encoding(e) => write!(f, "encoding failed: {e}"),
            Self::ProgressBarSetup(e) => write!(f, "template parsing failed: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(e) => Some(e),
            Self::ProgressBarSetup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EncodeError> for BuildError {
    fn from(e: EncodeError) -> Self {
        Self::Encoding(e)
    }
}

impl From<TemplateError> for BuildError {
    fn from(e: TemplateError) -> Self {
        Self::ProgressBarSetup(e)
    }
}

/// Internal invariant violations detected while encoding a transition table.
///
/// Any of these means the encoder produced (or was about to emit) a corrupt
/// artifact; the build fails loudly instead.
#[derive(Debug)]
pub enum EncodeError {
    /// Sorted context keys were not strictly ascending.
    KeyOrder { key: ContextKey },
    /// A key's window did not start where the previous one ended.
    WindowOffset { key: ContextKey, expected: usize, found: usize },
    /// A key's candidate window was not strictly ascending.
    WindowOrder { key: ContextKey },
    /// The windows did not tile the flat candidate array exactly.
    FlatLength { expected: usize, found: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyOrder { key } => {
                let (id1, id2) = unpack_key(*key);
                write!(f, "context key ({id1},{id2}) is out of order")
            }
            Self::WindowOffset { key, expected, found } => {
                let (id1, id2) = unpack_key(*key);
                write!(
                    f,
                    "window for context ({id1},{id2}) starts at {found}, expected {expected}"
                )
            }
            Self::WindowOrder { key } => {
                let (id1, id2) = unpack_key(*key);
                write!(f, "candidate window for context ({id1},{id2}) is not sorted")
            }
            Self::FlatLength { expected, found } => {
                write!(f, "flat candidate array holds {found} entries, windows cover {expected}")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Errors raised by the strict compact-dictionary reader.
///
/// Line numbers are 1-based positions in the rejected file.
#[derive(Debug, PartialEq, Eq)]
pub enum DictParseError {
    /// The file is shorter than the start-line/flat-line frame requires.
    Truncated,
    /// A key line did not match the `id1,id2|offset,length` shape.
    KeyLine { line: usize },
    /// An integer field failed to parse.
    Integer { line: usize },
    /// Context keys were not strictly ascending.
    KeyOrder { line: usize },
    /// An offset/length pair did not tile the flat candidate array.
    Window { line: usize },
    /// A candidate window was not strictly ascending.
    WindowOrder { line: usize },
    /// The start-identifier line was not strictly ascending.
    StartOrder,
}

impl fmt::Display for DictParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "dictionary file is truncated"),
            Self::KeyLine { line } => write!(f, "line {line}: malformed key line"),
            Self::Integer { line } => write!(f, "line {line}: invalid integer field"),
            Self::KeyOrder { line } => write!(f, "line {line}: context keys are not ascending"),
            Self::Window { line } => {
                write!(f, "line {line}: window does not tile the candidate array")
            }
            Self::WindowOrder { line } => {
                write!(f, "line {line}: candidate window is not sorted")
            }
            Self::StartOrder => write!(f, "start identifiers are not ascending"),
        }
    }
}

impl std::error::Error for DictParseError {}

/// Errors that can occur when parsing a corpus document.
#[derive(Debug)]
pub enum CorpusError {
    /// The document is not a well-formed array of corpus units.
    Malformed(serde_json::Error),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "malformed corpus document: {e}"),
        }
    }
}

impl std::error::Error for CorpusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e)
    }
}
