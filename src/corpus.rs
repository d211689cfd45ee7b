//! Corpus document parsing.
//!
//! The driver accepts one JSON document holding an array of corpus units.
//! A unit is either an array of word tokens (the plain form) or an object
//! with optional `response`, `content` and `transition` arrays (the
//! composed form). Tokenization itself happens upstream; every entry must
//! already be a string. Anything else is malformed input.

use serde::Deserialize;

use crate::{
    error::CorpusError,
    sequence::{ComposedUnit, CorpusUnit},
    types::Token,
};

/// Raw on-disk shape of one corpus unit.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUnit {
    Plain(Vec<String>),
    Composed(RawComposed),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComposed {
    #[serde(default)]
    response: Vec<String>,
    #[serde(default)]
    content: Vec<String>,
    #[serde(default)]
    transition: Vec<String>,
}

impl RawUnit {
    fn into_unit(self) -> CorpusUnit {
        match self {
            Self::Plain(tokens) => CorpusUnit::Plain(into_tokens(tokens)),
            Self::Composed(raw) => CorpusUnit::Composed(ComposedUnit {
                response: into_tokens(raw.response),
                content: into_tokens(raw.content),
                transition: into_tokens(raw.transition),
            }),
        }
    }
}

fn into_tokens(words: Vec<String>) -> Vec<Token> {
    words.into_iter().map(Token::from).collect()
}

/// Parses a corpus document into units.
///
/// # Errors
///
/// Returns [`CorpusError::Malformed`] when the document is not an array of
/// well-formed units, including any non-string token entry.
pub fn parse_units(text: &str) -> Result<Vec<CorpusUnit>, CorpusError> {
    let raw: Vec<RawUnit> = serde_json::from_str(text)?;
    Ok(raw.into_iter().map(RawUnit::into_unit).collect())
}
