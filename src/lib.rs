//! Compact order-2 Markov dictionary builder.
//!
//! The crate turns pre-tokenized corpus units into the two artifacts a
//! runtime text generator consumes: a word list mapping dense integer
//! identifiers to tokens, and a compact dictionary mapping every 2-token
//! context to the set of identifiers observed after it, laid out as sorted
//! packed keys with offset/length windows into one shared flat candidate
//! array.
//!
//! Tokenization is an external concern; units arrive as word-token lists.
//! The whole build is a pure single-pass batch transformation, so every
//! stage is testable without touching the file system.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]

pub mod corpus;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod sequence;
pub mod table;
pub mod triplets;
pub mod types;
pub mod vocab;

pub use corpus::parse_units;
pub use encode::CompactDictionary;
pub use error::{BuildError, CorpusError, DictParseError, EncodeError};
pub use pipeline::{BuildOptions, BuildOutput, build};
pub use sequence::{ComposedUnit, CorpusUnit};
pub use table::TransitionTable;
pub use types::{ContextKey, Token, TokenId};
pub use vocab::Vocabulary;
