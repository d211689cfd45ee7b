//! Vocabulary construction: distinct tokens to dense identifiers.

use std::collections::{BTreeSet, HashMap};

use crate::{
    error::BuildError,
    types::{Token, TokenId, Triplet, is_reserved},
};

/// Two-way mapping between tokens and dense integer identifiers.
///
/// Identifiers are assigned by lexicographic byte-wise order over all
/// distinct tokens, sentinels included, starting at 0. The assignment is
/// part of the on-disk contract: dictionary identifiers are meaningless
/// without the word list produced by the same build.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Tokens in identifier order; index equals identifier.
    id_to_token: Vec<Token>,
    /// Reverse lookup from token to identifier.
    token_to_id: HashMap<Token, TokenId>,
    /// Identifier of the start sentinel.
    start_id: TokenId,
}

impl Vocabulary {
    /// Builds the vocabulary for a triplet set.
    ///
    /// Collects every distinct token appearing in any triplet, unions the
    /// mandatory start/end sentinels, and assigns identifiers in sorted
    /// order. Fully deterministic: identical triplet sets produce identical
    /// assignments regardless of iteration order. A triplet set with no
    /// real tokens still yields the valid sentinel-only vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::VocabularyOverflow`] if the distinct token
    /// count cannot be indexed by a 32-bit identifier.
    pub fn from_triplets<'a>(
        triplets: impl IntoIterator<Item = &'a Triplet>,
    ) -> Result<Self, BuildError> {
        let mut distinct: BTreeSet<Token> = BTreeSet::new();
        distinct.insert(Token::start());
        distinct.insert(Token::end());

        for Triplet(t1, t2, t3) in triplets {
            distinct.insert(t1.clone());
            distinct.insert(t2.clone());
            distinct.insert(t3.clone());
        }

        // Identifiers must stay packable into one half of a context key.
        if distinct.len() as u64 > u64::from(TokenId::MAX) + 1 {
            return Err(BuildError::VocabularyOverflow(distinct.len()));
        }

        // BTreeSet iterates in ascending byte-wise order, which is the
        // canonical identifier order.
        let id_to_token: Vec<Token> = distinct.into_iter().collect();
        let token_to_id: HashMap<Token, TokenId> = id_to_token
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as TokenId))
            .collect();

        // Both sentinels were inserted above, so the search always succeeds.
        let start_id = id_to_token.binary_search(&Token::start()).unwrap_or(0) as TokenId;

        Ok(Self {
            id_to_token,
            token_to_id,
            start_id,
        })
    }

    /// Identifier assigned to `token`, if the token was observed.
    pub fn id(&self, token: &Token) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    /// Token owning `id`, if the identifier is in range.
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.id_to_token.get(id as usize)
    }

    /// Identifier of the start sentinel.
    pub fn start_id(&self) -> TokenId {
        self.start_id
    }

    /// Resolves a triplet to identifier form.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownToken`] when a token is missing, which
    /// can only happen if the triplet did not participate in building this
    /// vocabulary.
    pub fn resolve(&self, triplet: &Triplet) -> Result<(TokenId, TokenId, TokenId), BuildError> {
        let Triplet(t1, t2, t3) = triplet;
        let id1 = self.id(t1).ok_or_else(|| BuildError::UnknownToken(t1.clone()))?;
        let id2 = self.id(t2).ok_or_else(|| BuildError::UnknownToken(t2.clone()))?;
        let id3 = self.id(t3).ok_or_else(|| BuildError::UnknownToken(t3.clone()))?;
        Ok((id1, id2, id3))
    }

    /// Total number of tokens, sentinels included.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// True only before any build; a built vocabulary always holds the
    /// sentinels.
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Number of ordinary word tokens, sentinels and link markers excluded.
    pub fn word_count(&self) -> usize {
        self.id_to_token
            .iter()
            .filter(|t| !is_reserved(t.as_str()))
            .count()
    }

    /// Renders the word-list artifact: one token per line in identifier
    /// order, nothing after the final token.
    pub fn word_list(&self) -> String {
        let lines: Vec<&str> = self.id_to_token.iter().map(Token::as_str).collect();
        lines.join("\n")
    }
}
