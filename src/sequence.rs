//! Token sequence assembly.
//!
//! A corpus unit is either a plain token list or a composition of labeled
//! response/content/transition segments. Assembly bounds the unit with the
//! start and end sentinels and, for composed units, splices a link marker at
//! every junction between present segments as well as before the end
//! sentinel. The resulting sequence is what the triplet extractor consumes.

use crate::types::{
    LINK_CONTENT_END, LINK_CONTENT_TRANSITION, LINK_RESPONSE_CONTENT, LINK_RESPONSE_END,
    LINK_RESPONSE_TRANSITION, LINK_TRANSITION_END, Token,
};

/// A corpus unit already segmented into word tokens by an external tokenizer.
#[derive(Debug, Clone)]
pub enum CorpusUnit {
    /// A single unnamed token list.
    Plain(Vec<Token>),
    /// Labeled segments joined with link markers during assembly.
    Composed(ComposedUnit),
}

/// The labeled segments of a composed unit, in assembly order.
///
/// Empty segments are treated as absent: they contribute no tokens and no
/// link marker.
#[derive(Debug, Clone, Default)]
pub struct ComposedUnit {
    pub response: Vec<Token>,
    pub content: Vec<Token>,
    pub transition: Vec<Token>,
}

impl CorpusUnit {
    /// Assembles the bounded token sequence for this unit.
    ///
    /// Plain units become `[@BOS@, tokens.., @EOS@]`. Composed units splice
    /// the junction marker between consecutive present segments and the
    /// matching end-link marker after the last one. A unit with no tokens at
    /// all assembles to the two sentinels alone; such a sequence is too
    /// short to contribute triplets and is skipped downstream, not rejected.
    pub fn assemble(&self) -> Vec<Token> {
        match self {
            Self::Plain(tokens) => assemble_plain(tokens),
            Self::Composed(unit) => assemble_composed(unit),
        }
    }
}

fn assemble_plain(tokens: &[Token]) -> Vec<Token> {
    let mut seq = Vec::with_capacity(tokens.len() + 2);
    seq.push(Token::start());
    seq.extend(tokens.iter().cloned());
    seq.push(Token::end());
    seq
}

fn assemble_composed(unit: &ComposedUnit) -> Vec<Token> {
    let has_content = !unit.content.is_empty();
    let has_transition = !unit.transition.is_empty();

    let capacity = unit.response.len() + unit.content.len() + unit.transition.len() + 5;
    let mut seq = Vec::with_capacity(capacity);
    seq.push(Token::start());

    if !unit.response.is_empty() {
        seq.extend(unit.response.iter().cloned());
        seq.push(Token::from(if has_content {
            LINK_RESPONSE_CONTENT
        } else if has_transition {
            LINK_RESPONSE_TRANSITION
        } else {
            LINK_RESPONSE_END
        }));
    }

    if has_content {
        seq.extend(unit.content.iter().cloned());
        seq.push(Token::from(if has_transition {
            LINK_CONTENT_TRANSITION
        } else {
            LINK_CONTENT_END
        }));
    }

    if has_transition {
        seq.extend(unit.transition.iter().cloned());
        seq.push(Token::from(LINK_TRANSITION_END));
    }

    seq.push(Token::end());
    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<Token> {
        items.iter().copied().map(Token::from).collect()
    }

    fn strs(seq: &[Token]) -> Vec<&str> {
        seq.iter().map(Token::as_str).collect()
    }

    #[test]
    fn test_plain_unit_bounded_by_sentinels() {
        let unit = CorpusUnit::Plain(words(&["cat", "sat"]));
        assert_eq!(strs(&unit.assemble()), vec!["@BOS@", "cat", "sat", "@EOS@"]);
    }

    #[test]
    fn test_empty_plain_unit_assembles_to_sentinels_only() {
        let unit = CorpusUnit::Plain(Vec::new());
        assert_eq!(strs(&unit.assemble()), vec!["@BOS@", "@EOS@"]);
    }

    #[test]
    fn test_composed_full_unit_splices_all_markers() {
        let unit = CorpusUnit::Composed(ComposedUnit {
            response: words(&["yes"]),
            content: words(&["the", "cat"]),
            transition: words(&["anyway"]),
        });
        assert_eq!(
            strs(&unit.assemble()),
            vec![
                "@BOS@",
                "yes",
                "@LINK_RESPONSE_CONTENT@",
                "the",
                "cat",
                "@LINK_CONTENT_TRANSITION@",
                "anyway",
                "@LINK_TRANSITION_END@",
                "@EOS@",
            ]
        );
    }

    #[test]
    fn test_composed_skips_empty_content() {
        let unit = CorpusUnit::Composed(ComposedUnit {
            response: words(&["yes"]),
            content: Vec::new(),
            transition: words(&["anyway"]),
        });
        assert_eq!(
            strs(&unit.assemble()),
            vec![
                "@BOS@",
                "yes",
                "@LINK_RESPONSE_TRANSITION@",
                "anyway",
                "@LINK_TRANSITION_END@",
                "@EOS@",
            ]
        );
    }

    #[test]
    fn test_composed_single_segment_links_to_end() {
        let unit = CorpusUnit::Composed(ComposedUnit {
            content: words(&["hello"]),
            ..ComposedUnit::default()
        });
        assert_eq!(
            strs(&unit.assemble()),
            vec!["@BOS@", "hello", "@LINK_CONTENT_END@", "@EOS@"]
        );
    }

    #[test]
    fn test_composed_with_no_segments_assembles_to_sentinels_only() {
        let unit = CorpusUnit::Composed(ComposedUnit::default());
        assert_eq!(strs(&unit.assemble()), vec!["@BOS@", "@EOS@"]);
    }
}
