//! One-shot batch build: corpus units in, output artifacts out.
//!
//! The pipeline is a single pass with no shared mutable state. Assembly and
//! triplet extraction run as an embarrassingly parallel map over units;
//! table aggregation is a parallel fold into per-worker partial tables
//! reduced by set-union merge, so the result is independent of scheduling
//! and insertion order. All file I/O stays with the caller.

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;

use crate::{
    encode::CompactDictionary,
    error::BuildError,
    sequence::CorpusUnit,
    table::TransitionTable,
    triplets::extract_triplets,
    types::{TokenId, Triplet},
    vocab::Vocabulary,
};

/// Options for a dictionary build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Render progress bars during the parallel phases.
    pub show_progress: bool,
    /// Fail with [`BuildError::EmptyCorpus`] when no real tokens survive
    /// assembly. Off by default: an empty corpus still produces valid
    /// sentinel-only artifacts.
    pub require_words: bool,
}

/// The two artifacts of a build. They are only meaningful together: the
/// dictionary's identifiers index the word list.
#[derive(Debug)]
pub struct BuildOutput {
    pub vocabulary: Vocabulary,
    pub dictionary: CompactDictionary,
}

/// Runs the full pipeline over a batch of corpus units.
///
/// Units too short to contribute triplets are skipped, not rejected.
///
/// # Errors
///
/// Returns [`BuildError::VocabularyOverflow`] if the corpus outgrows the
/// 32-bit identifier space, [`BuildError::EmptyCorpus`] under
/// `require_words` when only sentinels remain, and
/// [`BuildError::Encoding`] if the encoder's self-check fails.
pub fn build(units: &[CorpusUnit], options: BuildOptions) -> Result<BuildOutput, BuildError> {
    let pb = progress_bar(units.len() as u64, "Extracting triplets", options.show_progress)?;
    let triplets: Vec<Triplet> = units
        .par_iter()
        .progress_with(pb)
        .flat_map_iter(|unit| extract_triplets(&unit.assemble()))
        .collect();

    let vocabulary = Vocabulary::from_triplets(&triplets)?;
    if options.require_words && vocabulary.word_count() == 0 {
        return Err(BuildError::EmptyCorpus);
    }

    let id_triplets: Vec<(TokenId, TokenId, TokenId)> = triplets
        .par_iter()
        .map(|triplet| vocabulary.resolve(triplet))
        .collect::<Result<_, _>>()?;

    let start_id = vocabulary.start_id();
    let pb = progress_bar(
        id_triplets.len() as u64,
        "Aggregating transitions",
        options.show_progress,
    )?;
    let table = id_triplets
        .par_iter()
        .progress_with(pb)
        .fold(
            || TransitionTable::new(start_id),
            |mut acc, ids| {
                acc.insert(*ids);
                acc
            },
        )
        .reduce(|| TransitionTable::new(start_id), TransitionTable::merge);

    let dictionary = CompactDictionary::from_table(&table)?;
    Ok(BuildOutput {
        vocabulary,
        dictionary,
    })
}

/// Creates the styled progress bar used by the parallel phases.
///
/// When progress is disabled the bar still exists but draws nowhere, so the
/// iterator plumbing stays identical in both modes.
fn progress_bar(size: u64, msg: &str, visible: bool) -> Result<ProgressBar, BuildError> {
    let pb = ProgressBar::new(size);
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return Ok(pb);
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {msg:<30!} {wide_bar} {pos}/{len}")?;
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::ComposedUnit;
    use crate::types::Token;

    fn plain(items: &[&str]) -> CorpusUnit {
        CorpusUnit::Plain(items.iter().copied().map(Token::from).collect())
    }

    fn quiet() -> BuildOptions {
        BuildOptions::default()
    }

    #[test]
    fn test_single_sentence_artifacts() {
        let units = [plain(&["cat", "sat"])];
        let output = build(&units, quiet()).expect("build should succeed");

        assert_eq!(output.vocabulary.word_list(), "@BOS@\n@EOS@\ncat\nsat");
        assert_eq!(output.dictionary.to_text(), "2\n0,2|0,1\n2,3|1,1\n3,1\n");
    }

    #[test]
    fn test_empty_corpus_yields_sentinel_only_artifacts() {
        let output = build(&[], quiet()).expect("build should succeed");

        assert_eq!(output.vocabulary.word_list(), "@BOS@\n@EOS@");
        assert_eq!(output.dictionary.to_text(), "\n\n");
    }

    #[test]
    fn test_require_words_rejects_empty_corpus() {
        let options = BuildOptions {
            require_words: true,
            ..BuildOptions::default()
        };
        assert!(matches!(build(&[], options), Err(BuildError::EmptyCorpus)));
        // Units holding no tokens are just as empty.
        assert!(matches!(
            build(&[plain(&[])], options),
            Err(BuildError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_tokenless_units_are_skipped_not_rejected() {
        let units = [plain(&[]), plain(&["cat", "sat"])];
        let output = build(&units, quiet()).expect("build should succeed");
        // The empty unit assembles to two sentinels and contributes nothing.
        assert_eq!(output.dictionary.to_text(), "2\n0,2|0,1\n2,3|1,1\n3,1\n");
    }

    #[test]
    fn test_single_word_unit_contributes_one_window() {
        let units = [plain(&["hi"])];
        let output = build(&units, quiet()).expect("build should succeed");

        // [@BOS@, hi, @EOS@] yields exactly the window (@BOS@, hi, @EOS@).
        assert_eq!(output.dictionary.key_count(), 1);
        assert_eq!(output.dictionary.successors(0, 2), Some(&[1][..]));
        assert_eq!(output.dictionary.start_ids(), &[2]);
    }

    #[test]
    fn test_composed_unit_artifacts() {
        let units = [CorpusUnit::Composed(ComposedUnit {
            response: vec![Token::from("ok")],
            ..ComposedUnit::default()
        })];
        let output = build(&units, quiet()).expect("build should succeed");

        // Sorted vocabulary: @BOS@, @EOS@, @LINK_RESPONSE_END@, ok.
        assert_eq!(
            output.vocabulary.word_list(),
            "@BOS@\n@EOS@\n@LINK_RESPONSE_END@\nok"
        );
        assert_eq!(output.dictionary.start_ids(), &[3]);
        assert_eq!(output.dictionary.successors(0, 3), Some(&[2][..]));
        assert_eq!(output.dictionary.successors(3, 2), Some(&[1][..]));
    }

    #[test]
    fn test_parsed_dictionary_reconstructs_token_successors() {
        use crate::encode::CompactDictionary;

        let units = [plain(&["cat", "sat"]), plain(&["cat", "ran"])];
        let output = build(&units, quiet()).expect("build should succeed");

        let parsed = CompactDictionary::from_text(&output.dictionary.to_text())
            .expect("own output should parse");
        let vocab = &output.vocabulary;
        let id = |s: &str| vocab.id(&Token::from(s)).expect("token should be known");

        // After "cat sat" only the end sentinel was ever observed.
        let after_cat_sat = parsed
            .successors(id("cat"), id("sat"))
            .expect("context should exist");
        assert_eq!(after_cat_sat, &[id("@EOS@")]);

        // Both sentences start with "cat", so the start context saw both
        // second words.
        let mut after_start_cat = parsed
            .successors(id("@BOS@"), id("cat"))
            .expect("context should exist")
            .to_vec();
        after_start_cat.sort_unstable();
        assert_eq!(after_start_cat, vec![id("ran"), id("sat")]);
    }

    #[test]
    fn test_artifacts_ignore_unit_order() {
        let forward = [plain(&["cat", "sat"]), plain(&["dog", "ran", "far"]), plain(&["cat", "ran"])];
        let backward = [plain(&["cat", "ran"]), plain(&["dog", "ran", "far"]), plain(&["cat", "sat"])];

        let a = build(&forward, quiet()).expect("build should succeed");
        let b = build(&backward, quiet()).expect("build should succeed");

        assert_eq!(a.vocabulary.word_list(), b.vocabulary.word_list());
        assert_eq!(a.dictionary.to_text(), b.dictionary.to_text());
    }

    #[test]
    fn test_repeated_units_collapse() {
        let once = [plain(&["cat", "sat"])];
        let thrice = [
            plain(&["cat", "sat"]),
            plain(&["cat", "sat"]),
            plain(&["cat", "sat"]),
        ];

        let a = build(&once, quiet()).expect("build should succeed");
        let b = build(&thrice, quiet()).expect("build should succeed");
        assert_eq!(a.dictionary.to_text(), b.dictionary.to_text());
    }

    #[test]
    fn test_progress_enabled_build_matches_quiet_build() {
        let units = [plain(&["cat", "sat"]), plain(&["sat", "cat"])];
        let loud = BuildOptions {
            show_progress: true,
            ..BuildOptions::default()
        };

        let a = build(&units, quiet()).expect("build should succeed");
        let b = build(&units, loud).expect("build should succeed");
        assert_eq!(a.dictionary.to_text(), b.dictionary.to_text());
    }
}
