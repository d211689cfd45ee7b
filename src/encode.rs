//! Compact dictionary encoding and its wire format.
//!
//! A completed transition table serializes as a sorted compressed-index
//! structure: the distinct context keys in ascending packed order, each with
//! an offset/length window into one shared flat array holding every key's
//! sorted successor set back to back. The text form is line oriented:
//!
//! - line 1: comma-separated ascending Start-Set identifiers (may be empty),
//! - one line per key: `id1,id2|offset,length`,
//! - final line: the comma-separated flat candidate array (may be empty),
//!
//! with a trailing newline. Reads are strict: files that do not match the
//! line and field shape exactly are rejected, never repaired. The encoding
//! is a pure function of table contents, so any two builds over the same
//! observations produce byte-identical artifacts.

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

use crate::{
    error::{DictParseError, EncodeError},
    table::TransitionTable,
    types::{ContextKey, TokenId, pack_key, unpack_key},
};

/// One key row: a packed context plus its window into the flat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: ContextKey,
    pub offset: usize,
    pub len: usize,
}

/// Compact, read-only form of a transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactDictionary {
    /// Ascending identifiers allowed to start a sequence.
    start_ids: Vec<TokenId>,
    /// Key rows in ascending packed-key order.
    entries: Vec<KeyEntry>,
    /// Every key's sorted successor set, concatenated in key order.
    candidates: Vec<TokenId>,
}

impl CompactDictionary {
    /// Encodes a completed transition table.
    ///
    /// Keys ascend on the packed value (by `id1`, then `id2`), per-key
    /// candidates ascend with duplicates collapsed, and the windows tile
    /// the flat array exactly in key order. The encoding is re-verified
    /// before it is returned so a corrupt artifact can never be emitted.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if verification fails, which would indicate
    /// a bug in the encoder itself rather than bad input.
    pub fn from_table(table: &TransitionTable) -> Result<Self, EncodeError> {
        let mut contexts: Vec<(ContextKey, &BTreeSet<TokenId>)> = table
            .successor_map()
            .iter()
            .map(|(key, set)| (*key, set))
            .collect();
        contexts.sort_unstable_by_key(|(key, _)| *key);

        let mut entries = Vec::with_capacity(contexts.len());
        let mut candidates = Vec::new();
        for (key, set) in contexts {
            let offset = candidates.len();
            // BTreeSet iteration is ascending and already deduplicated.
            candidates.extend(set.iter().copied());
            entries.push(KeyEntry {
                key,
                offset,
                len: candidates.len() - offset,
            });
        }

        let dictionary = Self {
            start_ids: table.start_ids().iter().copied().collect(),
            entries,
            candidates,
        };
        dictionary.verify()?;
        Ok(dictionary)
    }

    /// Checks the structural invariants of the encoding.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: keys out of order, a window not
    /// starting where the previous one ended, an unsorted window, or
    /// windows that fail to cover the flat array exactly.
    fn verify(&self) -> Result<(), EncodeError> {
        let mut expected_offset = 0usize;
        let mut prev_key: Option<ContextKey> = None;

        for entry in &self.entries {
            if prev_key.is_some_and(|prev| prev >= entry.key) {
                return Err(EncodeError::KeyOrder { key: entry.key });
            }
            prev_key = Some(entry.key);

            if entry.offset != expected_offset {
                return Err(EncodeError::WindowOffset {
                    key: entry.key,
                    expected: expected_offset,
                    found: entry.offset,
                });
            }
            expected_offset += entry.len;

            let window = self
                .candidates
                .get(entry.offset..entry.offset + entry.len)
                .ok_or(EncodeError::FlatLength {
                    expected: expected_offset,
                    found: self.candidates.len(),
                })?;
            if !is_strictly_ascending(window) {
                return Err(EncodeError::WindowOrder { key: entry.key });
            }
        }

        if expected_offset != self.candidates.len() {
            return Err(EncodeError::FlatLength {
                expected: expected_offset,
                found: self.candidates.len(),
            });
        }
        Ok(())
    }

    /// Successor identifiers for the context `(id1, id2)`, if present.
    pub fn successors(&self, id1: TokenId, id2: TokenId) -> Option<&[TokenId]> {
        let key = pack_key(id1, id2);
        let idx = self.entries.binary_search_by_key(&key, |e| e.key).ok()?;
        let entry = self.entries[idx];
        self.candidates.get(entry.offset..entry.offset + entry.len)
    }

    /// Ascending identifiers allowed to start a sequence.
    pub fn start_ids(&self) -> &[TokenId] {
        &self.start_ids
    }

    /// Key rows in ascending packed-key order.
    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    /// Number of distinct context keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Total length of the flat candidate array.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Renders the dictionary wire format, trailing newline included.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&join_ids(&self.start_ids));
        out.push('\n');
        for entry in &self.entries {
            let (id1, id2) = unpack_key(entry.key);
            let _ = writeln!(out, "{id1},{id2}|{},{}", entry.offset, entry.len);
        }
        out.push_str(&join_ids(&self.candidates));
        out.push('\n');
        out
    }

    /// Parses the dictionary wire format.
    ///
    /// Validation is strict: the first and last lines must frame zero or
    /// more key lines, every field must be an integer of the right width,
    /// keys must strictly ascend, and the offset/length windows must tile
    /// the flat candidate array exactly, each window strictly ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`DictParseError`] naming the first offending line.
    pub fn from_text(text: &str) -> Result<Self, DictParseError> {
        let lines: Vec<&str> = text.lines().collect();
        let (start_line, rest) = lines.split_first().ok_or(DictParseError::Truncated)?;
        let (flat_line, key_lines) = rest.split_last().ok_or(DictParseError::Truncated)?;

        let start_ids = parse_id_list(start_line, 1)?;
        if !is_strictly_ascending(&start_ids) {
            return Err(DictParseError::StartOrder);
        }

        let flat_line_no = lines.len();
        let candidates = parse_id_list(flat_line, flat_line_no)?;

        let mut entries = Vec::with_capacity(key_lines.len());
        let mut expected_offset = 0usize;
        let mut prev_key: Option<ContextKey> = None;

        for (i, line) in key_lines.iter().enumerate() {
            let line_no = i + 2;
            let (pair_part, window_part) = line
                .split_once('|')
                .ok_or(DictParseError::KeyLine { line: line_no })?;

            let (id1, id2) = parse_pair(pair_part, line_no)?;
            let (offset_raw, len_raw) = split_two(window_part)
                .ok_or(DictParseError::KeyLine { line: line_no })?;
            let offset: usize = offset_raw
                .parse()
                .map_err(|_| DictParseError::Integer { line: line_no })?;
            let len: usize = len_raw
                .parse()
                .map_err(|_| DictParseError::Integer { line: line_no })?;

            let key = pack_key(id1, id2);
            if prev_key.is_some_and(|prev| prev >= key) {
                return Err(DictParseError::KeyOrder { line: line_no });
            }
            prev_key = Some(key);

            // Keys only exist because a successor was observed, so an empty
            // window can never be genuine.
            if len == 0 || offset != expected_offset {
                return Err(DictParseError::Window { line: line_no });
            }
            expected_offset = offset
                .checked_add(len)
                .ok_or(DictParseError::Window { line: line_no })?;

            let window = candidates
                .get(offset..expected_offset)
                .ok_or(DictParseError::Window { line: line_no })?;
            if !is_strictly_ascending(window) {
                return Err(DictParseError::WindowOrder { line: line_no });
            }

            entries.push(KeyEntry { key, offset, len });
        }

        if expected_offset != candidates.len() {
            return Err(DictParseError::Window { line: flat_line_no });
        }

        Ok(Self {
            start_ids,
            entries,
            candidates,
        })
    }
}

/// Splits on a single comma into exactly two fields.
fn split_two(s: &str) -> Option<(&str, &str)> {
    let (a, b) = s.split_once(',')?;
    if b.contains(',') {
        return None;
    }
    Some((a, b))
}

fn parse_pair(s: &str, line_no: usize) -> Result<(TokenId, TokenId), DictParseError> {
    let (a, b) = split_two(s).ok_or(DictParseError::KeyLine { line: line_no })?;
    let id1 = a.parse().map_err(|_| DictParseError::Integer { line: line_no })?;
    let id2 = b.parse().map_err(|_| DictParseError::Integer { line: line_no })?;
    Ok((id1, id2))
}

/// Parses a comma-separated identifier list; an empty line is an empty list.
fn parse_id_list(line: &str, line_no: usize) -> Result<Vec<TokenId>, DictParseError> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|field| {
            field
                .parse()
                .map_err(|_| DictParseError::Integer { line: line_no })
        })
        .collect()
}

fn is_strictly_ascending(ids: &[TokenId]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}

fn join_ids(ids: &[TokenId]) -> String {
    let mut out = String::new();
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{id}");
    }
    out
}
