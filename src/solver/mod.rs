//! The deduction engine.
//!
//! Encrypted words are examined one at a time. Each word brings the dictionary words sharing its
//! pattern into a joint hypothesis, and the hypothesis is narrowed to the candidates that still
//! take part in at least one assignment consistent with every examined word at once. A word that
//! leaves no consistent assignment is set aside as unmatched rather than failing the whole run.

use crate::alphabet::{AlphabetBuilder, AlphabetMap};
use crate::error::{DeduceError, ParseOrderError};
use crate::index::PatternIndex;
use crate::pattern::Pattern;
use crate::phrase::{distinct_letters, EncryptedWords};
use fxhash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, debug_span, info};

#[cfg(test)]
mod tests;

/// Ceiling on joint assignments visited while examining a single word.
pub const DEFAULT_MAX_TUPLES_PER_STEP: u64 = 10_000_000;

/// The order in which encrypted words are examined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExamineOrder {
    /// Longest words first. Candidates are looked up as each word is reached.
    LongestToShortest,
    /// Words with the fewest dictionary candidates first.
    FewestToMostMatches,
    /// Lowest candidate count per letter first.
    MatchesDividedByLength,
}

impl ExamineOrder {
    pub const ALL: [ExamineOrder; 3] = [
        ExamineOrder::LongestToShortest,
        ExamineOrder::FewestToMostMatches,
        ExamineOrder::MatchesDividedByLength,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExamineOrder::LongestToShortest => "LONGEST_TO_SHORTEST",
            ExamineOrder::FewestToMostMatches => "FEWEST_TO_MOST_MATCHES",
            ExamineOrder::MatchesDividedByLength => "MATCHES_DIVIDED_BY_LENGTH",
        }
    }

    fn prefetches(self) -> bool {
        self != ExamineOrder::LongestToShortest
    }
}

impl fmt::Display for ExamineOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExamineOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExamineOrder::ALL
            .iter()
            .copied()
            .find(|order| order.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseOrderError(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub order: ExamineOrder,
    /// `None` lets the consistency search run as long as it needs.
    pub max_tuples_per_step: Option<u64>,
}

impl SolverConfig {
    pub fn new(order: ExamineOrder) -> Self {
        SolverConfig {
            order,
            max_tuples_per_step: Some(DEFAULT_MAX_TUPLES_PER_STEP),
        }
    }

    pub fn with_max_tuples_per_step(mut self, limit: Option<u64>) -> Self {
        self.max_tuples_per_step = limit;
        self
    }
}

/// A pattern qualified by the 1-based position of its word among the matched words, so two
/// matched words with the same shape ("GOOD", "FOOD") keep separate candidate lists.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexedPatternKey {
    pub position: usize,
    pub pattern: Pattern,
}

impl IndexedPatternKey {
    pub fn new(position: usize, word: &str) -> Self {
        IndexedPatternKey {
            position,
            pattern: Pattern::of(word),
        }
    }
}

impl fmt::Display for IndexedPatternKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.position, self.pattern)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deduction {
    pub alphabet: AlphabetMap,
    /// Words that took part in the final hypothesis, in examination order.
    pub matched: Vec<String>,
    /// Words with no candidates, or whose candidates fit no joint assignment.
    pub unmatched: Vec<String>,
    /// The final candidates of each matched word.
    pub hypothesis: Vec<(IndexedPatternKey, Vec<String>)>,
    /// Joint assignments visited across every step of the search.
    pub tuples_compared: u64,
}

struct Hypothesis<'words> {
    key: IndexedPatternKey,
    candidates: Vec<&'words str>,
}

pub struct Solver<'words> {
    index: &'words PatternIndex,
    config: SolverConfig,
}

impl<'words> Solver<'words> {
    pub fn new(index: &'words PatternIndex, config: SolverConfig) -> Self {
        Solver { index, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Normalizes `message` and deduces its ciphertext alphabet.
    pub fn deduce(&self, message: &str) -> Result<Deduction, DeduceError> {
        self.deduce_words(&EncryptedWords::from_message(message))
    }

    pub fn deduce_words(&self, encrypted: &EncryptedWords) -> Result<Deduction, DeduceError> {
        let _span = debug_span!("deduce", order = %self.config.order).entered();

        let target = encrypted.distinct_letters();
        info!(words = ?encrypted.words(), letters = target, "normalized encrypted words");

        let ordered = self.order_words(encrypted.words());
        let last = ordered.len().saturating_sub(1);

        let mut matched: Vec<&str> = Vec::new();
        let mut unmatched: Vec<&str> = Vec::new();
        let mut hypothesis: Vec<Hypothesis<'words>> = Vec::new();
        let mut tuples_compared = 0;

        for (idx, (word, prefetched)) in ordered.into_iter().enumerate() {
            info!(word, "examining encrypted word");
            matched.push(word);

            let key = IndexedPatternKey::new(matched.len(), word);
            let candidates = prefetched.unwrap_or_else(|| self.index.lookup(&key.pattern));
            if candidates.is_empty() {
                matched.pop();
                unmatched.push(word);
                info!(word, "no pattern matches, set aside");
                continue;
            }

            hypothesis.push(Hypothesis {
                key,
                candidates: candidates.iter().map(String::as_str).collect(),
            });

            // A single word has nothing to be checked against yet.
            if matched.len() < 2 {
                continue;
            }

            log_hypothesis("before narrowing", &matched, &hypothesis);
            let lists: Vec<&[&'words str]> =
                hypothesis.iter().map(|h| h.candidates.as_slice()).collect();
            let search = narrow(&matched, &lists, self.config.max_tuples_per_step);
            tuples_compared += search.visited;

            let narrowed = search.kept.ok_or_else(|| DeduceError::TupleLimitExceeded {
                word: word.to_owned(),
                limit: self.config.max_tuples_per_step.unwrap_or(u64::MAX),
            })?;

            if narrowed.first().map_or(false, |kept| !kept.is_empty()) {
                for (h, kept) in hypothesis.iter_mut().zip(narrowed) {
                    h.candidates = kept;
                }
                log_hypothesis("after narrowing", &matched, &hypothesis);
            } else {
                // Only the newest word is blamed, even if an earlier one is the real culprit.
                hypothesis.pop();
                matched.pop();
                unmatched.push(word);
                info!(word, "no consistent tuples, set aside");
            }

            if idx != last
                && distinct_letters(&matched) == target
                && hypothesis.iter().all(|h| h.candidates.len() == 1)
            {
                info!("every letter examined with a single match per word, stopping early");
                break;
            }
        }

        let mut alphabet = AlphabetBuilder::default();
        for (word, h) in matched.iter().zip(&hypothesis) {
            for candidate in &h.candidates {
                alphabet.propose(word, candidate);
            }
        }
        for word in &unmatched {
            alphabet.mark_unknown(word);
        }

        info!(tuples_compared, "deduction finished");
        Ok(Deduction {
            alphabet: alphabet.finish(),
            matched: matched.iter().map(|&w| w.to_owned()).collect(),
            unmatched: unmatched.iter().map(|&w| w.to_owned()).collect(),
            hypothesis: hypothesis
                .into_iter()
                .map(|h| {
                    let candidates = h.candidates.iter().map(|&c| c.to_owned()).collect();
                    (h.key, candidates)
                })
                .collect(),
            tuples_compared,
        })
    }

    /// Pairs each encrypted word with its candidates (when the order needs them up front) and
    /// sorts stably by the configured order.
    fn order_words<'a>(&self, words: &'a [String]) -> Vec<(&'a str, Option<&'words [String]>)> {
        let index = self.index;
        let prefetch = self.config.order.prefetches();
        let mut ordered: Vec<_> = words
            .iter()
            .map(|word| {
                let candidates = if prefetch {
                    Some(index.lookup(&Pattern::of(word)))
                } else {
                    None
                };
                (word.as_str(), candidates)
            })
            .collect();

        let count = |candidates: &Option<&[String]>| candidates.map_or(0, |c| c.len());
        match self.config.order {
            ExamineOrder::LongestToShortest => {
                ordered.sort_by_key(|&(word, _)| Reverse(word.len()));
            }
            ExamineOrder::FewestToMostMatches => {
                ordered.sort_by_key(|(_, candidates)| count(candidates));
            }
            ExamineOrder::MatchesDividedByLength => {
                // a/len(a) < b/len(b), cross-multiplied to stay exact.
                ordered.sort_by(|(a, a_candidates), (b, b_candidates)| {
                    (count(a_candidates) * b.len()).cmp(&(count(b_candidates) * a.len()))
                });
            }
        }

        ordered
    }
}

fn log_hypothesis(stage: &str, matched: &[&str], hypothesis: &[Hypothesis]) {
    for (word, h) in matched.iter().zip(hypothesis) {
        debug!(stage, key = %h.key, word, matches = h.candidates.len());
    }
}

/// Outcome of one narrowing step.
pub(crate) struct Narrowed<'words> {
    /// Per position, the candidates appearing in some consistent tuple, in first-seen order.
    /// `None` when the tuple ceiling was hit.
    pub kept: Option<Vec<Vec<&'words str>>>,
    pub visited: u64,
}

/// Walks the cartesian product of `lists` looking for tuples whose combined pattern matches the
/// combined pattern of `encrypted`.
///
/// Every candidate already has its own word's pattern, so the combined patterns agree exactly
/// when the letters pair up one-to-one across all words. The walk extends that pairing a word at
/// a time and abandons a prefix as soon as it breaks.
pub(crate) fn narrow<'words>(
    encrypted: &[&str],
    lists: &[&[&'words str]],
    limit: Option<u64>,
) -> Narrowed<'words> {
    let mut search = TupleSearch {
        encrypted,
        lists,
        limit,
        letters: Bijection::default(),
        chosen: Vec::with_capacity(lists.len()),
        kept: vec![Vec::new(); lists.len()],
        seen: vec![FxHashSet::default(); lists.len()],
        visited: 0,
    };

    let kept = match search.walk(0) {
        Ok(()) => Some(search.kept),
        Err(LimitExceeded) => None,
    };

    Narrowed {
        kept,
        visited: search.visited,
    }
}

struct LimitExceeded;

struct TupleSearch<'a, 'words> {
    encrypted: &'a [&'a str],
    lists: &'a [&'a [&'words str]],
    limit: Option<u64>,
    letters: Bijection,
    chosen: Vec<&'words str>,
    kept: Vec<Vec<&'words str>>,
    seen: Vec<FxHashSet<&'words str>>,
    visited: u64,
}

impl<'a, 'words> TupleSearch<'a, 'words> {
    fn walk(&mut self, depth: usize) -> Result<(), LimitExceeded> {
        if depth == self.lists.len() {
            for (position, &word) in self.chosen.iter().enumerate() {
                if self.seen[position].insert(word) {
                    self.kept[position].push(word);
                }
            }
            return Ok(());
        }

        let encrypted = self.encrypted[depth];
        let candidates = self.lists[depth];
        for &candidate in candidates {
            self.visited += 1;
            if self.limit.map_or(false, |limit| self.visited > limit) {
                return Err(LimitExceeded);
            }

            if let Some(paired) = self.letters.extend(encrypted, candidate) {
                self.chosen.push(candidate);
                let result = self.walk(depth + 1);
                self.chosen.pop();
                self.letters.retract(paired);
                result?;
            }
        }

        Ok(())
    }
}

/// A one-to-one pairing between ciphertext and plaintext letters that can be rolled back.
#[derive(Debug, Default)]
struct Bijection {
    forward: FxHashMap<char, char>,
    backward: FxHashMap<char, char>,
    trail: Vec<char>,
}

impl Bijection {
    /// Pairs the letters of two words position by position, returning how many new pairs were
    /// added, or `None` (with nothing added) if a letter is already paired elsewhere.
    fn extend(&mut self, encrypted: &str, plain: &str) -> Option<usize> {
        let start = self.trail.len();

        for (c, p) in encrypted.chars().zip(plain.chars()) {
            if let Some(&mapped) = self.forward.get(&c) {
                if mapped == p {
                    continue;
                }
                self.retract(self.trail.len() - start);
                return None;
            }

            if self.backward.contains_key(&p) {
                self.retract(self.trail.len() - start);
                return None;
            }

            self.forward.insert(c, p);
            self.backward.insert(p, c);
            self.trail.push(c);
        }

        Some(self.trail.len() - start)
    }

    /// Undoes the most recent `count` pairs.
    fn retract(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(c) = self.trail.pop() {
                if let Some(p) = self.forward.remove(&c) {
                    self.backward.remove(&p);
                }
            }
        }
    }
}
