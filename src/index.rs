//! Dictionary pattern index.
//!
//! `PatternIndex` groups every plaintext word under its [`Pattern`], so the words that could
//! possibly encrypt to a given ciphertext word are a single lookup away. `IndexCache` keeps the
//! most recently built index and rebuilds it only when its word-list sources change.

use crate::error::IndexError;
use crate::pattern::Pattern;
use fxhash::{FxHashMap, FxHashSet, FxHasher};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::UNIX_EPOCH;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct PatternIndex {
    words_by_pattern: FxHashMap<Pattern, Vec<String>>,
    word_count: usize,
}

impl PatternIndex {
    /// Builds an index from raw dictionary lines.
    ///
    /// Lines are normalized with [`normalize_word`]; lines that normalize to nothing are skipped
    /// and repeats keep only their first occurrence.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = PatternIndex::default();
        let mut seen = FxHashSet::default();

        for word in words {
            let word = match normalize_word(word.as_ref()) {
                Some(word) => word,
                None => continue,
            };

            if !seen.insert(word.clone()) {
                continue;
            }

            index
                .words_by_pattern
                .entry(Pattern::of(&word))
                .or_default()
                .push(word);
            index.word_count += 1;
        }

        index
    }

    /// Reads each word-list file, one word per line, and indexes the combined list.
    pub fn load<P: AsRef<Path>>(sources: &[P]) -> Result<Self, IndexError> {
        let mut text = Vec::with_capacity(sources.len());
        for path in sources {
            let path = path.as_ref();
            let bytes = fs::read(path).map_err(|source| IndexError::Io {
                path: path.to_owned(),
                source,
            })?;
            debug!(path = %path.display(), bytes = bytes.len(), "read word list");
            text.push(String::from_utf8_lossy(&bytes).into_owned());
        }

        let index = PatternIndex::from_words(text.iter().flat_map(|text| text.lines()));
        info!(
            words = index.word_count,
            patterns = index.words_by_pattern.len(),
            "built pattern index"
        );
        Ok(index)
    }

    /// Every indexed word sharing `pattern`, in load order.
    pub fn lookup(&self, pattern: &Pattern) -> &[String] {
        self.words_by_pattern
            .get(pattern)
            .map(|words| words.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    pub fn pattern_count(&self) -> usize {
        self.words_by_pattern.len()
    }
}

/// Strips punctuation and surrounding whitespace from a dictionary line and uppercases it.
pub fn normalize_word(line: &str) -> Option<String> {
    let word: String = line
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_uppercase();

    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Holds the last index built and the signature of the sources it was built from.
#[derive(Debug, Default)]
pub struct IndexCache {
    signature: Option<u64>,
    index: Option<Rc<PatternIndex>>,
}

impl IndexCache {
    pub fn new() -> Self {
        IndexCache::default()
    }

    /// Returns the held index when `sources` still match it, otherwise rebuilds.
    ///
    /// A rebuilt index replaces the held one; indexes handed out earlier are left untouched.
    pub fn build_or_load<P: AsRef<Path>>(
        &mut self,
        sources: &[P],
    ) -> Result<Rc<PatternIndex>, IndexError> {
        let signature = source_signature(sources);

        if let (Some(held), Some(index)) = (self.signature, &self.index) {
            if held == signature {
                debug!(signature, "pattern index cache hit");
                return Ok(Rc::clone(index));
            }
        }

        info!(signature, "pattern index cache miss, rebuilding");
        let index = Rc::new(PatternIndex::load(sources)?);
        self.signature = Some(signature);
        self.index = Some(Rc::clone(&index));
        Ok(index)
    }

    pub fn clear(&mut self) {
        self.signature = None;
        self.index = None;
    }
}

/// Hash of the sorted, deduplicated source paths plus each file's size and modification time.
fn source_signature<P: AsRef<Path>>(sources: &[P]) -> u64 {
    let mut paths: Vec<PathBuf> = sources.iter().map(|p| p.as_ref().to_owned()).collect();
    paths.sort();
    paths.dedup();

    let mut hasher = FxHasher::default();
    for path in &paths {
        path.hash(&mut hasher);
        if let Ok(meta) = fs::metadata(path) {
            meta.len().hash(&mut hasher);
            meta.modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .hash(&mut hasher);
        }
    }
    hasher.finish()
}
