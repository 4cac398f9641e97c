//! Deduces the key of a monoalphabetic substitution cipher from a plaintext word list.
//!
//! Every word has a pattern describing where its letters repeat, and a substitution cipher
//! never changes that pattern. The [`Solver`] looks up dictionary words sharing each encrypted
//! word's pattern and narrows them down until the candidates of all examined words agree on a
//! single letter pairing, then reports the result as an [`AlphabetMap`].

pub mod alphabet;
pub mod error;
pub mod index;
pub mod pattern;
pub mod phrase;
pub mod solver;

pub use crate::alphabet::{AlphabetMap, Decipherment};
pub use crate::error::{DeduceError, Error, IndexError};
pub use crate::index::{IndexCache, PatternIndex};
pub use crate::pattern::{pattern, Pattern};
pub use crate::phrase::{assemble_message, EncryptedWords};
pub use crate::solver::{Deduction, ExamineOrder, Solver, SolverConfig};

/// Deduces the alphabet of `message` with the default tuple ceiling.
pub fn deduce(
    index: &PatternIndex,
    message: &str,
    order: ExamineOrder,
) -> Result<Deduction, DeduceError> {
    Solver::new(index, SolverConfig::new(order)).deduce(message)
}

/// Decrypts `message` with a deduced alphabet. See [`AlphabetMap::render`].
pub fn render(message: &str, alphabet: &AlphabetMap) -> String {
    alphabet.render(message)
}
