//! Ciphertext alphabet to plaintext alphabet mapping, and decryption with it.

use std::collections::BTreeMap;
use std::fmt;

pub const UNKNOWN: char = '?';
pub const ABSENT: char = '-';

/// What a single ciphertext letter is believed to decrypt to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decipherment {
    /// Every plaintext letter proposed for it, in the order first proposed.
    Candidates(Vec<char>),
    /// The letter occurs in the message but no consistent candidate was found.
    Unknown,
    /// The letter never occurs in the message.
    Absent,
}

impl Decipherment {
    /// Presentation form: the candidates, or the matching sentinel.
    pub fn symbols(&self) -> Vec<char> {
        match self {
            Decipherment::Candidates(letters) => letters.clone(),
            Decipherment::Unknown => vec![UNKNOWN],
            Decipherment::Absent => vec![ABSENT],
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            Decipherment::Candidates(letters) => letters.len() == 1,
            _ => false,
        }
    }
}

impl fmt::Display for Decipherment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbols = self.symbols();
        if symbols.len() == 1 {
            write!(f, "{}", symbols[0])
        } else {
            let joined: Vec<String> = symbols.iter().map(char::to_string).collect();
            write!(f, "[{}]", joined.join(","))
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlphabetMap {
    letters: BTreeMap<char, Decipherment>,
}

impl AlphabetMap {
    pub fn get(&self, cipher: char) -> Option<&Decipherment> {
        self.letters.get(&cipher)
    }

    /// Entries ordered by ciphertext letter.
    pub fn iter(&self) -> impl Iterator<Item = (char, &Decipherment)> {
        self.letters.iter().map(|(&k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Decrypts `message`, keeping its layout and the case of each letter.
    ///
    /// Ambiguous letters come out as a bracketed list such as `[f,d]`; characters that are not
    /// keys of the map are copied through untouched.
    pub fn render(&self, message: &str) -> String {
        let mut decrypted = String::with_capacity(message.len());

        for c in message.chars() {
            let deciphered = self
                .letters
                .get(&c.to_ascii_uppercase())
                .filter(|_| c.is_ascii_alphabetic());

            match deciphered {
                None => decrypted.push(c),
                Some(decipherment) => {
                    let replacement = decipherment.to_string();
                    if c.is_uppercase() {
                        decrypted.push_str(&replacement.to_uppercase());
                    } else {
                        decrypted.push_str(&replacement.to_lowercase());
                    }
                }
            }
        }

        decrypted
    }
}

/// Accumulates letter proposals and seals them into an [`AlphabetMap`].
#[derive(Debug, Default)]
pub(crate) struct AlphabetBuilder {
    letters: BTreeMap<char, Decipherment>,
}

impl AlphabetBuilder {
    /// Records that each letter of `encrypted` may decrypt to the letter of `plain` beside it.
    pub fn propose(&mut self, encrypted: &str, plain: &str) {
        for (cipher, plain) in encrypted.chars().zip(plain.chars()) {
            let cipher = cipher.to_ascii_uppercase();
            let plain = plain.to_uppercase().next().unwrap_or(plain);

            let entry = self
                .letters
                .entry(cipher)
                .or_insert_with(|| Decipherment::Candidates(Vec::new()));

            match entry {
                Decipherment::Candidates(letters) => {
                    if !letters.contains(&plain) {
                        letters.push(plain);
                    }
                }
                // A real proposal replaces the sentinel.
                _ => *entry = Decipherment::Candidates(vec![plain]),
            }
        }
    }

    /// Marks the letters of a word nobody could decrypt, unless they are already known.
    pub fn mark_unknown(&mut self, encrypted: &str) {
        for cipher in encrypted.chars() {
            self.letters
                .entry(cipher.to_ascii_uppercase())
                .or_insert(Decipherment::Unknown);
        }
    }

    /// Fills in every letter of the alphabet the message never used.
    pub fn finish(mut self) -> AlphabetMap {
        for cipher in 'A'..='Z' {
            self.letters.entry(cipher).or_insert(Decipherment::Absent);
        }
        AlphabetMap {
            letters: self.letters,
        }
    }
}
