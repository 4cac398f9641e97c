use fxhash::FxHashSet;
use std::io::{self, BufRead};

/// The distinct words of an encrypted message, in order of first appearance.
///
/// Words are guaranteed to be non-empty uppercase ASCII letters. Anything else in the message
/// (digits, punctuation, symbols) either disappears or takes its whole token with it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncryptedWords(Vec<String>);

impl EncryptedWords {
    pub fn from_message(message: impl AsRef<str>) -> EncryptedWords {
        let ascii = deunicode::deunicode(message.as_ref()).replace('-', " ");
        let stripped: String = ascii.chars().filter(|c| !c.is_ascii_punctuation()).collect();

        let mut seen = FxHashSet::default();
        let words = stripped
            .to_ascii_uppercase()
            .split_whitespace()
            .filter(|word| word.bytes().all(|u| u.is_ascii_alphabetic()))
            .filter(|&word| seen.insert(word.to_owned()))
            .map(String::from)
            .collect();

        EncryptedWords(words)
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many different letters the message uses.
    pub fn distinct_letters(&self) -> usize {
        distinct_letters(&self.0)
    }
}

impl AsRef<[String]> for EncryptedWords {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

pub(crate) fn distinct_letters<S: AsRef<str>>(words: &[S]) -> usize {
    words
        .iter()
        .flat_map(|word| word.as_ref().chars())
        .filter(|c| c.is_alphabetic())
        .collect::<FxHashSet<_>>()
        .len()
}

/// Joins the lines of an encrypted message file.
///
/// Blank lines ahead of the first line of text are dropped, as is every line starting with `#`.
/// Everything else is kept verbatim, line endings included.
pub fn assemble_message<R: BufRead>(mut reader: R) -> io::Result<String> {
    let mut message = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        if message.is_empty() && line.trim_start().is_empty() {
            continue;
        }

        if !line.starts_with('#') {
            message.push_str(&line);
        }
    }

    Ok(message)
}
