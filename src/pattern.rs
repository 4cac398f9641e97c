use fxhash::FxHashMap;
use std::fmt;

/// The structural fingerprint of a string.
///
/// Two strings share a pattern exactly when they have the same length and repeat characters in
/// the same positions: "HELLO" and "XIPPE" both become `5-ABCCD`. The actual characters are
/// forgotten, so case normalization is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pattern(String);

impl Pattern {
    pub fn of(s: impl AsRef<str>) -> Pattern {
        let s = s.as_ref();
        let mut numerals: FxHashMap<char, String> = FxHashMap::default();
        let mut len = 0;
        let mut shape = String::with_capacity(s.len());

        for c in s.chars() {
            len += 1;
            let next = numerals.len() + 1;
            shape.push_str(numerals.entry(c).or_insert_with(|| numeral(next)));
        }

        Pattern(format!("{}-{}", len, shape))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shorthand for [`Pattern::of`].
pub fn pattern(s: impl AsRef<str>) -> Pattern {
    Pattern::of(s)
}

/// Bijective base-26 numeral for a 1-based ordinal.
///
/// Only the final digit is uppercase, which keeps a run of numerals decodable once a string has
/// more than 26 distinct characters (27 is `aA`, never confused with `A` followed by `A`).
fn numeral(mut n: usize) -> String {
    let mut digits = Vec::new();
    while n > 0 {
        n -= 1;
        digits.push(b'A' + (n % 26) as u8);
        n /= 26;
    }

    let last = digits.len() - 1;
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, &u)| if idx == last { u as char } else { u.to_ascii_lowercase() as char })
        .collect()
}
