use std::{borrow::Borrow, collections::HashSet};

use bitcode::{Decode, Encode};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use util::error::{CrossfillError, CrossfillResult};

static WORD_PATTERN: Lazy<Regex> =
  Lazy::new(|| Regex::new("^[a-z]+$").expect("word pattern is a valid regex"));

/// The candidate word set every slot draws from. Words are canonicalized to
/// ASCII lowercase so letter comparisons downstream are byte comparisons.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct WordBank {
  words: HashSet<String>,
}

impl WordBank {
  pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
    Self {
      words: words
        .into_iter()
        .map(|word| word.to_ascii_lowercase())
        .collect(),
    }
  }

  /// Parses a newline-separated word list. Blank lines are skipped; any entry
  /// with a non-alphabetic character is rejected.
  pub fn parse_word_list<S>(lines: impl IntoIterator<Item = S>) -> CrossfillResult<Self>
  where
    S: Borrow<str>,
  {
    Ok(Self {
      words: lines.into_iter().try_fold(
        HashSet::new(),
        |mut words, line| -> CrossfillResult<_> {
          let line = line.borrow().trim();
          if line.is_empty() {
            return Ok(words);
          }

          let word = line.to_ascii_lowercase();
          if !WORD_PATTERN.is_match(&word) {
            return Err(
              CrossfillError::Parse(format!("Invalid word list entry \"{line}\"")).into(),
            );
          }

          words.insert(word);
          Ok(words)
        },
      )?,
    })
  }

  pub fn has(&self, word: &str) -> bool {
    self.words.contains(word)
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn all_words(&self) -> impl Iterator<Item = &str> {
    self.words.iter().map(String::as_str)
  }

  /// Lexicographically sorted snapshot, for callers that need a pinned order.
  pub fn sorted_words(&self) -> Vec<&str> {
    self.all_words().sorted().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::WordBank;

  #[test]
  fn test_parse_canonicalizes_and_dedupes() {
    let bank = WordBank::parse_word_list(["CAT", "  dog ", "", "Cat"]).unwrap();
    assert_eq!(bank.len(), 2);
    assert!(bank.has("cat"));
    assert!(bank.has("dog"));
    assert!(!bank.has("CAT"));
  }

  #[test]
  fn test_parse_rejects_non_alphabetic() {
    assert!(WordBank::parse_word_list(["ab1"]).is_err());
    assert!(WordBank::parse_word_list(["two words"]).is_err());
    assert!(WordBank::parse_word_list(["naïve"]).is_err());
  }

  #[test]
  fn test_empty_list() {
    let bank = WordBank::parse_word_list(Vec::<String>::new()).unwrap();
    assert!(bank.is_empty());
  }

  #[test]
  fn test_sorted_words() {
    let bank = WordBank::from_words(["dog", "cat", "cot"].map(str::to_owned));
    assert_eq!(bank.sorted_words(), vec!["cat", "cot", "dog"]);
  }
}
