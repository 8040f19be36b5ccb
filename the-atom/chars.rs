//! Character classes used to segment text-mode runs into words.

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Word,
  Punctuation,
  Unknown,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_whitespace(c) || c.is_whitespace() => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

/// Word class of a text-mode atom, decided by the first character of its
/// value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WordClass {
  Word,
  Whitespace,
  Punctuation,
}

pub fn word_class(value: &str) -> WordClass {
  match value.chars().next().map(categorize_char) {
    Some(CharCategory::Word) => WordClass::Word,
    Some(CharCategory::Whitespace) => WordClass::Whitespace,
    // Empty values and symbols we know nothing about group with
    // punctuation, which only stops at whitespace.
    _ => WordClass::Punctuation,
  }
}

#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
      '\u{0009}' | // Character Tabulation
      '\u{000A}' | // Line Feed
      '\u{0020}' | // Space
      '\u{00A0}' | // No-break Space
      '\u{180E}' | // Mongolian Vowel Separator
      '\u{202F}' | // Narrow No-break Space
      '\u{205F}' | // Medium Mathematical Space
      '\u{3000}' | // Ideographic Space
      '\u{FEFF}'   // Zero Width No-break Space
      => true,

      // En Quad through Zero Width Space.
      ch if ('\u{2000}' ..= '\u{200B}').contains(&ch) => true,

      _ => false,
    }
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
  )
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn categorize() {
    const WORD_TEST_CASE: &str = "_hello_world_あいうえおー1234567890１２３４５６７８９０";
    const PUNCTUATION_TEST_CASE: &str =
      "!\"#$%&\'()*+,-./:;<=>?@[\\]^`{|}~！＂＃＄％＆＇（）＊＋，．／：；＜＝＞？＠［＼］＾｀｛｜｝～";
    const WHITESPACE_TEST_CASE: &str = "  　   ";

    for ch in WHITESPACE_TEST_CASE.chars() {
      assert_eq!(
        CharCategory::Whitespace,
        categorize_char(ch),
        "Testing '{}', but got `{:?}` instead of `Category::Whitespace`",
        ch,
        categorize_char(ch)
      );
    }

    for ch in WORD_TEST_CASE.chars() {
      assert_eq!(
        CharCategory::Word,
        categorize_char(ch),
        "Testing '{}', but got `{:?}` instead of `Category::Word`",
        ch,
        categorize_char(ch)
      );
    }

    for ch in PUNCTUATION_TEST_CASE.chars() {
      assert_eq!(
        CharCategory::Punctuation,
        categorize_char(ch),
        "Testing '{}', but got `{:?}` instead of `Category::Punctuation`",
        ch,
        categorize_char(ch)
      );
    }
  }

  #[test]
  fn word_class_uses_first_character() {
    assert_eq!(word_class("h"), WordClass::Word);
    assert_eq!(word_class("7"), WordClass::Word);
    assert_eq!(word_class(" "), WordClass::Whitespace);
    assert_eq!(word_class("\u{00A0}"), WordClass::Whitespace);
    assert_eq!(word_class(","), WordClass::Punctuation);
    assert_eq!(word_class(""), WordClass::Punctuation);
  }
}
