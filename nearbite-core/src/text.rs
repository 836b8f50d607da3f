//! Accent-insensitive keyword folding.
//!
//! Text is decomposed (NFD), combining marks in U+0300..=U+036F are dropped,
//! `đ`/`Đ` become `d`, and the result is lower-cased. "Phở Bò" and "pho bo"
//! therefore fold to the same string.

use unicode_normalization::UnicodeNormalization;

const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Fold `text` for accent- and case-insensitive comparison.
///
/// # Examples
///
/// ```
/// use nearbite_core::text::fold;
///
/// assert_eq!(fold("Cà Phê Đá"), "ca phe da");
/// ```
#[must_use]
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|ch| !COMBINING_MARKS.contains(ch))
        .map(|ch| match ch {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// A folded, non-empty keyword ready for substring matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    folded: String,
}

impl Keyword {
    /// Fold `raw`, returning `None` when nothing but whitespace remains.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let folded = fold(raw.trim());
        if folded.is_empty() {
            None
        } else {
            Some(Self { folded })
        }
    }

    /// The folded form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Whether the folded form of `text` contains this keyword.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        fold(text).contains(&self.folded)
    }

    /// Match against a primary field, then any secondary fields.
    pub fn matches_any<'a, I>(&self, primary: &str, secondary: I) -> bool
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        self.matches(primary) || secondary.into_iter().flatten().any(|text| self.matches(text))
    }
}
