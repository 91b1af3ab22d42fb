/// Canonicalization layer for tag strings.
///
/// Model output and user edits both pass through here before anything is
/// displayed or written, so the rest of the crate only ever handles one
/// format: ASCII tags joined by `"; "`.
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// The separator placed between tags in a canonical string.
pub const TAG_SEPARATOR: &str = "; ";

pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a raw tag string into canonical form.
    ///
    /// # Normalization rules
    ///
    /// - Commas and semicolons both act as separators
    /// - Each piece is trimmed and ASCII-folded (diacritics stripped,
    ///   non-ASCII dropped)
    /// - Empty pieces are discarded
    /// - Duplicates are removed case-insensitively, keeping the first
    ///   occurrence and its casing
    /// - Surviving pieces are joined with `"; "`
    ///
    /// Empty input (or input containing only separators and whitespace)
    /// yields an empty string; callers treat that as "no tags", not as an
    /// error. The function is idempotent: feeding its own output back in
    /// returns the same string.
    ///
    /// # Examples
    ///
    /// ```
    /// use pictag::normalizer::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize("a,b;c"), "a; b; c");
    /// assert_eq!(TagNormalizer::normalize("Cat, cat, CAT"), "Cat");
    /// assert_eq!(TagNormalizer::normalize("café, naïve"), "cafe; naive");
    /// assert_eq!(TagNormalizer::normalize("   ;  ,  "), "");
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        let mut seen = HashSet::new();
        raw.replace(',', ";")
            .split(';')
            .map(|piece| Self::ascii_fold(piece.trim()))
            .filter(|tag| !tag.is_empty())
            .filter(|tag| seen.insert(tag.to_lowercase()))
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR)
    }

    /// Reduces a single piece to printable ASCII.
    ///
    /// Applies canonical decomposition, drops combining marks, then drops
    /// anything left outside `0x20..=0x7E`.
    fn ascii_fold(piece: &str) -> String {
        piece
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .filter(|c| (' '..='\u{7e}').contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    }
}
