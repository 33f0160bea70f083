//! Text normalization for compare and sort keys.
//!
//! Catalog titles rarely match free-text input exactly: casing, punctuation,
//! diacritics, leading articles and edition suffixes all differ between what
//! a user types and what a catalog stores. [`normalize`] produces the key used
//! for scoring; [`base_title`] trims the qualifiers that hang off an album
//! title before it is normalized.
//!
//! Neither function is meant for display.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Articles removed from the front of a normalized string.
const LEADING_ARTICLES: &[&str] = &["the", "a", "an"];

/// Clause markers that introduce a featured-artist credit (ASCII, lowercase).
const FEATURING_MARKERS: &[&str] = &[" feat. ", " feat ", " ft. ", " featuring "];

/// Normalize a string into a compare key.
///
/// Folds diacritics, lower-cases, deletes every character that is not a word
/// character or whitespace, collapses whitespace, and drops leading articles.
/// An article is only dropped when another token follows it, so `"The"` on its
/// own survives. Total and idempotent.
///
/// ```
/// use crate_digger_core::text::normalize;
///
/// assert_eq!(normalize("The Beatles"), "beatles");
/// assert_eq!(normalize("  Sigur Rós  "), "sigur ros");
/// assert_eq!(normalize("AC/DC - Back in Black!"), "acdc back in black");
/// ```
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();

    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    let leading = tokens
        .iter()
        .take(tokens.len().saturating_sub(1))
        .take_while(|t| LEADING_ARTICLES.contains(t))
        .count();
    tokens.drain(..leading);
    tokens.join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Strip trailing qualifiers from an album or track title.
///
/// Removes trailing `(...)` and `[...]` groups (edition markers, remaster
/// notes, promo tags) and any `feat.` / `ft.` / `featuring` clause. A group
/// that makes up the whole title is kept, so `"(What's the Story) Morning
/// Glory?"` is returned unchanged.
///
/// ```
/// use crate_digger_core::text::base_title;
///
/// assert_eq!(base_title("OK Computer (Collector's Edition)"), "OK Computer");
/// assert_eq!(base_title("Blonde [Explicit] (2016)"), "Blonde");
/// assert_eq!(base_title("Stay feat. Justin Bieber"), "Stay");
/// ```
pub fn base_title(title: &str) -> String {
    let mut rest = title.trim();

    while let Some(start) = trailing_group_start(rest) {
        let head = rest[..start].trim_end();
        if head.is_empty() {
            break;
        }
        rest = head;
    }

    strip_featuring(rest)
        .trim_end_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

/// Byte offset of the bracket that opens the group closing at the end of `s`.
fn trailing_group_start(s: &str) -> Option<usize> {
    let close = s.chars().last()?;
    let open = match close {
        ')' => '(',
        ']' => '[',
        _ => return None,
    };

    let mut depth = 0u32;
    for (i, c) in s.char_indices().rev() {
        if c == close {
            depth += 1;
        } else if c == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn strip_featuring(s: &str) -> &str {
    // ASCII lowering keeps byte offsets aligned with `s`.
    let lower = s.to_ascii_lowercase();
    let cut = FEATURING_MARKERS
        .iter()
        .filter_map(|marker| lower.find(marker))
        .min();
    match cut {
        Some(pos) => &s[..pos],
        None => s,
    }
}

#[cfg(test)]
#[path = "tests/text_tests.rs"]
mod tests;
