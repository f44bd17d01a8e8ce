//! Diacritic-insensitive normalization for comparing Arabic answers.

use unicode_normalization::UnicodeNormalization;

const TATWEEL: char = '\u{0640}';

/// Strips harakat, tanween, shadda and hamza carriers, tatweel and
/// punctuation, and collapses whitespace.
///
/// NFD splits letters such as `أ` into a bare alef plus a combining hamza, so
/// alef variants compare equal once combining marks are dropped.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .filter(|c| *c != TATWEEL)
        .map(|c| if is_punctuation(c) { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized words of `text`, in order.
pub fn words(text: &str) -> Vec<String> {
    normalize(text).split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect()
}

fn is_punctuation(c: char) -> bool {
    // Arabic comma, semicolon and question mark are not ASCII punctuation
    c.is_ascii_punctuation() || matches!(c, '\u{060C}' | '\u{061B}' | '\u{061F}' | '\u{06D4}')
}
