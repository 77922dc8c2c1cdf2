use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Street abbreviation and its expansion
const STREET_ABBREVIATION: (&str, &str) = ("str.", "strasse");

/// Canonicalize text for comparison.
///
/// Lowercases, folds German umlauts and ß, expands `str.`, turns hyphens
/// into spaces, drops remaining diacritics and punctuation, and collapses
/// whitespace. Total and idempotent: empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lower: String = text.nfc().collect::<String>().to_lowercase();

    let mut folded = String::with_capacity(lower.len());
    for c in lower.chars() {
        match c {
            'ä' => folded.push_str("ae"),
            'ö' => folded.push_str("oe"),
            'ü' => folded.push_str("ue"),
            'ß' => folded.push_str("ss"),
            _ => folded.push(c),
        }
    }

    let (abbreviation, expansion) = STREET_ABBREVIATION;
    let expanded = folded.replace(abbreviation, expansion);

    let cleaned: String = expanded
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '-' { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
