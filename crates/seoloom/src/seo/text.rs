//! Word counting, keyword density and small string helpers.

use regex::{Regex, RegexBuilder};

/// Counts whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Builds a case-insensitive matcher for a keyword phrase.
///
/// Inner whitespace matches any run of whitespace. Word boundaries are only
/// anchored on edges that are word characters, so phrases like `c++` still
/// match.
fn keyword_regex(keyword: &str) -> Option<Regex> {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let body = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join(r"\s+");

    let starts_with_word = words[0]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    let ends_with_word = words[words.len() - 1]
        .chars()
        .last()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');

    let pattern = format!(
        "{}{}{}",
        if starts_with_word { r"\b" } else { "" },
        body,
        if ends_with_word { r"\b" } else { "" }
    );

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Counts non-overlapping, whole-word, case-insensitive occurrences of `keyword`.
pub fn keyword_occurrences(text: &str, keyword: &str) -> usize {
    match keyword_regex(keyword) {
        Some(re) => re.find_iter(text).count(),
        None => 0,
    }
}

/// Keyword occurrences per 100 words, rounded to two decimals.
///
/// A multi-word phrase counts once per occurrence.
pub fn keyword_density(text: &str, keyword: &str) -> f64 {
    let words = count_words(text);
    if words == 0 {
        return 0.0;
    }
    let hits = keyword_occurrences(text, keyword);
    round2(hits as f64 / words as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncates to at most `max_chars` characters, cutting at the last word
/// boundary when one exists past the halfway point.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let next_is_space = text
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);
    if next_is_space {
        return cut.trim_end().to_string();
    }

    match cut.rfind(char::is_whitespace) {
        Some(idx) if idx >= max_chars / 2 => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase, ASCII-alphanumeric slug joined with hyphens.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Capitalizes the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
