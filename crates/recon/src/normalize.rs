use crate::model::Record;
use crate::stopwords::StopWordSet;

const STRIP_CHARS: [char; 3] = ['.', ',', '!'];

fn is_edge_noise(c: char) -> bool {
    STRIP_CHARS.contains(&c) || c.is_whitespace()
}

/// Build the comparison string for a list of key values.
///
/// Values are joined with spaces, edge punctuation (`.` `,` `!`) is stripped,
/// the result is lower-cased and split on whitespace, stop-word tokens are
/// dropped, and the survivors are rejoined with single spaces. Punctuation
/// left dangling at either end once stop words are gone is stripped too, so
/// the output is a fixed point of this function under an empty stop-word set.
pub fn normalize_values<S: AsRef<str>>(values: &[S], stop_words: &StopWordSet) -> String {
    let joined = values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");
    let lowered = joined.trim_matches(&STRIP_CHARS[..]).to_lowercase();
    let kept: Vec<&str> = lowered
        .split_whitespace()
        .filter(|token| !stop_words.contains(token))
        .collect();
    kept.join(" ").trim_matches(is_edge_noise).to_string()
}

/// Normalized key of a record, or `None` when any key value is missing.
pub fn normalize_key(record: &Record, stop_words: &StopWordSet) -> Option<String> {
    let values: Option<Vec<&str>> = record.values.iter().map(|v| v.as_deref()).collect();
    values.map(|v| normalize_values(&v, stop_words))
}
