use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;

/// Lower-case tokens dropped while building normalized keys.
///
/// Loaded once before any round runs and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWordSet {
    words: HashSet<String>,
}

#[derive(Deserialize)]
struct StopWordFile {
    words: Vec<String>,
}

impl StopWordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parse the `{"words": [...]}` resource.
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let file: StopWordFile =
            serde_json::from_str(input).map_err(|e| ReconError::StopWords(e.to_string()))?;
        Ok(Self::from_words(file.words))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
