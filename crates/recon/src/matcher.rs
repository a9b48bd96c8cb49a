use rayon::prelude::*;

use crate::model::MatchCandidate;

/// Similarity between two normalized keys, 0 (unrelated) to 100 (identical).
pub trait Scorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Word-order-insensitive edit-distance ratio.
///
/// Each side is lower-cased, stripped of non-alphanumeric characters inside
/// every token, tokenized on whitespace, sorted and rejoined. The score is
/// `round(100 * (1 - levenshtein / max_len))` over the sorted strings, with
/// two empty strings scoring 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl TokenSortRatio {
    fn sorted_tokens(s: &str) -> String {
        let mut tokens: Vec<String> = s
            .split_whitespace()
            .map(|t| {
                t.chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty())
            .collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
}

impl Scorer for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a = Self::sorted_tokens(a);
        let b = Self::sorted_tokens(b);
        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            return 100;
        }
        let distance = strsim::levenshtein(&a, &b);
        let ratio = 1.0 - distance as f64 / max_len as f64;
        (100.0 * ratio).round().clamp(0.0, 100.0) as u8
    }
}

/// Rank `pool` against `query`, best first, keeping at most `k` candidates.
/// Equal scores keep their pool order.
pub fn top_k<S, P>(query: &str, pool: &[P], k: usize, scorer: &S) -> Vec<MatchCandidate>
where
    S: Scorer + ?Sized,
    P: AsRef<str>,
{
    if k == 0 {
        return Vec::new();
    }
    let mut scored: Vec<(usize, u8)> = pool
        .iter()
        .enumerate()
        .map(|(i, candidate)| (i, scorer.score(query, candidate.as_ref())))
        .collect();
    // Stable sort: ties stay in pool order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(k);
    scored
        .into_iter()
        .map(|(index, score)| MatchCandidate {
            index,
            key: pool[index].as_ref().to_string(),
            score,
        })
        .collect()
}

/// [`top_k`] for every query, scanned in parallel. Results line up with
/// `queries`; a `None` query (unmatchable record) yields no candidates.
pub fn match_all<S, Q, P>(
    queries: &[Option<Q>],
    pool: &[P],
    k: usize,
    scorer: &S,
) -> Vec<Vec<MatchCandidate>>
where
    S: Scorer + ?Sized,
    Q: AsRef<str> + Sync,
    P: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| match query {
            Some(q) => top_k(q.as_ref(), pool, k, scorer),
            None => Vec::new(),
        })
        .collect()
}
