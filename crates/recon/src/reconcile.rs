//! One pairwise reconciliation round: fold a right-hand record set into the
//! current golden table.
//!
//! Two independent similarity passes drive the round. Left→right builds a
//! match string per left record and decides which right records get joined
//! onto existing entities. Right→left decides which right records are novel.
//! The passes are not merged into one symmetric decision: a
//! right record can be non-novel (it resembles some left record) and still
//! not be joined (no left record picked it as its match string), in which
//! case it is counted as unabsorbed and does not reach the golden table.

use std::collections::HashMap;

use crate::config::MergeParams;
use crate::matcher::{match_all, Scorer};
use crate::model::{dedup_records, GoldenTable, KeySpec, Link, Record, RoundReport};
use crate::normalize::normalize_key;
use crate::stopwords::StopWordSet;

/// Everything a round needs besides the two record sets.
pub struct MatchContext<'a, S: Scorer + ?Sized> {
    pub key: &'a KeySpec,
    pub params: MergeParams,
    pub stop_words: &'a StopWordSet,
    pub scorer: &'a S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightClass {
    /// Some left record scored at or above threshold.
    Linked,
    /// No adequate counterpart on the left, or the key is incomplete.
    Novel,
}

/// Output of [`reconcile`]: the new golden table plus a report of the round.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub golden: GoldenTable,
    pub report: RoundReport,
}

/// Left record state after the left→right pass.
struct LeftMatch {
    /// Comma-joined normalized keys of every candidate at or above threshold.
    match_string: Option<String>,
    /// False when no candidate reached threshold; the empty match string
    /// still takes part in the join but is not reported as a link.
    has_candidate: bool,
    best_score: u8,
}

/// Fold `right` into `left` and return the updated golden table.
///
/// Both sides are deduplicated by raw key tuple first. The result contains
/// every deduplicated left record followed by every novel right record.
pub fn reconcile<S: Scorer + ?Sized>(
    source: &str,
    left: &[Record],
    right: &[Record],
    ctx: &MatchContext<'_, S>,
) -> Reconciliation {
    let threshold = ctx.params.threshold;
    let limit = ctx.params.limit;

    let left = dedup_records(left);
    let right = dedup_records(right);

    let left_keys: Vec<Option<String>> =
        left.iter().map(|r| normalize_key(r, ctx.stop_words)).collect();
    let right_keys: Vec<Option<String>> =
        right.iter().map(|r| normalize_key(r, ctx.stop_words)).collect();

    // Records with a missing key value are neither queries nor candidates.
    let left_pool: Vec<&str> = left_keys.iter().flatten().map(String::as_str).collect();
    let right_pool: Vec<&str> = right_keys.iter().flatten().map(String::as_str).collect();

    // Left→right: match strings.
    let left_matches: Vec<LeftMatch> = match_all(&left_keys, &right_pool, limit, ctx.scorer)
        .into_iter()
        .zip(&left_keys)
        .map(|(candidates, key)| {
            let accepted: Vec<_> = candidates.iter().filter(|c| c.score >= threshold).collect();
            LeftMatch {
                match_string: key.as_ref().map(|_| {
                    accepted.iter().map(|c| c.key.as_str()).collect::<Vec<_>>().join(", ")
                }),
                has_candidate: !accepted.is_empty(),
                best_score: accepted.iter().map(|c| c.score).max().unwrap_or(0),
            }
        })
        .collect();

    // Right→left: novelty.
    let classes: Vec<RightClass> = match_all(&right_keys, &left_pool, limit, ctx.scorer)
        .into_iter()
        .zip(&right_keys)
        .map(|(candidates, key)| {
            if key.is_some() && candidates.iter().any(|c| c.score >= threshold) {
                RightClass::Linked
            } else {
                RightClass::Novel
            }
        })
        .collect();

    // Equality join of left match strings against linked right keys.
    let mut linked_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (ri, (class, key)) in classes.iter().zip(&right_keys).enumerate() {
        if let (RightClass::Linked, Some(key)) = (class, key) {
            linked_by_key.entry(key.as_str()).or_default().push(ri);
        }
    }

    let mut links = Vec::new();
    let mut absorbed = vec![false; right.len()];
    for (li, m) in left_matches.iter().enumerate() {
        let Some(match_string) = m.match_string.as_deref() else {
            continue;
        };
        if let Some(rights) = linked_by_key.get(match_string) {
            for &ri in rights {
                absorbed[ri] = true;
                if !m.has_candidate {
                    continue;
                }
                links.push(Link {
                    left: left[li].clone(),
                    right: right[ri].clone(),
                    score: m.best_score,
                });
            }
        }
    }

    // Fold: left records, then the left side of every joined row, then novel
    // right records. The golden table drops repeated key tuples.
    let mut golden = GoldenTable::from_records(ctx.key.clone(), left.iter().cloned());
    for link in &links {
        golden.insert(link.left.clone());
    }

    let mut report = RoundReport {
        source: source.to_string(),
        left_records: left.len(),
        right_records: right.len(),
        links,
        ..RoundReport::default()
    };

    for (ri, record) in right.into_iter().enumerate() {
        if !record.is_complete() {
            report.missing_key += 1;
        }
        match classes[ri] {
            RightClass::Novel => {
                log::debug!("{source}: novel '{record}'");
                report.novel += 1;
                golden.insert(record);
            }
            RightClass::Linked => {
                report.linked += 1;
                if !absorbed[ri] {
                    log::warn!(
                        "{source}: '{record}' resembles an existing entity but no match string \
                         selected it; it is not carried into the golden table"
                    );
                    report.unabsorbed += 1;
                } else {
                    log::debug!("{source}: linked '{record}'");
                }
            }
        }
    }

    report.golden_records = golden.len();
    log::info!(
        "{source}: {} left, {} right, {} linked, {} novel, {} unabsorbed -> {} golden",
        report.left_records,
        report.right_records,
        report.linked,
        report.novel,
        report.unabsorbed,
        report.golden_records,
    );

    Reconciliation { golden, report }
}
