use crate::config::{MergeConfig, MergeParams};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::matcher::{Scorer, TokenSortRatio};
use crate::model::{dedup_records, GoldenResult, GoldenTable, KeySpec, MergeMeta};
use crate::reconcile::{reconcile, MatchContext};
use crate::source::SourceTable;
use crate::stopwords::StopWordSet;

/// Run a merge per config over sources already loaded in config order.
pub fn run(
    config: &MergeConfig,
    sources: &[SourceTable],
    stop_words: &StopWordSet,
) -> Result<GoldenResult, ReconError> {
    config.validate()?;
    let key = config.key_spec()?;
    let mut result = merge(sources, &key, config.params(), stop_words)?;
    result.meta.name = Some(config.name.clone());
    Ok(result)
}

/// Fold `sources` left to right into one golden table using the default
/// token-sort scorer.
pub fn merge(
    sources: &[SourceTable],
    key: &KeySpec,
    params: MergeParams,
    stop_words: &StopWordSet,
) -> Result<GoldenResult, ReconError> {
    merge_with_scorer(sources, key, params, stop_words, &TokenSortRatio)
}

/// [`merge`] with a caller-supplied scorer.
///
/// All validation (parameters, key spec, every source's schema) happens
/// before the first comparison; on error nothing is returned.
pub fn merge_with_scorer<S: Scorer + ?Sized>(
    sources: &[SourceTable],
    key: &KeySpec,
    params: MergeParams,
    stop_words: &StopWordSet,
    scorer: &S,
) -> Result<GoldenResult, ReconError> {
    if key.is_empty() {
        return Err(ReconError::EmptyKeySpec);
    }
    params.validate()?;

    let (first, rest) = sources.split_first().ok_or(ReconError::EmptySources)?;

    let mut projections = Vec::with_capacity(sources.len());
    for source in sources {
        projections.push(source.project(key)?);
    }

    let input_records: usize = projections.iter().map(|p| p.records.len()).sum();
    let warnings: Vec<_> = projections
        .iter()
        .flat_map(|p| p.warnings.iter().cloned())
        .collect();

    let ctx = MatchContext {
        key,
        params,
        stop_words,
        scorer,
    };

    let mut golden = GoldenTable::from_records(key.clone(), dedup_records(&projections[0].records));
    log::info!("{}: seeded golden table with {} record(s)", first.name, golden.len());

    let mut rounds = Vec::with_capacity(rest.len());
    for (source, projection) in rest.iter().zip(&projections[1..]) {
        let round = reconcile(&source.name, golden.records(), &projection.records, &ctx);
        golden = round.golden;
        rounds.push(round.report);
    }

    let summary = compute_summary(sources.len(), input_records, &golden, &rounds, &warnings);

    Ok(GoldenResult {
        meta: MergeMeta::new(key, &params),
        summary,
        golden,
        rounds,
        warnings,
    })
}
