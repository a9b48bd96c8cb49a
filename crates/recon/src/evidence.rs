use crate::model::{DataQualityWarning, GoldenTable, MergeSummary, RoundReport};

/// Roll round reports up into run-level counts.
pub fn compute_summary(
    sources: usize,
    input_records: usize,
    golden: &GoldenTable,
    rounds: &[RoundReport],
    warnings: &[DataQualityWarning],
) -> MergeSummary {
    let mut linked = 0;
    let mut novel = 0;
    let mut unabsorbed = 0;

    for round in rounds {
        linked += round.linked;
        novel += round.novel;
        unabsorbed += round.unabsorbed;
    }

    MergeSummary {
        sources,
        input_records,
        golden_records: golden.len(),
        linked,
        novel,
        unabsorbed,
        warnings: warnings.len(),
    }
}
