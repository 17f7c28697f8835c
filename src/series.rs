//! Reshape per-commit counts into per-language time series.

use crate::{CountRecord, DataPoint, LanguageSeries};

/// One series per language, each with exactly one point per record in record order.
///
/// A language absent from a record contributes a point with `code == 0`, so every series
/// shares the same x positions.
pub fn to_series(records: &[CountRecord], languages: &[String]) -> LanguageSeries {
    languages
        .iter()
        .map(|language| {
            let points = records
                .iter()
                .map(|record| DataPoint {
                    commit: record.commit.clone(),
                    code: record.counts.get(language).map_or(0, |c| c.code),
                })
                .collect();
            (language.clone(), points)
        })
        .collect()
}


// ─── Property-based tests (proptest) ─────────────────────────────────
