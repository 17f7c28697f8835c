//! Deterministic, evenly spaced commit sampling.

use crate::error::{CcountError, Result};

/// Pick at most `limit` items, always keeping the first and the last.
///
/// - `limit == 0`: everything, unchanged.
/// - two items or fewer: returned verbatim.
/// - `limit == 1` with more than two items: [`CcountError::InvalidSampleLimit`].
/// - `limit == 2`: the two endpoints.
/// - otherwise the interior is strided by `ceil(interior / (limit - 2))`, which keeps
///   the output within `limit` (exactly `limit` only when the stride divides evenly).
pub fn sample<T: Clone>(items: &[T], limit: usize) -> Result<Vec<T>> {
    if limit == 0 || items.len() <= 2 {
        return Ok(items.to_vec());
    }
    if limit == 1 {
        return Err(CcountError::InvalidSampleLimit(limit));
    }

    let first = &items[0];
    let last = &items[items.len() - 1];
    let interior = &items[1..items.len() - 1];

    let slots = limit - 2;
    let mut out = Vec::with_capacity(limit.min(items.len()));
    out.push(first.clone());
    if slots > 0 {
        let step = interior.len().div_ceil(slots).max(1);
        out.extend(interior.iter().step_by(step).cloned());
    }
    out.push(last.clone());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_zero_limit_is_identity() {
        let items = range(37);
        assert_eq!(sample(&items, 0).unwrap(), items);
    }

    #[test]
    fn test_short_input_is_verbatim() {
        assert_eq!(sample(&range(0), 5).unwrap(), Vec::<usize>::new());
        assert_eq!(sample(&range(1), 5).unwrap(), vec![0]);
        assert_eq!(sample(&range(2), 1).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_limit_one_is_rejected() {
        let err = sample(&range(10), 1).unwrap_err();
        assert!(matches!(err, CcountError::InvalidSampleLimit(1)));
    }

    #[test]
    fn test_limit_two_keeps_endpoints() {
        assert_eq!(sample(&range(10), 2).unwrap(), vec![0, 9]);
    }

    #[test]
    fn test_limit_larger_than_input_keeps_everything() {
        assert_eq!(sample(&range(6), 50).unwrap(), range(6));
    }

    #[test]
    fn test_even_stride() {
        // interior 1..=8 (8 items), 4 slots → step 2
        assert_eq!(sample(&range(10), 6).unwrap(), vec![0, 1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_uneven_stride_stays_within_limit() {
        // interior of 8 with 3 slots: step 3 picks 1, 4, 7
        assert_eq!(sample(&range(10), 5).unwrap(), vec![0, 1, 4, 7, 9]);
    }

    #[test]
    fn test_deterministic() {
        let items = range(123);
        assert_eq!(sample(&items, 17).unwrap(), sample(&items, 17).unwrap());
    }
}

// ─── Property-based tests (proptest) ─────────────────────────────────
