//! Missing-value repair for time series
//!
//! Gaps are represented as `None`. Forward fill copies the nearest preceding
//! valid value; backward fill copies the nearest following one.

/// Propagate the last valid value forward over gaps.
///
/// Leading gaps stay missing because nothing precedes them.
pub fn forward_fill(data: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    data.iter()
        .map(|value| {
            if value.is_some() {
                last = *value;
            }
            last
        })
        .collect()
}

/// Propagate the next valid value backward over gaps.
///
/// Trailing gaps stay missing because nothing follows them.
pub fn backward_fill(data: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut next = None;
    let mut result: Vec<Option<f64>> = data
        .iter()
        .rev()
        .map(|value| {
            if value.is_some() {
                next = *value;
            }
            next
        })
        .collect();
    result.reverse();
    result
}

/// Forward fill, then backward fill.
///
/// Interior gaps take the preceding value, leading gaps take the first valid
/// value. Every entry is `Some` as long as at least one input is.
pub fn fill_missing(data: &[Option<f64>]) -> Vec<Option<f64>> {
    backward_fill(&forward_fill(data))
}

/// Number of missing entries.
pub fn count_missing(data: &[Option<f64>]) -> usize {
    data.iter().filter(|value| value.is_none()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_fill_interior_gap() {
        let data = [Some(1.0), None, None, Some(4.0)];
        assert_eq!(
            forward_fill(&data),
            vec![Some(1.0), Some(1.0), Some(1.0), Some(4.0)]
        );
    }

    #[test]
    fn test_forward_fill_leaves_leading_gap() {
        let data = [None, Some(2.0), None];
        assert_eq!(forward_fill(&data), vec![None, Some(2.0), Some(2.0)]);
    }

    #[test]
    fn test_backward_fill_leading_gap() {
        let data = [None, None, Some(3.0), None];
        assert_eq!(
            backward_fill(&data),
            vec![Some(3.0), Some(3.0), Some(3.0), None]
        );
    }

    #[test]
    fn test_fill_missing_prefers_preceding_value() {
        let data = [Some(316.97), None, Some(318.0)];
        let filled = fill_missing(&data);
        assert_eq!(filled[1], Some(316.97));
        assert_eq!(count_missing(&filled), 0);
    }

    #[test]
    fn test_fill_missing_leading_and_trailing() {
        let data = [None, Some(5.0), None, Some(7.0), None];
        assert_eq!(
            fill_missing(&data),
            vec![Some(5.0), Some(5.0), Some(5.0), Some(7.0), Some(7.0)]
        );
    }

    #[test]
    fn test_fill_missing_all_invalid() {
        let data = [None, None];
        assert_eq!(count_missing(&fill_missing(&data)), 2);
    }

    #[test]
    fn test_fill_missing_empty() {
        assert!(fill_missing(&[]).is_empty());
    }
}
