//! Ratio calculator: size of one bucket over a caller-supplied population.
//!
//! The denominator is passed in rather than taken from the groups, because the
//! population of interest (e.g. everyone sharing the respondent's MBTI) is not
//! always the set the buckets were built from.
//!
//! Missing bucket or empty population → exactly 0. No NaN, no error.

use qd_core::{Answer, OptionId, Share};
use serde::Serialize;

use crate::grouping::{GroupKey, Groups};

/// Exact share of bucket `target` within a population of `total_count`.
pub fn share<T>(groups: &Groups<'_, T>, total_count: usize, target: &GroupKey) -> Share {
    if total_count == 0 {
        return Share::ZERO;
    }
    let num = groups.count(target);
    Share::new(num as u64, total_count as u64)
}

/// `share` as a number in `[0, 1]`, with `target` given as the serialized key.
pub fn ratio<T>(groups: &Groups<'_, T>, total_count: usize, target: &str) -> f64 {
    share(groups, total_count, &GroupKey::value(target)).value()
}

/// One row of an option distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionShare {
    pub option_id: OptionId,
    pub count: u64,
    pub share: Share,
}

/// Distribution of answers (already grouped by option id) over `options`.
///
/// Rows follow `options` order and include options nobody picked. Options seen
/// in the answers but missing from `options` are appended in first-seen order.
pub fn option_distribution(
    by_option: &Groups<'_, Answer>,
    options: &[OptionId],
    total_count: usize,
) -> Vec<OptionShare> {
    let mut out: Vec<OptionShare> = options
        .iter()
        .map(|o| {
            let key = GroupKey::value(o.as_str());
            OptionShare {
                option_id: o.clone(),
                count: by_option.count(&key) as u64,
                share: share(by_option, total_count, &key),
            }
        })
        .collect();

    for (key, bucket) in by_option.known() {
        if options.iter().any(|o| o.as_str() == key) {
            continue;
        }
        if let Some(first) = bucket.first() {
            out.push(OptionShare {
                option_id: first.option_id.clone(),
                count: bucket.len() as u64,
                share: share(by_option, total_count, &GroupKey::value(key)),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by;

    #[test]
    fn three_of_five() {
        let xs = ["A", "B", "A", "A", "B"];
        let g = group_by(&xs, |s| Some(s.to_string()));
        assert!((ratio(&g, 5, "A") - 0.6).abs() < 1e-12);
        assert_eq!(share(&g, 5, &GroupKey::value("A")), Share::new(3, 5));
    }

    #[test]
    fn zero_total_and_absent_key_are_zero() {
        let xs = ["A"];
        let g = group_by(&xs, |s| Some(s.to_string()));
        assert_eq!(ratio(&g, 0, "A"), 0.0);
        assert_eq!(ratio(&g, 1, "Z"), 0.0);

        let empty: [&str; 0] = [];
        let g = group_by(&empty, |s| Some(s.to_string()));
        assert_eq!(ratio(&g, 0, "A"), 0.0);
    }

    #[test]
    fn denominator_can_exceed_bucket_source() {
        let xs = ["A", "A"];
        let g = group_by(&xs, |s| Some(s.to_string()));
        assert_eq!(ratio(&g, 8, "A"), 0.25);
    }
}
