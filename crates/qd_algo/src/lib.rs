// crates/qd_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure aggregation primitives over in-memory answers: grouping, key
//! extraction, exact shares and cohort ranking. No I/O, no clocks, no RNG.

pub mod grouping;
pub mod keys;
pub mod rank;
pub mod ratio;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use grouping::{group_by, GroupKey, Groups};
pub use keys::{age_in_years, answer_key, AgeBands, FieldPath};
pub use rank::{dominant_option, rank_groups, RankEntry};
pub use ratio::{option_distribution, ratio, share, OptionShare};

use qd_core::Answer;

/// Group answers by a parsed dotted path.
pub fn group_answers_by<'a>(answers: &'a [Answer], path: FieldPath, bands: AgeBands) -> Groups<'a, Answer> {
    group_by(answers, answer_key(path, bands))
}
