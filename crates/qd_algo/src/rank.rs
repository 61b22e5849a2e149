//! Rank calculator: order cohorts by how strongly their dominant option
//! concentrates.
//!
//! For every known bucket of a dimension grouping:
//!   dominant option = option with the largest count inside the bucket
//!   concentration   = dominant count / bucket size
//! Rows are then sorted by concentration, highest first.
//!
//! Determinism:
//! - `Unknown` is never ranked.
//! - Equal concentrations keep the grouping's first-seen order (stable sort).
//! - Inside one bucket, equal option counts resolve to the option seen first.
//! - Concentrations compare exactly as fractions, never through floats.

use qd_core::{Answer, OptionId, Share};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::grouping::{group_by, Groups};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankEntry {
    /// Dimension value of the cohort (e.g. `"INFP"`).
    pub value: String,
    pub dominant_option: OptionId,
    pub dominant_count: u64,
    pub group_size: u64,
    /// `dominant_count / group_size`.
    pub share: Share,
}

impl RankEntry {
    pub fn ratio(&self) -> f64 {
        self.share.value()
    }
}

/// Wire form carries the float `ratio` next to the exact `share`.
impl Serialize for RankEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("RankEntry", 6)?;
        st.serialize_field("value", &self.value)?;
        st.serialize_field("dominant_option", &self.dominant_option)?;
        st.serialize_field("dominant_count", &self.dominant_count)?;
        st.serialize_field("group_size", &self.group_size)?;
        st.serialize_field("share", &self.share)?;
        st.serialize_field("ratio", &self.ratio())?;
        st.end()
    }
}

/// Dominant option of a bucket with its count; `None` for an empty bucket.
pub fn dominant_option(bucket: &[&Answer]) -> Option<(OptionId, u64)> {
    let by_option = group_by(bucket.iter().copied(), |a: &Answer| {
        Some(a.option_id.as_str().to_string())
    });

    let mut best: Option<(&Answer, usize)> = None;
    for (_, members) in by_option.iter() {
        let n = members.len();
        // strict `>`: the first-seen option keeps a tie
        if best.map_or(true, |(_, m)| n > m) {
            best = members.first().map(|a| (*a, n));
        }
    }
    best.map(|(a, n)| (a.option_id.clone(), n as u64))
}

/// Rank every known cohort of `groups`.
pub fn rank_groups(groups: &Groups<'_, Answer>) -> Vec<RankEntry> {
    let mut rows: Vec<RankEntry> = groups
        .known()
        .filter_map(|(value, bucket)| {
            let (dominant_option, dominant_count) = dominant_option(bucket)?;
            let group_size = bucket.len() as u64;
            Some(RankEntry {
                value: value.to_string(),
                dominant_option,
                dominant_count,
                group_size,
                share: Share::new(dominant_count, group_size),
            })
        })
        .collect();

    // `sort_by` is stable: ties stay in first-seen order.
    rows.sort_by(|a, b| b.share.cmp_value(&a.share));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by;
    use qd_core::{Mbti, User};

    fn ans(id: &str, mbti: Option<Mbti>, opt: &str) -> Answer {
        Answer {
            id: id.parse().unwrap(),
            user: User {
                id: format!("u-{id}").parse().unwrap(),
                nickname: id.to_string(),
                region: None,
                birth: None,
                gender: None,
                mbti,
                marketing_opt_in: false,
            },
            question_id: "q1".parse().unwrap(),
            option_id: opt.parse().unwrap(),
            created_at: 0,
        }
    }

    fn by_mbti(xs: &[Answer]) -> Groups<'_, Answer> {
        group_by(xs, |a: &Answer| a.user.mbti.map(|m| m.code().to_string()))
    }

    #[test]
    fn concentrated_cohort_ranks_first() {
        let xs = vec![
            ans("1", Some(Mbti::Entj), "A"),
            ans("2", Some(Mbti::Entj), "A"),
            ans("3", Some(Mbti::Entj), "B"),
            ans("4", Some(Mbti::Infp), "B"),
        ];
        let out = rank_groups(&by_mbti(&xs));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, "INFP");
        assert_eq!(out[0].dominant_option.as_str(), "B");
        assert_eq!(out[0].ratio(), 1.0);
        assert_eq!(out[1].value, "ENTJ");
        assert_eq!(out[1].dominant_option.as_str(), "A");
        assert_eq!(out[1].share, Share::new(2, 3));
    }

    #[test]
    fn ties_keep_first_appearance() {
        let xs = vec![
            ans("1", Some(Mbti::Infp), "A"),
            ans("2", Some(Mbti::Entj), "B"),
        ];
        let out = rank_groups(&by_mbti(&xs));
        let order: Vec<&str> = out.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(order, vec!["INFP", "ENTJ"]);
    }

    #[test]
    fn unknown_is_not_ranked() {
        let xs = vec![ans("1", None, "A"), ans("2", None, "A"), ans("3", Some(Mbti::Istj), "B")];
        let out = rank_groups(&by_mbti(&xs));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, "ISTJ");
    }

    #[test]
    fn option_tie_inside_bucket_takes_first_seen() {
        let xs = vec![
            ans("1", Some(Mbti::Enfp), "B"),
            ans("2", Some(Mbti::Enfp), "A"),
        ];
        let refs: Vec<&Answer> = xs.iter().collect();
        let (opt, n) = dominant_option(&refs).unwrap();
        assert_eq!(opt.as_str(), "B");
        assert_eq!(n, 1);
        assert!(dominant_option(&[]).is_none());
    }

    #[test]
    fn serialized_row_carries_ratio_next_to_share() {
        let xs = vec![
            ans("1", Some(Mbti::Entj), "A"),
            ans("2", Some(Mbti::Entj), "B"),
            ans("3", Some(Mbti::Entj), "A"),
            ans("4", Some(Mbti::Entj), "A"),
        ];
        let out = rank_groups(&by_mbti(&xs));
        let v = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(v["value"], "ENTJ");
        assert_eq!(v["dominant_option"], "A");
        assert_eq!(v["share"]["num"], 3);
        assert_eq!(v["share"]["den"], 4);
        assert_eq!(v["ratio"], 0.75);
    }
}
