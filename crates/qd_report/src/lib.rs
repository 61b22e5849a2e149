//! qd_report: offline presentation of a computed `Report`.
//!
//! Determinism rules:
//! - No I/O here. Callers pass a report already built by `qd_pipeline`.
//! - Percent strings come from `Share::percent_string` (integer rounding, no floats).
//! - Section order and field names are fixed.

#![deny(unsafe_code)]

use qd_algo::{OptionShare, RankEntry};
use qd_core::{AnswerOption, Dimension, OptionId, Share};
use qd_pipeline::Report;

#[cfg(feature = "render_json")]
pub mod render_json;
#[cfg(feature = "render_text")]
pub mod render_text;

#[cfg(feature = "render_json")]
pub use render_json::{render_json, render_json_string};
#[cfg(feature = "render_text")]
pub use render_text::render_text;

/// Upper bound for percent decimals; larger requests are clamped.
pub const MAX_DECIMALS: u8 = 3;

// ===== View model =====

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportView {
    pub answer_id: String,
    pub question_id: String,
    pub date_key: String,
    pub title: String,
    pub user_id: String,
    pub nickname: String,
    pub chosen: OptionLine,
    pub total_respondents: u64,
    /// Share of everyone who picked the same option.
    pub overall_pct: String,
    pub overall: Vec<DistributionRow>,
    pub cohorts: Vec<CohortView>,
    /// MBTI first, then any other ranked dimension in configured order.
    pub rankings: Vec<RankingView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionLine {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionRow {
    pub option_id: String,
    pub text: String,
    pub count: u64,
    pub pct: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CohortView {
    pub dimension: Dimension,
    /// `None` when the respondent's value is unknown.
    pub value: Option<String>,
    pub population: u64,
    pub pct: String,
    pub distribution: Vec<DistributionRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankingView {
    pub dimension: Dimension,
    pub rows: Vec<RankRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankRow {
    /// 1-based position.
    pub position: usize,
    pub value: String,
    pub option_id: String,
    pub option_text: String,
    pub count: u64,
    pub group_size: u64,
    pub pct: String,
}

impl ReportView {
    /// Format `report` for display with `decimals` digits after the point.
    pub fn from_report(report: &Report, decimals: u8) -> Self {
        let d = decimals.min(MAX_DECIMALS);
        let opts = &report.options;

        let cohorts = report
            .dimensions
            .iter()
            .map(|c| CohortView {
                dimension: c.dimension,
                value: c.value.as_value().map(str::to_string),
                population: c.population,
                pct: pct(c.share, d),
                distribution: rows(&c.distribution, opts, d),
            })
            .collect();

        let mut rankings = vec![RankingView {
            dimension: Dimension::Mbti,
            rows: rank_rows(&report.mbti_ranking, opts, d),
        }];
        rankings.extend(report.rankings.iter().map(|r| RankingView {
            dimension: r.dimension,
            rows: rank_rows(&r.entries, opts, d),
        }));

        Self {
            answer_id: report.answer_id.to_string(),
            question_id: report.question.id.to_string(),
            date_key: report.question.date_key.to_string(),
            title: report.question.title.clone(),
            user_id: report.respondent.user_id.to_string(),
            nickname: report.respondent.nickname.clone(),
            chosen: OptionLine {
                id: report.chosen.id.to_string(),
                text: report.chosen.text.clone(),
            },
            total_respondents: report.total_respondents,
            overall_pct: pct(report.overall, d),
            overall: rows(&report.overall_distribution, opts, d),
            cohorts,
            rankings,
        }
    }

    pub fn cohort(&self, d: Dimension) -> Option<&CohortView> {
        self.cohorts.iter().find(|c| c.dimension == d)
    }
}

// ===== Helpers (pure; no floats) =====

fn pct(s: Share, decimals: u8) -> String {
    s.percent_string(decimals)
}

/// Display text for `id`; the id itself when the option is not listed.
fn option_text(options: &[AnswerOption], id: &OptionId) -> String {
    options
        .iter()
        .find(|o| &o.id == id)
        .map(|o| o.text.clone())
        .unwrap_or_else(|| id.to_string())
}

fn rows(dist: &[OptionShare], options: &[AnswerOption], d: u8) -> Vec<DistributionRow> {
    dist.iter()
        .map(|r| DistributionRow {
            option_id: r.option_id.to_string(),
            text: option_text(options, &r.option_id),
            count: r.count,
            pct: pct(r.share, d),
        })
        .collect()
}

fn rank_rows(entries: &[RankEntry], options: &[AnswerOption], d: u8) -> Vec<RankRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| RankRow {
            position: i + 1,
            value: e.value.clone(),
            option_id: e.dominant_option.to_string(),
            option_text: option_text(options, &e.dominant_option),
            count: e.dominant_count,
            group_size: e.group_size,
            pct: pct(e.share, d),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixture {
    //! A small finished report shared by the renderer tests.

    use qd_algo::{GroupKey, OptionShare, RankEntry};
    use qd_core::{AnswerOption, Dimension, Share};
    use qd_pipeline::{DimensionRanking, DimensionReport, QuestionBlock, Report, RespondentBlock};

    fn opt(id: &str, text: &str) -> AnswerOption {
        AnswerOption { id: id.parse().unwrap(), text: text.into() }
    }

    fn row(id: &str, count: u64, den: u64) -> OptionShare {
        OptionShare { option_id: id.parse().unwrap(), count, share: Share::new(count, den) }
    }

    pub fn report() -> Report {
        Report {
            answer_id: "a1".parse().unwrap(),
            respondent: RespondentBlock { user_id: "u1".parse().unwrap(), nickname: "kim".into() },
            question: QuestionBlock {
                id: "q1".parse().unwrap(),
                date_key: "20240501".parse().unwrap(),
                title: "Cats or dogs?".into(),
            },
            chosen: opt("A", "Cats"),
            options: vec![opt("A", "Cats"), opt("B", "Dogs")],
            total_respondents: 3,
            overall: Share::new(2, 3),
            overall_distribution: vec![row("A", 2, 3), row("B", 1, 3)],
            dimensions: vec![
                DimensionReport {
                    dimension: Dimension::Mbti,
                    value: GroupKey::value("INFP"),
                    population: 2,
                    share: Share::new(1, 2),
                    distribution: vec![row("A", 1, 2), row("B", 1, 2)],
                },
                DimensionReport {
                    dimension: Dimension::Gender,
                    value: GroupKey::Unknown,
                    population: 0,
                    share: Share::ZERO,
                    distribution: vec![row("A", 0, 0), row("B", 0, 0)],
                },
            ],
            mbti_ranking: vec![
                RankEntry {
                    value: "ESTJ".into(),
                    dominant_option: "A".parse().unwrap(),
                    dominant_count: 1,
                    group_size: 1,
                    share: Share::new(1, 1),
                },
                RankEntry {
                    value: "INFP".into(),
                    dominant_option: "A".parse().unwrap(),
                    dominant_count: 1,
                    group_size: 2,
                    share: Share::new(1, 2),
                },
            ],
            rankings: vec![DimensionRanking { dimension: Dimension::Region, entries: vec![] }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percents_follow_requested_decimals() {
        let r = fixture::report();
        let v0 = ReportView::from_report(&r, 0);
        assert_eq!(v0.overall_pct, "67%");
        let v2 = ReportView::from_report(&r, 2);
        assert_eq!(v2.overall_pct, "66.67%");
        // clamped
        let v9 = ReportView::from_report(&r, 9);
        assert_eq!(v9.overall_pct, "66.667%");
    }

    #[test]
    fn unknown_cohort_has_no_value_and_zero_percent() {
        let v = ReportView::from_report(&fixture::report(), 1);
        let g = v.cohort(Dimension::Gender).unwrap();
        assert_eq!(g.value, None);
        assert_eq!(g.pct, "0.0%");
        assert_eq!(g.distribution[1].text, "Dogs");
    }

    #[test]
    fn rankings_put_mbti_first_with_positions() {
        let v = ReportView::from_report(&fixture::report(), 1);
        let dims: Vec<Dimension> = v.rankings.iter().map(|r| r.dimension).collect();
        assert_eq!(dims, vec![Dimension::Mbti, Dimension::Region]);
        let mbti = &v.rankings[0].rows;
        assert_eq!(mbti[0].position, 1);
        assert_eq!(mbti[1].value, "INFP");
        assert_eq!(mbti[1].pct, "50.0%");
        assert_eq!(mbti[1].option_text, "Cats");
    }
}
