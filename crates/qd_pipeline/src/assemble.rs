//! ASSEMBLE stage: turn one target answer plus every answer to the same
//! question into the report view-model.
//!
//! Pure and infallible. Each grouping is computed once (`Partitions`) and
//! shared by the share, distribution and ranking steps.
//!
//! Cohorts are built from the user copy embedded in each answer, so a report
//! does not move when a respondent later edits their profile.
//!
//! Precondition (not checked): every answer in `answers` belongs to
//! `question`, and `target` is one of them.

use serde::Serialize;
use tracing::debug;

use qd_algo::{
    group_by, option_distribution, rank_groups, share, AgeBands, FieldPath, GroupKey, Groups,
    OptionShare, RankEntry,
};
use qd_core::{
    Answer, AnswerId, AnswerOption, DateKey, Dimension, QuestionId, Question, ReportParams, Share,
    User, UserId,
};

/// Everything the assembler needs, already fetched.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub target: Answer,
    pub answers: Vec<Answer>,
    pub respondent: User,
    pub question: Question,
    /// Option record of the target's choice, as fetched.
    pub chosen: AnswerOption,
    /// The question's options, in question order.
    pub options: Vec<AnswerOption>,
}

// ---------------------------------------------------------------------------
// Report view-model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBlock {
    pub id: QuestionId,
    pub date_key: DateKey,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RespondentBlock {
    pub user_id: UserId,
    pub nickname: String,
}

/// The respondent's standing inside one demographic cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub dimension: Dimension,
    /// Respondent's value at answer time; `null` when unknown.
    pub value: GroupKey,
    /// Size of the respondent's cohort (0 when the value is unknown).
    pub population: u64,
    /// Share of the cohort that picked the same option.
    pub share: Share,
    pub distribution: Vec<OptionShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionRanking {
    pub dimension: Dimension,
    pub entries: Vec<RankEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub answer_id: AnswerId,
    pub respondent: RespondentBlock,
    pub question: QuestionBlock,
    pub chosen: AnswerOption,
    pub options: Vec<AnswerOption>,
    pub total_respondents: u64,
    /// Share of all respondents that picked `chosen`.
    pub overall: Share,
    pub overall_distribution: Vec<OptionShare>,
    pub dimensions: Vec<DimensionReport>,
    pub mbti_ranking: Vec<RankEntry>,
    /// Rankings for configured dimensions other than MBTI.
    pub rankings: Vec<DimensionRanking>,
}

impl Report {
    pub fn dimension(&self, d: Dimension) -> Option<&DimensionReport> {
        self.dimensions.iter().find(|r| r.dimension == d)
    }

    pub fn ranking(&self, d: Dimension) -> Option<&[RankEntry]> {
        if d == Dimension::Mbti {
            return Some(&self.mbti_ranking);
        }
        self.rankings
            .iter()
            .find(|r| r.dimension == d)
            .map(|r| r.entries.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Partitions (computed once per report)
// ---------------------------------------------------------------------------

/// Every grouping a report needs, computed once.
pub struct Partitions<'a> {
    pub by_option: Groups<'a, Answer>,
    by_dimension: Vec<(Dimension, Groups<'a, Answer>)>,
}

impl<'a> Partitions<'a> {
    pub fn compute(answers: &'a [Answer], dims: &[Dimension], bands: AgeBands) -> Self {
        let by_option = group_by(answers, |a: &Answer| Some(a.option_id.as_str().to_string()));
        let mut by_dimension: Vec<(Dimension, Groups<'a, Answer>)> = Vec::with_capacity(dims.len());
        for &d in dims {
            if by_dimension.iter().any(|(seen, _)| *seen == d) {
                continue;
            }
            let path = FieldPath::for_dimension(d);
            by_dimension.push((d, group_by(answers, move |a: &Answer| path.extract(a, bands))));
        }
        Self { by_option, by_dimension }
    }

    pub fn dimension(&self, d: Dimension) -> Option<&Groups<'a, Answer>> {
        self.by_dimension.iter().find(|(k, _)| *k == d).map(|(_, g)| g)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the report for `inputs.target`. Never fails; degenerate populations
/// produce zero shares.
pub fn build_report(inputs: &ReportInputs, params: &ReportParams) -> Report {
    let bands = AgeBands::from(params);
    let target = &inputs.target;
    let option_ids: Vec<_> = inputs.options.iter().map(|o| o.id.clone()).collect();

    // 1) Groupings, once. MBTI is always needed for the ranking.
    let mut dims: Vec<Dimension> = vec![Dimension::Mbti];
    dims.extend(params.dimensions.iter().copied());
    dims.extend(params.ranking_dimensions.iter().copied());
    let parts = Partitions::compute(&inputs.answers, &dims, bands);

    // 2) Overall share
    let total = inputs.answers.len();
    let chosen_key = GroupKey::value(target.option_id.as_str());
    let overall = share(&parts.by_option, total, &chosen_key);
    let overall_distribution = option_distribution(&parts.by_option, &option_ids, total);

    // 3) Respondent's cohort in each configured dimension
    let dimensions: Vec<DimensionReport> = params
        .dimensions
        .iter()
        .map(|&d| {
            let value = GroupKey::from_option(FieldPath::for_dimension(d).extract(target, bands));
            let groups = parts.dimension(d);
            cohort_report(d, value, groups, &chosen_key, &option_ids)
        })
        .collect();

    // 4) Rankings
    let mbti_ranking = parts
        .dimension(Dimension::Mbti)
        .map(rank_groups)
        .unwrap_or_default();
    let rankings: Vec<DimensionRanking> = params
        .ranking_dimensions
        .iter()
        .filter(|&&d| d != Dimension::Mbti)
        .map(|&d| DimensionRanking {
            dimension: d,
            entries: parts.dimension(d).map(rank_groups).unwrap_or_default(),
        })
        .collect();

    debug!(
        answer = %target.id,
        total,
        cohorts = dimensions.len(),
        ranked = mbti_ranking.len(),
        "report assembled"
    );

    // 5) Merge
    Report {
        answer_id: target.id.clone(),
        respondent: RespondentBlock {
            user_id: inputs.respondent.id.clone(),
            nickname: inputs.respondent.nickname.clone(),
        },
        question: QuestionBlock {
            id: inputs.question.id.clone(),
            date_key: inputs.question.date_key.clone(),
            title: inputs.question.title.clone(),
        },
        chosen: inputs.chosen.clone(),
        options: inputs.options.clone(),
        total_respondents: total as u64,
        overall,
        overall_distribution,
        dimensions,
        mbti_ranking,
        rankings,
    }
}

// ---------------------------------------------------------------------------
// Helpers (pure)
// ---------------------------------------------------------------------------

fn cohort_report(
    dimension: Dimension,
    value: GroupKey,
    groups: Option<&Groups<'_, Answer>>,
    chosen_key: &GroupKey,
    option_ids: &[qd_core::OptionId],
) -> DimensionReport {
    // Unknown respondents are not compared against the unknown bucket.
    let cohort: &[&Answer] = match (&value, groups) {
        (GroupKey::Value(_), Some(g)) => g.get(&value).unwrap_or(&[]),
        _ => &[],
    };
    let population = cohort.len();
    let by_option = group_by(cohort.iter().copied(), |a: &Answer| {
        Some(a.option_id.as_str().to_string())
    });
    DimensionReport {
        dimension,
        value,
        population: population as u64,
        share: share(&by_option, population, chosen_key),
        distribution: option_distribution(&by_option, option_ids, population),
    }
}
