//! qd_pipeline: report orchestration (fetch → authorize → group → share → rank → assemble).
//!
//! Store access happens only in `fetch`; `assemble` is pure and infallible.
//! Every failure is raised before the engine runs.

#![forbid(unsafe_code)]

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use qd_algo::{group_answers_by, rank_groups, AgeBands, FieldPath, GroupKey, RankEntry};
use qd_core::{Answer, AnswerId, CoreError, Dimension, QuestionId, ReportParams, UserId};
use qd_io::{DocumentStore, StoreError};

pub mod assemble;
pub mod fetch;

pub use assemble::{
    build_report, DimensionRanking, DimensionReport, Partitions, QuestionBlock, Report,
    ReportInputs, RespondentBlock,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A document the report needs could not be read.
    #[error("data unavailable ({what}): {source}")]
    DataUnavailable {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("user {caller} may not read the report of an answer owned by {owner}")]
    Forbidden { caller: UserId, owner: UserId },

    #[error("invalid parameters: {0}")]
    Params(#[from] CoreError),
}

/// Full report for `answer_id`, as seen by `caller`.
pub fn run_report<S: DocumentStore + ?Sized>(
    store: &S,
    caller: &UserId,
    answer_id: &AnswerId,
    params: &ReportParams,
) -> Result<Report, PipelineError> {
    qd_core::variables::validate_domains(params)?;
    let target = fetch::authorize(store, caller, answer_id)?;
    let inputs = fetch::gather(store, target)?;
    let report = build_report(&inputs, params);
    info!(
        answer = %report.answer_id,
        question = %report.question.id,
        respondents = report.total_respondents,
        "report built"
    );
    Ok(report)
}

/// Size of one bucket in an ad-hoc grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSize {
    /// `null` for the unknown bucket.
    pub key: GroupKey,
    pub count: u64,
}

/// Bucket sizes of `answers` grouped by `path`, in first-seen order.
pub fn group_summary(answers: &[Answer], path: FieldPath, bands: AgeBands) -> Vec<GroupSize> {
    group_answers_by(answers, path, bands)
        .sizes()
        .into_iter()
        .map(|(key, n)| GroupSize { key, count: n as u64 })
        .collect()
}

/// `group_summary` over every answer to `question`.
pub fn group_question<S: DocumentStore + ?Sized>(
    store: &S,
    question: &QuestionId,
    path: FieldPath,
    params: &ReportParams,
) -> Result<Vec<GroupSize>, PipelineError> {
    qd_core::variables::validate_domains(params)?;
    let answers = store
        .answers_for_question(question)
        .map_err(|source| PipelineError::DataUnavailable { what: "answers", source })?;
    Ok(group_summary(&answers, path, AgeBands::from(params)))
}

/// Cohort ranking of every answer to `question` along `dimension`.
pub fn rank_question<S: DocumentStore + ?Sized>(
    store: &S,
    question: &QuestionId,
    dimension: Dimension,
    params: &ReportParams,
) -> Result<Vec<RankEntry>, PipelineError> {
    qd_core::variables::validate_domains(params)?;
    // Unknown questions are reported rather than ranked as empty.
    store
        .question(question)
        .map_err(|source| PipelineError::DataUnavailable { what: "question", source })?;
    let answers = store
        .answers_for_question(question)
        .map_err(|source| PipelineError::DataUnavailable { what: "answers", source })?;
    let groups = group_answers_by(&answers, FieldPath::for_dimension(dimension), AgeBands::from(params));
    Ok(rank_groups(&groups))
}
