//! FETCH + AUTHORIZE stage: pull everything a report needs from the document
//! store and check that the caller owns the target answer.
//!
//! Any store failure becomes `PipelineError::DataUnavailable` before the
//! engine runs. No retries.

use tracing::{debug, warn};

use qd_core::{Answer, AnswerId, AnswerOption, OptionId, UserId};
use qd_io::{DocumentStore, StoreError};

use crate::assemble::ReportInputs;
use crate::PipelineError;

fn unavailable(what: &'static str) -> impl FnOnce(StoreError) -> PipelineError {
    move |source| PipelineError::DataUnavailable { what, source }
}

/// Fetch the target answer and reject callers who do not own it.
pub fn authorize<S: DocumentStore + ?Sized>(
    store: &S,
    caller: &UserId,
    answer_id: &AnswerId,
) -> Result<Answer, PipelineError> {
    let target = store.answer(answer_id).map_err(unavailable("answer"))?;
    if &target.user.id != caller {
        return Err(PipelineError::Forbidden {
            caller: caller.clone(),
            owner: target.user.id.clone(),
        });
    }
    Ok(target)
}

/// Gather the inputs for an already authorized target answer.
pub fn gather<S: DocumentStore + ?Sized>(
    store: &S,
    target: Answer,
) -> Result<ReportInputs, PipelineError> {
    let question = store.question(&target.question_id).map_err(unavailable("question"))?;
    let chosen = store.option(&target.option_id).map_err(unavailable("option"))?;
    let options = question_options(store, &question.options, &chosen)?;

    let respondent = match store.user(&target.user.id) {
        Ok(u) => u,
        Err(StoreError::NotFound { .. }) => {
            warn!(user = %target.user.id, "respondent has no user record; using answer snapshot");
            target.user.clone()
        }
        Err(e) => return Err(unavailable("user")(e)),
    };

    let answers = store
        .answers_for_question(&target.question_id)
        .map_err(unavailable("answers"))?;
    debug!(question = %question.id, answers = answers.len(), options = options.len(), "inputs fetched");

    Ok(ReportInputs { target, answers, respondent, question, chosen, options })
}

fn question_options<S: DocumentStore + ?Sized>(
    store: &S,
    ids: &[OptionId],
    chosen: &AnswerOption,
) -> Result<Vec<AnswerOption>, PipelineError> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if *id == chosen.id {
            out.push(chosen.clone());
            continue;
        }
        out.push(store.option(id).map_err(unavailable("option"))?);
    }
    Ok(out)
}
