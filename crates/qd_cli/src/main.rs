// crates/qd_cli/src/main.rs
//
// `qd` binary: parse → init logging → load store/params → run → write output.
// Every failure is bucketed into a stable exit code.

mod args;
mod telemetry;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const FORBIDDEN: u8 = 3;
    pub const IO: u8 = 4;
}

use std::fmt;
use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use args::{Command, Format, GroupArgs, RankArgs, ReportArgs};
use qd_core::ReportParams;
use qd_io::{canonical_json, loader, IoError, SnapshotStore};
use qd_pipeline::{group_question, rank_question, run_report, PipelineError};
use qd_report::{render_json, render_json_string, render_text, ReportView};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad parameters, malformed JSON, or a snapshot that breaks store invariants.
    Validation(String),
    /// The caller does not own the requested answer.
    Forbidden(String),
    /// Read/write/path/limit failures and unavailable documents.
    Io(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Forbidden(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let cli = match args::parse_and_validate() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("qd: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };
    telemetry::init_tracing(cli.log_json);

    let rc = match run(&cli.command) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("qd: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc)
}

fn run(cmd: &Command) -> Result<(), MainError> {
    match cmd {
        Command::Report(a) => report(a),
        Command::Group(a) => group(a),
        Command::Rank(a) => rank(a),
    }
}

/* ----------------------------- subcommands ----------------------------- */

fn report(a: &ReportArgs) -> Result<(), MainError> {
    let store = load_store(&a.store)?;
    let mut params = load_params(a.params.as_deref())?;
    if !a.dimensions.is_empty() {
        params.dimensions = a.dimensions.clone();
    }
    if !a.rank_by.is_empty() {
        params.ranking_dimensions = a.rank_by.clone();
    }

    let report = run_report(&store, &a.as_user, &a.answer, &params).map_err(map_pipeline_err)?;
    let view = ReportView::from_report(&report, params.percent_decimals);

    match (a.format, a.out.as_deref()) {
        (Format::Json, Some(out)) => canonical_json::write_canonical_file(out, &render_json(&view))
            .map_err(|e| MainError::Io(format!("write {}: {e}", out.display())))?,
        (Format::Json, None) => print!("{}", render_json_string(&view)),
        (Format::Text, Some(out)) => canonical_json::write_bytes_atomic(out, render_text(&view).as_bytes())
            .map_err(|e| MainError::Io(format!("write {}: {e}", out.display())))?,
        (Format::Text, None) => print!("{}", render_text(&view)),
    }
    if let Some(out) = &a.out {
        debug!(path = %out.display(), "report written");
    }
    Ok(())
}

fn group(a: &GroupArgs) -> Result<(), MainError> {
    let store = load_store(&a.store)?;
    let params = load_params(a.params.as_deref())?;
    let sizes = group_question(&store, &a.question, a.by, &params).map_err(map_pipeline_err)?;
    print_json(&sizes)
}

fn rank(a: &RankArgs) -> Result<(), MainError> {
    let store = load_store(&a.store)?;
    let params = load_params(a.params.as_deref())?;
    let ranked = rank_question(&store, &a.question, a.by, &params).map_err(map_pipeline_err)?;
    print_json(&ranked)
}

/* ------------------------------- helpers ------------------------------- */

fn load_store(path: &Path) -> Result<SnapshotStore, MainError> {
    loader::load_snapshot(path).map_err(map_io_err)
}

fn load_params(path: Option<&Path>) -> Result<ReportParams, MainError> {
    match path {
        Some(p) => loader::load_params(p).map_err(map_io_err),
        None => Ok(ReportParams::default()),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(v: &T) -> Result<(), MainError> {
    let s = serde_json::to_string_pretty(v).map_err(|e| MainError::Io(format!("serialize: {e}")))?;
    println!("{s}");
    Ok(())
}

fn map_error(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Forbidden(_) => FORBIDDEN,
        MainError::Io(_) => IO,
    }
}

/// Translate qd_io::IoError into MainError buckets.
fn map_io_err(e: IoError) -> MainError {
    match e {
        // Validation-ish (shape/domain/store invariants)
        IoError::Json { .. } | IoError::Params(_) | IoError::Store(_) => MainError::Validation(e.to_string()),
        // I/O-ish
        IoError::Path(_) | IoError::Limit(_) => MainError::Io(e.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Forbidden { .. } => MainError::Forbidden(e.to_string()),
        PipelineError::DataUnavailable { .. } => MainError::Io(e.to_string()),
        PipelineError::Params(_) => MainError::Validation(e.to_string()),
    }
}
