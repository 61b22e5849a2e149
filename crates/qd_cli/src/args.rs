// crates/qd_cli/src/args.rs
//
// CLI surface: `qd report`, `qd group`, `qd rank`.
// Ids, dimensions and field paths are parsed into their typed forms by clap
// (bad values are usage errors, exit 2). Paths must be local files.

use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use qd_algo::FieldPath;
use qd_core::{AnswerId, Dimension, QuestionId, UserId};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "qd",
    disable_help_subcommand = true,
    about = "Offline report engine for question-of-the-day answers"
)]
pub struct Cli {
    /// Write logs to stderr as JSON lines instead of plain text.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Report for one answer, as seen by its author.
    Report(ReportArgs),
    /// Bucket sizes of a question's answers grouped by a field path.
    Group(GroupArgs),
    /// Cohort ranking of a question's answers along one dimension.
    Rank(RankArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ReportArgs {
    /// Store snapshot JSON.
    #[arg(long)]
    pub store: PathBuf,
    #[arg(long)]
    pub answer: AnswerId,
    /// Caller identity; must own the answer.
    #[arg(long = "as-user")]
    pub as_user: UserId,
    /// Report parameters JSON (defaults apply when omitted).
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Compared dimension; repeat to set the list (overrides the params file).
    #[arg(long = "dimension")]
    pub dimensions: Vec<Dimension>,
    /// Ranked dimension; repeat to set the list (overrides the params file).
    #[arg(long = "rank-by")]
    pub rank_by: Vec<Dimension>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
    /// Write to this file (atomically) instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct GroupArgs {
    #[arg(long)]
    pub store: PathBuf,
    #[arg(long)]
    pub question: QuestionId,
    /// Dotted path, e.g. `user.mbti` or `option.id`.
    #[arg(long)]
    pub by: FieldPath,
    /// Parameters JSON (only the age bands matter here).
    #[arg(long)]
    pub params: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct RankArgs {
    #[arg(long)]
    pub store: PathBuf,
    #[arg(long)]
    pub question: QuestionId,
    #[arg(long, default_value = "mbti")]
    pub by: Dimension,
    #[arg(long)]
    pub params: Option<PathBuf>,
}

/// Errors raised after clap has accepted the arguments.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs.
pub fn parse_and_validate() -> Result<Cli, CliError> {
    let cli = Cli::parse();
    for p in iter_all_paths(&cli.command) {
        ensure_local_path(p)?;
    }
    Ok(cli)
}

/// Reject any explicit URI scheme (e.g. http://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(cmd: &Command) -> impl Iterator<Item = &Path> {
    let paths: [Option<&Path>; 3] = match cmd {
        Command::Report(a) => [Some(a.store.as_path()), a.params.as_deref(), a.out.as_deref()],
        Command::Group(a) => [Some(a.store.as_path()), a.params.as_deref(), None],
        Command::Rank(a) => [Some(a.store.as_path()), a.params.as_deref(), None],
    };
    paths.into_iter().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_flags_parse_into_typed_values() {
        let cli = Cli::try_parse_from([
            "qd", "report", "--store", "s.json", "--answer", "a1", "--as-user", "u1",
            "--dimension", "mbti", "--dimension", "age_group", "--rank-by", "region",
            "--format", "text",
        ])
        .unwrap();
        let Command::Report(a) = cli.command else { panic!("not a report") };
        assert_eq!(a.dimensions, vec![Dimension::Mbti, Dimension::AgeGroup]);
        assert_eq!(a.rank_by, vec![Dimension::Region]);
        assert_eq!(a.format, Format::Text);
        assert_eq!(a.answer.as_str(), "a1");
    }

    #[test]
    fn unknown_dimension_and_path_are_usage_errors() {
        assert!(Cli::try_parse_from([
            "qd", "report", "--store", "s", "--answer", "a", "--as-user", "u", "--dimension", "zodiac",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["qd", "group", "--store", "s", "--question", "q", "--by", "user.shoe"]).is_err());
    }

    #[test]
    fn rank_defaults_to_mbti() {
        let cli = Cli::try_parse_from(["qd", "rank", "--store", "s", "--question", "q1"]).unwrap();
        let Command::Rank(a) = cli.command else { panic!("not rank") };
        assert_eq!(a.by, Dimension::Mbti);
    }

    #[test]
    fn ensure_local_path_rejects_schemes() {
        assert!(ensure_local_path(Path::new("http://x/s.json")).is_err());
        assert!(ensure_local_path(Path::new("file:///tmp/s.json")).is_err());
        assert!(ensure_local_path(Path::new("/tmp/s.json")).is_ok());
    }
}
