//! qd_core: Core records, id tokens, exact shares and report parameters.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`qd_algo`, `qd_io`, `qd_pipeline`, `qd_report`, `qd_cli`).
//!
//! - Id tokens: `QuestionId`, `OptionId`, `UserId`, `AnswerId`, plus the
//!   demographic codes `RegionCode` / `GenderCode` and the `DateKey`
//! - Records: `Question`, `AnswerOption`, `User`, `Answer`, `Mbti`
//! - Integer-first `Share` (num/den) with exact comparison
//! - Report parameters: `Dimension`, `ReportParams`

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken(String),
        InvalidDateKey(String),
        UnknownMbti(String),
        UnknownDimension(String),
        UnknownFieldPath(String),
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken(s) => write!(f, "invalid token: {s:?}"),
                CoreError::InvalidDateKey(s) => write!(f, "invalid date key (want YYYYMMDD): {s:?}"),
                CoreError::UnknownMbti(s) => write!(f, "unknown MBTI code: {s:?}"),
                CoreError::UnknownDimension(s) => write!(f, "unknown dimension: {s:?}"),
                CoreError::UnknownFieldPath(s) => write!(f, "unknown field path: {s:?}"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod entities;
pub mod ids;
pub mod rounding;
pub mod variables;

pub use entities::{Answer, AnswerOption, Mbti, Question, User};
pub use errors::CoreError;
pub use ids::{AnswerId, DateKey, GenderCode, OptionId, QuestionId, RegionCode, UserId};
pub use rounding::Share;
pub use variables::{Dimension, ReportParams};
