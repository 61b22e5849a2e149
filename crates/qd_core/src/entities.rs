//! Domain records: `Question`, `AnswerOption`, `User`, `Answer`.
//!
//! Records are plain data. Questions and options are immutable once created;
//! an `Answer` carries a full copy of its respondent's `User` as it was when
//! the answer was recorded, and all cohort grouping reads that copy.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{AnswerId, DateKey, GenderCode, OptionId, QuestionId, RegionCode, UserId};

/// The sixteen MBTI types. Wire form is the upper-case four-letter code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mbti {
    Istj, Isfj, Infj, Intj,
    Istp, Isfp, Infp, Intp,
    Estp, Esfp, Enfp, Entp,
    Estj, Esfj, Enfj, Entj,
}

impl Mbti {
    pub const ALL: [Mbti; 16] = [
        Mbti::Istj, Mbti::Isfj, Mbti::Infj, Mbti::Intj,
        Mbti::Istp, Mbti::Isfp, Mbti::Infp, Mbti::Intp,
        Mbti::Estp, Mbti::Esfp, Mbti::Enfp, Mbti::Entp,
        Mbti::Estj, Mbti::Esfj, Mbti::Enfj, Mbti::Entj,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Mbti::Istj => "ISTJ", Mbti::Isfj => "ISFJ", Mbti::Infj => "INFJ", Mbti::Intj => "INTJ",
            Mbti::Istp => "ISTP", Mbti::Isfp => "ISFP", Mbti::Infp => "INFP", Mbti::Intp => "INTP",
            Mbti::Estp => "ESTP", Mbti::Esfp => "ESFP", Mbti::Enfp => "ENFP", Mbti::Entp => "ENTP",
            Mbti::Estj => "ESTJ", Mbti::Esfj => "ESFJ", Mbti::Enfj => "ENFJ", Mbti::Entj => "ENTJ",
        }
    }
}

impl fmt::Display for Mbti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Mbti {
    type Err = CoreError;
    /// Case-insensitive: profile edits historically stored lower-case codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Mbti::ALL
            .iter()
            .copied()
            .find(|m| m.code() == upper)
            .ok_or_else(|| CoreError::UnknownMbti(s.to_string()))
    }
}

impl TryFrom<String> for Mbti {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Mbti> for String {
    fn from(m: Mbti) -> String { m.code().to_string() }
}

/// A selectable answer to a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Scheduling date of the question, `YYYYMMDD`.
    pub date_key: DateKey,
    pub title: String,
    /// Option references in display order.
    pub options: Vec<OptionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    #[serde(default)]
    pub region: Option<RegionCode>,
    /// Birth date as epoch seconds (UTC).
    #[serde(default)]
    pub birth: Option<i64>,
    #[serde(default)]
    pub gender: Option<GenderCode>,
    #[serde(default)]
    pub mbti: Option<Mbti>,
    #[serde(default)]
    pub marketing_opt_in: bool,
}

/// One user's response to one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    /// Snapshot of the respondent at answer time.
    pub user: User,
    pub question_id: QuestionId,
    pub option_id: OptionId,
    /// Epoch seconds (UTC).
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mbti_parse_is_case_insensitive() {
        assert_eq!("infp".parse::<Mbti>().unwrap(), Mbti::Infp);
        assert_eq!(" ENTJ ".parse::<Mbti>().unwrap(), Mbti::Entj);
        assert!("XXXX".parse::<Mbti>().is_err());
    }

    #[test]
    fn mbti_codes_are_distinct() {
        let mut codes: Vec<&str> = Mbti::ALL.iter().map(|m| m.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 16);
    }

    #[test]
    fn user_optional_fields_default() {
        let u: User = serde_json::from_str(r#"{"id":"u1","nickname":"kim"}"#).unwrap();
        assert_eq!(u.mbti, None);
        assert_eq!(u.region, None);
        assert!(!u.marketing_opt_in);
    }

    #[test]
    fn answer_round_trips_embedded_user() {
        let raw = r#"{
            "id":"a1",
            "user":{"id":"u1","nickname":"kim","mbti":"INFP","region":"KR-11"},
            "question_id":"q1","option_id":"o1","created_at":1700000000
        }"#;
        let a: Answer = serde_json::from_str(raw).unwrap();
        assert_eq!(a.user.mbti, Some(Mbti::Infp));
        let back = serde_json::to_value(&a).unwrap();
        assert_eq!(back["user"]["mbti"], "INFP");
    }
}
