//! Key extraction for answers: dotted field paths and age bands.
//!
//! Paths are parsed once into a typed `FieldPath` and then applied as plain
//! accessors. Every `user.*` path reads the snapshot embedded in the answer.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate};
use qd_core::{Answer, CoreError, Dimension, ReportParams};

/// A dotted path into an `Answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    UserId,
    UserMbti,
    UserRegion,
    UserGender,
    UserAgeGroup,
    OptionId,
    QuestionId,
}

impl FieldPath {
    const TABLE: [(&'static str, FieldPath); 7] = [
        ("user.id", FieldPath::UserId),
        ("user.mbti", FieldPath::UserMbti),
        ("user.region", FieldPath::UserRegion),
        ("user.gender", FieldPath::UserGender),
        ("user.age_group", FieldPath::UserAgeGroup),
        ("option.id", FieldPath::OptionId),
        ("question.id", FieldPath::QuestionId),
    ];

    pub fn as_str(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(s, _)| *s)
            .unwrap_or("?")
    }

    pub fn for_dimension(d: Dimension) -> FieldPath {
        match d {
            Dimension::Mbti => FieldPath::UserMbti,
            Dimension::Region => FieldPath::UserRegion,
            Dimension::Gender => FieldPath::UserGender,
            Dimension::AgeGroup => FieldPath::UserAgeGroup,
        }
    }

    /// Extract the key for `a`. `None` means the value is missing.
    pub fn extract(self, a: &Answer, bands: AgeBands) -> Option<String> {
        match self {
            FieldPath::UserId => Some(a.user.id.as_str().to_string()),
            FieldPath::UserMbti => a.user.mbti.map(|m| m.code().to_string()),
            FieldPath::UserRegion => a.user.region.as_ref().map(|r| r.as_str().to_string()),
            FieldPath::UserGender => a.user.gender.as_ref().map(|g| g.as_str().to_string()),
            FieldPath::UserAgeGroup => a.user.birth.and_then(|b| bands.label(b, a.created_at)),
            FieldPath::OptionId => Some(a.option_id.as_str().to_string()),
            FieldPath::QuestionId => Some(a.question_id.as_str().to_string()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::TABLE
            .iter()
            .find(|(k, _)| *k == s)
            .map(|(_, p)| *p)
            .ok_or_else(|| CoreError::UnknownFieldPath(s.to_string()))
    }
}

/// Age banding: `width`-year bands starting at 0, with an open band at `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBands {
    pub width: u8,
    pub cap: u8,
}

impl Default for AgeBands {
    fn default() -> Self {
        Self { width: 10, cap: 60 }
    }
}

impl From<&ReportParams> for AgeBands {
    fn from(p: &ReportParams) -> Self {
        Self { width: p.age_band_years.max(1), cap: p.age_band_cap }
    }
}

impl AgeBands {
    /// Band label for a respondent born at `birth` answering at `at` (epoch seconds).
    ///
    /// `"20s"` for 20..=29 with width 10; `"60+"` at or above the cap.
    /// Birth after `at`, or timestamps chrono cannot represent, give `None`.
    pub fn label(self, birth: i64, at: i64) -> Option<String> {
        let age = age_in_years(birth, at)?;
        let cap = u32::from(self.cap);
        if cap > 0 && age >= cap {
            return Some(format!("{cap}+"));
        }
        let width = u32::from(self.width.max(1));
        Some(format!("{}s", (age / width) * width))
    }
}

fn to_date(epoch_secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(epoch_secs, 0).map(|dt| dt.date_naive())
}

/// Completed years between `birth` and `at` (UTC calendar dates).
pub fn age_in_years(birth: i64, at: i64) -> Option<u32> {
    let b = to_date(birth)?;
    let t = to_date(at)?;
    if b > t {
        return None;
    }
    let mut years = t.year() - b.year();
    if (t.month(), t.day()) < (b.month(), b.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Key closure for `group_by` over answers.
pub fn answer_key(path: FieldPath, bands: AgeBands) -> impl Fn(&Answer) -> Option<String> {
    move |a: &Answer| path.extract(a, bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2000-03-15T00:00:00Z
    const BIRTH: i64 = 953_078_400;
    // 2024-03-14T12:00:00Z, one day before the 24th birthday
    const BEFORE_BDAY: i64 = 1_710_417_600;
    // 2024-03-15T00:00:00Z
    const ON_BDAY: i64 = 1_710_460_800;

    #[test]
    fn parse_paths() {
        assert_eq!("user.mbti".parse::<FieldPath>().unwrap(), FieldPath::UserMbti);
        assert_eq!(" option.id ".parse::<FieldPath>().unwrap(), FieldPath::OptionId);
        assert!("user.shoe_size".parse::<FieldPath>().is_err());
        assert_eq!(FieldPath::UserAgeGroup.to_string(), "user.age_group");
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_in_years(BIRTH, BEFORE_BDAY), Some(23));
        assert_eq!(age_in_years(BIRTH, ON_BDAY), Some(24));
        assert_eq!(age_in_years(ON_BDAY, BIRTH), None);
    }

    #[test]
    fn bands_and_cap() {
        let bands = AgeBands::default();
        assert_eq!(bands.label(BIRTH, ON_BDAY).as_deref(), Some("20s"));
        // born 1950-01-01
        assert_eq!(bands.label(-631_152_000, ON_BDAY).as_deref(), Some("60+"));
        let five = AgeBands { width: 5, cap: 60 };
        assert_eq!(five.label(BIRTH, ON_BDAY).as_deref(), Some("20s"));
        assert_eq!(five.label(BIRTH, BEFORE_BDAY).as_deref(), Some("20s"));
    }
}
