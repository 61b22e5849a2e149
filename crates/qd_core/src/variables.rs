//! Report parameters: which dimensions are compared and ranked, and how ages
//! are banded. Every field has a safe default, so an empty JSON object is a
//! valid parameter file.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A demographic attribute used to partition respondents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mbti,
    Region,
    Gender,
    AgeGroup,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Mbti,
        Dimension::Region,
        Dimension::Gender,
        Dimension::AgeGroup,
    ];

    /// Wire token (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Mbti => "mbti",
            Dimension::Region => "region",
            Dimension::Gender => "gender",
            Dimension::AgeGroup => "age_group",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CoreError::UnknownDimension(s.to_string()))
    }
}

fn default_dimensions() -> Vec<Dimension> {
    Dimension::ALL.to_vec()
}

fn default_ranking_dimensions() -> Vec<Dimension> {
    vec![Dimension::Mbti]
}

fn default_age_band_years() -> u8 { 10 }
fn default_age_band_cap() -> u8 { 60 }
fn default_percent_decimals() -> u8 { 1 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportParams {
    /// Dimensions compared in the report, in output order.
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<Dimension>,
    /// Dimensions that also get a cohort ranking.
    #[serde(default = "default_ranking_dimensions")]
    pub ranking_dimensions: Vec<Dimension>,
    /// Width of one age band in years (1..=50).
    #[serde(default = "default_age_band_years")]
    pub age_band_years: u8,
    /// Ages at or above this fall into a single open band (`"60+"`).
    #[serde(default = "default_age_band_cap")]
    pub age_band_cap: u8,
    /// Renderer hint for percent strings (0..=3).
    #[serde(default = "default_percent_decimals")]
    pub percent_decimals: u8,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            ranking_dimensions: default_ranking_dimensions(),
            age_band_years: default_age_band_years(),
            age_band_cap: default_age_band_cap(),
            percent_decimals: default_percent_decimals(),
        }
    }
}

impl ReportParams {
    pub fn ranks(&self, d: Dimension) -> bool {
        self.ranking_dimensions.contains(&d)
    }
}

/// Check parameter domains. Returns the first violation found.
pub fn validate_domains(p: &ReportParams) -> Result<(), CoreError> {
    if p.dimensions.is_empty() {
        return Err(CoreError::DomainOutOfRange("dimensions must not be empty"));
    }
    if has_duplicates(&p.dimensions) {
        return Err(CoreError::DomainOutOfRange("dimensions contain duplicates"));
    }
    if has_duplicates(&p.ranking_dimensions) {
        return Err(CoreError::DomainOutOfRange("ranking_dimensions contain duplicates"));
    }
    if !(1..=50).contains(&p.age_band_years) {
        return Err(CoreError::DomainOutOfRange("age_band_years must be 1..=50"));
    }
    if p.age_band_cap == 0 || p.age_band_cap % p.age_band_years != 0 {
        return Err(CoreError::DomainOutOfRange(
            "age_band_cap must be a positive multiple of age_band_years",
        ));
    }
    if p.percent_decimals > 3 {
        return Err(CoreError::DomainOutOfRange("percent_decimals must be 0..=3"));
    }
    Ok(())
}

fn has_duplicates(ds: &[Dimension]) -> bool {
    ds.iter().enumerate().any(|(i, d)| ds[..i].contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let p: ReportParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, ReportParams::default());
        assert!(validate_domains(&p).is_ok());
        assert!(p.ranks(Dimension::Mbti));
        assert!(!p.ranks(Dimension::Region));
    }

    #[test]
    fn dimension_tokens() {
        assert_eq!("age_group".parse::<Dimension>().unwrap(), Dimension::AgeGroup);
        assert!("age".parse::<Dimension>().is_err());
        let v = serde_json::to_value(Dimension::AgeGroup).unwrap();
        assert_eq!(v, "age_group");
    }

    #[test]
    fn rejects_bad_domains() {
        let mut p = ReportParams::default();
        p.dimensions = vec![Dimension::Mbti, Dimension::Mbti];
        assert!(validate_domains(&p).is_err());

        let mut p = ReportParams::default();
        p.age_band_years = 7;
        assert!(validate_domains(&p).is_err());

        let mut p = ReportParams::default();
        p.dimensions.clear();
        assert!(validate_domains(&p).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let r: Result<ReportParams, _> = serde_json::from_str(r#"{"dimenssions":[]}"#);
        assert!(r.is_err());
    }
}
