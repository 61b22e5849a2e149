//! Id tokens and codes with a strict charset.
//!
//! Every token is 1..=64 bytes of `[A-Za-z0-9_.:-]`. Tokens are validated on
//! construction and on deserialization, so downstream code can treat them as
//! opaque, already-normalized strings (they double as group keys).

use crate::errors::CoreError;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

fn is_token(s: &str) -> bool {
    let len = s.len();
    if !(1..=64).contains(&len) {
        return false;
    }
    s.bytes().all(|b| matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'_' | b'-' | b':' | b'.'
    ))
}

macro_rules! def_token {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken(s.to_string())) }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if is_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken(s)) }
            }
        }

        impl From<$name> for String {
            fn from(t: $name) -> String { t.0 }
        }
    }
}

def_token!(
    /// Document id of a question.
    QuestionId
);
def_token!(
    /// Document id of an answer option.
    OptionId
);
def_token!(UserId);
def_token!(AnswerId);
def_token!(
    /// Region code as stored on the user profile (e.g. `"KR-11"`).
    RegionCode
);
def_token!(GenderCode);

/// Creation date-key of a question: exactly eight ASCII digits, `YYYYMMDD`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str { &self.0 }

    fn check(s: &str) -> bool {
        let b = s.as_bytes();
        if b.len() != 8 || !b.iter().all(u8::is_ascii_digit) {
            return false;
        }
        let month = (b[4] - b'0') * 10 + (b[5] - b'0');
        let day = (b[6] - b'0') * 10 + (b[7] - b'0');
        (1..=12).contains(&month) && (1..=31).contains(&day)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for DateKey {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::check(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidDateKey(s.to_string())) }
    }
}

impl TryFrom<String> for DateKey {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Self::check(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidDateKey(s)) }
    }
}

impl From<DateKey> for String {
    fn from(d: DateKey) -> String { d.0 }
}
