//! Sort direction, order tokens and order specifications.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of source column (or order name) to direction.
pub type OrderSpec = IndexMap<String, Direction>;

/// Sort direction.
///
/// Parsing is lenient: `ASC` in any letter case is ascending and every other
/// input, including the empty string, is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("ASC") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn is_descending(self) -> bool {
        self == Self::Desc
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Direction {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_str().to_string()
    }
}

/// An order token in its canonical `"<name>-<DIRECTION>"` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderToken {
    pub name: String,
    pub direction: Direction,
}

impl OrderToken {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    /// Parses a raw token. The name is everything before the first `-`, the
    /// direction the segment after it; a missing or unknown direction is
    /// descending.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('-');
        let name = parts.next().unwrap_or_default().to_string();
        let direction = Direction::parse_lenient(parts.next().unwrap_or_default());
        Self { name, direction }
    }
}

impl FromStr for OrderToken {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for OrderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(Direction::parse_lenient("asc"), Direction::Asc);
        assert_eq!(Direction::parse_lenient("Asc"), Direction::Asc);
        assert_eq!(Direction::parse_lenient("DESC"), Direction::Desc);
        assert_eq!(Direction::parse_lenient("sideways"), Direction::Desc);
        assert_eq!(Direction::parse_lenient(""), Direction::Desc);
    }

    #[test]
    fn token_parse_splits_name_and_direction() {
        let token = OrderToken::parse("name-asc");
        assert_eq!(token.name, "name");
        assert_eq!(token.direction, Direction::Asc);
        assert_eq!(token.to_string(), "name-ASC");
    }

    #[test]
    fn malformed_token_defaults_to_desc() {
        let token = OrderToken::parse("created");
        assert_eq!(token.name, "created");
        assert_eq!(token.direction, Direction::Desc);
    }

    #[test]
    fn direction_serializes_as_upper_case_string() {
        let spec: OrderSpec =
            serde_json::from_str(r#"{"id":"asc","name":"nope"}"#).expect("deserialize");
        assert_eq!(spec["id"], Direction::Asc);
        assert_eq!(spec["name"], Direction::Desc);
        assert_eq!(
            serde_json::to_string(&spec).expect("serialize"),
            r#"{"id":"ASC","name":"DESC"}"#
        );
    }

    proptest! {
        #[test]
        fn reversing_twice_is_identity(raw in "[a-zA-Z]{0,6}") {
            let direction = Direction::parse_lenient(&raw);
            prop_assert_eq!(direction.reversed().reversed(), direction);
            prop_assert_ne!(direction.reversed(), direction);
        }
    }
}
