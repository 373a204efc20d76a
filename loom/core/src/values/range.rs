//! Integer range used by grid placement (`row`, `column`)

use std::fmt;
use std::str::FromStr;

use crate::error::{LoomError, LoomResult};

/// Inclusive range `first..=last`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    /// First index
    pub first: i64,
    /// Last index
    pub last: i64,
}

impl Range {
    /// Range covering a single index
    #[must_use]
    pub const fn single(index: i64) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    /// Range from `first` to `last` (swapped when reversed)
    #[must_use]
    pub fn new(first: i64, last: i64) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Parse `"n"` or `"a:b"`
    pub fn parse(text: &str) -> LoomResult<Self> {
        let text = text.trim();
        let number = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| LoomError::invalid("range", text))
        };
        match text.split_once(':') {
            Some((first, last)) => Ok(Self::new(number(first)?, number(last)?)),
            None => Ok(Self::single(number(text)?)),
        }
    }

    /// Grid line form: zero-based cells to one-based lines (`a+1 / b+2`)
    #[must_use]
    pub fn grid_css(&self) -> String {
        format!("{} / {}", self.first + 1, self.last + 2)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

impl FromStr for Range {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Range::parse("3").unwrap(), Range::single(3));
        assert_eq!(Range::parse("1:4").unwrap(), Range { first: 1, last: 4 });
        assert_eq!(Range::parse("4 : 1").unwrap(), Range { first: 1, last: 4 });
        assert!(Range::parse("a:b").is_err());
    }

    #[test]
    fn test_display_and_grid_css() {
        assert_eq!(Range::single(2).to_string(), "2");
        assert_eq!(Range::new(0, 2).to_string(), "0:2");
        assert_eq!(Range::new(0, 2).grid_css(), "1 / 4");
        assert_eq!(Range::single(0).grid_css(), "1 / 2");
    }
}
