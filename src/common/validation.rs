//! This file provides validation functionality for use with
//! `veil validate` and for the recoverable failures of a scan.

use std::fmt;

/// Checks a configuration for states that parse but make no sense, such as
/// a blacklist full of empty phrases.
pub trait Validatable {
    /// `None` when nothing is wrong, otherwise every issue found.
    fn validate(&self) -> Option<Vec<Issue>>;
}

/// A problem met while loading, validating or scanning.
///
/// `Warning` means the crate carried on with a fallback; `Error` means the
/// operation that raised it produced nothing. A scan never stops because of
/// an `Issue`: the worst outcome is that fewer elements are hidden than
/// were configured.
#[derive(Clone, Debug, PartialEq)]
pub enum Issue {
    Warning(String),
    Error(String),
}

impl Issue {
    pub fn is_error(&self) -> bool {
        match self {
            Issue::Error(_) => true,
            Issue::Warning(_) => false,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Issue::Error(message) => write!(f, "(err): {}", message),
            Issue::Warning(message) => write!(f, "(warning): {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", Issue::Error(String::from("no root"))),
            "(err): no root"
        );
        assert_eq!(
            format!("{}", Issue::Warning(String::from("empty phrase"))),
            "(warning): empty phrase"
        );
        assert!(Issue::Error(String::new()).is_error());
        assert!(!Issue::Warning(String::new()).is_error());
    }
}
