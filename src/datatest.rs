//! Parsing of test-suite ("datatest") descriptions.
//!
//! A suite is a brace-delimited, semicolon-separated list of datatests, each
//! a parenthesized, comma-separated list of `var=value` assignments:
//!
//! ```text
//! # initial bindings per run #
//! {(X=1,Y=2);(X=-3)}
//! ```
//!
//! Lines containing `#` are stripped before parsing. Each datatest drives
//! one coverage run: its assignments seed a fresh variable store.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatatestError {
    #[error("incorrect syntax to describe a set of datatests: expected `{{ ... }}`")]
    BadSuite,
    #[error("incorrect syntax to describe a datatest: expected `( ... )`, got `{0}`")]
    BadDatatest(String),
}

/// One concrete set of initial variable assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct Datatest {
    assignments: Vec<String>,
}

impl Datatest {
    fn parse(text: &str) -> Result<Self, DatatestError> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| DatatestError::BadDatatest(trimmed.to_string()))?;
        let assignments = inner
            .split(',')
            .map(|assignment| assignment.trim().to_string())
            .collect();
        Ok(Datatest { assignments })
    }

    /// The raw `var=value` assignments, in declaration order.
    pub fn assignments(&self) -> &[String] {
        &self.assignments
    }

    /// The assignments as one executable statement list, e.g. `X=1 ; Y=2`.
    pub fn init_stmts(&self) -> String {
        self.assignments.join(" ; ")
    }
}

/// An ordered suite of datatests.
#[derive(Debug, Clone, PartialEq)]
pub struct DatatestSet {
    datatests: Vec<Datatest>,
}

impl DatatestSet {
    /// Parses a suite description; lines containing `#` are dropped first.
    pub fn parse(text: &str) -> Result<Self, DatatestError> {
        let joined: String = text.lines().filter(|line| !line.contains('#')).collect();
        let trimmed = joined.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or(DatatestError::BadSuite)?;
        let datatests = inner
            .split(';')
            .map(Datatest::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DatatestSet { datatests })
    }

    pub fn datatests(&self) -> &[Datatest] {
        &self.datatests
    }

    pub fn len(&self) -> usize {
        self.datatests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datatests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Datatest> {
        self.datatests.iter()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_suite() {
        let suite = DatatestSet::parse("{(X=1,Y=2);(X=-3)}").unwrap();
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.datatests()[0].assignments(), ["X=1", "Y=2"]);
        assert_eq!(suite.datatests()[1].init_stmts(), "X=-3");
    }

    #[test]
    fn test_init_stmts_execute() {
        let suite = DatatestSet::parse("{(X=1,Y=2)}").unwrap();
        let mut store = crate::eval::Store::new();
        crate::eval::exec_stmts(&suite.datatests()[0].init_stmts(), &mut store).unwrap();
        assert_eq!(store.get("X"), 1);
        assert_eq!(store.get("Y"), 2);
    }

    #[test]
    fn test_comment_lines_stripped() {
        let text = "# suite for the triangle program #\n{(X=5)}\n";
        let suite = DatatestSet::parse(text).unwrap();
        assert_eq!(suite.len(), 1);
    }

    #[test]
    fn test_missing_braces() {
        assert_eq!(DatatestSet::parse("(X=1)").unwrap_err(), DatatestError::BadSuite);
    }

    #[test]
    fn test_missing_parens() {
        let err = DatatestSet::parse("{X=1}").unwrap_err();
        assert_eq!(err, DatatestError::BadDatatest("X=1".to_string()));
    }
}
