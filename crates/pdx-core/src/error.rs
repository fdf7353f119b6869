//! Error types for PDX parsing and history processing
//!
//! All fallible operations return `Result<T, Error>`.
//! Location-bearing errors render as `path:line:col: message`, dropping
//! whichever parts of the location are unknown.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::parser::tokenizer::Span;

/// Where in the input an error was detected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub path: Option<PathBuf>,
    pub span: Option<Span>,
}

impl Location {
    pub fn at(span: Span) -> Self {
        Location {
            path: None,
            span: Some(span),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Location {
            path: Some(path.into()),
            span: None,
        }
    }

    /// `"path:line:col: "`, or an empty string when nothing is known
    pub fn prefix(&self) -> String {
        let loc = self.to_string();
        if loc.is_empty() {
            loc
        } else {
            format!("{}: ", loc)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.path, &self.span) {
            (Some(p), Some(s)) => write!(f, "{}:{}", p.display(), s),
            (Some(p), None) => write!(f, "{}", p.display()),
            (None, Some(s)) => write!(f, "{}", s),
            (None, None) => Ok(()),
        }
    }
}

/// PDX error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed literal or unterminated string
    #[error("{}{message}", .location.prefix())]
    Lex { location: Location, message: String },

    /// Structural grammar violation
    #[error("{}{message}", .location.prefix())]
    Parse { location: Location, message: String },

    /// Semantically required field missing or value out of domain
    #[error("{}{message}", .location.prefix())]
    Data { location: Location, message: String },

    /// The input broke an invariant the format guarantees
    #[error("{}contract violation: {message}", .location.prefix())]
    ContractViolation { location: Location, message: String },

    /// Title reference whose leading letter names no tier
    #[error("unrecognized title tier: '{0}'")]
    UnknownTier(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn lex(span: Span, message: impl Into<String>) -> Self {
        Error::Lex {
            location: Location::at(span),
            message: message.into(),
        }
    }

    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Error::Parse {
            location: Location::at(span),
            message: message.into(),
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Error::Data {
            location: Location::default(),
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Error::ContractViolation {
            location: Location::default(),
            message: message.into(),
        }
    }

    /// Attach a file path to the error's location, keeping any span.
    pub fn with_path(mut self, path: &Path) -> Self {
        match &mut self {
            Error::Lex { location, .. }
            | Error::Parse { location, .. }
            | Error::Data { location, .. }
            | Error::ContractViolation { location, .. } => {
                if location.path.is_none() {
                    location.path = Some(path.to_path_buf());
                }
            }
            Error::UnknownTier(_) | Error::Io { .. } => {}
        }
        self
    }

    /// Source location, if this kind of error carries one
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Lex { location, .. }
            | Error::Parse { location, .. }
            | Error::Data { location, .. }
            | Error::ContractViolation { location, .. } => Some(location),
            Error::UnknownTier(_) | Error::Io { .. } => None,
        }
    }
}

/// Result type alias for PDX operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: usize, column: usize) -> Span {
        Span {
            line,
            column,
            offset: 0,
        }
    }

    #[test]
    fn test_message_with_path_and_span() {
        let err = Error::parse(span(3, 7), "expected '='").with_path(Path::new("h/1 - Roma.txt"));
        assert_eq!(err.to_string(), "h/1 - Roma.txt:3:7: expected '='");
    }

    #[test]
    fn test_message_with_span_only() {
        let err = Error::lex(span(1, 2), "unterminated string");
        assert_eq!(err.to_string(), "1:2: unterminated string");
    }

    #[test]
    fn test_message_without_location_is_bare() {
        let err = Error::data("province lacks a culture");
        assert_eq!(err.to_string(), "province lacks a culture");
    }

    #[test]
    fn test_with_path_keeps_existing_path() {
        let err = Error::data("x")
            .with_path(Path::new("first.txt"))
            .with_path(Path::new("second.txt"));
        assert_eq!(err.to_string(), "first.txt: x");
    }

    #[test]
    fn test_contract_violation_prefix() {
        let err = Error::contract("holding key 'c_roma' is not barony tier");
        assert!(err.to_string().starts_with("contract violation: "));
        assert!(err.location().is_some());
    }
}
