//! Calendar dates as written in PDX script (`Y.M.D`)

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Result};

/// A PDX calendar date. Month and day are `0` when unspecified.
///
/// The derived ordering compares year, then month, then day, so an
/// unspecified component sorts before any explicit one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    /// Grammar epoch; history before any dated entry is recorded here.
    pub const EPOCH: Date = Date {
        year: 1,
        month: 1,
        day: 1,
    };

    pub fn new(year: u16, month: u8, day: u8) -> Result<Self> {
        if month > 12 {
            return Err(Error::data(format!("month {} out of range in date", month)));
        }
        if day > 31 {
            return Err(Error::data(format!("day {} out of range in date", day)));
        }
        Ok(Date { year, month, day })
    }

    /// Parse only if `text` is exactly how this date would print.
    ///
    /// The parser uses this so that a bareword promoted to a date still
    /// re-serialises to its original bytes.
    pub fn parse_canonical(text: &str) -> Option<Self> {
        if text.split('.').count() != 3 {
            return None;
        }
        let date: Date = text.parse().ok()?;
        (date.to_string() == text).then_some(date)
    }
}

impl FromStr for Date {
    type Err = Error;

    /// Accepts `Y`, `Y.M` and `Y.M.D`; empty month/day components mean `0`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::data(format!("malformed date '{}'", s));

        let mut parts = s.split('.');
        let year = match parts.next() {
            Some(y) if !y.is_empty() => y.parse::<u16>().map_err(|_| bad())?,
            _ => return Err(bad()),
        };

        let component = |part: Option<&str>| -> Result<u8> {
            match part {
                None | Some("") => Ok(0),
                Some(p) if p.bytes().all(|b| b.is_ascii_digit()) => {
                    p.parse::<u8>().map_err(|_| bad())
                }
                Some(_) => Err(bad()),
            }
        };
        let month = component(parts.next())?;
        let day = component(parts.next())?;

        if parts.next().is_some() {
            return Err(bad());
        }

        Date::new(year, month, day).map_err(|_| bad())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.year, self.month, self.day)
    }
}
