//! Landed title references (`b_roma`, `c_roma`, `k_italy`, ...)

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// Tier of a landed title, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Barony,
    County,
    Duchy,
    Kingdom,
    Empire,
}

impl Tier {
    /// Classify a title reference by its prefix letter.
    ///
    /// # Errors
    /// `UnknownTier` unless the text starts with one of `b c d k e`
    /// followed by `_`.
    pub fn classify(title: &str) -> Result<Tier> {
        let mut chars = title.chars();
        let tier = match chars.next() {
            Some('b') => Tier::Barony,
            Some('c') => Tier::County,
            Some('d') => Tier::Duchy,
            Some('k') => Tier::Kingdom,
            Some('e') => Tier::Empire,
            _ => return Err(Error::UnknownTier(title.to_string())),
        };
        if chars.next() != Some('_') {
            return Err(Error::UnknownTier(title.to_string()));
        }
        Ok(tier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Barony => "barony",
            Tier::County => "county",
            Tier::Duchy => "duchy",
            Tier::Kingdom => "kingdom",
            Tier::Empire => "empire",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A title reference whose tier is known
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title {
    name: String,
    tier: Tier,
}

impl Title {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let tier = Tier::classify(&name)?;
        Ok(Title { name, tier })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}
