use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marketplaces a release can be published to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PublisherTarget {
    CurseForge,
    Polymart,
}

impl PublisherTarget {
    pub const ALL: [PublisherTarget; 2] = [PublisherTarget::CurseForge, PublisherTarget::Polymart];

    /// Lowercase key used in descriptor `custom` blocks and settings.
    pub fn key(&self) -> &'static str {
        match self {
            PublisherTarget::CurseForge => "curseforge",
            PublisherTarget::Polymart => "polymart",
        }
    }
}

impl fmt::Display for PublisherTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherTarget::CurseForge => write!(f, "CurseForge"),
            PublisherTarget::Polymart => write!(f, "Polymart"),
        }
    }
}

impl FromStr for PublisherTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublisherTarget::ALL
            .into_iter()
            .find(|target| target.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown publish target \"{}\"", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets_case_insensitively() {
        assert_eq!("CurseForge".parse(), Ok(PublisherTarget::CurseForge));
        assert_eq!(" polymart ".parse(), Ok(PublisherTarget::Polymart));
        assert!("modrinth".parse::<PublisherTarget>().is_err());
    }
}
