use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of browsing profile a window belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Regular,
    Incognito,
    Guest,
}

impl ProfileKind {
    /// Incognito and guest profiles keep nothing once their last window goes away
    pub fn is_off_the_record(self) -> bool {
        !matches!(self, ProfileKind::Regular)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Regular => "regular",
            ProfileKind::Incognito => "incognito",
            ProfileKind::Guest => "guest",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "regular" | "normal" => Ok(ProfileKind::Regular),
            "incognito" => Ok(ProfileKind::Incognito),
            "guest" => Ok(ProfileKind::Guest),
            other => Err(Error::InvalidConfig(format!(
                "Unknown profile kind '{}'. Expected regular, incognito or guest.",
                other
            ))),
        }
    }
}

/// A browsing profile. Windows share profiles; the host owns their lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    name: String,
    kind: ProfileKind,
}

impl Profile {
    pub fn new(name: impl Into<String>, kind: ProfileKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn regular(name: impl Into<String>) -> Self {
        Self::new(name, ProfileKind::Regular)
    }

    pub fn incognito(name: impl Into<String>) -> Self {
        Self::new(name, ProfileKind::Incognito)
    }

    pub fn guest() -> Self {
        Self::new("guest", ProfileKind::Guest)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn is_off_the_record(&self) -> bool {
        self.kind.is_off_the_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_the_record_kinds() {
        assert!(!ProfileKind::Regular.is_off_the_record());
        assert!(ProfileKind::Incognito.is_off_the_record());
        assert!(ProfileKind::Guest.is_off_the_record());

        assert!(Profile::incognito("work").is_off_the_record());
        assert!(!Profile::regular("default").is_off_the_record());
    }

    #[test]
    fn test_parse_profile_kind() {
        assert_eq!("Incognito".parse::<ProfileKind>().unwrap(), ProfileKind::Incognito);
        assert_eq!("normal".parse::<ProfileKind>().unwrap(), ProfileKind::Regular);
        assert!("private".parse::<ProfileKind>().is_err());
    }
}
