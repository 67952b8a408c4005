//! Domain value objects: Phase, Category, ToolRequirement, ConfigKey.
//!
//! # Design
//!
//! These are pure value types: equality-by-value, no identity. This file's
//! only job is to define the types, their string representations, and their
//! `FromStr` parsers.

use crate::domain::error::DomainError;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Phase ────────────────────────────────────────────────────────────────────

/// Ordering class of a script. Lower phases run first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Phase(pub u32);

impl Phase {
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Category ─────────────────────────────────────────────────────────────────

/// Coarse grouping of scripts, used for listing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Project,
    Git,
    Ci,
    Container,
    Database,
    Quality,
    Docs,
    Other,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Git => "git",
            Self::Ci => "ci",
            Self::Container => "container",
            Self::Database => "database",
            Self::Quality => "quality",
            Self::Docs => "docs",
            Self::Other => "other",
        }
    }

    /// Lenient parse: unknown categories are `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "git" | "vcs" => Ok(Self::Git),
            "ci" | "cicd" => Ok(Self::Ci),
            "container" | "docker" => Ok(Self::Container),
            "database" | "db" => Ok(Self::Database),
            "quality" | "lint" => Ok(Self::Quality),
            "docs" | "documentation" => Ok(Self::Docs),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

// ── ToolRequirement ──────────────────────────────────────────────────────────

/// An external executable a script needs, optionally constrained to a
/// version range.
///
/// Accepted spellings: `git`, `node >=18`, `docker@^24`, `python3 >=3.10, <4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolRequirement {
    name: String,
    version: Option<String>,
}

impl ToolRequirement {
    /// A requirement satisfied by any executable named `name` on the search path.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version range, if any. Parsed at construction so this never fails.
    pub fn version_req(&self) -> Option<VersionReq> {
        self.version
            .as_deref()
            .and_then(|v| VersionReq::parse(v).ok())
    }

    /// Check a probed version string against the range.
    ///
    /// A requirement without a range accepts anything.
    pub fn accepts(&self, version: &Version) -> bool {
        self.version_req().is_none_or(|req| req.matches(version))
    }
}

impl FromStr for ToolRequirement {
    type Err = DomainError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec_trimmed = spec.trim();
        let invalid = |reason: &str| DomainError::InvalidToolRequirement {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let split_at = spec_trimmed
            .find(|c: char| c == '@' || c.is_whitespace() || "<>=^~".contains(c))
            .unwrap_or(spec_trimmed.len());
        let (name, rest) = spec_trimmed.split_at(split_at);
        let rest = rest.trim_start_matches('@').trim();

        if name.is_empty() {
            return Err(invalid("tool name is empty"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("tool name must be a bare executable name"));
        }

        let version = if rest.is_empty() {
            None
        } else {
            VersionReq::parse(rest).map_err(|e| invalid(&e.to_string()))?;
            Some(rest.to_string())
        };

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for ToolRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

// ── ConfigKey ────────────────────────────────────────────────────────────────

/// A dotted, lowercase configuration key such as `cicd.provider`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dotted segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The answers-file name that overrides this key: `cicd.provider` →
    /// `CICD_PROVIDER`.
    pub fn override_name(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }

    /// Derive a key from an answers-file name when no explicit binding
    /// exists. The first `_` separates the section from the field.
    pub fn from_override_name(name: &str) -> Result<Self, DomainError> {
        let lower = name.trim().to_ascii_lowercase();
        let derived = match lower.split_once('_') {
            Some((section, field)) if !section.is_empty() && !field.is_empty() => {
                format!("{section}.{field}")
            }
            _ => lower,
        };
        derived.parse()
    }
}

impl FromStr for ConfigKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidConfigKey {
            key: s.to_string(),
            reason: reason.to_string(),
        };
        let key = s.trim();
        if key.is_empty() {
            return Err(invalid("key is empty"));
        }
        for segment in key.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
            {
                return Err(invalid("segments may only contain [a-z0-9_-]"));
            }
        }
        Ok(Self(key.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_requirement_plain_name() {
        let req: ToolRequirement = "git".parse().unwrap();
        assert_eq!(req.name(), "git");
        assert!(req.version_req().is_none());
        assert!(req.accepts(&Version::new(0, 0, 1)));
    }

    #[test]
    fn tool_requirement_with_range() {
        let req: ToolRequirement = "node >=18".parse().unwrap();
        assert_eq!(req.name(), "node");
        assert!(req.accepts(&Version::new(20, 1, 0)));
        assert!(!req.accepts(&Version::new(16, 0, 0)));

        let at: ToolRequirement = "docker@^24".parse().unwrap();
        assert_eq!(at.name(), "docker");
        assert!(at.accepts(&Version::new(24, 0, 7)));
        assert!(!at.accepts(&Version::new(25, 0, 0)));
    }

    #[test]
    fn tool_requirement_rejects_garbage() {
        assert!("".parse::<ToolRequirement>().is_err());
        assert!("node >=banana".parse::<ToolRequirement>().is_err());
        assert!("/usr/bin/git".parse::<ToolRequirement>().is_err());
    }

    #[test]
    fn config_key_override_name_round_trip() {
        let key: ConfigKey = "cicd.provider".parse().unwrap();
        assert_eq!(key.override_name(), "CICD_PROVIDER");
        assert_eq!(ConfigKey::from_override_name("CICD_PROVIDER").unwrap(), key);
    }

    #[test]
    fn config_key_override_keeps_field_underscores() {
        let key = ConfigKey::from_override_name("DB_ROOT_PASSWORD").unwrap();
        assert_eq!(key.as_str(), "db.root_password");
    }

    #[test]
    fn config_key_rejects_bad_segments() {
        assert!("".parse::<ConfigKey>().is_err());
        assert!("cicd..provider".parse::<ConfigKey>().is_err());
        assert!("Cicd.Provider".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn category_parse_is_lenient() {
        assert_eq!(Category::parse_lenient("cicd"), Category::Ci);
        assert_eq!(Category::parse_lenient("whatever"), Category::Other);
    }
}
