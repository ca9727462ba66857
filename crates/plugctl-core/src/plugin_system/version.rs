use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },
    #[error("Invalid version constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },
}

/// Parses a plugin version string like "1.2.3"
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        message: e.to_string(),
    })
}

/// Represents a version requirement range using semver constraints.
///
/// Serialized as its original constraint string, e.g. `">=1.2, <2"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
            constraint: constraint.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// Checks if a specific version satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Checks a raw version string against this range.
    ///
    /// Unparsable versions never satisfy a range.
    pub fn includes_str(&self, version: &str) -> bool {
        match parse_version(version) {
            Ok(v) => self.includes(&v),
            Err(e) => {
                log::warn!("{} (checked against '{}')", e, self.constraint);
                false
            }
        }
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl PartialEq for VersionRange {
    fn eq(&self, other: &Self) -> bool {
        self.req == other.req
    }
}

impl Eq for VersionRange {}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VersionRange::from_constraint(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.constraint
    }
}
