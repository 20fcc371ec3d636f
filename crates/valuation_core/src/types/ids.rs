//! Identifier types for sites and scenarios.
//!
//! Both are thin newtypes over `String` so that a site id cannot be passed
//! where a scenario id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a site.
///
/// # Examples
/// ```
/// use valuation_core::types::SiteId;
///
/// let id = SiteId::new("horizon-1-4");
/// assert_eq!(id.as_str(), "horizon-1-4");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    /// Creates a new site ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SiteId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SiteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a scenario.
///
/// # Examples
/// ```
/// use valuation_core::types::ScenarioId;
///
/// let id: ScenarioId = "2026-h18-sw1".into();
/// assert_eq!(id.to_string(), "2026-h18-sw1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a new scenario ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScenarioId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_site_id_from_string() {
        let id: SiteId = String::from("sweetwater-1").into();
        assert_eq!(id.as_str(), "sweetwater-1");
    }

    #[test]
    fn test_site_id_hash() {
        let mut set = HashSet::new();
        set.insert(SiteId::new("a"));
        set.insert(SiteId::new("b"));
        set.insert(SiteId::new("a"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_ids_serialise_transparently() {
        let json = serde_json::to_string(&SiteId::new("prince-george")).unwrap();
        assert_eq!(json, "\"prince-george\"");
        let id: ScenarioId = serde_json::from_str("\"canada\"").unwrap();
        assert_eq!(id, ScenarioId::new("canada"));
    }

    #[test]
    fn test_scenario_id_display() {
        assert_eq!(format!("{}", ScenarioId::new("canada-h14")), "canada-h14");
    }
}
