//! Partial configurations.

use super::RefreshMode;
use failure::Fallible;
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Resource type tag prefixing partial configuration identifiers.
static PARTIAL_TAG: &str = "[PartialConfiguration]";

/// Characters which cannot appear in a partial configuration name.
static FORBIDDEN_CHARS: &[char] = &['\'', '"', '[', ']', '{', '}', ','];

/// Name of a partial configuration.
///
/// The agent reports (and documents reference) partial configurations
/// by their tagged resource identifier, e.g. `[PartialConfiguration]Web`.
/// This only stores the bare name, the tagged form is rendered on demand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PartialId(String);

impl PartialId {
    /// Parse a partial name, either bare or tagged.
    pub(crate) fn parse(input: &str) -> Fallible<Self> {
        let trimmed = input.trim();
        let name = if trimmed.starts_with(PARTIAL_TAG) {
            &trimmed[PARTIAL_TAG.len()..]
        } else {
            trimmed
        };

        if name.is_empty() {
            bail!("empty partial configuration name in '{}'", input);
        }
        if name.chars().any(char::is_whitespace) {
            bail!("partial configuration name '{}' contains whitespace", name);
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            bail!(
                "partial configuration name '{}' contains forbidden character '{}'",
                name,
                c
            );
        }

        Ok(Self(name.to_string()))
    }

    /// Bare name, as used in block headers.
    pub(crate) fn name(&self) -> &str {
        &self.0
    }

    /// Tagged resource identifier, as used in dependency references.
    pub(crate) fn tagged(&self) -> String {
        format!("{}{}", PARTIAL_TAG, self.0)
    }
}

impl fmt::Display for PartialId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartialId {
    type Err = failure::Error;

    fn from_str(input: &str) -> Fallible<Self> {
        Self::parse(input)
    }
}

impl Serialize for PartialId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.tagged())
    }
}

impl<'de> Deserialize<'de> for PartialId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A single partial configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PartialConfigurationEntry {
    #[serde(rename = "ResourceId")]
    pub(crate) id: PartialId,
    /// Configuration servers this partial is pulled from.
    #[serde(default)]
    pub(crate) configuration_source: Vec<String>,
    /// Partials which must be applied before this one.
    #[serde(default)]
    pub(crate) depends_on: Vec<PartialId>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    /// Resources which can only be managed by this partial.
    #[serde(default)]
    pub(crate) exclusive_resources: Vec<String>,
    #[serde(default)]
    pub(crate) refresh_mode: Option<RefreshMode>,
    /// Servers resource modules for this partial are pulled from.
    #[serde(default)]
    pub(crate) resource_module_source: Vec<String>,
}

impl PartialConfigurationEntry {
    /// Create an empty partial configuration.
    pub(crate) fn new(id: PartialId) -> Self {
        Self {
            id,
            configuration_source: vec![],
            depends_on: vec![],
            description: None,
            exclusive_resources: vec![],
            refresh_mode: None,
            resource_module_source: vec![],
        }
    }

    /// Drop a dependency reference, returning whether it was present.
    pub(crate) fn drop_dependency(&mut self, id: &PartialId) -> bool {
        let before = self.depends_on.len();
        self.depends_on.retain(|dep| dep != id);
        self.depends_on.len() != before
    }
}

/// Deduplicate names, preserving first-seen order.
pub(crate) fn ordered_set<T>(items: Vec<T>) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
{
    items.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_id() {
        let bare = PartialId::parse("Web").unwrap();
        let tagged = PartialId::parse("[PartialConfiguration]Web").unwrap();
        assert_eq!(bare, tagged);
        assert_eq!(bare.name(), "Web");
        assert_eq!(bare.tagged(), "[PartialConfiguration]Web");

        // Tag is only stripped once.
        let twice = PartialId::parse("[PartialConfiguration][PartialConfiguration]Web");
        assert!(twice.is_err());

        // Matching is case-sensitive.
        assert_ne!(bare, PartialId::parse("web").unwrap());
    }

    #[test]
    fn reject_bad_names() {
        for input in &["", "   ", "[PartialConfiguration]", "two words", "it's", "a,b"] {
            assert!(PartialId::parse(input).is_err(), "accepted '{}'", input);
        }
    }

    #[test]
    fn serde_tagged_form() {
        let id = PartialId::parse("Base").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""[PartialConfiguration]Base""#);
        let back: PartialId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn drop_dependency() {
        let base = PartialId::parse("Base").unwrap();
        let other = PartialId::parse("Other").unwrap();
        let mut entry = PartialConfigurationEntry::new(PartialId::parse("Web").unwrap());
        entry.depends_on = vec![base.clone(), other.clone()];

        assert!(entry.drop_dependency(&base));
        assert!(!entry.drop_dependency(&base));
        assert_eq!(entry.depends_on, vec![other]);
    }

    #[test]
    fn ordered_set_dedup() {
        let items = vec!["b", "a", "b", "c", "a"];
        assert_eq!(ordered_set(items), vec!["b", "a", "c"]);
    }
}
