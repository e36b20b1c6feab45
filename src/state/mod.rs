//! Agent state snapshot.
//!
//! This module contains the in-memory model of the agent configuration,
//! as reported by the agent itself:
//!  * `SettingsState`: agent-wide scalar settings.
//!  * `PartialConfigurationEntry`: a single named partial configuration.
//!  * `Snapshot`: both of the above, as read for a single operation.
//!
//! A snapshot is read fresh for every operation, edited in memory and
//! then dropped once the document has been synthesized.

/// Define a document enum, with its textual tokens.
///
/// Tokens are emitted verbatim in documents and parsed
/// case-insensitively from user input.
macro_rules! document_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub(crate) enum $name {
            $($variant),+
        }

        impl $name {
            /// All valid document tokens.
            pub(crate) const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// Document token for this value.
            pub(crate) fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = failure::Error;

            fn from_str(input: &str) -> failure::Fallible<Self> {
                $(
                    if input.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok($name::$variant);
                    }
                )+
                bail!(
                    "unsupported {} '{}' (expected one of: {})",
                    stringify!($name),
                    input,
                    Self::VARIANTS.join(", ")
                )
            }
        }
    };
}

mod partial;
mod settings;

pub(crate) use partial::{ordered_set, PartialConfigurationEntry, PartialId};
pub(crate) use settings::{
    ActionAfterReboot, ConfigurationMode, DebugMode, RefreshMode, SettingsState,
};

use failure::{Fallible, ResultExt};
use std::collections::HashSet;

/// Current agent configuration, as read from the target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Snapshot {
    /// Agent-wide settings.
    #[serde(default)]
    pub(crate) settings: SettingsState,
    /// Partial configurations, in document order.
    #[serde(default)]
    pub(crate) partial_configurations: Vec<PartialConfigurationEntry>,
}

impl Snapshot {
    /// Parse a snapshot from its JSON representation.
    pub(crate) fn from_json(content: &[u8]) -> Fallible<Self> {
        let snapshot: Self =
            serde_json::from_slice(content).context("failed to parse snapshot JSON")?;
        snapshot.ensure_unique_ids()?;
        Ok(snapshot)
    }

    /// Find the position of a partial configuration by name.
    pub(crate) fn position(&self, id: &PartialId) -> Option<usize> {
        self.partial_configurations.iter().position(|p| &p.id == id)
    }

    /// Find a partial configuration by name.
    pub(crate) fn find(&self, id: &PartialId) -> Option<&PartialConfigurationEntry> {
        self.partial_configurations.iter().find(|p| &p.id == id)
    }

    fn ensure_unique_ids(&self) -> Fallible<()> {
        let mut seen = HashSet::new();
        for entry in &self.partial_configurations {
            if !seen.insert(&entry.id) {
                bail!("duplicate partial configuration '{}' in snapshot", entry.id);
            }
        }
        Ok(())
    }
}
