//! Agent-wide settings.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

document_enum! {
    /// How the agent applies and enforces configurations.
    ConfigurationMode {
        ApplyOnly,
        ApplyAndMonitor,
        ApplyAndAutoCorrect,
    }
}

document_enum! {
    /// What the agent does after a reboot in the middle of a configuration.
    ActionAfterReboot {
        ContinueConfiguration,
        StopConfiguration,
    }
}

document_enum! {
    /// How configurations reach the agent.
    RefreshMode {
        Disabled,
        Push,
        Pull,
    }
}

document_enum! {
    /// Agent module-loading debug behavior.
    DebugMode {
        None,
        ForceModuleImport,
        All,
    }
}

/// Agent-wide settings.
///
/// Every field is optional: an unset field is not emitted in the
/// synthesized document, leaving the agent value (or default) in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SettingsState {
    pub(crate) configuration_mode_frequency_mins: Option<u32>,
    pub(crate) reboot_node_if_needed: Option<bool>,
    pub(crate) configuration_mode: Option<ConfigurationMode>,
    pub(crate) action_after_reboot: Option<ActionAfterReboot>,
    pub(crate) refresh_mode: Option<RefreshMode>,
    /// Thumbprint of the certificate used to secure credentials.
    #[serde(rename = "CertificateID", default)]
    pub(crate) certificate_id: Option<String>,
    /// Configuration identifier, as used by pull servers.
    #[serde(
        rename = "ConfigurationID",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub(crate) configuration_id: Option<Uuid>,
    pub(crate) refresh_frequency_mins: Option<u32>,
    pub(crate) allow_module_overwrite: Option<bool>,
    pub(crate) debug_mode: Option<DebugMode>,
    pub(crate) status_retention_time_in_days: Option<u32>,
}

impl SettingsState {
    /// Settings surviving a configuration reset.
    ///
    /// Only reboot permission, configuration mode, refresh mode and
    /// post-reboot action are carried over; everything else goes back
    /// to agent defaults.
    pub(crate) fn carried_over(&self) -> Self {
        Self {
            reboot_node_if_needed: self.reboot_node_if_needed,
            configuration_mode: self.configuration_mode,
            refresh_mode: self.refresh_mode,
            action_after_reboot: self.action_after_reboot,
            ..Self::default()
        }
    }
}

/// Agents report an unset identifier as an empty string.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(ref s) if !s.trim().is_empty() => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
