//! Requested changes.
//!
//! A change holds only the fields a caller explicitly supplied: every
//! field is an `Option`, and `Some` means "overwrite this". Fields are
//! a closed set per target entity, so invocation parameters (target,
//! output directory, cleanup flags and the like) can never leak into
//! the agent configuration.

use crate::state::{
    ordered_set, ActionAfterReboot, ConfigurationMode, DebugMode, PartialConfigurationEntry,
    PartialId, RefreshMode, SettingsState,
};
use failure::{Fallible, ResultExt};
use uuid::Uuid;

/// Settings fields which can be changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SettingsField {
    ConfigurationModeFrequencyMins,
    RebootNodeIfNeeded,
    ConfigurationMode,
    ActionAfterReboot,
    RefreshMode,
    CertificateId,
    ConfigurationId,
    RefreshFrequencyMins,
    AllowModuleOverwrite,
    DebugMode,
    StatusRetentionTimeInDays,
}

impl SettingsField {
    /// Document name of this field.
    pub(crate) fn name(self) -> &'static str {
        match self {
            SettingsField::ConfigurationModeFrequencyMins => "ConfigurationModeFrequencyMins",
            SettingsField::RebootNodeIfNeeded => "RebootNodeIfNeeded",
            SettingsField::ConfigurationMode => "ConfigurationMode",
            SettingsField::ActionAfterReboot => "ActionAfterReboot",
            SettingsField::RefreshMode => "RefreshMode",
            SettingsField::CertificateId => "CertificateID",
            SettingsField::ConfigurationId => "ConfigurationID",
            SettingsField::RefreshFrequencyMins => "RefreshFrequencyMins",
            SettingsField::AllowModuleOverwrite => "AllowModuleOverwrite",
            SettingsField::DebugMode => "DebugMode",
            SettingsField::StatusRetentionTimeInDays => "StatusRetentionTimeInDays",
        }
    }
}

/// Sparse change to agent settings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct SettingsChange {
    pub(crate) configuration_mode_frequency_mins: Option<u32>,
    pub(crate) reboot_node_if_needed: Option<bool>,
    pub(crate) configuration_mode: Option<ConfigurationMode>,
    pub(crate) action_after_reboot: Option<ActionAfterReboot>,
    pub(crate) refresh_mode: Option<RefreshMode>,
    #[serde(rename = "CertificateID")]
    pub(crate) certificate_id: Option<String>,
    #[serde(rename = "ConfigurationID")]
    pub(crate) configuration_id: Option<Uuid>,
    pub(crate) refresh_frequency_mins: Option<u32>,
    pub(crate) allow_module_overwrite: Option<bool>,
    pub(crate) debug_mode: Option<DebugMode>,
    pub(crate) status_retention_time_in_days: Option<u32>,
}

impl SettingsChange {
    /// Parse a change from a TOML document.
    ///
    /// Keys outside the settings fields are rejected.
    pub(crate) fn from_toml(content: &[u8]) -> Fallible<Self> {
        let change = toml::from_slice(content).context("failed to parse settings change")?;
        Ok(change)
    }

    /// Overlay another change on top of this one.
    ///
    /// Fields supplied in `other` win.
    pub(crate) fn overlay(&mut self, other: SettingsChange) {
        if other.configuration_mode_frequency_mins.is_some() {
            self.configuration_mode_frequency_mins = other.configuration_mode_frequency_mins;
        }
        if other.reboot_node_if_needed.is_some() {
            self.reboot_node_if_needed = other.reboot_node_if_needed;
        }
        if other.configuration_mode.is_some() {
            self.configuration_mode = other.configuration_mode;
        }
        if other.action_after_reboot.is_some() {
            self.action_after_reboot = other.action_after_reboot;
        }
        if other.refresh_mode.is_some() {
            self.refresh_mode = other.refresh_mode;
        }
        if other.certificate_id.is_some() {
            self.certificate_id = other.certificate_id;
        }
        if other.configuration_id.is_some() {
            self.configuration_id = other.configuration_id;
        }
        if other.refresh_frequency_mins.is_some() {
            self.refresh_frequency_mins = other.refresh_frequency_mins;
        }
        if other.allow_module_overwrite.is_some() {
            self.allow_module_overwrite = other.allow_module_overwrite;
        }
        if other.debug_mode.is_some() {
            self.debug_mode = other.debug_mode;
        }
        if other.status_retention_time_in_days.is_some() {
            self.status_retention_time_in_days = other.status_retention_time_in_days;
        }
    }

    /// Fields supplied in this change.
    pub(crate) fn supplied(&self) -> Vec<SettingsField> {
        let mut fields = vec![];
        if self.configuration_mode_frequency_mins.is_some() {
            fields.push(SettingsField::ConfigurationModeFrequencyMins);
        }
        if self.reboot_node_if_needed.is_some() {
            fields.push(SettingsField::RebootNodeIfNeeded);
        }
        if self.configuration_mode.is_some() {
            fields.push(SettingsField::ConfigurationMode);
        }
        if self.action_after_reboot.is_some() {
            fields.push(SettingsField::ActionAfterReboot);
        }
        if self.refresh_mode.is_some() {
            fields.push(SettingsField::RefreshMode);
        }
        if self.certificate_id.is_some() {
            fields.push(SettingsField::CertificateId);
        }
        if self.configuration_id.is_some() {
            fields.push(SettingsField::ConfigurationId);
        }
        if self.refresh_frequency_mins.is_some() {
            fields.push(SettingsField::RefreshFrequencyMins);
        }
        if self.allow_module_overwrite.is_some() {
            fields.push(SettingsField::AllowModuleOverwrite);
        }
        if self.debug_mode.is_some() {
            fields.push(SettingsField::DebugMode);
        }
        if self.status_retention_time_in_days.is_some() {
            fields.push(SettingsField::StatusRetentionTimeInDays);
        }
        fields
    }

    /// Merge this change into agent settings.
    ///
    /// Supplied fields overwrite, everything else is left untouched.
    pub(crate) fn apply(&self, state: &mut SettingsState) {
        if let Some(v) = self.configuration_mode_frequency_mins {
            state.configuration_mode_frequency_mins = Some(v);
        }
        if let Some(v) = self.reboot_node_if_needed {
            state.reboot_node_if_needed = Some(v);
        }
        if let Some(v) = self.configuration_mode {
            state.configuration_mode = Some(v);
        }
        if let Some(v) = self.action_after_reboot {
            state.action_after_reboot = Some(v);
        }
        if let Some(v) = self.refresh_mode {
            state.refresh_mode = Some(v);
        }
        if let Some(v) = self.certificate_id.as_ref() {
            state.certificate_id = Some(v.clone());
        }
        if let Some(v) = self.configuration_id {
            state.configuration_id = Some(v);
        }
        if let Some(v) = self.refresh_frequency_mins {
            state.refresh_frequency_mins = Some(v);
        }
        if let Some(v) = self.allow_module_overwrite {
            state.allow_module_overwrite = Some(v);
        }
        if let Some(v) = self.debug_mode {
            state.debug_mode = Some(v);
        }
        if let Some(v) = self.status_retention_time_in_days {
            state.status_retention_time_in_days = Some(v);
        }
    }
}

/// Partial configuration fields which can be changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PartialField {
    ConfigurationSource,
    DependsOn,
    Description,
    ExclusiveResources,
    RefreshMode,
    ResourceModuleSource,
}

impl PartialField {
    /// Document name of this field.
    pub(crate) fn name(self) -> &'static str {
        match self {
            PartialField::ConfigurationSource => "ConfigurationSource",
            PartialField::DependsOn => "DependsOn",
            PartialField::Description => "Description",
            PartialField::ExclusiveResources => "ExclusiveResources",
            PartialField::RefreshMode => "RefreshMode",
            PartialField::ResourceModuleSource => "ResourceModuleSource",
        }
    }
}

/// Sparse change to a single partial configuration.
///
/// Dependencies are kept as bare names; they only get their
/// resource tag when rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PartialChange {
    pub(crate) configuration_source: Option<Vec<String>>,
    pub(crate) depends_on: Option<Vec<PartialId>>,
    pub(crate) description: Option<String>,
    pub(crate) exclusive_resources: Option<Vec<String>>,
    pub(crate) refresh_mode: Option<RefreshMode>,
    pub(crate) resource_module_source: Option<Vec<String>>,
}

impl PartialChange {
    /// Fields supplied in this change.
    pub(crate) fn supplied(&self) -> Vec<PartialField> {
        let mut fields = vec![];
        if self.configuration_source.is_some() {
            fields.push(PartialField::ConfigurationSource);
        }
        if self.depends_on.is_some() {
            fields.push(PartialField::DependsOn);
        }
        if self.description.is_some() {
            fields.push(PartialField::Description);
        }
        if self.exclusive_resources.is_some() {
            fields.push(PartialField::ExclusiveResources);
        }
        if self.refresh_mode.is_some() {
            fields.push(PartialField::RefreshMode);
        }
        if self.resource_module_source.is_some() {
            fields.push(PartialField::ResourceModuleSource);
        }
        fields
    }

    /// Merge this change into an existing partial configuration.
    ///
    /// Supplied fields overwrite, everything else is carried forward.
    pub(crate) fn apply(&self, entry: &mut PartialConfigurationEntry) {
        if let Some(v) = self.configuration_source.as_ref() {
            entry.configuration_source = ordered_set(v.clone());
        }
        if let Some(v) = self.depends_on.as_ref() {
            entry.depends_on = ordered_set(v.clone());
        }
        if let Some(v) = self.description.as_ref() {
            entry.description = Some(v.clone());
        }
        if let Some(v) = self.exclusive_resources.as_ref() {
            entry.exclusive_resources = ordered_set(v.clone());
        }
        if let Some(v) = self.refresh_mode {
            entry.refresh_mode = Some(v);
        }
        if let Some(v) = self.resource_module_source.as_ref() {
            entry.resource_module_source = ordered_set(v.clone());
        }
    }

    /// Build a new partial configuration out of this change.
    pub(crate) fn into_entry(self, id: PartialId) -> PartialConfigurationEntry {
        let mut entry = PartialConfigurationEntry::new(id);
        self.apply(&mut entry);
        entry
    }
}
