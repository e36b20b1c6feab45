//! Settings and partial configuration blocks.

use super::block::{BlockBuilder, BLOCK_DEPTH};
use crate::state::{PartialConfigurationEntry, SettingsState};

/// Header of the agent settings block.
static SETTINGS_HEADER: &str = "Settings";

/// Build the settings block.
pub(crate) fn settings_block(state: &SettingsState) -> BlockBuilder {
    BlockBuilder::new(SETTINGS_HEADER)
        .scalar(
            "ConfigurationModeFrequencyMins",
            state.configuration_mode_frequency_mins,
        )
        .flag("RebootNodeIfNeeded", state.reboot_node_if_needed)
        .scalar("ConfigurationMode", state.configuration_mode)
        .scalar("ActionAfterReboot", state.action_after_reboot)
        .scalar("RefreshMode", state.refresh_mode)
        .scalar("CertificateID", state.certificate_id.as_ref())
        .scalar("ConfigurationID", state.configuration_id)
        .scalar("RefreshFrequencyMins", state.refresh_frequency_mins)
        .flag("AllowModuleOverwrite", state.allow_module_overwrite)
        .scalar("DebugMode", state.debug_mode)
        .scalar(
            "StatusRetentionTimeInDays",
            state.status_retention_time_in_days,
        )
}

/// Build the block for a single partial configuration.
pub(crate) fn partial_block(entry: &PartialConfigurationEntry) -> BlockBuilder {
    let depends_on: Vec<String> = entry.depends_on.iter().map(|d| d.tagged()).collect();

    BlockBuilder::new(format!("PartialConfiguration {}", entry.id.name()))
        .list("ConfigurationSource", &entry.configuration_source)
        .list("DependsOn", &depends_on)
        .scalar("Description", entry.description.as_ref())
        .list("ExclusiveResources", &entry.exclusive_resources)
        .scalar("RefreshMode", entry.refresh_mode)
        .list("ResourceModuleSource", &entry.resource_module_source)
}

/// Render the settings block.
pub(crate) fn render_settings(state: &SettingsState) -> String {
    settings_block(state).render(BLOCK_DEPTH)
}

/// Render the block for a single partial configuration.
pub(crate) fn render_partial(entry: &PartialConfigurationEntry) -> String {
    partial_block(entry).render(BLOCK_DEPTH)
}
