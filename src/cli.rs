//! Command-line interface.
//!
//! Flags map one-to-one onto agent fields. Only flags explicitly
//! passed end up in the requested change.

use crate::delta::{PartialChange, SettingsChange};
use crate::operation::{
    OpAddPartial, OpRemovePartial, OpReset, OpSetPartial, OpSetSetting, Operation,
};
use crate::state::{ActionAfterReboot, ConfigurationMode, DebugMode, PartialId, RefreshMode};
use crate::target::Target;
use failure::{Fallible, ResultExt};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lcmconf",
    about = "Manage configuration agent settings and partial configurations"
)]
pub(crate) struct CliOptions {
    /// Verbosity level (repeat for more)
    #[structopt(short = "v", parse(from_occurrences))]
    pub(crate) verbosity: u8,
    /// Target host
    #[structopt(short = "t", long = "target")]
    pub(crate) target: Option<String>,
    /// JSON file describing an open session to the target
    #[structopt(long = "session", parse(from_os_str))]
    pub(crate) session: Option<PathBuf>,
    /// Directory for documents and compiled artifacts
    #[structopt(long = "output-dir", parse(from_os_str))]
    pub(crate) output_dir: Option<PathBuf>,
    /// Delete documents and artifacts once done
    #[structopt(long = "cleanup")]
    pub(crate) cleanup: bool,
    /// Additional configuration directory (highest priority last)
    #[structopt(long = "config-dir", parse(from_os_str))]
    pub(crate) config_dirs: Vec<PathBuf>,
    #[structopt(subcommand)]
    pub(crate) cmd: CliCommand,
}

impl CliOptions {
    /// Resolve the operation target.
    pub(crate) fn target(&self) -> Fallible<Target> {
        match (&self.target, &self.session) {
            (Some(host), None) => Target::host(host),
            (None, Some(path)) => Target::from_session_file(path),
            (Some(_), Some(_)) => bail!("'--target' and '--session' are mutually exclusive"),
            (None, None) => bail!("missing target, use '--target' or '--session'"),
        }
    }
}

#[derive(Debug, StructOpt)]
pub(crate) enum CliCommand {
    /// Change agent settings
    #[structopt(name = "set-setting")]
    SetSetting(SetSettingArgs),
    /// Reset agent configuration and clear document history
    #[structopt(name = "reset")]
    Reset {},
    /// Add a partial configuration
    #[structopt(name = "add-partial")]
    AddPartial(AddPartialArgs),
    /// Remove a partial configuration
    #[structopt(name = "remove-partial")]
    RemovePartial(RemovePartialArgs),
    /// Change an existing partial configuration
    #[structopt(name = "set-partial")]
    SetPartial(SetPartialArgs),
    /// Print the document synthesized from a snapshot file
    #[structopt(name = "render")]
    Render(RenderArgs),
}

impl CliCommand {
    /// Build the operation for this command, if it targets an agent.
    pub(crate) fn operation(&self) -> Fallible<Option<Operation>> {
        let op = match self {
            CliCommand::SetSetting(args) => Operation::SetSetting(OpSetSetting {
                change: args.change()?,
            }),
            CliCommand::Reset {} => Operation::Reset(OpReset {}),
            CliCommand::AddPartial(args) => Operation::AddPartial(OpAddPartial {
                id: args.name.clone(),
                refresh_mode: args.refresh_mode,
                fields: args.fields.change(),
            }),
            CliCommand::RemovePartial(args) => Operation::RemovePartial(OpRemovePartial {
                id: args.name.clone(),
            }),
            CliCommand::SetPartial(args) => {
                let mut change = args.fields.change();
                change.refresh_mode = args.refresh_mode;
                Operation::SetPartial(OpSetPartial {
                    id: args.name.clone(),
                    change,
                })
            }
            CliCommand::Render(_) => return Ok(None),
        };
        Ok(Some(op))
    }
}

#[derive(Debug, StructOpt)]
pub(crate) struct SetSettingArgs {
    /// TOML file with settings to change (flags take precedence)
    #[structopt(long = "from-file", parse(from_os_str))]
    pub(crate) from_file: Option<PathBuf>,
    /// Minutes between configuration consistency checks
    #[structopt(long = "configuration-mode-frequency-mins")]
    pub(crate) configuration_mode_frequency_mins: Option<u32>,
    /// Whether the agent may reboot the node (true/false)
    #[structopt(long = "reboot-node-if-needed")]
    pub(crate) reboot_node_if_needed: Option<bool>,
    /// ApplyOnly, ApplyAndMonitor or ApplyAndAutoCorrect
    #[structopt(long = "configuration-mode")]
    pub(crate) configuration_mode: Option<ConfigurationMode>,
    /// ContinueConfiguration or StopConfiguration
    #[structopt(long = "action-after-reboot")]
    pub(crate) action_after_reboot: Option<ActionAfterReboot>,
    /// Disabled, Push or Pull
    #[structopt(long = "refresh-mode")]
    pub(crate) refresh_mode: Option<RefreshMode>,
    /// Certificate thumbprint
    #[structopt(long = "certificate-id")]
    pub(crate) certificate_id: Option<String>,
    /// Configuration identifier (UUID)
    #[structopt(long = "configuration-id")]
    pub(crate) configuration_id: Option<Uuid>,
    /// Minutes between pull server checks
    #[structopt(long = "refresh-frequency-mins")]
    pub(crate) refresh_frequency_mins: Option<u32>,
    /// Whether pulled modules may overwrite existing ones (true/false)
    #[structopt(long = "allow-module-overwrite")]
    pub(crate) allow_module_overwrite: Option<bool>,
    /// None, ForceModuleImport or All
    #[structopt(long = "debug-mode")]
    pub(crate) debug_mode: Option<DebugMode>,
    /// Days to keep configuration status history
    #[structopt(long = "status-retention-time-in-days")]
    pub(crate) status_retention_time_in_days: Option<u32>,
}

impl SetSettingArgs {
    /// Requested settings change, file first then flags.
    pub(crate) fn change(&self) -> Fallible<SettingsChange> {
        let mut change = match self.from_file {
            Some(ref path) => {
                let content = std::fs::read(path)
                    .context(format!("failed to read file '{}'", path.display()))?;
                SettingsChange::from_toml(&content)?
            }
            None => SettingsChange::default(),
        };

        change.overlay(SettingsChange {
            configuration_mode_frequency_mins: self.configuration_mode_frequency_mins,
            reboot_node_if_needed: self.reboot_node_if_needed,
            configuration_mode: self.configuration_mode,
            action_after_reboot: self.action_after_reboot,
            refresh_mode: self.refresh_mode,
            certificate_id: self.certificate_id.clone(),
            configuration_id: self.configuration_id,
            refresh_frequency_mins: self.refresh_frequency_mins,
            allow_module_overwrite: self.allow_module_overwrite,
            debug_mode: self.debug_mode,
            status_retention_time_in_days: self.status_retention_time_in_days,
        });
        Ok(change)
    }
}

/// Optional partial configuration fields.
#[derive(Debug, StructOpt)]
pub(crate) struct PartialFieldArgs {
    /// Configuration server (repeatable)
    #[structopt(long = "configuration-source")]
    pub(crate) configuration_source: Vec<String>,
    /// Clear configuration servers
    #[structopt(
        long = "clear-configuration-source",
        conflicts_with = "configuration_source"
    )]
    pub(crate) clear_configuration_source: bool,
    /// Partial configuration applied before this one (repeatable)
    #[structopt(long = "depends-on")]
    pub(crate) depends_on: Vec<PartialId>,
    /// Clear dependencies
    #[structopt(long = "clear-depends-on", conflicts_with = "depends_on")]
    pub(crate) clear_depends_on: bool,
    #[structopt(long = "description")]
    pub(crate) description: Option<String>,
    /// Resource exclusively managed by this partial (repeatable)
    #[structopt(long = "exclusive-resources")]
    pub(crate) exclusive_resources: Vec<String>,
    /// Clear exclusive resources
    #[structopt(
        long = "clear-exclusive-resources",
        conflicts_with = "exclusive_resources"
    )]
    pub(crate) clear_exclusive_resources: bool,
    /// Resource module server (repeatable)
    #[structopt(long = "resource-module-source")]
    pub(crate) resource_module_source: Vec<String>,
    /// Clear resource module servers
    #[structopt(
        long = "clear-resource-module-source",
        conflicts_with = "resource_module_source"
    )]
    pub(crate) clear_resource_module_source: bool,
}

impl PartialFieldArgs {
    /// Requested change.
    ///
    /// Repeatable flags not passed at all are not supplied, `--clear-*`
    /// supplies an empty list.
    pub(crate) fn change(&self) -> PartialChange {
        fn supplied<T: Clone>(values: &[T], clear: bool) -> Option<Vec<T>> {
            if clear {
                Some(vec![])
            } else if values.is_empty() {
                None
            } else {
                Some(values.to_vec())
            }
        }

        PartialChange {
            configuration_source: supplied(
                &self.configuration_source,
                self.clear_configuration_source,
            ),
            depends_on: supplied(&self.depends_on, self.clear_depends_on),
            description: self.description.clone(),
            exclusive_resources: supplied(
                &self.exclusive_resources,
                self.clear_exclusive_resources,
            ),
            refresh_mode: None,
            resource_module_source: supplied(
                &self.resource_module_source,
                self.clear_resource_module_source,
            ),
        }
    }
}

#[derive(Debug, StructOpt)]
pub(crate) struct AddPartialArgs {
    /// Partial configuration name
    #[structopt(long = "name")]
    pub(crate) name: PartialId,
    /// Disabled, Push or Pull
    #[structopt(long = "refresh-mode")]
    pub(crate) refresh_mode: RefreshMode,
    #[structopt(flatten)]
    pub(crate) fields: PartialFieldArgs,
}

#[derive(Debug, StructOpt)]
pub(crate) struct RemovePartialArgs {
    /// Partial configuration name
    #[structopt(long = "name")]
    pub(crate) name: PartialId,
}

#[derive(Debug, StructOpt)]
pub(crate) struct SetPartialArgs {
    /// Partial configuration name
    #[structopt(long = "name")]
    pub(crate) name: PartialId,
    /// Disabled, Push or Pull
    #[structopt(long = "refresh-mode")]
    pub(crate) refresh_mode: Option<RefreshMode>,
    #[structopt(flatten)]
    pub(crate) fields: PartialFieldArgs,
}

#[derive(Debug, StructOpt)]
pub(crate) struct RenderArgs {
    /// JSON snapshot of the agent configuration
    #[structopt(long = "snapshot", parse(from_os_str))]
    pub(crate) snapshot: PathBuf,
}
