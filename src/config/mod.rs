/// Configuration parsing and validation.
///
/// This module contains three logical entities:
///  * Snippets: single configuration files, holding a subset of configuration entries.
///  * Inputs: configuration snippets merged, but not yet validated.
///  * ToolConfig: validated configuration for agent operations.
mod inputs;
mod snippets;

use crate::agent::{CommandAgent, CommandCompiler, CommandLine};
use failure::{Fallible, ResultExt};
use lazy_static::lazy_static;
use std::path::PathBuf;

/// Default directories holding configuration snippets, in override order.
pub(crate) static DEFAULT_CONFIG_DIRS: &[&str] = &[
    "/usr/lib/lcmconf/config.d",
    "/run/lcmconf/config.d",
    "/etc/lcmconf/config.d",
];

lazy_static! {
    /// Default directory for documents and compiled artifacts.
    pub(crate) static ref DEFAULT_OUTPUT_DIR: PathBuf = std::env::temp_dir();
}

/// Placeholders available to each configured command.
static READ_PLACEHOLDERS: &[&str] = &["host"];
static APPLY_PLACEHOLDERS: &[&str] = &["host", "artifact"];
static REMOVE_PLACEHOLDERS: &[&str] = &["host", "stage"];
static COMPILE_PLACEHOLDERS: &[&str] = &["host", "input", "output"];

/// Runtime configuration for the tool.
///
/// It holds validated configuration. Commands are optional here, so
/// that offline rendering works without any of them.
#[derive(Debug, Serialize)]
pub(crate) struct ToolConfig {
    pub(crate) output_dir: PathBuf,
    pub(crate) cleanup: bool,
    pub(crate) read_command: Option<CommandLine>,
    pub(crate) apply_command: Option<CommandLine>,
    pub(crate) remove_command: Option<CommandLine>,
    pub(crate) compile_command: Option<CommandLine>,
}

impl ToolConfig {
    pub(crate) fn read_config(dirs: &[PathBuf]) -> Fallible<Self> {
        let cfg = inputs::ConfigInput::read_config(dirs)?;
        Self::try_from_input(cfg)
    }

    /// Validate inputs and return a valid tool configuration.
    fn try_from_input(cfg: inputs::ConfigInput) -> Fallible<Self> {
        let output_dir = if cfg.output.directory.is_empty() {
            DEFAULT_OUTPUT_DIR.clone()
        } else {
            PathBuf::from(&cfg.output.directory)
        };

        let read_command = optional_command(cfg.agent.read_command, READ_PLACEHOLDERS)
            .context("invalid agent read command")?;
        let apply_command = optional_command(cfg.agent.apply_command, APPLY_PLACEHOLDERS)
            .context("invalid agent apply command")?;
        let remove_command = optional_command(cfg.agent.remove_command, REMOVE_PLACEHOLDERS)
            .context("invalid agent remove command")?;
        let compile_command = optional_command(cfg.compiler.command, COMPILE_PLACEHOLDERS)
            .context("invalid compiler command")?;

        let config = ToolConfig {
            output_dir,
            cleanup: cfg.output.cleanup,
            read_command,
            apply_command,
            remove_command,
            compile_command,
        };
        match serde_json::to_string_pretty(&config) {
            Ok(text) => debug!("Runtime configuration:\n{}", text),
            Err(e) => debug!("failed to dump runtime configuration: {}", e),
        }

        Ok(config)
    }

    /// Build the agent collaborator.
    pub(crate) fn agent(&self) -> Fallible<CommandAgent> {
        let read = match self.read_command {
            Some(ref c) => c.clone(),
            None => bail!("no agent read command configured"),
        };
        let apply = match self.apply_command {
            Some(ref c) => c.clone(),
            None => bail!("no agent apply command configured"),
        };

        Ok(CommandAgent {
            read,
            apply,
            remove: self.remove_command.clone(),
        })
    }

    /// Build the compiler collaborator.
    pub(crate) fn compiler(&self) -> Fallible<CommandCompiler> {
        match self.compile_command {
            Some(ref command) => Ok(CommandCompiler {
                command: command.clone(),
            }),
            None => bail!("no compiler command configured"),
        }
    }
}

fn optional_command(argv: Vec<String>, allowed: &[&str]) -> Fallible<Option<CommandLine>> {
    if argv.is_empty() {
        return Ok(None);
    }
    let command = CommandLine::new(argv)?;
    command.ensure_placeholders(allowed)?;
    Ok(Some(command))
}
