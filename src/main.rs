//! lcmconf: configuration agent meta-configuration manager.
//!
//! This binary changes the settings and partial configurations of a
//! node configuration agent. The agent has no incremental-update API,
//! so every change goes through the same steps:
//!  * read the current agent configuration from the target,
//!  * apply the requested change to it, in memory,
//!  * synthesize a complete meta-configuration document,
//!  * compile it and apply the result to the agent.
//!
//! Reading, compiling and applying are delegated to external commands,
//! configured through TOML snippets.

extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate itertools;
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate structopt;
extern crate toml;
extern crate uuid;

mod agent;
mod cli;
mod config;
mod delta;
mod document;
mod editor;
mod errors;
mod operation;
mod runner;
mod state;
mod target;

use crate::cli::{CliCommand, CliOptions};
use crate::config::{ToolConfig, DEFAULT_CONFIG_DIRS};
use crate::runner::Runner;
use crate::state::Snapshot;
use failure::{Fallible, ResultExt};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

fn main() -> Fallible<()> {
    let opts = CliOptions::from_args();
    init_logging(opts.verbosity)?;
    trace!("command-line options: {:?}", opts);

    if let CliCommand::Render(ref args) = opts.cmd {
        return render(&opts, &args.snapshot);
    }

    let mut dirs: Vec<PathBuf> = DEFAULT_CONFIG_DIRS.iter().map(PathBuf::from).collect();
    dirs.extend(opts.config_dirs.iter().cloned());
    let cfg = ToolConfig::read_config(&dirs)?;

    let target = opts.target()?;
    let op = match opts.cmd.operation()? {
        Some(op) => op,
        None => bail!("command does not target an agent"),
    };

    let output_dir = opts.output_dir.clone().unwrap_or_else(|| cfg.output_dir.clone());
    let cleanup = opts.cleanup || cfg.cleanup;
    let agent = cfg.agent()?;
    let compiler = cfg.compiler()?;

    let runner = Runner::new(&agent, &compiler, output_dir, cleanup);
    runner.run(&target, &op)
}

/// Print the document synthesized from a snapshot file.
fn render(opts: &CliOptions, snapshot_path: &Path) -> Fallible<()> {
    let content = std::fs::read(snapshot_path).context(format!(
        "failed to read snapshot '{}'",
        snapshot_path.display()
    ))?;
    let snapshot = Snapshot::from_json(&content)?;
    let body = document::synthesize(&snapshot)?;

    // Without a target, only the blocks are printed.
    let text = if opts.target.is_some() || opts.session.is_some() {
        let target = opts.target()?;
        document::envelope(target.host_identifier(), &body)
    } else {
        body
    };
    print!("{}", text);
    Ok(())
}

/// Initialize logging, with `-v` flags overriding `RUST_LOG`.
fn init_logging(verbosity: u8) -> Fallible<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    if verbosity > 0 || std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.try_init()?;
    Ok(())
}
