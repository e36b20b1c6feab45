//! Agent and compiler collaborators.
//!
//! Reading the current agent state, compiling documents and applying
//! them all happen outside of this tool. These traits are the seams,
//! `command` provides implementations driving external programs.

mod command;

pub(crate) use command::{CommandAgent, CommandCompiler, CommandLine};

use crate::state::Snapshot;
use failure::Fallible;
use std::fmt;
use std::path::Path;

/// Stages of the agent document store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DocumentStage {
    Current,
    Previous,
    Pending,
}

impl DocumentStage {
    /// All stages, in removal order.
    pub(crate) const ALL: [DocumentStage; 3] = [
        DocumentStage::Current,
        DocumentStage::Previous,
        DocumentStage::Pending,
    ];
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            DocumentStage::Current => "Current",
            DocumentStage::Previous => "Previous",
            DocumentStage::Pending => "Pending",
        };
        f.write_str(label)
    }
}

/// Configuration agent on a target host.
pub(crate) trait LcmAgent {
    /// Read current agent configuration.
    fn read_snapshot(&self, host: &str) -> Fallible<Snapshot>;

    /// Apply a compiled meta-configuration artifact.
    fn apply_meta(&self, host: &str, artifact: &Path) -> Fallible<()>;

    /// Remove the configuration document at the given stage.
    fn remove_document(&self, host: &str, stage: DocumentStage) -> Fallible<()>;
}

/// Declarative document compiler.
pub(crate) trait Compiler {
    /// Compile document text at `source` into an artifact at `artifact`.
    fn compile(&self, host: &str, source: &Path, artifact: &Path) -> Fallible<()>;
}
