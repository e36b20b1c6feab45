//! Operation targets.

use failure::{Fallible, ResultExt};
use std::path::Path;
use uuid::Uuid;

/// An open management session to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SessionHandle {
    pub(crate) id: Uuid,
    /// Host the session is connected to.
    pub(crate) computer_name: String,
    #[serde(default)]
    pub(crate) protocol: Option<String>,
}

/// Node whose agent is being configured.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Target {
    Host(String),
    Session(SessionHandle),
}

impl Target {
    /// Target a host by name.
    pub(crate) fn host(name: &str) -> Fallible<Self> {
        let name = name.trim();
        ensure_host_identifier(name)?;
        Ok(Target::Host(name.to_string()))
    }

    /// Target the host behind a session, as described in a JSON file.
    pub(crate) fn from_session_file<P: AsRef<Path>>(path: P) -> Fallible<Self> {
        let path = path.as_ref();
        trace!("reading session handle from {:?}", path);
        let content = std::fs::read(path)
            .context(format!("failed to read session file '{}'", path.display()))?;
        let session: SessionHandle =
            serde_json::from_slice(&content).context("failed to parse session handle")?;
        ensure_host_identifier(&session.computer_name)?;
        debug!(
            "using session {} to '{}' ({})",
            session.id,
            session.computer_name,
            session.protocol.as_ref().map_or("unknown protocol", String::as_str)
        );
        Ok(Target::Session(session))
    }

    /// Host identifier, used for artifact naming and agent calls.
    pub(crate) fn host_identifier(&self) -> &str {
        match self {
            Target::Host(name) => name,
            Target::Session(session) => session.computer_name.trim(),
        }
    }
}

fn ensure_host_identifier(name: &str) -> Fallible<()> {
    if name.trim().is_empty() {
        bail!("empty host identifier");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || "-._:".contains(c)) {
        bail!("invalid host identifier '{}'", name);
    }
    Ok(())
}
