//! Document synthesis.
//!
//! This turns an edited snapshot into the full meta-configuration text
//! handed to the compiler: a settings block followed by one block per
//! partial configuration, wrapped in a per-node envelope.

mod block;
mod render;

pub(crate) use render::{render_partial, render_settings};

use crate::errors::LcmError;
use crate::state::Snapshot;
use block::INDENT;

/// Name of the generated configuration.
static CONFIGURATION_NAME: &str = "LcmMetaConfig";

/// Concatenate the settings block and partial blocks, in order.
pub(crate) fn assemble<S: AsRef<str>>(settings: &str, partials: &[S]) -> String {
    let mut body = String::from(settings);
    for partial in partials {
        body.push_str(partial.as_ref());
    }
    body
}

/// Synthesize the document body for a snapshot.
///
/// Every dependency must reference a partial configuration present in
/// the same snapshot.
pub(crate) fn synthesize(snapshot: &Snapshot) -> Result<String, LcmError> {
    for entry in &snapshot.partial_configurations {
        if let Some(dep) = entry.depends_on.iter().find(|d| snapshot.find(d).is_none()) {
            warn!(
                "partial configuration '{}' depends on unknown '{}'",
                entry.id, dep
            );
            return Err(LcmError::NotFound(dep.to_string()));
        }
    }

    let settings = render_settings(&snapshot.settings);
    let partials: Vec<String> = snapshot
        .partial_configurations
        .iter()
        .map(render_partial)
        .collect();
    Ok(assemble(&settings, &partials))
}

/// Wrap a document body for the given node.
pub(crate) fn envelope(host: &str, body: &str) -> String {
    let mut doc = String::new();
    doc.push_str("[DscLocalConfigurationManager()]\n");
    doc.push_str(&format!("Configuration {}\n{{\n", CONFIGURATION_NAME));
    doc.push_str(&format!("{}Node '{}'\n", INDENT, host.replace('\'', "''")));
    doc.push_str(&format!("{}{{\n", INDENT));
    doc.push_str(body);
    doc.push_str(&format!("{}}}\n", INDENT));
    doc.push_str("}\n");
    doc
}
