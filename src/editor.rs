//! Structural edits on the set of partial configurations.

use crate::delta::PartialChange;
use crate::errors::LcmError;
use crate::state::{PartialConfigurationEntry, PartialId, Snapshot};

/// Append a new partial configuration.
///
/// Existing entries are never replaced; a name clash results in
/// `DuplicateName` and leaves the snapshot untouched.
pub(crate) fn add(
    snapshot: &mut Snapshot,
    entry: PartialConfigurationEntry,
) -> Result<(), LcmError> {
    if snapshot.find(&entry.id).is_some() {
        return Err(LcmError::DuplicateName(entry.id.to_string()));
    }

    trace!("appending partial configuration '{}'", entry.id);
    snapshot.partial_configurations.push(entry);
    Ok(())
}

/// Remove a partial configuration, and all references to it.
///
/// Remaining entries keep their relative order.
pub(crate) fn remove(
    snapshot: &mut Snapshot,
    id: &PartialId,
) -> Result<PartialConfigurationEntry, LcmError> {
    let pos = snapshot
        .position(id)
        .ok_or_else(|| LcmError::NotFound(id.to_string()))?;
    let removed = snapshot.partial_configurations.remove(pos);

    for entry in snapshot.partial_configurations.iter_mut() {
        if entry.drop_dependency(id) {
            debug!(
                "dropped dependency on '{}' from partial configuration '{}'",
                id, entry.id
            );
        }
    }

    Ok(removed)
}

/// Change some fields of an existing partial configuration, in place.
pub(crate) fn modify(
    snapshot: &mut Snapshot,
    id: &PartialId,
    change: &PartialChange,
) -> Result<(), LcmError> {
    let entry = snapshot
        .partial_configurations
        .iter_mut()
        .find(|p| &p.id == id)
        .ok_or_else(|| LcmError::NotFound(id.to_string()))?;

    for field in change.supplied() {
        trace!("changing '{}' on partial configuration '{}'", field.name(), id);
    }
    change.apply(entry);
    Ok(())
}
