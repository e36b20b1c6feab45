use crate::delta::PartialChange;
use crate::editor;
use crate::errors::LcmError;
use crate::state::{PartialId, RefreshMode, Snapshot};
use failure::Fallible;

/// Append a new partial configuration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OpAddPartial {
    pub(crate) id: PartialId,
    pub(crate) refresh_mode: RefreshMode,
    /// Optional fields for the new entry.
    pub(crate) fields: PartialChange,
}

impl OpAddPartial {
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        trace!("edit snapshot, operation 'add-partial'");

        let mut fields = self.fields.clone();
        fields.refresh_mode = Some(self.refresh_mode);
        let entry = fields.into_entry(self.id.clone());

        match editor::add(snapshot, entry) {
            Ok(()) => info!("added partial configuration '{}'", self.id),
            // Not fatal: the unchanged document is still reapplied.
            Err(e @ LcmError::DuplicateName(_)) => warn!("{}, skipping", e),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
