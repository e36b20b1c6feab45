use crate::editor;
use crate::state::{PartialId, Snapshot};
use failure::Fallible;

/// Remove a partial configuration and all dependencies on it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OpRemovePartial {
    pub(crate) id: PartialId,
}

impl OpRemovePartial {
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        trace!("edit snapshot, operation 'remove-partial'");

        editor::remove(snapshot, &self.id)?;
        info!("removed partial configuration '{}'", self.id);
        Ok(())
    }
}
