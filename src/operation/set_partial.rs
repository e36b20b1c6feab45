use crate::delta::PartialChange;
use crate::editor;
use crate::state::{PartialId, Snapshot};
use failure::Fallible;

/// Change supplied fields of an existing partial configuration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OpSetPartial {
    pub(crate) id: PartialId,
    pub(crate) change: PartialChange,
}

impl OpSetPartial {
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        trace!("edit snapshot, operation 'set-partial'");

        if self.change.supplied().is_empty() {
            warn!("no fields supplied for partial configuration '{}'", self.id);
        }
        editor::modify(snapshot, &self.id, &self.change)?;
        info!("updated partial configuration '{}'", self.id);
        Ok(())
    }
}
