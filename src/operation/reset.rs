use crate::state::Snapshot;
use failure::Fallible;

/// Reset agent configuration to a minimal document.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OpReset {}

impl OpReset {
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        trace!("edit snapshot, operation 'reset'");

        snapshot.settings = snapshot.settings.carried_over();
        let dropped = snapshot.partial_configurations.len();
        snapshot.partial_configurations.clear();
        debug!("dropped {} partial configuration(s)", dropped);
        Ok(())
    }
}
