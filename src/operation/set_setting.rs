use crate::delta::SettingsChange;
use crate::state::Snapshot;
use failure::Fallible;

/// Merge requested settings into agent settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OpSetSetting {
    pub(crate) change: SettingsChange,
}

impl OpSetSetting {
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        trace!("edit snapshot, operation 'set-setting'");

        let supplied = self.change.supplied();
        if supplied.is_empty() {
            warn!("no settings supplied, reapplying current configuration");
        }
        for field in supplied {
            debug!("setting '{}'", field.name());
        }

        self.change.apply(&mut snapshot.settings);
        Ok(())
    }
}
