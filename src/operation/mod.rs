//! Agent configuration operations.
//!
//! Each operation is a single in-memory edit of a freshly read
//! snapshot. Reading, synthesis, compilation and application are
//! shared and live in `runner`.

mod add_partial;
pub(crate) use add_partial::OpAddPartial;

mod remove_partial;
pub(crate) use remove_partial::OpRemovePartial;

mod reset;
pub(crate) use reset::OpReset;

mod set_partial;
pub(crate) use set_partial::OpSetPartial;

mod set_setting;
pub(crate) use set_setting::OpSetSetting;

use crate::state::Snapshot;
use failure::Fallible;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Operation {
    AddPartial(OpAddPartial),
    RemovePartial(OpRemovePartial),
    Reset(OpReset),
    SetPartial(OpSetPartial),
    SetSetting(OpSetSetting),
}

impl Operation {
    /// Human-readable operation name.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Operation::AddPartial(_) => "add-partial",
            Operation::RemovePartial(_) => "remove-partial",
            Operation::Reset(_) => "reset",
            Operation::SetPartial(_) => "set-partial",
            Operation::SetSetting(_) => "set-setting",
        }
    }

    /// Apply this operation to a snapshot.
    pub(crate) fn edit(&self, snapshot: &mut Snapshot) -> Fallible<()> {
        match self {
            Operation::AddPartial(a) => a.edit(snapshot),
            Operation::RemovePartial(r) => r.edit(snapshot),
            Operation::Reset(r) => r.edit(snapshot),
            Operation::SetPartial(s) => s.edit(snapshot),
            Operation::SetSetting(s) => s.edit(snapshot),
        }
    }

    /// Whether the agent document history must be cleared once applied.
    pub(crate) fn clears_history(&self) -> bool {
        match self {
            Operation::Reset(_) => true,
            _ => false,
        }
    }
}
