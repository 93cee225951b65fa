//! Reload planning for the loader task

use crate::state::Event;
use crate::store::Status;

/// What the loader task does this period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReloadPlan {
    /// A schedule file is missing; show the upload screen and wait
    AwaitUpload,
    /// Both files exist but a window is not ready; reload both
    Reload,
    /// Both windows are ready
    Idle,
}

impl ReloadPlan {
    /// Screen event to report before acting on the plan
    pub fn event(self) -> Option<Event> {
        match self {
            ReloadPlan::AwaitUpload => Some(Event::SourcesMissing),
            ReloadPlan::Reload => Some(Event::LoadStarted),
            ReloadPlan::Idle => None,
        }
    }
}

/// Plan the loader task's next step from both stores' status
///
/// Missing files win over unready windows: there is no point reloading
/// one schedule while the other still has to be uploaded.
pub fn plan_reload(co2: Status, cost: Status) -> ReloadPlan {
    if !co2.is_source_available() || !cost.is_source_available() {
        ReloadPlan::AwaitUpload
    } else if !co2.is_ready() || !cost.is_ready() {
        ReloadPlan::Reload
    } else {
        ReloadPlan::Idle
    }
}
