//! Screen state machine definition

use super::events::Event;

/// Appliance screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Start-up and reload progress, with an info text
    #[default]
    Loading,
    /// WiFi provisioning instructions
    WifiSetup,
    /// Schedules missing, shows where to upload them
    Upload,
    /// Clock and the two saving meters
    Data,
}

impl Screen {
    /// Process an event and return the next screen
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Screen::*;

        match (self, event) {
            // Provisioning preempts everything
            (_, PortalOpened) => WifiSetup,

            (WifiSetup, NetworkConnected) => Loading,

            (Loading, SourcesMissing) => Upload,
            (Loading, LoadFinished) => Data,

            (Upload, LoadStarted) => Loading,

            (Data, SourcesMissing) => Upload,
            (Data, LoadStarted) => Loading,

            // Default: stay on current screen
            _ => self,
        }
    }
}
