//! Events that trigger screen transitions

/// Events that can trigger screen transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Network events
    /// Captive portal opened for WiFi provisioning
    PortalOpened,
    /// Station connected to the configured network
    NetworkConnected,

    // Loader events
    /// At least one schedule file is missing or unusable
    SourcesMissing,
    /// Loader started (re)loading the schedules
    LoadStarted,
    /// Loader finished its reload pass
    LoadFinished,
}
