//! Inter-task communication channels
//!
//! Created once by the board crate and handed to every task by reference.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use qems_core::state::Event;

/// Channel capacity for screen events
const SCREEN_EVENT_CHANNEL_SIZE: usize = 8;

/// Maximum info text length on the loading screen
pub const MAX_INFO_LEN: usize = 64;

/// Text for the loading screen's info label
pub type InfoText = String<MAX_INFO_LEN>;

/// Channels shared by the loader task, the render task and the network side
pub struct Channels {
    /// Screen events, applied in order by the render task
    pub screen_events: Channel<CriticalSectionRawMutex, Event, SCREEN_EVENT_CHANNEL_SIZE>,
    /// Latest info text for the loading screen
    pub info: Signal<CriticalSectionRawMutex, InfoText>,
    /// Wake the loader task before its next period
    pub reload: Signal<CriticalSectionRawMutex, ()>,
}

impl Channels {
    pub const fn new() -> Self {
        Self {
            screen_events: Channel::new(),
            info: Signal::new(),
            reload: Signal::new(),
        }
    }

    /// Queue a screen event for the render task
    ///
    /// Events are dropped when the render task is behind.
    pub fn notify(&self, event: Event) {
        if self.screen_events.try_send(event).is_err() {
            warn!("Screen event queue full, dropped {:?}", event);
        }
    }

    /// Replace the loading screen's info text, truncated to fit
    pub fn set_info(&self, text: &str) {
        let mut info = InfoText::new();
        for c in text.chars() {
            if info.push(c).is_err() {
                break;
            }
        }
        self.info.signal(info);
    }

    /// Ask the loader task to run its next period now
    pub fn request_reload(&self) {
        self.reload.signal(());
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
