//! Collaborator traits
//!
//! These traits define the interface between the application logic
//! and the device services (time sync, file system, display).

pub mod clock;
pub mod display;
pub mod source;

pub use clock::{Clock, LocalClock, UtcSource};
pub use display::{DisplayError, MeterDisplay};
pub use source::{fill_line, LineBuffer, LineReader, LineSource, SourceError, MAX_LINE_LEN};
