//! Screen state machine
//!
//! The appliance shows one of four screens. Which one is a function of the
//! current screen and the last event reported by the loader task or the
//! network bring-up; the render task applies the result.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::Screen;
