//! Embassy async tasks
//!
//! Each task is a plain struct with a synchronous step (`poll` / `tick`)
//! and an async `run` loop around it. The board crate wraps `run` in its
//! `#[embassy_executor::task]` functions.

pub mod loader;
pub mod render;
pub mod upload;

pub use loader::LoaderTask;
pub use render::RenderTask;
pub use upload::{route_upload, upload_path};
