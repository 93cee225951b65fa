//! QEMS firmware runtime
//!
//! Everything that runs on the device above the board support code:
//!
//! - the loader task, which keeps both schedule windows loaded
//! - the render task, which drives clock labels, meters and screen changes
//! - routing of finished uploads to the affected store
//! - configuration loading from the device file system
//!
//! The board crate creates the stores, the [`channels::Channels`] and the
//! display, then spawns [`tasks::LoaderTask::run`] and
//! [`tasks::RenderTask::run`] on its executor.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod channels;
pub mod config;
pub mod tasks;

#[cfg(test)]
mod testing;
