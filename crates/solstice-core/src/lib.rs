//! Hardware-independent core library for solstice
//!
//! This crate contains all platform-agnostic logic for the solstice
//! wearable weather face: the sync receiver that accepts weather pushed
//! from a paired handheld, the key-value preference store it writes into,
//! and the watch face renderer that reads the store back on a 10-second
//! redraw cadence.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod controller;
pub mod face;
pub mod framebuffer;
pub mod prefs;
pub mod sync;
pub mod ui;
pub mod weather;
