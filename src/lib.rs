//! Drives a clip-launch button grid as a VU meter.
//!
//! The metering core ([`meter`], [`bank`], [`render`]) knows nothing about
//! audio devices or terminals: samples come in through [`source::SampleSource`]
//! and colours go out through [`surface::Surface`]. The remaining modules are
//! the host that feeds it from an audio input and draws an emulated controller.

pub mod app;
pub mod audio;
pub mod bank;
pub mod config;
pub mod constants;
pub mod error;
pub mod meter;
pub mod render;
pub mod smoothing;
pub mod source;
pub mod state;
pub mod surface;
pub mod ui;
