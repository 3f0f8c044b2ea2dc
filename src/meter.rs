//! Per-channel level tracking: RMS smoothing, compression and clip detection

use crate::constants::meter;
use crate::error::SetupError;
use crate::smoothing::{Compressor, RmsWindow, sanitize_sample};
use crate::source::Subscription;
use log::warn;
use std::fmt;

/// The three monitored signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
    Master,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Left, Channel::Right, Channel::Master];

    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
            Channel::Master => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Left => "left",
            Channel::Right => "right",
            Channel::Master => "master",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scaling parameters for one meter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterConfig {
    /// Raw level shown as an empty meter
    pub floor: f32,
    /// Raw level shown as a full meter
    pub ceiling: f32,
    /// Number of display levels above zero
    pub steps: u8,
    /// Samples in the RMS window
    pub window: usize,
    /// Clip threshold on the unsmoothed input. Only the master meter has one.
    pub clip_threshold: Option<f32>,
}

impl MeterConfig {
    /// Ten-step column meter used for the left and right channels
    pub fn channel() -> Self {
        Self {
            floor: meter::CHANNEL_SCALE_MIN,
            ceiling: meter::CHANNEL_SCALE_MAX,
            steps: meter::CHANNEL_SCALE_STEPS,
            window: meter::RMS_WINDOW,
            clip_threshold: None,
        }
    }

    /// Five-step master bar with clip detection
    pub fn master() -> Self {
        Self {
            floor: meter::MASTER_SCALE_MIN,
            ceiling: meter::MASTER_SCALE_MAX,
            steps: meter::MASTER_SCALE_STEPS,
            window: meter::RMS_WINDOW,
            clip_threshold: Some(meter::CLIP_THRESHOLD),
        }
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        Compressor::new(self.floor, self.ceiling, self.steps)?;
        if self.window == 0 {
            return Err(SetupError::ZeroWindow);
        }
        if let Some(threshold) = self.clip_threshold
            && !(threshold > 0.0 && threshold <= 1.0)
        {
            return Err(SetupError::InvalidClipThreshold(threshold));
        }
        Ok(())
    }
}

/// Clip transitions reported by the master meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSignal {
    Asserted,
    Cleared,
}

/// What a single sample changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeterUpdate {
    pub clip: Option<ClipSignal>,
    /// New display level, present only when it differs from the previous one
    pub level: Option<u8>,
}

/// Smooths and quantises the raw level of one channel
#[derive(Debug)]
pub struct ChannelMeter {
    channel: Channel,
    window: RmsWindow,
    compressor: Compressor,
    clip_threshold: Option<f32>,
    level: u8,
    subscription: Option<Subscription>,
}

impl ChannelMeter {
    pub fn new(channel: Channel, config: &MeterConfig) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self {
            channel,
            window: RmsWindow::new(config.window)?,
            compressor: Compressor::new(config.floor, config.ceiling, config.steps)?,
            clip_threshold: config.clip_threshold,
            level: 0,
            subscription: None,
        })
    }

    /// Feed one raw peak reading.
    ///
    /// `clipping` is the owning bank's current clip state. A master meter
    /// reports `Asserted` only on entering the clip zone and `Cleared` only on
    /// leaving it; samples in the clip zone never reach the compressor.
    pub fn ingest(&mut self, raw: f32, clipping: bool) -> MeterUpdate {
        let sample = sanitize_sample(raw);
        let smoothed = self.window.push(sample);
        let mut update = MeterUpdate::default();

        if let Some(threshold) = self.clip_threshold {
            if sample >= threshold {
                if !clipping {
                    update.clip = Some(ClipSignal::Asserted);
                }
                return update;
            }
            if clipping {
                update.clip = Some(ClipSignal::Cleared);
            }
        }

        let level = self.compressor.level(smoothed);
        if level != self.level {
            self.level = level;
            update.level = Some(level);
        }
        update
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Last quantised level, always within `0..=steps`
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn steps(&self) -> u8 {
        self.compressor.steps()
    }

    pub fn smoothed(&self) -> f32 {
        self.window.smoothed()
    }

    pub fn is_master(&self) -> bool {
        self.clip_threshold.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Id of the subscription still held, if any. Dropping the meter while
    /// this is set logs a warning.
    pub fn held_subscription(&self) -> Option<u64> {
        self.subscription.as_ref().map(Subscription::id)
    }

    pub(crate) fn attach(&mut self, subscription: Subscription) {
        self.subscription = Some(subscription);
    }

    pub(crate) fn detach(&mut self) -> Option<Subscription> {
        self.subscription.take()
    }
}

impl Drop for ChannelMeter {
    fn drop(&mut self) {
        if let Some(id) = self.held_subscription() {
            warn!(
                "{} meter dropped while still subscribed (subscription {})",
                self.channel, id
            );
        }
    }
}
