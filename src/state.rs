//! Application state management

use crate::bank::MeterBank;
use crate::meter::Channel;
use crate::smoothing::amplitude_to_db;
use crate::source::Sample;

/// What the status panel shows, refreshed from incoming samples and the bank
pub struct AppState {
    pub device_name: String,
    pub status: String,
    /// Last raw reading per channel
    pub raw: [f32; 3],
    /// Display level per channel
    pub levels: [u8; 3],
    pub clipping: bool,
    pub clip_count: u64,
}

impl AppState {
    /// Create a new application state with default values
    pub fn new(device_name: String) -> Self {
        Self {
            status: format!("Metering {}... Press q or Escape to quit.", device_name),
            device_name,
            raw: [0.0; 3],
            levels: [0; 3],
            clipping: false,
            clip_count: 0,
        }
    }

    pub fn observe(&mut self, sample: &Sample) {
        self.raw[sample.channel.index()] = sample.level;
    }

    /// Copy levels and clip state out of the bank
    pub fn sync(&mut self, bank: &MeterBank) {
        for channel in Channel::ALL {
            self.levels[channel.index()] = bank.level(channel);
        }
        self.clipping = bank.is_clipping();
        self.clip_count = bank.clip_count();
    }

    pub fn raw_db(&self, channel: Channel) -> f32 {
        amplitude_to_db(self.raw[channel.index()])
    }

    pub fn level(&self, channel: Channel) -> u8 {
        self.levels[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_tracks_raw_per_channel() {
        let mut state = AppState::new("test_device".to_string());
        state.observe(&Sample {
            channel: Channel::Right,
            level: 0.1,
        });
        assert_eq!(state.raw, [0.0, 0.1, 0.0]);
        assert!((state.raw_db(Channel::Right) + 20.0).abs() < 0.01);
        assert_eq!(state.raw_db(Channel::Left), -60.0);
        assert!(state.status.contains("test_device"));
    }
}
