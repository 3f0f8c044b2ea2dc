//! Audio device handling and stream processing

use crate::error::{AppError, AppResult};
use crate::source::TapPublisher;
use cpal::traits::{DeviceTrait, HostTrait};
use log::{error, info};

/// Audio configuration and device information
pub struct AudioConfig {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Find and configure an audio input device
pub fn setup_audio_device(
    device_name: Option<&str>,
    wanted_channels: u16,
) -> AppResult<(cpal::Device, AudioConfig)> {
    let host = cpal::default_host();

    // Get input device
    let device = if let Some(name) = device_name {
        host.input_devices()?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AppError::AudioDevice(format!("Device '{}' not found", name)))?
    } else {
        host.default_input_device()
            .ok_or_else(|| AppError::AudioDevice("No default input device available".to_string()))?
    };

    let device_name = device.name()?;

    let mut supported_configs = device.supported_input_configs()?;
    let config_range = supported_configs
        .next()
        .ok_or_else(|| AppError::AudioDevice("No supported input configs found".to_string()))?;

    // Prefer 44.1kHz if supported, otherwise the minimum supported rate
    let sample_rate = if config_range.min_sample_rate().0 <= 44100 && config_range.max_sample_rate().0 >= 44100 {
        44100
    } else {
        config_range.min_sample_rate().0
    };

    // Mono devices feed both meters from channel 0
    let channels = wanted_channels.min(config_range.channels()).max(1);

    info!(
        "Using input '{}' at {} Hz, {} channel(s)",
        device_name, sample_rate, channels
    );

    let audio_config = AudioConfig {
        device_name,
        sample_rate,
        channels,
    };

    Ok((device, audio_config))
}

/// Build an audio input stream with the given callback
pub fn build_audio_stream<F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    data_callback: F,
) -> AppResult<cpal::Stream>
where
    F: FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static,
{
    let stream = device.build_input_stream(
        config,
        data_callback,
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Absolute peaks of the left and right inputs over an interleaved buffer.
/// Input indices past the last channel fall back to the last channel.
pub fn frame_peaks(data: &[f32], channels: usize, left: usize, right: usize) -> (f32, f32) {
    let channels = channels.max(1);
    let left = left.min(channels - 1);
    let right = right.min(channels - 1);

    data.chunks(channels).fold((0.0f32, 0.0f32), |(l, r), frame| {
        let sample = |i: usize| frame.get(i).map_or(0.0, |s| s.abs());
        (l.max(sample(left)), r.max(sample(right)))
    })
}

/// Audio processing callback publishing one left/right/master reading per buffer
pub fn create_audio_callback(
    publisher: TapPublisher,
    channels: u16,
    left_input: usize,
    right_input: usize,
) -> impl FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static {
    move |data: &[f32], _: &cpal::InputCallbackInfo| {
        let (left, right) = frame_peaks(data, channels as usize, left_input, right_input);
        publisher.publish_frame(left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_peaks_reads_interleaved_channels() {
        let data = [0.1, -0.5, -0.3, 0.2, 0.05, 0.4];
        let (left, right) = frame_peaks(&data, 2, 0, 1);
        assert!((left - 0.3).abs() < 1e-6);
        assert!((right - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_frame_peaks_picks_requested_inputs() {
        // four channels, meter inputs 3 and 1
        let data = [0.0, 0.2, 0.9, -0.6, 0.0, 0.1, 0.9, 0.3];
        let (left, right) = frame_peaks(&data, 4, 3, 1);
        assert!((left - 0.6).abs() < 1e-6);
        assert!((right - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_mono_input_feeds_both_meters() {
        let data = [0.25, -0.75, 0.5];
        assert_eq!(frame_peaks(&data, 1, 0, 1), (0.75, 0.75));
    }

    #[test]
    fn test_empty_buffer_is_silence() {
        assert_eq!(frame_peaks(&[], 2, 0, 1), (0.0, 0.0));
    }
}
