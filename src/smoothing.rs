//! Audio level smoothing and range compression

use crate::error::SetupError;
use std::collections::VecDeque;

/// Rolling root-mean-square over the most recent raw samples.
///
/// RMS rather than a plain average: peaks weigh more than in a linear mean
/// while a single-frame spike is still damped by its neighbours.
#[derive(Debug, Clone)]
pub struct RmsWindow {
    samples: VecDeque<f32>,
    capacity: usize,
    smoothed: f32,
}

impl RmsWindow {
    /// Create an empty window holding `capacity` samples
    pub fn new(capacity: usize) -> Result<Self, SetupError> {
        if capacity == 0 {
            return Err(SetupError::ZeroWindow);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            smoothed: 0.0,
        })
    }

    /// Push a sample, evicting the oldest once full.
    /// Returns the RMS of the samples now held.
    pub fn push(&mut self, sample: f32) -> f32 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        let sum_of_squares: f32 = self.samples.iter().map(|s| s * s).sum();
        self.smoothed = (sum_of_squares / self.samples.len() as f32).sqrt();
        self.smoothed
    }

    /// Get the current smoothed value
    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }
}

/// Clamp-and-rescale of a smoothed level into `0..=steps`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compressor {
    floor: f32,
    ceiling: f32,
    steps: u8,
    multiplier: f32,
}

impl Compressor {
    pub fn new(floor: f32, ceiling: f32, steps: u8) -> Result<Self, SetupError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&floor) || !unit.contains(&ceiling) || floor >= ceiling {
            return Err(SetupError::InvalidRange { floor, ceiling });
        }
        if steps == 0 {
            return Err(SetupError::ZeroSteps);
        }
        Ok(Self {
            floor,
            ceiling,
            steps,
            multiplier: steps as f32 / (ceiling - floor),
        })
    }

    /// Quantise a level. Halves round away from zero, so with five steps over
    /// `0.5..1.0` an input of `0.75` lands on 3.
    pub fn level(&self, smoothed: f32) -> u8 {
        let clamped = smoothed.clamp(self.floor, self.ceiling);
        let scaled = ((clamped - self.floor) * self.multiplier).round();
        // NaN saturates to 0 in the cast
        scaled.clamp(0.0, self.steps as f32) as u8
    }

    pub fn steps(&self) -> u8 {
        self.steps
    }
}

/// Bring a raw meter reading into `[0, 1]`. NaN reads as silence.
pub fn sanitize_sample(raw: f32) -> f32 {
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

/// Convert linear amplitude to decibels
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        (20.0 * amplitude.log10()).max(crate::constants::audio::MIN_DB_LEVEL)
    } else {
        crate::constants::audio::MIN_DB_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_constant_stream_is_the_constant() {
        let mut window = RmsWindow::new(2).unwrap();
        for _ in 0..4 {
            window.push(0.72);
        }
        assert!((window.smoothed() - 0.72).abs() < 1e-6);
    }

    #[test]
    fn test_rms_weights_peaks_above_linear_mean() {
        let mut window = RmsWindow::new(2).unwrap();
        window.push(0.0);
        let rms = window.push(0.8);
        // linear mean would be 0.4
        assert!((rms - 0.8 / 2f32.sqrt()).abs() < 1e-6);
        assert!(rms > 0.4);
    }

    #[test]
    fn test_rms_window_evicts_oldest() {
        let mut window = RmsWindow::new(2).unwrap();
        window.push(1.0);
        window.push(0.5);
        let rms = window.push(0.5);
        assert!((rms - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_partial_window_averages_held_samples_only() {
        let mut window = RmsWindow::new(4).unwrap();
        let rms = window.push(0.6);
        assert!((rms - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(RmsWindow::new(0).unwrap_err(), SetupError::ZeroWindow);
    }

    #[test]
    fn test_compressor_endpoints_and_midpoint() {
        let compressor = Compressor::new(0.5, 1.0, 5).unwrap();
        assert_eq!(compressor.level(0.5), 0);
        assert_eq!(compressor.level(1.0), 5);
        // 2.5 rounds away from zero
        assert_eq!(compressor.level(0.75), 3);

        let channel = Compressor::new(0.52, 0.92, 10).unwrap();
        assert_eq!(channel.level(0.52), 0);
        assert_eq!(channel.level(0.92), 10);
        assert_eq!(channel.level(0.72), 5);
    }

    #[test]
    fn test_compressor_clamps_outside_range() {
        let compressor = Compressor::new(0.52, 0.92, 10).unwrap();
        assert_eq!(compressor.level(0.0), 0);
        assert_eq!(compressor.level(0.3), 0);
        assert_eq!(compressor.level(0.99), 10);
        assert_eq!(compressor.level(7.0), 10);
        assert_eq!(compressor.level(f32::NAN), 0);
    }

    #[test]
    fn test_compressor_rejects_bad_ranges() {
        assert!(matches!(
            Compressor::new(0.9, 0.5, 10),
            Err(SetupError::InvalidRange { .. })
        ));
        assert!(matches!(
            Compressor::new(0.5, 0.5, 10),
            Err(SetupError::InvalidRange { .. })
        ));
        assert!(matches!(
            Compressor::new(-0.1, 0.5, 10),
            Err(SetupError::InvalidRange { .. })
        ));
        assert!(matches!(
            Compressor::new(f32::NAN, 0.5, 10),
            Err(SetupError::InvalidRange { .. })
        ));
        assert_eq!(Compressor::new(0.1, 0.5, 0), Err(SetupError::ZeroSteps));
    }

    #[test]
    fn test_sanitize_sample() {
        assert_eq!(sanitize_sample(-0.3), 0.0);
        assert_eq!(sanitize_sample(1.7), 1.0);
        assert_eq!(sanitize_sample(f32::NAN), 0.0);
        assert_eq!(sanitize_sample(0.42), 0.42);
    }

    #[test]
    fn test_amplitude_to_db() {
        assert!((amplitude_to_db(1.0) - 0.0).abs() < 0.001);
        assert!((amplitude_to_db(0.1) + 20.0).abs() < 0.01);
        assert_eq!(amplitude_to_db(0.0), -60.0);
        assert_eq!(amplitude_to_db(1e-9), -60.0);
    }
}
