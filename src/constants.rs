//! Application constants and configuration values

/// Audio processing constants
pub mod audio {
    /// Minimum dB level shown in the status readout
    pub const MIN_DB_LEVEL: f32 = -60.0;
    /// Buffer size for audio streams
    pub const BUFFER_SIZE: cpal::BufferSize = cpal::BufferSize::Default;
    /// Input channel feeding the left meter
    pub const DEFAULT_LEFT_INPUT: usize = 0;
    /// Input channel feeding the right meter
    pub const DEFAULT_RIGHT_INPUT: usize = 1;
}

/// Metering scale constants. The scaling range narrows what we display to
/// roughly the top 20 dB of the meter.
pub mod meter {
    pub const CHANNEL_SCALE_MIN: f32 = 0.52;
    pub const CHANNEL_SCALE_MAX: f32 = 0.92;
    pub const CHANNEL_SCALE_STEPS: u8 = 10;

    pub const MASTER_SCALE_MIN: f32 = 0.52;
    pub const MASTER_SCALE_MAX: f32 = 0.92;
    pub const MASTER_SCALE_STEPS: u8 = 5;

    /// Raw master level at or above which the whole grid flashes
    pub const CLIP_THRESHOLD: f32 = 0.92;
    /// Number of raw samples in the RMS window
    pub const RMS_WINDOW: usize = 2;
}

/// Emulated controller geometry
pub mod grid {
    /// Clip grid width (track columns)
    pub const COLUMNS: u8 = 8;
    /// Clip grid height (scene rows)
    pub const ROWS: u8 = 5;
    /// Track columns used for the left channel display
    pub const LEFT_COLUMNS: [u8; 2] = [2, 3];
    /// Track columns used for the right channel display
    pub const RIGHT_COLUMNS: [u8; 2] = [6, 7];
}

/// UI display constants
pub mod ui {
    /// UI redraw interval in milliseconds
    pub const UPDATE_INTERVAL_MS: u64 = 16;
    /// Characters drawn per pad
    pub const PAD_WIDTH: usize = 3;
    /// Colour the host shows on clip slots the meters leave alone
    pub const HOST_PAD_COLOR: crate::render::LedColor = crate::render::LedColor::Off;
}
