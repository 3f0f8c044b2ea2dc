//! Configuration parsing and validation

use crate::bank::{BankConfig, BankLayout};
use crate::constants::{audio, grid, meter};
use crate::error::ConfigError;
use crate::meter::MeterConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments for the padmeter application
#[derive(Parser)]
#[command(name = "padmeter")]
#[command(about = "VU metering on a clip-launch button grid")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Meter an audio input on the emulated controller grid
    Run(RunArgs),
    /// List available audio input devices
    List(ListArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Audio input device name (optional, uses default if not specified)
    #[arg(long)]
    pub device: Option<String>,

    /// Input channel index feeding the left meter
    #[arg(long, default_value_t = audio::DEFAULT_LEFT_INPUT)]
    pub left_input: usize,

    /// Input channel index feeding the right meter
    #[arg(long, default_value_t = audio::DEFAULT_RIGHT_INPUT)]
    pub right_input: usize,

    /// Grid columns drawing the left meter (comma-separated, e.g. "2,3")
    #[arg(long, value_delimiter = ',', default_values_t = grid::LEFT_COLUMNS.to_vec())]
    pub left_columns: Vec<u8>,

    /// Grid columns drawing the right meter (comma-separated, e.g. "6,7")
    #[arg(long, value_delimiter = ',', default_values_t = grid::RIGHT_COLUMNS.to_vec())]
    pub right_columns: Vec<u8>,

    /// Raw level shown as an empty channel column
    #[arg(long, default_value_t = meter::CHANNEL_SCALE_MIN)]
    pub channel_floor: f32,

    /// Raw level shown as a full channel column
    #[arg(long, default_value_t = meter::CHANNEL_SCALE_MAX)]
    pub channel_ceiling: f32,

    /// Raw level shown as an empty master bar
    #[arg(long, default_value_t = meter::MASTER_SCALE_MIN)]
    pub master_floor: f32,

    /// Raw level shown as a full master bar
    #[arg(long, default_value_t = meter::MASTER_SCALE_MAX)]
    pub master_ceiling: f32,

    /// Raw master level that triggers the clip warning
    #[arg(long, default_value_t = meter::CLIP_THRESHOLD)]
    pub clip_threshold: f32,

    /// Number of samples in the RMS window
    #[arg(long, default_value_t = meter::RMS_WINDOW)]
    pub window: usize,

    /// Write logs to this file (the terminal is taken by the display)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ListArgs {}

/// Application configuration derived from command line arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub device_name: Option<String>,
    pub left_input: usize,
    pub right_input: usize,
    pub left_columns: Vec<u8>,
    pub right_columns: Vec<u8>,
    pub bank: BankConfig,
}

impl Config {
    /// Create configuration from run arguments
    pub fn from_run_args(args: &RunArgs) -> Result<Self, ConfigError> {
        if args.left_input == args.right_input {
            return Err(ConfigError::SameInput);
        }
        check_columns("left meter", &args.left_columns)?;
        check_columns("right meter", &args.right_columns)?;
        if let Some(&shared) = args
            .left_columns
            .iter()
            .find(|c| args.right_columns.contains(c))
        {
            return Err(ConfigError::SharedColumn(shared));
        }

        let bank = BankConfig {
            channel: MeterConfig {
                floor: args.channel_floor,
                ceiling: args.channel_ceiling,
                window: args.window,
                ..MeterConfig::channel()
            },
            master: MeterConfig {
                floor: args.master_floor,
                ceiling: args.master_ceiling,
                window: args.window,
                clip_threshold: Some(args.clip_threshold),
                ..MeterConfig::master()
            },
        };
        bank.validate()?;

        Ok(Config {
            device_name: args.device.clone(),
            left_input: args.left_input,
            right_input: args.right_input,
            left_columns: args.left_columns.clone(),
            right_columns: args.right_columns.clone(),
            bank,
        })
    }

    /// Pad layout for the configured columns
    pub fn layout(&self) -> BankLayout {
        BankLayout::for_columns(&self.left_columns, &self.right_columns)
    }

    /// Number of device input channels needed to reach both inputs
    pub fn input_channels(&self) -> u16 {
        let highest = self.left_input.max(self.right_input) + 1;
        u16::try_from(highest).unwrap_or(u16::MAX)
    }
}

fn check_columns(name: &'static str, columns: &[u8]) -> Result<(), ConfigError> {
    if columns.is_empty() {
        return Err(ConfigError::NoColumns(name));
    }
    match columns.iter().find(|&&c| c >= grid::COLUMNS) {
        Some(&column) => Err(ConfigError::ColumnOutOfRange(column, grid::COLUMNS)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;

    fn parse(extra: &[&str]) -> RunArgs {
        let argv = ["padmeter", "run"].iter().chain(extra).copied();
        match Args::parse_from(argv).command {
            Commands::Run(args) => args,
            Commands::List(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_defaults_match_reference_controller() {
        let config = Config::from_run_args(&parse(&[])).unwrap();
        assert_eq!(config.bank, BankConfig::default());
        assert_eq!(config.left_columns, vec![2, 3]);
        assert_eq!(config.right_columns, vec![6, 7]);
        assert_eq!(config.input_channels(), 2);
        assert_eq!(config.device_name, None);

        let layout = config.layout();
        assert_eq!(layout.left.len(), 2);
        assert_eq!(layout.master.len(), 5);
    }

    #[test]
    fn test_overrides_flow_into_bank_config() {
        let args = parse(&[
            "--device",
            "Scarlett",
            "--left-input",
            "2",
            "--right-input",
            "3",
            "--left-columns",
            "0",
            "--right-columns",
            "4,5",
            "--clip-threshold",
            "0.95",
            "--window",
            "4",
        ]);
        let config = Config::from_run_args(&args).unwrap();
        assert_eq!(config.device_name.as_deref(), Some("Scarlett"));
        assert_eq!(config.input_channels(), 4);
        assert_eq!(config.right_columns, vec![4, 5]);
        assert_eq!(config.bank.master.clip_threshold, Some(0.95));
        assert_eq!(config.bank.channel.window, 4);
        assert_eq!(config.bank.channel.clip_threshold, None);
    }

    #[test]
    fn test_column_validation() {
        let err = Config::from_run_args(&parse(&["--left-columns", "8"])).unwrap_err();
        assert_eq!(err, ConfigError::ColumnOutOfRange(8, 8));

        let err = Config::from_run_args(&parse(&["--right-columns", "3"])).unwrap_err();
        assert_eq!(err, ConfigError::SharedColumn(3));
    }

    #[test]
    fn test_same_input_rejected() {
        let err = Config::from_run_args(&parse(&["--right-input", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::SameInput);
    }

    #[test]
    fn test_scaling_validation_surfaces_setup_errors() {
        let err = Config::from_run_args(&parse(&["--channel-floor", "0.95"])).unwrap_err();
        assert!(matches!(err, ConfigError::Setup(SetupError::InvalidRange { .. })));

        let err = Config::from_run_args(&parse(&["--clip-threshold", "1.5"])).unwrap_err();
        assert_eq!(err, ConfigError::Setup(SetupError::InvalidClipThreshold(1.5)));

        let err = Config::from_run_args(&parse(&["--window", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::Setup(SetupError::ZeroWindow));
    }
}
