use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait};
use dialoguer::{Select, theme::ColorfulTheme};
use env_logger::{Env, Target};
use log::info;
use padmeter::app::{self, ExitCode};
use padmeter::config::{self, Args, Commands};
use std::fs::File;
use std::path::Path;

fn init_logging(default_filter: &str, log_file: Option<&Path>) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format_timestamp_millis();
    if let Some(path) = log_file {
        builder.target(Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let devices = host.input_devices()?;

    let device_list: Vec<String> = devices.filter_map(|d| d.name().ok()).collect();

    if device_list.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    // Interactive selection
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an audio input device")
        .items(&device_list)
        .default(0)
        .interact()?;

    println!("{}", device_list[selection]);

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => {
            // The display owns the terminal, so without a log file stay quiet
            let default_filter = if run_args.log_file.is_some() { "info" } else { "off" };
            if let Err(e) = init_logging(default_filter, run_args.log_file.as_deref()) {
                eprintln!("Cannot open log file: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }

            let config = match config::Config::from_run_args(&run_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };
            info!("{} v{} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

            match app::App::new(config) {
                Ok(app) => {
                    let run_result = app.run().await;
                    if let Err(e) = run_result.result {
                        eprintln!("Application error: {}", e);
                    }
                    std::process::exit(run_result.exit_code as i32);
                }
                Err(e) => {
                    eprintln!("Setup error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            }
        }
        Commands::List(_) => {
            if let Err(e) = init_logging("warn", None) {
                eprintln!("Logging unavailable: {}", e);
            }
            if let Err(e) = list_devices() {
                eprintln!("Error listing devices: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
    }
}
