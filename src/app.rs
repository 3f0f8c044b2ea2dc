//! Main application logic and orchestration

use crate::audio;
use crate::bank::MeterBank;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::meter::Channel;
use crate::source::{InputTap, Sample};
use crate::state::AppState;
use crate::surface::GridSurface;
use crate::ui;
use cpal::traits::StreamTrait;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Main application struct
pub struct App {
    config: Config,
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
}

/// Exit codes for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    UserExit = 1, // Ctrl+C
    Error = 2,    // Actual application error
}

/// Result type that includes user exit information
pub type AppRunResult = Result<(), AppError>;

/// Extended result that tracks exit reason
pub struct RunResult {
    pub result: AppRunResult,
    pub exit_code: ExitCode,
}

impl App {
    /// Initialize the application with configuration
    pub fn new(config: Config) -> AppResult<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(App { config, terminal })
    }

    /// Run the metering loop until the user quits, then restore the terminal
    pub async fn run(mut self) -> RunResult {
        let outcome = self.meter().await;

        if let Err(e) = self.cleanup() {
            warn!("Failed to restore terminal: {}", e);
        }

        match outcome {
            Ok(exit_code) => RunResult {
                result: Ok(()),
                exit_code,
            },
            Err(e) => RunResult {
                result: Err(e),
                exit_code: ExitCode::Error,
            },
        }
    }

    /// Open the device, build the bank and pump samples into it. The bank is
    /// torn down whatever way the loop ends.
    async fn meter(&mut self) -> AppResult<ExitCode> {
        let (device, audio_config) = audio::setup_audio_device(
            self.config.device_name.as_deref(),
            self.config.input_channels(),
        )?;

        let (mut tap, mut samples) = InputTap::new();
        let mut bank = MeterBank::new(&self.config.bank, self.config.layout(), &mut tap)?;
        let mut app_state = AppState::new(audio_config.device_name.clone());

        let callback = audio::create_audio_callback(
            tap.publisher(),
            audio_config.channels,
            self.config.left_input,
            self.config.right_input,
        );
        let stream_config = cpal::StreamConfig {
            channels: audio_config.channels,
            sample_rate: cpal::SampleRate(audio_config.sample_rate),
            buffer_size: crate::constants::audio::BUFFER_SIZE,
        };

        let outcome = match audio::build_audio_stream(&device, &stream_config, callback) {
            Ok(stream) => match stream.play() {
                Ok(()) => {
                    self.pump(&mut samples, &mut bank, &mut app_state).await
                }
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        bank.teardown(&mut tap);
        if Channel::ALL.iter().any(|&c| tap.is_subscribed(c)) {
            warn!("Sample subscriptions still active after teardown");
        }
        info!("Stopped after {} clip warning(s)", bank.clip_count());
        outcome
    }

    async fn pump(
        &mut self,
        samples: &mut UnboundedReceiver<Sample>,
        bank: &mut MeterBank,
        app_state: &mut AppState,
    ) -> AppResult<ExitCode> {
        let mut surface = GridSurface::new();
        for pad in self.config.layout().host_pads() {
            surface.map(pad, crate::constants::ui::HOST_PAD_COLOR);
        }
        let mut interval = tokio::time::interval(Duration::from_millis(
            crate::constants::ui::UPDATE_INTERVAL_MS,
        ));

        loop {
            tokio::select! {
                Some(sample) = samples.recv() => {
                    app_state.observe(&sample);
                    bank.ingest(sample.channel, sample.level, &mut surface);
                }
                _ = interval.tick() => {
                    app_state.sync(bank);
                    self.terminal.draw(|f| ui::render_ui(f, app_state, &surface))?;
                    if let Some(exit_code) = poll_keys()? {
                        return Ok(exit_code);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    return Ok(ExitCode::UserExit);
                }
            }
        }
    }

    /// Clean up terminal state
    fn cleanup(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Drain pending key presses. Escape or q quits, Ctrl+C counts as a user exit.
fn poll_keys() -> AppResult<Option<ExitCode>> {
    while crossterm::event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = crossterm::event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(Some(ExitCode::Success)),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(Some(ExitCode::UserExit));
                }
                _ => {}
            }
        }
    }
    Ok(None)
}
