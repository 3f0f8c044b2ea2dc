//! The meter bank: three channel meters, the clip state machine and the
//! arbitration between normal and clip-warning rendering

use crate::error::SetupError;
use crate::meter::{Channel, ChannelMeter, ClipSignal, MeterConfig};
use crate::render::{self, Tiering};
use crate::source::SampleSource;
use crate::surface::{self, PadId, Surface};
use log::{debug, info};

/// Global clip state of a bank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClipState {
    #[default]
    Normal,
    Clipping,
}

/// Side effect of a clip transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipEffect {
    /// Paint the whole display in the warning colour
    FlashWarning,
    /// Hand the display back to the host
    RequestRedisplay,
}

impl ClipState {
    pub fn on_signal(self, signal: ClipSignal) -> (ClipState, Option<ClipEffect>) {
        match (self, signal) {
            (ClipState::Normal, ClipSignal::Asserted) => {
                (ClipState::Clipping, Some(ClipEffect::FlashWarning))
            }
            (ClipState::Clipping, ClipSignal::Cleared) => {
                (ClipState::Normal, Some(ClipEffect::RequestRedisplay))
            }
            (state, _) => (state, None),
        }
    }

    pub fn is_clipping(self) -> bool {
        self == ClipState::Clipping
    }
}

/// Scaling for the three meters. Left and right share one configuration; any
/// clip threshold on it is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankConfig {
    pub channel: MeterConfig,
    pub master: MeterConfig,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            channel: MeterConfig::channel(),
            master: MeterConfig::master(),
        }
    }
}

impl BankConfig {
    pub fn validate(&self) -> Result<(), SetupError> {
        self.channel.validate()?;
        self.master.validate()
    }
}

/// Positions the bank draws on. Each channel column must hold exactly as
/// many pads as its meter has steps, first pad at the top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankLayout {
    pub left: Vec<Vec<PadId>>,
    pub right: Vec<Vec<PadId>>,
    pub master: Vec<PadId>,
    /// Extra pads painted during a clip warning
    pub clip_area: Vec<PadId>,
}

impl BankLayout {
    /// Standard layout: channel columns on the given track columns, the
    /// master bar on the scene launch buttons, the whole clip grid flashing
    pub fn for_columns(left: &[u8], right: &[u8]) -> Self {
        Self {
            left: left.iter().map(|&c| surface::channel_column(c)).collect(),
            right: right.iter().map(|&c| surface::channel_column(c)).collect(),
            master: surface::scene_bar(),
            clip_area: surface::clip_grid(),
        }
    }

    /// Clip area pads that no channel column draws on. These stay with the
    /// host outside a clip warning.
    pub fn host_pads(&self) -> Vec<PadId> {
        self.clip_area
            .iter()
            .filter(|pad| !self.left.iter().chain(&self.right).flatten().any(|p| p == *pad))
            .copied()
            .collect()
    }
}

#[derive(Debug)]
struct Display {
    columns: Vec<Vec<PadId>>,
    tiering: Tiering,
    force: bool,
}

impl Display {
    fn new(
        channel: Channel,
        columns: Vec<Vec<PadId>>,
        steps: u8,
        tiering: Tiering,
        force: bool,
    ) -> Result<Self, SetupError> {
        if columns.is_empty() {
            return Err(SetupError::EmptyMatrix {
                channel: channel.name(),
            });
        }
        if let Some((column, found)) = columns
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != usize::from(steps))
        {
            return Err(SetupError::MatrixSize {
                channel: channel.name(),
                column,
                found,
                expected: usize::from(steps),
            });
        }
        Ok(Self {
            columns,
            tiering,
            force,
        })
    }

    fn pads(&self) -> impl Iterator<Item = &PadId> {
        self.columns.iter().flatten()
    }
}

/// Owns the left, right and master meters and decides what reaches the
/// surface. While clipping, only the clip warning is drawn.
#[derive(Debug)]
pub struct MeterBank {
    meters: [ChannelMeter; 3],
    displays: [Display; 3],
    clip_area: Vec<PadId>,
    state: ClipState,
    // channels that must repaint on their next sample even without a level
    // change; overrides edge-triggering after construction and after a clear
    stale: [bool; 3],
    clip_count: u64,
}

impl MeterBank {
    /// Build the bank and subscribe every meter to `source`. Layout and
    /// scaling are checked before anything is subscribed.
    pub fn new(
        config: &BankConfig,
        layout: BankLayout,
        source: &mut impl SampleSource,
    ) -> Result<Self, SetupError> {
        let channel_config = MeterConfig {
            clip_threshold: None,
            ..config.channel
        };
        let mut meters = [
            ChannelMeter::new(Channel::Left, &channel_config)?,
            ChannelMeter::new(Channel::Right, &channel_config)?,
            ChannelMeter::new(Channel::Master, &config.master)?,
        ];

        let BankLayout {
            left,
            right,
            master,
            clip_area,
        } = layout;
        let displays = [
            Display::new(Channel::Left, left, channel_config.steps, Tiering::Graded, true)?,
            Display::new(Channel::Right, right, channel_config.steps, Tiering::Graded, true)?,
            Display::new(Channel::Master, vec![master], config.master.steps, Tiering::Flat, false)?,
        ];

        for meter in &mut meters {
            meter.attach(source.subscribe(meter.channel()));
        }
        info!(
            "Meter bank ready: {} left / {} right columns, {}-step master",
            displays[0].columns.len(),
            displays[1].columns.len(),
            config.master.steps
        );

        Ok(Self {
            meters,
            displays,
            clip_area,
            state: ClipState::Normal,
            stale: [true; 3],
            clip_count: 0,
        })
    }

    /// Process one raw reading for `channel`, drawing whatever changed
    pub fn ingest(&mut self, channel: Channel, raw: f32, surface: &mut impl Surface) {
        let index = channel.index();
        let update = self.meters[index].ingest(raw, self.state.is_clipping());

        if let Some(signal) = update.clip {
            let (next, effect) = self.state.on_signal(signal);
            self.state = next;
            match effect {
                Some(ClipEffect::FlashWarning) => {
                    self.clip_count += 1;
                    info!("Clipping (master {:.3})", raw);
                    self.flash_warning(surface);
                }
                Some(ClipEffect::RequestRedisplay) => {
                    info!("Clip cleared (master {:.3})", raw);
                    self.stale = [true; 3];
                    surface.redisplay();
                }
                None => {}
            }
        }

        if self.state.is_clipping() {
            return;
        }

        if let Some(level) = update.level {
            debug!("{} level {}", channel, level);
        }
        if update.level.is_some() || self.stale[index] {
            self.stale[index] = false;
            self.draw_channel(channel, surface);
        }
    }

    /// Release every sample subscription. Safe to call more than once.
    pub fn teardown(&mut self, source: &mut impl SampleSource) {
        let mut released = 0;
        for meter in &mut self.meters {
            if let Some(subscription) = meter.detach() {
                source.unsubscribe(subscription);
                released += 1;
            }
        }
        if released > 0 {
            info!("Meter bank released {} subscriptions", released);
        }
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    pub fn is_clipping(&self) -> bool {
        self.state.is_clipping()
    }

    /// Number of times the clip warning has been raised
    pub fn clip_count(&self) -> u64 {
        self.clip_count
    }

    pub fn meter(&self, channel: Channel) -> &ChannelMeter {
        &self.meters[channel.index()]
    }

    pub fn level(&self, channel: Channel) -> u8 {
        self.meter(channel).level()
    }

    fn draw_channel(&self, channel: Channel, surface: &mut impl Surface) {
        let index = channel.index();
        let display = &self.displays[index];
        let level = self.meters[index].level();
        for column in &display.columns {
            for (pad, color) in render::render(column, level, display.tiering) {
                surface.set(pad, color, display.force);
            }
        }
    }

    fn flash_warning(&self, surface: &mut impl Surface) {
        let pads: Vec<PadId> = self
            .displays
            .iter()
            .flat_map(Display::pads)
            .chain(&self.clip_area)
            .copied()
            .collect();
        for (pad, color) in render::render_clip(&pads) {
            surface.set(pad, color, true);
        }
    }
}
