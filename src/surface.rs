//! Addressable pads of a clip-launch controller

use crate::constants::grid;
use crate::render::LedColor;
use log::trace;
use std::collections::HashMap;

/// One illuminated button on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadId {
    Clip { row: u8, column: u8 },
    TrackStop(u8),
    Select(u8),
    Mute(u8),
    Solo(u8),
    Arm(u8),
    SceneLaunch(u8),
}

/// Receiver of pad colour commands
pub trait Surface {
    /// Set a pad's colour. `force` overrides whatever the host has mapped
    /// onto the pad.
    fn set(&mut self, pad: PadId, color: LedColor, force: bool);

    /// Ask the host to repaint what it normally shows. Called once when a
    /// clip warning ends.
    fn redisplay(&mut self);
}

/// Ten pads of one track column, top to bottom: the clip cells, then the
/// track stop, select, mute, solo and arm buttons
pub fn channel_column(column: u8) -> Vec<PadId> {
    let mut pads: Vec<PadId> = (0..grid::ROWS).map(|row| PadId::Clip { row, column }).collect();
    pads.extend([
        PadId::TrackStop(column),
        PadId::Select(column),
        PadId::Mute(column),
        PadId::Solo(column),
        PadId::Arm(column),
    ]);
    pads
}

/// Scene launch buttons, one per clip row
pub fn scene_bar() -> Vec<PadId> {
    (0..grid::ROWS).map(PadId::SceneLaunch).collect()
}

/// Every clip cell, row by row
pub fn clip_grid() -> Vec<PadId> {
    (0..grid::ROWS)
        .flat_map(|row| (0..grid::COLUMNS).map(move |column| PadId::Clip { row, column }))
        .collect()
}

/// In-memory controller used by the terminal display
#[derive(Debug, Default)]
pub struct GridSurface {
    pads: HashMap<PadId, LedColor>,
    host: HashMap<PadId, LedColor>,
    redisplays: usize,
}

impl GridSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand a pad to the host. Unforced sends no longer reach it and
    /// `redisplay` restores `color`.
    pub fn map(&mut self, pad: PadId, color: LedColor) {
        self.host.insert(pad, color);
        self.pads.insert(pad, color);
    }

    pub fn color(&self, pad: PadId) -> LedColor {
        self.pads.get(&pad).copied().unwrap_or_default()
    }

    pub fn redisplay_count(&self) -> usize {
        self.redisplays
    }
}

impl Surface for GridSurface {
    fn set(&mut self, pad: PadId, color: LedColor, force: bool) {
        if !force && self.host.contains_key(&pad) {
            trace!("{:?} is host mapped, dropping {:?}", pad, color);
            return;
        }
        self.pads.insert(pad, color);
    }

    fn redisplay(&mut self) {
        self.redisplays += 1;
        self.pads.clone_from(&self.host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_column_layout() {
        let column = channel_column(2);
        assert_eq!(column.len(), 10);
        assert_eq!(column[0], PadId::Clip { row: 0, column: 2 });
        assert_eq!(column[4], PadId::Clip { row: 4, column: 2 });
        assert_eq!(column[5], PadId::TrackStop(2));
        assert_eq!(column[9], PadId::Arm(2));
    }

    #[test]
    fn test_scene_bar_and_clip_grid() {
        assert_eq!(scene_bar(), (0..5).map(PadId::SceneLaunch).collect::<Vec<_>>());
        let grid = clip_grid();
        assert_eq!(grid.len(), 40);
        assert_eq!(grid[8], PadId::Clip { row: 1, column: 0 });
    }

    #[test]
    fn test_unforced_send_skips_mapped_pad() {
        let mut surface = GridSurface::new();
        let scene = PadId::SceneLaunch(0);
        surface.map(scene, LedColor::Caution);

        surface.set(scene, LedColor::On, false);
        assert_eq!(surface.color(scene), LedColor::Caution);

        surface.set(scene, LedColor::Warning, true);
        assert_eq!(surface.color(scene), LedColor::Warning);
    }

    #[test]
    fn test_redisplay_restores_host_view() {
        let mut surface = GridSurface::new();
        let mapped = PadId::Clip { row: 0, column: 0 };
        let free = PadId::Arm(3);
        surface.map(mapped, LedColor::On);

        surface.set(mapped, LedColor::Warning, true);
        surface.set(free, LedColor::Warning, true);
        surface.redisplay();

        assert_eq!(surface.color(mapped), LedColor::On);
        assert_eq!(surface.color(free), LedColor::Off);
        assert_eq!(surface.redisplay_count(), 1);
    }
}
