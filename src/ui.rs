//! UI rendering of the emulated controller

use crate::constants::{grid, ui};
use crate::meter::Channel;
use crate::render::LedColor;
use crate::state::AppState;
use crate::surface::{GridSurface, PadId};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Terminal colour for a pad colour
pub fn led_style(color: LedColor) -> Style {
    let fg = match color {
        LedColor::Off => Color::DarkGray,
        LedColor::On => Color::Green,
        LedColor::Caution => Color::Rgb(255, 140, 0),
        LedColor::Warning => Color::Red,
    };
    Style::default().fg(fg)
}

fn pad_span(surface: &GridSurface, pad: PadId) -> Span<'static> {
    let cell = format!("{:<width$}", "██", width = ui::PAD_WIDTH);
    Span::styled(cell, led_style(surface.color(pad)))
}

/// One row of track buttons (stop, select, ...) with a label
fn button_row(surface: &GridSurface, label: &'static str, pad: fn(u8) -> PadId) -> Line<'static> {
    let mut spans: Vec<Span> = (0..grid::COLUMNS).map(|c| pad_span(surface, pad(c))).collect();
    spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
    Line::from(spans)
}

/// Lines drawing the whole controller: clip grid with the scene column,
/// then the track button rows
pub fn controller_lines(surface: &GridSurface) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = (0..grid::ROWS)
        .map(|row| {
            let mut spans: Vec<Span> = (0..grid::COLUMNS)
                .map(|column| pad_span(surface, PadId::Clip { row, column }))
                .collect();
            spans.push(Span::raw(" "));
            spans.push(pad_span(surface, PadId::SceneLaunch(row)));
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(button_row(surface, "stop", PadId::TrackStop));
    lines.push(button_row(surface, "select", PadId::Select));
    lines.push(button_row(surface, "mute", PadId::Mute));
    lines.push(button_row(surface, "solo", PadId::Solo));
    lines.push(button_row(surface, "arm", PadId::Arm));
    lines
}

/// Title line of the controller block
pub fn meter_title(state: &AppState) -> String {
    let mut title = format!(
        "L {:>2} ({:.1} dB)  R {:>2} ({:.1} dB)  Master {} ({:.1} dB)",
        state.level(Channel::Left),
        state.raw_db(Channel::Left),
        state.level(Channel::Right),
        state.raw_db(Channel::Right),
        state.level(Channel::Master),
        state.raw_db(Channel::Master),
    );
    if state.clip_count > 0 {
        title.push_str(&format!("  clips: {}", state.clip_count));
    }
    title
}

/// Render the complete UI
pub fn render_ui(f: &mut Frame, state: &AppState, surface: &GridSurface) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(size);

    // Device
    let device_block = Block::default().title("Device").borders(Borders::ALL);
    let device_text = Paragraph::new(state.device_name.as_str()).block(device_block);
    f.render_widget(device_text, chunks[0]);

    // Status
    let status_block = Block::default().title("Status").borders(Borders::ALL);
    let status_line = if state.clipping {
        Line::from(Span::styled(
            "CLIPPING",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(state.status.as_str())
    };
    f.render_widget(Paragraph::new(status_line).block(status_block), chunks[1]);

    // Controller
    let controller = Paragraph::new(controller_lines(surface)).block(
        Block::default()
            .title(meter_title(state))
            .borders(Borders::ALL),
    );
    f.render_widget(controller, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_controller_lines_cover_grid_and_buttons() {
        let surface = GridSurface::new();
        let lines = controller_lines(&surface);
        // five clip rows, a spacer, five button rows
        assert_eq!(lines.len(), 11);
        // eight pads, spacer, scene pad
        assert_eq!(lines[0].spans.len(), 10);
        // eight pads and the label
        assert_eq!(lines[6].spans.len(), 9);
    }

    #[test]
    fn test_pad_colours_follow_surface() {
        let mut surface = GridSurface::new();
        surface.set(PadId::Clip { row: 0, column: 2 }, LedColor::Warning, true);
        surface.set(PadId::Arm(7), LedColor::On, true);

        let lines = controller_lines(&surface);
        assert_eq!(lines[0].spans[2].style, led_style(LedColor::Warning));
        assert_eq!(lines[0].spans[3].style, led_style(LedColor::Off));
        assert_eq!(lines[10].spans[7].style, led_style(LedColor::On));
    }

    #[test]
    fn test_title_reports_clips() {
        let mut state = AppState::new("dev".to_string());
        assert!(!meter_title(&state).contains("clips"));
        state.clip_count = 2;
        assert!(meter_title(&state).ends_with("clips: 2"));
    }
}
