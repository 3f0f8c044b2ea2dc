//! Level-to-LED pattern rendering

/// Colours a pad can be asked to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LedColor {
    #[default]
    Off,
    On,
    Caution,
    Warning,
}

/// How lit slots near the top of a sequence are coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tiering {
    /// Slot 0 warning, slot 1 caution, the rest on. Used for channel columns.
    Graded,
    /// Every lit slot on. Used for the master bar.
    Flat,
}

/// Colour of slot `index` in a sequence of `len` slots showing `level`.
///
/// Slot 0 is the top of a column (or the first scene of the bar); a level of
/// `n` lights the last `n` slots.
pub fn slot_color(index: usize, len: usize, level: u8, tiering: Tiering) -> LedColor {
    if index + usize::from(level) < len {
        return LedColor::Off;
    }
    match tiering {
        Tiering::Flat => LedColor::On,
        Tiering::Graded => match index {
            0 => LedColor::Warning,
            1 => LedColor::Caution,
            _ => LedColor::On,
        },
    }
}

/// Pair every position with its colour at `level`
pub fn render<P: Copy>(
    positions: &[P],
    level: u8,
    tiering: Tiering,
) -> impl Iterator<Item = (P, LedColor)> + '_ {
    let len = positions.len();
    positions
        .iter()
        .enumerate()
        .map(move |(index, &pad)| (pad, slot_color(index, len, level, tiering)))
}

/// Clip warning: every position forced to the warning colour
pub fn render_clip<P: Copy>(positions: &[P]) -> impl Iterator<Item = (P, LedColor)> + '_ {
    positions.iter().map(|&pad| (pad, LedColor::Warning))
}
