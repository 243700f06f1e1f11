/*
 * Custom-drawn progress bar and password strength meter. Both are value
 * surfaces: the value lives in the descriptor, `set_value` stores it and
 * posts a value-changed message, and the subclass procedure repaints.
 */

use crate::controls::accent_for;
use crate::descriptor::ControlSnapshot;
use crate::services::DrawingService;
use crate::styling_primitives::{Color, Theme};
use crate::types::{Rect, SurfaceHandle};

pub(crate) const STRENGTH_LEVELS: i32 = 4;
const SEGMENT_GAP: i32 = 3;

const STRENGTH_WEAK: Color = Color::rgb(0xD9, 0x53, 0x4F);
const STRENGTH_FAIR: Color = Color::rgb(0xF0, 0xAD, 0x4E);
const STRENGTH_GOOD: Color = Color::rgb(0xE6, 0xD2, 0x4A);

/// Width of the filled part of a bar `width` wide for `value` within `range`.
pub(crate) fn filled_width(width: i32, value: i32, range: (i32, i32)) -> i32 {
    let (min, max) = range;
    if max <= min || width <= 0 {
        return 0;
    }
    let value = value.clamp(min, max);
    ((value - min) as i64 * width as i64 / (max - min) as i64) as i32
}

pub(crate) fn paint_progress(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    drawing.fill_rect(surface, rect, theme.input_background);
    let fill = filled_width(rect.width(), control.data.value, control.data.range);
    if fill > 0 {
        let bar = Rect::new(rect.left, rect.top, rect.left + fill, rect.bottom);
        drawing.fill_rect(surface, bar, accent_for(control, theme));
    }
    drawing.frame_rect(surface, rect, theme.border);
}

pub(crate) fn strength_color(level: i32, theme: &Theme) -> Color {
    match level {
        ..=1 => STRENGTH_WEAK,
        2 => STRENGTH_FAIR,
        3 => STRENGTH_GOOD,
        _ => theme.accent,
    }
}

/// Segment rectangles of the strength meter, left to right.
pub(crate) fn strength_segments(rect: Rect) -> Vec<Rect> {
    let total_gap = SEGMENT_GAP * (STRENGTH_LEVELS - 1);
    let segment = ((rect.width() - total_gap) / STRENGTH_LEVELS).max(0);
    (0..STRENGTH_LEVELS)
        .map(|index| {
            let left = rect.left + index * (segment + SEGMENT_GAP);
            Rect::new(left, rect.top, left + segment, rect.bottom)
        })
        .collect()
}

/*
 * Strength is a level from 0 (empty) to STRENGTH_LEVELS; filled segments take
 * the color of the current level.
 */
pub(crate) fn paint_strength(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    let level = control.data.value.clamp(0, STRENGTH_LEVELS);
    let filled = strength_color(level, theme);
    for (index, segment) in strength_segments(rect).into_iter().enumerate() {
        let color = if (index as i32) < level {
            filled
        } else {
            theme.input_background
        };
        drawing.fill_rect(surface, segment, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_proportional_and_clamped() {
        assert_eq!(filled_width(200, 50, (0, 100)), 100);
        assert_eq!(filled_width(200, 150, (0, 100)), 200);
        assert_eq!(filled_width(200, -5, (0, 100)), 0);
        assert_eq!(filled_width(200, 15, (10, 20)), 100);
    }

    #[test]
    fn degenerate_range_draws_nothing() {
        assert_eq!(filled_width(200, 5, (5, 5)), 0);
        assert_eq!(filled_width(200, 5, (10, 0)), 0);
    }

    #[test]
    fn strength_segments_share_width_evenly() {
        let segments = strength_segments(Rect::new(0, 0, 109, 8));
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Rect::new(0, 0, 25, 8));
        assert_eq!(segments[3], Rect::new(84, 0, 109, 8));
    }

    #[test]
    fn strength_colors_escalate() {
        let theme = Theme::default();
        assert_eq!(strength_color(1, &theme), STRENGTH_WEAK);
        assert_eq!(strength_color(4, &theme), theme.accent);
    }
}
