/*
 * Owner-drawn bar chart. Series values are scaled against the largest value
 * in the series; negative values are drawn as empty bars. The chart is a
 * generic surface: it repaints on resize and on value change like every
 * other custom-drawn kind.
 */

use crate::controls::accent_for;
use crate::descriptor::ControlSnapshot;
use crate::services::DrawingService;
use crate::styling_primitives::Theme;
use crate::types::{Rect, SurfaceHandle};

const PLOT_MARGIN: i32 = 4;
const BAR_GAP: i32 = 2;

/*
 * Pure layout of the bars inside `plot`. Each bar gets an equal slot; bars
 * are bottom-aligned and at least zero tall.
 */
pub(crate) fn bar_rects(plot: Rect, series: &[i32]) -> Vec<Rect> {
    if series.is_empty() || plot.is_empty() {
        return Vec::new();
    }
    let max = series.iter().copied().max().unwrap_or(0).max(1) as i64;
    let count = series.len() as i32;
    let slot = plot.width() / count;
    series
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let value = (*value).max(0) as i64;
            let height = (value * plot.height() as i64 / max) as i32;
            let left = plot.left + index as i32 * slot;
            Rect::new(
                left + BAR_GAP / 2,
                plot.bottom - height,
                left + slot - BAR_GAP / 2,
                plot.bottom,
            )
        })
        .collect()
}

pub(crate) fn paint_chart(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    let plot = rect.inset(PLOT_MARGIN, PLOT_MARGIN);
    drawing.frame_rect(surface, rect, theme.border);
    let accent = accent_for(control, theme);
    for bar in bar_rects(plot, &control.data.series) {
        if !bar.is_empty() {
            drawing.fill_rect(surface, bar, accent);
        }
    }
}
