/*
 * Owner-drawn push buttons. The button face is a rounded rectangle in the
 * theme's button colors with hot/pressed/disabled variants; the caption is
 * measured and, when it does not fit, trimmed at a character boundary with a
 * trailing ellipsis before being centered. The same painter is used for the
 * buttons of customized system dialogs.
 */

use crate::controls::styling_handler::{ButtonState, button_palette};
use crate::controls::ControlEvent;
use crate::services::{DrawItem, DrawingService, TextFormat};
use crate::styling_primitives::{Color, Theme};
use crate::types::{ControlId, FontHandle, Rect, SurfaceHandle};

const ELLIPSIS: &str = "...";
const TEXT_PADDING: i32 = 6;

/*
 * Translates a BN_CLICKED notification into a `ControlEvent::Clicked`.
 */
pub(crate) fn handle_bn_clicked(control_id: ControlId) -> ControlEvent {
    log::debug!("ButtonHandler: BN_CLICKED for ID {}", control_id.raw());
    ControlEvent::Clicked(control_id)
}

/*
 * Returns `text` unchanged when it fits in `max_width`; otherwise the longest
 * prefix (cut on a char boundary) that fits together with an ellipsis. If not
 * even the ellipsis fits, the ellipsis alone is returned so the button still
 * shows that it has a caption.
 */
pub(crate) fn fit_text(text: &str, max_width: i32, measure: impl Fn(&str) -> i32) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }
    let boundaries: Vec<usize> = text.char_indices().map(|(index, _)| index).collect();
    for &end in boundaries.iter().rev() {
        let candidate = format!("{}{ELLIPSIS}", text[..end].trim_end());
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// The rectangle a caption of `text_width` x `text_height` is centered into.
pub(crate) fn centered_text_rect(bounds: Rect, text_width: i32, text_height: i32) -> Rect {
    let x = bounds.left + (bounds.width() - text_width) / 2;
    let y = bounds.top + (bounds.height() - text_height) / 2;
    Rect::from_origin_size(x, y, text_width, text_height)
}

pub(crate) fn state_from_draw_item(item: &DrawItem, hot: bool) -> ButtonState {
    ButtonState {
        hot: hot || item.state.hot,
        pressed: item.state.selected,
        disabled: item.state.disabled,
        focused: item.state.focused,
    }
}

/*
 * Paints a complete button face. `base` and `text_color` are the resolved
 * normal-state colors; the state variants are derived from them.
 */
#[allow(clippy::too_many_arguments)]
pub(crate) fn paint_button(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    caption: &str,
    font: Option<FontHandle>,
    theme: &Theme,
    base: Color,
    text_color: Color,
    state: ButtonState,
) {
    let palette = button_palette(theme, base, text_color, state);

    // The parent background shows through the rounded corners.
    drawing.fill_rect(surface, rect, theme.background);
    drawing.round_rect(surface, rect, theme.button_corner_radius, palette.fill, palette.border);

    if caption.is_empty() {
        return;
    }
    let available = rect.inset(TEXT_PADDING, 0);
    let fitted = fit_text(caption, available.width(), |candidate| {
        drawing.measure_text(surface, candidate, font).width
    });
    let measured = drawing.measure_text(surface, &fitted, font);
    let mut text_rect = centered_text_rect(available, measured.width, measured.height);
    if state.pressed {
        text_rect = text_rect.offset(1, 1);
    }
    drawing.draw_text(surface, &fitted, text_rect, palette.text, font, TextFormat::centered());
}
