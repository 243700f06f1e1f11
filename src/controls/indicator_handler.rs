/*
 * Interactive custom-drawn indicators: toggle switch, rating and segmented
 * selector. All three hold a single integer value in their descriptor
 * (toggle 0/1, rating 1..=max, selector the selected item index) and change
 * it on click or on the arrow and space keys.
 */

use crate::controls::{ControlKind, HandlerResult, MessageContext, accent_for};
use crate::descriptor::ControlSnapshot;
use crate::services::{DrawingService, TextFormat};
use crate::styling_primitives::Theme;
use crate::types::{Message, Point, Rect, SurfaceHandle};

const VK_SPACE: usize = 0x20;
const VK_LEFT: usize = 0x25;
const VK_RIGHT: usize = 0x27;
const CELL_GAP: i32 = 4;

fn rating_max(control: &ControlSnapshot) -> i32 {
    control.data.range.1.max(1)
}

/// Rating picked by a click at `x` in a control `width` wide.
pub(crate) fn rating_from_x(x: i32, width: i32, max: i32) -> i32 {
    if width <= 0 {
        return 1;
    }
    let cell = (x.clamp(0, width - 1) as i64 * max as i64 / width as i64) as i32;
    (cell + 1).clamp(1, max)
}

/// Selector segment under `x`, or `None` when there are no items.
pub(crate) fn selector_index_from_x(x: i32, width: i32, count: usize) -> Option<usize> {
    if count == 0 || width <= 0 {
        return None;
    }
    let index = x.clamp(0, width - 1) as i64 * count as i64 / width as i64;
    Some(index as usize)
}

/*
 * The value a completed click produces, if any. Returns `None` when the
 * click leaves the value unchanged.
 */
pub(crate) fn value_from_click(ctx: &MessageContext<'_>, point: Point) -> Option<i32> {
    let control = ctx.control;
    let width = ctx
        .services
        .runtime
        .client_rect(ctx.handle)
        .map(|rect| rect.width())
        .unwrap_or(0);
    let current = control.data.value;
    let next = match control.kind {
        ControlKind::Toggle => Some(if current != 0 { 0 } else { 1 }),
        ControlKind::Rating => Some(rating_from_x(point.x, width, rating_max(control))),
        ControlKind::Selector => {
            selector_index_from_x(point.x, width, control.data.items.len()).map(|i| i as i32)
        }
        _ => None,
    };
    next.filter(|value| *value != current)
}

pub(crate) fn handle_key(ctx: &MessageContext<'_>, message: Message) -> HandlerResult {
    let control = ctx.control;
    let current = control.data.value;
    let next = match (control.kind, message.wparam) {
        (ControlKind::Toggle, VK_SPACE) => Some(if current != 0 { 0 } else { 1 }),
        (ControlKind::Rating, VK_LEFT) => Some((current - 1).max(1)),
        (ControlKind::Rating, VK_RIGHT) => Some((current + 1).min(rating_max(control))),
        (ControlKind::Selector, VK_LEFT) => Some((current - 1).max(0)),
        (ControlKind::Selector, VK_RIGHT) if !control.data.items.is_empty() => {
            Some((current + 1).min(control.data.items.len() as i32 - 1))
        }
        _ => None,
    };
    match next {
        Some(value) if value != current => {
            ctx.services.runtime.invalidate(ctx.handle);
            HandlerResult::handled(0).with_value(control.id, value)
        }
        Some(_) => HandlerResult::handled(0),
        None => HandlerResult::forward(),
    }
}

pub(crate) fn paint_toggle(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    let on = control.data.value != 0;
    let track_width = (rect.height() * 2).min(rect.width());
    let track = Rect::new(rect.left, rect.top, rect.left + track_width, rect.bottom);
    let track_fill = if on { accent_for(control, theme) } else { theme.input_background };
    let radius = track.height();
    drawing.round_rect(surface, track, radius, track_fill, theme.border);

    let knob_size = (track.height() - 4).max(0);
    let knob_left = if on {
        track.right - 2 - knob_size
    } else {
        track.left + 2
    };
    let knob = Rect::from_origin_size(knob_left, track.top + 2, knob_size, knob_size);
    let knob_fill = if control.visual.hot {
        theme.title_text
    } else {
        theme.text
    };
    drawing.round_rect(surface, knob, knob_size, knob_fill, knob_fill);

    if !control.text.is_empty() {
        let label = Rect::new(track.right + CELL_GAP * 2, rect.top, rect.right, rect.bottom);
        drawing.draw_text(surface, &control.text, label, theme.text, control.font, TextFormat::left());
    }
}

pub(crate) fn paint_rating(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    let max = rating_max(control);
    let cell = ((rect.width() - CELL_GAP * (max - 1)) / max).max(0).min(rect.height());
    let accent = accent_for(control, theme);
    for index in 0..max {
        let left = rect.left + index * (cell + CELL_GAP);
        let cell_rect = Rect::from_origin_size(left, rect.top + (rect.height() - cell) / 2, cell, cell);
        let fill = if index < control.data.value {
            accent
        } else {
            theme.input_background
        };
        drawing.round_rect(surface, cell_rect, cell / 3, fill, theme.border);
    }
}

pub(crate) fn paint_selector(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    theme: &Theme,
) {
    let items = &control.data.items;
    if items.is_empty() {
        drawing.frame_rect(surface, rect, theme.border);
        return;
    }
    let count = items.len() as i32;
    let segment = rect.width() / count;
    for (index, item) in items.iter().enumerate() {
        let left = rect.left + index as i32 * segment;
        let right = if index as i32 == count - 1 { rect.right } else { left + segment };
        let segment_rect = Rect::new(left, rect.top, right, rect.bottom);
        let selected = index as i32 == control.data.value;
        let (fill, text) = if selected {
            (accent_for(control, theme), theme.background)
        } else {
            (theme.input_background, theme.text)
        };
        drawing.fill_rect(surface, segment_rect, fill);
        drawing.frame_rect(surface, segment_rect, theme.border);
        drawing.draw_text(surface, item, segment_rect, text, control.font, TextFormat {
            end_ellipsis: true,
            ..TextFormat::centered()
        });
    }
}
