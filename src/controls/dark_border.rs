/*
 * Themed border painting for controls that have a system-drawn 3D sunken edge
 * (2px: dark top-left, light bottom-right). The subclass procedure lets the
 * native code paint first and then covers the edge with a uniform frame in
 * the theme's border color.
 */

use crate::controls::MessageContext;
use crate::types::Rect;

/*
 * Paints a uniform 2px border over the full window rect. Uses a whole-window
 * surface so both client and non-client areas are covered.
 */
pub(crate) fn paint_themed_frame(ctx: &MessageContext<'_>) {
    let runtime = ctx.services.runtime.as_ref();
    let Ok(window_rect) = runtime.window_rect(ctx.handle) else {
        return;
    };
    let (width, height) = (window_rect.width(), window_rect.height());
    if width <= 2 || height <= 2 {
        return;
    }
    let Some(surface) = runtime.window_surface(ctx.handle) else {
        return;
    };
    let color = ctx.control.style.border_color.unwrap_or(ctx.theme.border);
    let outer = Rect::new(0, 0, width, height);
    ctx.services.drawing.frame_rect(surface, outer, color);
    // Inner 1px border covers the second edge pixel.
    ctx.services.drawing.frame_rect(surface, outer.inset(1, 1), color);
    runtime.release_surface(ctx.handle, surface);
}
