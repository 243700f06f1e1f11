/*
 * Static image surface. A failed or missing image load leaves the control
 * blank (the background fill from the paint pass) instead of reporting an
 * error: images are cosmetic.
 */

use crate::descriptor::ControlSnapshot;
use crate::services::DrawingService;
use crate::styling_primitives::Theme;
use crate::types::{Rect, SurfaceHandle};

pub(crate) fn paint_image(
    drawing: &dyn DrawingService,
    surface: SurfaceHandle,
    rect: Rect,
    control: &ControlSnapshot,
    _theme: &Theme,
) {
    if let Some(image) = control.image {
        drawing.draw_image(surface, image, rect);
    }
}
