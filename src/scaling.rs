/*
 * Coordinate scaling between logical units (laid out against a 96 DPI
 * reference) and physical pixels at the current display density.
 *
 * Positions and sizes are rounded independently and the far edges are derived
 * from them, so a control's width never drifts by one pixel depending on
 * where it happens to sit. `unscale` divides by the same factor; the round
 * trip is exact at factor 1.0 and lossy up to integer rounding otherwise.
 */

use crate::types::Rect;

pub const REFERENCE_DPI: u32 = 96;
const POINTS_PER_INCH: f64 = 72.0;

#[inline]
fn round_half_up(value: f64) -> i32 {
    (0.5 + value).floor() as i32
}

/// Scales a single logical length by `factor`.
pub fn scale_value(value: i32, factor: f64) -> i32 {
    round_half_up(value as f64 * factor)
}

/// Converts a single physical length back into logical units.
pub fn unscale_value(value: i32, factor: f64) -> i32 {
    round_half_up(value as f64 / factor)
}

pub fn scale(rect: Rect, factor: f64) -> Rect {
    let left = scale_value(rect.left, factor);
    let top = scale_value(rect.top, factor);
    let width = scale_value(rect.width(), factor);
    let height = scale_value(rect.height(), factor);
    Rect::from_origin_size(left, top, width, height)
}

pub fn unscale(rect: Rect, factor: f64) -> Rect {
    let left = unscale_value(rect.left, factor);
    let top = unscale_value(rect.top, factor);
    let width = unscale_value(rect.width(), factor);
    let height = unscale_value(rect.height(), factor);
    Rect::from_origin_size(left, top, width, height)
}

/*
 * The display density a window is rendered at. Stored as the raw DPI so the
 * factor is always recomputed from the same integer and never accumulates
 * floating point error across DPI changes.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpiScale {
    dpi: u32,
}

impl DpiScale {
    pub fn new(dpi: u32) -> Self {
        if dpi == 0 {
            log::warn!("Scaling: DPI of 0 reported, falling back to {REFERENCE_DPI}.");
            return Self { dpi: REFERENCE_DPI };
        }
        Self { dpi }
    }

    pub fn dpi(self) -> u32 {
        self.dpi
    }

    pub fn factor(self) -> f64 {
        self.dpi as f64 / REFERENCE_DPI as f64
    }

    pub fn to_physical(self, logical: Rect) -> Rect {
        scale(logical, self.factor())
    }

    pub fn to_logical(self, physical: Rect) -> Rect {
        unscale(physical, self.factor())
    }

    pub fn length(self, logical: i32) -> i32 {
        scale_value(logical, self.factor())
    }
}

impl Default for DpiScale {
    fn default() -> Self {
        Self {
            dpi: REFERENCE_DPI,
        }
    }
}

/*
 * Logical font height for `point_size` at `dpi`. The negative sign asks the
 * font mapper to match on character height rather than cell height.
 */
pub fn font_pixel_height(point_size: i32, dpi: u32) -> i32 {
    -((point_size as f64 * dpi as f64 / POINTS_PER_INCH).round() as i32)
}
