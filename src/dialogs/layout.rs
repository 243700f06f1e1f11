/*
 * Geometry of a customized dialog. With the native caption and frame
 * stripped, the framework draws its own title bar across the top of the
 * client area and a thin border around it, so every native child is pushed
 * down and inward to make room, and the dialog grows by the same amount.
 */

use crate::config::DialogConfig;
use crate::messages::*;
use crate::scaling::DpiScale;
use crate::types::{Point, Rect, Size};

/// Dialog chrome measurements in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DialogMetrics {
    pub title_bar_height: i32,
    pub border_width: i32,
    pub resize_margin: i32,
    pub icon_size: i32,
}

impl DialogMetrics {
    pub(crate) fn new(config: &DialogConfig, dpi: DpiScale) -> Self {
        Self {
            title_bar_height: dpi.length(config.title_bar_height),
            border_width: dpi.length(config.border_width).max(0),
            resize_margin: dpi.length(config.resize_margin).max(0),
            icon_size: dpi.length(config.caption_icon_size),
        }
    }

    /// The offset applied to every native child.
    pub(crate) fn child_offset(&self) -> (i32, i32) {
        (self.border_width, self.title_bar_height + self.border_width)
    }

    /// Bottom edge of the band that drags the dialog.
    pub(crate) fn caption_bottom(&self) -> i32 {
        self.title_bar_height + self.border_width
    }
}

/*
 * Hit-test for a point relative to the dialog's top-left corner. Resize edges
 * win over the caption when resizing is enabled; the caption is the band
 * from the top edge down through the title bar.
 */
pub(crate) fn hit_test(size: Size, point: Point, metrics: &DialogMetrics, resizable: bool) -> isize {
    if point.x < 0 || point.y < 0 || point.x >= size.width || point.y >= size.height {
        return HTNOWHERE;
    }
    if resizable {
        let margin = metrics.resize_margin;
        let left = point.x < margin;
        let right = point.x >= size.width - margin;
        let top = point.y < margin;
        let bottom = point.y >= size.height - margin;
        match (left, right, top, bottom) {
            (true, _, true, _) => return HTTOPLEFT,
            (_, true, true, _) => return HTTOPRIGHT,
            (true, _, _, true) => return HTBOTTOMLEFT,
            (_, true, _, true) => return HTBOTTOMRIGHT,
            (true, ..) => return HTLEFT,
            (_, true, ..) => return HTRIGHT,
            (_, _, true, _) => return HTTOP,
            (_, _, _, true) => return HTBOTTOM,
            _ => {}
        }
    }
    if point.y < metrics.caption_bottom() {
        HTCAPTION
    } else {
        HTCLIENT
    }
}

/// The natural size grown by the framework's title bar and border.
pub(crate) fn customized_size(natural: Size, metrics: &DialogMetrics) -> Size {
    Size::new(
        natural.width + metrics.border_width * 2,
        natural.height + metrics.title_bar_height + metrics.border_width * 2,
    )
}

/// `percent` of the work area in each dimension.
pub(crate) fn large_size(work_area: Rect, percent: i32) -> Size {
    let percent = percent.clamp(10, 100) as i64;
    Size::new(
        (work_area.width() as i64 * percent / 100) as i32,
        (work_area.height() as i64 * percent / 100) as i32,
    )
}

/*
 * Centres `size` on `owner` and pulls the result back inside the work area.
 * A dialog larger than the work area is pinned to its top-left corner.
 */
pub(crate) fn center_on(owner: Rect, size: Size, work_area: Rect) -> Rect {
    let mut left = owner.left + (owner.width() - size.width) / 2;
    let mut top = owner.top + (owner.height() - size.height) / 2;
    left = left.min(work_area.right - size.width).max(work_area.left);
    top = top.min(work_area.bottom - size.height).max(work_area.top);
    Rect::from_origin_size(left, top, size.width, size.height)
}

/// The title bar, in client coordinates of a dialog `width` wide.
pub(crate) fn caption_rect(width: i32, metrics: &DialogMetrics) -> Rect {
    let b = metrics.border_width;
    Rect::new(b, b, width - b, b + metrics.title_bar_height)
}

/// The caption icon, vertically centred at the left of the title bar.
pub(crate) fn icon_rect(caption: Rect, metrics: &DialogMetrics) -> Rect {
    let size = metrics.icon_size.min(caption.height());
    let pad = (caption.height() - size) / 2;
    Rect::from_origin_size(caption.left + pad.max(4), caption.top + pad, size, size)
}
