/*
 * GDI rendering. Surfaces are device contexts handed out by the runtime for
 * one paint pass; brushes and pens are created per call and deleted before
 * returning, except the background brushes answered to color queries, which
 * the control keeps using after the message returns and are therefore cached
 * per color for the lifetime of the service.
 */

use super::{colorref, from_rect};
use crate::services::{DrawingService, TextAlign, TextFormat};
use crate::styling_primitives::Color;
use crate::types::{FontHandle, ImageHandle, Rect, Size, SurfaceHandle};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;

use windows::Win32::{
    Foundation::SIZE,
    Graphics::Gdi::{
        BITMAP, CreateCompatibleDC, CreatePen, CreateSolidBrush, DT_CENTER, DT_END_ELLIPSIS, DT_LEFT,
        DT_NOPREFIX, DT_RIGHT, DT_SINGLELINE, DT_VCENTER, DeleteDC, DeleteObject, DrawTextW, FillRect,
        FrameRect, GetObjectW, GetTextExtentPoint32W, HBITMAP, HBRUSH, HDC, HGDIOBJ, PS_SOLID,
        RoundRect, SRCCOPY, SelectObject, SetBkColor, SetBkMode, SetTextColor, StretchBlt, TRANSPARENT,
    },
};

fn dc(surface: SurfaceHandle) -> HDC {
    HDC(surface.0 as *mut c_void)
}

#[derive(Default)]
pub struct GdiDrawing {
    color_brushes: RefCell<HashMap<Color, HBRUSH>>,
}

impl GdiDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Selects `font` into `hdc` for the duration of `f`, restoring the
     * previous selection afterwards.
     */
    fn with_font<R>(hdc: HDC, font: Option<FontHandle>, f: impl FnOnce() -> R) -> R {
        let previous = font.map(|font| unsafe { SelectObject(hdc, HGDIOBJ(font.0 as *mut c_void)) });
        let result = f();
        if let Some(previous) = previous {
            unsafe { SelectObject(hdc, previous) };
        }
        result
    }
}

impl Drop for GdiDrawing {
    fn drop(&mut self) {
        for (_, brush) in self.color_brushes.borrow_mut().drain() {
            unsafe { _ = DeleteObject(brush.into()) };
        }
    }
}

impl DrawingService for GdiDrawing {
    fn fill_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color) {
        unsafe {
            let brush = CreateSolidBrush(colorref(color));
            if brush.is_invalid() {
                return;
            }
            FillRect(dc(surface), &from_rect(rect), brush);
            _ = DeleteObject(brush.into());
        }
    }

    fn round_rect(&self, surface: SurfaceHandle, rect: Rect, radius: i32, fill: Color, border: Color) {
        let hdc = dc(surface);
        unsafe {
            let brush = CreateSolidBrush(colorref(fill));
            let pen = CreatePen(PS_SOLID, 1, colorref(border));
            let old_brush = SelectObject(hdc, brush.into());
            let old_pen = SelectObject(hdc, pen.into());
            let diameter = radius * 2;
            _ = RoundRect(hdc, rect.left, rect.top, rect.right, rect.bottom, diameter, diameter);
            SelectObject(hdc, old_pen);
            SelectObject(hdc, old_brush);
            _ = DeleteObject(pen.into());
            _ = DeleteObject(brush.into());
        }
    }

    fn frame_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color) {
        unsafe {
            let brush = CreateSolidBrush(colorref(color));
            if brush.is_invalid() {
                return;
            }
            FrameRect(dc(surface), &from_rect(rect), brush);
            _ = DeleteObject(brush.into());
        }
    }

    fn measure_text(&self, surface: SurfaceHandle, text: &str, font: Option<FontHandle>) -> Size {
        let hdc = dc(surface);
        let text: Vec<u16> = text.encode_utf16().collect();
        Self::with_font(hdc, font, || {
            let mut size = SIZE::default();
            if unsafe { GetTextExtentPoint32W(hdc, &text, &mut size) }.as_bool() {
                Size::new(size.cx, size.cy)
            } else {
                Size::default()
            }
        })
    }

    fn draw_text(
        &self,
        surface: SurfaceHandle,
        text: &str,
        rect: Rect,
        color: Color,
        font: Option<FontHandle>,
        format: TextFormat,
    ) {
        let hdc = dc(surface);
        let mut flags = DT_SINGLELINE | DT_NOPREFIX;
        flags |= match format.align {
            TextAlign::Left => DT_LEFT,
            TextAlign::Center => DT_CENTER,
            TextAlign::Right => DT_RIGHT,
        };
        if format.vertical_center {
            flags |= DT_VCENTER;
        }
        if format.end_ellipsis {
            flags |= DT_END_ELLIPSIS;
        }
        let mut text: Vec<u16> = text.encode_utf16().collect();
        let mut rect = from_rect(rect);
        Self::with_font(hdc, font, || unsafe {
            SetBkMode(hdc, TRANSPARENT);
            SetTextColor(hdc, colorref(color));
            DrawTextW(hdc, &mut text, &mut rect, flags);
        });
    }

    fn draw_image(&self, surface: SurfaceHandle, image: ImageHandle, rect: Rect) {
        let hdc = dc(surface);
        let bitmap = HBITMAP(image.0 as *mut c_void);
        unsafe {
            let mut info = BITMAP::default();
            let read = GetObjectW(
                bitmap.into(),
                std::mem::size_of::<BITMAP>() as i32,
                Some(&mut info as *mut BITMAP as *mut c_void),
            );
            if read == 0 {
                log::debug!("GdiDrawing: {image:?} is not a bitmap.");
                return;
            }
            let memory = CreateCompatibleDC(Some(hdc));
            let previous = SelectObject(memory, bitmap.into());
            _ = StretchBlt(
                hdc,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                Some(memory),
                0,
                0,
                info.bmWidth,
                info.bmHeight,
                SRCCOPY,
            );
            SelectObject(memory, previous);
            _ = DeleteDC(memory);
        }
    }

    fn control_colors(&self, surface: SurfaceHandle, text: Color, background: Color) -> isize {
        let hdc = dc(surface);
        unsafe {
            SetTextColor(hdc, colorref(text));
            SetBkColor(hdc, colorref(background));
        }
        let mut brushes = self.color_brushes.borrow_mut();
        let brush = *brushes
            .entry(background)
            .or_insert_with(|| unsafe { CreateSolidBrush(colorref(background)) });
        brush.0 as isize
    }
}
