/*
 * Win32 implementations of the service traits, plus the top-level window
 * class, its window procedure and the message loop. Everything above this
 * module talks to the OS only through `Services`, so this is the only place
 * that touches `HWND`s, device contexts and GDI objects directly.
 */

mod chrome;
mod dialogs;
mod drawing;
mod fonts;
mod images;
mod router;
mod runtime;
mod window;

pub use chrome::LayeredChrome;
pub use dialogs::CommonDialogs;
pub use drawing::GdiDrawing;
pub use fonts::GdiFonts;
pub use images::Win32Images;
pub use runtime::Win32Runtime;
pub use window::{create_main_window, register_window_class, run_message_loop};

use crate::config::FrameworkConfig;
use crate::dialogs::ThemedDialogs;
use crate::error::Result as PlatformResult;
use crate::services::Services;
use crate::styling_primitives::Color;
use crate::types::{NativeHandle, Rect};

use std::ffi::c_void;
use std::rc::Rc;
use windows::Win32::Foundation::{COLORREF, HWND, RECT};

/// The GDI-backed service bundle for the calling (UI) thread.
pub fn native_services() -> PlatformResult<Services> {
    Ok(Services {
        runtime: Rc::new(Win32Runtime::new()?),
        drawing: Rc::new(GdiDrawing::new()),
        fonts: Rc::new(GdiFonts::new()),
        images: Rc::new(Win32Images::new()?),
    })
}

/// Themed common dialogs sharing `services`.
pub fn native_dialogs(services: Services, config: FrameworkConfig) -> PlatformResult<ThemedDialogs> {
    let chrome = LayeredChrome::new()?;
    Ok(ThemedDialogs::new(
        services,
        Rc::new(CommonDialogs::new()),
        Rc::new(chrome),
        config,
    ))
}

pub(crate) fn hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

pub(crate) fn native(hwnd: HWND) -> NativeHandle {
    NativeHandle(hwnd.0 as usize)
}

pub(crate) fn to_rect(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

pub(crate) fn from_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    }
}

pub(crate) fn colorref(color: Color) -> COLORREF {
    COLORREF(color.r as u32 | ((color.g as u32) << 8) | ((color.b as u32) << 16))
}

/// UTF-16 with a terminating NUL, for APIs that take a raw wide pointer.
pub(crate) fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// The string up to the first NUL of a wide buffer.
pub(crate) fn from_wide(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}
