/*
 * Resizer and shadow helpers for customized dialogs.
 *
 * The shadow is a layered, click-through popup owned by the dialog and placed
 * just behind it, slightly offset. The resizer is a size grip in the dialog's
 * bottom-right corner; it is only a reservation until `attach` creates it as
 * a child of the dialog it belongs to.
 */

use super::{hwnd, native};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{ChromeHandle, DialogChromeService};
use crate::types::NativeHandle;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use windows::Win32::{
    Foundation::{COLORREF, GetLastError, HINSTANCE, HWND, RECT},
    Graphics::Gdi::{BLACK_BRUSH, GetStockObject, HBRUSH},
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::*,
};
use windows::core::{HSTRING, PCWSTR, w};

const SHADOW_CLASS: PCWSTR = w!("ChromeUI_DialogShadow");
const SHADOW_OFFSET: i32 = 6;
const SHADOW_ALPHA: u8 = 64;
const GRIP_SIZE: i32 = 16;
const SBS_SIZEGRIP: u32 = 0x0010;
const SBS_SIZEBOXBOTTOMRIGHTALIGN: u32 = 0x0004;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Resizer,
    Shadow,
}

#[derive(Debug, Clone, Copy)]
struct ChromePart {
    kind: PartKind,
    window: Option<HWND>,
}

pub struct LayeredChrome {
    instance: HINSTANCE,
    next: Cell<usize>,
    parts: RefCell<HashMap<ChromeHandle, ChromePart>>,
}

impl LayeredChrome {
    pub fn new() -> PlatformResult<Self> {
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None)? }.into();
        register_shadow_class(instance)?;
        Ok(Self {
            instance,
            next: Cell::new(0),
            parts: RefCell::new(HashMap::new()),
        })
    }

    fn allocate(&self, kind: PartKind, window: Option<HWND>) -> ChromeHandle {
        let handle = ChromeHandle(self.next.get() + 1);
        self.next.set(handle.0);
        self.parts.borrow_mut().insert(handle, ChromePart { kind, window });
        handle
    }

    fn release(&self, part: ChromeHandle, expected: PartKind) {
        let Some(removed) = self.parts.borrow_mut().remove(&part) else {
            log::warn!("LayeredChrome: Release of unknown {part:?}.");
            return;
        };
        debug_assert_eq!(removed.kind, expected);
        if let Some(window) = removed.window {
            if unsafe { IsWindow(Some(window)) }.as_bool() {
                unsafe { _ = DestroyWindow(window) };
            }
        }
    }

    fn attach_shadow(&self, shadow: HWND, dialog: HWND) -> PlatformResult<()> {
        let mut rect = RECT::default();
        unsafe {
            GetWindowRect(dialog, &mut rect)?;
            SetWindowLongPtrW(shadow, GWLP_HWNDPARENT, dialog.0 as isize);
            SetWindowPos(
                shadow,
                Some(dialog),
                rect.left + SHADOW_OFFSET,
                rect.top + SHADOW_OFFSET,
                rect.right - rect.left,
                rect.bottom - rect.top,
                SWP_NOACTIVATE | SWP_SHOWWINDOW,
            )?;
        }
        Ok(())
    }

    fn create_grip(&self, dialog: HWND) -> PlatformResult<HWND> {
        let mut client = RECT::default();
        unsafe {
            GetClientRect(dialog, &mut client)?;
            let grip = CreateWindowExW(
                WINDOW_EX_STYLE(0),
                w!("SCROLLBAR"),
                PCWSTR::null(),
                WS_CHILD | WS_VISIBLE | WINDOW_STYLE(SBS_SIZEGRIP | SBS_SIZEBOXBOTTOMRIGHTALIGN),
                client.right - GRIP_SIZE,
                client.bottom - GRIP_SIZE,
                GRIP_SIZE,
                GRIP_SIZE,
                Some(dialog),
                None,
                Some(self.instance),
                None,
            )?;
            Ok(grip)
        }
    }
}

fn register_shadow_class(instance: HINSTANCE) -> PlatformResult<()> {
    unsafe {
        let mut existing = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(instance), SHADOW_CLASS, &mut existing).is_ok() {
            return Ok(());
        }
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(DefWindowProcW),
            hInstance: instance,
            hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
            lpszClassName: SHADOW_CLASS,
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("LayeredChrome: RegisterClassExW failed: {error:?}");
            return Err(PlatformError::OperationFailed(format!(
                "RegisterClassExW for the dialog shadow failed: {error:?}"
            )));
        }
    }
    Ok(())
}

impl DialogChromeService for LayeredChrome {
    fn create_resizer(&self) -> PlatformResult<ChromeHandle> {
        Ok(self.allocate(PartKind::Resizer, None))
    }

    fn create_shadow(&self) -> PlatformResult<ChromeHandle> {
        let window = unsafe {
            let window = CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
                SHADOW_CLASS,
                &HSTRING::new(),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                Some(self.instance),
                None,
            )?;
            if let Err(e) = SetLayeredWindowAttributes(window, COLORREF(0), SHADOW_ALPHA, LWA_ALPHA) {
                _ = DestroyWindow(window);
                return Err(e.into());
            }
            window
        };
        Ok(self.allocate(PartKind::Shadow, Some(window)))
    }

    fn attach(&self, part: ChromeHandle, dialog: NativeHandle) -> PlatformResult<()> {
        let Some(current) = self.parts.borrow().get(&part).copied() else {
            return Err(PlatformError::NotFound(format!("Chrome part {part:?}")));
        };
        let dialog = hwnd(dialog);
        match (current.kind, current.window) {
            (PartKind::Shadow, Some(shadow)) => self.attach_shadow(shadow, dialog),
            (PartKind::Resizer, None) => {
                let grip = self.create_grip(dialog)?;
                log::debug!("LayeredChrome: Size grip {:?} on {:?}.", native(grip), native(dialog));
                if let Some(entry) = self.parts.borrow_mut().get_mut(&part) {
                    entry.window = Some(grip);
                }
                Ok(())
            }
            _ => Err(PlatformError::InvalidState(format!("{part:?} is already attached"))),
        }
    }

    fn release_resizer(&self, resizer: ChromeHandle) {
        self.release(resizer, PartKind::Resizer);
    }

    fn release_shadow(&self, shadow: ChromeHandle) {
        self.release(shadow, PartKind::Shadow);
    }
}

impl Drop for LayeredChrome {
    fn drop(&mut self) {
        for (_, part) in self.parts.borrow_mut().drain() {
            if let Some(window) = part.window {
                unsafe { _ = DestroyWindow(window) };
            }
        }
    }
}
