/*
 * `WindowingRuntime` over the Win32 API, and the subclass procedure every
 * framework control and customized dialog is routed through.
 *
 * Subclassing swaps `GWLP_WNDPROC` for `subclass_proc` and keeps the replaced
 * procedure; `GWLP_USERDATA` carries the descriptor back-reference. The
 * procedure asks, in order: is this the running system dialog, is there a
 * session for the handle's root window, and otherwise hands the message to
 * whatever procedure the handle had before.
 */

use super::{from_wide, hwnd, native, router, to_rect, wide};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{ControlCreateParams, DrawItem, DrawItemState, ListKind, WindowingRuntime};
use crate::types::{ControlId, FontHandle, Message, NativeHandle, ProcToken, Rect, SurfaceHandle};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;

use windows::Win32::{
    Foundation::{
        ERROR_SUCCESS, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, SetLastError,
        WIN32_ERROR, WPARAM,
    },
    Graphics::Gdi::{
        BeginPaint, EndPaint, GetMonitorInfoW, GetWindowDC, HDC, InvalidateRect, MONITOR_DEFAULTTONEAREST,
        MONITORINFO, MapWindowPoints, MonitorFromWindow, PAINTSTRUCT, ReleaseDC,
    },
    System::LibraryLoader::GetModuleHandleW,
    UI::Controls::{
        DRAWITEMSTRUCT, LVIF_TEXT, LVIS_FOCUSED, LVIS_SELECTED, LVITEMW, LVM_DELETEALLITEMS, LVM_INSERTITEMW,
        LVM_SETITEMSTATE, ODS_DISABLED, ODS_FOCUS, ODS_HOTLIGHT, ODS_SELECTED,
    },
    UI::HiDpi::GetDpiForWindow,
    UI::Input::KeyboardAndMouse::{TME_LEAVE, TRACKMOUSEEVENT, TrackMouseEvent},
    UI::WindowsAndMessaging::*,
};
use windows::core::{HSTRING, PWSTR};

const DEFAULT_DPI: u32 = 96;

pub struct Win32Runtime {
    instance: HINSTANCE,
    paints: RefCell<HashMap<NativeHandle, PAINTSTRUCT>>,
}

impl Win32Runtime {
    pub fn new() -> PlatformResult<Self> {
        let module = unsafe { GetModuleHandleW(None)? };
        Ok(Self {
            instance: module.into(),
            paints: RefCell::new(HashMap::new()),
        })
    }
}

/*
 * The single subclass procedure. Runs on the UI thread only; every lookup it
 * does goes through the thread-local router.
 */
pub(crate) unsafe extern "system" fn subclass_proc(
    hwnd_in: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = native(hwnd_in);
    let message = Message::new(msg, wparam.0, lparam.0 as isize);

    let result = if let Some(result) = router::dispatch_dialog(handle, message) {
        LRESULT(result)
    } else if let Some(session) = root_session(hwnd_in) {
        LRESULT(session.dispatch_control_message(handle, message))
    } else {
        forward_to_previous(hwnd_in, msg, wparam, lparam)
    };

    if msg == WM_NCDESTROY {
        router::forget_handle(handle);
    }
    result
}

fn root_session(hwnd_in: HWND) -> Option<std::rc::Rc<crate::window_common::WindowSession>> {
    let root = unsafe { GetAncestor(hwnd_in, GA_ROOT) };
    if root.is_invalid() || root == hwnd_in {
        return None;
    }
    router::session_for(native(root))
}

fn forward_to_previous(hwnd_in: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match router::previous_for(native(hwnd_in)) {
        Some(previous) => unsafe {
            let previous: WNDPROC = std::mem::transmute(previous);
            CallWindowProcW(previous, hwnd_in, msg, wparam, lparam)
        },
        None => unsafe { DefWindowProcW(hwnd_in, msg, wparam, lparam) },
    }
}

impl WindowingRuntime for Win32Runtime {
    fn is_window(&self, handle: NativeHandle) -> bool {
        !handle.is_null() && unsafe { IsWindow(Some(hwnd(handle))) }.as_bool()
    }

    fn create_control(&self, params: &ControlCreateParams<'_>) -> PlatformResult<NativeHandle> {
        let rect = params.rect;
        let created = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(params.ex_style),
                &HSTRING::from(params.class_name),
                &HSTRING::from(params.text),
                WINDOW_STYLE(params.style),
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                Some(hwnd(params.parent)),
                Some(HMENU(params.id.raw() as isize as *mut c_void)),
                Some(self.instance),
                None,
            )
        };
        created.map(native).map_err(|e| {
            PlatformError::HandleCreation(format!(
                "CreateWindowExW '{}' for control {}: {e}",
                params.class_name,
                params.id.raw()
            ))
        })
    }

    fn destroy_control(&self, handle: NativeHandle) {
        if let Err(e) = unsafe { DestroyWindow(hwnd(handle)) } {
            log::warn!("Win32Runtime: DestroyWindow {handle:?} failed: {e}");
        }
    }

    fn install_subclass(&self, handle: NativeHandle) -> PlatformResult<ProcToken> {
        let previous = unsafe {
            SetLastError(WIN32_ERROR(0));
            #[allow(clippy::fn_to_numeric_cast)]
            let previous = SetWindowLongPtrW(hwnd(handle), GWLP_WNDPROC, subclass_proc as isize);
            if previous == 0 && GetLastError() != ERROR_SUCCESS {
                return Err(PlatformError::SubclassAttach(format!(
                    "SetWindowLongPtrW(GWLP_WNDPROC) on {handle:?}: {}",
                    windows::core::Error::from_win32()
                )));
            }
            previous
        };
        router::record_previous(handle, previous);
        Ok(ProcToken(previous as usize))
    }

    fn call_previous(&self, previous: ProcToken, handle: NativeHandle, message: Message) -> isize {
        unsafe {
            let previous: WNDPROC = std::mem::transmute(previous.0);
            CallWindowProcW(
                previous,
                hwnd(handle),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
            .0
        }
    }

    fn default_procedure(&self, handle: NativeHandle, message: Message) -> isize {
        unsafe {
            DefWindowProcW(
                hwnd(handle),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
            .0
        }
    }

    fn set_user_data(&self, handle: NativeHandle, data: u64) -> PlatformResult<()> {
        if !self.is_window(handle) {
            return Err(PlatformError::NotFound(format!("{handle:?} is not a window")));
        }
        unsafe { SetWindowLongPtrW(hwnd(handle), GWLP_USERDATA, data as isize) };
        Ok(())
    }

    fn user_data(&self, handle: NativeHandle) -> Option<u64> {
        self.is_window(handle)
            .then(|| unsafe { GetWindowLongPtrW(hwnd(handle), GWLP_USERDATA) } as u64)
    }

    fn send_message(&self, handle: NativeHandle, message: Message) -> isize {
        unsafe {
            SendMessageW(
                hwnd(handle),
                message.id,
                Some(WPARAM(message.wparam)),
                Some(LPARAM(message.lparam)),
            )
            .0
        }
    }

    fn track_mouse_leave(&self, handle: NativeHandle) {
        let mut tme = TRACKMOUSEEVENT {
            cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: TME_LEAVE,
            hwndTrack: hwnd(handle),
            dwHoverTime: 0,
        };
        if let Err(e) = unsafe { TrackMouseEvent(&mut tme) } {
            log::debug!("Win32Runtime: TrackMouseEvent on {handle:?} failed: {e}");
        }
    }

    fn client_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd(handle), &mut rect)? };
        Ok(to_rect(rect))
    }

    fn window_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        let target = hwnd(handle);
        let mut rect = RECT::default();
        unsafe { GetWindowRect(target, &mut rect)? };
        let style = self.window_style(handle);
        if style & WS_CHILD.0 != 0 {
            if let Ok(parent) = unsafe { GetParent(target) } {
                let mut points = [
                    POINT {
                        x: rect.left,
                        y: rect.top,
                    },
                    POINT {
                        x: rect.right,
                        y: rect.bottom,
                    },
                ];
                unsafe { MapWindowPoints(None, Some(parent), &mut points) };
                return Ok(Rect::new(points[0].x, points[0].y, points[1].x, points[1].y));
            }
        }
        Ok(to_rect(rect))
    }

    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        unsafe {
            SetWindowPos(
                hwnd(handle),
                None,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_NOZORDER | SWP_NOACTIVATE,
            )?
        };
        Ok(())
    }

    fn set_visible(&self, handle: NativeHandle, visible: bool) {
        let cmd = if visible { SW_SHOWNOACTIVATE } else { SW_HIDE };
        unsafe { _ = ShowWindow(hwnd(handle), cmd) };
    }

    fn invalidate(&self, handle: NativeHandle) {
        unsafe { _ = InvalidateRect(Some(hwnd(handle)), None, true) };
    }

    fn set_font(&self, handle: NativeHandle, font: FontHandle) {
        unsafe {
            SendMessageW(
                hwnd(handle),
                WM_SETFONT,
                Some(WPARAM(font.0)),
                Some(LPARAM(1)),
            )
        };
    }

    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        unsafe { SetWindowTextW(hwnd(handle), &HSTRING::from(text))? };
        Ok(())
    }

    fn set_list_items(
        &self,
        handle: NativeHandle,
        list: ListKind,
        items: &[String],
        selected: Option<usize>,
    ) -> PlatformResult<()> {
        let target = hwnd(handle);
        match list {
            ListKind::ComboBox => unsafe {
                SendMessageW(target, CB_RESETCONTENT, Some(WPARAM(0)), Some(LPARAM(0)));
                for item in items {
                    let text = HSTRING::from(item.as_str());
                    let index = SendMessageW(
                        target,
                        CB_ADDSTRING,
                        Some(WPARAM(0)),
                        Some(LPARAM(text.as_ptr() as isize)),
                    );
                    if index.0 < 0 {
                        return Err(PlatformError::OperationFailed(format!(
                            "CB_ADDSTRING '{item}' on {handle:?} failed"
                        )));
                    }
                }
                let index = selected.unwrap_or(usize::MAX);
                SendMessageW(target, CB_SETCURSEL, Some(WPARAM(index)), Some(LPARAM(0)));
            },
            ListKind::ListView => unsafe {
                SendMessageW(target, LVM_DELETEALLITEMS, Some(WPARAM(0)), Some(LPARAM(0)));
                for (row, item) in items.iter().enumerate() {
                    let mut text = wide(item);
                    let lvi = LVITEMW {
                        mask: LVIF_TEXT,
                        iItem: row as i32,
                        pszText: PWSTR(text.as_mut_ptr()),
                        ..Default::default()
                    };
                    let index = SendMessageW(
                        target,
                        LVM_INSERTITEMW,
                        Some(WPARAM(0)),
                        Some(LPARAM(&lvi as *const LVITEMW as isize)),
                    );
                    if index.0 < 0 {
                        return Err(PlatformError::OperationFailed(format!(
                            "LVM_INSERTITEMW '{item}' on {handle:?} failed"
                        )));
                    }
                }
                if let Some(row) = selected {
                    let lvi = LVITEMW {
                        stateMask: LVIS_SELECTED | LVIS_FOCUSED,
                        state: LVIS_SELECTED | LVIS_FOCUSED,
                        ..Default::default()
                    };
                    SendMessageW(
                        target,
                        LVM_SETITEMSTATE,
                        Some(WPARAM(row)),
                        Some(LPARAM(&lvi as *const LVITEMW as isize)),
                    );
                }
            },
        }
        Ok(())
    }

    fn window_style(&self, handle: NativeHandle) -> u32 {
        unsafe { GetWindowLongPtrW(hwnd(handle), GWL_STYLE) as u32 }
    }

    fn set_window_style(&self, handle: NativeHandle, style: u32) -> PlatformResult<()> {
        let target = hwnd(handle);
        unsafe {
            SetWindowLongPtrW(target, GWL_STYLE, style as isize);
            SetWindowPos(
                target,
                None,
                0,
                0,
                0,
                0,
                SWP_NOZORDER | SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_FRAMECHANGED,
            )?;
        }
        Ok(())
    }

    fn work_area(&self, handle: NativeHandle) -> Rect {
        unsafe {
            let monitor = MonitorFromWindow(hwnd(handle), MONITOR_DEFAULTTONEAREST);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                return to_rect(info.rcWork);
            }
            Rect::new(0, 0, GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN))
        }
    }

    fn dpi_for(&self, handle: NativeHandle) -> u32 {
        match unsafe { GetDpiForWindow(hwnd(handle)) } {
            0 => DEFAULT_DPI,
            dpi => dpi,
        }
    }

    fn begin_paint(&self, handle: NativeHandle) -> Option<(SurfaceHandle, Rect)> {
        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(hwnd(handle), &mut ps) };
        if hdc.is_invalid() {
            return None;
        }
        let dirty = to_rect(ps.rcPaint);
        self.paints.borrow_mut().insert(handle, ps);
        Some((SurfaceHandle(hdc.0 as usize), dirty))
    }

    fn end_paint(&self, handle: NativeHandle, _surface: SurfaceHandle) {
        if let Some(ps) = self.paints.borrow_mut().remove(&handle) {
            unsafe { _ = EndPaint(hwnd(handle), &ps) };
        }
    }

    fn window_surface(&self, handle: NativeHandle) -> Option<SurfaceHandle> {
        let hdc = unsafe { GetWindowDC(Some(hwnd(handle))) };
        (!hdc.is_invalid()).then_some(SurfaceHandle(hdc.0 as usize))
    }

    fn release_surface(&self, handle: NativeHandle, surface: SurfaceHandle) {
        unsafe { ReleaseDC(Some(hwnd(handle)), HDC(surface.0 as *mut c_void)) };
    }

    fn dialog_item(&self, dialog: NativeHandle, item_id: i32) -> Option<NativeHandle> {
        unsafe { GetDlgItem(Some(hwnd(dialog)), item_id) }.ok().map(native)
    }

    fn child_windows(&self, parent: NativeHandle) -> Vec<NativeHandle> {
        let mut children = Vec::new();
        let mut next = unsafe { GetWindow(hwnd(parent), GW_CHILD) };
        while let Ok(child) = next {
            if child.is_invalid() {
                break;
            }
            children.push(native(child));
            next = unsafe { GetWindow(child, GW_HWNDNEXT) };
        }
        children
    }

    fn window_text(&self, handle: NativeHandle) -> String {
        let target = hwnd(handle);
        let len = unsafe { GetWindowTextLengthW(target) };
        if len <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(target, &mut buffer) };
        from_wide(&buffer[..copied.max(0) as usize])
    }

    fn decode_draw_item(&self, message: Message) -> Option<DrawItem> {
        if message.id != WM_DRAWITEM || message.lparam == 0 {
            return None;
        }
        let dis = unsafe { &*(message.lparam as *const DRAWITEMSTRUCT) };
        let state = dis.itemState;
        Some(DrawItem {
            control_id: ControlId::new(dis.CtlID as i32),
            handle: native(dis.hwndItem),
            surface: SurfaceHandle(dis.hDC.0 as usize),
            rect: to_rect(dis.rcItem),
            state: DrawItemState {
                selected: state.contains(ODS_SELECTED),
                focused: state.contains(ODS_FOCUS),
                disabled: state.contains(ODS_DISABLED),
                hot: state.contains(ODS_HOTLIGHT),
            },
        })
    }
}
