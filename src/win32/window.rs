/*
 * The top-level window class, its window procedure and the message loop.
 *
 * Each top-level window belongs to one `WindowSession`. The session travels
 * through `CreateWindowExW` as a boxed weak reference, is parked in the
 * window's user data, and is registered with the router so the subclass
 * procedure of any child control can find it through the control's root.
 */

use super::{native, router};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::Message;
use crate::window_common::WindowSession;

use std::ffi::c_void;
use std::rc::{Rc, Weak};

use windows::Win32::{
    Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
    Graphics::Gdi::{COLOR_WINDOW, HBRUSH},
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::*,
};
use windows::core::{HSTRING, PCWSTR};

fn module_instance() -> PlatformResult<HINSTANCE> {
    Ok(unsafe { GetModuleHandleW(None)? }.into())
}

/*
 * Registers the top-level window class if it is not already registered. Every
 * window of the class is routed through `session_wnd_proc`.
 */
pub fn register_window_class(class_name: &str) -> PlatformResult<()> {
    let instance = module_instance()?;
    let class_name_hstring = HSTRING::from(class_name);
    let class_name_pcwstr = PCWSTR(class_name_hstring.as_ptr());

    unsafe {
        let mut wc_test = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(instance), class_name_pcwstr, &mut wc_test).is_ok() {
            log::debug!("Window: Class '{class_name}' already registered.");
            return Ok(());
        }

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(session_wnd_proc),
            hInstance: instance,
            hIcon: LoadIconW(None, IDI_APPLICATION)?,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszClassName: class_name_pcwstr,
            hIconSm: LoadIconW(None, IDI_APPLICATION)?,
            ..Default::default()
        };

        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("Window: RegisterClassExW failed: {error:?}");
            return Err(PlatformError::OperationFailed(format!(
                "RegisterClassExW failed: {error:?}"
            )));
        }
    }
    log::debug!("Window: Class '{class_name}' registered successfully.");
    Ok(())
}

/*
 * Creates a top-level window of `class_name` bound to `session`. The session
 * is attached (and adopts the window's DPI) during `WM_NCCREATE`, before any
 * control can be added to it.
 */
pub fn create_main_window(
    session: &Rc<WindowSession>,
    class_name: &str,
    title: &str,
    width: i32,
    height: i32,
) -> PlatformResult<crate::types::NativeHandle> {
    let instance = module_instance()?;
    let context = Box::into_raw(Box::new(Rc::downgrade(session)));

    let created = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            &HSTRING::from(class_name),
            &HSTRING::from(title),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            width,
            height,
            None,
            None,
            Some(instance),
            Some(context as *const c_void),
        )
    };
    match created {
        Ok(hwnd) => {
            log::debug!(
                "Window: WinID {:?} created as {:?}.",
                session.window_id(),
                native(hwnd)
            );
            Ok(native(hwnd))
        }
        Err(e) => {
            /*
             * If WM_NCCREATE ran, WM_NCDESTROY already freed the context. It
             * did so only when the user data was set, so check the session
             * binding to tell the cases apart.
             */
            if session.hwnd().is_null() {
                drop(unsafe { Box::from_raw(context) });
            }
            log::error!("Window: CreateWindowExW for '{title}' failed: {e}");
            Err(PlatformError::HandleCreation(format!("Top-level window '{title}': {e}")))
        }
    }
}

unsafe extern "system" fn session_wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let context_ptr = if msg == WM_NCCREATE {
        let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        let context_raw_ptr = create_struct.lpCreateParams as *mut Weak<WindowSession>;
        if !context_raw_ptr.is_null() {
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, context_raw_ptr as isize) };
            if let Some(session) = unsafe { &*context_raw_ptr }.upgrade() {
                router::register_session(native(hwnd), &session);
                session.attach_window(native(hwnd));
            }
        }
        context_raw_ptr
    } else {
        unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut Weak<WindowSession> }
    };

    if context_ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    /*
     * The strong reference is dropped before falling through, so a handler
     * that drops the last outside reference does not free the session under
     * its own feet.
     */
    let handled = unsafe { &*context_ptr }
        .upgrade()
        .and_then(|session| session.handle_parent_message(Message::new(msg, wparam.0, lparam.0)));

    let result = match handled {
        Some(result) => LRESULT(result),
        None => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    };

    if msg == WM_NCDESTROY {
        router::unregister_session(native(hwnd));
        drop(unsafe { Box::from_raw(context_ptr) });
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
        log::debug!("Window: {:?} destroyed, posting quit.", native(hwnd));
        unsafe { PostQuitMessage(0) };
    }
    result
}

/// Pumps messages for the calling thread until `WM_QUIT`.
pub fn run_message_loop() -> PlatformResult<()> {
    unsafe {
        let mut msg = MSG::default();
        loop {
            let result = GetMessageW(&mut msg, None, 0, 0);
            if result.0 > 0 {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            } else if result.0 == 0 {
                log::debug!("Window: GetMessageW returned 0 (WM_QUIT), exiting message loop.");
                break;
            } else {
                let last_error = GetLastError();
                log::error!("Window: GetMessageW failed with return -1. LastError: {last_error:?}");
                return Err(PlatformError::OperationFailed(format!(
                    "GetMessageW failed: {last_error:?}"
                )));
            }
        }
    }
    log::debug!("Window: Message loop exited cleanly.");
    Ok(())
}
