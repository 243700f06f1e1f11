/*
 * The common file dialogs and the folder browser, with their init callbacks
 * wired to the framework's dialog hooks.
 *
 * The file dialogs run with an explorer-style hook procedure; the hook's own
 * window is a child of the real dialog, so the dialog handed to the hooks is
 * its parent. The folder browser reports initialization through its callback.
 * In both cases the hooks stay reachable through the router for exactly as
 * long as the modal call runs.
 */

use super::{hwnd, native, router, wide};
use crate::dialogs::filters::native_filter_string;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{
    DialogHooks, DialogKind, FileDialogRequest, FileDialogResponse, FolderDialogRequest, SystemDialogService,
};
use crate::types::NativeHandle;

use std::ffi::{OsString, c_void};
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;

use windows::Win32::{
    Foundation::{HWND, LPARAM, WPARAM},
    System::Com::{COINIT_APARTMENTTHREADED, CoInitializeEx, CoTaskMemFree, CoUninitialize},
    UI::Controls::Dialogs::*,
    UI::Shell::{
        BFFM_INITIALIZED, BFFM_SETSELECTIONW, BIF_NEWDIALOGSTYLE, BIF_RETURNONLYFSDIRS, BROWSEINFOW,
        SHBrowseForFolderW, SHGetPathFromIDListW,
    },
    UI::WindowsAndMessaging::{GetParent, SendMessageW, WM_INITDIALOG},
};
use windows::core::{PCWSTR, PWSTR};

const PATH_BUFFER_LEN: usize = 2048;
const MAX_PATH: usize = 260;

fn path_from_buffer(buffer: &[u16]) -> PathBuf {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    PathBuf::from(OsString::from_wide(&buffer[..len]))
}

fn wide_path(path: &std::path::Path) -> Vec<u16> {
    wide(&path.to_string_lossy())
}

unsafe extern "system" fn file_dialog_hook(hdlg: HWND, msg: u32, _wparam: WPARAM, _lparam: LPARAM) -> usize {
    if msg == WM_INITDIALOG {
        let dialog = unsafe { GetParent(hdlg) }.unwrap_or(hdlg);
        router::init_dialog(native(dialog));
        return 1;
    }
    0
}

unsafe extern "system" fn folder_dialog_callback(dialog: HWND, msg: u32, _lparam: LPARAM, data: LPARAM) -> i32 {
    if msg == BFFM_INITIALIZED {
        if data.0 != 0 {
            unsafe { SendMessageW(dialog, BFFM_SETSELECTIONW, Some(WPARAM(1)), Some(data)) };
        }
        router::init_dialog(native(dialog));
    }
    0
}

#[derive(Debug, Default)]
pub struct CommonDialogs;

impl CommonDialogs {
    pub fn new() -> Self {
        Self
    }
}

impl SystemDialogService for CommonDialogs {
    fn show_file_dialog(
        &self,
        owner: NativeHandle,
        kind: DialogKind,
        request: &FileDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<FileDialogResponse>> {
        let mut file_buffer = vec![0u16; PATH_BUFFER_LEN];
        if let Some(name) = request.file_name.as_deref().filter(|n| !n.is_empty()) {
            let name: Vec<u16> = name.encode_utf16().collect();
            let len = name.len().min(file_buffer.len() - 1);
            file_buffer[..len].copy_from_slice(&name[..len]);
        }
        let filter: Vec<u16> = native_filter_string(&request.filters).encode_utf16().collect();
        let title = wide(&request.title);
        let initial_dir = request.initial_dir.as_deref().map(wide_path);
        let default_ext = request
            .default_extension
            .as_deref()
            .map(|e| wide(e.trim_start_matches('.')));

        let specific = match kind {
            DialogKind::SaveFile => OFN_PATHMUSTEXIST | OFN_OVERWRITEPROMPT,
            _ => OFN_PATHMUSTEXIST | OFN_FILEMUSTEXIST,
        };
        let mut ofn = OPENFILENAMEW {
            lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
            hwndOwner: hwnd(owner),
            lpstrFilter: if request.filters.is_empty() {
                PCWSTR::null()
            } else {
                PCWSTR(filter.as_ptr())
            },
            nFilterIndex: request.filter_index,
            lpstrFile: PWSTR(file_buffer.as_mut_ptr()),
            nMaxFile: file_buffer.len() as u32,
            lpstrTitle: PCWSTR(title.as_ptr()),
            lpstrInitialDir: initial_dir.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
            lpstrDefExt: default_ext.as_ref().map_or(PCWSTR::null(), |e| PCWSTR(e.as_ptr())),
            Flags: OFN_EXPLORER | OFN_ENABLEHOOK | OFN_ENABLESIZING | OFN_NOCHANGEDIR | specific,
            lpfnHook: Some(file_dialog_hook),
            ..Default::default()
        };

        let accepted = {
            let _scope = router::DialogScope::enter(hooks);
            match kind {
                DialogKind::SaveFile => unsafe { GetSaveFileNameW(&mut ofn) },
                _ => unsafe { GetOpenFileNameW(&mut ofn) },
            }
        };

        if accepted.as_bool() {
            let path = path_from_buffer(&file_buffer);
            log::debug!("CommonDialogs: {kind:?} accepted {path:?}.");
            return Ok(Some(FileDialogResponse {
                path,
                filter_index: ofn.nFilterIndex,
            }));
        }
        let error = unsafe { CommDlgExtendedError() };
        if error != COMMON_DLG_ERRORS(0) {
            log::error!("CommonDialogs: {kind:?} dialog failed. CommDlgExtendedError: {error:?}");
            return Err(PlatformError::OperationFailed(format!(
                "{kind:?} dialog failed with {error:?}"
            )));
        }
        log::debug!("CommonDialogs: {kind:?} cancelled.");
        Ok(None)
    }

    fn show_folder_dialog(
        &self,
        owner: NativeHandle,
        request: &FolderDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<PathBuf>> {
        let com_ready = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.is_ok();
        let title = wide(&request.title);
        let initial_dir = request.initial_dir.as_deref().map(wide_path);
        let mut display_name = [0u16; MAX_PATH];
        let info = BROWSEINFOW {
            hwndOwner: hwnd(owner),
            pszDisplayName: PWSTR(display_name.as_mut_ptr()),
            lpszTitle: PCWSTR(title.as_ptr()),
            ulFlags: BIF_RETURNONLYFSDIRS | BIF_NEWDIALOGSTYLE,
            lpfn: Some(folder_dialog_callback),
            lParam: LPARAM(initial_dir.as_ref().map_or(0, |d| d.as_ptr() as isize)),
            ..Default::default()
        };

        let pidl = {
            let _scope = router::DialogScope::enter(hooks);
            unsafe { SHBrowseForFolderW(&info) }
        };

        let result = if pidl.is_null() {
            log::debug!("CommonDialogs: Folder browser cancelled.");
            None
        } else {
            let mut path = [0u16; MAX_PATH];
            let resolved = unsafe { SHGetPathFromIDListW(pidl, &mut path) }.as_bool();
            unsafe { CoTaskMemFree(Some(pidl as *const c_void)) };
            if !resolved {
                log::warn!("CommonDialogs: Selected folder has no file system path.");
            }
            resolved.then(|| path_from_buffer(&path))
        };
        if com_ready {
            unsafe { CoUninitialize() };
        }
        Ok(result)
    }
}
