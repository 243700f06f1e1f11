/*
 * Bitmaps loaded from the executable's resources or from files on disk.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{ImageService, ImageSource};
use crate::types::ImageHandle;

use std::ffi::c_void;

use windows::Win32::{
    Foundation::HINSTANCE,
    Graphics::Gdi::{DeleteObject, HGDIOBJ},
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{IMAGE_BITMAP, LR_CREATEDIBSECTION, LR_DEFAULTCOLOR, LR_LOADFROMFILE, LoadImageW},
};
use windows::core::{HSTRING, PCWSTR};

pub struct Win32Images {
    instance: HINSTANCE,
}

impl Win32Images {
    pub fn new() -> PlatformResult<Self> {
        let module = unsafe { GetModuleHandleW(None)? };
        Ok(Self {
            instance: module.into(),
        })
    }
}

impl ImageService for Win32Images {
    fn load(&self, source: &ImageSource) -> PlatformResult<ImageHandle> {
        let loaded = unsafe {
            match source {
                // MAKEINTRESOURCE: the ordinal travels in the pointer value.
                ImageSource::Resource(id) => LoadImageW(
                    Some(self.instance),
                    PCWSTR(*id as usize as *const u16),
                    IMAGE_BITMAP,
                    0,
                    0,
                    LR_DEFAULTCOLOR | LR_CREATEDIBSECTION,
                ),
                ImageSource::File(path) => LoadImageW(
                    None,
                    &HSTRING::from(path.as_os_str()),
                    IMAGE_BITMAP,
                    0,
                    0,
                    LR_LOADFROMFILE | LR_CREATEDIBSECTION,
                ),
            }
        };
        let image = loaded.map_err(|e| PlatformError::ResourceLoad(format!("{source:?}: {e}")))?;
        log::debug!("Win32Images: Loaded {source:?} as {:?}.", image.0);
        Ok(ImageHandle(image.0 as usize))
    }

    fn release(&self, image: ImageHandle) {
        unsafe { _ = DeleteObject(HGDIOBJ(image.0 as *mut c_void)) };
    }
}
