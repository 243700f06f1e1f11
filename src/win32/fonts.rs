/*
 * GDI fonts. Creation goes through `CreateFontW` with a negative pixel height
 * (character height, not cell height); family enumeration collects the face
 * names `EnumFontFamiliesExW` reports, once per family.
 */

use super::from_wide;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::FontService;
use crate::styling_primitives::FontWeight;
use crate::types::FontHandle;

use std::collections::BTreeSet;
use std::ffi::c_void;

use windows::Win32::{
    Foundation::LPARAM,
    Graphics::Gdi::{
        CLIP_DEFAULT_PRECIS, CreateFontW, DEFAULT_CHARSET, DEFAULT_GUI_FONT, DEFAULT_QUALITY,
        DeleteObject, EnumFontFamiliesExW, FF_DONTCARE, FW_BOLD, FW_NORMAL, GetDC, GetStockObject,
        HGDIOBJ, LOGFONTW, OUT_DEFAULT_PRECIS, ReleaseDC, TEXTMETRICW,
    },
};
use windows::core::HSTRING;

#[derive(Debug, Default)]
pub struct GdiFonts;

impl GdiFonts {
    pub fn new() -> Self {
        Self
    }
}

unsafe extern "system" fn collect_family(
    logfont: *const LOGFONTW,
    _metrics: *const TEXTMETRICW,
    _font_type: u32,
    lparam: LPARAM,
) -> i32 {
    if logfont.is_null() || lparam.0 == 0 {
        return 1;
    }
    let families = unsafe { &mut *(lparam.0 as *mut BTreeSet<String>) };
    let name = from_wide(unsafe { &(*logfont).lfFaceName });
    // Vertical variants ("@Name") are not separate families.
    if !name.is_empty() && !name.starts_with('@') {
        families.insert(name);
    }
    1
}

impl FontService for GdiFonts {
    fn enumerate_families(&self) -> Vec<String> {
        let mut families = BTreeSet::new();
        unsafe {
            let hdc = GetDC(None);
            if hdc.is_invalid() {
                log::warn!("GdiFonts: No screen DC for font enumeration.");
                return Vec::new();
            }
            let query = LOGFONTW {
                lfCharSet: DEFAULT_CHARSET,
                ..Default::default()
            };
            EnumFontFamiliesExW(
                hdc,
                &query,
                Some(collect_family),
                LPARAM(&mut families as *mut BTreeSet<String> as isize),
                0,
            );
            ReleaseDC(None, hdc);
        }
        families.into_iter().collect()
    }

    fn create_font(&self, family: &str, pixel_height: i32, weight: FontWeight) -> PlatformResult<FontHandle> {
        let weight = match weight {
            FontWeight::Normal => FW_NORMAL.0 as i32,
            FontWeight::Bold => FW_BOLD.0 as i32,
        };
        let font = unsafe {
            CreateFontW(
                pixel_height,
                0,
                0,
                0,
                weight,
                0,
                0,
                0,
                DEFAULT_CHARSET,
                OUT_DEFAULT_PRECIS,
                CLIP_DEFAULT_PRECIS,
                DEFAULT_QUALITY,
                FF_DONTCARE.0 as u32,
                &HSTRING::from(family),
            )
        };
        if font.is_invalid() {
            return Err(PlatformError::ResourceLoad(format!(
                "CreateFontW '{family}' height {pixel_height} failed"
            )));
        }
        Ok(FontHandle(font.0 as usize))
    }

    fn default_font(&self) -> FontHandle {
        FontHandle(unsafe { GetStockObject(DEFAULT_GUI_FONT) }.0 as usize)
    }

    fn delete_font(&self, font: FontHandle) {
        unsafe { _ = DeleteObject(HGDIOBJ(font.0 as *mut c_void)) };
    }
}
