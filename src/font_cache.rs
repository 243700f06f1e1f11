/*
 * Per-session font cache. Fonts are keyed by family, point size, weight and
 * the DPI they were created for, so a DPI change produces new fonts while the
 * old ones stay valid for controls that have not been updated yet. Every font
 * the cache created is deleted when the cache is released; nothing is shared
 * between sessions.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::scaling::font_pixel_height;
use crate::services::FontService;
use crate::styling_primitives::{FontDescription, FontWeight};
use crate::types::FontHandle;

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    point_size: i32,
    weight: FontWeight,
    dpi: u32,
}

#[derive(Debug, Default)]
pub(crate) struct FontCache {
    fonts: HashMap<FontKey, FontHandle>,
    installed: Option<HashSet<String>>,
}

/*
 * Installed family names as reported by the font service, minus the
 * vertical-writing aliases (names starting with `@`), compared
 * case-insensitively.
 */
pub(crate) fn usable_families(families: Vec<String>) -> HashSet<String> {
    families
        .into_iter()
        .filter(|name| !name.starts_with('@'))
        .map(|name| name.to_lowercase())
        .collect()
}

impl FontCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn is_installed(&mut self, fonts: &dyn FontService, family: &str) -> bool {
        let installed = self
            .installed
            .get_or_insert_with(|| usable_families(fonts.enumerate_families()));
        installed.contains(&family.to_lowercase())
    }

    /*
     * Picks the family a font will actually be created with: the requested one
     * when installed, otherwise `fallback`. When neither is installed the
     * request is passed through unchanged and the font mapper decides.
     */
    fn choose_family(&mut self, fonts: &dyn FontService, requested: &str, fallback: &str) -> String {
        if self.is_installed(fonts, requested) {
            return requested.to_string();
        }
        if self.is_installed(fonts, fallback) {
            log::debug!("FontCache: Family '{requested}' not installed, using '{fallback}'.");
            return fallback.to_string();
        }
        log::warn!("FontCache: Neither '{requested}' nor '{fallback}' is installed.");
        requested.to_string()
    }

    /*
     * Returns the cached font for `description` at `dpi`, creating it on first
     * use. Creation failures surface as `ResourceLoad`; callers degrade to the
     * service's default font.
     */
    pub(crate) fn resolve(
        &mut self,
        fonts: &dyn FontService,
        description: &FontDescription,
        fallback_family: &str,
        dpi: u32,
    ) -> PlatformResult<FontHandle> {
        let family = self.choose_family(fonts, &description.family, fallback_family);
        let key = FontKey {
            family,
            point_size: description.point_size,
            weight: description.weight,
            dpi,
        };
        if let Some(font) = self.fonts.get(&key) {
            return Ok(*font);
        }

        let pixel_height = font_pixel_height(description.point_size, dpi);
        let font = fonts
            .create_font(&key.family, pixel_height, key.weight)
            .map_err(|e| {
                PlatformError::ResourceLoad(format!(
                    "Font '{}' {}pt at {dpi} DPI: {e}",
                    key.family, key.point_size
                ))
            })?;
        log::debug!(
            "FontCache: Created '{}' {}pt (height {pixel_height}) at {dpi} DPI as {font:?}.",
            key.family,
            key.point_size
        );
        self.fonts.insert(key, font);
        Ok(font)
    }

    /// `resolve`, degrading to the default font when creation fails.
    pub(crate) fn resolve_or_default(
        &mut self,
        fonts: &dyn FontService,
        description: &FontDescription,
        fallback_family: &str,
        dpi: u32,
    ) -> FontHandle {
        match self.resolve(fonts, description, fallback_family, dpi) {
            Ok(font) => font,
            Err(e) => {
                log::warn!("FontCache: {e}; using default font.");
                fonts.default_font()
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Deletes every font this cache created. Safe to call more than once.
    pub(crate) fn release_all(&mut self, fonts: &dyn FontService) {
        for (key, font) in self.fonts.drain() {
            log::trace!("FontCache: Deleting '{}' {}pt {font:?}.", key.family, key.point_size);
            fonts.delete_font(font);
        }
    }
}
