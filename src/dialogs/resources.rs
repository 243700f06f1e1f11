/*
 * Everything a customized dialog acquires while it is initialized: the
 * resizer and shadow helpers, its fonts and the caption icon. Each resource
 * is taken out of its slot when released, so `release_all` can run from any
 * exit path (accept, cancel, a failed init step, or `Drop`) and still
 * releases each resource exactly once.
 */

use crate::font_cache::FontCache;
use crate::services::{ChromeHandle, DialogChromeService, FontService, ImageService};
use crate::types::ImageHandle;

use std::rc::Rc;

pub(crate) struct DialogResources {
    chrome: Rc<dyn DialogChromeService>,
    fonts: Rc<dyn FontService>,
    images: Rc<dyn ImageService>,
    pub resizer: Option<ChromeHandle>,
    pub shadow: Option<ChromeHandle>,
    pub font_cache: FontCache,
    pub icon: Option<ImageHandle>,
}

impl DialogResources {
    pub(crate) fn new(
        chrome: Rc<dyn DialogChromeService>,
        fonts: Rc<dyn FontService>,
        images: Rc<dyn ImageService>,
    ) -> Self {
        Self {
            chrome,
            fonts,
            images,
            resizer: None,
            shadow: None,
            font_cache: FontCache::new(),
            icon: None,
        }
    }

    pub(crate) fn chrome(&self) -> &dyn DialogChromeService {
        self.chrome.as_ref()
    }

    pub(crate) fn fonts(&self) -> &dyn FontService {
        self.fonts.as_ref()
    }

    pub(crate) fn images(&self) -> &dyn ImageService {
        self.images.as_ref()
    }

    pub(crate) fn release_all(&mut self) {
        if let Some(resizer) = self.resizer.take() {
            log::debug!("DialogResources: Releasing resizer {resizer:?}.");
            self.chrome.release_resizer(resizer);
        }
        if let Some(shadow) = self.shadow.take() {
            log::debug!("DialogResources: Releasing shadow {shadow:?}.");
            self.chrome.release_shadow(shadow);
        }
        self.font_cache.release_all(self.fonts.as_ref());
        if let Some(icon) = self.icon.take() {
            self.images.release(icon);
        }
    }
}

impl Drop for DialogResources {
    fn drop(&mut self) {
        self.release_all();
    }
}
