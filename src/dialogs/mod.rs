/*
 * Themed system dialogs. Each call wraps the platform's own open/save/folder
 * dialog in a `DialogAdapter` that re-skins it while it is modal, and makes
 * sure everything the adapter acquired is released however the dialog ends.
 */

pub(crate) mod adapter;
pub mod filters;
pub(crate) mod layout;
pub(crate) mod resources;
pub mod state;

use crate::config::FrameworkConfig;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::{
    DialogChromeService, DialogKind, FileDialogRequest, FileDialogResponse, FolderDialogRequest, Services,
    SystemDialogService,
};
use crate::types::NativeHandle;

use adapter::DialogAdapter;
use std::path::PathBuf;
use std::rc::Rc;

pub struct ThemedDialogs {
    services: Services,
    dialogs: Rc<dyn SystemDialogService>,
    chrome: Rc<dyn DialogChromeService>,
    config: FrameworkConfig,
}

impl ThemedDialogs {
    pub fn new(
        services: Services,
        dialogs: Rc<dyn SystemDialogService>,
        chrome: Rc<dyn DialogChromeService>,
        config: FrameworkConfig,
    ) -> Self {
        Self {
            services,
            dialogs,
            chrome,
            config,
        }
    }

    /// `Ok(None)` when the user cancelled.
    pub fn open_file(
        &self,
        owner: NativeHandle,
        request: &FileDialogRequest,
    ) -> PlatformResult<Option<FileDialogResponse>> {
        self.show_file(owner, DialogKind::OpenFile, request)
    }

    /*
     * Like `open_file`, but a chosen name without an extension gets the one
     * implied by the selected filter, or the request's default extension.
     */
    pub fn save_file(
        &self,
        owner: NativeHandle,
        request: &FileDialogRequest,
    ) -> PlatformResult<Option<FileDialogResponse>> {
        let response = self.show_file(owner, DialogKind::SaveFile, request)?;
        Ok(response.map(|mut response| {
            response.path = filters::apply_default_extension(
                &response.path,
                &request.filters,
                response.filter_index,
                request.default_extension.as_deref(),
            );
            response
        }))
    }

    pub fn browse_folder(
        &self,
        owner: NativeHandle,
        request: &FolderDialogRequest,
    ) -> PlatformResult<Option<PathBuf>> {
        self.check_owner(owner)?;
        let mut adapter = self.adapter(DialogKind::BrowseFolder, &request.title, owner);
        let result = self.dialogs.show_folder_dialog(owner, request, &mut adapter);
        adapter.close();
        result
    }

    fn show_file(
        &self,
        owner: NativeHandle,
        kind: DialogKind,
        request: &FileDialogRequest,
    ) -> PlatformResult<Option<FileDialogResponse>> {
        self.check_owner(owner)?;
        let request = normalize_filter_index(request);
        let mut adapter = self.adapter(kind, &request.title, owner);
        let result = self.dialogs.show_file_dialog(owner, kind, &request, &mut adapter);
        adapter.close();
        if let Err(e) = &result {
            log::warn!("ThemedDialogs: {kind:?} dialog failed: {e}");
        }
        result
    }

    fn adapter(&self, kind: DialogKind, title: &str, owner: NativeHandle) -> DialogAdapter {
        DialogAdapter::new(
            kind,
            title,
            owner,
            self.services.clone(),
            Rc::clone(&self.chrome),
            self.config.clone(),
        )
    }

    fn check_owner(&self, owner: NativeHandle) -> PlatformResult<()> {
        if !owner.is_null() && !self.services.runtime.is_window(owner) {
            return Err(PlatformError::RuntimeUnavailable(format!(
                "Dialog owner {owner:?} is gone"
            )));
        }
        Ok(())
    }
}

/*
 * A selected filter outside 1..=len is treated as "first filter"; with no
 * filters at all the index is 0.
 */
fn normalize_filter_index(request: &FileDialogRequest) -> FileDialogRequest {
    let mut request = request.clone();
    let count = request.filters.len() as u32;
    let valid = filters::selected_filter(&request.filters, request.filter_index).is_some();
    if !valid && !(count == 0 && request.filter_index == 0) {
        let normalized = u32::from(count > 0);
        log::warn!(
            "ThemedDialogs: Filter index {} out of range for {count} filters, using {normalized}.",
            request.filter_index
        );
        request.filter_index = normalized;
    }
    request
}
