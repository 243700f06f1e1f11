/*
 * Per-window session state and the operations that act on it. A session owns
 * the control registry, the resize engine, the subclass table and the font
 * cache of one top-level window, and is the single entry point for both the
 * page-building API and the messages the subclass procedure receives.
 *
 * The session is shared by `Rc` and keeps its state in `RefCell`s. Native
 * calls can re-enter the session synchronously (creating, resizing or
 * destroying a window sends messages that dispatch straight back into the
 * subclass procedure), so no borrow is ever held across a call into the
 * windowing runtime. Operations that need both follow the same three phases:
 * read what is needed under a short borrow, talk to the runtime with no borrow
 * held, then re-borrow and re-check before committing.
 */

use crate::config::FrameworkConfig;
use crate::controls::button_handler;
use crate::controls::combobox_handler::normalize_selection;
use crate::controls::dark_border;
use crate::controls::paint_router::{resolve_paint_route, route_colors};
use crate::controls::progress_handler::STRENGTH_LEVELS;
use crate::controls::styling_handler::effective_colors;
use crate::controls::{ControlEvent, ControlKind, HandlerResult, MessageContext, Reply};
use crate::descriptor::{ControlDescriptor, ControlSnapshot, DescriptorKey, SubclassState};
use crate::error::{BatchReport, PlatformError, Result as PlatformResult};
use crate::font_cache::FontCache;
use crate::messages::*;
use crate::registry::ControlRegistry;
use crate::resize_engine::{ResizeEngine, ResizeSpec};
use crate::scaling::DpiScale;
use crate::services::{ControlCreateParams, ListKind, Services};
use crate::styling_primitives::FontDescription;
use crate::subclass::{self, SubclassRecord, SubclassTable};
use crate::types::{
    ControlId, FontHandle, ImageHandle, Message, NativeHandle, PageScope, ProcToken, Rect, Size,
    SurfaceHandle, WindowId,
};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

const CBN_SELCHANGE: i32 = 1;
const CB_GETCURSEL: u32 = 0x0147;

/// Callback receiving the events raised by a session's controls.
pub type EventHandler = Rc<dyn Fn(&ControlEvent)>;

enum CreateOutcome {
    Created(ControlId),
    Skipped(ControlId),
    Vanished,
}

/// Everything phase 2 of control creation produced, ready to be committed.
struct CreatedControl {
    handle: NativeHandle,
    companion: Option<NativeHandle>,
    previous: ProcToken,
    font: FontHandle,
    image: Option<ImageHandle>,
    physical: Rect,
}

pub struct WindowSession {
    window_id: WindowId,
    hwnd: Cell<NativeHandle>,
    services: Services,
    config: FrameworkConfig,
    registry: RefCell<ControlRegistry>,
    resize: RefCell<ResizeEngine>,
    subclasses: RefCell<SubclassTable>,
    fonts: RefCell<FontCache>,
    dpi: Cell<DpiScale>,
    active_page: RefCell<Option<String>>,
    event_handler: RefCell<Option<EventHandler>>,
}

impl std::fmt::Debug for WindowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSession")
            .field("window_id", &self.window_id)
            .field("hwnd", &self.hwnd.get())
            .field("dpi", &self.dpi.get())
            .finish_non_exhaustive()
    }
}

impl WindowSession {
    pub fn new(window_id: WindowId, services: Services, config: FrameworkConfig) -> Self {
        Self {
            window_id,
            hwnd: Cell::new(NativeHandle::NULL),
            services,
            config,
            registry: RefCell::new(ControlRegistry::new()),
            resize: RefCell::new(ResizeEngine::new()),
            subclasses: RefCell::new(SubclassTable::default()),
            fonts: RefCell::new(FontCache::new()),
            dpi: Cell::new(DpiScale::default()),
            active_page: RefCell::new(None),
            event_handler: RefCell::new(None),
        }
    }

    /// Binds the session to its native top-level window and adopts its DPI.
    pub fn attach_window(&self, hwnd: NativeHandle) {
        self.hwnd.set(hwnd);
        let dpi = self.services.runtime.dpi_for(hwnd);
        self.dpi.set(DpiScale::new(dpi));
        log::debug!(
            "WindowSession: WinID {:?} attached to {hwnd:?} at {dpi} DPI.",
            self.window_id
        );
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn hwnd(&self) -> NativeHandle {
        self.hwnd.get()
    }

    pub fn dpi(&self) -> DpiScale {
        self.dpi.get()
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn set_event_handler(&self, handler: impl Fn(&ControlEvent) + 'static) {
        *self.event_handler.borrow_mut() = Some(Rc::new(handler));
    }

    /*
     * Registry access. A failed borrow means the registry is being mutated
     * further up the stack; callers treat that as a recoverable state error
     * rather than a panic.
     */
    fn with_registry_read<R>(&self, f: impl FnOnce(&ControlRegistry) -> PlatformResult<R>) -> PlatformResult<R> {
        let registry = self.registry.try_borrow().map_err(|_| {
            PlatformError::InvalidState(format!(
                "Registry of WinID {:?} is being modified",
                self.window_id
            ))
        })?;
        f(&registry)
    }

    fn with_registry_write<R>(
        &self,
        f: impl FnOnce(&mut ControlRegistry) -> PlatformResult<R>,
    ) -> PlatformResult<R> {
        let mut registry = self.registry.try_borrow_mut().map_err(|_| {
            PlatformError::InvalidState(format!(
                "Registry of WinID {:?} is already borrowed",
                self.window_id
            ))
        })?;
        f(&mut registry)
    }

    fn with_resize_write<R>(&self, f: impl FnOnce(&mut ResizeEngine) -> R) -> PlatformResult<R> {
        let mut engine = self.resize.try_borrow_mut().map_err(|_| {
            PlatformError::InvalidState(format!(
                "Resize engine of WinID {:?} is already borrowed",
                self.window_id
            ))
        })?;
        Ok(f(&mut engine))
    }

    pub fn register_control(
        &self,
        scope: PageScope,
        descriptor: ControlDescriptor,
    ) -> PlatformResult<DescriptorKey> {
        self.with_registry_write(|registry| registry.register_control(scope, descriptor))
    }

    /// A copy of the current descriptor state of a control.
    pub fn control(&self, scope: &PageScope, id: ControlId) -> PlatformResult<ControlDescriptor> {
        self.with_registry_read(|registry| {
            let key = registry.key_of(scope, id)?;
            registry
                .get(key)
                .cloned()
                .ok_or_else(|| PlatformError::NotFound(format!("Control {} in {scope}", id.raw())))
        })
    }

    pub fn lookup_control(&self, scope: &PageScope, id: ControlId) -> PlatformResult<NativeHandle> {
        self.with_registry_read(|registry| registry.lookup(scope, id))
    }

    fn is_scope_visible(&self, scope: &PageScope) -> bool {
        match scope {
            PageScope::Pageless => true,
            PageScope::Page(name) => self.active_page.borrow().as_deref() == Some(name.as_str()),
        }
    }

    /*
     * Creates the native controls for every registered, not yet created
     * descriptor in `scope`, in registration order. Calling it again only
     * picks up controls registered since the last call. A failure to create
     * or subclass one control is recorded in the report and its siblings are
     * still created; only losing the parent window aborts the batch.
     */
    pub fn add_controls(&self, scope: &PageScope) -> PlatformResult<BatchReport> {
        let parent = self.hwnd.get();
        let runtime = self.services.runtime.as_ref();
        if parent.is_null() || !runtime.is_window(parent) {
            log::error!(
                "AddControls: WinID {:?} has no live window (hwnd {parent:?}).",
                self.window_id
            );
            return Err(PlatformError::RuntimeUnavailable(format!(
                "Window for WinID {:?} does not exist",
                self.window_id
            )));
        }

        let keys = self.with_registry_read(|registry| Ok(registry.keys_in_scope(scope)))?;
        let mut report = BatchReport::default();
        for key in keys {
            match self.create_control(parent, scope, key) {
                Ok(CreateOutcome::Created(id)) => report.created.push(id),
                Ok(CreateOutcome::Skipped(id)) => report.skipped.push(id),
                Ok(CreateOutcome::Vanished) => {}
                Err((_, error)) if error.is_fatal() => {
                    log::error!("AddControls: Aborting {scope} for WinID {:?}: {error}", self.window_id);
                    return Err(error);
                }
                Err((id, error)) => report.record_failure(scope, id, error),
            }
        }
        log::debug!(
            "AddControls: {scope} of WinID {:?}: {} created, {} skipped, {} failed.",
            self.window_id,
            report.created.len(),
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn create_control(
        &self,
        parent: NativeHandle,
        scope: &PageScope,
        key: DescriptorKey,
    ) -> Result<CreateOutcome, (ControlId, PlatformError)> {
        // Phase 1: read-check.
        let snapshot = match self.with_registry_read(|registry| {
            Ok(registry.get(key).map(|d| (d.is_created(), d.snapshot(), d.logical_rect(), d.style.font.clone())))
        }) {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(CreateOutcome::Vanished),
            Err(e) => return Err((ControlId::new(0), e)),
        };
        let (already_created, snapshot, logical_rect, font_override) = snapshot;
        if already_created {
            return Ok(CreateOutcome::Skipped(snapshot.id));
        }
        let id = snapshot.id;

        // Phase 2: native work, no borrow held.
        let created = self
            .create_native(parent, key, &snapshot, logical_rect, font_override)
            .map_err(|e| (id, e))?;

        // Phase 3: write-recheck.
        let committed = self
            .with_registry_write(|registry| {
                if registry.get(key).is_none_or(|d| d.is_created()) {
                    return Ok(false);
                }
                registry.attach_handle(key, created.handle)?;
                if let Some(descriptor) = registry.get_mut(key) {
                    descriptor.previous_proc = Some(created.previous);
                    descriptor.subclass = SubclassState::Subclassed;
                    descriptor.font = Some(created.font);
                    descriptor.image = created.image;
                    descriptor.companion = created.companion;
                }
                Ok(true)
            })
            .inspect_err(|_| self.discard_native(&created))
            .map_err(|e| (id, e))?;
        if !committed {
            log::debug!("AddControls: Control {} changed during creation, discarding {:?}.", id.raw(), created.handle);
            self.discard_native(&created);
            return Ok(CreateOutcome::Skipped(id));
        }

        /*
         * The control is committed from here on; a failure below is reported
         * for it but does not undo the creation.
         */
        let (resize, hidden) = self
            .with_registry_read(|registry| {
                let resize = registry.get(key).and_then(|d| d.effective_resize());
                Ok((resize, registry.is_hidden(key)))
            })
            .map_err(|e| {
                self.set_control_visible(created.handle, created.companion, false);
                (id, e)
            })?;
        if let Some(spec) = resize {
            if let Err(e) = self.register_resize_for(key, created.handle, created.physical, spec) {
                log::warn!("AddControls: Resize registration for control {} failed: {e}", id.raw());
            }
        }

        if hidden || !self.is_scope_visible(scope) {
            self.set_control_visible(created.handle, created.companion, false);
        }
        log::debug!("AddControls: Created control {} in {scope} as {:?}.", id.raw(), created.handle);
        Ok(CreateOutcome::Created(id))
    }

    fn create_native(
        &self,
        parent: NativeHandle,
        key: DescriptorKey,
        snapshot: &ControlSnapshot,
        logical_rect: Rect,
        font_override: Option<FontDescription>,
    ) -> PlatformResult<CreatedControl> {
        let runtime = self.services.runtime.as_ref();
        let class = snapshot.kind.native_class();
        let physical = self.dpi.get().to_physical(logical_rect);
        let handle = runtime
            .create_control(&ControlCreateParams {
                parent,
                class_name: class.class_name,
                text: &snapshot.text,
                style: class.style,
                ex_style: class.ex_style,
                rect: physical,
                id: snapshot.id,
            })
            .map_err(|e| {
                if runtime.is_window(parent) {
                    PlatformError::HandleCreation(format!("Control {}: {e}", snapshot.id.raw()))
                } else {
                    PlatformError::RuntimeUnavailable(format!(
                        "Parent {parent:?} went away while creating control {}",
                        snapshot.id.raw()
                    ))
                }
            })?;

        let previous = match subclass::attach(runtime, handle, key) {
            Ok(previous) => previous,
            Err(e) => {
                runtime.destroy_control(handle);
                return Err(e);
            }
        };
        if let Ok(mut table) = self.subclasses.try_borrow_mut() {
            table.insert(handle, SubclassRecord { key, previous });
        }

        let companion = snapshot.kind.companion_class().and_then(|companion_class| {
            let created = runtime.create_control(&ControlCreateParams {
                parent,
                class_name: companion_class.class_name,
                text: "",
                style: companion_class.style,
                ex_style: companion_class.ex_style,
                rect: Rect::default(),
                id: snapshot.id,
            });
            match created {
                Ok(companion) => Some(companion),
                Err(e) => {
                    log::warn!("AddControls: Companion of control {} not created: {e}", snapshot.id.raw());
                    None
                }
            }
        });

        let description = font_override.unwrap_or_else(|| self.config.font.clone());
        let font = self.resolve_font(&description);
        runtime.set_font(handle, font);

        let image = snapshot.data.image.as_ref().and_then(|source| {
            match self.services.images.load(source) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("AddControls: Image for control {} not loaded: {e}", snapshot.id.raw());
                    None
                }
            }
        });

        if let Some(list) = list_kind(snapshot.kind) {
            if !snapshot.data.items.is_empty() {
                if let Err(e) = runtime.set_list_items(handle, list, &snapshot.data.items, snapshot.data.selected) {
                    log::warn!("AddControls: Items of control {} not set: {e}", snapshot.id.raw());
                }
            }
        }

        let mut styled = snapshot.clone();
        styled.font = Some(font);
        styled.image = image;
        styled.companion = companion;
        snapshot.kind.apply_style(handle, &styled, &self.services, &self.config.theme);

        Ok(CreatedControl {
            handle,
            companion,
            previous,
            font,
            image,
            physical,
        })
    }

    fn discard_native(&self, created: &CreatedControl) {
        let runtime = self.services.runtime.as_ref();
        if let Some(companion) = created.companion {
            runtime.destroy_control(companion);
        }
        runtime.destroy_control(created.handle);
        if let Ok(mut table) = self.subclasses.try_borrow_mut() {
            table.remove(created.handle);
        }
        if let Some(image) = created.image {
            self.services.images.release(image);
        }
    }

    fn resolve_font(&self, description: &FontDescription) -> FontHandle {
        let fonts = self.services.fonts.as_ref();
        match self.fonts.try_borrow_mut() {
            Ok(mut cache) => cache.resolve_or_default(
                fonts,
                description,
                &self.config.fallback_font_family,
                self.dpi.get().dpi(),
            ),
            Err(_) => fonts.default_font(),
        }
    }

    fn parent_client_size(&self) -> PlatformResult<Size> {
        Ok(self.services.runtime.client_rect(self.hwnd.get())?.size())
    }

    fn register_resize_for(
        &self,
        key: DescriptorKey,
        handle: NativeHandle,
        physical: Rect,
        spec: ResizeSpec,
    ) -> PlatformResult<()> {
        let parent = self.parent_client_size()?;
        self.with_resize_write(|engine| engine.register(handle, physical, parent, spec))?;
        let dpi = self.dpi.get();
        let logical_parent = dpi.to_logical(Rect::from_origin_size(0, 0, parent.width, parent.height)).size();
        self.with_registry_write(|registry| {
            if let Some(descriptor) = registry.get_mut(key) {
                descriptor.set_resize(spec);
                descriptor.resize_parent = Some(logical_parent);
            }
            Ok(())
        })
    }

    /*
     * Registers `handle` with the resize engine, or replaces the coefficients of an
     * existing registration without touching its captured originals. A new
     * registration captures the control's current rectangle and the parent's
     * current client size.
     */
    pub fn register_resize(&self, handle: NativeHandle, spec: ResizeSpec) -> PlatformResult<()> {
        let updated = self.with_resize_write(|engine| engine.update_spec(handle, spec))?;
        let key = self.with_registry_read(|registry| Ok(registry.key_for_handle(handle)))?;
        if updated {
            if let Some(key) = key {
                self.with_registry_write(|registry| {
                    if let Some(descriptor) = registry.get_mut(key) {
                        descriptor.set_resize(spec);
                    }
                    Ok(())
                })?;
            }
            log::debug!("RegisterResize: Updated spec of {handle:?} to {spec:?}.");
            return Ok(());
        }

        let runtime = self.services.runtime.as_ref();
        if !runtime.is_window(handle) {
            return Err(PlatformError::NotFound(format!("Handle {handle:?} is not a live window")));
        }
        let rect = runtime.window_rect(handle)?;
        match key {
            Some(key) => self.register_resize_for(key, handle, rect, spec)?,
            None => {
                let parent = self.parent_client_size()?;
                self.with_resize_write(|engine| engine.register(handle, rect, parent, spec))?;
            }
        }
        log::debug!("RegisterResize: Registered {handle:?} at {rect:?} with {spec:?}.");
        Ok(())
    }

    /// Repositions every registered control for a new parent client size.
    pub fn on_parent_resize(&self, new_parent: Size) {
        let moves = match self.resize.try_borrow() {
            Ok(engine) => engine.on_parent_resize(new_parent),
            Err(_) => {
                log::warn!("OnParentResize: Resize engine busy, skipping {new_parent:?}.");
                return;
            }
        };
        let runtime = self.services.runtime.as_ref();
        for (handle, rect) in moves {
            if let Err(e) = runtime.set_window_rect(handle, rect) {
                log::warn!("OnParentResize: Moving {handle:?} to {rect:?} failed: {e}");
            }
        }
    }

    /*
     * Adopts a new DPI. Every created control is re-laid out from its logical
     * rectangle, so repeated changes never accumulate rounding error, and gets
     * a font created for the new DPI. Resize registrations are re-captured at
     * the new scale before the current parent size is applied to them.
     */
    pub fn set_dpi(&self, dpi: u32) -> PlatformResult<()> {
        let scale = DpiScale::new(dpi);
        if scale == self.dpi.get() {
            return Ok(());
        }
        log::debug!(
            "SetDpi: WinID {:?} {} -> {dpi} DPI.",
            self.window_id,
            self.dpi.get().dpi()
        );
        self.dpi.set(scale);

        let controls = self.with_registry_read(|registry| {
            Ok(registry
                .all_keys()
                .into_iter()
                .filter_map(|key| {
                    let d = registry.get(key)?;
                    Some((key, d.handle()?, d.logical_rect(), d.resize_parent, d.style.font.clone()))
                })
                .collect::<Vec<_>>())
        })?;
        let parent = self.parent_client_size().ok();
        let runtime = self.services.runtime.as_ref();

        for (key, handle, logical_rect, logical_parent, font_override) in controls {
            let physical = scale.to_physical(logical_rect);
            let registered = self
                .resize
                .try_borrow()
                .ok()
                .and_then(|engine| engine.registration(handle).map(|r| r.spec));
            let target = match (registered, logical_parent, parent) {
                (Some(spec), Some(logical_parent), Some(parent)) => {
                    let original_parent = Size::new(
                        scale.length(logical_parent.width),
                        scale.length(logical_parent.height),
                    );
                    self.with_resize_write(|engine| {
                        engine.register(handle, physical, original_parent, spec);
                        engine.compute(handle, parent)
                    })?
                    .unwrap_or(physical)
                }
                _ => physical,
            };
            if let Err(e) = runtime.set_window_rect(handle, target) {
                log::warn!("SetDpi: Moving {handle:?} failed: {e}");
            }

            let description = font_override.unwrap_or_else(|| self.config.font.clone());
            let font = self.resolve_font(&description);
            runtime.set_font(handle, font);
            runtime.invalidate(handle);
            self.with_registry_write(|registry| {
                if let Some(descriptor) = registry.get_mut(key) {
                    descriptor.font = Some(font);
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn set_control_visible(&self, handle: NativeHandle, companion: Option<NativeHandle>, visible: bool) {
        let runtime = self.services.runtime.as_ref();
        runtime.set_visible(handle, visible);
        if let Some(companion) = companion {
            runtime.set_visible(companion, visible);
        }
    }

    fn set_hidden(&self, scope: &PageScope, id: ControlId, hidden: bool) -> PlatformResult<()> {
        let (handle, companion) = self.with_registry_write(|registry| {
            let key = registry.key_of(scope, id)?;
            registry.set_hidden(key, hidden);
            let descriptor = registry
                .get(key)
                .ok_or_else(|| PlatformError::NotFound(format!("Control {} in {scope}", id.raw())))?;
            Ok((descriptor.handle(), descriptor.companion))
        })?;
        if let Some(handle) = handle {
            let visible = !hidden && self.is_scope_visible(scope);
            self.set_control_visible(handle, companion, visible);
        }
        Ok(())
    }

    /// Hides a control regardless of page switches until it is unhidden.
    pub fn hide_control(&self, scope: &PageScope, id: ControlId) -> PlatformResult<()> {
        self.set_hidden(scope, id, true)
    }

    pub fn unhide_control(&self, scope: &PageScope, id: ControlId) -> PlatformResult<()> {
        self.set_hidden(scope, id, false)
    }

    /*
     * Makes `page` the visible page: its controls and the pageless ones are
     * shown, every other page's controls are hidden. Controls hidden with
     * `hide_control` stay hidden.
     */
    pub fn show_page(&self, page: &str) -> PlatformResult<()> {
        *self.active_page.borrow_mut() = Some(page.to_string());
        let visibility = self.with_registry_read(|registry| {
            let mut visibility = Vec::new();
            for scope in registry.scopes() {
                let scope_visible = match scope {
                    PageScope::Pageless => true,
                    PageScope::Page(name) => name == page,
                };
                for key in registry.keys_in_scope(scope) {
                    let Some(descriptor) = registry.get(key) else {
                        continue;
                    };
                    if let Some(handle) = descriptor.handle() {
                        let visible = scope_visible && !registry.is_hidden(key);
                        visibility.push((handle, descriptor.companion, visible));
                    }
                }
            }
            Ok(visibility)
        })?;
        log::debug!("ShowPage: WinID {:?} switched to page '{page}'.", self.window_id);
        for (handle, companion, visible) in visibility {
            self.set_control_visible(handle, companion, visible);
        }
        Ok(())
    }

    /*
     * Removes a control. The descriptor is deregistered first so anything the
     * destruction sends back into the subclass procedure misses the registry
     * and is forwarded untouched; the handle is destroyed after that.
     */
    pub fn remove_control(&self, scope: &PageScope, id: ControlId) -> PlatformResult<()> {
        let descriptor = self.with_registry_write(|registry| registry.remove_control(scope, id))?;
        let runtime = self.services.runtime.as_ref();
        if let Some(handle) = descriptor.handle() {
            self.with_resize_write(|engine| engine.unregister(handle))?;
            if let Some(companion) = descriptor.companion {
                runtime.destroy_control(companion);
            }
            runtime.destroy_control(handle);
            if let Ok(mut table) = self.subclasses.try_borrow_mut() {
                table.remove(handle);
            }
        }
        if let Some(image) = descriptor.image {
            self.services.images.release(image);
        }
        log::debug!("RemoveControl: Removed control {} from {scope}.", id.raw());
        Ok(())
    }

    fn emit(&self, event: ControlEvent) {
        let handler = self.event_handler.borrow().clone();
        match handler {
            Some(handler) => handler(&event),
            None => log::trace!("WindowSession: No handler for {event:?}."),
        }
    }

    /*
     * The body of the framework's subclass procedure. Unsubclassed handles get
     * the system default procedure. Messages outside the kind's handled set,
     * and messages for handles whose descriptor is gone or stale, are
     * forwarded to the previous procedure exactly once.
     */
    pub fn dispatch_control_message(&self, handle: NativeHandle, message: Message) -> isize {
        let runtime = self.services.runtime.as_ref();
        let record = self.subclasses.try_borrow().ok().and_then(|table| table.get(handle));
        let Some(record) = record else {
            return runtime.default_procedure(handle, message);
        };

        let resolved = subclass::back_reference(runtime, handle).and_then(|key| {
            let registry = self.registry.try_borrow().ok()?;
            let descriptor = registry.get(key).filter(|d| d.handle() == Some(handle))?;
            Some((key, descriptor.snapshot()))
        });
        let Some((key, snapshot)) = resolved else {
            return subclass::forward(runtime, record.previous, handle, message);
        };
        if !snapshot.kind.handles(message.id) {
            return subclass::forward(runtime, record.previous, handle, message);
        }

        let ctx = MessageContext {
            handle,
            control: &snapshot,
            services: &self.services,
            theme: &self.config.theme,
        };
        let result = snapshot.kind.handle_message(&ctx, message);
        let reply = match result.reply {
            Reply::Handled(value) => value,
            Reply::Forward => subclass::forward(runtime, record.previous, handle, message),
            Reply::ForwardThenFrame => {
                let value = subclass::forward(runtime, record.previous, handle, message);
                dark_border::paint_themed_frame(&ctx);
                value
            }
        };
        self.commit_handler_result(key, handle, result);
        reply
    }

    fn commit_handler_result(&self, key: DescriptorKey, handle: NativeHandle, result: HandlerResult) {
        if result.visual.is_some() || result.value.is_some() {
            let committed = self.with_registry_write(|registry| {
                let Some(descriptor) = registry.get_mut(key).filter(|d| d.handle() == Some(handle)) else {
                    return Ok(false);
                };
                if let Some(visual) = result.visual {
                    descriptor.visual = visual;
                }
                if let Some(value) = result.value {
                    descriptor.data.value = value;
                    if descriptor.kind() == ControlKind::Selector {
                        descriptor.data.selected = usize::try_from(value).ok();
                    }
                }
                Ok(true)
            });
            if !matches!(committed, Ok(true)) {
                log::debug!("Dispatch: Descriptor for {handle:?} went away during handling.");
                return;
            }
        }
        if let Some(event) = result.event {
            self.emit(event);
        }
    }

    fn snapshot_for_handle(&self, handle: NativeHandle) -> Option<ControlSnapshot> {
        let registry = self.registry.try_borrow().ok()?;
        let key = registry.key_for_handle(handle)?;
        registry.get(key).map(|d| d.snapshot())
    }

    /*
     * Messages the top-level window receives on behalf of its controls. Returns
     * `None` when the window procedure should fall through to its default.
     */
    pub fn handle_parent_message(&self, message: Message) -> Option<isize> {
        match message.id {
            WM_SIZE => {
                let size = Size::new(loword_from_lparam(message.lparam), hiword_from_lparam(message.lparam));
                self.on_parent_resize(size);
                None
            }
            WM_DPICHANGED => {
                let dpi = hiword_from_wparam(message.wparam);
                if let Err(e) = self.set_dpi(dpi.max(1) as u32) {
                    log::warn!("WindowSession: DPI change to {dpi} failed: {e}");
                }
                None
            }
            WM_DRAWITEM => self.draw_item(message),
            WM_CTLCOLORSTATIC | WM_CTLCOLOREDIT | WM_CTLCOLORLISTBOX | WM_CTLCOLORBTN => {
                self.control_colors(message)
            }
            WM_COMMAND => self.command(message),
            _ => None,
        }
    }

    fn draw_item(&self, message: Message) -> Option<isize> {
        let item = self.services.runtime.decode_draw_item(message)?;
        let control = self.snapshot_for_handle(item.handle)?;
        if control.kind != ControlKind::Button {
            return None;
        }
        let theme = &self.config.theme;
        let (text, base) = effective_colors(&control, theme, control.kind);
        let state = button_handler::state_from_draw_item(&item, control.visual.hot);
        button_handler::paint_button(
            self.services.drawing.as_ref(),
            item.surface,
            item.rect,
            &control.text,
            control.font,
            theme,
            base,
            text,
            state,
        );
        Some(1)
    }

    fn control_colors(&self, message: Message) -> Option<isize> {
        let child = NativeHandle(message.lparam as usize);
        let control = self.snapshot_for_handle(child)?;
        let route = resolve_paint_route(control.kind, message.id);
        let (text, background) = route_colors(route, &control, &self.config.theme)?;
        Some(
            self.services
                .drawing
                .control_colors(SurfaceHandle(message.wparam), text, background),
        )
    }

    fn command(&self, message: Message) -> Option<isize> {
        let code = hiword_from_wparam(message.wparam);
        let child = NativeHandle(message.lparam as usize);
        let control = self.snapshot_for_handle(child)?;
        match (control.kind, code as u32) {
            (ControlKind::Button, BN_CLICKED) => {
                self.emit(button_handler::handle_bn_clicked(control.id));
                Some(0)
            }
            (ControlKind::ComboBox, _) if code == CBN_SELCHANGE => {
                let index = self.services.runtime.send_message(child, Message::bare(CB_GETCURSEL));
                let selected = usize::try_from(index).ok();
                let key = self
                    .with_registry_write(|registry| {
                        let key = registry.key_for_handle(child);
                        if let Some(descriptor) = key.and_then(|k| registry.get_mut(k)) {
                            descriptor.data.selected = selected;
                        }
                        Ok(key)
                    })
                    .ok()
                    .flatten();
                if key.is_some() {
                    self.emit(ControlEvent::ValueChanged {
                        id: control.id,
                        value: index as i32,
                    });
                }
                Some(0)
            }
            _ => None,
        }
    }

    /*
     * Replaces the items of a list-bearing control. The selection is kept
     * only if it still points at an item. Before creation the items are just
     * stored and pushed when the control is created.
     */
    pub fn set_items(
        &self,
        scope: &PageScope,
        id: ControlId,
        items: Vec<String>,
        selected: Option<usize>,
    ) -> PlatformResult<()> {
        let selected = normalize_selection(&items, selected);
        let (kind, handle) = self.with_registry_write(|registry| {
            let key = registry.key_of(scope, id)?;
            let descriptor = registry
                .get_mut(key)
                .ok_or_else(|| PlatformError::NotFound(format!("Control {} in {scope}", id.raw())))?;
            if !descriptor.kind().accepts_items() {
                return Err(PlatformError::InvalidState(format!(
                    "Control {} ({:?}) does not hold items",
                    id.raw(),
                    descriptor.kind()
                )));
            }
            descriptor.data.items = items.clone();
            descriptor.data.selected = selected;
            if descriptor.kind() == ControlKind::Selector {
                descriptor.data.value = selected.unwrap_or(0) as i32;
            }
            Ok((descriptor.kind(), descriptor.handle()))
        })?;

        let Some(handle) = handle else {
            return Ok(());
        };
        let runtime = self.services.runtime.as_ref();
        match list_kind(kind) {
            Some(list) => runtime.set_list_items(handle, list, &items, selected)?,
            None => runtime.invalidate(handle),
        }
        Ok(())
    }

    /*
     * Sets the value of a value-bearing control, clamped to what the kind
     * accepts, and asks the control to repaint itself.
     */
    pub fn set_value(&self, scope: &PageScope, id: ControlId, value: i32) -> PlatformResult<()> {
        let (kind, handle, value) = self.with_registry_write(|registry| {
            let key = registry.key_of(scope, id)?;
            let descriptor = registry
                .get_mut(key)
                .ok_or_else(|| PlatformError::NotFound(format!("Control {} in {scope}", id.raw())))?;
            let kind = descriptor.kind();
            if !kind.accepts_value() {
                return Err(PlatformError::InvalidState(format!(
                    "Control {} ({kind:?}) does not hold a value",
                    id.raw()
                )));
            }
            let data = &mut descriptor.data;
            let value = match kind {
                ControlKind::Toggle => i32::from(value != 0),
                ControlKind::Rating => value.clamp(0, data.range.1.max(1)),
                ControlKind::PasswordStrength => value.clamp(0, STRENGTH_LEVELS),
                ControlKind::Selector => value.clamp(0, (data.items.len() as i32 - 1).max(0)),
                _ => data.clamp_value(value),
            };
            data.value = value;
            if kind == ControlKind::Selector && !data.items.is_empty() {
                data.selected = Some(value as usize);
            }
            Ok((kind, descriptor.handle(), value))
        })?;

        let Some(handle) = handle else {
            return Ok(());
        };
        let runtime = self.services.runtime.as_ref();
        if let ControlKind::Edit { spin: true } = kind {
            runtime.set_text(handle, &value.to_string())?;
        } else {
            runtime.send_message(handle, Message::bare(WM_APP_VALUE_CHANGED));
        }
        Ok(())
    }

    pub fn set_text(&self, scope: &PageScope, id: ControlId, text: &str) -> PlatformResult<()> {
        let handle = self.with_registry_write(|registry| {
            let key = registry.key_of(scope, id)?;
            let descriptor = registry
                .get_mut(key)
                .ok_or_else(|| PlatformError::NotFound(format!("Control {} in {scope}", id.raw())))?;
            descriptor.text = text.to_string();
            Ok(descriptor.handle())
        })?;
        if let Some(handle) = handle {
            self.services.runtime.set_text(handle, text)?;
            self.services.runtime.invalidate(handle);
        }
        Ok(())
    }

    pub(crate) fn subclass_count(&self) -> usize {
        self.subclasses.try_borrow().map(|t| t.len()).unwrap_or(0)
    }
}

fn list_kind(kind: ControlKind) -> Option<ListKind> {
    match kind {
        ControlKind::ComboBox => Some(ListKind::ComboBox),
        ControlKind::ListView => Some(ListKind::ListView),
        _ => None,
    }
}

impl Drop for WindowSession {
    fn drop(&mut self) {
        if let Ok(mut cache) = self.fonts.try_borrow_mut() {
            cache.release_all(self.services.fonts.as_ref());
        }
        if let Ok(registry) = self.registry.try_borrow() {
            for key in registry.all_keys() {
                if let Some(image) = registry.get(key).and_then(|d| d.image) {
                    self.services.images.release(image);
                }
            }
        }
        log::debug!("WindowSession for WinID {:?} dropped, resources cleaned up.", self.window_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::VisualState;
    use crate::services::{DrawItem, DrawItemState, ImageSource, WindowingRuntime};
    use crate::testing::{DrawOp, FAKE_BRUSH, FakeServices, id};

    struct Fixture {
        fakes: FakeServices,
        session: Rc<WindowSession>,
        window: NativeHandle,
        events: Rc<RefCell<Vec<ControlEvent>>>,
    }

    fn fixture() -> Fixture {
        let fakes = FakeServices::new();
        let window = fakes.runtime.add_window(NativeHandle::NULL);
        let session = Rc::new(WindowSession::new(
            WindowId::new(1),
            fakes.services(),
            FrameworkConfig::default(),
        ));
        session.attach_window(window);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        session.set_event_handler(move |event| sink.borrow_mut().push(event.clone()));
        Fixture {
            fakes,
            session,
            window,
            events,
        }
    }

    fn button(raw: i32) -> ControlDescriptor {
        ControlDescriptor::new(id(raw), ControlKind::Button, Rect::from_origin_size(10, 10, 80, 24))
            .with_text("OK")
    }

    #[test]
    fn add_controls_creates_subclasses_and_is_idempotent() {
        // Arrange
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.register_control(PageScope::Pageless, button(2)).expect("register");

        // Act
        let first = f.session.add_controls(&PageScope::Pageless).expect("first");
        let second = f.session.add_controls(&PageScope::Pageless).expect("second");

        // Assert
        assert_eq!(first.created, vec![id(1), id(2)]);
        assert!(first.is_clean());
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, vec![id(1), id(2)]);
        assert_eq!(f.fakes.runtime.children_of(f.window).len(), 2);
        let control = f.session.control(&PageScope::Pageless, id(1)).expect("control");
        assert_eq!(control.subclass_state(), SubclassState::Subclassed);
        let handle = control.handle().expect("handle");
        assert_eq!(control.previous_proc(), f.fakes.runtime.previous_proc_of(handle));
    }

    #[test]
    fn controls_registered_later_are_picked_up_by_the_next_batch() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("first");
        f.session.register_control(PageScope::Pageless, button(2)).expect("register");
        let report = f.session.add_controls(&PageScope::Pageless).expect("second");
        assert_eq!(report.created, vec![id(2)]);
        assert_eq!(report.skipped, vec![id(1)]);
    }

    #[test]
    fn creation_failure_is_isolated_to_one_control() {
        // Arrange
        let f = fixture();
        for raw in 1..=3 {
            f.session.register_control(PageScope::Pageless, button(raw)).expect("register");
        }
        f.fakes.runtime.fail_create_for(2);

        // Act
        let report = f.session.add_controls(&PageScope::Pageless).expect("batch");

        // Assert
        assert_eq!(report.created, vec![id(1), id(3)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, id(2));
        assert!(matches!(report.failures[0].error, PlatformError::HandleCreation(_)));
        assert!(matches!(
            f.session.lookup_control(&PageScope::Pageless, id(2)),
            Err(PlatformError::NotFound(_))
        ));
    }

    #[test]
    fn subclass_failure_destroys_the_handle_and_reports_it() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.register_control(PageScope::Pageless, button(2)).expect("register");
        f.fakes.runtime.fail_subclass_for_id(1);

        let report = f.session.add_controls(&PageScope::Pageless).expect("batch");

        assert_eq!(report.created, vec![id(2)]);
        assert!(matches!(report.failures[0].error, PlatformError::SubclassAttach(_)));
        assert_eq!(f.fakes.runtime.destroyed().len(), 1);
        assert_eq!(f.fakes.runtime.children_of(f.window).len(), 1);
        assert_eq!(f.session.subclass_count(), 1);
        let control = f.session.control(&PageScope::Pageless, id(1)).expect("control");
        assert_eq!(control.subclass_state(), SubclassState::Unsubclassed);
    }

    #[test]
    fn commit_failure_discards_the_handle_and_reports_it() {
        // Arrange
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        let held = f.session.registry.borrow();

        // Act
        let report = f.session.add_controls(&PageScope::Pageless).expect("batch");
        drop(held);

        // Assert
        assert!(report.created.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, id(1));
        assert!(matches!(report.failures[0].error, PlatformError::InvalidState(_)));
        assert_eq!(f.fakes.runtime.destroyed().len(), 1);
        assert!(f.fakes.runtime.children_of(f.window).is_empty());
        assert_eq!(f.session.subclass_count(), 0);
        let control = f.session.control(&PageScope::Pageless, id(1)).expect("control");
        assert!(control.handle().is_none());
        assert_eq!(control.subclass_state(), SubclassState::Unsubclassed);
    }

    #[test]
    fn losing_the_parent_aborts_the_batch() {
        let f = fixture();
        for raw in 1..=3 {
            f.session.register_control(PageScope::Pageless, button(raw)).expect("register");
        }
        f.fakes.runtime.kill_parent_when_creating(2, f.window);

        let result = f.session.add_controls(&PageScope::Pageless);

        assert!(matches!(result, Err(PlatformError::RuntimeUnavailable(_))));
        assert!(f.session.lookup_control(&PageScope::Pageless, id(3)).is_err());
    }

    #[test]
    fn add_controls_without_a_window_is_fatal() {
        let fakes = FakeServices::new();
        let session = WindowSession::new(WindowId::new(9), fakes.services(), FrameworkConfig::default());
        let error = session.add_controls(&PageScope::Pageless).unwrap_err();
        assert!(error.is_fatal());
    }

    #[test]
    fn lookup_of_never_created_pageless_control_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.session.lookup_control(&PageScope::Pageless, id(77)),
            Err(PlatformError::NotFound(_))
        ));
    }

    #[test]
    fn unhandled_messages_are_forwarded_exactly_once() {
        // Arrange
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("handle");

        // Act
        f.session.dispatch_control_message(handle, Message::new(WM_CHAR, 'a' as usize, 0));
        f.session.dispatch_control_message(handle, Message::bare(WM_MOUSEMOVE));

        // Assert
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_CHAR), 1);
        // Buttons record hover state and still let the native button see the mouse.
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_MOUSEMOVE), 1);
        let control = f.session.control(&PageScope::Pageless, id(1)).expect("control");
        assert!(control.visual().hot);
        assert_eq!(f.fakes.runtime.tracked_count(handle), 1);
    }

    #[test]
    fn handled_messages_are_not_forwarded() {
        let f = fixture();
        let progress = ControlDescriptor::new(id(5), ControlKind::Progress, Rect::from_origin_size(0, 0, 100, 10));
        f.session.register_control(PageScope::Pageless, progress).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(5)).expect("handle");

        let erase = f.session.dispatch_control_message(handle, Message::bare(WM_ERASEBKGND));
        f.session.dispatch_control_message(handle, Message::bare(WM_PAINT));

        assert_eq!(erase, 1);
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_ERASEBKGND), 0);
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_PAINT), 0);
        assert_eq!(f.fakes.runtime.paint_count(handle), 1);
    }

    #[test]
    fn messages_during_destruction_are_forwarded_without_handling() {
        // Arrange
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("handle");
        let session = Rc::downgrade(&f.session);
        f.fakes.runtime.on_destroy(move |h| {
            if let Some(session) = session.upgrade() {
                session.dispatch_control_message(h, Message::bare(WM_MOUSEMOVE));
                session.dispatch_control_message(h, Message::bare(WM_NCDESTROY));
            }
        });

        // Act
        f.session.remove_control(&PageScope::Pageless, id(1)).expect("remove");

        // Assert
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_MOUSEMOVE), 1);
        assert_eq!(f.fakes.runtime.forward_count(handle, WM_NCDESTROY), 1);
        assert_eq!(f.fakes.runtime.tracked_count(handle), 0);
        assert_eq!(f.session.subclass_count(), 0);
    }

    #[test]
    fn messages_after_removal_fall_back_to_the_default_procedure() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("handle");

        // Removal happens while the mouse message is still being forwarded.
        let session = Rc::downgrade(&f.session);
        f.fakes.runtime.on_forward(move |h, message| {
            if message.id == WM_MOUSEMOVE {
                if let Some(session) = session.upgrade() {
                    session.remove_control(&PageScope::Pageless, id(1)).expect("remove");
                    session.dispatch_control_message(h, Message::bare(WM_DESTROY));
                }
            }
        });
        f.session.dispatch_control_message(handle, Message::bare(WM_MOUSEMOVE));

        assert_eq!(f.fakes.runtime.forward_count(handle, WM_DESTROY), 0);
        assert_eq!(f.fakes.runtime.default_count(handle), 1);
        assert!(f.session.control(&PageScope::Pageless, id(1)).is_err());
    }

    #[test]
    fn removed_id_can_be_registered_and_created_again() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let old = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("old");

        f.session.remove_control(&PageScope::Pageless, id(1)).expect("remove");
        assert!(matches!(
            f.session.register_control(PageScope::Pageless, button(1)),
            Ok(_)
        ));
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let new = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("new");

        assert_ne!(old, new);
        assert!(f.fakes.runtime.destroyed().contains(&old));
        assert!(!f.fakes.runtime.is_window(old));
    }

    #[test]
    fn duplicate_live_id_is_rejected() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        assert!(matches!(
            f.session.register_control(PageScope::Pageless, button(1)),
            Err(PlatformError::DuplicateId { .. })
        ));
    }

    #[test]
    fn show_page_switches_visibility_and_respects_hidden_controls() {
        // Arrange
        let f = fixture();
        let general = PageScope::page("general");
        let advanced = PageScope::page("advanced");
        f.session.register_control(general.clone(), button(1)).expect("register");
        f.session.register_control(general.clone(), button(2)).expect("register");
        f.session.register_control(advanced.clone(), button(1)).expect("register");
        f.session.register_control(PageScope::Pageless, button(9)).expect("register");
        for scope in [&general, &advanced, &PageScope::Pageless] {
            f.session.add_controls(scope).expect("batch");
        }
        let general_1 = f.session.lookup_control(&general, id(1)).expect("g1");
        let general_2 = f.session.lookup_control(&general, id(2)).expect("g2");
        let advanced_1 = f.session.lookup_control(&advanced, id(1)).expect("a1");
        let footer = f.session.lookup_control(&PageScope::Pageless, id(9)).expect("footer");
        f.session.hide_control(&general, id(2)).expect("hide");

        // Act
        f.session.show_page("general").expect("show");

        // Assert
        let runtime = &f.fakes.runtime;
        assert!(runtime.is_visible(general_1));
        assert!(!runtime.is_visible(general_2));
        assert!(!runtime.is_visible(advanced_1));
        assert!(runtime.is_visible(footer));

        f.session.show_page("advanced").expect("show");
        assert!(!runtime.is_visible(general_1));
        assert!(runtime.is_visible(advanced_1));
        assert!(runtime.is_visible(footer));

        f.session.unhide_control(&general, id(2)).expect("unhide");
        assert!(!runtime.is_visible(general_2));
        f.session.show_page("general").expect("show");
        assert!(runtime.is_visible(general_2));
    }

    #[test]
    fn parent_resize_moves_registered_controls() {
        // Arrange
        let f = fixture();
        f.fakes.runtime.set_client_size(f.window, Size::new(400, 300));
        let list = ControlDescriptor::new(id(3), ControlKind::ListView, Rect::new(190, 0, 200, 50))
            .with_resize(ResizeSpec::new(100, 0, 0, 0));
        f.session.register_control(PageScope::Pageless, list).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(3)).expect("handle");

        // Act
        let lparam = ((350 << 16) | 500) as isize;
        let result = f.session.handle_parent_message(Message::new(WM_SIZE, 0, lparam));

        // Assert
        assert_eq!(result, None);
        assert_eq!(f.fakes.runtime.rect_of(handle), Some(Rect::new(290, 0, 300, 50)));
    }

    #[test]
    fn register_resize_updates_spec_without_recapturing() {
        let f = fixture();
        f.fakes.runtime.set_client_size(f.window, Size::new(400, 300));
        let list = ControlDescriptor::new(id(3), ControlKind::ListView, Rect::new(10, 10, 110, 60));
        f.session.register_control(PageScope::Pageless, list).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(3)).expect("handle");

        f.session.on_parent_resize(Size::new(500, 300));
        f.session.register_resize(handle, ResizeSpec::FILL).expect("update");
        f.session.on_parent_resize(Size::new(500, 400));

        assert_eq!(f.fakes.runtime.rect_of(handle), Some(Rect::new(10, 10, 210, 160)));
        let control = f.session.control(&PageScope::Pageless, id(3)).expect("control");
        assert_eq!(control.effective_resize(), Some(ResizeSpec::FILL));
    }

    #[test]
    fn register_resize_of_unknown_handle_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.session.register_resize(NativeHandle(0xBAD), ResizeSpec::FILL),
            Err(PlatformError::NotFound(_))
        ));
    }

    #[test]
    fn dpi_change_rescales_from_logical_rects_and_recreates_fonts() {
        // Arrange
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(1)).expect("handle");
        let font_96 = f.fakes.runtime.window(handle).and_then(|w| w.font);

        // Act
        f.session.set_dpi(144).expect("144");
        let at_144 = f.fakes.runtime.rect_of(handle);
        let font_144 = f.fakes.runtime.window(handle).and_then(|w| w.font);
        f.session.set_dpi(96).expect("96");

        // Assert
        assert_eq!(at_144, Some(Rect::from_origin_size(15, 15, 120, 36)));
        assert_ne!(font_96, font_144);
        assert_eq!(f.fakes.runtime.rect_of(handle), Some(Rect::from_origin_size(10, 10, 80, 24)));
        assert_eq!(f.fakes.runtime.window(handle).and_then(|w| w.font), font_96);
        assert_eq!(f.fakes.fonts.created_heights(), vec![-12, -18]);
    }

    #[test]
    fn clicks_raise_events_through_the_parent() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(4)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(4)).expect("handle");

        let wparam = (BN_CLICKED as usize) << 16 | 4;
        let result = f.session.handle_parent_message(Message::new(WM_COMMAND, wparam, handle.0 as isize));

        assert_eq!(result, Some(0));
        assert_eq!(*f.events.borrow(), vec![ControlEvent::Clicked(id(4))]);
    }

    #[test]
    fn owner_draw_button_is_painted_with_fitted_caption() {
        let f = fixture();
        let wide = button(4).with_text("Open");
        f.session.register_control(PageScope::Pageless, wide).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(4)).expect("handle");
        f.fakes.runtime.set_draw_item(DrawItem {
            control_id: id(4),
            handle,
            surface: SurfaceHandle(1),
            rect: Rect::from_origin_size(0, 0, 80, 24),
            state: DrawItemState::default(),
        });

        let result = f.session.handle_parent_message(Message::bare(WM_DRAWITEM));

        assert_eq!(result, Some(1));
        assert_eq!(f.fakes.drawing.texts(), vec!["Open".to_string()]);
    }

    #[test]
    fn color_queries_are_routed_by_kind() {
        let f = fixture();
        let edit = ControlDescriptor::new(id(6), ControlKind::Edit { spin: false }, Rect::from_origin_size(0, 0, 90, 20));
        f.session.register_control(PageScope::Pageless, edit).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(6)).expect("handle");

        let result = f
            .session
            .handle_parent_message(Message::new(WM_CTLCOLORSTATIC, 0x77, handle.0 as isize));

        assert_eq!(result, Some(FAKE_BRUSH));
        let theme = &f.session.config().theme;
        assert!(f.fakes.drawing.ops().contains(&DrawOp::ControlColors {
            text: theme.text,
            background: theme.input_background,
        }));
        assert_eq!(
            f.session
                .handle_parent_message(Message::new(WM_CTLCOLORBTN, 0x77, handle.0 as isize)),
            None
        );
        assert_eq!(
            f.session.handle_parent_message(Message::new(WM_CTLCOLORSTATIC, 0, 0x4242)),
            None
        );
    }

    #[test]
    fn set_value_clamps_and_notifies_the_control() {
        let f = fixture();
        let progress = ControlDescriptor::new(id(5), ControlKind::Progress, Rect::from_origin_size(0, 0, 100, 10));
        f.session.register_control(PageScope::Pageless, progress).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(5)).expect("handle");

        f.session.set_value(&PageScope::Pageless, id(5), 250).expect("value");
        let sent = f.fakes.runtime.sent_to(handle);
        f.session.dispatch_control_message(handle, *sent.last().expect("notification"));

        let control = f.session.control(&PageScope::Pageless, id(5)).expect("control");
        assert_eq!(control.data().value, 100);
        assert_eq!(sent.last().map(|m| m.id), Some(WM_APP_VALUE_CHANGED));
        assert_eq!(f.fakes.runtime.invalidate_count(handle), 1);
    }

    #[test]
    fn set_value_on_a_label_is_invalid() {
        let f = fixture();
        let label = ControlDescriptor::new(id(8), ControlKind::Text, Rect::default());
        f.session.register_control(PageScope::Pageless, label).expect("register");
        assert!(matches!(
            f.session.set_value(&PageScope::Pageless, id(8), 1),
            Err(PlatformError::InvalidState(_))
        ));
    }

    #[test]
    fn toggle_click_flips_value_and_raises_event() {
        // Arrange
        let f = fixture();
        let toggle = ControlDescriptor::new(id(7), ControlKind::Toggle, Rect::from_origin_size(0, 0, 40, 20));
        f.session.register_control(PageScope::Pageless, toggle).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(7)).expect("handle");

        // Act
        f.session.dispatch_control_message(handle, Message::new(WM_LBUTTONDOWN, 0, pack_point(crate::types::Point::new(5, 5))));
        f.session.dispatch_control_message(handle, Message::new(WM_LBUTTONUP, 0, pack_point(crate::types::Point::new(5, 5))));

        // Assert
        let control = f.session.control(&PageScope::Pageless, id(7)).expect("control");
        assert_eq!(control.data().value, 1);
        assert_eq!(control.visual(), VisualState::default());
        assert_eq!(*f.events.borrow(), vec![ControlEvent::ValueChanged { id: id(7), value: 1 }]);
    }

    #[test]
    fn selector_items_drop_stale_selection() {
        let f = fixture();
        let selector = ControlDescriptor::new(id(11), ControlKind::Selector, Rect::from_origin_size(0, 0, 90, 20))
            .with_items(vec!["a".into(), "b".into(), "c".into()], Some(2));
        f.session.register_control(PageScope::Pageless, selector).expect("register");

        f.session
            .set_items(&PageScope::Pageless, id(11), vec!["x".into()], Some(2))
            .expect("items");

        let control = f.session.control(&PageScope::Pageless, id(11)).expect("control");
        assert_eq!(control.data().selected, None);
        assert_eq!(control.data().value, 0);
    }

    #[test]
    fn combo_items_are_pushed_on_creation() {
        let f = fixture();
        let combo = ControlDescriptor::new(id(12), ControlKind::ComboBox, Rect::from_origin_size(0, 0, 90, 200))
            .with_items(vec!["one".into(), "two".into()], Some(1));
        f.session.register_control(PageScope::Pageless, combo).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let handle = f.session.lookup_control(&PageScope::Pageless, id(12)).expect("handle");

        let window = f.fakes.runtime.window(handle).expect("window");
        assert_eq!(window.items, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(window.selected, Some(1));
    }

    #[test]
    fn image_failure_degrades_and_images_are_released() {
        let f = fixture();
        let image = ControlDescriptor::new(id(13), ControlKind::Image, Rect::from_origin_size(0, 0, 32, 32))
            .with_image(ImageSource::Resource(101));
        let broken = ControlDescriptor::new(id(14), ControlKind::Image, Rect::from_origin_size(40, 0, 32, 32))
            .with_image(ImageSource::Resource(102));
        f.session.register_control(PageScope::Pageless, image).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        f.fakes.images.fail_loading(true);
        f.session.register_control(PageScope::Pageless, broken).expect("register");
        let report = f.session.add_controls(&PageScope::Pageless).expect("batch");

        assert_eq!(report.created, vec![id(14)]);
        assert!(report.is_clean());
        f.session.remove_control(&PageScope::Pageless, id(13)).expect("remove");
        assert_eq!(f.fakes.images.live_count(), 0);
    }

    #[test]
    fn spin_edit_gets_a_companion_that_follows_visibility() {
        let f = fixture();
        let spin = ControlDescriptor::new(id(15), ControlKind::Edit { spin: true }, Rect::from_origin_size(0, 0, 60, 20))
            .with_range(0, 10);
        f.session.register_control(PageScope::page("p"), spin).expect("register");
        f.session.add_controls(&PageScope::page("p")).expect("batch");
        let handle = f.session.lookup_control(&PageScope::page("p"), id(15)).expect("handle");
        let companion = f
            .fakes
            .runtime
            .children_of(f.window)
            .into_iter()
            .find(|h| *h != handle)
            .expect("companion");

        assert!(!f.fakes.runtime.is_visible(handle));
        assert!(!f.fakes.runtime.is_visible(companion));
        f.session.show_page("p").expect("show");
        assert!(f.fakes.runtime.is_visible(companion));

        f.session.set_value(&PageScope::page("p"), id(15), 42).expect("value");
        assert_eq!(f.fakes.runtime.window(handle).map(|w| w.text), Some("10".to_string()));
    }

    #[test]
    fn dropping_the_session_releases_fonts() {
        let f = fixture();
        f.session.register_control(PageScope::Pageless, button(1)).expect("register");
        f.session.add_controls(&PageScope::Pageless).expect("batch");
        let fonts = f.fakes.fonts.clone();
        drop(f.session);
        assert_eq!(fonts.live_count(), 0);
    }
}
