/*
 * Recording fakes of the service traits for the unit tests. They keep just
 * enough window state to answer queries consistently, record every call the
 * framework makes, and let a test inject failures at each seam.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::IDCANCEL;
use crate::services::{
    ChromeHandle, ControlCreateParams, DialogChromeService, DialogHooks, DialogKind, DrawItem,
    DrawingService, FileDialogRequest, FileDialogResponse, FolderDialogRequest, FontService,
    ImageService, ImageSource, ListKind, Services, SystemDialogService, TextFormat, WindowingRuntime,
};
use crate::styling_primitives::{Color, FontWeight};
use crate::types::{
    ControlId, FontHandle, ImageHandle, Message, NativeHandle, ProcToken, Rect, Size, SurfaceHandle,
};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

const FIRST_HANDLE: usize = 0x1000;
const PROC_BASE: usize = 0x5000_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeWindow {
    pub parent: NativeHandle,
    pub class_name: String,
    pub text: String,
    pub style: u32,
    pub ex_style: u32,
    pub rect: Rect,
    pub id: i32,
    pub visible: bool,
    pub user_data: u64,
    pub font: Option<FontHandle>,
    pub items: Vec<String>,
    pub selected: Option<usize>,
}

type MessageHook = Rc<dyn Fn(NativeHandle, Message)>;
type HandleHook = Rc<dyn Fn(NativeHandle)>;

#[derive(Default)]
pub(crate) struct FakeRuntime {
    windows: RefCell<HashMap<NativeHandle, FakeWindow>>,
    next_handle: Cell<usize>,
    fail_create_ids: RefCell<HashSet<i32>>,
    fail_subclass_handles: RefCell<HashSet<NativeHandle>>,
    fail_subclass_ids: RefCell<HashSet<i32>>,
    fail_style_handles: RefCell<HashSet<NativeHandle>>,
    fail_move_handles: RefCell<HashSet<NativeHandle>>,
    kill_parent_on_create_id: RefCell<Option<(i32, NativeHandle)>>,
    procs: RefCell<HashMap<NativeHandle, ProcToken>>,
    attach_log: RefCell<Vec<(NativeHandle, &'static str)>>,
    forwarded: RefCell<Vec<(NativeHandle, ProcToken, Message)>>,
    defaulted: RefCell<Vec<(NativeHandle, Message)>>,
    sent: RefCell<Vec<(NativeHandle, Message)>>,
    invalidated: RefCell<Vec<NativeHandle>>,
    destroyed: RefCell<Vec<NativeHandle>>,
    tracked: RefCell<Vec<NativeHandle>>,
    painted: RefCell<Vec<NativeHandle>>,
    draw_item: RefCell<Option<DrawItem>>,
    dpi: Cell<u32>,
    work_area: Cell<Option<Rect>>,
    on_forward: RefCell<Option<MessageHook>>,
    on_destroy: RefCell<Option<HandleHook>>,
}

impl FakeRuntime {
    pub(crate) fn new() -> Self {
        let runtime = Self::default();
        runtime.next_handle.set(FIRST_HANDLE);
        runtime.dpi.set(96);
        runtime
    }

    fn allocate(&self) -> NativeHandle {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 0x10);
        NativeHandle(raw)
    }

    /// A live top-level (or child, when `parent` is set) window 800x600.
    pub(crate) fn add_window(&self, parent: NativeHandle) -> NativeHandle {
        self.add_window_with(parent, "FakeWindow", 0, Rect::new(0, 0, 800, 600))
    }

    pub(crate) fn add_window_with(&self, parent: NativeHandle, class_name: &str, id: i32, rect: Rect) -> NativeHandle {
        let handle = self.allocate();
        self.windows.borrow_mut().insert(
            handle,
            FakeWindow {
                parent,
                class_name: class_name.to_string(),
                text: String::new(),
                style: 0,
                ex_style: 0,
                rect,
                id,
                visible: true,
                user_data: 0,
                font: None,
                items: Vec::new(),
                selected: None,
            },
        );
        handle
    }

    pub(crate) fn set_client_size(&self, handle: NativeHandle, size: Size) {
        if let Some(window) = self.windows.borrow_mut().get_mut(&handle) {
            window.rect = Rect::from_origin_size(window.rect.left, window.rect.top, size.width, size.height);
        }
    }

    /// Makes the handle disappear as if the window was destroyed behind our back.
    pub(crate) fn kill_window(&self, handle: NativeHandle) {
        self.windows.borrow_mut().remove(&handle);
    }

    pub(crate) fn fail_create_for(&self, id: i32) {
        self.fail_create_ids.borrow_mut().insert(id);
    }

    pub(crate) fn fail_subclass_for(&self, handle: NativeHandle) {
        self.fail_subclass_handles.borrow_mut().insert(handle);
    }

    pub(crate) fn fail_subclass_for_id(&self, id: i32) {
        self.fail_subclass_ids.borrow_mut().insert(id);
    }

    /// `set_window_style` on `handle` fails and leaves the style as it was.
    pub(crate) fn fail_style_for(&self, handle: NativeHandle) {
        self.fail_style_handles.borrow_mut().insert(handle);
    }

    /// `set_window_rect` on `handle` fails and leaves the window where it was.
    pub(crate) fn fail_move_for(&self, handle: NativeHandle) {
        self.fail_move_handles.borrow_mut().insert(handle);
    }

    /// Creating control `id` fails and takes `parent` down with it.
    pub(crate) fn kill_parent_when_creating(&self, id: i32, parent: NativeHandle) {
        *self.kill_parent_on_create_id.borrow_mut() = Some((id, parent));
    }

    pub(crate) fn set_dpi(&self, dpi: u32) {
        self.dpi.set(dpi);
    }

    pub(crate) fn set_work_area(&self, rect: Rect) {
        self.work_area.set(Some(rect));
    }

    pub(crate) fn set_draw_item(&self, item: DrawItem) {
        *self.draw_item.borrow_mut() = Some(item);
    }

    /// Runs `hook` from inside `call_previous`, before it returns.
    pub(crate) fn on_forward(&self, hook: impl Fn(NativeHandle, Message) + 'static) {
        *self.on_forward.borrow_mut() = Some(Rc::new(hook));
    }

    /// Runs `hook` from inside `destroy_control`, while the handle is still alive.
    pub(crate) fn on_destroy(&self, hook: impl Fn(NativeHandle) + 'static) {
        *self.on_destroy.borrow_mut() = Some(Rc::new(hook));
    }

    pub(crate) fn window(&self, handle: NativeHandle) -> Option<FakeWindow> {
        self.windows.borrow().get(&handle).cloned()
    }

    pub(crate) fn is_visible(&self, handle: NativeHandle) -> bool {
        self.window(handle).is_some_and(|w| w.visible)
    }

    pub(crate) fn rect_of(&self, handle: NativeHandle) -> Option<Rect> {
        self.window(handle).map(|w| w.rect)
    }

    pub(crate) fn children_of(&self, parent: NativeHandle) -> Vec<NativeHandle> {
        let mut children: Vec<NativeHandle> = self
            .windows
            .borrow()
            .iter()
            .filter(|(_, w)| w.parent == parent)
            .map(|(h, _)| *h)
            .collect();
        children.sort();
        children
    }

    pub(crate) fn child_with_id(&self, parent: NativeHandle, id: i32) -> Option<NativeHandle> {
        self.windows
            .borrow()
            .iter()
            .find(|(_, w)| w.parent == parent && w.id == id)
            .map(|(h, _)| *h)
    }

    pub(crate) fn previous_proc_of(&self, handle: NativeHandle) -> Option<ProcToken> {
        self.procs.borrow().get(&handle).copied()
    }

    pub(crate) fn attach_order(&self, handle: NativeHandle) -> Vec<&'static str> {
        self.attach_log
            .borrow()
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, step)| *step)
            .collect()
    }

    pub(crate) fn forward_count(&self, handle: NativeHandle, message_id: u32) -> usize {
        self.forwarded
            .borrow()
            .iter()
            .filter(|(h, _, m)| *h == handle && m.id == message_id)
            .count()
    }

    pub(crate) fn default_count(&self, handle: NativeHandle) -> usize {
        self.defaulted.borrow().iter().filter(|(h, _)| *h == handle).count()
    }

    pub(crate) fn sent_to(&self, handle: NativeHandle) -> Vec<Message> {
        self.sent
            .borrow()
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, m)| *m)
            .collect()
    }

    pub(crate) fn invalidate_count(&self, handle: NativeHandle) -> usize {
        self.invalidated.borrow().iter().filter(|h| **h == handle).count()
    }

    pub(crate) fn destroyed(&self) -> Vec<NativeHandle> {
        self.destroyed.borrow().clone()
    }

    pub(crate) fn created_count(&self) -> usize {
        (self.next_handle.get() - FIRST_HANDLE) / 0x10
    }

    pub(crate) fn paint_count(&self, handle: NativeHandle) -> usize {
        self.painted.borrow().iter().filter(|h| **h == handle).count()
    }

    pub(crate) fn tracked_count(&self, handle: NativeHandle) -> usize {
        self.tracked.borrow().iter().filter(|h| **h == handle).count()
    }

    fn missing(handle: NativeHandle) -> PlatformError {
        PlatformError::NotFound(format!("Fake window {handle:?} does not exist"))
    }
}

impl WindowingRuntime for FakeRuntime {
    fn is_window(&self, handle: NativeHandle) -> bool {
        self.windows.borrow().contains_key(&handle)
    }

    fn create_control(&self, params: &ControlCreateParams<'_>) -> PlatformResult<NativeHandle> {
        let id = params.id.raw();
        let kill = *self.kill_parent_on_create_id.borrow();
        if let Some((kill_id, parent)) = kill {
            if kill_id == id {
                self.kill_window(parent);
                return Err(PlatformError::HandleCreation(format!("Parent died creating {id}")));
            }
        }
        if self.fail_create_ids.borrow().contains(&id) || !self.is_window(params.parent) {
            return Err(PlatformError::HandleCreation(format!(
                "Injected failure creating '{}' {id}",
                params.class_name
            )));
        }
        let handle = self.add_window_with(params.parent, params.class_name, id, params.rect);
        if let Some(window) = self.windows.borrow_mut().get_mut(&handle) {
            window.text = params.text.to_string();
            window.style = params.style;
            window.ex_style = params.ex_style;
        }
        if self.fail_subclass_ids.borrow().contains(&id) {
            self.fail_subclass_handles.borrow_mut().insert(handle);
        }
        Ok(handle)
    }

    fn destroy_control(&self, handle: NativeHandle) {
        let hook = self.on_destroy.borrow().clone();
        if let Some(hook) = hook {
            hook(handle);
        }
        self.destroyed.borrow_mut().push(handle);
        self.windows.borrow_mut().remove(&handle);
    }

    fn install_subclass(&self, handle: NativeHandle) -> PlatformResult<ProcToken> {
        if self.fail_subclass_handles.borrow().contains(&handle) {
            return Err(PlatformError::OperationFailed(format!(
                "Injected subclass failure on {handle:?}"
            )));
        }
        if !self.is_window(handle) {
            return Err(Self::missing(handle));
        }
        let previous = ProcToken(PROC_BASE + handle.0);
        self.procs.borrow_mut().insert(handle, previous);
        self.attach_log.borrow_mut().push((handle, "subclass"));
        Ok(previous)
    }

    fn call_previous(&self, previous: ProcToken, handle: NativeHandle, message: Message) -> isize {
        self.forwarded.borrow_mut().push((handle, previous, message));
        let hook = self.on_forward.borrow().clone();
        if let Some(hook) = hook {
            hook(handle, message);
        }
        0
    }

    fn default_procedure(&self, handle: NativeHandle, message: Message) -> isize {
        self.defaulted.borrow_mut().push((handle, message));
        0
    }

    fn set_user_data(&self, handle: NativeHandle, data: u64) -> PlatformResult<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&handle).ok_or_else(|| Self::missing(handle))?;
        window.user_data = data;
        self.attach_log.borrow_mut().push((handle, "user_data"));
        Ok(())
    }

    fn user_data(&self, handle: NativeHandle) -> Option<u64> {
        self.windows.borrow().get(&handle).map(|w| w.user_data)
    }

    fn send_message(&self, handle: NativeHandle, message: Message) -> isize {
        self.sent.borrow_mut().push((handle, message));
        0
    }

    fn track_mouse_leave(&self, handle: NativeHandle) {
        self.tracked.borrow_mut().push(handle);
    }

    fn client_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        let rect = self.rect_of(handle).ok_or_else(|| Self::missing(handle))?;
        Ok(Rect::from_origin_size(0, 0, rect.width(), rect.height()))
    }

    fn window_rect(&self, handle: NativeHandle) -> PlatformResult<Rect> {
        self.rect_of(handle).ok_or_else(|| Self::missing(handle))
    }

    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()> {
        if self.fail_move_handles.borrow().contains(&handle) {
            return Err(PlatformError::OperationFailed(format!("Injected move failure on {handle:?}")));
        }
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&handle).ok_or_else(|| Self::missing(handle))?;
        window.rect = rect;
        Ok(())
    }

    fn set_visible(&self, handle: NativeHandle, visible: bool) {
        if let Some(window) = self.windows.borrow_mut().get_mut(&handle) {
            window.visible = visible;
        }
    }

    fn invalidate(&self, handle: NativeHandle) {
        self.invalidated.borrow_mut().push(handle);
    }

    fn set_font(&self, handle: NativeHandle, font: FontHandle) {
        if let Some(window) = self.windows.borrow_mut().get_mut(&handle) {
            window.font = Some(font);
        }
    }

    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&handle).ok_or_else(|| Self::missing(handle))?;
        window.text = text.to_string();
        Ok(())
    }

    fn set_list_items(
        &self,
        handle: NativeHandle,
        _list: ListKind,
        items: &[String],
        selected: Option<usize>,
    ) -> PlatformResult<()> {
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&handle).ok_or_else(|| Self::missing(handle))?;
        window.items = items.to_vec();
        window.selected = selected;
        Ok(())
    }

    fn window_style(&self, handle: NativeHandle) -> u32 {
        self.window(handle).map(|w| w.style).unwrap_or(0)
    }

    fn set_window_style(&self, handle: NativeHandle, style: u32) -> PlatformResult<()> {
        if self.fail_style_handles.borrow().contains(&handle) {
            return Err(PlatformError::OperationFailed(format!("Injected style failure on {handle:?}")));
        }
        let mut windows = self.windows.borrow_mut();
        let window = windows.get_mut(&handle).ok_or_else(|| Self::missing(handle))?;
        window.style = style;
        Ok(())
    }

    fn work_area(&self, _handle: NativeHandle) -> Rect {
        self.work_area.get().unwrap_or(Rect::new(0, 0, 1920, 1040))
    }

    fn dpi_for(&self, _handle: NativeHandle) -> u32 {
        self.dpi.get()
    }

    fn begin_paint(&self, handle: NativeHandle) -> Option<(SurfaceHandle, Rect)> {
        let rect = self.client_rect(handle).ok()?;
        self.painted.borrow_mut().push(handle);
        Some((SurfaceHandle(handle.0), rect))
    }

    fn end_paint(&self, _handle: NativeHandle, _surface: SurfaceHandle) {}

    fn window_surface(&self, handle: NativeHandle) -> Option<SurfaceHandle> {
        self.is_window(handle).then_some(SurfaceHandle(handle.0))
    }

    fn release_surface(&self, _handle: NativeHandle, _surface: SurfaceHandle) {}

    fn dialog_item(&self, dialog: NativeHandle, item_id: i32) -> Option<NativeHandle> {
        self.child_with_id(dialog, item_id)
    }

    fn child_windows(&self, parent: NativeHandle) -> Vec<NativeHandle> {
        self.children_of(parent)
    }

    fn window_text(&self, handle: NativeHandle) -> String {
        self.window(handle).map(|w| w.text).unwrap_or_default()
    }

    fn decode_draw_item(&self, _message: Message) -> Option<DrawItem> {
        *self.draw_item.borrow()
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DrawOp {
    Fill(Rect, Color),
    RoundRect { rect: Rect, fill: Color, border: Color },
    Frame(Rect, Color),
    Text { text: String, rect: Rect, color: Color },
    Image(ImageHandle, Rect),
    ControlColors { text: Color, background: Color },
}

pub(crate) const FAKE_BRUSH: isize = 0xB055;
pub(crate) const FAKE_CHAR_WIDTH: i32 = 7;
pub(crate) const FAKE_LINE_HEIGHT: i32 = 14;

#[derive(Debug, Default)]
pub(crate) struct FakeDrawing {
    ops: RefCell<Vec<(SurfaceHandle, DrawOp)>>,
}

impl FakeDrawing {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().iter().map(|(_, op)| op.clone()).collect()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.ops.borrow_mut().clear();
    }

    fn record(&self, surface: SurfaceHandle, op: DrawOp) {
        self.ops.borrow_mut().push((surface, op));
    }
}

impl DrawingService for FakeDrawing {
    fn fill_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color) {
        self.record(surface, DrawOp::Fill(rect, color));
    }

    fn round_rect(&self, surface: SurfaceHandle, rect: Rect, _radius: i32, fill: Color, border: Color) {
        self.record(surface, DrawOp::RoundRect { rect, fill, border });
    }

    fn frame_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color) {
        self.record(surface, DrawOp::Frame(rect, color));
    }

    fn measure_text(&self, _surface: SurfaceHandle, text: &str, _font: Option<FontHandle>) -> Size {
        Size::new(text.chars().count() as i32 * FAKE_CHAR_WIDTH, FAKE_LINE_HEIGHT)
    }

    fn draw_text(
        &self,
        surface: SurfaceHandle,
        text: &str,
        rect: Rect,
        color: Color,
        _font: Option<FontHandle>,
        _format: TextFormat,
    ) {
        self.record(
            surface,
            DrawOp::Text {
                text: text.to_string(),
                rect,
                color,
            },
        );
    }

    fn draw_image(&self, surface: SurfaceHandle, image: ImageHandle, rect: Rect) {
        self.record(surface, DrawOp::Image(image, rect));
    }

    fn control_colors(&self, surface: SurfaceHandle, text: Color, background: Color) -> isize {
        self.record(surface, DrawOp::ControlColors { text, background });
        FAKE_BRUSH
    }
}

pub(crate) const FAKE_DEFAULT_FONT: FontHandle = FontHandle(0xF0F0);

#[derive(Debug, Default)]
pub(crate) struct FakeFonts {
    families: Vec<String>,
    created: RefCell<Vec<(String, i32, FontWeight, FontHandle)>>,
    deleted: RefCell<Vec<FontHandle>>,
    fail: Cell<bool>,
}

impl FakeFonts {
    pub(crate) fn with_families(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn fail_creation(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub(crate) fn created_heights(&self) -> Vec<i32> {
        self.created.borrow().iter().map(|(_, h, _, _)| *h).collect()
    }

    pub(crate) fn created_families(&self) -> Vec<String> {
        self.created.borrow().iter().map(|(f, _, _, _)| f.clone()).collect()
    }

    pub(crate) fn deleted_count(&self) -> usize {
        self.deleted.borrow().len()
    }

    /// Fonts created and not yet deleted.
    pub(crate) fn live_count(&self) -> usize {
        let deleted = self.deleted.borrow();
        self.created
            .borrow()
            .iter()
            .filter(|(_, _, _, font)| !deleted.contains(font))
            .count()
    }
}

impl FontService for FakeFonts {
    fn enumerate_families(&self) -> Vec<String> {
        self.families.clone()
    }

    fn create_font(&self, family: &str, pixel_height: i32, weight: FontWeight) -> PlatformResult<FontHandle> {
        if self.fail.get() {
            return Err(PlatformError::OperationFailed("Injected font failure".to_string()));
        }
        let mut created = self.created.borrow_mut();
        let font = FontHandle(0x100 + created.len());
        created.push((family.to_string(), pixel_height, weight, font));
        Ok(font)
    }

    fn default_font(&self) -> FontHandle {
        FAKE_DEFAULT_FONT
    }

    fn delete_font(&self, font: FontHandle) {
        self.deleted.borrow_mut().push(font);
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeImages {
    loaded: RefCell<Vec<(ImageSource, ImageHandle)>>,
    released: RefCell<Vec<ImageHandle>>,
    fail: Cell<bool>,
}

impl FakeImages {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_loading(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub(crate) fn loaded_count(&self) -> usize {
        self.loaded.borrow().len()
    }

    pub(crate) fn released(&self) -> Vec<ImageHandle> {
        self.released.borrow().clone()
    }

    pub(crate) fn live_count(&self) -> usize {
        let released = self.released.borrow();
        self.loaded
            .borrow()
            .iter()
            .filter(|(_, image)| !released.contains(image))
            .count()
    }
}

impl ImageService for FakeImages {
    fn load(&self, source: &ImageSource) -> PlatformResult<ImageHandle> {
        if self.fail.get() {
            return Err(PlatformError::OperationFailed(format!("Injected load failure for {source:?}")));
        }
        let mut loaded = self.loaded.borrow_mut();
        let image = ImageHandle(0x900 + loaded.len());
        loaded.push((source.clone(), image));
        Ok(image)
    }

    fn release(&self, image: ImageHandle) {
        self.released.borrow_mut().push(image);
    }
}

/// The fakes behind a `Services` bundle, kept for inspection.
pub(crate) struct FakeServices {
    pub runtime: Rc<FakeRuntime>,
    pub drawing: Rc<FakeDrawing>,
    pub fonts: Rc<FakeFonts>,
    pub images: Rc<FakeImages>,
}

impl FakeServices {
    pub(crate) fn new() -> Self {
        Self {
            runtime: Rc::new(FakeRuntime::new()),
            drawing: Rc::new(FakeDrawing::new()),
            fonts: Rc::new(FakeFonts::with_families(&["Segoe UI", "Tahoma"])),
            images: Rc::new(FakeImages::new()),
        }
    }

    pub(crate) fn services(&self) -> Services {
        Services {
            runtime: self.runtime.clone(),
            drawing: self.drawing.clone(),
            fonts: self.fonts.clone(),
            images: self.images.clone(),
        }
    }
}

/*
 * Well-known child IDs of the fake system dialogs. Enough of the real layout
 * to exercise customization: the two buttons, a file name edit and label.
 */
pub(crate) const FAKE_DIALOG_CHILDREN: &[i32] = &[crate::messages::IDOK, IDCANCEL, 0x480, 0x442, 0x47C];

/*
 * A scripted system dialog. It creates a dialog window in the fake runtime,
 * runs the init hook, delivers the scripted messages through the message hook
 * and then returns the scripted outcome.
 */
pub(crate) struct FakeDialogs {
    runtime: Rc<FakeRuntime>,
    script: RefCell<Vec<Message>>,
    file_response: RefCell<Option<FileDialogResponse>>,
    folder_response: RefCell<Option<PathBuf>>,
    fail_show: Cell<bool>,
    last_request: RefCell<Option<FileDialogRequest>>,
    last_kind: Cell<Option<DialogKind>>,
    last_dialog: Cell<Option<NativeHandle>>,
    init_result: RefCell<Option<PlatformResult<()>>>,
    replies: RefCell<Vec<isize>>,
    closing_dialog: RefCell<Option<FakeWindow>>,
}

impl FakeDialogs {
    pub(crate) fn new(runtime: Rc<FakeRuntime>) -> Self {
        Self {
            runtime,
            script: RefCell::new(Vec::new()),
            file_response: RefCell::new(None),
            folder_response: RefCell::new(None),
            fail_show: Cell::new(false),
            last_request: RefCell::new(None),
            last_kind: Cell::new(None),
            last_dialog: Cell::new(None),
            init_result: RefCell::new(None),
            replies: RefCell::new(Vec::new()),
            closing_dialog: RefCell::new(None),
        }
    }

    pub(crate) fn script(&self, messages: Vec<Message>) {
        *self.script.borrow_mut() = messages;
    }

    pub(crate) fn respond_file(&self, response: Option<FileDialogResponse>) {
        *self.file_response.borrow_mut() = response;
    }

    pub(crate) fn respond_folder(&self, path: Option<PathBuf>) {
        *self.folder_response.borrow_mut() = path;
    }

    pub(crate) fn fail_show(&self, fail: bool) {
        self.fail_show.set(fail);
    }

    pub(crate) fn last_request(&self) -> Option<FileDialogRequest> {
        self.last_request.borrow().clone()
    }

    pub(crate) fn last_kind(&self) -> Option<DialogKind> {
        self.last_kind.get()
    }

    pub(crate) fn last_dialog(&self) -> Option<NativeHandle> {
        self.last_dialog.get()
    }

    pub(crate) fn init_succeeded(&self) -> bool {
        matches!(*self.init_result.borrow(), Some(Ok(())))
    }

    pub(crate) fn replies(&self) -> Vec<isize> {
        self.replies.borrow().clone()
    }

    /// The dialog window as it was when the dialog closed.
    pub(crate) fn dialog_at_close(&self) -> Option<FakeWindow> {
        self.closing_dialog.borrow().clone()
    }

    fn run(&self, owner: NativeHandle, hooks: &mut dyn DialogHooks) -> PlatformResult<NativeHandle> {
        if self.fail_show.get() {
            return Err(PlatformError::OperationFailed("Injected dialog failure".to_string()));
        }
        let dialog = self
            .runtime
            .add_window_with(owner, "#32770", 0, Rect::from_origin_size(100, 100, 400, 300));
        if let Some(window) = self.runtime.windows.borrow_mut().get_mut(&dialog) {
            window.style = crate::messages::NATIVE_CHROME_STYLES;
        }
        for (index, id) in FAKE_DIALOG_CHILDREN.iter().enumerate() {
            let top = 20 + index as i32 * 30;
            let child = self
                .runtime
                .add_window_with(dialog, "Button", *id, Rect::from_origin_size(10, top, 80, 24));
            let caption = match *id {
                crate::messages::IDOK => "Open",
                IDCANCEL => "Cancel",
                _ => "",
            };
            let _ = self.runtime.set_text(child, caption);
        }
        self.last_dialog.set(Some(dialog));

        let init = hooks.on_init(dialog);
        *self.init_result.borrow_mut() = Some(init);
        let script = self.script.borrow().clone();
        for message in script {
            let reply = hooks.on_message(dialog, message);
            self.replies.borrow_mut().push(reply);
        }
        hooks.on_message(dialog, Message::bare(crate::messages::WM_DESTROY));
        *self.closing_dialog.borrow_mut() = self.runtime.window(dialog);
        self.runtime.kill_window(dialog);
        Ok(dialog)
    }
}

impl SystemDialogService for FakeDialogs {
    fn show_file_dialog(
        &self,
        owner: NativeHandle,
        kind: DialogKind,
        request: &FileDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<FileDialogResponse>> {
        *self.last_request.borrow_mut() = Some(request.clone());
        self.last_kind.set(Some(kind));
        self.run(owner, hooks)?;
        Ok(self.file_response.borrow().clone())
    }

    fn show_folder_dialog(
        &self,
        owner: NativeHandle,
        _request: &FolderDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<PathBuf>> {
        self.last_kind.set(Some(DialogKind::BrowseFolder));
        self.run(owner, hooks)?;
        Ok(self.folder_response.borrow().clone())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeChrome {
    next: Cell<usize>,
    resizers_created: Cell<usize>,
    shadows_created: Cell<usize>,
    resizers_released: RefCell<Vec<ChromeHandle>>,
    shadows_released: RefCell<Vec<ChromeHandle>>,
    attached: RefCell<Vec<(ChromeHandle, NativeHandle)>>,
    fail_resizer: Cell<bool>,
    fail_shadow: Cell<bool>,
    fail_attach: Cell<bool>,
}

impl FakeChrome {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_resizer(&self, fail: bool) {
        self.fail_resizer.set(fail);
    }

    pub(crate) fn fail_shadow(&self, fail: bool) {
        self.fail_shadow.set(fail);
    }

    pub(crate) fn fail_attach(&self, fail: bool) {
        self.fail_attach.set(fail);
    }

    pub(crate) fn resizers_created(&self) -> usize {
        self.resizers_created.get()
    }

    pub(crate) fn shadows_created(&self) -> usize {
        self.shadows_created.get()
    }

    pub(crate) fn resizers_released(&self) -> Vec<ChromeHandle> {
        self.resizers_released.borrow().clone()
    }

    pub(crate) fn shadows_released(&self) -> Vec<ChromeHandle> {
        self.shadows_released.borrow().clone()
    }

    pub(crate) fn attached(&self) -> Vec<(ChromeHandle, NativeHandle)> {
        self.attached.borrow().clone()
    }

    fn allocate(&self) -> ChromeHandle {
        let raw = self.next.get() + 1;
        self.next.set(raw);
        ChromeHandle(raw)
    }
}

impl DialogChromeService for FakeChrome {
    fn create_resizer(&self) -> PlatformResult<ChromeHandle> {
        if self.fail_resizer.get() {
            return Err(PlatformError::OperationFailed("Injected resizer failure".to_string()));
        }
        self.resizers_created.set(self.resizers_created.get() + 1);
        Ok(self.allocate())
    }

    fn create_shadow(&self) -> PlatformResult<ChromeHandle> {
        if self.fail_shadow.get() {
            return Err(PlatformError::OperationFailed("Injected shadow failure".to_string()));
        }
        self.shadows_created.set(self.shadows_created.get() + 1);
        Ok(self.allocate())
    }

    fn attach(&self, part: ChromeHandle, dialog: NativeHandle) -> PlatformResult<()> {
        if self.fail_attach.get() {
            return Err(PlatformError::OperationFailed("Injected attach failure".to_string()));
        }
        self.attached.borrow_mut().push((part, dialog));
        Ok(())
    }

    fn release_resizer(&self, resizer: ChromeHandle) {
        self.resizers_released.borrow_mut().push(resizer);
    }

    fn release_shadow(&self, shadow: ChromeHandle) {
        self.shadows_released.borrow_mut().push(shadow);
    }
}

/// Shorthand for test control IDs.
pub(crate) fn id(raw: i32) -> ControlId {
    ControlId::new(raw)
}
