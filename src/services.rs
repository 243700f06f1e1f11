/*
 * The seams between the framework and the operating system. The portable core
 * never calls a native API directly; it goes through these traits, which the
 * Win32 backend implements for real and the unit tests implement with
 * recording fakes.
 *
 * Every method takes `&self`. Everything here runs on the single UI thread and
 * implementations are free to re-enter the framework (a native call that sends
 * a message will dispatch back into the subclass procedure), so implementations
 * keep their own state behind interior mutability.
 */

use crate::error::Result as PlatformResult;
use crate::styling_primitives::{Color, FontWeight};
use crate::types::{
    ControlId, FontHandle, ImageHandle, Message, NativeHandle, ProcToken, Rect, Size,
    SurfaceHandle,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::rc::Rc;

/// Everything needed to create one native child control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCreateParams<'a> {
    pub parent: NativeHandle,
    pub class_name: &'a str,
    pub text: &'a str,
    pub style: u32,
    pub ex_style: u32,
    /// Physical pixels, relative to the parent's client area.
    pub rect: Rect,
    pub id: ControlId,
}

/// Which native list a set of items is pushed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    ComboBox,
    ListView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawItemState {
    pub selected: bool,
    pub focused: bool,
    pub disabled: bool,
    pub hot: bool,
}

/// A decoded owner-draw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub control_id: ControlId,
    pub handle: NativeHandle,
    pub surface: SurfaceHandle,
    pub rect: Rect,
    pub state: DrawItemState,
}

pub trait WindowingRuntime {
    fn is_window(&self, handle: NativeHandle) -> bool;
    fn create_control(&self, params: &ControlCreateParams<'_>) -> PlatformResult<NativeHandle>;
    fn destroy_control(&self, handle: NativeHandle);

    /// Routes the handle's messages to the framework; returns the procedure it replaced.
    fn install_subclass(&self, handle: NativeHandle) -> PlatformResult<ProcToken>;
    fn call_previous(&self, previous: ProcToken, handle: NativeHandle, message: Message) -> isize;
    /// The system default procedure, for handles whose previous procedure is unknown.
    fn default_procedure(&self, handle: NativeHandle, message: Message) -> isize;

    fn set_user_data(&self, handle: NativeHandle, data: u64) -> PlatformResult<()>;
    fn user_data(&self, handle: NativeHandle) -> Option<u64>;

    fn send_message(&self, handle: NativeHandle, message: Message) -> isize;
    fn track_mouse_leave(&self, handle: NativeHandle);

    fn client_rect(&self, handle: NativeHandle) -> PlatformResult<Rect>;
    /// Relative to the parent's client area for children, screen coordinates otherwise.
    fn window_rect(&self, handle: NativeHandle) -> PlatformResult<Rect>;
    fn set_window_rect(&self, handle: NativeHandle, rect: Rect) -> PlatformResult<()>;
    fn set_visible(&self, handle: NativeHandle, visible: bool);
    fn invalidate(&self, handle: NativeHandle);
    fn set_font(&self, handle: NativeHandle, font: FontHandle);
    fn set_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()>;
    fn set_list_items(
        &self,
        handle: NativeHandle,
        list: ListKind,
        items: &[String],
        selected: Option<usize>,
    ) -> PlatformResult<()>;

    fn window_style(&self, handle: NativeHandle) -> u32;
    fn set_window_style(&self, handle: NativeHandle, style: u32) -> PlatformResult<()>;

    /// Work area of the monitor the handle is on, in screen coordinates.
    fn work_area(&self, handle: NativeHandle) -> Rect;
    fn dpi_for(&self, handle: NativeHandle) -> u32;

    fn begin_paint(&self, handle: NativeHandle) -> Option<(SurfaceHandle, Rect)>;
    fn end_paint(&self, handle: NativeHandle, surface: SurfaceHandle);
    /// A surface covering the whole window including its non-client area.
    fn window_surface(&self, handle: NativeHandle) -> Option<SurfaceHandle>;
    fn release_surface(&self, handle: NativeHandle, surface: SurfaceHandle);

    fn dialog_item(&self, dialog: NativeHandle, item_id: i32) -> Option<NativeHandle>;
    /// Direct children of `parent`, in z-order.
    fn child_windows(&self, parent: NativeHandle) -> Vec<NativeHandle>;
    fn window_text(&self, handle: NativeHandle) -> String;
    fn decode_draw_item(&self, message: Message) -> Option<DrawItem>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat {
    pub align: TextAlign,
    pub vertical_center: bool,
    pub end_ellipsis: bool,
}

impl TextFormat {
    pub const fn centered() -> Self {
        Self {
            align: TextAlign::Center,
            vertical_center: true,
            end_ellipsis: false,
        }
    }

    pub const fn left() -> Self {
        Self {
            align: TextAlign::Left,
            vertical_center: true,
            end_ellipsis: true,
        }
    }
}

pub trait DrawingService {
    fn fill_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color);
    fn round_rect(&self, surface: SurfaceHandle, rect: Rect, radius: i32, fill: Color, border: Color);
    fn frame_rect(&self, surface: SurfaceHandle, rect: Rect, color: Color);
    fn measure_text(&self, surface: SurfaceHandle, text: &str, font: Option<FontHandle>) -> Size;
    fn draw_text(
        &self,
        surface: SurfaceHandle,
        text: &str,
        rect: Rect,
        color: Color,
        font: Option<FontHandle>,
        format: TextFormat,
    );
    fn draw_image(&self, surface: SurfaceHandle, image: ImageHandle, rect: Rect);
    /*
     * Prepares a surface for a native control's color query: sets the text and
     * background colors and returns the brush (as the raw message result) the
     * control should erase with.
     */
    fn control_colors(&self, surface: SurfaceHandle, text: Color, background: Color) -> isize;
}

pub trait FontService {
    fn enumerate_families(&self) -> Vec<String>;
    fn create_font(
        &self,
        family: &str,
        pixel_height: i32,
        weight: FontWeight,
    ) -> PlatformResult<FontHandle>;
    fn default_font(&self) -> FontHandle;
    fn delete_font(&self, font: FontHandle);
}

/// Where a bitmap comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSource {
    Resource(u16),
    File(PathBuf),
}

pub trait ImageService {
    fn load(&self, source: &ImageSource) -> PlatformResult<ImageHandle>;
    fn release(&self, image: ImageHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    OpenFile,
    SaveFile,
    BrowseFolder,
}

/// One entry of a file-type filter: a display name and its wildcard patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileDialogRequest {
    pub title: String,
    pub filters: Vec<FileFilter>,
    /// 1-based, matching the native convention.
    pub filter_index: u32,
    pub default_extension: Option<String>,
    pub initial_dir: Option<PathBuf>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDialogResponse {
    pub path: PathBuf,
    /// The filter selected when the dialog closed, 1-based.
    pub filter_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderDialogRequest {
    pub title: String,
    pub initial_dir: Option<PathBuf>,
}

/*
 * Callbacks a system dialog invokes while it is modal. `on_init` runs once when
 * the dialog window exists but is not yet shown. Once `on_init` has subclassed
 * the dialog, the backend routes every dialog message through `on_message`,
 * which owns forwarding to the dialog's previous procedure.
 */
pub trait DialogHooks {
    fn on_init(&mut self, dialog: NativeHandle) -> PlatformResult<()>;
    fn on_message(&mut self, dialog: NativeHandle, message: Message) -> isize;
}

pub trait SystemDialogService {
    /// `Ok(None)` when the user cancelled.
    fn show_file_dialog(
        &self,
        owner: NativeHandle,
        kind: DialogKind,
        request: &FileDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<FileDialogResponse>>;

    fn show_folder_dialog(
        &self,
        owner: NativeHandle,
        request: &FolderDialogRequest,
        hooks: &mut dyn DialogHooks,
    ) -> PlatformResult<Option<PathBuf>>;
}

/// A resizer or shadow helper owned by the chrome service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChromeHandle(pub usize);

pub trait DialogChromeService {
    fn create_resizer(&self) -> PlatformResult<ChromeHandle>;
    fn create_shadow(&self) -> PlatformResult<ChromeHandle>;
    fn attach(&self, part: ChromeHandle, dialog: NativeHandle) -> PlatformResult<()>;
    fn release_resizer(&self, resizer: ChromeHandle);
    fn release_shadow(&self, shadow: ChromeHandle);
}

/// The services a window session renders and creates controls through.
#[derive(Clone)]
pub struct Services {
    pub runtime: Rc<dyn WindowingRuntime>,
    pub drawing: Rc<dyn DrawingService>,
    pub fonts: Rc<dyn FontService>,
    pub images: Rc<dyn ImageService>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
