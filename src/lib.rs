/*
 * Provides the public entry point for the chromeui crate, a custom-drawn control
 * layer for Win32 applications. Native controls are created as usual and then
 * subclassed so the framework paints them from a shared theme, keeps them laid
 * out across resizes and DPI changes, and reports their interactions as
 * `ControlEvent`s. The common file and folder dialogs get the same treatment.
 *
 * The portable core (sessions, registry, resize engine, handlers, dialog
 * adapter) reaches the OS only through the service traits in `services`, so it
 * builds and tests on every platform. The `win32` module supplies the real
 * services and the window plumbing and is only compiled on Windows.
 */
pub mod config;
pub(crate) mod controls;
pub mod descriptor;
pub mod dialogs;
pub mod error;
pub(crate) mod font_cache;
pub mod messages;
pub mod registry;
pub mod resize_engine;
pub mod scaling;
pub mod services;
pub mod styling_primitives;
pub(crate) mod subclass;
#[cfg(test)]
mod testing;
pub mod types;
#[cfg(target_os = "windows")]
pub mod win32;
pub mod window_common;

pub use config::{DialogBehavior, DialogConfig, FrameworkConfig};
pub use controls::{ControlEvent, ControlKind};
pub use descriptor::ControlDescriptor;
pub use dialogs::ThemedDialogs;
pub use error::{BatchReport, ControlFailure, PlatformError, Result as PlatformResult};
pub use resize_engine::ResizeSpec;
pub use services::{FileDialogRequest, FileDialogResponse, FileFilter, FolderDialogRequest, ImageSource, Services};
pub use styling_primitives::{Color, ControlStyle, FontDescription, FontWeight, Theme};
pub use types::{ControlId, Message, NativeHandle, PageScope, Point, Rect, Size, WindowId};
pub use window_common::{EventHandler, WindowSession};
