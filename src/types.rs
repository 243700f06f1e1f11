/*
 * Core value types shared between the portable framework and the native
 * backend: identifiers for windows, controls and pages, opaque native handles,
 * a platform-neutral message record, and integer geometry.
 *
 * Native handles are plain integers on this side of the seam. Only the
 * backend knows how to turn them into `HWND`s, `HFONT`s and so on, which keeps
 * every piece of core logic testable without a windowing system.
 */

use std::fmt;

// An opaque identifier for a top-level window managed by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub(crate) usize);

impl WindowId {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

/*
 * Logical identifier of a control, unique within its page scope. The value is
 * also used as the native control ID (the `HMENU` slot of a child window).
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(i32);

impl ControlId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

/*
 * The scope a control lives in. Pageless controls (window chrome, shared
 * toolbars) are visible on every page; paged controls are only shown while
 * their page is active.
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageScope {
    Pageless,
    Page(String),
}

impl PageScope {
    pub fn page(name: impl Into<String>) -> Self {
        PageScope::Page(name.into())
    }

    pub fn is_pageless(&self) -> bool {
        matches!(self, PageScope::Pageless)
    }
}

impl fmt::Display for PageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageScope::Pageless => write!(f, "pageless scope"),
            PageScope::Page(name) => write!(f, "page '{name}'"),
        }
    }
}

/// A native window handle as seen by the portable core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NativeHandle(pub usize);

impl NativeHandle {
    pub const NULL: NativeHandle = NativeHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A native logical font handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub usize);

/// A loaded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// A device context obtained for one paint pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub usize);

/*
 * The message procedure that was installed on a handle before it was
 * subclassed. Held by the descriptor so unhandled messages can be delegated.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcToken(pub usize);

/// A window message in platform-neutral form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub const fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }

    pub const fn bare(id: u32) -> Self {
        Self::new(id, 0, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An integer rectangle, edges exclusive on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    pub const fn inset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right - dx, self.bottom - dy)
    }

    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}
