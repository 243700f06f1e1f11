/*
 * Platform-neutral message identifiers, hit-test codes and window style bits.
 * The numeric values match the native windowing system so the backend can
 * pass messages through without translation, while the portable core can
 * reason about them (and be tested) without linking any OS bindings.
 */

use crate::types::Point;

pub const WM_DESTROY: u32 = 0x0002;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_SETFOCUS: u32 = 0x0007;
pub const WM_KILLFOCUS: u32 = 0x0008;
pub const WM_ENABLE: u32 = 0x000A;
pub const WM_SETTEXT: u32 = 0x000C;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_ERASEBKGND: u32 = 0x0014;
pub const WM_SETCURSOR: u32 = 0x0020;
pub const WM_DRAWITEM: u32 = 0x002B;
pub const WM_SETFONT: u32 = 0x0030;
pub const WM_NOTIFY: u32 = 0x004E;
pub const WM_NCCALCSIZE: u32 = 0x0083;
pub const WM_NCHITTEST: u32 = 0x0084;
pub const WM_NCPAINT: u32 = 0x0085;
pub const WM_NCACTIVATE: u32 = 0x0086;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_CHAR: u32 = 0x0102;
pub const WM_INITDIALOG: u32 = 0x0110;
pub const WM_COMMAND: u32 = 0x0111;
pub const WM_TIMER: u32 = 0x0113;
pub const WM_CTLCOLOREDIT: u32 = 0x0133;
pub const WM_CTLCOLORLISTBOX: u32 = 0x0134;
pub const WM_CTLCOLORBTN: u32 = 0x0135;
pub const WM_CTLCOLORDLG: u32 = 0x0136;
pub const WM_CTLCOLORSTATIC: u32 = 0x0138;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_MOUSELEAVE: u32 = 0x02A3;
pub const WM_DPICHANGED: u32 = 0x02E0;

/// Sent by the framework to a control after its value changed programmatically.
pub const WM_APP_VALUE_CHANGED: u32 = 0x8000 + 0x120;

// Hit-test classifications returned from WM_NCHITTEST.
pub const HTTRANSPARENT: isize = -1;
pub const HTNOWHERE: isize = 0;
pub const HTCLIENT: isize = 1;
pub const HTCAPTION: isize = 2;
pub const HTLEFT: isize = 10;
pub const HTRIGHT: isize = 11;
pub const HTTOP: isize = 12;
pub const HTTOPLEFT: isize = 13;
pub const HTTOPRIGHT: isize = 14;
pub const HTBOTTOM: isize = 15;
pub const HTBOTTOMLEFT: isize = 16;
pub const HTBOTTOMRIGHT: isize = 17;

// Window style bits the dialog adapter rewrites.
pub const WS_CHILD: u32 = 0x4000_0000;
pub const WS_VISIBLE: u32 = 0x1000_0000;
pub const WS_DISABLED: u32 = 0x0800_0000;
pub const WS_BORDER: u32 = 0x0080_0000;
pub const WS_DLGFRAME: u32 = 0x0040_0000;
pub const WS_CAPTION: u32 = WS_BORDER | WS_DLGFRAME;
pub const WS_VSCROLL: u32 = 0x0020_0000;
pub const WS_SYSMENU: u32 = 0x0008_0000;
pub const WS_THICKFRAME: u32 = 0x0004_0000;
pub const WS_TABSTOP: u32 = 0x0001_0000;
pub const WS_POPUP: u32 = 0x8000_0000;

/// Style bits that make up native window chrome.
pub const NATIVE_CHROME_STYLES: u32 = WS_CAPTION | WS_SYSMENU | WS_THICKFRAME;

// Button notification codes carried in WM_COMMAND.
pub const BN_CLICKED: u32 = 0;

// Standard dialog command identifiers.
pub const IDOK: i32 = 1;
pub const IDCANCEL: i32 = 2;

#[inline]
pub(crate) fn loword_from_wparam(wparam: usize) -> i32 {
    (wparam & 0xFFFF) as i32
}

#[inline]
pub(crate) fn hiword_from_wparam(wparam: usize) -> i32 {
    ((wparam >> 16) & 0xFFFF) as i32
}

#[inline]
pub(crate) fn loword_from_lparam(lparam: isize) -> i32 {
    (lparam & 0xFFFF) as i32
}

#[inline]
pub(crate) fn hiword_from_lparam(lparam: isize) -> i32 {
    ((lparam >> 16) & 0xFFFF) as i32
}

/*
 * Decodes a packed screen or client coordinate. Unlike the size helpers above
 * the halves are sign-extended, since points left of or above a multi-monitor
 * origin are negative.
 */
#[inline]
pub(crate) fn point_from_lparam(lparam: isize) -> Point {
    Point::new(
        (lparam & 0xFFFF) as u16 as i16 as i32,
        ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32,
    )
}

#[inline]
pub(crate) fn pack_point(point: Point) -> isize {
    (((point.y as u16 as u32) << 16) | (point.x as u16 as u32)) as i32 as isize
}
