/*
 * Control kinds and their subclass behavior. Every kind supplies the same four
 * things: how its native window is created, which messages its subclass
 * procedure owns, its default resize behavior, and the styling applied once
 * the native control exists. Anything a kind does not list in its handled set
 * never reaches its handler; the dispatcher forwards it straight to the
 * previous procedure.
 */

pub(crate) mod button_handler;
pub(crate) mod chart_handler;
pub(crate) mod combobox_handler;
pub(crate) mod dark_border;
pub(crate) mod image_handler;
pub(crate) mod indicator_handler;
pub(crate) mod paint_router;
pub(crate) mod progress_handler;
pub(crate) mod richedit_handler;
pub(crate) mod styling_handler;

use crate::descriptor::{ControlSnapshot, VisualState};
use crate::messages::*;
use crate::resize_engine::ResizeSpec;
use crate::services::Services;
use crate::styling_primitives::{Color, Theme};
use crate::types::{ControlId, Message, NativeHandle, Rect, SurfaceHandle};

// Native class names.
const WC_STATIC: &str = "STATIC";
const WC_BUTTON: &str = "BUTTON";
const WC_COMBOBOX: &str = "COMBOBOX";
const WC_LISTVIEW: &str = "SysListView32";
const WC_EDIT: &str = "EDIT";
const WC_DATETIME: &str = "SysDateTimePick32";
const WC_RICHEDIT: &str = "RICHEDIT50W";
const WC_UPDOWN: &str = "msctls_updown32";

// Creation styles.
const SS_NOTIFY: u32 = 0x0100;
const BS_OWNERDRAW: u32 = 0x000B;
const CBS_DROPDOWNLIST: u32 = 0x0003;
const CBS_HASSTRINGS: u32 = 0x0200;
const LVS_REPORT: u32 = 0x0001;
const LVS_SINGLESEL: u32 = 0x0004;
const LVS_SHOWSELALWAYS: u32 = 0x0008;
const ES_MULTILINE: u32 = 0x0004;
const ES_AUTOVSCROLL: u32 = 0x0040;
const ES_AUTOHSCROLL: u32 = 0x0080;
const ES_NUMBER: u32 = 0x2000;
const UDS_SETBUDDYINT: u32 = 0x0002;
const UDS_ALIGNRIGHT: u32 = 0x0004;
const UDS_AUTOBUDDY: u32 = 0x0010;
const UDS_ARROWKEYS: u32 = 0x0020;
const WS_EX_CLIENTEDGE: u32 = 0x0200;

pub(crate) const UDM_SETBUDDY: u32 = 0x0400 + 105;

/// The closed set of control kinds the framework can create and subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Text,
    Button,
    ComboBox,
    ListView,
    /// A single-line edit, optionally with an up-down buddy for numeric input.
    Edit { spin: bool },
    DateTime,
    Chart,
    RichEdit,
    Image,
    Toggle,
    Rating,
    Progress,
    PasswordStrength,
    Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NativeClass {
    pub class_name: &'static str,
    pub style: u32,
    pub ex_style: u32,
}

const HOVER_MESSAGES: &[u32] = &[
    WM_MOUSEMOVE,
    WM_MOUSELEAVE,
    WM_LBUTTONDOWN,
    WM_LBUTTONUP,
    WM_SETFOCUS,
    WM_KILLFOCUS,
];

const TEXT_MESSAGES: &[u32] = &[WM_NCHITTEST, WM_SETTEXT];
const BUTTON_MESSAGES: &[u32] = &[
    WM_MOUSEMOVE,
    WM_MOUSELEAVE,
    WM_LBUTTONDOWN,
    WM_LBUTTONUP,
    WM_SETFOCUS,
    WM_KILLFOCUS,
];
const COMBOBOX_MESSAGES: &[u32] = &[WM_CTLCOLOREDIT, WM_CTLCOLORLISTBOX];
const FRAMED_MESSAGES: &[u32] = &[WM_NCPAINT];
const SPIN_EDIT_MESSAGES: &[u32] = &[WM_NCPAINT, WM_SIZE];
const SURFACE_MESSAGES: &[u32] = &[WM_PAINT, WM_ERASEBKGND, WM_SIZE, WM_APP_VALUE_CHANGED];
const IMAGE_MESSAGES: &[u32] = &[WM_PAINT, WM_ERASEBKGND, WM_SIZE, WM_NCHITTEST];
const INTERACTIVE_MESSAGES: &[u32] = &[
    WM_PAINT,
    WM_ERASEBKGND,
    WM_SIZE,
    WM_APP_VALUE_CHANGED,
    WM_MOUSEMOVE,
    WM_MOUSELEAVE,
    WM_LBUTTONDOWN,
    WM_LBUTTONUP,
    WM_SETFOCUS,
    WM_KILLFOCUS,
    WM_KEYDOWN,
];

impl ControlKind {
    pub(crate) fn native_class(self) -> NativeClass {
        let base = WS_CHILD | WS_VISIBLE;
        let (class_name, style, ex_style) = match self {
            ControlKind::Text => (WC_STATIC, base, 0),
            ControlKind::Button => (WC_BUTTON, base | WS_TABSTOP | BS_OWNERDRAW, 0),
            ControlKind::ComboBox => (
                WC_COMBOBOX,
                base | WS_TABSTOP | WS_VSCROLL | CBS_DROPDOWNLIST | CBS_HASSTRINGS,
                0,
            ),
            ControlKind::ListView => (
                WC_LISTVIEW,
                base | WS_TABSTOP | LVS_REPORT | LVS_SINGLESEL | LVS_SHOWSELALWAYS,
                WS_EX_CLIENTEDGE,
            ),
            ControlKind::Edit { spin } => (
                WC_EDIT,
                base | WS_TABSTOP | ES_AUTOHSCROLL | if spin { ES_NUMBER } else { 0 },
                WS_EX_CLIENTEDGE,
            ),
            ControlKind::DateTime => (WC_DATETIME, base | WS_TABSTOP, 0),
            ControlKind::RichEdit => (
                WC_RICHEDIT,
                base | WS_TABSTOP | WS_VSCROLL | ES_MULTILINE | ES_AUTOVSCROLL,
                WS_EX_CLIENTEDGE,
            ),
            ControlKind::Toggle | ControlKind::Rating | ControlKind::Selector => {
                (WC_STATIC, base | WS_TABSTOP | SS_NOTIFY, 0)
            }
            ControlKind::Chart
            | ControlKind::Image
            | ControlKind::Progress
            | ControlKind::PasswordStrength => (WC_STATIC, base | SS_NOTIFY, 0),
        };
        NativeClass {
            class_name,
            style,
            ex_style,
        }
    }

    /// A second native window created alongside the control and owned by it.
    pub(crate) fn companion_class(self) -> Option<NativeClass> {
        match self {
            ControlKind::Edit { spin: true } => Some(NativeClass {
                class_name: WC_UPDOWN,
                style: WS_CHILD
                    | WS_VISIBLE
                    | UDS_SETBUDDYINT
                    | UDS_ALIGNRIGHT
                    | UDS_AUTOBUDDY
                    | UDS_ARROWKEYS,
                ex_style: 0,
            }),
            _ => None,
        }
    }

    /// The fixed set of messages this kind's subclass procedure owns.
    pub fn handled_messages(self) -> &'static [u32] {
        match self {
            ControlKind::Text => TEXT_MESSAGES,
            ControlKind::Button => BUTTON_MESSAGES,
            ControlKind::ComboBox => COMBOBOX_MESSAGES,
            ControlKind::ListView | ControlKind::DateTime | ControlKind::RichEdit => FRAMED_MESSAGES,
            ControlKind::Edit { spin: false } => FRAMED_MESSAGES,
            ControlKind::Edit { spin: true } => SPIN_EDIT_MESSAGES,
            ControlKind::Image => IMAGE_MESSAGES,
            ControlKind::Chart | ControlKind::Progress | ControlKind::PasswordStrength => {
                SURFACE_MESSAGES
            }
            ControlKind::Toggle | ControlKind::Rating | ControlKind::Selector => {
                INTERACTIVE_MESSAGES
            }
        }
    }

    pub fn handles(self, message_id: u32) -> bool {
        self.handled_messages().contains(&message_id)
    }

    /*
     * Decorative kinds are never registered with the resize engine unless the
     * page asks for it explicitly.
     */
    pub fn default_resize_spec(self) -> Option<ResizeSpec> {
        match self {
            ControlKind::Text | ControlKind::Image => None,
            _ => Some(ResizeSpec::FIXED),
        }
    }

    /// Kinds whose whole client area is painted by the framework.
    pub fn is_custom_drawn(self) -> bool {
        matches!(
            self,
            ControlKind::Chart
                | ControlKind::Image
                | ControlKind::Toggle
                | ControlKind::Rating
                | ControlKind::Progress
                | ControlKind::PasswordStrength
                | ControlKind::Selector
        )
    }

    pub fn accepts_items(self) -> bool {
        matches!(
            self,
            ControlKind::ComboBox | ControlKind::ListView | ControlKind::Selector
        )
    }

    pub fn accepts_value(self) -> bool {
        matches!(
            self,
            ControlKind::Toggle
                | ControlKind::Rating
                | ControlKind::Progress
                | ControlKind::PasswordStrength
                | ControlKind::Selector
                | ControlKind::Edit { spin: true }
        )
    }

    fn tracks_hover(self) -> bool {
        matches!(
            self,
            ControlKind::Button | ControlKind::Toggle | ControlKind::Rating | ControlKind::Selector
        )
    }

    /*
     * Styling pushed into the native control once after creation. Kinds that
     * are themed through color queries or custom painting need nothing here.
     */
    pub(crate) fn apply_style(
        self,
        handle: NativeHandle,
        snapshot: &ControlSnapshot,
        services: &Services,
        theme: &Theme,
    ) {
        let (text, background) = styling_handler::effective_colors(snapshot, theme, self);
        match self {
            ControlKind::ListView => {
                combobox_handler::apply_listview_colors(services, handle, text, background)
            }
            ControlKind::RichEdit => richedit_handler::apply_colors(services, handle, background),
            ControlKind::DateTime => {
                richedit_handler::apply_calendar_colors(services, handle, text, background)
            }
            _ => {}
        }
    }

    pub(crate) fn handle_message(self, ctx: &MessageContext<'_>, message: Message) -> HandlerResult {
        if self.tracks_hover() && HOVER_MESSAGES.contains(&message.id) {
            return handle_hover(ctx, message);
        }
        match (self, message.id) {
            (ControlKind::Text | ControlKind::Image, WM_NCHITTEST) => {
                HandlerResult::handled(HTTRANSPARENT)
            }
            (ControlKind::Text, WM_SETTEXT) => {
                // Static controls do not repaint their background on text change.
                ctx.services.runtime.invalidate(ctx.handle);
                HandlerResult::forward()
            }
            (ControlKind::ComboBox, WM_CTLCOLOREDIT | WM_CTLCOLORLISTBOX) => {
                combobox_handler::handle_child_colors(ctx, message)
            }
            (ControlKind::Edit { spin: true }, WM_SIZE) => {
                richedit_handler::realign_companion(ctx);
                HandlerResult::forward()
            }
            (_, WM_NCPAINT) => HandlerResult::forward_then_frame(),
            (_, WM_ERASEBKGND) => HandlerResult::handled(1),
            (_, WM_SIZE) | (_, WM_APP_VALUE_CHANGED) => {
                ctx.services.runtime.invalidate(ctx.handle);
                if message.id == WM_SIZE {
                    HandlerResult::forward()
                } else {
                    HandlerResult::handled(0)
                }
            }
            (_, WM_PAINT) => paint_surface(ctx, |surface, rect| self.paint(ctx, surface, rect)),
            (ControlKind::Toggle | ControlKind::Rating | ControlKind::Selector, WM_KEYDOWN) => {
                indicator_handler::handle_key(ctx, message)
            }
            _ => HandlerResult::forward(),
        }
    }

    fn paint(self, ctx: &MessageContext<'_>, surface: SurfaceHandle, rect: Rect) {
        let drawing = ctx.services.drawing.as_ref();
        let control = ctx.control;
        match self {
            ControlKind::Chart => chart_handler::paint_chart(drawing, surface, rect, control, ctx.theme),
            ControlKind::Progress => {
                progress_handler::paint_progress(drawing, surface, rect, control, ctx.theme)
            }
            ControlKind::PasswordStrength => {
                progress_handler::paint_strength(drawing, surface, rect, control, ctx.theme)
            }
            ControlKind::Image => image_handler::paint_image(drawing, surface, rect, control, ctx.theme),
            ControlKind::Toggle => {
                indicator_handler::paint_toggle(drawing, surface, rect, control, ctx.theme)
            }
            ControlKind::Rating => {
                indicator_handler::paint_rating(drawing, surface, rect, control, ctx.theme)
            }
            ControlKind::Selector => {
                indicator_handler::paint_selector(drawing, surface, rect, control, ctx.theme)
            }
            _ => {}
        }
    }
}

/// Events raised by controls in response to user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Clicked(ControlId),
    ValueChanged { id: ControlId, value: i32 },
}

/// What the subclass procedure does with a message after the handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    Handled(isize),
    Forward,
    /// Forward, then paint the themed frame over whatever the native code drew.
    ForwardThenFrame,
}

/*
 * A handler's verdict plus the descriptor changes it wants committed. The
 * dispatcher applies the changes only if the descriptor is still alive after
 * the handler returns.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandlerResult {
    pub reply: Reply,
    pub visual: Option<VisualState>,
    pub value: Option<i32>,
    pub event: Option<ControlEvent>,
}

impl HandlerResult {
    pub(crate) fn handled(result: isize) -> Self {
        Self {
            reply: Reply::Handled(result),
            visual: None,
            value: None,
            event: None,
        }
    }

    pub(crate) fn forward() -> Self {
        Self {
            reply: Reply::Forward,
            ..Self::handled(0)
        }
    }

    pub(crate) fn forward_then_frame() -> Self {
        Self {
            reply: Reply::ForwardThenFrame,
            ..Self::handled(0)
        }
    }

    pub(crate) fn with_visual(mut self, visual: VisualState) -> Self {
        self.visual = Some(visual);
        self
    }

    pub(crate) fn with_value(mut self, id: ControlId, value: i32) -> Self {
        self.value = Some(value);
        self.event = Some(ControlEvent::ValueChanged { id, value });
        self
    }
}

/// Everything a handler may look at while it runs.
pub(crate) struct MessageContext<'a> {
    pub handle: NativeHandle,
    pub control: &'a ControlSnapshot,
    pub services: &'a Services,
    pub theme: &'a Theme,
}

/*
 * Hot, pressed and focus tracking shared by buttons and the interactive
 * custom-drawn kinds. Native buttons still need the mouse messages to run
 * their own click logic, so for them the message is forwarded after the
 * state change is recorded.
 */
fn handle_hover(ctx: &MessageContext<'_>, message: Message) -> HandlerResult {
    let runtime = ctx.services.runtime.as_ref();
    let before = ctx.control.visual;
    let mut visual = before;
    let mut value_change = None;
    match message.id {
        WM_MOUSEMOVE => {
            if !visual.hot {
                runtime.track_mouse_leave(ctx.handle);
            }
            visual.hot = true;
        }
        WM_MOUSELEAVE => {
            visual.hot = false;
            visual.pressed = false;
        }
        WM_LBUTTONDOWN => visual.pressed = true,
        WM_LBUTTONUP => {
            if visual.pressed && ctx.control.kind != ControlKind::Button {
                let point = point_from_lparam(message.lparam);
                value_change = indicator_handler::value_from_click(ctx, point);
            }
            visual.pressed = false;
        }
        WM_SETFOCUS => visual.focused = true,
        WM_KILLFOCUS => visual.focused = false,
        _ => {}
    }
    if visual != before || value_change.is_some() {
        runtime.invalidate(ctx.handle);
    }

    let mut result = if ctx.control.kind == ControlKind::Button {
        HandlerResult::forward()
    } else if matches!(message.id, WM_SETFOCUS | WM_KILLFOCUS) {
        HandlerResult::forward()
    } else {
        HandlerResult::handled(0)
    };
    if visual != before {
        result = result.with_visual(visual);
    }
    if let Some(value) = value_change {
        result = result.with_value(ctx.control.id, value);
    }
    result
}

/*
 * Runs a full custom paint pass. The background is filled with the control's
 * effective color before the kind-specific painter draws on top.
 */
fn paint_surface(
    ctx: &MessageContext<'_>,
    painter: impl FnOnce(SurfaceHandle, Rect),
) -> HandlerResult {
    let runtime = ctx.services.runtime.as_ref();
    let Some((surface, rect)) = runtime.begin_paint(ctx.handle) else {
        log::debug!(
            "Controls: begin_paint failed for control {}, forwarding WM_PAINT.",
            ctx.control.id.raw()
        );
        return HandlerResult::forward();
    };
    let (_, background) = styling_handler::effective_colors(ctx.control, ctx.theme, ctx.control.kind);
    ctx.services.drawing.fill_rect(surface, rect, background);
    painter(surface, rect);
    runtime.end_paint(ctx.handle, surface);
    HandlerResult::handled(0)
}

/// Color for a value-bearing fill, honoring a per-control border override.
pub(crate) fn accent_for(control: &ControlSnapshot, theme: &Theme) -> Color {
    control.style.border_color.unwrap_or(theme.accent)
}
