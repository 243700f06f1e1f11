use crate::controls::ControlKind;
use crate::descriptor::ControlSnapshot;
use crate::messages::{WM_CTLCOLORBTN, WM_CTLCOLOREDIT, WM_CTLCOLORLISTBOX, WM_CTLCOLORSTATIC};
use crate::styling_primitives::{Color, Theme};
use log::{debug, warn};

/*
 * Which palette a parent-side color query is answered from. Routing is by the
 * control's registered kind, not by the message alone: read-only edits ask
 * with WM_CTLCOLORSTATIC but still want the input colors. `Default` leaves the
 * query to the default window procedure.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaintRoute {
    LabelStatic,
    Edit,
    ComboListBox,
    Button,
    Default,
}

pub(crate) fn resolve_paint_route(kind: ControlKind, msg: u32) -> PaintRoute {
    match (kind, msg) {
        (ControlKind::Edit { .. } | ControlKind::RichEdit, WM_CTLCOLORSTATIC) => {
            debug!("[Paint] Edit kind routed via WM_CTLCOLORSTATIC to edit styling");
            PaintRoute::Edit
        }
        (ControlKind::Edit { .. } | ControlKind::RichEdit, WM_CTLCOLOREDIT) => PaintRoute::Edit,
        (ControlKind::ComboBox, WM_CTLCOLOREDIT | WM_CTLCOLORLISTBOX) => PaintRoute::ComboListBox,
        (ControlKind::Button, WM_CTLCOLORBTN) => PaintRoute::Button,
        (kind, WM_CTLCOLORSTATIC) if !matches!(kind, ControlKind::ComboBox) => {
            PaintRoute::LabelStatic
        }
        (ControlKind::Text, WM_CTLCOLOREDIT) => {
            warn!("[Paint] ControlKind::Text received WM_CTLCOLOREDIT; using default route");
            PaintRoute::Default
        }
        _ => PaintRoute::Default,
    }
}

/*
 * (text, background) for a routed color query. The control's own color
 * overrides win over the route's theme slots.
 */
pub(crate) fn route_colors(route: PaintRoute, control: &ControlSnapshot, theme: &Theme) -> Option<(Color, Color)> {
    let (text, background) = match route {
        PaintRoute::LabelStatic => (theme.text, theme.background),
        PaintRoute::Edit | PaintRoute::ComboListBox => (theme.text, theme.input_background),
        PaintRoute::Button => (theme.button_text, theme.button_face),
        PaintRoute::Default => return None,
    };
    Some((
        control.style.text_color.unwrap_or(text),
        control.style.background_color.unwrap_or(background),
    ))
}
