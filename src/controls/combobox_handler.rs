/*
 * Themed list controls. A dropdown combo box asks itself (not its parent) for
 * the colors of its embedded edit and drop-down list, so those queries are
 * answered from the combo box's own subclass procedure. List views take their
 * colors once through messages after creation.
 */

use crate::controls::styling_handler::{color_to_colorref, effective_colors};
use crate::controls::{HandlerResult, MessageContext};
use crate::services::Services;
use crate::styling_primitives::Color;
use crate::types::{Message, NativeHandle, SurfaceHandle};

// ListView messages
const LVM_SETBKCOLOR: u32 = 0x1001;
const LVM_SETTEXTCOLOR: u32 = 0x1024;
const LVM_SETTEXTBKCOLOR: u32 = 0x1026;

/*
 * Answers WM_CTLCOLOREDIT / WM_CTLCOLORLISTBOX raised by the combo box's
 * children. `wparam` carries the child's device context.
 */
pub(crate) fn handle_child_colors(ctx: &MessageContext<'_>, message: Message) -> HandlerResult {
    let (text, background) = effective_colors(ctx.control, ctx.theme, ctx.control.kind);
    let brush = ctx
        .services
        .drawing
        .control_colors(SurfaceHandle(message.wparam), text, background);
    log::trace!(
        "ComboBoxHandler: Themed child colors for combo {} (msg 0x{:04X}).",
        ctx.control.id.raw(),
        message.id
    );
    HandlerResult::handled(brush)
}

pub(crate) fn apply_listview_colors(
    services: &Services,
    handle: NativeHandle,
    text: Color,
    background: Color,
) {
    let runtime = services.runtime.as_ref();
    let background = color_to_colorref(background) as isize;
    runtime.send_message(handle, Message::new(LVM_SETBKCOLOR, 0, background));
    runtime.send_message(handle, Message::new(LVM_SETTEXTBKCOLOR, 0, background));
    runtime.send_message(
        handle,
        Message::new(LVM_SETTEXTCOLOR, 0, color_to_colorref(text) as isize),
    );
}

/*
 * Keeps a selection index meaningful after the item list changes: an index
 * past the end of the new list is dropped rather than clamped.
 */
pub(crate) fn normalize_selection(items: &[String], selected: Option<usize>) -> Option<usize> {
    selected.filter(|index| *index < items.len())
}
