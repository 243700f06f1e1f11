/*
 * Styling for the native text-entry kinds that theme through messages rather
 * than color queries: rich edit background, date picker calendar colors, and
 * the up-down buddy that follows a numeric edit around.
 */

use crate::controls::styling_handler::color_to_colorref;
use crate::controls::{MessageContext, UDM_SETBUDDY};
use crate::services::Services;
use crate::styling_primitives::Color;
use crate::types::{Message, NativeHandle};

const EM_SETBKGNDCOLOR: u32 = 0x0400 + 67;
const DTM_SETMCCOLOR: u32 = 0x1000 + 6;
const MCSC_BACKGROUND: usize = 0;
const MCSC_TEXT: usize = 1;
const MCSC_MONTHBK: usize = 4;

pub(crate) fn apply_colors(services: &Services, handle: NativeHandle, background: Color) {
    services.runtime.send_message(
        handle,
        Message::new(EM_SETBKGNDCOLOR, 0, color_to_colorref(background) as isize),
    );
}

pub(crate) fn apply_calendar_colors(
    services: &Services,
    handle: NativeHandle,
    text: Color,
    background: Color,
) {
    let runtime = services.runtime.as_ref();
    let background = color_to_colorref(background) as isize;
    runtime.send_message(handle, Message::new(DTM_SETMCCOLOR, MCSC_BACKGROUND, background));
    runtime.send_message(handle, Message::new(DTM_SETMCCOLOR, MCSC_MONTHBK, background));
    runtime.send_message(
        handle,
        Message::new(DTM_SETMCCOLOR, MCSC_TEXT, color_to_colorref(text) as isize),
    );
}

/*
 * An up-down control positions itself next to its buddy only when the buddy
 * is assigned, so re-assign it whenever the edit is resized.
 */
pub(crate) fn realign_companion(ctx: &MessageContext<'_>) {
    if let Some(companion) = ctx.control.companion {
        ctx.services
            .runtime
            .send_message(companion, Message::new(UDM_SETBUDDY, ctx.handle.0, 0));
    }
}
