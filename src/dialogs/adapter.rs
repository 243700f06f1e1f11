/*
 * Re-skins a system file/folder dialog while it is modal. The dialog service
 * calls `on_init` once the dialog window exists; from then on every message
 * goes through `on_message`, which answers the ones that draw the themed
 * chrome and forwards everything else to the dialog's own procedure exactly
 * once.
 */

use crate::config::FrameworkConfig;
use crate::controls::button_handler;
use crate::controls::styling_handler::ButtonState;
use crate::dialogs::layout::{self, DialogMetrics};
use crate::dialogs::resources::DialogResources;
use crate::dialogs::state::{DialogPhase, DialogState};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::messages::*;
use crate::scaling::DpiScale;
use crate::services::{DialogChromeService, DialogHooks, DialogKind, Services, TextFormat};
use crate::types::{FontHandle, Message, NativeHandle, Point, Rect, SurfaceHandle};

use std::rc::Rc;

const BS_TYPEMASK: u32 = 0x000F;
const BS_OWNERDRAW: u32 = 0x000B;

/*
 * Children of the common file and folder dialogs that get the themed font:
 * file name label/edit/combo, file type label/combo, "look in" label/combo,
 * read-only check box, help button, folder tree, title and status text, and
 * the two buttons.
 */
pub(crate) const WELL_KNOWN_CHILD_IDS: &[i32] = &[
    IDOK, IDCANCEL, 0x040E, 0x0410, 0x0441, 0x0442, 0x0443, 0x0460, 0x0470, 0x0471, 0x047C, 0x0480,
    0x3741, 0x3742, 0x3743, 0x3744,
];

const THEMED_BUTTONS: [i32; 2] = [IDOK, IDCANCEL];

pub(crate) struct DialogAdapter {
    kind: DialogKind,
    title: String,
    owner: NativeHandle,
    services: Services,
    config: FrameworkConfig,
    state: DialogState,
    resources: DialogResources,
    metrics: DialogMetrics,
    font: Option<FontHandle>,
}

impl DialogAdapter {
    pub(crate) fn new(
        kind: DialogKind,
        title: &str,
        owner: NativeHandle,
        services: Services,
        chrome: Rc<dyn DialogChromeService>,
        config: FrameworkConfig,
    ) -> Self {
        let resources = DialogResources::new(chrome, services.fonts.clone(), services.images.clone());
        let metrics = DialogMetrics::new(&config.dialogs, DpiScale::default());
        Self {
            kind,
            title: title.to_string(),
            owner,
            services,
            config,
            state: DialogState::default(),
            resources,
            metrics,
            font: None,
        }
    }

    pub(crate) fn phase(&self) -> DialogPhase {
        self.state.phase()
    }

    /// Releases everything the dialog acquired. Safe to call from any path.
    pub(crate) fn close(&mut self) {
        if self.state.close() {
            log::debug!("DialogAdapter: {:?} dialog closed.", self.kind);
        }
        self.resources.release_all();
    }

    fn forward(&self, dialog: NativeHandle, message: Message) -> isize {
        let runtime = self.services.runtime.as_ref();
        match self.state.previous_proc {
            Some(previous) => runtime.call_previous(previous, dialog, message),
            None => runtime.default_procedure(dialog, message),
        }
    }

    fn customize(&mut self, dialog: NativeHandle) -> PlatformResult<()> {
        let runtime = Rc::clone(&self.services.runtime);
        let behavior = self.config.dialogs.behavior(self.kind);
        let dpi = DpiScale::new(runtime.dpi_for(dialog));
        self.metrics = DialogMetrics::new(&self.config.dialogs, dpi);

        // Native chrome off, our procedure on.
        let style = runtime.window_style(dialog);
        self.state.original_style = Some(style);
        runtime.set_window_style(dialog, style & !NATIVE_CHROME_STYLES)?;
        let previous = runtime
            .install_subclass(dialog)
            .map_err(|e| PlatformError::SubclassAttach(format!("Dialog {dialog:?}: {e}")))?;
        self.state.previous_proc = Some(previous);

        // Font and icon are cosmetic: failures degrade to the defaults.
        let font = self.resources.font_cache.resolve_or_default(
            self.services.fonts.as_ref(),
            &self.config.font,
            &self.config.fallback_font_family,
            dpi.dpi(),
        );
        self.font = Some(font);
        for id in WELL_KNOWN_CHILD_IDS {
            if let Some(child) = runtime.dialog_item(dialog, *id) {
                runtime.set_font(child, font);
            }
        }
        if let Some(source) = &self.config.dialogs.caption_icon {
            match self.resources.images().load(source) {
                Ok(icon) => self.resources.icon = Some(icon),
                Err(e) => log::warn!("DialogAdapter: Caption icon not loaded: {e}"),
            }
        }

        let original = runtime.window_rect(dialog)?;
        let natural = original.size();
        let (dx, dy) = self.metrics.child_offset();
        for child in runtime.child_windows(dialog) {
            let rect = runtime.window_rect(child)?;
            self.state.original_rects.push((child, rect));
            runtime.set_window_rect(child, rect.offset(dx, dy))?;
        }
        for id in THEMED_BUTTONS {
            if let Some(button) = runtime.dialog_item(dialog, id) {
                let style = runtime.window_style(button);
                self.state.original_button_styles.push((button, style));
                runtime.set_window_style(button, (style & !BS_TYPEMASK) | BS_OWNERDRAW)?;
            }
        }

        let work_area = runtime.work_area(dialog);
        let size = if behavior.large {
            layout::large_size(work_area, self.config.dialogs.large_size_percent)
        } else {
            layout::customized_size(natural, &self.metrics)
        };
        let anchor = if !self.owner.is_null() && runtime.is_window(self.owner) {
            runtime.window_rect(self.owner)?
        } else {
            work_area
        };
        self.state.original_rects.push((dialog, original));
        runtime.set_window_rect(dialog, layout::center_on(anchor, size, work_area))?;

        if behavior.shadow {
            let shadow = self.resources.chrome().create_shadow()?;
            self.resources.shadow = Some(shadow);
            self.resources.chrome().attach(shadow, dialog)?;
        }
        if behavior.resizable {
            let resizer = self.resources.chrome().create_resizer()?;
            self.resources.resizer = Some(resizer);
            self.resources.chrome().attach(resizer, dialog)?;
        }
        Ok(())
    }

    /*
     * Puts back what `customize` changed, newest first: button styles, child
     * and dialog placement, then the frame style and fonts. An uncustomized
     * dialog keeps its native caption, frame and buttons.
     */
    fn restore(&mut self, dialog: NativeHandle) {
        let runtime = Rc::clone(&self.services.runtime);
        for (button, style) in self.state.original_button_styles.drain(..).rev() {
            if let Err(e) = runtime.set_window_style(button, style) {
                log::warn!("DialogAdapter: Restoring style of button {button:?} failed: {e}");
            }
        }
        for (window, rect) in self.state.original_rects.drain(..).rev() {
            if let Err(e) = runtime.set_window_rect(window, rect) {
                log::warn!("DialogAdapter: Restoring placement of {window:?} failed: {e}");
            }
        }
        if let Some(style) = self.state.original_style.take() {
            if let Err(e) = runtime.set_window_style(dialog, style) {
                log::warn!("DialogAdapter: Restoring style of {dialog:?} failed: {e}");
            }
        }
        if self.font.take().is_some() {
            let default_font = self.services.fonts.default_font();
            for id in WELL_KNOWN_CHILD_IDS {
                if let Some(child) = self.services.runtime.dialog_item(dialog, *id) {
                    self.services.runtime.set_font(child, default_font);
                }
            }
        }
        self.resources.release_all();
    }

    fn hit_test(&self, dialog: NativeHandle, message: Message) -> isize {
        let Ok(window) = self.services.runtime.window_rect(dialog) else {
            return self.forward(dialog, message);
        };
        let screen = point_from_lparam(message.lparam);
        let point = Point::new(screen.x - window.left, screen.y - window.top);
        let resizable = self.config.dialogs.behavior(self.kind).resizable;
        let hit = layout::hit_test(window.size(), point, &self.metrics, resizable);
        if hit == HTCLIENT {
            // Children under the cursor keep their own hit-testing.
            return self.forward(dialog, message);
        }
        hit
    }

    fn paint(&self, dialog: NativeHandle) -> isize {
        let runtime = self.services.runtime.as_ref();
        let drawing = self.services.drawing.as_ref();
        let theme = &self.config.theme;
        let Some((surface, _)) = runtime.begin_paint(dialog) else {
            return 0;
        };
        if let Ok(client) = runtime.client_rect(dialog) {
            drawing.fill_rect(surface, client, theme.background);
            let caption = layout::caption_rect(client.width(), &self.metrics);
            drawing.fill_rect(surface, caption, theme.title_bar);
            let mut text_left = caption.left + 8;
            if let Some(icon) = self.resources.icon {
                let icon_rect = layout::icon_rect(caption, &self.metrics);
                drawing.draw_image(surface, icon, icon_rect);
                text_left = icon_rect.right + 6;
            }
            let text_rect = Rect::new(text_left, caption.top, caption.right - 8, caption.bottom);
            drawing.draw_text(surface, &self.title, text_rect, theme.title_text, None, TextFormat::left());
            drawing.frame_rect(surface, client, theme.border);
        }
        runtime.end_paint(dialog, surface);
        0
    }

    fn control_colors(&self, message: Message) -> isize {
        let theme = &self.config.theme;
        let background = match message.id {
            WM_CTLCOLOREDIT | WM_CTLCOLORLISTBOX => theme.input_background,
            _ => theme.background,
        };
        self.services
            .drawing
            .control_colors(SurfaceHandle(message.wparam), theme.text, background)
    }

    fn draw_button(&self, dialog: NativeHandle, message: Message) -> isize {
        let runtime = self.services.runtime.as_ref();
        let Some(item) = runtime.decode_draw_item(message) else {
            return self.forward(dialog, message);
        };
        if !THEMED_BUTTONS.contains(&item.control_id.raw()) {
            return self.forward(dialog, message);
        }
        let theme = &self.config.theme;
        let state: ButtonState = button_handler::state_from_draw_item(
            &item,
            self.state.hot_button == Some(item.control_id.raw()),
        );
        let caption = runtime.window_text(item.handle);
        button_handler::paint_button(
            self.services.drawing.as_ref(),
            item.surface,
            item.rect,
            &caption,
            self.font,
            theme,
            theme.button_face,
            theme.button_text,
            state,
        );
        1
    }

    /*
     * WM_SETCURSOR names the window under the cursor in `wparam`; use it to
     * move the hot highlight between the themed buttons.
     */
    fn track_hot_button(&mut self, dialog: NativeHandle, message: Message) {
        let runtime = Rc::clone(&self.services.runtime);
        let under_cursor = NativeHandle(message.wparam);
        let hot = THEMED_BUTTONS
            .into_iter()
            .find(|id| runtime.dialog_item(dialog, *id) == Some(under_cursor));
        if hot == self.state.hot_button {
            return;
        }
        for id in [self.state.hot_button, hot].into_iter().flatten() {
            if let Some(button) = runtime.dialog_item(dialog, id) {
                runtime.invalidate(button);
            }
        }
        self.state.hot_button = hot;
    }
}

impl DialogHooks for DialogAdapter {
    fn on_init(&mut self, dialog: NativeHandle) -> PlatformResult<()> {
        self.state.begin_init(dialog)?;
        if !self.services.runtime.is_window(dialog) {
            self.state.abandon_init();
            return Err(PlatformError::RuntimeUnavailable(format!(
                "Dialog {dialog:?} vanished during init"
            )));
        }
        match self.customize(dialog) {
            Ok(()) => {
                self.state.finish_init();
                log::debug!("DialogAdapter: Customized {:?} dialog {dialog:?}.", self.kind);
                Ok(())
            }
            Err(e) => {
                log::warn!("DialogAdapter: Customizing {:?} dialog failed, showing it native: {e}", self.kind);
                self.restore(dialog);
                self.state.abandon_init();
                Err(e)
            }
        }
    }

    fn on_message(&mut self, dialog: NativeHandle, message: Message) -> isize {
        self.state.activate();
        if matches!(message.id, WM_DESTROY | WM_NCDESTROY) {
            let result = self.forward(dialog, message);
            self.close();
            return result;
        }
        if !self.state.is_customized() || self.state.phase() == DialogPhase::Closed {
            return self.forward(dialog, message);
        }
        log::trace!("DialogAdapter: Message 0x{:04X} for {dialog:?}.", message.id);
        match message.id {
            WM_NCHITTEST => self.hit_test(dialog, message),
            WM_ERASEBKGND => {
                if let Ok(client) = self.services.runtime.client_rect(dialog) {
                    self.services.drawing.fill_rect(
                        SurfaceHandle(message.wparam),
                        client,
                        self.config.theme.background,
                    );
                }
                1
            }
            WM_PAINT => self.paint(dialog),
            WM_CTLCOLORDLG | WM_CTLCOLORSTATIC | WM_CTLCOLOREDIT | WM_CTLCOLORLISTBOX | WM_CTLCOLORBTN => {
                self.control_colors(message)
            }
            WM_DRAWITEM => self.draw_button(dialog, message),
            WM_SETCURSOR => {
                self.track_hot_button(dialog, message);
                self.forward(dialog, message)
            }
            _ => self.forward(dialog, message),
        }
    }
}
