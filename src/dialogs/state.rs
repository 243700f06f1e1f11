/*
 * Lifecycle of one customized system dialog:
 *
 *   Uninitialized -> Initializing -> Customized -> Active -> Closed
 *
 * Initializing covers the init callback. If customization fails part way the
 * dialog skips Customized and goes straight to Active uncustomized, passing
 * every message through. Closed is terminal and reachable from every phase.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{NativeHandle, ProcToken, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Uninitialized,
    Initializing,
    Customized,
    Active,
    Closed,
}

#[derive(Debug, Default)]
pub(crate) struct DialogState {
    phase: DialogPhase,
    customized: bool,
    pub dialog: Option<NativeHandle>,
    pub previous_proc: Option<ProcToken>,
    /// Style bits the dialog had before its native chrome was stripped.
    pub original_style: Option<u32>,
    /// Child and dialog placement before they were moved, in move order.
    pub original_rects: Vec<(NativeHandle, Rect)>,
    /// Themed buttons' styles before they were made owner-drawn.
    pub original_button_styles: Vec<(NativeHandle, u32)>,
    /// Control ID of the button under the cursor.
    pub hot_button: Option<i32>,
}

impl DialogState {
    pub(crate) fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub(crate) fn is_customized(&self) -> bool {
        self.customized
    }

    pub(crate) fn begin_init(&mut self, dialog: NativeHandle) -> PlatformResult<()> {
        if self.phase != DialogPhase::Uninitialized {
            return Err(PlatformError::InvalidState(format!(
                "Dialog init callback in phase {:?}",
                self.phase
            )));
        }
        self.phase = DialogPhase::Initializing;
        self.dialog = Some(dialog);
        Ok(())
    }

    pub(crate) fn finish_init(&mut self) {
        if self.phase == DialogPhase::Initializing {
            self.phase = DialogPhase::Customized;
            self.customized = true;
        }
    }

    /// Customization failed; the dialog runs with its native look.
    pub(crate) fn abandon_init(&mut self) {
        if self.phase == DialogPhase::Initializing {
            self.phase = DialogPhase::Active;
            self.customized = false;
        }
    }

    /// First message after customization.
    pub(crate) fn activate(&mut self) {
        if self.phase == DialogPhase::Customized {
            self.phase = DialogPhase::Active;
        }
    }

    /// Returns true only for the call that actually closed the dialog.
    pub(crate) fn close(&mut self) -> bool {
        if self.phase == DialogPhase::Closed {
            return false;
        }
        self.phase = DialogPhase::Closed;
        self.hot_button = None;
        true
    }
}
