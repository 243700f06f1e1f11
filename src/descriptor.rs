/*
 * The in-memory record for one control. Descriptors live in the registry's
 * arena and are addressed by `DescriptorKey`; the native handle's user-data
 * slot stores that key, never a pointer, so a message arriving for a control
 * whose descriptor has already been removed resolves to nothing instead of
 * to freed memory.
 */

use crate::controls::ControlKind;
use crate::resize_engine::ResizeSpec;
use crate::services::ImageSource;
use crate::styling_primitives::ControlStyle;
use crate::types::{ControlId, FontHandle, ImageHandle, NativeHandle, PageScope, ProcToken, Rect, Size};

use slotmap::{Key, KeyData};

slotmap::new_key_type! {
    /// Stable arena key of a descriptor; stale keys never resolve.
    pub struct DescriptorKey;
}

impl DescriptorKey {
    pub(crate) fn to_user_data(self) -> u64 {
        self.data().as_ffi()
    }

    pub(crate) fn from_user_data(value: u64) -> Self {
        KeyData::from_ffi(value).into()
    }
}

/*
 * A control is subclassed exactly once, right after creation, and stays
 * subclassed until its handle is destroyed. There is no way back.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubclassState {
    #[default]
    Unsubclassed,
    Subclassed,
}

/// Interaction state tracked by the subclass handlers for custom painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualState {
    pub hot: bool,
    pub pressed: bool,
    pub focused: bool,
}

/// Kind-specific content. Kinds ignore the fields that do not apply to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlData {
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub value: i32,
    pub range: (i32, i32),
    pub series: Vec<i32>,
    pub image: Option<ImageSource>,
}

impl Default for ControlData {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            value: 0,
            range: (0, 100),
            series: Vec::new(),
            image: None,
        }
    }
}

impl ControlData {
    pub fn clamp_value(&self, value: i32) -> i32 {
        let (min, max) = self.range;
        value.clamp(min.min(max), max.max(min))
    }
}

#[derive(Debug, Clone)]
pub struct ControlDescriptor {
    id: ControlId,
    scope: PageScope,
    kind: ControlKind,
    pub(crate) text: String,
    logical_rect: Rect,
    resize: Option<ResizeSpec>,
    pub(crate) style: ControlStyle,
    pub(crate) data: ControlData,
    pub(crate) handle: Option<NativeHandle>,
    pub(crate) companion: Option<NativeHandle>,
    pub(crate) previous_proc: Option<ProcToken>,
    pub(crate) subclass: SubclassState,
    pub(crate) visual: VisualState,
    pub(crate) font: Option<FontHandle>,
    pub(crate) image: Option<ImageHandle>,
    // Logical parent client size captured when the resize registration was made.
    pub(crate) resize_parent: Option<Size>,
}

impl ControlDescriptor {
    pub fn new(id: ControlId, kind: ControlKind, logical_rect: Rect) -> Self {
        Self {
            id,
            scope: PageScope::Pageless,
            kind,
            text: String::new(),
            logical_rect,
            resize: None,
            style: ControlStyle::default(),
            data: ControlData::default(),
            handle: None,
            companion: None,
            previous_proc: None,
            subclass: SubclassState::Unsubclassed,
            visual: VisualState::default(),
            font: None,
            image: None,
            resize_parent: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_resize(mut self, spec: ResizeSpec) -> Self {
        self.resize = Some(spec);
        self
    }

    pub fn with_style(mut self, style: ControlStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_items(mut self, items: Vec<String>, selected: Option<usize>) -> Self {
        self.data.items = items;
        self.data.selected = selected;
        self
    }

    pub fn with_range(mut self, min: i32, max: i32) -> Self {
        self.data.range = (min, max);
        self
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.data.value = value;
        self
    }

    pub fn with_series(mut self, series: Vec<i32>) -> Self {
        self.data.series = series;
        self
    }

    pub fn with_image(mut self, source: ImageSource) -> Self {
        self.data.image = Some(source);
        self
    }

    pub(crate) fn set_scope(&mut self, scope: PageScope) {
        self.scope = scope;
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn logical_rect(&self) -> Rect {
        self.logical_rect
    }

    pub fn data(&self) -> &ControlData {
        &self.data
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    pub fn previous_proc(&self) -> Option<ProcToken> {
        self.previous_proc
    }

    pub fn subclass_state(&self) -> SubclassState {
        self.subclass
    }

    pub fn visual(&self) -> VisualState {
        self.visual
    }

    /// The explicit spec, falling back to the kind's default.
    pub fn effective_resize(&self) -> Option<ResizeSpec> {
        self.resize.or_else(|| self.kind.default_resize_spec())
    }

    pub(crate) fn set_resize(&mut self, spec: ResizeSpec) {
        self.resize = Some(spec);
    }

    pub fn is_created(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            id: self.id,
            kind: self.kind,
            text: self.text.clone(),
            style: self.style.clone(),
            data: self.data.clone(),
            visual: self.visual,
            font: self.font,
            image: self.image,
            companion: self.companion,
        }
    }
}

/*
 * A copy of the descriptor state a message handler needs. Handlers run with no
 * registry borrow held, so they work on this copy and hand back the changes
 * they want committed.
 */
#[derive(Debug, Clone)]
pub(crate) struct ControlSnapshot {
    pub id: ControlId,
    pub kind: ControlKind,
    pub text: String,
    pub style: ControlStyle,
    pub data: ControlData,
    pub visual: VisualState,
    pub font: Option<FontHandle>,
    pub image: Option<ImageHandle>,
    pub companion: Option<NativeHandle>,
}
