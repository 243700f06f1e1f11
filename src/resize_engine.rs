/*
 * Percentage-based anchor/resize engine. Each registered control remembers
 * its rectangle and its parent's client size at registration time; on every
 * parent resize its new rectangle is computed from those originals and the
 * size delta alone. Nothing is accumulated between resizes, so the output is
 * a pure function of (original rect, original parent size, spec, new size).
 *
 * Coefficients are not clamped. Values above 100 make a control move or grow
 * faster than the window, negative values make it move against the resize;
 * some layouts rely on this deliberately.
 */

use crate::types::{NativeHandle, Rect, Size};

use std::collections::HashMap;

/*
 * How a control's position and size track its parent's client size.
 * `h_anchor`/`v_anchor` at 100 pin the left/top edge to the far side of the
 * parent; 0 keeps a fixed offset from the near side. `width_scale` /
 * `height_scale` at 100 stretch fully with the parent; 0 keeps the size fixed.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResizeSpec {
    pub h_anchor: i32,
    pub v_anchor: i32,
    pub width_scale: i32,
    pub height_scale: i32,
}

impl ResizeSpec {
    pub const FIXED: ResizeSpec = ResizeSpec::new(0, 0, 0, 0);
    pub const FILL: ResizeSpec = ResizeSpec::new(0, 0, 100, 100);

    pub const fn new(h_anchor: i32, v_anchor: i32, width_scale: i32, height_scale: i32) -> Self {
        Self {
            h_anchor,
            v_anchor,
            width_scale,
            height_scale,
        }
    }

    pub fn is_fixed(&self) -> bool {
        *self == Self::FIXED
    }

    /*
     * Applies these coefficients to a rectangle given the parent's size delta. Widened
     * to i64 so extreme coefficients cannot overflow the intermediate product.
     */
    pub fn apply(&self, original: Rect, delta_width: i32, delta_height: i32) -> Rect {
        let part = |delta: i32, percent: i32| -> i32 {
            ((delta as i64 * percent as i64) / 100) as i32
        };
        let x = original.left + part(delta_width, self.h_anchor);
        let y = original.top + part(delta_height, self.v_anchor);
        let width = original.width() + part(delta_width, self.width_scale);
        let height = original.height() + part(delta_height, self.height_scale);
        Rect::from_origin_size(x, y, width, height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRegistration {
    pub original_rect: Rect,
    pub original_parent: Size,
    pub spec: ResizeSpec,
}

impl ResizeRegistration {
    pub fn compute(&self, new_parent: Size) -> Rect {
        self.spec.apply(
            self.original_rect,
            new_parent.width - self.original_parent.width,
            new_parent.height - self.original_parent.height,
        )
    }
}

/*
 * The registration table. Keyed by native handle because the windowing
 * runtime's resize notification only knows handles. Iteration order follows
 * registration order so the native move calls are issued deterministically.
 */
#[derive(Debug, Default)]
pub struct ResizeEngine {
    registrations: HashMap<NativeHandle, ResizeRegistration>,
    order: Vec<NativeHandle>,
}

impl ResizeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Registers a control with its geometry captured now. Re-registering an
     * existing handle replaces its originals (used after a DPI change, when
     * the captured rectangles are no longer valid).
     */
    pub fn register(
        &mut self,
        handle: NativeHandle,
        original_rect: Rect,
        original_parent: Size,
        spec: ResizeSpec,
    ) {
        let registration = ResizeRegistration {
            original_rect,
            original_parent,
            spec,
        };
        if self.registrations.insert(handle, registration).is_none() {
            self.order.push(handle);
        }
        log::trace!(
            "ResizeEngine: Registered {handle:?} rect {original_rect:?} parent {original_parent:?} spec {spec:?}."
        );
    }

    /*
     * Updates the coefficients of an already registered control. Returns false
     * for unknown handles: registration is never created implicitly, so
     * decorative elements never start moving by accident.
     */
    pub fn update_spec(&mut self, handle: NativeHandle, spec: ResizeSpec) -> bool {
        match self.registrations.get_mut(&handle) {
            Some(registration) => {
                registration.spec = spec;
                true
            }
            None => {
                log::trace!("ResizeEngine: update_spec ignored for unregistered {handle:?}.");
                false
            }
        }
    }

    pub fn unregister(&mut self, handle: NativeHandle) -> Option<ResizeRegistration> {
        let removed = self.registrations.remove(&handle);
        if removed.is_some() {
            self.order.retain(|h| *h != handle);
        }
        removed
    }

    pub fn registration(&self, handle: NativeHandle) -> Option<&ResizeRegistration> {
        self.registrations.get(&handle)
    }

    pub fn is_registered(&self, handle: NativeHandle) -> bool {
        self.registrations.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// New rectangle for one control, or `None` when it was never registered.
    pub fn compute(&self, handle: NativeHandle, new_parent: Size) -> Option<Rect> {
        self.registrations
            .get(&handle)
            .map(|registration| registration.compute(new_parent))
    }

    /*
     * Computes the new rectangle of every registered control for a parent
     * client size. The caller applies them; the engine itself owns no native
     * state.
     */
    pub fn on_parent_resize(&self, new_parent: Size) -> Vec<(NativeHandle, Rect)> {
        self.order
            .iter()
            .filter_map(|handle| {
                self.registrations
                    .get(handle)
                    .map(|registration| (*handle, registration.compute(new_parent)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: NativeHandle = NativeHandle(0x10);

    #[test]
    fn right_anchored_full_height_control_follows_width_change() {
        // Arrange
        let mut engine = ResizeEngine::new();
        engine.register(
            CTRL,
            Rect::new(90, 0, 100, 50),
            Size::new(100, 50),
            ResizeSpec::new(100, 0, 0, 100),
        );
        // Act
        let rect = engine.compute(CTRL, Size::new(200, 50));
        // Assert
        assert_eq!(rect, Some(Rect::new(190, 0, 200, 50)));
    }

    #[test]
    fn height_scale_stretches_when_parent_height_changes() {
        let mut engine = ResizeEngine::new();
        engine.register(
            CTRL,
            Rect::new(90, 0, 100, 50),
            Size::new(100, 50),
            ResizeSpec::new(100, 0, 0, 100),
        );
        assert_eq!(
            engine.compute(CTRL, Size::new(200, 100)),
            Some(Rect::new(190, 0, 200, 100))
        );
    }

    #[test]
    fn output_is_pure_over_repeated_resizes() {
        // Arrange
        let mut engine = ResizeEngine::new();
        engine.register(
            CTRL,
            Rect::new(10, 10, 60, 40),
            Size::new(400, 300),
            ResizeSpec::new(50, 25, 50, 75),
        );
        // Act: resize away and back, then repeat the first size.
        let first = engine.on_parent_resize(Size::new(640, 480));
        let _ = engine.on_parent_resize(Size::new(320, 200));
        let again = engine.on_parent_resize(Size::new(640, 480));
        let original = engine.on_parent_resize(Size::new(400, 300));
        // Assert
        assert_eq!(first, again);
        assert_eq!(original, vec![(CTRL, Rect::new(10, 10, 60, 40))]);
    }

    #[test]
    fn coefficients_outside_range_extrapolate() {
        let spec = ResizeSpec::new(150, -50, 200, 0);
        let rect = spec.apply(Rect::new(0, 100, 10, 110), 100, 100);
        assert_eq!(rect, Rect::new(150, 50, 160 + 200, 60));
    }

    #[test]
    fn fractional_coefficients_interpolate() {
        let spec = ResizeSpec::new(50, 50, 0, 0);
        let rect = spec.apply(Rect::new(10, 10, 20, 20), 101, 40);
        // 101 * 50 / 100 truncates to 50.
        assert_eq!(rect, Rect::new(60, 30, 70, 40));
    }

    #[test]
    fn unregistered_handle_is_a_no_op() {
        let mut engine = ResizeEngine::new();
        assert_eq!(engine.compute(CTRL, Size::new(10, 10)), None);
        assert!(!engine.update_spec(CTRL, ResizeSpec::FILL));
        assert!(engine.is_empty());
        assert!(engine.on_parent_resize(Size::new(10, 10)).is_empty());
    }

    #[test]
    fn update_spec_changes_coefficients_but_keeps_originals() {
        let mut engine = ResizeEngine::new();
        engine.register(CTRL, Rect::new(0, 0, 10, 10), Size::new(100, 100), ResizeSpec::FIXED);
        assert!(engine.update_spec(CTRL, ResizeSpec::FILL));
        assert_eq!(
            engine.compute(CTRL, Size::new(150, 120)),
            Some(Rect::new(0, 0, 60, 30))
        );
    }

    #[test]
    fn unregister_removes_from_iteration() {
        let mut engine = ResizeEngine::new();
        let other = NativeHandle(0x20);
        engine.register(CTRL, Rect::new(0, 0, 1, 1), Size::new(1, 1), ResizeSpec::FILL);
        engine.register(other, Rect::new(0, 0, 1, 1), Size::new(1, 1), ResizeSpec::FILL);
        engine.unregister(CTRL);
        let results = engine.on_parent_resize(Size::new(2, 2));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, other);
    }
}
