/*
 * Thread-local routing tables for the shared subclass procedure. One
 * procedure serves every subclassed handle on the UI thread, so it needs to
 * find, from nothing but an `HWND`:
 *
 * - the session owning a top-level window (controls are routed through their
 *   root window),
 * - the procedure a handle had before it was subclassed, for handles no
 *   session claims any more,
 * - the hooks of the system dialog currently running modally.
 *
 * Sessions are held weakly: a dropped session simply stops matching.
 */

use crate::services::DialogHooks;
use crate::types::{Message, NativeHandle};
use crate::window_common::WindowSession;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

struct DialogFrame {
    dialog: Option<NativeHandle>,
    /*
     * Valid for as long as the frame is on the stack: the frame is pushed by
     * `DialogScope::enter` and popped when the scope (which borrows the hooks)
     * is dropped.
     */
    hooks: *mut (dyn DialogHooks + 'static),
    busy: bool,
}

#[derive(Default)]
struct Router {
    sessions: HashMap<NativeHandle, Weak<WindowSession>>,
    previous: HashMap<NativeHandle, isize>,
    dialogs: Vec<DialogFrame>,
}

thread_local! {
    static ROUTER: RefCell<Router> = RefCell::new(Router::default());
}

pub(crate) fn register_session(window: NativeHandle, session: &Rc<WindowSession>) {
    ROUTER.with(|r| r.borrow_mut().sessions.insert(window, Rc::downgrade(session)));
}

pub(crate) fn unregister_session(window: NativeHandle) {
    ROUTER.with(|r| r.borrow_mut().sessions.remove(&window));
}

pub(crate) fn session_for(window: NativeHandle) -> Option<Rc<WindowSession>> {
    ROUTER.with(|r| r.borrow().sessions.get(&window).and_then(Weak::upgrade))
}

pub(crate) fn record_previous(handle: NativeHandle, previous: isize) {
    ROUTER.with(|r| r.borrow_mut().previous.insert(handle, previous));
}

pub(crate) fn previous_for(handle: NativeHandle) -> Option<isize> {
    ROUTER.with(|r| r.borrow().previous.get(&handle).copied())
}

pub(crate) fn forget_handle(handle: NativeHandle) {
    ROUTER.with(|r| r.borrow_mut().previous.remove(&handle));
}

/// Keeps a dialog's hooks reachable from the subclass procedure while it is modal.
pub(crate) struct DialogScope<'a> {
    _hooks: std::marker::PhantomData<&'a mut dyn DialogHooks>,
}

impl<'a> DialogScope<'a> {
    pub(crate) fn enter(hooks: &'a mut dyn DialogHooks) -> Self {
        let raw: *mut (dyn DialogHooks + 'a) = hooks;
        // SAFETY: the pointer is only dereferenced while this scope is alive.
        let raw: *mut (dyn DialogHooks + 'static) = unsafe { std::mem::transmute(raw) };
        ROUTER.with(|r| {
            r.borrow_mut().dialogs.push(DialogFrame {
                dialog: None,
                hooks: raw,
                busy: false,
            })
        });
        Self {
            _hooks: std::marker::PhantomData,
        }
    }
}

impl Drop for DialogScope<'_> {
    fn drop(&mut self) {
        ROUTER.with(|r| r.borrow_mut().dialogs.pop());
    }
}

/*
 * Runs `f` against the innermost dialog's hooks unless they are already in
 * use further up the stack; a message sent while a hook runs is answered by
 * the dialog's own procedure instead.
 */
fn with_hooks<R>(
    matches: impl Fn(&DialogFrame) -> bool,
    f: impl FnOnce(&mut dyn DialogHooks) -> R,
) -> Option<R> {
    let hooks = ROUTER.with(|r| {
        let mut router = r.borrow_mut();
        let frame = router.dialogs.last_mut().filter(|frame| matches(frame))?;
        if frame.busy {
            return None;
        }
        frame.busy = true;
        Some(frame.hooks)
    })?;
    // SAFETY: the frame is still on the stack (its scope outlives this call)
    // and `busy` guarantees this is the only live reference.
    let result = f(unsafe { &mut *hooks });
    ROUTER.with(|r| {
        if let Some(frame) = r.borrow_mut().dialogs.last_mut() {
            frame.busy = false;
        }
    });
    Some(result)
}

/// Binds the running dialog's window and runs the init hook.
pub(crate) fn init_dialog(dialog: NativeHandle) {
    ROUTER.with(|r| {
        if let Some(frame) = r.borrow_mut().dialogs.last_mut() {
            frame.dialog.get_or_insert(dialog);
        }
    });
    let result = with_hooks(|frame| frame.dialog == Some(dialog), |hooks| hooks.on_init(dialog));
    match result {
        Some(Err(e)) => log::warn!("DialogRouter: Init hook for {dialog:?} failed: {e}"),
        None => log::debug!("DialogRouter: No hooks for {dialog:?}."),
        Some(Ok(())) => {}
    }
}

/// `None` when `handle` is not the running dialog, or its hooks are busy.
pub(crate) fn dispatch_dialog(handle: NativeHandle, message: Message) -> Option<isize> {
    with_hooks(
        |frame| frame.dialog == Some(handle),
        |hooks| hooks.on_message(handle, message),
    )
}
