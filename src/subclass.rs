/*
 * The subclass bookkeeping shared by every control. Attaching a control is two
 * steps, in this order: store the descriptor key in the handle's user-data
 * slot, then swap in the framework's message procedure and keep the one it
 * replaced. The replaced procedure is kept here, keyed by handle, for as long
 * as the handle exists, so messages that arrive after the descriptor was
 * removed (destruction runs after deregistration) can still be forwarded.
 */

use crate::descriptor::DescriptorKey;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::services::WindowingRuntime;
use crate::types::{Message, NativeHandle, ProcToken};

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubclassRecord {
    pub key: DescriptorKey,
    pub previous: ProcToken,
}

#[derive(Debug, Default)]
pub(crate) struct SubclassTable {
    records: HashMap<NativeHandle, SubclassRecord>,
}

impl SubclassTable {
    pub(crate) fn insert(&mut self, handle: NativeHandle, record: SubclassRecord) {
        self.records.insert(handle, record);
    }

    pub(crate) fn get(&self, handle: NativeHandle) -> Option<SubclassRecord> {
        self.records.get(&handle).copied()
    }

    pub(crate) fn remove(&mut self, handle: NativeHandle) -> Option<SubclassRecord> {
        self.records.remove(&handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

/*
 * Attaches the back-reference and installs the framework procedure. On error
 * the handle may carry user data but is not subclassed; the caller destroys it.
 */
pub(crate) fn attach(
    runtime: &dyn WindowingRuntime,
    handle: NativeHandle,
    key: DescriptorKey,
) -> PlatformResult<ProcToken> {
    if handle.is_null() || !runtime.is_window(handle) {
        return Err(PlatformError::SubclassAttach(format!(
            "Handle {handle:?} is not a live window"
        )));
    }
    runtime
        .set_user_data(handle, key.to_user_data())
        .map_err(|e| PlatformError::SubclassAttach(format!("Storing back-reference on {handle:?}: {e}")))?;
    let previous = runtime
        .install_subclass(handle)
        .map_err(|e| PlatformError::SubclassAttach(format!("Replacing procedure of {handle:?}: {e}")))?;
    log::trace!("Subclass: Attached {key:?} to {handle:?}, previous procedure {previous:?}.");
    Ok(previous)
}

/// Reads the descriptor key back from the handle's user-data slot.
pub(crate) fn back_reference(runtime: &dyn WindowingRuntime, handle: NativeHandle) -> Option<DescriptorKey> {
    runtime
        .user_data(handle)
        .filter(|value| *value != 0)
        .map(DescriptorKey::from_user_data)
}

/// Hands a message to the procedure that was installed before ours.
pub(crate) fn forward(
    runtime: &dyn WindowingRuntime,
    previous: ProcToken,
    handle: NativeHandle,
    message: Message,
) -> isize {
    runtime.call_previous(previous, handle, message)
}
