/*
 * Per-window control registry. Descriptors are owned by a slot-map arena;
 * each page scope (a named page or the pageless scope) keeps the IDs it
 * contains in creation order, and a reverse map resolves native handles back
 * to their descriptor.
 *
 * Every mutation completes within a single method call, so a message handler
 * re-entering the registry during dispatch always sees either the state before
 * or the state after a change, never a partial one.
 */

use crate::descriptor::{ControlDescriptor, DescriptorKey};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{ControlId, NativeHandle, PageScope};

use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct ScopeEntries {
    order: Vec<ControlId>,
    by_id: HashMap<ControlId, DescriptorKey>,
}

#[derive(Debug, Default)]
pub struct ControlRegistry {
    arena: SlotMap<DescriptorKey, ControlDescriptor>,
    scopes: HashMap<PageScope, ScopeEntries>,
    by_handle: HashMap<NativeHandle, DescriptorKey>,
    hidden: HashSet<DescriptorKey>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Adds a descriptor to `scope`. Fails with `DuplicateId` while a descriptor
     * with the same ID is live in that scope; the same ID may be used freely in
     * other scopes.
     */
    pub fn register_control(
        &mut self,
        scope: PageScope,
        mut descriptor: ControlDescriptor,
    ) -> PlatformResult<DescriptorKey> {
        let id = descriptor.id();
        if self
            .scopes
            .get(&scope)
            .is_some_and(|entries| entries.by_id.contains_key(&id))
        {
            log::warn!(
                "Registry: Control {} already registered in {scope}.",
                id.raw()
            );
            return Err(PlatformError::DuplicateId { scope, id });
        }

        descriptor.set_scope(scope.clone());
        let key = self.arena.insert(descriptor);
        let entries = self.scopes.entry(scope).or_default();
        entries.order.push(id);
        entries.by_id.insert(id, key);
        log::trace!("Registry: Registered control {} as {key:?}.", id.raw());
        Ok(key)
    }

    /// Binds the native handle created for a registered descriptor.
    pub fn attach_handle(&mut self, key: DescriptorKey, handle: NativeHandle) -> PlatformResult<()> {
        let descriptor = self.arena.get_mut(key).ok_or_else(|| {
            PlatformError::NotFound(format!("Descriptor {key:?} is no longer registered"))
        })?;
        if let Some(existing) = descriptor.handle {
            return Err(PlatformError::InvalidState(format!(
                "Control {} already owns handle {existing:?}",
                descriptor.id().raw()
            )));
        }
        descriptor.handle = Some(handle);
        self.by_handle.insert(handle, key);
        Ok(())
    }

    pub fn key_of(&self, scope: &PageScope, id: ControlId) -> PlatformResult<DescriptorKey> {
        self.scopes
            .get(scope)
            .and_then(|entries| entries.by_id.get(&id).copied())
            .ok_or_else(|| {
                PlatformError::NotFound(format!("Control {} is not registered in {scope}", id.raw()))
            })
    }

    /*
     * Resolves a control's native handle. A control that is registered but not
     * created yet (a lazily built page) is reported the same way as an unknown
     * one: the caller decides whether that matters.
     */
    pub fn lookup(&self, scope: &PageScope, id: ControlId) -> PlatformResult<NativeHandle> {
        let key = self.key_of(scope, id)?;
        self.arena
            .get(key)
            .and_then(|descriptor| descriptor.handle)
            .ok_or_else(|| {
                PlatformError::NotFound(format!("Control {} in {scope} has not been created", id.raw()))
            })
    }

    pub fn get(&self, key: DescriptorKey) -> Option<&ControlDescriptor> {
        self.arena.get(key)
    }

    pub fn get_mut(&mut self, key: DescriptorKey) -> Option<&mut ControlDescriptor> {
        self.arena.get_mut(key)
    }

    pub fn key_for_handle(&self, handle: NativeHandle) -> Option<DescriptorKey> {
        self.by_handle.get(&handle).copied()
    }

    /*
     * Removes a descriptor and every index pointing at it. Must run before the
     * native handle is destroyed: once this returns, messages still arriving for
     * the handle no longer resolve to a descriptor.
     */
    pub fn remove_control(
        &mut self,
        scope: &PageScope,
        id: ControlId,
    ) -> PlatformResult<ControlDescriptor> {
        let key = self.key_of(scope, id)?;
        if let Some(entries) = self.scopes.get_mut(scope) {
            entries.by_id.remove(&id);
            entries.order.retain(|existing| *existing != id);
            if entries.order.is_empty() {
                self.scopes.remove(scope);
            }
        }
        self.hidden.remove(&key);
        let descriptor = self.arena.remove(key).ok_or_else(|| {
            PlatformError::InvalidState(format!("Index for control {} was stale", id.raw()))
        })?;
        if let Some(handle) = descriptor.handle {
            self.by_handle.remove(&handle);
        }
        log::trace!("Registry: Removed control {} from {scope}.", id.raw());
        Ok(descriptor)
    }

    /// Keys of a scope in registration order.
    pub fn keys_in_scope(&self, scope: &PageScope) -> Vec<DescriptorKey> {
        self.scopes
            .get(scope)
            .map(|entries| {
                entries
                    .order
                    .iter()
                    .filter_map(|id| entries.by_id.get(id).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &PageScope> {
        self.scopes.keys()
    }

    pub fn all_keys(&self) -> Vec<DescriptorKey> {
        self.arena.keys().collect()
    }

    pub fn set_hidden(&mut self, key: DescriptorKey, hidden: bool) -> bool {
        if !self.arena.contains_key(key) {
            return false;
        }
        if hidden {
            self.hidden.insert(key);
        } else {
            self.hidden.remove(&key);
        }
        true
    }

    pub fn is_hidden(&self, key: DescriptorKey) -> bool {
        self.hidden.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
