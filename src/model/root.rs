//! The per-device aggregate root.

use crate::model::entity::{ChangeListener, DeviceEntity, ListenerSet};
use crate::oid::Oid;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ROOT_ID: AtomicU64 = AtomicU64::new(1);

/// The aggregate root of one device's object graph.
///
/// Owns the top-level entities ("roots"), each keyed by its type's OID, plus
/// the device address and a generated numeric identity. Created once per
/// discovered device and populated incrementally as values arrive.
pub struct RootEntity {
    id: u64,
    device_address: String,
    roots: BTreeMap<Oid, Box<dyn DeviceEntity>>,
    listeners: ListenerSet,
}

impl RootEntity {
    /// Create an empty root for the device at `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            id: NEXT_ROOT_ID.fetch_add(1, Ordering::Relaxed),
            device_address: address.into(),
            roots: BTreeMap::new(),
            listeners: ListenerSet::new(),
        }
    }

    /// The generated numeric identity of this root.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The device address this root models.
    pub fn device_address(&self) -> &str {
        &self.device_address
    }

    /// Attach a top-level entity under its OID.
    ///
    /// Listeners currently registered on the root are copied onto the new
    /// child; listeners added to the root later reach it through the normal
    /// recursive registration.
    pub fn attach(&mut self, oid: Oid, mut entity: Box<dyn DeviceEntity>) {
        for listener in self.listeners.snapshot() {
            entity.add_change_listener(listener);
        }
        self.roots.insert(oid, entity);
    }

    /// The entity attached under `oid`, if any.
    pub fn entity(&self, oid: &Oid) -> Option<&dyn DeviceEntity> {
        self.roots.get(oid).map(|e| e.as_ref())
    }

    /// Mutable access to the entity attached under `oid`.
    pub fn entity_mut(&mut self, oid: &Oid) -> Option<&mut dyn DeviceEntity> {
        match self.roots.get_mut(oid) {
            Some(e) => Some(e.as_mut()),
            None => None,
        }
    }

    /// The first attached entity with the given type name, if any.
    pub fn entity_by_name(&self, type_name: &str) -> Option<&dyn DeviceEntity> {
        self.roots
            .values()
            .map(|e| e.as_ref())
            .find(|e| e.type_name() == type_name)
    }

    /// All top-level entities, in OID order.
    pub fn roots(&self) -> impl Iterator<Item = (&Oid, &dyn DeviceEntity)> {
        self.roots.iter().map(|(oid, e)| (oid, e.as_ref()))
    }

    /// Number of top-level entities.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Register a change listener on the root and, recursively, on every
    /// currently-attached entity.
    pub fn add_change_listener(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.add(listener.clone());
        for entity in self.roots.values_mut() {
            entity.add_change_listener(listener.clone());
        }
    }

    /// Remove a change listener from the root and every attached entity.
    pub fn remove_change_listener(&mut self, listener: &Arc<dyn ChangeListener>) {
        self.listeners.remove(listener);
        for entity in self.roots.values_mut() {
            entity.remove_change_listener(listener);
        }
    }

    /// Remove every change listener from the root and all attached entities.
    pub fn clear_change_listeners(&mut self) {
        self.listeners.clear();
        for entity in self.roots.values_mut() {
            entity.clear_change_listeners();
        }
    }
}

impl std::fmt::Debug for RootEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootEntity")
            .field("id", &self.id)
            .field("device_address", &self.device_address)
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .finish()
    }
}
