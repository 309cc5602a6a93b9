//! The object-graph builder.

use crate::model::entity::DeviceEntity;
use crate::model::registry::EntityRegistry;
use crate::model::root::RootEntity;
use crate::oid::Oid;
use crate::session::VariableBindingHandler;
use crate::varbind::VarBind;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Builds one device's object graph from a stream of `(oid, value)` results.
///
/// Each incoming binding is resolved to the entity that owns it - a scalar
/// group or a table row - creating entities on demand and attaching them
/// into the device's [`RootEntity`]. Values whose OID matches nothing in the
/// registry are reported as ignored, not as errors: devices routinely expose
/// vendor-specific subtrees outside the known schema.
///
/// The graph sits behind a mutex so the engine's callback thread can drive
/// ingestion while a caller thread owns the walk. One logical walk per
/// device at a time; concurrent walks against the same builder must be
/// serialized by the caller.
pub struct NetworkDevice {
    registry: Arc<EntityRegistry>,
    device_address: String,
    root: Mutex<RootEntity>,
}

impl NetworkDevice {
    /// Create a builder for the device at `address`.
    pub fn new(registry: Arc<EntityRegistry>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            registry,
            device_address: address.clone(),
            root: Mutex::new(RootEntity::new(address)),
        }
    }

    /// The device address this builder populates.
    pub fn device_address(&self) -> &str {
        &self.device_address
    }

    /// Run `f` against the populated root graph.
    pub fn with_root<R>(&self, f: impl FnOnce(&RootEntity) -> R) -> R {
        f(&self.root.lock().expect("root lock poisoned"))
    }

    /// Run `f` against the populated root graph, mutably.
    pub fn with_root_mut<R>(&self, f: impl FnOnce(&mut RootEntity) -> R) -> R {
        f(&mut self.root.lock().expect("root lock poisoned"))
    }

    /// Ingest one variable binding into the graph.
    ///
    /// Returns `true` when the binding's OID resolved to a known containing
    /// entity - even if applying the value then failed (dispatch faults are
    /// logged and absorbed so the walk can continue). Returns `false` for
    /// OIDs outside the known schema or with an unrecognized shape.
    pub fn add_variable(&self, binding: &VarBind) -> bool {
        debug!(binding = %binding, "add variable");

        let Some(containing_oid) = self.containing_oid(&binding.oid) else {
            info!(oid = %binding.oid, device = %self.device_address, "ignoring OID");
            return false;
        };

        // Index elements are whatever the value path carries beyond the
        // containing entity's own OID.
        let index_element_count = binding.oid.len() - containing_oid.len();

        let is_indexed = self
            .registry
            .entity_type(&containing_oid)
            .map(|t| t.kind.is_indexed())
            .unwrap_or(false);

        if !is_indexed {
            // Scalar convention: one field subidentifier plus the trailing
            // zero instance marker.
            if index_element_count != 2 {
                debug!(oid = %binding.oid, "unrecognised OID shape");
                return false;
            }
            self.add_scalar_variable(binding, &containing_oid);
        } else {
            self.add_table_column(binding, &containing_oid, index_element_count - 1);
        }
        true
    }

    // Walk upward from the value's path until the registry recognizes an
    // ancestor prefix.
    fn containing_oid(&self, oid: &Oid) -> Option<Oid> {
        let mut parent = oid.parent();
        while let Some(candidate) = parent {
            if self.registry.entity_type(&candidate).is_some() {
                return Some(candidate);
            }
            parent = candidate.parent();
        }
        None
    }

    // Set a scalar variable on its owning group entity.
    fn add_scalar_variable(&self, binding: &VarBind, containing_oid: &Oid) {
        let mut root = self.root.lock().expect("root lock poisoned");
        let Some(entity) = Self::get_or_create(&self.registry, &mut root, containing_oid) else {
            debug!(oid = %containing_oid, "no entity for containing OID");
            return;
        };
        Self::dispatch(entity, binding);
    }

    // Set a table-column variable on its row entity, creating the table and
    // the row as needed.
    fn add_table_column(&self, binding: &VarBind, entry_oid: &Oid, index_element_count: usize) {
        let Some(index) = binding.oid.index_suffix(index_element_count) else {
            debug!(oid = %binding.oid, "value path shorter than its index");
            return;
        };
        debug!(entry = %entry_oid, index = %index, "add table column");

        let Some(row_type) = self.registry.entity_type(entry_oid) else {
            debug!(oid = %entry_oid, "unrecognized table entry");
            return;
        };

        // The table owns the entry OID's parent path.
        let Some(table_oid) = entry_oid.parent() else {
            debug!(oid = %entry_oid, "table entry OID has no parent");
            return;
        };

        let mut root = self.root.lock().expect("root lock poisoned");
        let Some(container) = Self::get_or_create(&self.registry, &mut root, &table_oid) else {
            debug!(oid = %table_oid, "no entity for table OID");
            return;
        };
        let Some(table) = container.as_table_mut() else {
            warn!(oid = %table_oid, "entity owning a table OID has no table access");
            return;
        };

        if table.entry(&index).is_none() {
            let mut row = row_type.instantiate();
            if let Some(indexed) = row.as_indexed_mut() {
                indexed.set_index(&index);
            }
            table.set_entry(&index, row);
        }

        let entry = table.entry_mut(&index).expect("row just ensured");
        Self::dispatch(entry, binding);
    }

    // Locate the entity owning `oid` in the root graph, instantiating and
    // attaching it on first use so later values reuse the same instance.
    fn get_or_create<'a>(
        registry: &EntityRegistry,
        root: &'a mut RootEntity,
        oid: &Oid,
    ) -> Option<&'a mut dyn DeviceEntity> {
        if root.entity(oid).is_none() {
            let entity_type = registry.entity_type(oid)?;
            root.attach(oid.clone(), entity_type.instantiate());
        }
        root.entity_mut(oid)
    }

    // Dispatch a value onto an entity; faults are absorbed so the walk
    // continues with the next value.
    fn dispatch(entity: &mut dyn DeviceEntity, binding: &VarBind) {
        if let Err(e) = entity.apply(binding) {
            warn!(binding = %binding, error = %e, "failed to apply variable binding");
        }
    }
}

impl VariableBindingHandler for NetworkDevice {
    fn add_variable(&self, binding: &VarBind) -> bool {
        NetworkDevice::add_variable(self, binding)
    }
}
