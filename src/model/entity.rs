//! The dynamic field-access contract for device entities.
//!
//! Concrete entity types are generated or hand-written per device type, but
//! callers interact with them uniformly through [`DeviceEntity`]: get/set by
//! field name, an explicit [`apply`](DeviceEntity::apply) operation for
//! incoming variable bindings, and change-listener propagation over the
//! entity tree.
//!
//! Instead of resolving accessors by runtime reflection, each concrete type
//! dispatches on the field name explicitly (a `match` over its known
//! fields). A name with no match arm is an *unknown field*; a matched field
//! that rejects the operation is a *field access* fault. The two failure
//! kinds stay distinguishable for callers.

use crate::error::{Error, Result};
use crate::model::description::EntityDescription;
use crate::varbind::VarBind;
use std::fmt;
use std::sync::Arc;

/// A dynamically-typed field value.
///
/// The currency of the name-indexed get/set surface. Mirrors the narrow
/// string/int/long accessor set that schema-generated entities expose.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Signed 32-bit value.
    Int(i32),
    /// Signed 64-bit value.
    Long(i64),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Get as i32, if this is an [`Int`](FieldValue::Int).
    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as i64. Both integer shapes widen.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(i64::from(*v)),
            FieldValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as text, if this is a [`Text`](FieldValue::Text).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// A field change, delivered synchronously to registered listeners.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Subidentifier of the changed field within its entity.
    pub field_id: u32,
    /// Value before the change.
    pub old: Option<FieldValue>,
    /// Value after the change.
    pub new: Option<FieldValue>,
}

/// Observer of entity field changes.
pub trait ChangeListener: Send + Sync {
    /// Called synchronously from the setter that changed the field.
    fn field_changed(&self, event: &ChangeEvent);
}

/// The set of change listeners registered on one entity.
///
/// Listeners are deduplicated by pointer identity. Notification is
/// synchronous with no ordering guarantee between listeners; a panicking
/// listener unwinds into the setter's caller (the entity does not catch it).
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl ListenerSet {
    /// Create an empty listener set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener, ignoring a pointer-identical duplicate.
    pub fn add(&mut self, listener: Arc<dyn ChangeListener>) {
        if !self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    /// Remove a listener by pointer identity.
    pub fn remove(&mut self, listener: &Arc<dyn ChangeListener>) {
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Remove all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// The registered listeners, for copying onto a newly attached child.
    pub fn snapshot(&self) -> Vec<Arc<dyn ChangeListener>> {
        self.listeners.clone()
    }

    /// Notify every listener of a field change.
    pub fn notify(&self, field_id: u32, old: Option<FieldValue>, new: Option<FieldValue>) {
        if self.listeners.is_empty() {
            return;
        }
        let event = ChangeEvent { field_id, old, new };
        for listener in &self.listeners {
            listener.field_changed(&event);
        }
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerSet({} listeners)", self.listeners.len())
    }
}

/// Capability of table-row entities: a row index derived from the trailing
/// arcs of the value path that first created the row.
pub trait Indexed {
    /// Set the row index. Called once, before the first value is applied.
    fn set_index(&mut self, index: &str);

    /// The row index, as a dot-joined string.
    fn index(&self) -> &str;
}

/// Capability of table-container entities: keyed access to row entities.
///
/// Row index strings are unique within one table. [`set_entry`]
/// (TableAccess::set_entry) is the explicit overwrite point - an existing
/// entry is never replaced by any other path.
pub trait TableAccess {
    /// The row with the given index, if present.
    fn entry(&self, index: &str) -> Option<&dyn DeviceEntity>;

    /// Mutable access to the row with the given index.
    fn entry_mut(&mut self, index: &str) -> Option<&mut dyn DeviceEntity>;

    /// Insert a row under `index`, replacing any existing entry.
    fn set_entry(&mut self, index: &str, entry: Box<dyn DeviceEntity>);

    /// All row indexes, in deterministic order.
    fn indexes(&self) -> Vec<&str>;

    /// Number of rows.
    fn row_count(&self) -> usize;
}

/// A schema-described, dynamically-accessed node of the device model.
pub trait DeviceEntity: Send {
    /// The static schema for this entity type.
    fn description(&self) -> &'static EntityDescription;

    /// The entity type name, used in registry lookups and error reporting.
    fn type_name(&self) -> &'static str;

    /// Get a field by name.
    ///
    /// `Ok(None)` means the field is known but currently unset. Fails with
    /// [`Error::UnknownField`] when no such field exists on this type, and
    /// with [`Error::FieldAccess`] when the field exists but cannot be read.
    fn get(&self, field: &str) -> Result<Option<FieldValue>>;

    /// Set a field by name.
    ///
    /// The same two failure kinds as [`get`](Self::get) apply: an unmatched
    /// name is [`Error::UnknownField`]; a matched field rejecting the value
    /// shape is [`Error::FieldAccess`].
    fn set(&mut self, field: &str, value: FieldValue) -> Result<()>;

    /// Accept one incoming variable binding.
    ///
    /// The mapping from the binding's path suffix to a field is resolved by
    /// the entity itself - it is schema-specific, not derivable generically.
    fn apply(&mut self, binding: &VarBind) -> Result<()>;

    /// Whether the schema lists `field`, independent of whether a live
    /// accessor can currently serve it.
    fn is_supported(&self, field: &str) -> bool {
        self.description().field_by_name(field).is_some()
    }

    /// The currently-known child entities: populated entity-valued fields
    /// plus all rows of a table field. Recomputed on every call.
    fn children(&self) -> Vec<&dyn DeviceEntity> {
        Vec::new()
    }

    /// Mutable access to the currently-known child entities.
    fn children_mut(&mut self) -> Vec<&mut dyn DeviceEntity> {
        Vec::new()
    }

    /// This entity's listener set.
    fn listeners(&self) -> &ListenerSet;

    /// Mutable access to this entity's listener set.
    fn listeners_mut(&mut self) -> &mut ListenerSet;

    /// Register a change listener on this entity and, recursively, on all
    /// currently-known children.
    ///
    /// Children created *after* registration do not inherit the listener
    /// automatically; attachment points copy the parent's current listeners
    /// onto new children instead.
    fn add_change_listener(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners_mut().add(listener.clone());
        for child in self.children_mut() {
            child.add_change_listener(listener.clone());
        }
    }

    /// Remove a change listener from this entity and all currently-known
    /// children.
    fn remove_change_listener(&mut self, listener: &Arc<dyn ChangeListener>) {
        self.listeners_mut().remove(listener);
        for child in self.children_mut() {
            child.remove_change_listener(listener);
        }
    }

    /// Remove every change listener from this entity and all currently-known
    /// children.
    fn clear_change_listeners(&mut self) {
        self.listeners_mut().clear();
        for child in self.children_mut() {
            child.clear_change_listeners();
        }
    }

    /// Table-container capability, if this entity is a table.
    fn as_table(&self) -> Option<&dyn TableAccess> {
        None
    }

    /// Mutable table-container capability.
    fn as_table_mut(&mut self) -> Option<&mut dyn TableAccess> {
        None
    }

    /// Indexed-row capability, if this entity is a table row.
    fn as_indexed_mut(&mut self) -> Option<&mut dyn Indexed> {
        None
    }
}

/// Resolve the field subidentifier a binding addresses within `description`.
///
/// For a value path `<entity-oid>.<field-id>.<index...>` this is the arc
/// immediately after the entity's own OID. Returns `None` when the path does
/// not extend the entity's OID.
pub fn binding_field_id(description: &EntityDescription, binding: &VarBind) -> Option<u32> {
    if !binding.oid.starts_with(description.oid()) {
        return None;
    }
    binding.oid.arcs().get(description.oid().len()).copied()
}

/// Shorthand for the [`Error::UnmappedBinding`] an `apply` implementation
/// raises for a path it does not recognize.
pub fn unmapped_binding(entity: &dyn DeviceEntity, binding: &VarBind) -> Error {
    Error::UnmappedBinding {
        entity: entity.type_name(),
        oid: binding.oid.clone(),
    }
}
