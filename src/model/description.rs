//! Static per-type schema: entity and field descriptions.

use crate::oid::Oid;
use std::collections::BTreeMap;

/// The semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldType {
    /// Signed 32-bit integer.
    Integer,
    /// Display string, with an optional maximum length.
    DisplayString,
    /// Unsigned 32-bit value (Gauge32/Unsigned32).
    Unsigned32,
    /// Unsigned 64-bit value (Counter64).
    Unsigned64,
    /// IPv4 address.
    IpAddress,
    /// Timestamp, carried as a colon-separated hex octet string.
    DateAndTime,
    /// Bit set, carried as an octet string.
    Bits,
    /// Fixed-point value scaled by 10.
    FixedX10,
    /// Fixed-point value scaled by 100.
    FixedX100,
    /// Fixed-point value scaled by 1000.
    FixedX1000,
    /// Reference to another schema element by OID.
    OidRef,
    /// A nested entity.
    Entity,
    /// A table of row entities. At most one per entity in practice.
    Table,
}

impl FieldType {
    /// True for single-value field types - everything except nested
    /// entities and tables.
    pub fn is_scalar(self) -> bool {
        !matches!(self, FieldType::Entity | FieldType::Table)
    }
}

/// Immutable description of one schema field.
///
/// The `id` is the OID subidentifier of the field within its parent: if the
/// entity's OID is `1.2.3`, the field at `1.2.3.4` has id 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    id: u32,
    name: &'static str,
    field_type: FieldType,
    /// Maximum length bound, string types only.
    max_length: Option<usize>,
}

impl FieldDescriptor {
    /// Create a field descriptor.
    pub fn new(id: u32, name: &'static str, field_type: FieldType) -> Self {
        Self {
            id,
            name,
            field_type,
            max_length: None,
        }
    }

    /// Create a string field descriptor with a maximum length bound.
    pub fn with_max_length(id: u32, name: &'static str, max_length: usize) -> Self {
        Self {
            id,
            name,
            field_type: FieldType::DisplayString,
            max_length: Some(max_length),
        }
    }

    /// The OID subidentifier of the field within its parent.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The field name, in lower camel case.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The semantic type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Maximum length bound, set for string types only.
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }
}

/// Static schema for one entity type: its OID and its ordered field set.
///
/// Field names and ids are each unique within one description. Created once
/// per entity type, typically as a `LazyLock` static, and immutable after
/// construction.
#[derive(Debug)]
pub struct EntityDescription {
    oid: Oid,
    fields_by_name: BTreeMap<&'static str, FieldDescriptor>,
    fields_by_id: BTreeMap<u32, FieldDescriptor>,
}

impl EntityDescription {
    /// Create an empty description for the entity at `oid`.
    pub fn new(oid: Oid) -> Self {
        Self {
            oid,
            fields_by_name: BTreeMap::new(),
            fields_by_id: BTreeMap::new(),
        }
    }

    /// Create a description and register all `fields`.
    pub fn with_fields(oid: Oid, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        let mut description = Self::new(oid);
        for field in fields {
            description.add_field(field);
        }
        description
    }

    /// Register a field under both its name and its id.
    ///
    /// There is no removal operation; descriptions only grow during
    /// construction.
    pub fn add_field(&mut self, field: FieldDescriptor) {
        self.fields_by_name.insert(field.name(), field.clone());
        self.fields_by_id.insert(field.id(), field);
    }

    /// The OID identifying this entity type.
    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields_by_name.get(name)
    }

    /// Look up a field by its OID subidentifier.
    pub fn field_by_id(&self, id: u32) -> Option<&FieldDescriptor> {
        self.fields_by_id.get(&id)
    }

    /// All fields, in name order.
    ///
    /// The order is deterministic but not insertion order; payload assembly
    /// and other stable-output consumers rely on this.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields_by_name.values()
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields_by_name.len()
    }
}
