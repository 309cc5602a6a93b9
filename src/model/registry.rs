//! OID-to-entity-type registry.

use crate::model::description::EntityDescription;
use crate::model::entity::DeviceEntity;
use crate::oid::Oid;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// The structural role an entity type plays in the schema.
///
/// This is the capability set the walk logic dispatches on: whether a type
/// is indexed (a table row, discovered through its container rather than
/// requested directly), a table container, or a scalar group that accepts
/// variable bindings directly on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A group of scalar fields; accepts raw variable bindings.
    Scalars,
    /// A table container; owns row entities, accepts no bindings itself.
    Table,
    /// An indexed table row; accepts raw variable bindings.
    TableRow,
}

impl EntityKind {
    /// True for indexed (table-row) types.
    pub fn is_indexed(self) -> bool {
        matches!(self, EntityKind::TableRow)
    }

    /// True for table containers.
    pub fn is_table(self) -> bool {
        matches!(self, EntityKind::Table)
    }

    /// True for types that set incoming variable bindings on themselves.
    pub fn accepts_bindings(self) -> bool {
        matches!(self, EntityKind::Scalars | EntityKind::TableRow)
    }
}

/// A registered entity type: name, schema, role, and constructor.
///
/// The constructor replaces reflective instantiation - the registry can
/// build a fresh instance of any registered type on demand.
pub struct EntityType {
    /// The entity type name (registry lookups, error reporting).
    pub name: &'static str,
    /// The static schema shared by all instances of the type.
    pub description: &'static EntityDescription,
    /// The structural role of the type.
    pub kind: EntityKind,
    /// Builds a fresh, unpopulated instance.
    pub constructor: fn() -> Box<dyn DeviceEntity>,
}

impl EntityType {
    /// Instantiate a new, unpopulated entity of this type.
    pub fn instantiate(&self) -> Box<dyn DeviceEntity> {
        (self.constructor)()
    }
}

impl std::fmt::Debug for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("oid", self.description.oid())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Per-device-type mapping between OIDs and entity types, both directions.
///
/// Built once at device-type registration time and immutable afterwards,
/// except for the configurable excluded-OID list. Constructed explicitly and
/// passed by reference into the components that need it - there is no
/// ambient process-wide registry.
pub struct EntityRegistry {
    oid_to_type: BTreeMap<Oid, EntityType>,
    name_to_oid: HashMap<&'static str, Oid>,
    excluded_discovery_oids: Vec<Oid>,
}

impl EntityRegistry {
    /// Build a registry from the registered entity types.
    ///
    /// Each type is keyed by its description's OID; names map back to the
    /// same types, so the two lookup directions always agree.
    pub fn new(types: impl IntoIterator<Item = EntityType>) -> Self {
        let mut oid_to_type = BTreeMap::new();
        let mut name_to_oid = HashMap::new();
        for entity_type in types {
            let oid = entity_type.description.oid().clone();
            name_to_oid.insert(entity_type.name, oid.clone());
            oid_to_type.insert(oid, entity_type);
        }
        Self {
            oid_to_type,
            name_to_oid,
            excluded_discovery_oids: Vec::new(),
        }
    }

    /// The entity type registered under `oid`, if any.
    ///
    /// Absence is an expected, common case while walking a device that does
    /// not expose the full schema.
    pub fn entity_type(&self, oid: &Oid) -> Option<&EntityType> {
        self.oid_to_type.get(oid)
    }

    /// The entity type registered under `name`, if any.
    pub fn entity_type_by_name(&self, name: &str) -> Option<&EntityType> {
        self.name_to_oid
            .get(name)
            .and_then(|oid| self.oid_to_type.get(oid))
    }

    /// The description registered under `oid`, without instantiation.
    pub fn description_for(&self, oid: &Oid) -> Option<&'static EntityDescription> {
        self.entity_type(oid).map(|t| t.description)
    }

    /// All registered OIDs, in ascending numeric order.
    pub fn oids(&self) -> Vec<Oid> {
        self.oid_to_type.keys().cloned().collect()
    }

    /// The OID set to request during a schema-driven full walk.
    ///
    /// Table rows are discovered via their containers, so indexed types are
    /// left out; the configured exclusion list is then applied, and the
    /// result is deduplicated and sorted in ascending numeric order.
    pub fn discovery_oids(&self) -> Vec<Oid> {
        let oids: Vec<Oid> = self
            .oid_to_type
            .iter()
            .filter(|(_, t)| !t.kind.is_indexed())
            .map(|(oid, _)| oid.clone())
            .collect();
        let oids = self.process_excluded_oids(oids);
        trace!(count = oids.len(), "computed discovery OIDs");
        oids
    }

    /// Apply the exclusion list to a discovery OID list.
    ///
    /// For each excluded OID:
    /// - every discovery OID whose string form starts with the excluded
    ///   OID's string form is removed;
    /// - a discovery OID equal to the excluded OID's parent (the branch) is
    ///   removed as well, so the branch subtree is never walked - but one
    ///   OID per *scalar* field of the branch's schema is added back, which
    ///   keeps sibling scalar attributes retrievable on their own.
    fn process_excluded_oids(&self, mut oids: Vec<Oid>) -> Vec<Oid> {
        debug!(excluded = ?self.excluded_discovery_oids, "excluding OIDs from discovery list");
        for excluded in &self.excluded_discovery_oids {
            let excluded_str = excluded.to_string();
            let branch = excluded.parent();

            let mut to_add: Vec<Oid> = Vec::new();
            oids.retain(|oid| {
                if oid.to_string().starts_with(&excluded_str) {
                    return false;
                }
                if Some(oid) == branch.as_ref() {
                    self.readd_scalars(oid, &mut to_add);
                    return false;
                }
                true
            });

            for oid in to_add {
                if !oids.contains(&oid) {
                    oids.push(oid);
                }
            }
        }
        oids.sort();
        oids.dedup();
        oids
    }

    // Add back one OID per scalar field of the excluded branch's schema.
    fn readd_scalars(&self, branch: &Oid, to_add: &mut Vec<Oid>) {
        let Some(description) = self.description_for(branch) else {
            return;
        };
        for field in description.fields() {
            if field.field_type().is_scalar() {
                to_add.push(branch.child(field.id()));
            }
        }
    }

    /// Configure the excluded discovery OIDs from a comma-separated list of
    /// path prefixes (e.g. `"1.3.6.1.2.1.2,1.3.6.1.4"`).
    ///
    /// Unparseable items are skipped with a debug log.
    pub fn set_excluded_discovery_oids(&mut self, oids: &str) {
        let mut excluded = Vec::new();
        for item in oids.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match Oid::parse(item) {
                Ok(oid) => excluded.push(oid),
                Err(_) => debug!(oid = item, "skipping unparseable excluded OID"),
            }
        }
        self.excluded_discovery_oids = excluded;
    }

    /// The entity type that should own a value at `oid`.
    ///
    /// If the immediate parent OID maps to a table container or to a type
    /// that sets variable bindings on itself, the parent's type is returned;
    /// otherwise the OID's own type. This disambiguates "the OID *is* an
    /// entity" from "the OID is a *field* of an entity".
    pub fn containing_entity_type(&self, oid: &Oid) -> Option<&EntityType> {
        let child = self.entity_type(oid);
        let parent = oid.parent().and_then(|p| self.entity_type(&p));
        match parent {
            Some(p) if p.kind.is_table() || p.kind.accepts_bindings() => Some(p),
            _ => child,
        }
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("types", &self.oid_to_type.len())
            .field("excluded", &self.excluded_discovery_oids)
            .finish()
    }
}
