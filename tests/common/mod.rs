//! Shared test fixtures: a small hand-written device model.
//!
//! Models a device exposing a scalar system group and an interface table
//! under a private enterprise subtree, the way schema-generated entity types
//! would.

// Allow dead code since not all test files use all fixtures
#![allow(dead_code)]

use mibgraph::model::{binding_field_id, unmapped_binding};
use mibgraph::{
    oid, DeviceEntity, EntityDescription, EntityKind, EntityRegistry, EntityType, FieldDescriptor,
    FieldType, FieldValue, Oid, TableEntity, VarBind,
};
use mibgraph::{Error, Result};
use mibgraph::model::{Indexed, ListenerSet};
use std::sync::{Arc, LazyLock};

pub static SYSTEM_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1, 3, 6, 1, 9999, 1),
        [
            FieldDescriptor::with_max_length(1, "sysName", 255),
            FieldDescriptor::with_max_length(2, "sysContact", 255),
            FieldDescriptor::new(3, "sysServices", FieldType::Integer),
        ],
    )
});

pub static IF_TABLE_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1, 3, 6, 1, 9999, 2),
        [FieldDescriptor::new(1, "entries", FieldType::Table)],
    )
});

pub static IF_ENTRY_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1, 3, 6, 1, 9999, 2, 1),
        [
            FieldDescriptor::new(1, "ifIndex", FieldType::Integer),
            FieldDescriptor::with_max_length(2, "ifDescr", 255),
            FieldDescriptor::new(3, "ifSpeed", FieldType::Integer),
        ],
    )
});

/// The scalar system group.
#[derive(Default)]
pub struct SystemInfo {
    pub sys_name: Option<String>,
    pub sys_contact: Option<String>,
    pub sys_services: Option<i32>,
    listeners: ListenerSet,
}

impl DeviceEntity for SystemInfo {
    fn description(&self) -> &'static EntityDescription {
        &SYSTEM_DESC
    }

    fn type_name(&self) -> &'static str {
        "SystemInfo"
    }

    fn get(&self, field: &str) -> Result<Option<FieldValue>> {
        match field {
            "sysName" => Ok(self.sys_name.clone().map(FieldValue::Text)),
            "sysContact" => Ok(self.sys_contact.clone().map(FieldValue::Text)),
            "sysServices" => Ok(self.sys_services.map(FieldValue::Int)),
            _ => Err(Error::unknown_field(self.type_name(), field)),
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "sysName" => {
                self.sys_name = Some(require_text(self.type_name(), field, &value)?);
            }
            "sysContact" => {
                self.sys_contact = Some(require_text(self.type_name(), field, &value)?);
            }
            "sysServices" => {
                let v = value
                    .as_int()
                    .ok_or_else(|| Error::field_access(self.type_name(), field, "expected integer"))?;
                let old = self.sys_services.replace(v);
                self.listeners
                    .notify(3, old.map(FieldValue::Int), Some(FieldValue::Int(v)));
            }
            _ => return Err(Error::unknown_field(self.type_name(), field)),
        }
        Ok(())
    }

    fn apply(&mut self, binding: &VarBind) -> Result<()> {
        match binding_field_id(self.description(), binding) {
            Some(1) => self.set("sysName", text_of(binding)),
            Some(2) => self.set("sysContact", text_of(binding)),
            Some(3) => self.set(
                "sysServices",
                FieldValue::Int(binding.value.as_i32().unwrap_or_default()),
            ),
            _ => Err(unmapped_binding(self, binding)),
        }
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }
}

/// One interface-table row.
#[derive(Default)]
pub struct IfEntry {
    index: String,
    pub if_index: Option<i32>,
    pub if_descr: Option<String>,
    pub if_speed: Option<i32>,
    listeners: ListenerSet,
}

impl DeviceEntity for IfEntry {
    fn description(&self) -> &'static EntityDescription {
        &IF_ENTRY_DESC
    }

    fn type_name(&self) -> &'static str {
        "IfEntry"
    }

    fn get(&self, field: &str) -> Result<Option<FieldValue>> {
        match field {
            "ifIndex" => Ok(self.if_index.map(FieldValue::Int)),
            "ifDescr" => Ok(self.if_descr.clone().map(FieldValue::Text)),
            "ifSpeed" => Ok(self.if_speed.map(FieldValue::Int)),
            _ => Err(Error::unknown_field(self.type_name(), field)),
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "ifIndex" => {
                self.if_index = Some(require_int(self.type_name(), field, &value)?);
            }
            "ifDescr" => {
                self.if_descr = Some(require_text(self.type_name(), field, &value)?);
            }
            "ifSpeed" => {
                let v = require_int(self.type_name(), field, &value)?;
                let old = self.if_speed.replace(v);
                self.listeners
                    .notify(3, old.map(FieldValue::Int), Some(FieldValue::Int(v)));
            }
            _ => return Err(Error::unknown_field(self.type_name(), field)),
        }
        Ok(())
    }

    fn apply(&mut self, binding: &VarBind) -> Result<()> {
        match binding_field_id(self.description(), binding) {
            Some(1) => self.set(
                "ifIndex",
                FieldValue::Int(binding.value.as_i32().unwrap_or_default()),
            ),
            Some(2) => self.set("ifDescr", text_of(binding)),
            Some(3) => self.set(
                "ifSpeed",
                FieldValue::Int(binding.value.as_i32().unwrap_or_default()),
            ),
            _ => Err(unmapped_binding(self, binding)),
        }
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }

    fn as_indexed_mut(&mut self) -> Option<&mut dyn Indexed> {
        Some(self)
    }
}

impl Indexed for IfEntry {
    fn set_index(&mut self, index: &str) {
        self.index = index.to_string();
    }

    fn index(&self) -> &str {
        &self.index
    }
}

/// Registry covering the whole test model.
pub fn registry() -> Arc<EntityRegistry> {
    Arc::new(EntityRegistry::new([
        EntityType {
            name: "SystemInfo",
            description: &SYSTEM_DESC,
            kind: EntityKind::Scalars,
            constructor: || Box::new(SystemInfo::default()),
        },
        EntityType {
            name: "IfTable",
            description: &IF_TABLE_DESC,
            kind: EntityKind::Table,
            constructor: || Box::new(TableEntity::new("IfTable", &IF_TABLE_DESC)),
        },
        EntityType {
            name: "IfEntry",
            description: &IF_ENTRY_DESC,
            kind: EntityKind::TableRow,
            constructor: || Box::new(IfEntry::default()),
        },
    ]))
}

pub fn system_oid() -> Oid {
    SYSTEM_DESC.oid().clone()
}

pub fn if_table_oid() -> Oid {
    IF_TABLE_DESC.oid().clone()
}

pub fn if_entry_oid() -> Oid {
    IF_ENTRY_DESC.oid().clone()
}

fn require_text(entity: &'static str, field: &str, value: &FieldValue) -> Result<String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| Error::field_access(entity, field, "expected text"))
}

fn require_int(entity: &'static str, field: &str, value: &FieldValue) -> Result<i32> {
    value
        .as_int()
        .ok_or_else(|| Error::field_access(entity, field, "expected integer"))
}

fn text_of(binding: &VarBind) -> FieldValue {
    FieldValue::Text(binding.value.as_str().unwrap_or_default().to_string())
}
