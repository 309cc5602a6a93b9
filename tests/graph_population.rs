//! Object-graph builder contract tests with a minimal compact schema.

use mibgraph::model::{binding_field_id, unmapped_binding, Indexed, ListenerSet};
use mibgraph::{
    oid, DeviceEntity, EntityDescription, EntityKind, EntityRegistry, EntityType, Error,
    FieldDescriptor, FieldType, FieldValue, NetworkDevice, Result, TableEntity, Value, VarBind,
};
use std::sync::{Arc, LazyLock};

static SCALAR_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1),
        [FieldDescriptor::with_max_length(2, "value", 64)],
    )
});

static TABLE_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1, 2),
        [FieldDescriptor::new(3, "rows", FieldType::Table)],
    )
});

static ROW_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
    EntityDescription::with_fields(
        oid!(1, 2, 3),
        [
            FieldDescriptor::new(1, "first", FieldType::Integer),
            FieldDescriptor::new(2, "second", FieldType::Integer),
        ],
    )
});

#[derive(Default)]
struct ScalarNode {
    value: Option<String>,
    listeners: ListenerSet,
}

impl DeviceEntity for ScalarNode {
    fn description(&self) -> &'static EntityDescription {
        &SCALAR_DESC
    }

    fn type_name(&self) -> &'static str {
        "ScalarNode"
    }

    fn get(&self, field: &str) -> Result<Option<FieldValue>> {
        match field {
            "value" => Ok(self.value.clone().map(FieldValue::Text)),
            _ => Err(Error::unknown_field("ScalarNode", field)),
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "value" => {
                self.value = value.as_text().map(str::to_string);
                Ok(())
            }
            _ => Err(Error::unknown_field("ScalarNode", field)),
        }
    }

    fn apply(&mut self, binding: &VarBind) -> Result<()> {
        match binding_field_id(self.description(), binding) {
            Some(2) => self.set(
                "value",
                FieldValue::Text(binding.value.as_str().unwrap_or_default().to_string()),
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

#[derive(Default)]
struct RowNode {
    index: String,
    first: Option<i32>,
    second: Option<i32>,
    listeners: ListenerSet,
}

impl DeviceEntity for RowNode {
    fn description(&self) -> &'static EntityDescription {
        &ROW_DESC
    }

    fn type_name(&self) -> &'static str {
        "RowNode"
    }

    fn get(&self, field: &str) -> Result<Option<FieldValue>> {
        match field {
            "first" => Ok(self.first.map(FieldValue::Int)),
            "second" => Ok(self.second.map(FieldValue::Int)),
            _ => Err(Error::unknown_field("RowNode", field)),
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let v = value
            .as_int()
            .ok_or_else(|| Error::field_access("RowNode", field, "expected integer"))?;
        match field {
            "first" => self.first = Some(v),
            "second" => self.second = Some(v),
            _ => return Err(Error::unknown_field("RowNode", field)),
        }
        Ok(())
    }

    fn apply(&mut self, binding: &VarBind) -> Result<()> {
        let value = FieldValue::Int(binding.value.as_i32().unwrap_or_default());
        match binding_field_id(self.description(), binding) {
            Some(1) => self.set("first", value),
            Some(2) => self.set("second", value),
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

impl Indexed for RowNode {
    fn set_index(&mut self, index: &str) {
        self.index = index.to_string();
    }

    fn index(&self) -> &str {
        &self.index
    }
}

fn scalar_registry() -> Arc<EntityRegistry> {
    Arc::new(EntityRegistry::new([EntityType {
        name: "ScalarNode",
        description: &SCALAR_DESC,
        kind: EntityKind::Scalars,
        constructor: || Box::new(ScalarNode::default()),
    }]))
}

fn table_registry() -> Arc<EntityRegistry> {
    Arc::new(EntityRegistry::new([
        EntityType {
            name: "RowTable",
            description: &TABLE_DESC,
            kind: EntityKind::Table,
            constructor: || Box::new(TableEntity::new("RowTable", &TABLE_DESC)),
        },
        EntityType {
            name: "RowNode",
            description: &ROW_DESC,
            kind: EntityKind::TableRow,
            constructor: || Box::new(RowNode::default()),
        },
    ]))
}

#[test]
fn scalar_binding_populates_the_owning_entity() {
    let device = NetworkDevice::new(scalar_registry(), "192.0.2.1");

    assert!(device.add_variable(&VarBind::new(oid!(1, 2, 0), Value::from("V"))));

    device.with_root(|root| {
        let entity = root.entity(&oid!(1)).expect("entity at 1");
        assert_eq!(
            entity.get("value").unwrap(),
            Some(FieldValue::Text("V".into()))
        );
    });
}

#[test]
fn unregistered_ancestor_chain_creates_nothing() {
    let device = NetworkDevice::new(scalar_registry(), "192.0.2.1");

    assert!(!device.add_variable(&VarBind::new(oid!(5, 2, 0), Value::from("V"))));

    device.with_root(|root| assert_eq!(root.root_count(), 0));
}

#[test]
fn table_ingestion_reconstructs_one_row_from_index_bearing_oids() {
    let device = NetworkDevice::new(table_registry(), "192.0.2.1");

    assert!(device.add_variable(&VarBind::new(
        oid!(1, 2, 3, 1, 10, 11, 12),
        Value::Integer(1)
    )));
    assert!(device.add_variable(&VarBind::new(
        oid!(1, 2, 3, 2, 10, 11, 12),
        Value::Integer(2)
    )));

    device.with_root(|root| {
        let container = root.entity(&oid!(1, 2)).expect("table at 1.2");
        let table = container.as_table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(container.children().len(), 1);

        let row = table.entry("10.11.12").expect("row keyed by index suffix");
        assert_eq!(row.get("first").unwrap(), Some(FieldValue::Int(1)));
        assert_eq!(row.get("second").unwrap(), Some(FieldValue::Int(2)));
    });
}
