//! Generic table-container entity.

use crate::error::Result;
use crate::model::description::EntityDescription;
use crate::model::entity::{DeviceEntity, ListenerSet, TableAccess};
use crate::varbind::VarBind;
use std::collections::BTreeMap;

/// A keyed collection of table-row entities.
///
/// Rows are keyed by their dot-joined index string and kept in index-string
/// order. The table itself exposes no dynamically-settable fields; incoming
/// values always belong to a row, never to the table node.
pub struct TableEntity {
    description: &'static EntityDescription,
    type_name: &'static str,
    rows: BTreeMap<String, Box<dyn DeviceEntity>>,
    listeners: ListenerSet,
}

impl TableEntity {
    /// Create an empty table for the given container description.
    pub fn new(type_name: &'static str, description: &'static EntityDescription) -> Self {
        Self {
            description,
            type_name,
            rows: BTreeMap::new(),
            listeners: ListenerSet::new(),
        }
    }

    /// Rows in index-string order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &dyn DeviceEntity)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl DeviceEntity for TableEntity {
    fn description(&self) -> &'static EntityDescription {
        self.description
    }

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn get(&self, field: &str) -> Result<Option<crate::model::FieldValue>> {
        Err(crate::error::Error::unknown_field(self.type_name, field))
    }

    fn set(&mut self, field: &str, _value: crate::model::FieldValue) -> Result<()> {
        Err(crate::error::Error::unknown_field(self.type_name, field))
    }

    fn apply(&mut self, binding: &VarBind) -> Result<()> {
        Err(crate::model::entity::unmapped_binding(self, binding))
    }

    fn children(&self) -> Vec<&dyn DeviceEntity> {
        self.rows.values().map(|r| r.as_ref()).collect()
    }

    fn children_mut(&mut self) -> Vec<&mut dyn DeviceEntity> {
        let mut out: Vec<&mut dyn DeviceEntity> = Vec::new();
        for r in self.rows.values_mut() {
            out.push(r.as_mut());
        }
        out
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }

    fn as_table(&self) -> Option<&dyn TableAccess> {
        Some(self)
    }

    fn as_table_mut(&mut self) -> Option<&mut dyn TableAccess> {
        Some(self)
    }
}

impl TableAccess for TableEntity {
    fn entry(&self, index: &str) -> Option<&dyn DeviceEntity> {
        self.rows.get(index).map(|r| r.as_ref())
    }

    fn entry_mut(&mut self, index: &str) -> Option<&mut dyn DeviceEntity> {
        match self.rows.get_mut(index) {
            Some(r) => Some(r.as_mut()),
            None => None,
        }
    }

    fn set_entry(&mut self, index: &str, mut entry: Box<dyn DeviceEntity>) {
        // New rows pick up the listeners currently registered on the table.
        for listener in self.listeners.snapshot() {
            entry.add_change_listener(listener);
        }
        self.rows.insert(index.to_string(), entry);
    }

    fn indexes(&self) -> Vec<&str> {
        self.rows.keys().map(|k| k.as_str()).collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}
