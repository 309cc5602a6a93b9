//! Outbound notification payload assembly.

use crate::error::{Error, Result};
use crate::model::{DeviceEntity, FieldDescriptor, FieldType, FieldValue};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::error;

/// Well-known OIDs used in notification payloads.
pub mod oids {
    use crate::oid;

    /// sysUpTime.0 - the conventional first varbind of a notification.
    pub fn sys_uptime() -> crate::Oid {
        oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
    }

    /// snmpTrapOID.0 - carries the notification's type identifier.
    pub fn snmp_trap_oid() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0)
    }
}

/// Maps a schema field to its protocol-level OID.
///
/// Notification schemas describe fields by subidentifier; where each field
/// actually lives on the wire is device-type knowledge the caller supplies.
pub trait NotificationOidLookup {
    /// The wire OID for `field`.
    fn oid_for_field(&self, field: &FieldDescriptor) -> Oid;
}

impl<F> NotificationOidLookup for F
where
    F: Fn(&FieldDescriptor) -> Oid,
{
    fn oid_for_field(&self, field: &FieldDescriptor) -> Oid {
        self(field)
    }
}

/// Build an ordered notification payload from a notification entity.
///
/// The payload starts with the mandatory type-identifier entry
/// (snmpTrapOID.0 carrying the entity's own OID), followed by one entry per
/// schema field whose current value is non-null, ordered by resolved OID.
/// Null fields are omitted entirely, never sent as empty values.
///
/// Schema faults (a field the entity cannot serve, or a value of the wrong
/// shape for its declared type) are surfaced as errors; fields whose
/// declared type has no payload representation are logged and skipped.
pub fn build_payload(
    notification: &dyn DeviceEntity,
    lookup: &dyn NotificationOidLookup,
) -> Result<Vec<VarBind>> {
    let description = notification.description();
    let mut entries: BTreeMap<Oid, VarBind> = BTreeMap::new();

    for field in description.fields() {
        let Some(value) = notification.get(field.name())? else {
            continue;
        };
        let Some(converted) = convert_field(notification, field, &value)? else {
            continue;
        };
        let oid = lookup.oid_for_field(field);
        entries.insert(oid.clone(), VarBind::new(oid, converted));
    }

    let mut payload = Vec::with_capacity(entries.len() + 1);
    payload.push(VarBind::new(
        oids::snmp_trap_oid(),
        Value::ObjectIdentifier(description.oid().clone()),
    ));
    payload.extend(entries.into_values());
    Ok(payload)
}

// Convert one populated field to its wire value per the declared semantic
// type. Ok(None) means the type has no payload representation.
fn convert_field(
    notification: &dyn DeviceEntity,
    field: &FieldDescriptor,
    value: &FieldValue,
) -> Result<Option<Value>> {
    let converted = match field.field_type() {
        FieldType::Integer | FieldType::FixedX10 | FieldType::FixedX100 | FieldType::FixedX1000 => {
            Value::Integer(require_int(notification, field, value)?)
        }
        FieldType::DisplayString | FieldType::Bits | FieldType::OidRef => {
            Value::OctetString(Bytes::copy_from_slice(
                require_text(notification, field, value)?.as_bytes(),
            ))
        }
        FieldType::DateAndTime => {
            let text = require_text(notification, field, value)?;
            Value::OctetString(parse_colon_hex(notification, field, text)?)
        }
        FieldType::IpAddress => {
            let text = require_text(notification, field, value)?;
            Value::IpAddress(parse_ipv4(notification, field, text)?)
        }
        FieldType::Unsigned32 => {
            let v = value.as_long().ok_or_else(|| {
                Error::field_access(notification.type_name(), field.name(), "expected integer")
            })?;
            let v = u32::try_from(v).map_err(|_| {
                Error::field_access(
                    notification.type_name(),
                    field.name(),
                    "value out of unsigned 32-bit range",
                )
            })?;
            Value::Gauge32(v)
        }
        FieldType::Entity | FieldType::Table | FieldType::Unsigned64 => {
            error!(field = field.name(), "unexpected type in notification");
            return Ok(None);
        }
    };
    Ok(Some(converted))
}

fn require_int(entity: &dyn DeviceEntity, field: &FieldDescriptor, value: &FieldValue) -> Result<i32> {
    value.as_int().ok_or_else(|| {
        Error::field_access(entity.type_name(), field.name(), "expected integer")
    })
}

fn require_text<'a>(
    entity: &dyn DeviceEntity,
    field: &FieldDescriptor,
    value: &'a FieldValue,
) -> Result<&'a str> {
    value
        .as_text()
        .ok_or_else(|| Error::field_access(entity.type_name(), field.name(), "expected text"))
}

// Timestamps travel as colon-separated hex octets, e.g. "07:e0:01:0f".
fn parse_colon_hex(entity: &dyn DeviceEntity, field: &FieldDescriptor, text: &str) -> Result<Bytes> {
    let mut bytes = Vec::new();
    for part in text.split(':') {
        let byte = u8::from_str_radix(part, 16).map_err(|_| {
            Error::field_access(
                entity.type_name(),
                field.name(),
                format!("invalid hex octet `{}`", part),
            )
        })?;
        bytes.push(byte);
    }
    Ok(Bytes::from(bytes))
}

fn parse_ipv4(entity: &dyn DeviceEntity, field: &FieldDescriptor, text: &str) -> Result<[u8; 4]> {
    text.parse::<std::net::Ipv4Addr>()
        .map(|addr| addr.octets())
        .map_err(|_| {
            Error::field_access(
                entity.type_name(),
                field.name(),
                format!("invalid IPv4 address `{}`", text),
            )
        })
}
