//! SNMP value types.
//!
//! [`Value`] represents the data types a protocol engine can deliver for a
//! variable binding, including the v2 exception markers. Wire encoding and
//! decoding belong to the engine; this type only carries decoded values into
//! the model layer.

use crate::oid::Oid;
use bytes::Bytes;
use std::fmt;

/// A decoded protocol value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (signed 32-bit).
    Integer(i32),

    /// OCTET STRING (arbitrary bytes).
    OctetString(Bytes),

    /// NULL.
    Null,

    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian).
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping).
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping).
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds).
    TimeTicks(u32),

    /// Counter64 (unsigned 64-bit, wrapping).
    Counter64(u64),

    /// noSuchObject exception - the OID is known but has no value.
    NoSuchObject,

    /// noSuchInstance exception - the specific instance does not exist.
    NoSuchInstance,

    /// endOfMibView exception - the walk ran off the end of the MIB.
    EndOfMibView,
}

impl Value {
    /// Try to get as i32. `Some` for [`Value::Integer`] only.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    ///
    /// `Some` for [`Value::Counter32`], [`Value::Gauge32`],
    /// [`Value::TimeTicks`], or a non-negative [`Value::Integer`].
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// Try to get as u64.
    ///
    /// `Some` for [`Value::Counter64`], any unsigned 32-bit type, or a
    /// non-negative [`Value::Integer`].
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v as u64),
            Value::Integer(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    /// Try to get as bytes. `Some` for [`Value::OctetString`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as a UTF-8 string slice.
    ///
    /// `Some` for an [`Value::OctetString`] holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Try to get as an OID. `Some` for [`Value::ObjectIdentifier`].
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as an IP address. `Some` for [`Value::IpAddress`].
    pub fn as_ip(&self) -> Option<[u8; 4]> {
        match self {
            Value::IpAddress(octets) => Some(*octets),
            _ => None,
        }
    }

    /// Check if this value is one of the v2 exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s.into_bytes()))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => {
                    for (i, byte) in b.iter().enumerate() {
                        if i > 0 {
                            write!(f, ":")?;
                        }
                        write!(f, "{:02x}", byte)?;
                    }
                    Ok(())
                }
            },
            Value::Null => write!(f, "Null"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(o) => write!(f, "{}.{}.{}.{}", o[0], o[1], o[2], o[3]),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn numeric_accessors() {
        assert_eq!(Value::Integer(42).as_i32(), Some(42));
        assert_eq!(Value::Counter32(42).as_i32(), None);
        assert_eq!(Value::Gauge32(7).as_u32(), Some(7));
        assert_eq!(Value::Integer(-1).as_u32(), None);
        assert_eq!(Value::Counter64(1 << 40).as_u64(), Some(1 << 40));
        assert_eq!(Value::TimeTicks(9).as_u64(), Some(9));
    }

    #[test]
    fn string_accessor_requires_utf8() {
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        let raw = Value::OctetString(Bytes::from_static(&[0xff, 0xfe]));
        assert_eq!(raw.as_str(), None);
        assert_eq!(raw.as_bytes(), Some(&[0xff, 0xfe][..]));
    }

    #[test]
    fn exception_markers() {
        assert!(Value::EndOfMibView.is_exception());
        assert!(Value::NoSuchInstance.is_exception());
        assert!(!Value::Null.is_exception());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::IpAddress([10, 0, 0, 1]).to_string(), "10.0.0.1");
        assert_eq!(
            Value::ObjectIdentifier(oid!(1, 3, 6)).to_string(),
            "1.3.6"
        );
        assert_eq!(
            Value::OctetString(Bytes::from_static(&[0xde, 0xad])).to_string(),
            "de:ad"
        );
    }
}
