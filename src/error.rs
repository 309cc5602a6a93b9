//! Error types for mibgraph.
//!
//! Two error vocabularies live here:
//!
//! - [`Error`] - faults surfaced to callers of the model layer: schema
//!   misuse (unknown field, rejected access), bad OID input, and the
//!   device-identification probe failure.
//! - [`EngineError`] (re-exported from [`crate::engine`]) - faults reported
//!   by the external protocol engine across the [`SnmpEngine`] seam.
//!
//! Walk failures are deliberately *not* represented as `Error`: a failed walk
//! is a routine outcome in device polling, so walk operations return a
//! [`WalkResponse`](crate::session::WalkResponse) carrying a
//! [`WalkError`](crate::session::WalkError) instead of unwinding the caller.
//!
//! [`SnmpEngine`]: crate::engine::SnmpEngine

pub use crate::engine::EngineError;

/// Result type alias using the library's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for model-layer operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller referenced a field name absent from the entity's schema.
    #[error("unknown field `{field}` on entity type {entity}")]
    UnknownField {
        /// Type name of the offending entity.
        entity: &'static str,
        /// The field name that was requested.
        field: String,
    },

    /// The field exists but the bound accessor rejected the operation
    /// (wrong value shape, or a fault raised while applying it).
    #[error("field access failed for `{field}` on entity type {entity}: {message}")]
    FieldAccess {
        entity: &'static str,
        field: String,
        message: String,
    },

    /// An OID string could not be parsed.
    #[error("invalid OID: {input}")]
    InvalidOid {
        /// The input that failed to parse.
        input: Box<str>,
    },

    /// The entity cannot accept the supplied variable binding.
    ///
    /// Raised by [`DeviceEntity::apply`](crate::model::DeviceEntity::apply)
    /// when a binding's path does not resolve to any field of the entity.
    #[error("entity type {entity} has no field for binding {oid}")]
    UnmappedBinding {
        entity: &'static str,
        oid: crate::oid::Oid,
    },

    /// The mandatory device-identity probe failed or returned no response.
    #[error("failed to identify device {address}: {source}")]
    DeviceIdentification {
        address: String,
        #[source]
        source: EngineError,
    },
}

impl Error {
    /// Create an unknown-field error.
    pub fn unknown_field(entity: &'static str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity,
            field: field.into(),
        }
    }

    /// Create a field-access error.
    pub fn field_access(
        entity: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FieldAccess {
            entity,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-OID error from the offending input.
    pub fn invalid_oid(input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            input: input.into(),
        }
    }
}
