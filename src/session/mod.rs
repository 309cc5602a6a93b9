//! Session-level walk orchestration.
//!
//! An [`SnmpSession`] drives retrieval operations against one device through
//! the protocol engine: a schema-driven full-tree walk
//! ([`walk_device`](SnmpSession::walk_device)), a row-targeted table
//! retrieval ([`get_table_rows`](SnmpSession::get_table_rows)), and the
//! synchronous single-value operations the device-identity probe needs.
//!
//! Walk results come back as a [`WalkResponse`] rather than a `Result`: a
//! failed walk is a routine outcome in device polling and must not unwind
//! the caller's loop. No retries happen at this layer - retry policy, if
//! any, belongs to the engine or the caller.

mod tables;
mod walk;

pub use tables::TableRowSelection;

use crate::config::SessionConfig;
use crate::engine::{EngineError, SnmpEngine};
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::varbind::VarBind;
use crate::{oid, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Ingestion contract for walk results.
///
/// Implemented by [`NetworkDevice`](crate::model::NetworkDevice); the walk
/// orchestrator forwards every retrieved binding here and treats a `false`
/// return as "outside the requested branch".
pub trait VariableBindingHandler: Send + Sync {
    /// Ingest one binding; `true` if it was accepted into the model.
    fn add_variable(&self, binding: &VarBind) -> bool;
}

/// Why a walk did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WalkError {
    /// The foreground wait exceeded the configured walk timeout.
    #[error("walk timed out")]
    Timeout,

    /// The walk ended without the background side recording a result.
    #[error("walk interrupted")]
    Interrupted,

    /// The request named nothing to retrieve.
    #[error("nothing to retrieve")]
    NothingToRetrieve,

    /// The protocol engine reported a transport or response fault.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The result of a walk or table retrieval.
#[derive(Debug, Clone)]
pub struct WalkResponse {
    success: bool,
    error: Option<WalkError>,
    request_count: u64,
    object_count: u64,
    walk_time: Duration,
}

impl WalkResponse {
    pub(crate) fn completed(request_count: u64, object_count: u64, walk_time: Duration) -> Self {
        Self {
            success: true,
            error: None,
            request_count,
            object_count,
            walk_time,
        }
    }

    pub(crate) fn failed(error: WalkError) -> Self {
        Self {
            success: false,
            error: Some(error),
            request_count: 0,
            object_count: 0,
            walk_time: Duration::ZERO,
        }
    }

    /// Whether the walk ran to completion.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The failure detail, when not successful.
    pub fn error(&self) -> Option<&WalkError> {
        self.error.as_ref()
    }

    /// Number of discrete requests the engine issued.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Number of objects received.
    pub fn object_count(&self) -> u64 {
        self.object_count
    }

    /// Elapsed wall-clock time of the walk.
    pub fn walk_time(&self) -> Duration {
        self.walk_time
    }
}

impl std::fmt::Display for WalkResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(f, "success")
        } else {
            match &self.error {
                Some(e) => write!(f, "failed: {}", e),
                None => write!(f, "failed"),
            }
        }
    }
}

/// sysObjectID.0 - the mandatory device-identity probe target.
pub(crate) fn system_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}

/// A device-scoped session over a protocol engine.
pub struct SnmpSession<E: SnmpEngine> {
    engine: Arc<E>,
    config: SessionConfig,
    address: String,
}

impl<E: SnmpEngine + 'static> SnmpSession<E> {
    /// Create a session for the device at `address`.
    pub fn new(engine: Arc<E>, config: SessionConfig, address: impl Into<String>) -> Self {
        Self {
            engine,
            config,
            address: address.into(),
        }
    }

    /// The device address this session talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Probe the device's identity (sysObjectID).
    ///
    /// This is the mandatory first contact with a device; a missing or
    /// failed response is surfaced as
    /// [`Error::DeviceIdentification`].
    pub fn identify_device(&self) -> Result<String> {
        debug!(device = %self.address, "identify device");
        let bindings = self
            .engine
            .get(&[system_object_id()])
            .map_err(|source| Error::DeviceIdentification {
                address: self.address.clone(),
                source,
            })?;
        match bindings.first() {
            Some(vb) if !vb.value.is_exception() && vb.value != Value::Null => {
                Ok(vb.value.to_string())
            }
            _ => Err(Error::DeviceIdentification {
                address: self.address.clone(),
                source: EngineError::NoResponse,
            }),
        }
    }

    /// Get a single variable's value as a string.
    ///
    /// Engine faults are absorbed with a debug log - an unanswered poll is
    /// not an error at this level.
    pub fn get_variable(&self, oid: &Oid) -> Option<String> {
        match self.engine.get(std::slice::from_ref(oid)) {
            Ok(bindings) => bindings
                .into_iter()
                .next()
                .filter(|vb| !vb.value.is_exception() && vb.value != Value::Null)
                .map(|vb| vb.value.to_string()),
            Err(e) => {
                debug!(oid = %oid, error = %e, "ignoring engine fault on get");
                None
            }
        }
    }

    /// Get a single variable's value as an unsigned integer.
    pub fn get_variable_as_u32(&self, oid: &Oid) -> Option<u32> {
        match self.engine.get(std::slice::from_ref(oid)) {
            Ok(bindings) => bindings.first().and_then(|vb| vb.value.as_u32()),
            Err(e) => {
                debug!(oid = %oid, error = %e, "ignoring engine fault on get");
                None
            }
        }
    }

    /// Set explicit variable bindings on the device.
    pub fn set_variables(&self, bindings: &[VarBind]) -> std::result::Result<(), EngineError> {
        debug!(device = %self.address, count = bindings.len(), "set variables");
        self.engine.set(bindings)
    }
}
