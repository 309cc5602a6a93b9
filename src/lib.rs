//! # mibgraph
//!
//! Schema-driven device modelling over an SNMP-style management protocol.
//!
//! This crate walks a remote device's exposed OID tree and maps the returned
//! values onto a typed object graph, using per-type schema descriptions to
//! decide which entity owns each value. It also shapes outbound notification
//! payloads and dispatches inbound ones. The wire protocol itself (message
//! encoding, transport, security) is *not* implemented here: the crate talks
//! to it through the narrow [`SnmpEngine`] trait.
//!
//! ## Building blocks
//!
//! - [`EntityDescription`] / [`FieldDescriptor`] - static per-type schema.
//! - [`DeviceEntity`] - the dynamic field-access contract implemented by
//!   concrete entity types.
//! - [`EntityRegistry`] - maps OIDs to entity types and computes the
//!   discovery OID set for a full walk.
//! - [`NetworkDevice`] - turns a stream of `(oid, value)` results into a
//!   populated [`RootEntity`] graph.
//! - [`SnmpSession`] - drives full-tree and row-targeted walks against a
//!   device, coordinating the engine's callback thread with the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mibgraph::{NetworkDevice, SessionConfig, SnmpSession};
//! # fn registry() -> Arc<mibgraph::EntityRegistry> { unimplemented!() }
//! # fn engine() -> Arc<mibgraph::engine::MockEngine> { unimplemented!() }
//!
//! let registry = registry();
//! let session = SnmpSession::new(engine(), SessionConfig::default(), "192.168.1.1");
//! let device = Arc::new(NetworkDevice::new(registry.clone(), "192.168.1.1"));
//!
//! let response = session.walk_device(device.clone(), registry.discovery_oids());
//! if response.is_success() {
//!     println!("walked {} objects", response.object_count());
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod oid;
pub mod session;
pub mod value;
pub mod varbind;

// Re-exports for convenience
pub use config::SessionConfig;
pub use engine::{EngineError, RetrievalOutcome, RowRangeRequest, SnmpEngine, WalkEventSink};
pub use error::{Error, Result};
pub use model::{
    DeviceEntity, EntityDescription, EntityKind, EntityRegistry, EntityType, FieldDescriptor,
    FieldType, FieldValue, NetworkDevice, RootEntity, TableAccess, TableEntity,
};
pub use notify::{
    NotificationOidLookup, ReceivedTrap, RoundRobinMapper, SourceMapper, TrapDispatcher,
    TrapHandler, TrapKind, TrapRecipient, TrapSender, TrapTransport,
};
pub use oid::Oid;
pub use session::{
    SnmpSession, TableRowSelection, VariableBindingHandler, WalkError, WalkResponse,
};
pub use value::Value;
pub use varbind::VarBind;
