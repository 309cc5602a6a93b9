//! The protocol-engine seam.
//!
//! Everything wire-level - message encoding, transport sockets, security -
//! lives behind the [`SnmpEngine`] trait. The crate only requires three
//! primitives from it: iterative subtree retrieval, row-scoped table
//! retrieval, and synchronous get/set.
//!
//! Retrieval is callback-driven: the engine delivers result batches to a
//! [`WalkEventSink`] from its own worker threads, and signals completion (or
//! failure) exactly once per retrieval via [`WalkEventSink::finished`].

mod mock;

pub use mock::{MockEngine, MockRetrieval};

use crate::oid::Oid;
use crate::varbind::VarBind;
use std::sync::Arc;

/// Faults reported by the protocol engine.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// Transport-level failure (socket error, unreachable host).
    #[error("I/O failure: {0}")]
    Io(String),

    /// The device answered with something the engine could not decode.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The device did not answer within the engine's request timeout.
    #[error("no response from device")]
    NoResponse,
}

/// Outcome of one subtree or table retrieval.
#[derive(Debug, Clone)]
pub enum RetrievalOutcome {
    /// The retrieval ran to completion (or was abandoned by the sink).
    Complete,
    /// The retrieval failed; no further events follow.
    Error(EngineError),
}

/// Receiver for retrieval results, invoked from engine worker threads.
pub trait WalkEventSink: Send + Sync {
    /// Deliver one batch of results.
    ///
    /// Returning `false` tells the engine to abandon further pagination for
    /// the in-flight retrieval; [`finished`](Self::finished) is still called
    /// afterwards.
    fn deliver(&self, batch: &[VarBind]) -> bool;

    /// Signal that the retrieval is over. Called exactly once, after the
    /// last `deliver`.
    fn finished(&self, outcome: RetrievalOutcome);
}

/// A row-scoped table retrieval request.
///
/// The engine fetches, for every OID in `columns`, the instances whose row
/// index lies in the range `(low_index, high_index]` - the lower bound is
/// exclusive, which is why callers decrement it when the wanted low row does
/// not end in zero.
#[derive(Debug, Clone)]
pub struct RowRangeRequest {
    /// Column OIDs to retrieve (table-entry OID + field subidentifier).
    pub columns: Vec<Oid>,
    /// Exclusive lower row-index bound; empty means "from the first row".
    pub low_index: Oid,
    /// Inclusive upper row-index bound.
    pub high_index: Oid,
    /// Per-request column cap; 0 means the engine's default.
    pub max_columns_per_request: u32,
    /// Per-request row cap; 0 means the engine's default.
    pub max_rows_per_request: u32,
}

/// Narrow contract onto the wire-level protocol engine.
///
/// Implementations are expected to drive retrieval from their own worker
/// threads and must tolerate a sink that keeps rejecting batches after a
/// caller-side timeout.
pub trait SnmpEngine: Send + Sync {
    /// Begin iterative bulk retrieval of all descendants of `start`.
    ///
    /// Results are delivered to `sink` in device order until the subtree is
    /// exhausted, the sink declines further batches, or the engine fails.
    fn walk_subtree(&self, start: &Oid, max_repetitions: u32, sink: Arc<dyn WalkEventSink>);

    /// Begin a row-scoped table retrieval.
    fn fetch_rows(&self, request: &RowRangeRequest, sink: Arc<dyn WalkEventSink>);

    /// Synchronously get the values of explicit OIDs.
    fn get(&self, oids: &[Oid]) -> Result<Vec<VarBind>, EngineError>;

    /// Synchronously set explicit variable bindings.
    fn set(&self, bindings: &[VarBind]) -> Result<(), EngineError>;
}
