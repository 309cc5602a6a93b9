//! Inbound notification dispatch.

use crate::notify::mapper::SourceMapper;
use crate::varbind::VarBind;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// The payload kind of a received notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    /// An unconfirmed notification.
    Trap,
    /// A confirmed notification (the transport answers it).
    Inform,
    /// The legacy v1-style trap equivalent.
    LegacyTrap,
    /// Anything else the transport decoded; dropped with a warning.
    Unsupported(u8),
}

/// A raw received notification: originating address plus opaque payload.
#[derive(Debug, Clone)]
pub struct ReceivedTrap {
    /// The address the notification arrived from.
    pub source: String,
    /// The payload kind.
    pub kind: TrapKind,
    /// The payload's variable bindings.
    pub varbinds: Vec<VarBind>,
}

/// Consumer of accepted notifications.
pub trait TrapHandler: Send + Sync {
    /// Handle one notification. `source` has already been through the
    /// configured address remapping; `received_at` is stamped on receipt.
    fn handle(&self, received_at: SystemTime, source: &str, trap: &ReceivedTrap);
}

/// Routes received notifications to a handler after source remapping.
pub struct TrapDispatcher {
    mapper: Box<dyn SourceMapper>,
    handler: Arc<dyn TrapHandler>,
}

impl TrapDispatcher {
    /// Create a dispatcher with the given address mapper and handler.
    pub fn new(mapper: Box<dyn SourceMapper>, handler: Arc<dyn TrapHandler>) -> Self {
        Self { mapper, handler }
    }

    /// Dispatch one received notification.
    ///
    /// Only trap, inform, and legacy-trap payloads are accepted; anything
    /// else is logged and dropped. Returns whether the notification reached
    /// the handler.
    pub fn dispatch(&self, trap: &ReceivedTrap) -> bool {
        let received_at = SystemTime::now();
        let resolved = self.mapper.map_address(&trap.source);

        match trap.kind {
            TrapKind::Trap | TrapKind::Inform | TrapKind::LegacyTrap => {
                debug!(source = %trap.source, resolved = %resolved, "notification received");
                self.handler.handle(received_at, &resolved, trap);
                true
            }
            TrapKind::Unsupported(kind) => {
                warn!(source = %trap.source, kind, "unsupported PDU, dropping");
                false
            }
        }
    }
}
