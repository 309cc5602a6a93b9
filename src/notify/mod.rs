//! Notification dispatch.
//!
//! Outbound: [`build_payload`] assembles an ordered trap payload from a
//! notification entity's schema, and [`TrapSender`] fans it out to the
//! configured recipients. Inbound: [`TrapDispatcher`] remaps the source
//! address of a received event and hands accepted payload kinds to a
//! registered handler. The actual wire send/receive is the transport
//! collaborator's job.

mod dispatch;
mod mapper;
mod payload;
mod sender;

pub use dispatch::{ReceivedTrap, TrapDispatcher, TrapHandler, TrapKind};
pub use mapper::{IdentityMapper, RoundRobinMapper, SourceMapper};
pub use payload::{build_payload, oids, NotificationOidLookup};
pub use sender::{TrapRecipient, TrapSender, TrapTransport};
