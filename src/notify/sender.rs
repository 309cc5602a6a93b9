//! Outbound notification fan-out.

use crate::engine::EngineError;
use crate::error::Result;
use crate::model::DeviceEntity;
use crate::notify::payload::{build_payload, NotificationOidLookup};
use crate::varbind::VarBind;
use tracing::{trace, warn};

/// One notification recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapRecipient {
    /// Destination address.
    pub ip_address: String,
    /// Destination port.
    pub port: u16,
    /// Community credential to send with.
    pub community: String,
}

/// The wire-level send collaborator.
///
/// mibgraph shapes the payload; actually putting it on the network is the
/// transport's job.
pub trait TrapTransport {
    /// Send one assembled payload to one recipient.
    fn send_to(&self, recipient: &TrapRecipient, payload: &[VarBind]) -> std::result::Result<(), EngineError>;
}

/// Sends notification payloads to a list of recipients.
pub struct TrapSender<T: TrapTransport> {
    transport: T,
}

impl<T: TrapTransport> TrapSender<T> {
    /// Create a sender over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Build the payload for `notification` once and send it to every
    /// recipient.
    ///
    /// Per-recipient transport failures are logged and do not abort the
    /// remaining sends. Returns the number of successful deliveries; schema
    /// faults while building the payload fail the whole call.
    pub fn send(
        &self,
        notification: &dyn DeviceEntity,
        lookup: &dyn NotificationOidLookup,
        recipients: &[TrapRecipient],
    ) -> Result<usize> {
        let payload = build_payload(notification, lookup)?;

        let mut delivered = 0;
        for recipient in recipients {
            trace!(recipient = %recipient.ip_address, port = recipient.port, "sending trap");
            match self.transport.send_to(recipient, &payload) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        recipient = %recipient.ip_address,
                        port = recipient.port,
                        error = %e,
                        "failed to send trap"
                    );
                }
            }
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EntityDescription, FieldDescriptor, FieldType, FieldValue, ListenerSet,
    };
    use crate::oid::Oid;
    use crate::{oid, Error};
    use std::cell::RefCell;
    use std::sync::LazyLock;

    static EVENT_DESC: LazyLock<EntityDescription> = LazyLock::new(|| {
        EntityDescription::with_fields(
            oid!(1, 3, 6, 1, 4, 1, 99, 7),
            [FieldDescriptor::new(1, "reason", FieldType::DisplayString)],
        )
    });

    struct Event {
        reason: Option<String>,
        listeners: ListenerSet,
    }

    impl DeviceEntity for Event {
        fn description(&self) -> &'static EntityDescription {
            &EVENT_DESC
        }

        fn type_name(&self) -> &'static str {
            "Event"
        }

        fn get(&self, field: &str) -> Result<Option<FieldValue>> {
            match field {
                "reason" => Ok(self.reason.clone().map(FieldValue::Text)),
                _ => Err(Error::unknown_field("Event", field)),
            }
        }

        fn set(&mut self, _field: &str, _value: FieldValue) -> Result<()> {
            unimplemented!("not needed for sending")
        }

        fn apply(&mut self, binding: &VarBind) -> Result<()> {
            Err(crate::model::unmapped_binding(self, binding))
        }

        fn listeners(&self) -> &ListenerSet {
            &self.listeners
        }

        fn listeners_mut(&mut self) -> &mut ListenerSet {
            &mut self.listeners
        }
    }

    struct FlakyTransport {
        fail_for: String,
        sent: RefCell<Vec<TrapRecipient>>,
    }

    impl TrapTransport for FlakyTransport {
        fn send_to(
            &self,
            recipient: &TrapRecipient,
            _payload: &[VarBind],
        ) -> std::result::Result<(), EngineError> {
            if recipient.ip_address == self.fail_for {
                return Err(EngineError::Io("host unreachable".into()));
            }
            self.sent.borrow_mut().push(recipient.clone());
            Ok(())
        }
    }

    fn lookup(field: &FieldDescriptor) -> Oid {
        EVENT_DESC.oid().child(field.id()).child(0)
    }

    fn recipient(address: &str) -> TrapRecipient {
        TrapRecipient {
            ip_address: address.into(),
            port: 162,
            community: "public".into(),
        }
    }

    #[test]
    fn one_recipient_failing_does_not_abort_the_rest() {
        let sender = TrapSender::new(FlakyTransport {
            fail_for: "10.0.0.2".into(),
            sent: RefCell::new(Vec::new()),
        });
        let event = Event {
            reason: Some("link down".into()),
            listeners: ListenerSet::new(),
        };

        let delivered = sender
            .send(
                &event,
                &lookup,
                &[
                    recipient("10.0.0.1"),
                    recipient("10.0.0.2"),
                    recipient("10.0.0.3"),
                ],
            )
            .unwrap();

        assert_eq!(delivered, 2);
        let sent = sender.transport.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].ip_address, "10.0.0.1");
        assert_eq!(sent[1].ip_address, "10.0.0.3");
    }

    #[test]
    fn payload_is_built_once_with_type_identifier() {
        struct Capture(RefCell<Vec<Vec<VarBind>>>);
        impl TrapTransport for Capture {
            fn send_to(
                &self,
                _recipient: &TrapRecipient,
                payload: &[VarBind],
            ) -> std::result::Result<(), EngineError> {
                self.0.borrow_mut().push(payload.to_vec());
                Ok(())
            }
        }

        let sender = TrapSender::new(Capture(RefCell::new(Vec::new())));
        let event = Event {
            reason: Some("link down".into()),
            listeners: ListenerSet::new(),
        };

        sender
            .send(&event, &lookup, &[recipient("10.0.0.1"), recipient("10.0.0.2")])
            .unwrap();

        let captured = sender.transport.0.borrow();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], captured[1]);
        assert_eq!(captured[0][0].oid, crate::notify::oids::snmp_trap_oid());
    }
}
