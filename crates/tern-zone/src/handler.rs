//! UPDATE message handling.
//!
//! Turns a decoded (or raw) UPDATE request into a response, routing it to
//! the zone named in the zone section.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use tern_proto::header::{HEADER_SIZE, HeaderFlags};
use tern_proto::{Header, Message, OpCode, RecordType, ResponseCode};

use crate::tree::ZoneTree;
use crate::update::DynamicUpdate;

/// Answers RFC 2136 UPDATE requests for a set of zones.
#[derive(Debug, Clone)]
pub struct UpdateHandler {
    zones: Arc<ZoneTree>,
    update: DynamicUpdate,
}

impl UpdateHandler {
    /// Creates a handler for the zones in `zones`.
    pub fn new(zones: Arc<ZoneTree>) -> Self {
        Self {
            zones,
            update: DynamicUpdate::new(),
        }
    }

    /// Sets the update policy.
    pub fn with_update(mut self, update: DynamicUpdate) -> Self {
        self.update = update;
        self
    }

    /// Returns the zones this handler serves.
    pub fn zones(&self) -> &Arc<ZoneTree> {
        &self.zones
    }

    /// Handles a decoded request.
    pub async fn handle(&self, request: &Message) -> Message {
        let mut response = Message::response_from(request);
        response.set_rcode(self.process(request).await);
        response
    }

    async fn process(&self, request: &Message) -> ResponseCode {
        if request.opcode() != OpCode::Update {
            debug!(opcode = %request.opcode(), "not an UPDATE request");
            return ResponseCode::FormErr;
        }

        let Some(question) = request.question() else {
            debug!("UPDATE without a zone section");
            return ResponseCode::FormErr;
        };
        if question.qtype != RecordType::SOA {
            debug!(qtype = %question.qtype, "zone section type is not SOA");
            return ResponseCode::FormErr;
        }

        let origin = &question.qname;
        let zone = match self.zones.find_zone(origin) {
            Some(zone) if zone.origin() == origin => zone,
            Some(zone) => {
                debug!(zone = %origin, enclosing = %zone.origin(), "zone section is not a zone apex");
                return ResponseCode::NotAuth;
            }
            None => {
                debug!(zone = %origin, "no such zone");
                return ResponseCode::NotAuth;
            }
        };

        match self
            .update
            .process(zone.as_ref(), request.prerequisites(), request.updates())
            .await
        {
            Ok(code) => code,
            Err(e) => {
                warn!(zone = %origin, error = %e, "zone update failed");
                e.response_code()
            }
        }
    }

    /// Handles a request in wire format and returns the encoded response.
    ///
    /// Returns `None` when nothing should be sent back: the bytes were not a
    /// readable message, or they were a response rather than a request.
    pub async fn handle_wire(&self, data: &[u8]) -> Option<Bytes> {
        let request = match Message::decode(data) {
            Ok(request) => request,
            Err(e) if e.is_malformed() || data.len() < HEADER_SIZE => {
                trace!(error = %e, "dropping malformed message");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "rejecting unreadable request");
                return encode(&format_error(data));
            }
        };

        if request.is_response() {
            trace!(id = request.id(), "ignoring response");
            return None;
        }

        encode(&self.handle(&request).await)
    }
}

/// Builds a FORMERR reply from the raw header of a request.
fn format_error(data: &[u8]) -> Message {
    let mut header = Header::new(u16::from_be_bytes([data[0], data[1]]));
    header.opcode = OpCode::from_u8(data[2] >> 3);
    header.rcode = ResponseCode::FormErr;
    header.set_flag(HeaderFlags::QR, true);
    Message::new(header)
}

fn encode(response: &Message) -> Option<Bytes> {
    match response.to_wire() {
        Ok(wire) => Some(wire),
        Err(e) => {
            warn!(error = %e, id = response.id(), "failed to encode response");
            None
        }
    }
}
