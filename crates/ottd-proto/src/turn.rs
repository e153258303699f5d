//! The TURN family: relays a client to a TURN server once the coordinator
//! decides direct and STUN connections both failed.

use ottd_wire::{Cursor, PacketBuilder, TcpMtu};

use crate::{error::SchemaError, family::Family};

/// TURN family packet type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketTurnType {
    /// The TURN server reports an error (never decoded or encoded here; no
    /// peer in this codec's scope originates or consumes it).
    TurnError = 0,
    /// A client announces itself to the TURN server with its ticket.
    SercliConnect = 1,
    /// The TURN server confirms the relay is ready and gives its hostname.
    TurnConnected = 2,
}

/// One past the highest valid tag in the TURN family.
pub const END: u8 = 3;

/// A decoded TURN family message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnMessage {
    /// `SERCLI_CONNECT`.
    SercliConnect {
        /// Negotiated protocol version, `5..=6`.
        protocol_version: u8,
        /// Ticket issued by the coordinator for this relay attempt.
        ticket: String,
    },
}

/// Zero-sized marker binding the TURN family's tag space to its decoder.
#[derive(Debug, Clone, Copy)]
pub struct Turn;

impl Family for Turn {
    type Message = TurnMessage;
    const END: u8 = END;

    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError> {
        let mut cursor = Cursor::new(body);
        let message = match tag {
            t if t == PacketTurnType::SercliConnect as u8 => {
                let protocol_version = cursor.read_u8()?;
                if !(5..=6).contains(&protocol_version) {
                    return Err(SchemaError::invalid_data(
                        "unknown protocol version",
                        u64::from(protocol_version),
                    ));
                }
                let ticket = cursor.read_string()?;
                TurnMessage::SercliConnect { protocol_version, ticket }
            },
            _ => return Err(SchemaError::Packet(ottd_wire::PacketError::PacketInvalidType { tag })),
        };
        cursor.finish()?;
        Ok(message)
    }
}

/// Encode `TURN_CONNECTED`.
pub fn encode_turn_connected(hostname: &str) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketTurnType::TurnConnected as u8);
    builder.write_string(hostname);
    Ok(builder.finish()?)
}
