//! The Game family: the subset of OpenTTD's direct client<->server protocol
//! this codec cares about — server identity exchange and shutdown
//! notification. The full game protocol (tags 0-5, 8-43) carries gameplay
//! traffic and is out of scope; only the tags below have decoders/encoders.

use ottd_wire::{Cursor, PacketBuilder, TcpMtu};

use crate::{error::SchemaError, family::Family, game_info::GameInfo};

/// Game family packet type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketGameType {
    /// Server's game-info block, in reply to `CLIENT_GAME_INFO`.
    ServerGameInfo = 6,
    /// Client's request for the server's game-info block (empty body).
    ClientGameInfo = 7,
    /// Server is shutting down (empty body).
    ServerShutdown = 40,
}

/// One past the highest valid tag in the Game family.
pub const END: u8 = 44;

/// A decoded Game family message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMessage {
    /// `SERVER_GAME_INFO`.
    ServerGameInfo(GameInfo),
    /// `SERVER_SHUTDOWN`.
    ServerShutdown,
}

/// Zero-sized marker binding the Game family's tag space to its decoder.
#[derive(Debug, Clone, Copy)]
pub struct Game;

impl Family for Game {
    type Message = GameMessage;
    const END: u8 = END;

    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError> {
        match tag {
            t if t == PacketGameType::ServerGameInfo as u8 => {
                let mut cursor = Cursor::new(body);
                let game_info_version = cursor.read_u8()?;
                if !(1..=6).contains(&game_info_version) {
                    return Err(SchemaError::invalid_data(
                        "unknown game info version",
                        u64::from(game_info_version),
                    ));
                }
                let info = GameInfo::decode(&mut cursor, game_info_version)?;
                cursor.finish()?;
                Ok(GameMessage::ServerGameInfo(info))
            },
            t if t == PacketGameType::ServerShutdown as u8 => {
                let cursor = Cursor::new(body);
                cursor.finish()?;
                Ok(GameMessage::ServerShutdown)
            },
            _ => Err(SchemaError::Packet(ottd_wire::PacketError::PacketInvalidType { tag })),
        }
    }
}

/// Encode `CLIENT_GAME_INFO`: an empty-body request for the server's game info.
pub fn encode_client_game_info() -> Result<Vec<u8>, SchemaError> {
    let builder = PacketBuilder::<TcpMtu>::new(PacketGameType::ClientGameInfo as u8);
    Ok(builder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_game_info_is_empty_body() {
        let bytes = encode_client_game_info().unwrap();
        assert_eq!(bytes, vec![3, 0, PacketGameType::ClientGameInfo as u8]);
    }

    #[test]
    fn server_shutdown_decodes_with_no_fields() {
        let msg = Game::decode(PacketGameType::ServerShutdown as u8, &[]).unwrap();
        assert_eq!(msg, GameMessage::ServerShutdown);
    }

    #[test]
    fn server_shutdown_rejects_trailing_bytes() {
        assert!(Game::decode(PacketGameType::ServerShutdown as u8, &[1]).is_err());
    }

    #[test]
    fn unknown_tag_is_invalid_type() {
        assert!(Game::decode(43, &[]).is_err());
    }
}
