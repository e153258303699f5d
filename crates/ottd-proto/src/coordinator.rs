//! The Coordinator family: server registration, public server listing, and
//! connect brokering (direct / STUN / TURN) between the game coordinator,
//! game servers, and game clients.

use ottd_wire::{Cursor, PacketBuilder, TcpMtu, SEND_TCP_MTU};

use crate::{
    consts::GAMESCRIPT_VERSION_NONE,
    error::SchemaError,
    family::Family,
    game_info::{encode_listing, GameInfo, ListingInfo},
    newgrf::NewGrfLookupTable,
};

/// Coordinator family packet type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketCoordinatorType {
    /// Coordinator reports an error to whichever peer triggered it.
    GcError = 0,
    /// A game server registers itself with the coordinator.
    ServerRegister = 1,
    /// Coordinator acknowledges a registration.
    GcRegisterAck = 2,
    /// A registered server pushes an updated `GameInfo`.
    ServerUpdate = 3,
    /// A client asks for the public server listing.
    ClientListing = 4,
    /// Coordinator answers with one listed server (repeated) then a terminator.
    GcListing = 5,
    /// A client asks to connect to a server by invite code.
    ClientConnect = 6,
    /// Coordinator tells the client a connection attempt is underway.
    GcConnecting = 7,
    /// Either peer reports that a connect attempt failed.
    SercliConnectFailed = 8,
    /// Coordinator relays a connect failure to the other peer.
    GcConnectFailed = 9,
    /// A peer confirms a direct/STUN/TURN connection completed.
    ClientConnected = 10,
    /// Coordinator instructs the client to dial the server directly.
    GcDirectConnect = 11,
    /// Coordinator asks a peer to begin a STUN attempt.
    GcStunRequest = 12,
    /// A peer reports the outcome of its STUN attempt.
    SercliStunResult = 13,
    /// Coordinator instructs a peer to connect via the other's STUN-punched address.
    GcStunConnect = 14,
    /// Coordinator answers a client's NewGRF lookup-table request.
    GcNewgrfLookup = 15,
    /// Coordinator instructs a peer to connect via a TURN relay.
    GcTurnConnect = 16,
}

/// One past the highest valid tag in the Coordinator family.
pub const END: u8 = 17;

/// Visibility a registered server advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerGameType {
    /// Not listed; reachable only by direct connection string.
    Local = 0,
    /// Listed in the public server listing.
    Public = 1,
    /// Not listed, but connectable by anyone holding the invite code.
    InviteOnly = 2,
}

impl ServerGameType {
    fn from_wire(value: u8) -> Result<Self, SchemaError> {
        match value {
            0 => Ok(Self::Local),
            1 => Ok(Self::Public),
            2 => Ok(Self::InviteOnly),
            _ => Err(SchemaError::invalid_data("invalid ServerGameType", u64::from(value))),
        }
    }
}

/// How a client ended up connected to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionType {
    /// Not yet known.
    Unknown = 0,
    /// Neither direct nor STUN/TURN reachable.
    Isolated = 1,
    /// Connected directly.
    Direct = 2,
    /// Connected via STUN hole punching.
    Stun = 3,
    /// Connected via a TURN relay.
    Turn = 4,
}

/// Coordinator-reported error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NetworkCoordinatorErrorType {
    /// Unclassified failure.
    Unknown = 0,
    /// Registration could not be completed.
    RegistrationFailed = 1,
    /// The invite code given does not exist.
    InvalidInviteCode = 2,
    /// The invite code is already registered to a different server.
    ReuseOfInviteCode = 3,
}

fn read_protocol_version(cursor: &mut Cursor, min: u8) -> Result<u8, SchemaError> {
    let protocol_version = cursor.read_u8()?;
    if protocol_version < min || protocol_version > 6 {
        return Err(SchemaError::invalid_data("unknown protocol version", u64::from(protocol_version)));
    }
    Ok(protocol_version)
}

/// A decoded Coordinator family message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorMessage {
    /// `SERVER_REGISTER`.
    ServerRegister {
        /// Negotiated protocol version, `1..=6`.
        protocol_version: u8,
        /// Requested visibility.
        game_type: ServerGameType,
        /// Port the server's game socket listens on.
        server_port: u16,
        /// Existing invite code to re-register under, if any (`protocol_version > 1`).
        invite_code: Option<String>,
        /// Secret paired with `invite_code`.
        invite_code_secret: Option<String>,
    },
    /// `SERVER_UPDATE`.
    ServerUpdate {
        /// Negotiated protocol version, `1..=6`.
        protocol_version: u8,
        /// The server's current `GameInfo`.
        game_info: GameInfo,
    },
    /// `CLIENT_LISTING`.
    ClientListing {
        /// Negotiated protocol version, `1..=6`.
        protocol_version: u8,
        /// `GameInfo` version the client wants listings rendered at.
        game_info_version: u8,
        /// Requesting client's OpenTTD version string.
        openttd_version: String,
        /// Highest NewGRF lookup-table index the client already knows, if any.
        newgrf_lookup_table_cursor: Option<u32>,
    },
    /// `CLIENT_CONNECT`.
    ClientConnect {
        /// Negotiated protocol version, `2..=6`.
        protocol_version: u8,
        /// Invite code of the server to connect to.
        invite_code: String,
    },
    /// `SERCLI_CONNECT_FAILED`.
    SercliConnectFailed {
        /// Negotiated protocol version, `2..=6`.
        protocol_version: u8,
        /// Connection attempt token.
        token: String,
        /// Which connect attempt (of potentially several) this refers to.
        tracking_number: u8,
    },
    /// `CLIENT_CONNECTED`.
    ClientConnected {
        /// Negotiated protocol version, `2..=6`.
        protocol_version: u8,
        /// Connection attempt token.
        token: String,
    },
    /// `SERCLI_STUN_RESULT`.
    SercliStunResult {
        /// Negotiated protocol version, `3..=6`.
        protocol_version: u8,
        /// Connection attempt token.
        token: String,
        /// Which local interface this STUN result is for.
        interface_number: u8,
        /// Whether the STUN attempt succeeded.
        result: u8,
    },
}

/// Zero-sized marker binding the Coordinator family's tag space to its decoder.
#[derive(Debug, Clone, Copy)]
pub struct Coordinator;

impl Family for Coordinator {
    type Message = CoordinatorMessage;
    const END: u8 = END;

    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError> {
        let mut cursor = Cursor::new(body);
        let message = match tag {
            t if t == PacketCoordinatorType::ServerRegister as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 1)?;
                let game_type = ServerGameType::from_wire(cursor.read_u8()?)?;
                let server_port = cursor.read_u16()?;
                let (invite_code, invite_code_secret) = if protocol_version > 1 {
                    (Some(cursor.read_string()?), Some(cursor.read_string()?))
                } else {
                    (None, None)
                };
                CoordinatorMessage::ServerRegister {
                    protocol_version,
                    game_type,
                    server_port,
                    invite_code,
                    invite_code_secret,
                }
            },
            t if t == PacketCoordinatorType::ServerUpdate as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 1)?;
                let game_info_version = cursor.read_u8()?;
                if !(1..=6).contains(&game_info_version) {
                    return Err(SchemaError::invalid_data(
                        "unknown game info version",
                        u64::from(game_info_version),
                    ));
                }
                let game_info = GameInfo::decode(&mut cursor, game_info_version)?;
                CoordinatorMessage::ServerUpdate { protocol_version, game_info }
            },
            t if t == PacketCoordinatorType::ClientListing as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 1)?;
                let game_info_version = cursor.read_u8()?;
                if !(1..=6).contains(&game_info_version) {
                    return Err(SchemaError::invalid_data(
                        "unknown game info version",
                        u64::from(game_info_version),
                    ));
                }
                let openttd_version = cursor.read_string()?;
                let newgrf_lookup_table_cursor =
                    if protocol_version >= 4 { Some(cursor.read_u32()?) } else { None };
                CoordinatorMessage::ClientListing {
                    protocol_version,
                    game_info_version,
                    openttd_version,
                    newgrf_lookup_table_cursor,
                }
            },
            t if t == PacketCoordinatorType::ClientConnect as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 2)?;
                let invite_code = cursor.read_string()?;
                CoordinatorMessage::ClientConnect { protocol_version, invite_code }
            },
            t if t == PacketCoordinatorType::SercliConnectFailed as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 2)?;
                let token = cursor.read_string()?;
                let tracking_number = cursor.read_u8()?;
                CoordinatorMessage::SercliConnectFailed { protocol_version, token, tracking_number }
            },
            t if t == PacketCoordinatorType::ClientConnected as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 2)?;
                let token = cursor.read_string()?;
                CoordinatorMessage::ClientConnected { protocol_version, token }
            },
            t if t == PacketCoordinatorType::SercliStunResult as u8 => {
                let protocol_version = read_protocol_version(&mut cursor, 3)?;
                let token = cursor.read_string()?;
                let interface_number = cursor.read_u8()?;
                let result = cursor.read_u8()?;
                CoordinatorMessage::SercliStunResult { protocol_version, token, interface_number, result }
            },
            _ => return Err(SchemaError::Packet(ottd_wire::PacketError::PacketInvalidType { tag })),
        };
        cursor.finish()?;
        Ok(message)
    }
}

/// Encode `GC_ERROR`.
///
/// `protocol_version < 6` peers never learned about
/// [`NetworkCoordinatorErrorType::ReuseOfInviteCode`]; it is downgraded to
/// [`NetworkCoordinatorErrorType::RegistrationFailed`] for them.
pub fn encode_gc_error(
    protocol_version: u8,
    error_no: NetworkCoordinatorErrorType,
    error_detail: &str,
) -> Result<Vec<u8>, SchemaError> {
    let error_no = if protocol_version < 6 && error_no == NetworkCoordinatorErrorType::ReuseOfInviteCode {
        NetworkCoordinatorErrorType::RegistrationFailed
    } else {
        error_no
    };

    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcError as u8);
    builder.write_u8(error_no as u8);
    builder.write_string(error_detail);
    Ok(builder.finish()?)
}

/// Encode `GC_REGISTER_ACK`.
pub fn encode_gc_register_ack(
    protocol_version: u8,
    connection_type: ConnectionType,
    invite_code: &str,
    invite_code_secret: &str,
) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcRegisterAck as u8);
    if protocol_version > 1 {
        builder.write_string(invite_code);
        builder.write_string(invite_code_secret);
    }
    builder.write_u8(connection_type as u8);
    Ok(builder.finish()?)
}

/// Encode the `GC_NEWGRF_LOOKUP` batch answering a client's lookup-table
/// request: every entry above `newgrf_lookup_table_cursor`, chunked so each
/// packet stays safely under `SEND_TCP_MTU` (entries are at most 104 bytes:
/// 4 + 4 + 16 + an 80-byte name).
///
/// Returns one packet per chunk; `newgrf_lookup_table` must be non-empty.
pub fn encode_gc_newgrf_lookup(
    newgrf_lookup_table_cursor: u32,
    newgrf_lookup_table: &NewGrfLookupTable,
) -> Result<Vec<Vec<u8>>, SchemaError> {
    let Some(&cursor) = newgrf_lookup_table.keys().max() else {
        return Ok(Vec::new());
    };

    let mut packets = Vec::new();
    let mut chunk_body = Vec::new();
    let mut chunk_count: u16 = 0;

    for (index, entry) in newgrf_lookup_table {
        if *index <= newgrf_lookup_table_cursor {
            continue;
        }
        chunk_count += 1;
        ottd_wire::write_u32(&mut chunk_body, *index);
        ottd_wire::write_u32(&mut chunk_body, entry.grfid);
        ottd_wire::write_bytes(&mut chunk_body, &entry.md5sum);
        ottd_wire::write_string(&mut chunk_body, entry.name.as_deref().unwrap_or("Unknown"));

        if chunk_body.len() > SEND_TCP_MTU - 200 {
            packets.push(build_newgrf_lookup_packet(cursor, chunk_count, &chunk_body)?);
            chunk_body.clear();
            chunk_count = 0;
        }
    }

    if chunk_count != 0 {
        packets.push(build_newgrf_lookup_packet(cursor, chunk_count, &chunk_body)?);
    }

    Ok(packets)
}

fn build_newgrf_lookup_packet(cursor: u32, count: u16, body: &[u8]) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcNewgrfLookup as u8);
    builder.write_u32(cursor);
    builder.write_u16(count);
    builder.write_bytes(body);
    Ok(builder.finish()?)
}

/// One server as carried in the `GC_LISTING` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingServer {
    /// Visibility; only [`ServerGameType::Public`] servers are listed.
    pub game_type: ServerGameType,
    /// Connection string clients dial (invite code or host:port).
    pub connection_string: String,
    /// The server's current info, or `None` if it hasn't reported one yet.
    pub info: Option<ListingInfo>,
    /// Lookup-table indices of the server's active NewGRFs.
    pub newgrfs_indexed: Vec<u32>,
}

/// Encode the `GC_LISTING` answer: one packet per eligible server (public
/// visibility, known info), followed by a zero-server terminator packet.
pub fn encode_gc_listing(
    game_info_version: u8,
    servers: &[ListingServer],
    lookup: &NewGrfLookupTable,
) -> Result<Vec<Vec<u8>>, SchemaError> {
    let mut packets = Vec::new();

    for server in servers {
        if server.game_type != ServerGameType::Public {
            continue;
        }
        let Some(info) = &server.info else { continue };

        let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcListing as u8);
        builder.write_u16(1);
        builder.write_string(&server.connection_string);
        builder.write_u8(game_info_version);

        let mut body = Vec::new();
        encode_listing(&mut body, info, game_info_version, &server.newgrfs_indexed, lookup);
        builder.write_bytes(&body);

        packets.push(builder.finish()?);
    }

    let mut terminator = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcListing as u8);
    terminator.write_u16(0);
    packets.push(terminator.finish()?);

    Ok(packets)
}

/// Encode `GC_CONNECTING`.
pub fn encode_gc_connecting(token: &str, invite_code: &str) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcConnecting as u8);
    builder.write_string(token);
    builder.write_string(invite_code);
    Ok(builder.finish()?)
}

/// Encode `GC_CONNECT_FAILED`.
pub fn encode_gc_connect_failed(token: &str) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcConnectFailed as u8);
    builder.write_string(token);
    Ok(builder.finish()?)
}

/// Encode `GC_DIRECT_CONNECT`.
pub fn encode_gc_direct_connect(
    token: &str,
    tracking_number: u8,
    hostname: &str,
    port: u16,
) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcDirectConnect as u8);
    builder.write_string(token);
    builder.write_u8(tracking_number);
    builder.write_string(hostname);
    builder.write_u16(port);
    Ok(builder.finish()?)
}

/// Encode `GC_STUN_REQUEST`.
pub fn encode_gc_stun_request(token: &str) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcStunRequest as u8);
    builder.write_string(token);
    Ok(builder.finish()?)
}

/// Encode `GC_STUN_CONNECT`.
pub fn encode_gc_stun_connect(
    token: &str,
    tracking_number: u8,
    interface_number: u8,
    hostname: &str,
    port: u16,
) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcStunConnect as u8);
    builder.write_string(token);
    builder.write_u8(tracking_number);
    builder.write_u8(interface_number);
    builder.write_string(hostname);
    builder.write_u16(port);
    Ok(builder.finish()?)
}

/// Encode `GC_TURN_CONNECT`.
pub fn encode_gc_turn_connect(
    token: &str,
    tracking_number: u8,
    ticket: &str,
    connection_string: &str,
) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<TcpMtu>::new(PacketCoordinatorType::GcTurnConnect as u8);
    builder.write_string(token);
    builder.write_u8(tracking_number);
    builder.write_string(ticket);
    builder.write_string(connection_string);
    Ok(builder.finish()?)
}

#[cfg(test)]
mod tests {
    use ottd_wire::write_u8;

    use super::*;
    use crate::game_info::CompanySlots;
    use crate::newgrf::NewGrfEntry;

    fn register_body(protocol_version: u8, with_invite: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        write_u8(&mut buf, protocol_version);
        write_u8(&mut buf, ServerGameType::Public as u8);
        ottd_wire::write_u16(&mut buf, 3979);
        if with_invite {
            ottd_wire::write_string(&mut buf, "+abc123");
            ottd_wire::write_string(&mut buf, "secret");
        }
        buf
    }

    #[test]
    fn server_register_v1_has_no_invite_code() {
        let body = register_body(1, false);
        let msg = Coordinator::decode(PacketCoordinatorType::ServerRegister as u8, &body).unwrap();
        match msg {
            CoordinatorMessage::ServerRegister { invite_code, invite_code_secret, server_port, .. } => {
                assert_eq!(invite_code, None);
                assert_eq!(invite_code_secret, None);
                assert_eq!(server_port, 3979);
            },
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn server_register_v2_has_invite_code() {
        let body = register_body(2, true);
        let msg = Coordinator::decode(PacketCoordinatorType::ServerRegister as u8, &body).unwrap();
        match msg {
            CoordinatorMessage::ServerRegister { invite_code, .. } => {
                assert_eq!(invite_code.as_deref(), Some("+abc123"));
            },
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_protocol_version_is_rejected() {
        let body = register_body(7, true);
        assert!(Coordinator::decode(PacketCoordinatorType::ServerRegister as u8, &body).is_err());
    }

    #[test]
    fn gc_error_downgrades_reuse_of_invite_code_below_v6() {
        let bytes =
            encode_gc_error(5, NetworkCoordinatorErrorType::ReuseOfInviteCode, "duplicate").unwrap();
        assert_eq!(bytes[3], NetworkCoordinatorErrorType::RegistrationFailed as u8);
    }

    #[test]
    fn gc_error_keeps_reuse_of_invite_code_at_v6() {
        let bytes =
            encode_gc_error(6, NetworkCoordinatorErrorType::ReuseOfInviteCode, "duplicate").unwrap();
        assert_eq!(bytes[3], NetworkCoordinatorErrorType::ReuseOfInviteCode as u8);
    }

    #[test]
    fn gc_listing_skips_non_public_and_infoless_servers() {
        let lookup = NewGrfLookupTable::new();
        let listing_info = ListingInfo {
            gamescript: None,
            game_date: 1000,
            start_date: 900,
            companies: CompanySlots { companies_max: 8, companies_on: 1, spectators_max: 4 },
            name: "server".to_string(),
            openttd_version: "14.0".to_string(),
            use_password: 0,
            clients_max: 8,
            clients_on: 1,
            spectators_on: 0,
            map_width: 256,
            map_height: 256,
            map_type: 1,
            is_dedicated: 1,
        };
        let servers = vec![
            ListingServer {
                game_type: ServerGameType::Local,
                connection_string: "local".to_string(),
                info: Some(listing_info.clone()),
                newgrfs_indexed: Vec::new(),
            },
            ListingServer {
                game_type: ServerGameType::Public,
                connection_string: "no-info".to_string(),
                info: None,
                newgrfs_indexed: Vec::new(),
            },
            ListingServer {
                game_type: ServerGameType::Public,
                connection_string: "public.example.com:3979".to_string(),
                info: Some(listing_info),
                newgrfs_indexed: Vec::new(),
            },
        ];

        let packets = encode_gc_listing(3, &servers, &lookup).unwrap();
        // one listed server + terminator
        assert_eq!(packets.len(), 2);
        assert_eq!(packets.last().unwrap(), &vec![5u8, 0, PacketCoordinatorType::GcListing as u8, 0, 0]);
    }

    #[test]
    fn gc_newgrf_lookup_chunks_and_reports_max_cursor() {
        let mut lookup = NewGrfLookupTable::new();
        lookup.insert(1, NewGrfEntry { grfid: 10, md5sum: [0; 16], name: Some("a".to_string()) });
        lookup.insert(2, NewGrfEntry { grfid: 20, md5sum: [0; 16], name: None });

        let packets = encode_gc_newgrf_lookup(0, &lookup).unwrap();
        assert_eq!(packets.len(), 1);

        let mut cursor = Cursor::new(&packets[0][3..]);
        assert_eq!(cursor.read_u32().unwrap(), 2);
        assert_eq!(cursor.read_u16().unwrap(), 2);
    }

    #[test]
    fn gc_newgrf_lookup_respects_cursor() {
        let mut lookup = NewGrfLookupTable::new();
        lookup.insert(1, NewGrfEntry { grfid: 10, md5sum: [0; 16], name: None });
        lookup.insert(2, NewGrfEntry { grfid: 20, md5sum: [0; 16], name: None });

        let packets = encode_gc_newgrf_lookup(1, &lookup).unwrap();
        let mut cursor = Cursor::new(&packets[0][3..]);
        cursor.read_u32().unwrap();
        assert_eq!(cursor.read_u16().unwrap(), 1);
    }

    #[test]
    fn gamescript_version_none_round_trips_through_constant() {
        assert_eq!(GAMESCRIPT_VERSION_NONE, 0xFFFF_FFFF);
    }
}
