//! The Content (BaNaNaS) family: listing and transferring optional game
//! assets (NewGRFs, AIs, scenarios, heightmaps, sounds, music, gamescripts
//! and their libraries).

use std::io::Read;

use ottd_wire::{CompatMtu, Cursor, PacketBuilder, SEND_TCP_COMPAT_MTU};

use crate::{error::SchemaError, family::Family};

/// Content family packet type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketContentType {
    /// Client requests info for all content of a given type.
    ClientInfoList = 0,
    /// Client requests info by internal content id.
    ClientInfoId = 1,
    /// Client requests info by external (type, unique_id) pair.
    ClientInfoExtId = 2,
    /// As `ClientInfoExtId`, plus an md5sum to disambiguate.
    ClientInfoExtIdMd5 = 3,
    /// Server's answer: full metadata for one piece of content.
    ServerInfo = 4,
    /// Client requests the content itself by internal content id.
    ClientContent = 5,
    /// Server's answer: metadata packet followed by data packets and a
    /// zero-body terminator.
    ServerContent = 6,
}

/// One past the highest valid tag in the Content family.
pub const END: u8 = 7;

/// Kinds of distributable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentType {
    /// Base graphics set.
    BaseGraphics = 1,
    /// A NewGRF mod.
    NewGrf = 2,
    /// An AI script.
    Ai = 3,
    /// An AI script library.
    AiLibrary = 4,
    /// A scenario.
    Scenario = 5,
    /// A heightmap.
    Heightmap = 6,
    /// Base sound set.
    BaseSounds = 7,
    /// Base music set.
    BaseMusic = 8,
    /// A gamescript.
    Game = 9,
    /// A gamescript library.
    GameLibrary = 10,
}

impl ContentType {
    fn from_wire(value: u8) -> Result<Self, SchemaError> {
        match value {
            1 => Ok(Self::BaseGraphics),
            2 => Ok(Self::NewGrf),
            3 => Ok(Self::Ai),
            4 => Ok(Self::AiLibrary),
            5 => Ok(Self::Scenario),
            6 => Ok(Self::Heightmap),
            7 => Ok(Self::BaseSounds),
            8 => Ok(Self::BaseMusic),
            9 => Ok(Self::Game),
            10 => Ok(Self::GameLibrary),
            _ => Err(SchemaError::invalid_data("invalid ContentType", u64::from(value))),
        }
    }

    /// Whether this content type's `unique_id` is stored byte-swapped (see
    /// [`read_unique_id`]/[`write_unique_id`]).
    fn is_byte_swapped(self) -> bool {
        matches!(self, Self::NewGrf | Self::Scenario | Self::Heightmap)
    }
}

/// Read a content-family `unique_id`.
///
/// For [`ContentType::NewGrf`], [`ContentType::Scenario`] and
/// [`ContentType::Heightmap`] the 4-byte identifier is conveyed as a
/// little-endian `uint32` representing a big-endian-ordered value (an
/// OpenTTD client quirk); this re-serializes it big-endian. Every other
/// content type passes the 4 bytes through little-endian, unchanged.
fn read_unique_id(cursor: &mut Cursor, content_type: ContentType) -> Result<[u8; 4], SchemaError> {
    let raw = cursor.read_u32()?;
    Ok(if content_type.is_byte_swapped() { raw.to_be_bytes() } else { raw.to_le_bytes() })
}

/// Write a content-family `unique_id`, the encode-side counterpart of
/// [`read_unique_id`].
fn write_unique_id(buf: &mut Vec<u8>, content_type: ContentType, unique_id: [u8; 4]) {
    let value =
        if content_type.is_byte_swapped() { u32::from_be_bytes(unique_id) } else { u32::from_le_bytes(unique_id) };
    ottd_wire::write_u32(buf, value);
}

/// One content item as referenced by a client request or described by a
/// server answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentInfo {
    /// Internal content id, present on `ClientInfoId`/`ClientContent` requests.
    pub content_id: Option<u32>,
    /// External content type, present on `ClientInfoExtId*` requests.
    pub content_type: Option<ContentType>,
    /// External unique identifier, present alongside `content_type`.
    pub unique_id: Option<[u8; 4]>,
    /// MD5 checksum, present on `ClientInfoExtIdMd5` requests.
    pub md5sum: Option<[u8; 16]>,
}

struct InfoShape {
    has_content_id: bool,
    has_content_type_and_unique_id: bool,
    has_md5sum: bool,
}

fn read_content_infos(cursor: &mut Cursor, count: usize, shape: &InfoShape) -> Result<Vec<ContentInfo>, SchemaError> {
    let mut infos = Vec::with_capacity(count);
    for _ in 0..count {
        let mut info = ContentInfo::default();

        if shape.has_content_id {
            info.content_id = Some(cursor.read_u32()?);
        }

        if shape.has_content_type_and_unique_id {
            let content_type = ContentType::from_wire(cursor.read_u8()?)?;
            let unique_id = read_unique_id(cursor, content_type)?;
            info.content_type = Some(content_type);
            info.unique_id = Some(unique_id);
        }

        if shape.has_md5sum {
            info.md5sum = Some(cursor.read_array::<16>()?);
        }

        infos.push(info);
    }
    Ok(infos)
}

/// A decoded Content family message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMessage {
    /// `CLIENT_INFO_LIST`.
    ClientInfoList {
        /// Content type the client wants a listing of.
        content_type: ContentType,
        /// Requesting client's OpenTTD version.
        openttd_version: u32,
    },
    /// `CLIENT_INFO_ID`.
    ClientInfoId {
        /// Requested content, identified by internal id.
        content_infos: Vec<ContentInfo>,
    },
    /// `CLIENT_INFO_EXTID`.
    ClientInfoExtId {
        /// Requested content, identified by (type, unique_id).
        content_infos: Vec<ContentInfo>,
    },
    /// `CLIENT_INFO_EXTID_MD5`.
    ClientInfoExtIdMd5 {
        /// Requested content, identified by (type, unique_id, md5sum).
        content_infos: Vec<ContentInfo>,
    },
    /// `CLIENT_CONTENT`.
    ClientContent {
        /// Requested content, identified by internal id.
        content_infos: Vec<ContentInfo>,
    },
}

/// Zero-sized marker binding the Content family's tag space to its decoder.
#[derive(Debug, Clone, Copy)]
pub struct Content;

impl Family for Content {
    type Message = ContentMessage;
    const END: u8 = END;

    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError> {
        let mut cursor = Cursor::new(body);
        let message = match tag {
            t if t == PacketContentType::ClientInfoList as u8 => {
                let content_type = ContentType::from_wire(cursor.read_u8()?)?;
                let openttd_version = cursor.read_u32()?;
                ContentMessage::ClientInfoList { content_type, openttd_version }
            },
            t if t == PacketContentType::ClientInfoId as u8 => {
                let count = cursor.read_u16()?;
                let shape = InfoShape { has_content_id: true, has_content_type_and_unique_id: false, has_md5sum: false };
                ContentMessage::ClientInfoId {
                    content_infos: read_content_infos(&mut cursor, count as usize, &shape)?,
                }
            },
            t if t == PacketContentType::ClientInfoExtId as u8 => {
                let count = cursor.read_u8()?;
                let shape = InfoShape { has_content_id: false, has_content_type_and_unique_id: true, has_md5sum: false };
                ContentMessage::ClientInfoExtId {
                    content_infos: read_content_infos(&mut cursor, count as usize, &shape)?,
                }
            },
            t if t == PacketContentType::ClientInfoExtIdMd5 as u8 => {
                let count = cursor.read_u8()?;
                let shape = InfoShape { has_content_id: false, has_content_type_and_unique_id: true, has_md5sum: true };
                ContentMessage::ClientInfoExtIdMd5 {
                    content_infos: read_content_infos(&mut cursor, count as usize, &shape)?,
                }
            },
            t if t == PacketContentType::ClientContent as u8 => {
                let count = cursor.read_u16()?;
                let shape = InfoShape { has_content_id: true, has_content_type_and_unique_id: false, has_md5sum: false };
                ContentMessage::ClientContent {
                    content_infos: read_content_infos(&mut cursor, count as usize, &shape)?,
                }
            },
            _ => return Err(SchemaError::Packet(ottd_wire::PacketError::PacketInvalidType { tag })),
        };
        cursor.finish()?;
        Ok(message)
    }
}

/// Full metadata for one content item, as sent in `SERVER_INFO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContentInfo {
    /// Content type.
    pub content_type: ContentType,
    /// Internal content id.
    pub content_id: u32,
    /// Size of the content file in bytes.
    pub filesize: u32,
    /// Display name.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Homepage URL.
    pub url: String,
    /// Human-readable description.
    pub description: String,
    /// External unique identifier.
    pub unique_id: [u8; 4],
    /// MD5 checksum of the content file.
    pub md5sum: [u8; 16],
    /// Internal content ids this item depends on.
    pub dependencies: Vec<u32>,
    /// Freeform tags.
    pub tags: Vec<String>,
}

/// Encode `SERVER_INFO`.
pub fn encode_server_info(info: &ServerContentInfo) -> Result<Vec<u8>, SchemaError> {
    let mut builder = PacketBuilder::<CompatMtu>::new(PacketContentType::ServerInfo as u8);
    builder.write_u8(info.content_type as u8);
    builder.write_u32(info.content_id);
    builder.write_u32(info.filesize);
    builder.write_string(&info.name);
    builder.write_string(&info.version);
    builder.write_string(&info.url);
    builder.write_string(&info.description);

    let mut unique_id_buf = Vec::new();
    write_unique_id(&mut unique_id_buf, info.content_type, info.unique_id);
    builder.write_bytes(&unique_id_buf);

    builder.write_bytes(&info.md5sum);

    builder.write_u8(u8::try_from(info.dependencies.len()).unwrap_or(u8::MAX));
    for dependency in &info.dependencies {
        builder.write_u32(*dependency);
    }

    builder.write_u8(u8::try_from(info.tags.len()).unwrap_or(u8::MAX));
    for tag in &info.tags {
        builder.write_string(tag);
    }

    Ok(builder.finish()?)
}

/// Encode the `SERVER_CONTENT` choreography: one metadata packet, then data
/// packets of up to `SEND_TCP_COMPAT_MTU - 3` body bytes drawn from `reader`,
/// then one zero-body terminator packet.
///
/// The source has a bug here: its final "terminator" packet resends the
/// last data chunk's buffer instead of a true empty body. This implements
/// the evidently-intended behavior — a genuine empty terminator — per the
/// deviation noted in this crate's design record.
pub fn encode_server_content(
    content_type: ContentType,
    content_id: u32,
    filesize: u32,
    filename: &str,
    reader: &mut impl Read,
) -> Result<Vec<Vec<u8>>, SchemaError> {
    let mut packets = Vec::new();

    let mut metadata = PacketBuilder::<CompatMtu>::new(PacketContentType::ServerContent as u8);
    metadata.write_u8(content_type as u8);
    metadata.write_u32(content_id);
    metadata.write_u32(filesize);
    metadata.write_string(filename);
    packets.push(metadata.finish()?);

    let chunk_size = SEND_TCP_COMPAT_MTU - 3;
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let read = read_fill(reader, &mut chunk)?;
        if read == 0 {
            break;
        }
        let mut data = PacketBuilder::<CompatMtu>::new(PacketContentType::ServerContent as u8);
        data.write_bytes(&chunk[..read]);
        packets.push(data.finish()?);
        if read < chunk_size {
            break;
        }
    }

    let terminator = PacketBuilder::<CompatMtu>::new(PacketContentType::ServerContent as u8);
    packets.push(terminator.finish()?);

    Ok(packets)
}

/// Fill `buf` from `reader`, stopping at EOF rather than erroring as
/// `Read::read_exact` would.
fn read_fill(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize, SchemaError> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader
            .read(&mut buf[total..])
            .map_err(|_| SchemaError::invalid_data("failed reading content stream", 0))?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor as IoCursor;

    use super::*;

    #[test]
    fn newgrf_unique_id_is_byte_swapped() {
        let mut buf = Vec::new();
        write_unique_id(&mut buf, ContentType::NewGrf, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(buf, vec![0x44, 0x33, 0x22, 0x11]);

        let mut cursor = Cursor::new(&buf);
        let round_tripped = read_unique_id(&mut cursor, ContentType::NewGrf).unwrap();
        assert_eq!(round_tripped, [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn other_content_type_unique_id_passes_through() {
        let mut buf = Vec::new();
        write_unique_id(&mut buf, ContentType::Ai, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(buf, vec![0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn client_info_list_decodes() {
        let mut body = Vec::new();
        ottd_wire::write_u8(&mut body, ContentType::NewGrf as u8);
        ottd_wire::write_u32(&mut body, 140_00);
        let msg = Content::decode(PacketContentType::ClientInfoList as u8, &body).unwrap();
        assert_eq!(
            msg,
            ContentMessage::ClientInfoList { content_type: ContentType::NewGrf, openttd_version: 14000 }
        );
    }

    #[test]
    fn server_content_stream_splits_and_terminates() {
        let payload = vec![7u8; 2000];
        let mut reader = IoCursor::new(payload.clone());
        let packets =
            encode_server_content(ContentType::BaseGraphics, 1, 2000, "file.tar", &mut reader).unwrap();

        // metadata + 2 data packets + terminator
        assert_eq!(packets.len(), 4);

        let terminator = packets.last().unwrap();
        assert_eq!(terminator, &vec![3u8, 0, PacketContentType::ServerContent as u8]);

        let data_bytes: usize = packets[1..packets.len() - 1]
            .iter()
            .map(|p| p.len() - 3)
            .sum();
        assert_eq!(data_bytes, 2000);
    }
}
