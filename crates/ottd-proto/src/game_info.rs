//! The `GameInfo` schema shared by `SERVER_GAME_INFO` (Game family),
//! `SERVER_UPDATE` (Coordinator, decode), and `GC_LISTING` (Coordinator,
//! encode).
//!
//! Field presence is gated by `game_info_version`; see the wire-order table
//! this module's `decode`/`ListingInfo::encode` mirror field-for-field.

use ottd_wire::Cursor;

use crate::{
    consts::{DAYS_TILL_ORIGINAL_BASE_YEAR, GAMESCRIPT_VERSION_NONE},
    error::SchemaError,
    newgrf::NewGrfLookupTable,
};

/// How NewGRF identity is serialized within a `GameInfo` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NewGrfSerializationType {
    /// `grfid` + 16-byte md5sum, no name.
    GrfidMd5 = 0,
    /// `grfid` + 16-byte md5sum + name.
    GrfidMd5Name = 1,
    /// A single lookup-table index (`GC_LISTING` encode only, version >= 6).
    LookupId = 2,
    /// Internal marker for versions < 6, which never carried this field on
    /// the wire; equivalent in effect to [`NewGrfSerializationType::GrfidMd5`].
    /// Never written or read on the wire.
    ConversionGrfidMd5 = 4,
}

impl NewGrfSerializationType {
    fn from_wire(value: u8) -> Result<Self, SchemaError> {
        match value {
            0 => Ok(Self::GrfidMd5),
            1 => Ok(Self::GrfidMd5Name),
            2 => Ok(Self::LookupId),
            _ => Err(SchemaError::invalid_data("invalid NewGRFSerializationType", u64::from(value))),
        }
    }
}

/// One NewGRF entry inline in a decoded `GameInfo` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrfField {
    /// The NewGRF's 32-bit identifier.
    pub grfid: u32,
    /// MD5 checksum of the NewGRF's content.
    pub md5sum: [u8; 16],
    /// Present only when the block's serialization type is `GrfidMd5Name`.
    pub name: Option<String>,
}

/// Gamescript identity, present for `game_info_version >= 5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameScript {
    /// Gamescript version, or [`GAMESCRIPT_VERSION_NONE`] for "no gamescript".
    pub version: u32,
    /// Gamescript name, empty when `version == GAMESCRIPT_VERSION_NONE`.
    pub name: String,
}

impl GameScript {
    /// Whether this represents "no gamescript loaded".
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.version == GAMESCRIPT_VERSION_NONE
    }

    /// The sentinel value for "no gamescript loaded".
    #[must_use]
    pub fn none() -> Self {
        Self { version: GAMESCRIPT_VERSION_NONE, name: String::new() }
    }
}

/// Company/spectator slot counts, present for `game_info_version >= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanySlots {
    /// Maximum number of companies.
    pub companies_max: u8,
    /// Companies currently in use.
    pub companies_on: u8,
    /// Maximum number of spectators.
    pub spectators_max: u8,
}

/// A fully decoded `GameInfo` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    /// The version that gated which fields were present on the wire.
    pub game_info_version: u8,
    /// How any inline NewGRF entries are serialized. Always
    /// [`NewGrfSerializationType::ConversionGrfidMd5`] for `game_info_version < 6`.
    pub newgrf_serialization_type: NewGrfSerializationType,
    /// Present for `game_info_version >= 5`.
    pub gamescript: Option<GameScript>,
    /// Present for `game_info_version >= 4`.
    pub newgrfs: Option<Vec<NewGrfField>>,
    /// Days since year 0; promoted from the legacy 1920 epoch for versions < 3.
    pub game_date: u32,
    /// Days since year 0; promoted from the legacy 1920 epoch for versions < 3.
    pub start_date: u32,
    /// Present for `game_info_version >= 2`.
    pub companies: Option<CompanySlots>,
    /// Server name.
    pub name: String,
    /// OpenTTD version string of the server.
    pub openttd_version: String,
    /// Whether the server requires a password.
    pub use_password: u8,
    /// Maximum client slots.
    pub clients_max: u8,
    /// Clients currently connected.
    pub clients_on: u8,
    /// Spectators currently connected.
    pub spectators_on: u8,
    /// Map width in tiles.
    pub map_width: u16,
    /// Map height in tiles.
    pub map_height: u16,
    /// Map landscape type.
    pub map_type: u8,
    /// Whether this is a dedicated server.
    pub is_dedicated: u8,
}

impl GameInfo {
    /// Decode a `GameInfo` block for the given `game_info_version`.
    ///
    /// `game_info_version` must already have been validated to be in
    /// `1..=6` by the caller (the enclosing packet's decoder), matching the
    /// source's structure where the version is read and range-checked once
    /// before the shared `GameInfo` layout is parsed.
    pub fn decode(cursor: &mut Cursor, game_info_version: u8) -> Result<Self, SchemaError> {
        let newgrf_serialization_type = if game_info_version >= 6 {
            let raw = cursor.read_u8()?;
            let kind = NewGrfSerializationType::from_wire(raw)?;
            if matches!(kind, NewGrfSerializationType::LookupId) {
                return Err(SchemaError::invalid_data(
                    "NewGRF serialization type cannot be NST_LOOKUP_ID when decoding",
                    u64::from(raw),
                ));
            }
            kind
        } else {
            NewGrfSerializationType::ConversionGrfidMd5
        };

        let gamescript = if game_info_version >= 5 {
            let version = cursor.read_u32()?;
            let name = cursor.read_string()?;
            Some(GameScript { version, name })
        } else {
            None
        };

        let newgrfs = if game_info_version >= 4 {
            let count = cursor.read_u8()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let grfid = cursor.read_u32()?;
                let md5sum = cursor.read_array::<16>()?;
                let name = if matches!(newgrf_serialization_type, NewGrfSerializationType::GrfidMd5Name) {
                    Some(cursor.read_string()?)
                } else {
                    None
                };
                entries.push(NewGrfField { grfid, md5sum, name });
            }
            Some(entries)
        } else {
            None
        };

        let (mut game_date, mut start_date) = if game_info_version >= 3 {
            (cursor.read_u32()?, cursor.read_u32()?)
        } else {
            (0, 0)
        };

        let companies = if game_info_version >= 2 {
            Some(CompanySlots {
                companies_max: cursor.read_u8()?,
                companies_on: cursor.read_u8()?,
                spectators_max: cursor.read_u8()?,
            })
        } else {
            None
        };

        let name = cursor.read_string()?;
        let openttd_version = cursor.read_string()?;
        if game_info_version < 6 {
            cursor.read_u8()?; // formerly server-lang, unused
        }
        let use_password = cursor.read_u8()?;
        let clients_max = cursor.read_u8()?;
        let clients_on = cursor.read_u8()?;
        let spectators_on = cursor.read_u8()?;

        if game_info_version < 3 {
            let legacy_game_date = u32::from(cursor.read_u16()?);
            game_date = legacy_game_date + DAYS_TILL_ORIGINAL_BASE_YEAR;
            let legacy_start_date = u32::from(cursor.read_u16()?);
            start_date = legacy_start_date + DAYS_TILL_ORIGINAL_BASE_YEAR;
        }

        if game_info_version < 6 {
            cursor.read_string()?; // formerly map-name, unused
        }
        let map_width = cursor.read_u16()?;
        let map_height = cursor.read_u16()?;
        let map_type = cursor.read_u8()?;
        let is_dedicated = cursor.read_u8()?;

        Ok(Self {
            game_info_version,
            newgrf_serialization_type,
            gamescript,
            newgrfs,
            game_date,
            start_date,
            companies,
            name,
            openttd_version,
            use_password,
            clients_max,
            clients_on,
            spectators_on,
            map_width,
            map_height,
            map_type,
            is_dedicated,
        })
    }
}

/// Encodable listing fields for one server, independent of `GameInfo`'s
/// decode-only `newgrfs`/`newgrf_serialization_type` representation: the
/// encode side (`GC_LISTING`) carries NewGRF identity as indices into a
/// shared [`NewGrfLookupTable`], never inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingInfo {
    /// Gamescript identity, or `None` for "no gamescript loaded".
    pub gamescript: Option<GameScript>,
    /// Days since year 0.
    pub game_date: u32,
    /// Days since year 0.
    pub start_date: u32,
    /// Present for `game_info_version >= 2`.
    pub companies: CompanySlots,
    /// Server name.
    pub name: String,
    /// OpenTTD version string of the server.
    pub openttd_version: String,
    /// Whether the server requires a password.
    pub use_password: u8,
    /// Maximum client slots.
    pub clients_max: u8,
    /// Clients currently connected.
    pub clients_on: u8,
    /// Spectators currently connected.
    pub spectators_on: u8,
    /// Map width in tiles.
    pub map_width: u16,
    /// Map height in tiles.
    pub map_height: u16,
    /// Map landscape type.
    pub map_type: u8,
    /// Whether this is a dedicated server.
    pub is_dedicated: u8,
}

/// Encode one `GameInfo` block for `GC_LISTING`, at `game_info_version`.
///
/// `newgrfs_indexed` are indices into `lookup`. For `game_info_version >= 6`
/// the indices are written directly (`NST_LOOKUP_ID`); for versions 4-5 each
/// index is resolved against `lookup` and its `grfid`/`md5sum` written
/// inline instead (older clients never learned the lookup-table protocol).
pub fn encode_listing(
    buf: &mut Vec<u8>,
    info: &ListingInfo,
    game_info_version: u8,
    newgrfs_indexed: &[u32],
    lookup: &NewGrfLookupTable,
) {
    use ottd_wire::{write_bytes, write_string, write_u8, write_u16, write_u32};

    if game_info_version >= 6 {
        write_u8(buf, NewGrfSerializationType::LookupId as u8);
    }

    if game_info_version >= 5 {
        match &info.gamescript {
            Some(gs) if !gs.is_none() => {
                write_u32(buf, gs.version);
                write_string(buf, &gs.name);
            },
            _ => {
                write_u32(buf, GAMESCRIPT_VERSION_NONE);
                write_string(buf, "");
            },
        }
    }

    if game_info_version >= 4 {
        write_u8(buf, newgrfs_indexed.len() as u8);
        if game_info_version >= 6 {
            for index in newgrfs_indexed {
                write_u32(buf, *index);
            }
        } else {
            for index in newgrfs_indexed {
                if let Some(entry) = lookup.get(index) {
                    write_u32(buf, entry.grfid);
                    write_bytes(buf, &entry.md5sum);
                }
            }
        }
    }

    if game_info_version >= 3 {
        write_u32(buf, info.game_date);
        write_u32(buf, info.start_date);
    }

    if game_info_version >= 2 {
        write_u8(buf, info.companies.companies_max);
        write_u8(buf, info.companies.companies_on);
        write_u8(buf, info.companies.spectators_max);
    }

    write_string(buf, &info.name);
    write_string(buf, &info.openttd_version);
    if game_info_version <= 5 {
        write_u8(buf, 0); // formerly server-lang, unused
    }
    write_u8(buf, info.use_password);
    write_u8(buf, info.clients_max);
    write_u8(buf, info.clients_on);
    write_u8(buf, info.spectators_on);

    if game_info_version < 3 {
        write_u16(buf, (info.game_date - DAYS_TILL_ORIGINAL_BASE_YEAR) as u16);
        write_u16(buf, (info.start_date - DAYS_TILL_ORIGINAL_BASE_YEAR) as u16);
    }

    if game_info_version <= 5 {
        write_string(buf, ""); // formerly map-name, unused
    }
    write_u16(buf, info.map_width);
    write_u16(buf, info.map_height);
    write_u8(buf, info.map_type);
    write_u8(buf, info.is_dedicated);
}

#[cfg(test)]
mod tests {
    use ottd_wire::write_u8;

    use super::*;

    fn minimal_v1_body(name: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        ottd_wire::write_string(&mut buf, name);
        ottd_wire::write_string(&mut buf, "14.0");
        write_u8(&mut buf, 0); // server-lang
        write_u8(&mut buf, 0); // use_password
        write_u8(&mut buf, 8); // clients_max
        write_u8(&mut buf, 1); // clients_on
        write_u8(&mut buf, 0); // spectators_on
        ottd_wire::write_u16(&mut buf, 1000); // legacy game_date
        ottd_wire::write_u16(&mut buf, 900); // legacy start_date
        ottd_wire::write_string(&mut buf, "unused-map-name");
        ottd_wire::write_u16(&mut buf, 256);
        ottd_wire::write_u16(&mut buf, 256);
        write_u8(&mut buf, 1); // map_type
        write_u8(&mut buf, 1); // is_dedicated
        buf
    }

    #[test]
    fn version_1_promotes_legacy_epoch() {
        let body = minimal_v1_body("my server");
        let mut cursor = Cursor::new(&body);
        let info = GameInfo::decode(&mut cursor, 1).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(info.game_date, DAYS_TILL_ORIGINAL_BASE_YEAR + 1000);
        assert_eq!(info.start_date, DAYS_TILL_ORIGINAL_BASE_YEAR + 900);
        assert_eq!(info.name, "my server");
        assert!(info.companies.is_none());
        assert!(info.gamescript.is_none());
    }

    #[test]
    fn unknown_serialization_type_is_invalid_data() {
        let mut buf = Vec::new();
        write_u8(&mut buf, 9); // invalid NewGRFSerializationType
        let mut cursor = Cursor::new(&buf);
        assert!(GameInfo::decode(&mut cursor, 6).is_err());
    }

    #[test]
    fn lookup_id_rejected_on_decode() {
        let mut buf = Vec::new();
        write_u8(&mut buf, NewGrfSerializationType::LookupId as u8);
        let mut cursor = Cursor::new(&buf);
        assert!(GameInfo::decode(&mut cursor, 6).is_err());
    }
}
