//! Protocol-wide constants that are not specific to one family.

/// Days from year 0 to year 1920 (`365*1920 + 1920/4 - 1920/100 + 1920/400`),
/// used to promote game-info-version 1/2 dates (counted from 1920) to the
/// version-3-and-later epoch (counted from year 0).
pub const DAYS_TILL_ORIGINAL_BASE_YEAR: u32 = 701_265;

/// Sentinel `gamescript_version` meaning "no gamescript loaded", paired with
/// an empty `gamescript_name`. This is `(i32)-1` cast to `u32` in the source.
pub const GAMESCRIPT_VERSION_NONE: u32 = 0xFFFF_FFFF;
