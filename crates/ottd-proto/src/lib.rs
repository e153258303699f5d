//! Message schemas for the OpenTTD network protocol suite's five families:
//! Game, Coordinator, Content, STUN and TURN.
//!
//! Each family is a zero-sized marker type implementing [`Family`], pairing
//! a tag space (`END`) with a `decode` function. Encoding is a set of free
//! functions per family, since — unlike decoding — which packet to build is
//! a choice the caller already made, not something to dispatch on.
//!
//! # Components
//!
//! - [`Family`]: the tag-space/decoder trait every family implements.
//! - [`game`], [`coordinator`], [`content`], [`stun`], [`turn`]: one module
//!   per protocol family.
//! - [`game_info`]: the `GameInfo`/`ListingInfo` schema shared by the Game
//!   and Coordinator families.
//! - [`newgrf`]: the NewGRF lookup table shared across coordinator listings.
//! - [`SchemaError`]: this crate's error type, wrapping `ottd_wire::PacketError`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod consts;
mod error;
mod family;
mod newgrf;

pub mod content;
pub mod coordinator;
pub mod game;
pub mod game_info;
pub mod stun;
pub mod turn;

pub use consts::{DAYS_TILL_ORIGINAL_BASE_YEAR, GAMESCRIPT_VERSION_NONE};
pub use error::SchemaError;
pub use family::Family;
pub use newgrf::{NewGrfEntry, NewGrfLookupTable};

pub use content::Content;
pub use coordinator::Coordinator;
pub use game::Game;
pub use stun::Stun;
pub use turn::Turn;
