//! Wire codec for the OpenTTD network protocol suite.
//!
//! Primitive readers and writers over an unframed byte stream, plus the
//! outbound packet builder that assembles a length-prefixed envelope around
//! a family's body. This crate has no notion of packet *meaning* — that
//! lives in `ottd-proto`, layered on top of [`Cursor`] and [`PacketBuilder`].
//!
//! # Components
//!
//! - [`Cursor`]: zero-copy sequential reader over a byte slice.
//! - [`PacketBuilder`]: assembles one outbound packet, enforcing an MTU
//!   ceiling bound at the type level via [`Mtu`].
//! - [`PacketError`]: the full `PacketInvalid` family plus `SocketClosed`.
//! - [`SEND_TCP_MTU`], [`SEND_TCP_COMPAT_MTU`], [`SEND_UDP_MTU`]: the three
//!   MTU ceilings used across the protocol families.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cursor;
mod error;
mod mtu;
mod packet;
mod writer;

pub use cursor::Cursor;
pub use error::PacketError;
pub use mtu::{CompatMtu, Mtu, SEND_TCP_COMPAT_MTU, SEND_TCP_MTU, SEND_UDP_MTU, TcpMtu};
pub use packet::PacketBuilder;
pub use writer::{write_bytes, write_string, write_u8, write_u16, write_u32, write_u64};
