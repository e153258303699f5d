//! The family trait: binds a tag space, an `END` sentinel, and a decoder
//! together so the stream framer can validate and dispatch without knowing
//! which protocol family it is framing for.
//!
//! Replaces the source's `getattr(self, f"receive_{name}")` dynamic dispatch
//! (see the redesign notes) with a static association checked at compile
//! time: each family is a zero-sized marker type implementing [`Family`].

use crate::error::SchemaError;

/// A protocol family: a tag space with a decoder and an `END` sentinel.
pub trait Family {
    /// The decoded message type for this family.
    type Message;

    /// One past the highest valid tag; tags `>= END` are invalid.
    const END: u8;

    /// Decode a packet body given its type tag.
    ///
    /// `body` is everything after the 2-byte length and 1-byte tag. The
    /// caller (the stream framer) has already checked `tag < Self::END`.
    fn decode(tag: u8, body: &[u8]) -> Result<Self::Message, SchemaError>;
}
