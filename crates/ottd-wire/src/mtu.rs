//! Per-family MTU ceilings, bound at the type level.
//!
//! The source selects a max packet size via a module-level constant passed
//! explicitly to `write_presend` at each call site; nothing stops a family
//! from accidentally calling it with the wrong constant. Here the ceiling is
//! an associated constant on a marker type, so [`crate::packet::PacketBuilder`]
//! is generic over it: a coordinator encoder built as `PacketBuilder<TcpMtu>`
//! and a content encoder built as `PacketBuilder<CompatMtu>` cannot be
//! confused by the compiler, let alone at review time.

/// Modern TCP packets: the OpenTTD game, coordinator, STUN, and TURN
/// families outside of content transfer.
pub const SEND_TCP_MTU: usize = 32_767;

/// Content-family and legacy-compatible TCP packets.
pub const SEND_TCP_COMPAT_MTU: usize = 1_460;

/// UDP discovery packets (declared in the source protocol, unimplemented
/// here — see workspace Non-goals).
pub const SEND_UDP_MTU: usize = 1_460;

/// A family's outbound packet-size ceiling.
pub trait Mtu {
    /// Maximum finalized packet size in bytes, including the 3-byte header.
    const MAX_SIZE: usize;
}

/// The modern TCP ceiling ([`SEND_TCP_MTU`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpMtu;

impl Mtu for TcpMtu {
    const MAX_SIZE: usize = SEND_TCP_MTU;
}

/// The content/legacy-compatible TCP ceiling ([`SEND_TCP_COMPAT_MTU`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatMtu;

impl Mtu for CompatMtu {
    const MAX_SIZE: usize = SEND_TCP_COMPAT_MTU;
}
