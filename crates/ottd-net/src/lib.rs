//! Transport-facing session layer for the OpenTTD network protocol suite.
//!
//! Builds on `ottd-wire`'s codec and `ottd-proto`'s schemas with the parts
//! that depend on a live connection: stream framing, PROXY protocol v1
//! source detection, and write-flow control. [`Session`] is a pure,
//! Sans-IO state machine — it takes events and the current time and
//! returns [`SessionAction`]s for an external driver to execute. No socket,
//! no async runtime, and no clock live inside it; that keeps it equally
//! usable from a real Tokio server and from a deterministic simulation.
//!
//! # Components
//!
//! - [`Session`]: per-connection state machine, generic over a protocol
//!   family and an instant type.
//! - [`Framer`]: splits a byte stream into `(tag, body)` packets.
//! - [`Source`] / [`parse_proxy_preamble`]: peer address tracking and PROXY
//!   protocol v1 parsing.
//! - [`Clock`] / [`SystemClock`]: the time abstraction `Session` is generic over.
//! - [`WriteGate`]: write-pause tracking and the closed-transport watchdog.
//! - [`SessionError`]: this crate's error type, wrapping `ottd_wire` and `ottd_proto` errors.
//! - [`driver::drive`]: the async loop wiring a [`Session`] to a real stream,
//!   generic over [`Clock`] so the same loop drives production and simulated time.
//! - [`send_packet`]: the outbound counterpart, honoring the write-gate before writing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod clock;
pub mod driver;
mod error;
mod framer;
mod send;
mod session;
mod source;
mod write_gate;

pub use clock::{Clock, SystemClock};
pub use driver::drive;
pub use error::SessionError;
pub use framer::Framer;
pub use send::send_packet;
pub use session::{Session, SessionAction};
pub use source::{parse_proxy_preamble, ProxyPreamble, Source};
pub use write_gate::WriteGate;
