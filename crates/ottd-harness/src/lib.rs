//! Deterministic simulation harness for the OpenTTD protocol codec.
//!
//! Turmoil-based testing of [`ottd_net::Session`] under arbitrary byte
//! splitting, one-byte-at-a-time delivery, and half-closed peers. The same
//! [`ottd_net::drive`] loop that runs against a real `tokio::net::TcpStream`
//! runs here against a `turmoil`-simulated one, driven by [`SimClock`]
//! instead of [`ottd_net::SystemClock`].
//!
//! # Simulation driver
//!
//! [`SimSession`] pairs a `turmoil::net::TcpStream` half with an
//! `ottd_net::Session`, recording every [`ottd_net::SessionAction`] it
//! produces so a test can assert on the exact dispatched-message sequence.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod sim_clock;
mod sim_session;
pub mod splitting;

pub use sim_clock::SimClock;
pub use sim_session::SimSession;
