//! The per-connection Sans-IO state machine: takes transport events (a new
//! connection, bytes received, a tick) and returns the actions an external
//! driver should carry out. No I/O happens here — see the module docs on
//! [`crate`] for why.

use std::{
    marker::PhantomData,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    ops::Sub,
    time::Duration,
};

use ottd_proto::Family;
use ottd_wire::PacketError;

use crate::{
    error::SessionError,
    framer::Framer,
    source::{parse_proxy_preamble, Source},
    write_gate::WriteGate,
};

/// One action a [`Session`] asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction<M> {
    /// The session has a peer address (set on the first event of a new connection).
    Connected(Source),
    /// A PROXY protocol preamble replaced the transport-level peer address.
    SourceUpdated(Source),
    /// A fully decoded message arrived; hand it to application logic.
    Dispatch(M),
    /// Close the connection with this reason.
    Close {
        /// Human-readable reason, suitable for logging.
        reason: String,
    },
}

/// Per-connection state for one protocol family `F`, generic over the
/// instant type `I` so the same session code drives production and
/// simulated time.
pub struct Session<F: Family, I> {
    framer: Framer,
    awaiting_preamble: bool,
    source: Option<Source>,
    write_gate: WriteGate<I>,
    closed: bool,
    _family: PhantomData<F>,
}

impl<F: Family, I> Session<F, I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Start a new session. `proxy_protocol` enables PROXY preamble
    /// detection on the connection's first bytes.
    #[must_use]
    pub fn new(proxy_protocol: bool) -> Self {
        Self {
            framer: Framer::new(),
            awaiting_preamble: proxy_protocol,
            source: None,
            write_gate: WriteGate::new(),
            closed: false,
            _family: PhantomData,
        }
    }

    /// The peer address this session currently attributes to its
    /// connection, once [`Self::connection_made`] has run.
    #[must_use]
    pub fn source(&self) -> Option<Source> {
        self.source
    }

    /// Whether writes are currently permitted.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.write_gate.is_writable()
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Record the transport-level peer address for a newly accepted connection.
    pub fn connection_made(&mut self, peer: SocketAddr) -> Vec<SessionAction<F::Message>> {
        let source = Source::new(peer);
        self.source = Some(source);
        vec![SessionAction::Connected(source)]
    }

    /// Feed newly received bytes, returning the actions they produce.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if framing or decoding fails; the driver
    /// should close the transport in response, mirroring the source
    /// dropping the connection on any `PacketInvalid`.
    pub fn data_received(&mut self, mut data: &[u8]) -> Result<Vec<SessionAction<F::Message>>, SessionError> {
        if self.closed {
            return Ok(Vec::new());
        }

        let mut actions = Vec::new();

        if self.awaiting_preamble {
            self.awaiting_preamble = false;
            if let Some(preamble) = parse_proxy_preamble(data) {
                let current = self
                    .source
                    .unwrap_or_else(|| Source::new(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))));
                let updated = current.with_proxy(&preamble);
                self.source = Some(updated);
                actions.push(SessionAction::SourceUpdated(updated));
                data = &data[preamble.consumed..];
            } else if data.starts_with(b"PROXY") {
                tracing::warn!(source = ?self.source, "received malformed proxy protocol preamble, passing bytes through unaltered");
            }
        }

        for (tag, body) in self.framer.feed(data)? {
            if tag >= F::END {
                return Err(SessionError::Packet(PacketError::PacketInvalidType { tag }));
            }
            let message = F::decode(tag, &body)?;
            actions.push(SessionAction::Dispatch(message));
        }

        Ok(actions)
    }

    /// The transport signaled backpressure; pause writes.
    pub fn pause_writing(&mut self, now: I) {
        self.write_gate.pause(now);
    }

    /// The transport signaled it drained its buffer; resume writes.
    pub fn resume_writing(&mut self) {
        self.write_gate.resume();
    }

    /// Periodic maintenance: polls the write-pause watchdog.
    ///
    /// `transport_closing` should reflect the transport's own
    /// "is this connection going away" signal.
    pub fn tick(&mut self, now: I, transport_closing: bool) -> Vec<SessionAction<F::Message>> {
        if self.write_gate.tick(now, transport_closing) {
            return vec![self.close("peer stalled while writing and the transport is closing")];
        }
        Vec::new()
    }

    /// Mark the session closed and produce the corresponding action. Once
    /// closed, [`Self::data_received`] is a no-op.
    pub fn close(&mut self, reason: impl Into<String>) -> SessionAction<F::Message> {
        self.closed = true;
        let reason = reason.into();
        tracing::info!(source = ?self.source, reason = %reason, "closing session");
        SessionAction::Close { reason }
    }
}
