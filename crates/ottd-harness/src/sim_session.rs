//! Pairs one simulated connection with an `ottd_net::Session`, recording
//! every action produced so tests can assert on the exact sequence.

use std::net::SocketAddr;

use ottd_net::{drive, Session, SessionAction, SessionError};
use ottd_proto::Family;
use tokio::io::AsyncRead;

use crate::sim_clock::SimClock;

/// A [`Session`] driven over a simulated (or any [`AsyncRead`]) stream.
pub struct SimSession<F: Family> {
    session: Session<F, tokio::time::Instant>,
    actions: Vec<SessionAction<F::Message>>,
}

impl<F: Family> SimSession<F> {
    /// Start a simulated session for a connection that was just accepted
    /// from `peer`.
    #[must_use]
    pub fn new(proxy_protocol: bool, peer: SocketAddr) -> Self {
        let mut session = Session::new(proxy_protocol);
        let actions = session.connection_made(peer);
        Self { session, actions }
    }

    /// Run the drive loop over `reader` until it closes, errors, or the
    /// session closes itself, recording every action produced.
    ///
    /// # Errors
    ///
    /// Propagates whatever [`ottd_net::drive`] returns.
    pub async fn run<R>(&mut self, reader: R) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
        F::Message: std::fmt::Debug,
    {
        let clock = SimClock;
        let Self { session, actions } = self;
        drive(session, &clock, reader, || false, |action| {
            tracing::debug!(?action, "simulated session produced an action");
            actions.push(action);
        })
        .await
    }

    /// Every action recorded so far, in the order it was produced.
    #[must_use]
    pub fn actions(&self) -> &[SessionAction<F::Message>] {
        &self.actions
    }

    /// Whether the session has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }
}
