//! Async driver wiring a [`Session`] to a real byte stream.
//!
//! The session itself never touches I/O (see the module docs on [`crate`]);
//! this is the thin loop that reads off an [`AsyncRead`], feeds the bytes in,
//! and periodically ticks the write-gate watchdog. It is generic over
//! [`Clock`] so the identical loop drives a live `tokio::net::TcpStream` and
//! a `turmoil`-simulated one.

use ottd_proto::Family;
use tokio::io::AsyncReadExt;

use crate::{
    clock::Clock,
    error::SessionError,
    session::{Session, SessionAction},
    write_gate::POLL_INTERVAL,
};

/// Drive `session` off `reader` until the peer closes, a framing/decode error
/// occurs, or the session closes itself.
///
/// `transport_closing` is polled on each watchdog tick and should reflect the
/// transport's own "this connection is going away" signal; `on_action` is
/// called for every action the session produces, in order.
///
/// # Errors
///
/// Returns [`SessionError`] on a read failure or a malformed inbound byte
/// sequence; the caller should treat either as a reason to drop the
/// transport, mirroring the source's unconditional connection close on any
/// `PacketInvalid`.
pub async fn drive<F, R, C>(
    session: &mut Session<F, C::Instant>,
    clock: &C,
    mut reader: R,
    mut transport_closing: impl FnMut() -> bool,
    mut on_action: impl FnMut(SessionAction<F::Message>),
) -> Result<(), SessionError>
where
    F: Family,
    R: tokio::io::AsyncRead + Unpin,
    C: Clock,
{
    let mut buf = [0u8; 4096];
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            read = reader.read(&mut buf) => {
                let n = read?;
                if n == 0 {
                    on_action(session.close("peer closed the connection"));
                    return Ok(());
                }
                for action in session.data_received(&buf[..n])? {
                    on_action(action);
                }
                if session.is_closed() {
                    return Ok(());
                }
            }
            _ = ticker.tick() => {
                for action in session.tick(clock.now(), transport_closing()) {
                    on_action(action);
                }
                if session.is_closed() {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ottd_proto::game::{Game, GameMessage, PacketGameType};
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::clock::SystemClock;

    #[tokio::test]
    async fn drive_dispatches_a_decoded_packet_then_stops_at_eof() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut session: Session<Game, std::time::Instant> = Session::new(false);
        session.connection_made("127.0.0.1:3979".parse().unwrap());

        client.write_all(&[0x03, 0x00, PacketGameType::ServerShutdown as u8]).await.unwrap();
        client.shutdown().await.unwrap();

        let mut actions = Vec::new();
        drive(&mut session, &SystemClock, server, || false, |action| actions.push(action)).await.unwrap();

        assert_eq!(
            actions,
            vec![
                SessionAction::Dispatch(GameMessage::ServerShutdown),
                SessionAction::Close { reason: "peer closed the connection".to_string() },
            ]
        );
        assert!(session.is_closed());
    }
}
