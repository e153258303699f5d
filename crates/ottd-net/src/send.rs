//! Outbound counterpart to [`crate::driver::drive`]: sends one already
//! finalized packet through a real writer, honoring a [`Session`]'s
//! write-gate.
//!
//! Mirrors the source's `send_packet`/`_can_write`: wait for the gate to be
//! writable, fail fast with `SocketClosed` if the transport reports it is
//! closing, then issue the write.

use std::time::Duration;

use ottd_proto::Family;
use ottd_wire::PacketError;
use tokio::io::AsyncWriteExt;

use crate::{clock::Clock, error::SessionError, session::Session};

/// How often to re-check the write-gate while waiting for it to open.
///
/// Distinct from [`crate::write_gate::POLL_INTERVAL`]'s 5-second
/// closed-transport watchdog: this is just the granularity of the wait
/// itself, not the delay before declaring a stalled peer dead.
const GATE_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Send `bytes` — the output of a [`ottd_wire::PacketBuilder::finish`] call —
/// through `writer`, honoring `session`'s write-gate.
///
/// Waits for the gate to open if writes are currently paused, re-checking
/// `transport_closing` on every poll; if the transport reports it is closing
/// while paused, fails immediately with [`PacketError::SocketClosed`] rather
/// than attempting the write. A short write — the transport accepting fewer
/// bytes than asked for — is treated as the transport signaling backpressure
/// and pauses the gate until the remainder drains, mirroring the source's
/// `pause_writing`/`resume_writing` transport callbacks.
///
/// # Errors
///
/// Returns [`SessionError`] wrapping [`PacketError::SocketClosed`] if the
/// transport is observed closing while writes are paused, or the underlying
/// I/O error from the write itself.
pub async fn send_packet<F, W, C>(
    session: &mut Session<F, C::Instant>,
    clock: &C,
    writer: &mut W,
    bytes: &[u8],
    mut transport_closing: impl FnMut() -> bool,
) -> Result<(), SessionError>
where
    F: Family,
    W: tokio::io::AsyncWrite + Unpin,
    C: Clock,
{
    while !session.is_writable() {
        if transport_closing() {
            return Err(SessionError::Packet(PacketError::SocketClosed));
        }
        tokio::time::sleep(GATE_POLL_INTERVAL).await;
    }

    let mut sent = 0;
    while sent < bytes.len() {
        let written = writer.write(&bytes[sent..]).await?;
        if written == 0 {
            return Err(SessionError::Packet(PacketError::SocketClosed));
        }
        sent += written;

        if sent < bytes.len() {
            session.pause_writing(clock.now());
            if transport_closing() {
                return Err(SessionError::Packet(PacketError::SocketClosed));
            }
        }
    }

    if !session.is_writable() {
        session.resume_writing();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ottd_proto::game::Game;
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::{clock::SystemClock, session::Session};

    #[tokio::test]
    async fn writes_through_when_the_gate_is_open() {
        let (mut server, mut client) = tokio::io::duplex(64);
        let mut session: Session<Game, std::time::Instant> = Session::new(false);

        send_packet(&mut session, &SystemClock, &mut server, b"hello", || false).await.unwrap();

        let mut buf = [0u8; 5];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[tokio::test]
    async fn fails_fast_when_paused_and_the_transport_reports_closing() {
        let (mut server, _client) = tokio::io::duplex(64);
        let mut session: Session<Game, std::time::Instant> = Session::new(false);
        session.pause_writing(std::time::Instant::now());

        let result = send_packet(&mut session, &SystemClock, &mut server, b"hello", || true).await;

        assert!(matches!(result, Err(SessionError::Packet(PacketError::SocketClosed))));
    }

    #[tokio::test]
    async fn waits_for_the_gate_to_reopen_before_writing() {
        let (mut server, mut client) = tokio::io::duplex(64);
        let mut session: Session<Game, std::time::Instant> = Session::new(false);
        session.pause_writing(std::time::Instant::now());

        let send = tokio::spawn(async move {
            send_packet(&mut session, &SystemClock, &mut server, b"hi", || false).await.unwrap();
            session
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        send.abort();

        let mut buf = [0u8; 2];
        let read = tokio::time::timeout(Duration::from_millis(50), client.read_exact(&mut buf)).await;
        assert!(read.is_err(), "write should not happen while the gate stays paused");
    }
}
