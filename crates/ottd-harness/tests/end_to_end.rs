//! The end-to-end scenarios: each exercises one documented path through the
//! framer/session pair, from raw wire bytes to the action a driver sees.

use std::io::Cursor as IoCursor;

use ottd_harness::SimSession;
use ottd_net::{Session, SessionAction, SessionError};
use ottd_proto::content::{encode_server_content, ContentType};
use ottd_proto::coordinator::{encode_gc_listing, ListingServer};
use ottd_proto::game::{Game, GameMessage, PacketGameType};
use ottd_proto::NewGrfLookupTable;

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:3979".parse().unwrap()
}

/// 1. Minimal framed packet: `length=3` means a 1-byte body (the tag alone),
/// which `SERVER_GAME_INFO`'s decoder tries to read `game_info_version`
/// from and runs off the end.
#[test]
fn minimal_framed_packet_closes_the_session_on_truncated_body() {
    let mut session: Session<Game, std::time::Instant> = Session::new(false);
    session.connection_made(peer());

    let bytes = [0x03, 0x00, PacketGameType::ServerGameInfo as u8];
    let result = session.data_received(&bytes);

    assert!(matches!(result, Err(SessionError::Schema(_))));
}

/// 2. `SERVER_SHUTDOWN`: a bare 3-byte packet dispatches with no fields.
#[test]
fn server_shutdown_dispatches_with_no_fields() {
    let mut session: Session<Game, std::time::Instant> = Session::new(false);
    session.connection_made(peer());

    let bytes = [0x03, 0x00, PacketGameType::ServerShutdown as u8];
    let actions = session.data_received(&bytes).unwrap();

    assert_eq!(actions, vec![SessionAction::Dispatch(GameMessage::ServerShutdown)]);
}

/// 3. A PROXY protocol v1 preamble updates the source before the first
/// packet is decoded.
#[test]
fn proxy_preamble_updates_source_then_decodes_the_packet() {
    let mut session: Session<Game, std::time::Instant> = Session::new(true);
    session.connection_made("10.0.0.1:9999".parse().unwrap());

    let mut bytes = b"PROXY TCP4 127.0.0.1 127.0.0.1 12345 12121\r\n".to_vec();
    bytes.extend([0x03, 0x00, PacketGameType::ServerShutdown as u8]);

    let actions = session.data_received(&bytes).unwrap();

    assert_eq!(
        actions,
        vec![
            SessionAction::SourceUpdated(ottd_net::Source::new("127.0.0.1:12345".parse().unwrap())),
            SessionAction::Dispatch(GameMessage::ServerShutdown),
        ]
    );
}

/// 4. `GC_LISTING` with an empty server list emits exactly one terminator
/// packet.
#[test]
fn gc_listing_terminator_is_a_single_five_byte_packet() {
    let servers: Vec<ListingServer> = Vec::new();
    let lookup = NewGrfLookupTable::default();

    let packets = encode_gc_listing(6, &servers, &lookup).unwrap();

    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0], vec![0x05, 0x00, gc_listing_tag(), 0x00, 0x00]);
}

fn gc_listing_tag() -> u8 {
    ottd_proto::coordinator::PacketCoordinatorType::GcListing as u8
}

/// 5. A declared length longer than what has arrived buffers; once the
/// final byte lands and the registered decoder reads no fields, a trailing
/// byte becomes `PacketInvalidData`.
#[test]
fn size_mismatch_buffers_then_rejects_the_trailing_byte() {
    let mut session: Session<Game, std::time::Instant> = Session::new(false);
    session.connection_made(peer());

    // 4 declared, only 3 delivered: buffered, no actions yet.
    let actions = session.data_received(&[0x04, 0x00, PacketGameType::ServerShutdown as u8]).unwrap();
    assert!(actions.is_empty());

    // The 4th byte completes the packet; SERVER_SHUTDOWN's decoder reads
    // zero fields, so the extra byte is an unconsumed trailing byte.
    let result = session.data_received(&[0xAB]);
    assert!(matches!(
        result,
        Err(SessionError::Schema(_))
    ));
}

/// 6. Streaming `SERVER_CONTENT`: one metadata packet, N data packets whose
/// body bytes sum to the source length, then one zero-body terminator.
#[test]
fn content_stream_splits_and_terminates_with_exact_byte_count() {
    let source = vec![7u8; 2_000];
    let mut reader = IoCursor::new(source.clone());

    let packets =
        encode_server_content(ContentType::BaseGraphics, 42, source.len() as u32, "demo.tar", &mut reader)
            .unwrap();

    // metadata + 2 data packets + terminator
    assert_eq!(packets.len(), 4);

    let terminator = packets.last().unwrap();
    assert_eq!(terminator.len(), 3, "terminator must carry no body");

    let data_bytes: usize = packets[1..packets.len() - 1].iter().map(|p| p.len() - 3).sum();
    assert_eq!(data_bytes, 2_000);
}

/// The framer/session pair behaves identically over a simulated network as
/// it does fed directly: turmoil delivers the same three bytes across a
/// virtual TCP connection and the session still dispatches `SERVER_SHUTDOWN`.
#[test]
fn simulated_network_delivery_dispatches_server_shutdown() {
    let mut sim = turmoil::Builder::new().build();

    sim.host("server", || async {
        let listener = turmoil::net::TcpListener::bind("0.0.0.0:3979").await?;
        let (stream, addr) = listener.accept().await?;

        let mut session = SimSession::<Game>::new(false, addr);
        session.run(stream).await.map_err(|e| std::io::Error::other(e.to_string()))?;

        let dispatched: Vec<_> = session
            .actions()
            .iter()
            .filter_map(|a| match a {
                SessionAction::Dispatch(m) => Some(m.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(dispatched, vec![GameMessage::ServerShutdown]);
        Ok(())
    });

    sim.client("client", async {
        let mut stream = turmoil::net::TcpStream::connect("server:3979").await?;
        use tokio::io::AsyncWriteExt;
        stream.write_all(&[0x03, 0x00, PacketGameType::ServerShutdown as u8]).await?;
        stream.shutdown().await?;
        Ok(())
    });

    sim.run().unwrap();
}
