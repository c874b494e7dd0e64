//! Integration tests for the match engine and peer transport.
//!
//! These tests validate cross-crate interactions: wire protocol encoding,
//! handshake gating, reconciliation against real host snapshots, and a live
//! TCP loopback exchange.

use bincode::{deserialize, serialize};
use engine::{Phase, Session};
use shared::{MatchState, Message, Side, SoundCue, SNAP_DISTANCE};

/// WIRE PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    #[test]
    fn message_serialization_roundtrip() {
        let test_messages = vec![
            Message::Identity {
                name: "ada".to_string(),
            },
            Message::Input {
                paddle_offset: 123.5,
            },
            Message::State {
                snapshot: MatchState::new().snapshot(),
            },
            Message::Sound {
                cue: SoundCue::PaddleHit,
            },
            Message::Over {
                winner: "grace".to_string(),
            },
        ];

        for message in test_messages {
            let serialized = serialize(&message).unwrap();
            let deserialized: Message = deserialize(&serialized).unwrap();

            match (&message, &deserialized) {
                (Message::Identity { .. }, Message::Identity { .. }) => {}
                (Message::Input { .. }, Message::Input { .. }) => {}
                (Message::State { .. }, Message::State { .. }) => {}
                (Message::Sound { .. }, Message::Sound { .. }) => {}
                (Message::Over { .. }, Message::Over { .. }) => {}
                _ => panic!("Message type mismatch after serialization"),
            }
        }
    }

    #[test]
    fn frame_encoding_roundtrip() {
        let frame = netpong::transport::encode_frame(&Message::Over {
            winner: "ada".to_string(),
        })
        .unwrap();

        let len = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);

        match deserialize::<Message>(&frame[4..]).unwrap() {
            Message::Over { winner } => assert_eq!(winner, "ada"),
            _ => panic!("Wrong message type after frame decode"),
        }
    }

    #[test]
    fn malformed_payload_handling() {
        let valid = serialize(&Message::Input { paddle_offset: 1.0 }).unwrap();

        let truncated = &valid[..valid.len() / 2];
        assert!(deserialize::<Message>(truncated).is_err());

        let mut corrupted = valid.clone();
        corrupted[0] = 0xFF;
        assert!(deserialize::<Message>(&corrupted).is_err());

        assert!(deserialize::<Message>(&[]).is_err());
    }
}

/// HANDSHAKE TESTS
mod handshake_tests {
    use super::*;

    #[test]
    fn simulation_gated_until_identities_cross() {
        let mut host = Session::new("host");
        host.start_host();

        assert!(host.tick(100.0).outgoing.is_empty());

        let out = host.transport_opened();
        assert!(matches!(out.outgoing.as_slice(), [Message::Identity { .. }]));
        assert_eq!(host.phase(), Phase::HostWaiting);
        assert!(host.tick(100.0).outgoing.is_empty());

        let out = host.handle_message(Message::Identity {
            name: "guest".to_string(),
        });
        assert_eq!(host.phase(), Phase::Playing);
        assert!(out.sounds.contains(&SoundCue::GameStart));
        assert!(!host.tick(100.0).outgoing.is_empty());
    }

    #[test]
    fn peer_identity_may_arrive_first() {
        let mut client = Session::new("guest");
        client.start_join();

        client.handle_message(Message::Identity {
            name: "host".to_string(),
        });
        assert_eq!(client.phase(), Phase::Joining);

        client.transport_opened();
        assert_eq!(client.phase(), Phase::Playing);
        assert_eq!(client.peer_name(), Some("host"));
    }
}

/// RECONCILIATION TESTS
mod reconciliation_tests {
    use super::*;

    fn playing_pair() -> (Session, Session) {
        let mut host = Session::new("host");
        let mut client = Session::new("guest");
        host.start_host();
        client.start_join();

        let host_hello = host.transport_opened();
        let client_hello = client.transport_opened();
        for message in host_hello.outgoing {
            client.handle_message(message);
        }
        for message in client_hello.outgoing {
            host.handle_message(message);
        }

        assert_eq!(host.phase(), Phase::Playing);
        assert_eq!(client.phase(), Phase::Playing);
        (host, client)
    }

    #[test]
    fn client_conforms_to_host_snapshots() {
        let (mut host, mut client) = playing_pair();

        let out = host.tick(222.0);
        for message in out.outgoing {
            client.handle_message(message);
        }

        let host_state = host.match_state().unwrap();
        let client_state = client.match_state().unwrap();
        assert_eq!(
            client_state.paddle(Side::Left),
            host_state.paddle(Side::Left)
        );
        assert_eq!(client_state.ball.dx, host_state.ball.dx);
        assert_eq!(client_state.ball.dy, host_state.ball.dy);
    }

    #[test]
    fn stale_client_snaps_or_blends_by_distance() {
        let (mut host, mut client) = playing_pair();

        // The client misses thirty snapshots while extrapolating a resting
        // ball, then one snapshot finally lands.
        let mut latest = None;
        for _ in 0..30 {
            let out = host.tick(260.0);
            latest = out.outgoing.into_iter().find_map(|m| match m {
                Message::State { snapshot } => Some(snapshot),
                _ => None,
            });
            client.tick(260.0);
        }
        let snapshot = latest.unwrap();

        let before = client
            .match_state()
            .unwrap()
            .ball
            .distance_to(snapshot.ball.x, snapshot.ball.y);

        client.handle_message(Message::State { snapshot });
        let after = client
            .match_state()
            .unwrap()
            .ball
            .distance_to(snapshot.ball.x, snapshot.ball.y);

        if before > SNAP_DISTANCE {
            assert_eq!(after, 0.0, "large desync must teleport");
        } else {
            assert!(
                (after - before / 2.0).abs() < 0.001,
                "small desync must halve"
            );
        }
    }

    #[test]
    fn over_message_ends_client_match() {
        let (_host, mut client) = playing_pair();

        let out = client.handle_message(Message::Over {
            winner: "host".to_string(),
        });

        assert_eq!(client.phase(), Phase::GameOver);
        assert_eq!(client.winner_name(), Some("host"));
        assert!(out.sounds.contains(&SoundCue::GameOver));
        assert!(!client.match_state().unwrap().running);
    }
}

/// TRANSPORT TESTS
mod transport_tests {
    use super::*;
    use netpong::transport::{Transport, TransportStatus};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn tcp_loopback_carries_wire_messages() {
        let (mut host, addr) = Transport::host("127.0.0.1:0").await.unwrap();
        let mut client = Transport::join(&addr.to_string()).await.unwrap();

        for _ in 0..100 {
            if host.status() == TransportStatus::Open {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(host.is_open());
        assert!(client.is_open());

        host.send(Message::State {
            snapshot: MatchState::new().snapshot(),
        });
        client.send(Message::Identity {
            name: "guest".to_string(),
        });

        let mut host_got = None;
        let mut client_got = None;
        for _ in 0..100 {
            if host_got.is_none() {
                host_got = host.try_recv();
            }
            if client_got.is_none() {
                client_got = client.try_recv();
            }
            if host_got.is_some() && client_got.is_some() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        assert!(matches!(host_got, Some(Message::Identity { .. })));
        assert!(matches!(client_got, Some(Message::State { .. })));
    }
}
