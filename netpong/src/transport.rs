//! Peer transport: one TCP connection carrying length-prefixed bincode frames.
//!
//! The session address doubles as the join code; whoever hosts shares their
//! `host:port` and the peer connects to it. Reading and writing run as tokio
//! tasks on a background runtime, bridged to the frame loop with unbounded
//! channels. Delivery is ordered and reliable because TCP is; there is no
//! retransmission, sequencing, or deduplication on top, and no reconnect
//! after a failure.

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::Message;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Upper bound on a single frame; anything larger is a corrupt stream.
const MAX_FRAME_LEN: u32 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// Waiting for the peer (host side) or for the connection to finish.
    Connecting,
    Open,
    /// The peer hung up cleanly.
    Closed,
    /// The link died or the stream could not be decoded.
    Failed,
}

#[derive(Clone)]
struct StatusCell(Arc<AtomicU8>);

impl StatusCell {
    fn new(status: TransportStatus) -> Self {
        StatusCell(Arc::new(AtomicU8::new(status as u8)))
    }

    fn set(&self, status: TransportStatus) {
        self.0.store(status as u8, Ordering::SeqCst);
    }

    fn get(&self) -> TransportStatus {
        match self.0.load(Ordering::SeqCst) {
            0 => TransportStatus::Connecting,
            1 => TransportStatus::Open,
            2 => TransportStatus::Closed,
            _ => TransportStatus::Failed,
        }
    }
}

/// Handle held by the frame loop. Dropping it tears the connection down.
pub struct Transport {
    outgoing: mpsc::UnboundedSender<Message>,
    incoming: mpsc::UnboundedReceiver<Message>,
    status: StatusCell,
}

impl Transport {
    /// Binds `addr` and accepts exactly one peer. Returns as soon as the
    /// listener is bound; the status flips to `Open` when the peer arrives.
    pub async fn host(addr: &str) -> Result<(Transport, SocketAddr), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Hosting on {}", local_addr);

        let (transport, out_rx, in_tx) = Transport::new(TransportStatus::Connecting);
        let status = transport.status.clone();

        tokio::spawn(async move {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    info!("Peer connected from {}", peer);
                    status.set(TransportStatus::Open);
                    run_stream(stream, out_rx, in_tx, status).await;
                }
                Err(e) => {
                    error!("Failed to accept peer: {}", e);
                    status.set(TransportStatus::Failed);
                }
            }
        });

        Ok((transport, local_addr))
    }

    /// Connects to a hosted session at `addr`.
    pub async fn join(addr: &str) -> Result<Transport, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to {}", addr);

        let (transport, out_rx, in_tx) = Transport::new(TransportStatus::Open);
        let status = transport.status.clone();
        tokio::spawn(run_stream(stream, out_rx, in_tx, status));

        Ok(transport)
    }

    fn new(
        status: TransportStatus,
    ) -> (
        Transport,
        mpsc::UnboundedReceiver<Message>,
        mpsc::UnboundedSender<Message>,
    ) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let transport = Transport {
            outgoing: out_tx,
            incoming: in_rx,
            status: StatusCell::new(status),
        };
        (transport, out_rx, in_tx)
    }

    pub fn send(&self, message: Message) {
        if self.outgoing.send(message).is_err() {
            warn!("Dropping outgoing message, connection is gone");
        }
    }

    /// Non-blocking: drains one queued message per call.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.incoming.try_recv().ok()
    }

    pub fn status(&self) -> TransportStatus {
        self.status.get()
    }

    pub fn is_open(&self) -> bool {
        self.status.get() == TransportStatus::Open
    }
}

/// Pumps both directions until either side gives up. The writer half runs
/// inline; the reader half is a separate task so a quiet peer cannot stall
/// outgoing traffic.
async fn run_stream(
    stream: TcpStream,
    mut out_rx: mpsc::UnboundedReceiver<Message>,
    in_tx: mpsc::UnboundedSender<Message>,
    status: StatusCell,
) {
    let (reader, mut writer) = stream.into_split();

    let read_status = status.clone();
    let read_task = tokio::spawn(read_loop(reader, in_tx, read_status));

    while let Some(message) = out_rx.recv().await {
        let frame = match encode_frame(&message) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode message: {}", e);
                continue;
            }
        };
        if let Err(e) = writer.write_all(&frame).await {
            warn!("Send failed: {}", e);
            status.set(TransportStatus::Closed);
            break;
        }
    }

    // Either the handle was dropped or the write failed; stop reading too.
    read_task.abort();
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    in_tx: mpsc::UnboundedSender<Message>,
    status: StatusCell,
) {
    loop {
        let mut len_buf = [0u8; 4];
        if reader.read_exact(&mut len_buf).await.is_err() {
            status.set(TransportStatus::Closed);
            break;
        }

        let len = u32::from_le_bytes(len_buf);
        if len == 0 || len > MAX_FRAME_LEN {
            error!("Bad frame length {} from peer", len);
            status.set(TransportStatus::Failed);
            break;
        }

        let mut frame = vec![0u8; len as usize];
        if reader.read_exact(&mut frame).await.is_err() {
            status.set(TransportStatus::Closed);
            break;
        }

        match deserialize::<Message>(&frame) {
            Ok(message) => {
                if in_tx.send(message).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to decode frame from peer: {}", e);
                status.set(TransportStatus::Failed);
                break;
            }
        }
    }
}

/// Serializes a message behind a u32 little-endian length prefix.
pub fn encode_frame(message: &Message) -> Result<Vec<u8>, bincode::Error> {
    let payload = serialize(message)?;
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SoundCue;
    use std::time::Duration;
    use tokio::time::sleep;

    #[test]
    fn test_encode_frame_prefixes_length() {
        let frame = encode_frame(&Message::Input { paddle_offset: 1.0 }).unwrap();
        let len = u32::from_le_bytes(frame[..4].try_into().unwrap());
        assert_eq!(len as usize, frame.len() - 4);

        let decoded: Message = deserialize(&frame[4..]).unwrap();
        match decoded {
            Message::Input { paddle_offset } => assert_eq!(paddle_offset, 1.0),
            _ => panic!("Wrong message type after decode"),
        }
    }

    #[test]
    fn test_truncated_frame_fails_to_decode() {
        let frame = encode_frame(&Message::Identity {
            name: "ada".to_string(),
        })
        .unwrap();

        let payload = &frame[4..];
        let result: Result<Message, _> = deserialize(&payload[..payload.len() / 2]);
        assert!(result.is_err());

        let result: Result<Message, _> = deserialize(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_cell_roundtrip() {
        let cell = StatusCell::new(TransportStatus::Connecting);
        assert_eq!(cell.get(), TransportStatus::Connecting);
        for status in [
            TransportStatus::Open,
            TransportStatus::Closed,
            TransportStatus::Failed,
        ] {
            cell.set(status);
            assert_eq!(cell.get(), status);
        }
    }

    #[tokio::test]
    async fn test_loopback_exchange() {
        let (mut host, addr) = Transport::host("127.0.0.1:0").await.unwrap();
        let mut client = Transport::join(&addr.to_string()).await.unwrap();

        assert!(client.is_open());
        for _ in 0..100 {
            if host.is_open() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(host.is_open());

        host.send(Message::Sound {
            cue: SoundCue::WallHit,
        });
        client.send(Message::Input {
            paddle_offset: 42.0,
        });

        let mut client_got = None;
        let mut host_got = None;
        for _ in 0..100 {
            if client_got.is_none() {
                client_got = client.try_recv();
            }
            if host_got.is_none() {
                host_got = host.try_recv();
            }
            if client_got.is_some() && host_got.is_some() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        match client_got {
            Some(Message::Sound { cue }) => assert_eq!(cue, SoundCue::WallHit),
            other => panic!("Client received {:?}", other),
        }
        match host_got {
            Some(Message::Input { paddle_offset }) => assert_eq!(paddle_offset, 42.0),
            other => panic!("Host received {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_peer_disconnect_closes_transport() {
        let (host, addr) = Transport::host("127.0.0.1:0").await.unwrap();
        let client = Transport::join(&addr.to_string()).await.unwrap();

        for _ in 0..100 {
            if host.is_open() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        drop(client);

        for _ in 0..100 {
            if host.status() == TransportStatus::Closed {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(host.status(), TransportStatus::Closed);
    }
}
