//! Move exchange with a single remote peer
//!
//! A move travels as the decimal column number in one datagram, with no
//! framing, acknowledgement or retransmission. The connecting side opens
//! the link by sending [`HANDSHAKE`]; the hosting side learns the peer's
//! address from it.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    Arc,
};
use std::time::Duration;

use tracing::{info, warn};

use crate::{error::TransportError, DATAGRAM_SIZE};

/// Greeting sent by the connecting peer
pub const HANDSHAKE: &str = "Connected";

// how often a blocked receive wakes up to look at the shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Sends and receives column numbers to and from the opponent
pub trait MoveChannel {
    fn send_move(&mut self, column: usize) -> Result<(), TransportError>;

    /// Blocks until the opponent's move arrives
    fn receive_move(&mut self) -> Result<usize, TransportError>;
}

/// A cancellation flag shared between the input side and a blocked receive
#[derive(Clone, Default, Debug)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub fn encode_move(column: usize) -> String {
    column.to_string()
}

pub fn decode_move(payload: &[u8]) -> Result<usize, TransportError> {
    let text = String::from_utf8_lossy(payload);
    text.trim()
        .parse::<usize>()
        .map_err(|_| TransportError::BadPayload(text.into_owned()))
}

/// A bound socket waiting for a peer to connect
pub struct UdpListener {
    socket: UdpSocket,
    shutdown: Shutdown,
}

impl UdpListener {
    pub fn bind<A: ToSocketAddrs>(addr: A, shutdown: Shutdown) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        info!(addr = %socket.local_addr()?, "listening for peer");
        Ok(Self { socket, shutdown })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Waits for the handshake and pins the link to its sender
    pub fn accept(self) -> Result<UdpPeer, TransportError> {
        let mut buffer = [0; DATAGRAM_SIZE];
        let (len, from) = recv_polling(&self.socket, &mut buffer, &self.shutdown)?;
        let payload = String::from_utf8_lossy(&buffer[..len]).into_owned();
        if !payload.contains(HANDSHAKE) {
            return Err(TransportError::Handshake { from, payload });
        }
        info!(peer = %from, "peer connected");

        Ok(UdpPeer {
            socket: self.socket,
            peer: from,
            shutdown: self.shutdown,
        })
    }
}

/// A UDP link to one fixed peer
pub struct UdpPeer {
    socket: UdpSocket,
    peer: SocketAddr,
    shutdown: Shutdown,
}

impl UdpPeer {
    /// Binds `local` and greets the peer waiting at `peer`
    pub fn connect<A: ToSocketAddrs>(
        local: A,
        peer: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        socket.send_to(HANDSHAKE.as_bytes(), peer)?;
        info!(local = %socket.local_addr()?, %peer, "sent handshake");

        Ok(Self {
            socket,
            peer,
            shutdown,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl MoveChannel for UdpPeer {
    fn send_move(&mut self, column: usize) -> Result<(), TransportError> {
        self.socket
            .send_to(encode_move(column).as_bytes(), self.peer)?;
        Ok(())
    }

    fn receive_move(&mut self) -> Result<usize, TransportError> {
        let mut buffer = [0; DATAGRAM_SIZE];
        loop {
            let (len, from) = recv_polling(&self.socket, &mut buffer, &self.shutdown)?;
            if from != self.peer {
                warn!(%from, "ignoring datagram from unknown sender");
                continue;
            }
            return decode_move(&buffer[..len]).map_err(|err| {
                warn!(%from, "rejected peer payload");
                err
            });
        }
    }
}

fn recv_polling(
    socket: &UdpSocket,
    buffer: &mut [u8],
    shutdown: &Shutdown,
) -> Result<(usize, SocketAddr), TransportError> {
    loop {
        if shutdown.is_requested() {
            return Err(TransportError::Cancelled);
        }
        match socket.recv_from(buffer) {
            Ok(received) => return Ok(received),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// One end of an in-process link, carrying the same payloads as the UDP link
pub struct LocalPeer {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    shutdown: Shutdown,
}

/// Creates two connected in-process ends
pub fn local_pair(shutdown: Shutdown) -> (LocalPeer, LocalPeer) {
    let (tx_a, rx_b) = channel();
    let (tx_b, rx_a) = channel();
    (
        LocalPeer {
            tx: tx_a,
            rx: rx_a,
            shutdown: shutdown.clone(),
        },
        LocalPeer {
            tx: tx_b,
            rx: rx_b,
            shutdown,
        },
    )
}

impl MoveChannel for LocalPeer {
    fn send_move(&mut self, column: usize) -> Result<(), TransportError> {
        self.tx
            .send(encode_move(column).into_bytes())
            .map_err(|_| TransportError::Closed)
    }

    fn receive_move(&mut self) -> Result<usize, TransportError> {
        loop {
            if self.shutdown.is_requested() {
                return Err(TransportError::Cancelled);
            }
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(payload) => return decode_move(&payload),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
            }
        }
    }
}
