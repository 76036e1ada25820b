use crate::bail;
use crate::clients::stats::StatsBuilder;
use crate::clients::Exchanger;
use crate::clients::Stats;
use crate::Error;
use crate::Message;
use log::debug;
use std::io;
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use std::net::UdpSocket;
use std::time::Duration;

/// Largest datagram read back from a server. Anything longer is cut short
/// by the socket.
pub const MAX_UDP_SIZE: usize = 512;

/// Sends each query over a fresh UDP socket.
///
/// One socket is bound per contact, and dropped once the response (or the
/// timeout) arrives. See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1>
#[derive(Clone, Copy, Debug, Default)]
pub struct UdpExchanger {}

impl UdpExchanger {
    pub fn new() -> Self {
        UdpExchanger {}
    }
}

impl Exchanger for UdpExchanger {
    /// Sends the encoded query to `server` via UDP and returns the datagram received.
    fn exchange(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        // A zero read timeout is rejected by the socket, and would mean
        // "block forever" anyway.
        if timeout.as_nanos() == 0 {
            return Err(Error::Timeout);
        }

        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_read_timeout(Some(timeout))?;

        // Connect us to the server, meaning recv will only receive directly
        // from the server.
        socket.connect(server)?;
        socket.send(query)?;

        let mut buf = [0; MAX_UDP_SIZE];
        let len = socket.recv(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Io(e),
        })?;

        debug!("received {} bytes from {}", len, server);
        Ok(buf[..len].to_vec())
    }
}

/// A UDP DNS Client, for querying a single resolver.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use walkdns::clients::UdpClient;
/// use walkdns::{Message, Type};
///
/// fn main() -> Result<(), walkdns::Error> {
///     let client = UdpClient::new("127.0.0.1:5300", Duration::from_secs(5))?;
///
///     let (response, stats) = client.query(&Message::query("bramp.net", Type::A))?;
///
///     println!("{}", response);
///     println!("{}", stats);
///     Ok(())
/// }
/// ```
pub struct UdpClient {
    server: SocketAddr,
    timeout: Duration,

    exchanger: UdpExchanger,
}

impl UdpClient {
    /// Creates a new Client for the resolver listening at `server`.
    ///
    /// The first address `server` resolves to is used.
    pub fn new<A: ToSocketAddrs>(server: A, timeout: Duration) -> Result<Self, Error> {
        let server = match server.to_socket_addrs()?.next() {
            Some(addr) => addr,
            None => bail!(InvalidInput, "no address to send queries to"),
        };

        Ok(UdpClient {
            server,
            timeout,
            exchanger: UdpExchanger::new(),
        })
    }

    /// Sends `query` to the resolver, and returns the parsed response along
    /// with some details about the exchange.
    pub fn query(&self, query: &Message) -> Result<(Message, Stats), Error> {
        let req = query.to_vec()?;

        let stats = StatsBuilder::start(req.len());
        let resp = self.exchanger.exchange(self.server, &req, self.timeout)?;
        let stats = stats.end(self.server, resp.len());

        Ok((Message::from_slice(&resp)?, stats))
    }
}
