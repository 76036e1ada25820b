//! Transports, and the resolver built on top of them.

use crate::Error;
use std::net::SocketAddr;
use std::time::Duration;

pub use self::resolver::Config;
pub use self::resolver::Resolver;
pub use self::stats::Stats;

cfg_feature! {
    #![feature = "udp"]

    pub use self::udp::UdpClient;
    pub use self::udp::UdpExchanger;

    pub mod udp;
}

mod resolver;
mod stats;

/// Exchanger sends an encoded query to a single server and returns the
/// datagram it answered with.
///
/// A server that does not answer within `timeout` must yield
/// [`Error::Timeout`].
pub trait Exchanger {
    fn exchange(&self, server: SocketAddr, query: &[u8], timeout: Duration)
        -> Result<Vec<u8>, Error>;
}

impl<E: Exchanger + ?Sized> Exchanger for &E {
    fn exchange(
        &self,
        server: SocketAddr,
        query: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        (**self).exchange(server, query, timeout)
    }
}
