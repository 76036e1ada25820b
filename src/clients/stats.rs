use std::net::SocketAddr;
use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;

/// Details about a single exchange with a server, shown by `dig`.
#[derive(Clone, Debug)]
pub struct Stats {
    /// When the query was sent.
    pub start: SystemTime,

    /// How long until the response arrived.
    pub duration: Duration,

    /// The server that answered.
    pub server: SocketAddr,

    pub request_size: usize,
    pub response_size: usize,
}

/// Builder class to aid in the construction of Stats objects.
pub(crate) struct StatsBuilder {
    start: SystemTime,
    timer: Instant,
    request_size: usize,
}

impl StatsBuilder {
    /// Call just before the request is sent, with the payload size.
    pub fn start(request_size: usize) -> StatsBuilder {
        StatsBuilder {
            start: SystemTime::now(),
            timer: Instant::now(),

            request_size,
        }
    }

    /// Call just after the response is received. Consumes the StatsBuilder and returns the Stats.
    pub fn end(self, server: SocketAddr, response_size: usize) -> Stats {
        Stats {
            start: self.start,
            duration: self.timer.elapsed(),

            request_size: self.request_size,

            server,
            response_size,
        }
    }
}
