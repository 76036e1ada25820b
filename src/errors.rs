use crate::types::Rcode;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A single upstream contact did not answer in time.
    #[error("timed out waiting for a response")]
    Timeout,

    /// The received datagram could not be decoded.
    #[error("malformed message: {0}")]
    MalformedMessage(#[source] io::Error),

    /// A name could not be encoded onto the wire.
    #[error("invalid domain name: {0}")]
    InvalidName(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The CNAME chain was longer than the configured limit.
    #[error("gave up after {0} CNAME restarts")]
    TooManyRestarts(usize),

    /// Nameserver lookups nested deeper than the configured limit.
    #[error("nameserver lookups nested deeper than {0} levels")]
    TooDeep(usize),

    /// The wall clock budget for a single resolution ran out.
    #[error("resolution did not finish within {0:?}")]
    BudgetExhausted(Duration),

    #[error("invalid root hints: {0}")]
    InvalidHints(String),

    /// The response carried NXDOMAIN.
    #[error("server can't find {0}")]
    NameNotFound(String),

    /// The response had no error, but also no answers.
    #[error("server can't find {0}: no answer")]
    NoAnswerFound(String),

    /// The response carried some other non-zero rcode.
    #[error("not a valid response: RCODE = {}", .0.to_u8())]
    ProtocolError(Rcode),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if the resolver gave up because one of its limits was hit.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            Error::TooManyRestarts(_) | Error::TooDeep(_) | Error::BudgetExhausted(_)
        )
    }
}
