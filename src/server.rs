//! Turns a datagram received from a client into the datagram to send back.

use crate::clients::{Exchanger, Resolver};
use crate::Error;
use crate::Message;
use log::{info, warn};

impl<E> Resolver<E>
where
    E: Exchanger,
{
    /// Answers a query received from a client.
    ///
    /// The response carries the client's query id. If the resolver gave up
    /// on one of its limits, the client is sent a SERVFAIL echoing its query.
    pub fn answer(&self, datagram: &[u8]) -> Result<Vec<u8>, Error> {
        let query = Message::from_slice(datagram)?;

        if let Some(q) = query.questions.first() {
            info!("query {} for {} type {}", query.header.id, q.name, q.r#type);
        }

        let mut response = match self.resolve(&query) {
            Ok(response) => response,
            Err(e) if e.is_limit() => {
                warn!("query {} failed: {}", query.header.id, e);
                query.server_failure()
            }
            Err(e) => return Err(e),
        };

        // Restarts use fresh ids, the client only knows its own.
        response.header.id = query.header.id;

        info!(
            "response {}: {} with {} answers",
            response.header.id,
            response.header.rcode,
            response.answers.len()
        );

        response.to_vec()
    }
}
