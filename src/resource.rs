//! Interpretation of record data.

use crate::errors::Error;
use crate::types::{Message, Record, Resource, Type};
use byteorder::{ByteOrder, BE};
use std::io;

/// Mail EXchange (MX) record.
#[derive(Clone, Debug, PartialEq)]
pub struct MX {
    /// The preference given to this RR among others at the same owner.
    /// Lower values are preferred.
    pub preference: u16,

    /// A host willing to act as a mail exchange for the owner name.
    pub exchange: String,
}

impl Message {
    /// Decodes the rdata of `record`, which must belong to this message.
    ///
    /// Names inside the rdata may be compressed, so they are resolved against
    /// the datagram this message was parsed from.
    pub fn resource(&self, record: &Record) -> Result<Resource, Error> {
        let rdata = record.rdata.as_slice();

        Ok(match record.kind() {
            Some(Type::A) => match record.ipv4() {
                Some(ip) => Resource::A(ip),
                None => {
                    return Err(Error::MalformedMessage(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid A record length ({}) expected 4", rdata.len()),
                    )))
                }
            },

            Some(Type::NS) => Resource::NS(self.domain(rdata)?),
            Some(Type::CNAME) => Resource::CNAME(self.domain(rdata)?),
            Some(Type::PTR) => Resource::PTR(self.domain(rdata)?),

            Some(Type::MX) => {
                if rdata.len() < 3 {
                    return Err(Error::MalformedMessage(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("MX record of {} bytes is too short", rdata.len()),
                    )));
                }

                Resource::MX(MX {
                    preference: BE::read_u16(&rdata[..2]),
                    exchange: self.domain(&rdata[2..])?,
                })
            }

            None => Resource::Unknown(record.r#type, rdata.to_vec()),
        })
    }

    /// Decodes every answer whose type matches the first question's type.
    pub fn matching_answers(&self) -> Result<Vec<Resource>, Error> {
        let r#type = match self.questions.first() {
            Some(q) => q.r#type,
            None => return Ok(Vec::new()),
        };

        self.answers
            .iter()
            .filter(|answer| answer.r#type == r#type)
            .map(|answer| self.resource(answer))
            .collect()
    }
}
