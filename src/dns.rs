use crate::bail;
use crate::errors::Error;
use crate::io::{DNSReadExt, SeekExt};
use crate::name;
use crate::types::*;
use byteorder::{ReadBytesExt, BE};
use bytes::Bytes;
use log::debug;
use num_traits::FromPrimitive;
use std::convert::TryFrom;
use std::io;
use std::io::Cursor;
use std::net::Ipv4Addr;

/// Length of the fixed header.
pub const HEADER_LEN: usize = 12;

impl Header {
    /// Decodes the 12 byte header, returning it along with the section counts.
    ///
    /// Any 12 bytes decode; only a shorter input is an error.
    pub fn read(cur: &mut Cursor<&[u8]>) -> io::Result<(Header, Counts)> {
        if cur.remaining()? < HEADER_LEN as u64 {
            bail!(
                UnexpectedEof,
                "message is {} bytes, shorter than a header",
                cur.remaining()?
            );
        }

        let mut h = Header {
            id: cur.read_u16::<BE>()?,
            ..Default::default()
        };

        let b = cur.read_u8()?;
        h.qr = QR::from_bool(0b1000_0000 & b != 0);
        let opcode = (0b0111_1000 & b) >> 3;
        h.aa = (0b0000_0100 & b) != 0;
        h.tc = (0b0000_0010 & b) != 0;
        h.rd = (0b0000_0001 & b) != 0;

        h.opcode = Opcode::from_u8(opcode);

        let b = cur.read_u8()?;
        h.ra = (0b1000_0000 & b) != 0;
        // The three Z bits are ignored.
        h.rcode = Rcode::from_u8(0b0000_1111 & b);

        let counts = Counts {
            questions: cur.read_u16::<BE>()?,
            answers: cur.read_u16::<BE>()?,
            authorities: cur.read_u16::<BE>()?,
            additionals: cur.read_u16::<BE>()?,
        };

        Ok((h, counts))
    }

    /// Encodes the header and the given counts. The Z bits are always zero.
    pub fn write(&self, buf: &mut Vec<u8>, counts: &Counts) {
        buf.extend_from_slice(&self.id.to_be_bytes());

        let mut b = 0_u8;
        b |= if self.qr.to_bool() { 0b1000_0000 } else { 0 };
        b |= (self.opcode.to_u8() << 3) & 0b0111_1000;
        b |= if self.aa { 0b0000_0100 } else { 0 };
        b |= if self.tc { 0b0000_0010 } else { 0 };
        b |= if self.rd { 0b0000_0001 } else { 0 };
        buf.push(b);

        let mut b = 0_u8;
        b |= if self.ra { 0b1000_0000 } else { 0 };
        b |= self.rcode.to_u8() & 0b0000_1111;
        buf.push(b);

        buf.extend_from_slice(&counts.questions.to_be_bytes());
        buf.extend_from_slice(&counts.answers.to_be_bytes());
        buf.extend_from_slice(&counts.authorities.to_be_bytes());
        buf.extend_from_slice(&counts.additionals.to_be_bytes());
    }
}

impl Question {
    /// Creates a question of class IN, storing `name` in canonical form.
    pub fn new(name: &str, r#type: Type) -> Question {
        Question {
            name: name.strip_suffix('.').unwrap_or(name).to_string(),
            r#type: r#type as u16,
            class: Class::Internet as u16,
        }
    }

    /// Builds the `in-addr.arpa` name used to look up the PTR record of `ip`.
    ///
    /// ```rust
    /// use walkdns::Question;
    ///
    /// assert_eq!(Question::reverse("8.8.4.4".parse().unwrap()), "4.4.8.8.in-addr.arpa");
    /// ```
    pub fn reverse(ip: Ipv4Addr) -> String {
        let [a, b, c, d] = ip.octets();
        format!("{}.{}.{}.{}.in-addr.arpa", d, c, b, a)
    }

    /// Returns the type of this question, if it is one this crate understands.
    pub fn kind(&self) -> Option<Type> {
        FromPrimitive::from_u16(self.r#type)
    }

    /// Number of bytes this question occupies on the wire.
    pub fn byte_len(&self) -> usize {
        name::encoded_len(&self.name) + 2 + 2
    }

    fn read(cur: &mut Cursor<&[u8]>) -> io::Result<Question> {
        Ok(Question {
            name: cur.read_qname()?,
            r#type: cur.read_u16::<BE>()?,
            class: cur.read_u16::<BE>()?,
        })
    }

    fn write(&self, buf: &mut Vec<u8>) -> Result<(), Error> {
        name::write_name(buf, &self.name)?;
        buf.extend_from_slice(&self.r#type.to_be_bytes());
        buf.extend_from_slice(&self.class.to_be_bytes());
        Ok(())
    }
}

impl Record {
    /// Returns the type of this record, if it is one this crate understands.
    pub fn kind(&self) -> Option<Type> {
        FromPrimitive::from_u16(self.r#type)
    }

    /// Number of bytes this record occupies on the wire.
    pub fn byte_len(&self) -> usize {
        self.name.len() + 2 + 2 + 4 + 2 + self.rdata.len()
    }

    /// Returns the IPv4 address carried by an A record.
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        if self.kind() != Some(Type::A) {
            return None;
        }

        let octets = <[u8; 4]>::try_from(self.rdata.as_slice()).ok()?;
        Some(Ipv4Addr::from(octets))
    }

    fn read(cur: &mut Cursor<&[u8]>) -> io::Result<Record> {
        Ok(Record {
            name: cur.read_name_field()?,
            r#type: cur.read_u16::<BE>()?,
            class: cur.read_u16::<BE>()?,
            ttl: cur.read_u32::<BE>()?,
            rdata: cur.read_rdata()?,
        })
    }

    fn write(&self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let rdlength = match u16::try_from(self.rdata.len()) {
            Ok(len) => len,
            Err(_) => bail!(InvalidInput, "rdata of {} bytes is too long", self.rdata.len()),
        };

        // The name is written exactly as it was captured.
        buf.extend_from_slice(&self.name);
        buf.extend_from_slice(&self.r#type.to_be_bytes());
        buf.extend_from_slice(&self.class.to_be_bytes());
        buf.extend_from_slice(&self.ttl.to_be_bytes());
        buf.extend_from_slice(&rdlength.to_be_bytes());
        buf.extend_from_slice(&self.rdata);
        Ok(())
    }
}

// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &'a [u8]) -> MessageParser<'a> {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message::default(),
        }
    }

    /// Consume the MessageParser and returned the resulting Message.
    fn parse(mut self) -> io::Result<Message> {
        let (header, counts) = Header::read(&mut self.cur)?;
        self.m.header = header;

        self.read_questions(counts.questions)?;
        self.read_records(counts.answers, RecordSection::Answers)?;
        self.read_records(counts.authorities, RecordSection::Authorities)?;
        self.read_records(counts.additionals, RecordSection::Additionals)?;

        let left = self.cur.remaining()?;
        if left > 0 {
            debug!("ignoring {} trailing bytes after the last record", left);
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> io::Result<()> {
        for _ in 0..count {
            let question = Question::read(&mut self.cur)?;
            self.m.questions.push(question);
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> io::Result<()> {
        let records = match section {
            RecordSection::Answers => &mut self.m.answers,
            RecordSection::Authorities => &mut self.m.authorities,
            RecordSection::Additionals => &mut self.m.additionals,
        };

        for _ in 0..count {
            records.push(Record::read(&mut self.cur)?);
        }

        Ok(())
    }
}

impl Message {
    /// Parses a datagram into a Message.
    ///
    /// Any read that would fall outside of `buf` fails with
    /// [`Error::MalformedMessage`]. The datagram is retained, so that names
    /// can later be decompressed against it.
    pub fn from_slice(buf: &[u8]) -> Result<Message, Error> {
        let mut m = MessageParser::new(buf)
            .parse()
            .map_err(Error::MalformedMessage)?;

        m.wire = Some(Bytes::copy_from_slice(buf));
        Ok(m)
    }

    /// Builds a standard query for `name`, with a random id and recursion
    /// not desired.
    pub fn query(name: &str, r#type: Type) -> Message {
        Message {
            header: Header {
                id: rand::random(),
                ..Default::default()
            },
            questions: vec![Question::new(name, r#type)],
            ..Default::default()
        }
    }

    /// Returns a copy of this query asking about `name` instead, with a fresh id.
    pub fn with_name(&self, name: &str) -> Message {
        let mut m = self.clone();
        m.header.id = rand::random();
        m.wire = None;

        if let Some(q) = m.questions.first_mut() {
            q.name = name.strip_suffix('.').unwrap_or(name).to_string();
        }
        m
    }

    /// Returns the response sent when resolution found nothing: this message
    /// with the QR bit flipped, an rcode of NoError and no answers.
    pub fn no_answer(&self) -> Message {
        let mut m = self.clone();
        m.header.qr = QR::Response;
        m.answers.clear();
        m
    }

    /// Returns a SERVFAIL response echoing this query.
    pub fn server_failure(&self) -> Message {
        let mut m = self.no_answer();
        m.header.rcode = Rcode::ServFail;
        m
    }

    /// The section counts, as derived from the live length of each section.
    pub fn counts(&self) -> Result<Counts, Error> {
        fn count(len: usize, section: &str) -> Result<u16, Error> {
            match u16::try_from(len) {
                Ok(n) => Ok(n),
                Err(_) => bail!(InvalidInput, "too many {} ({})", section, len),
            }
        }

        Ok(Counts {
            questions: count(self.questions.len(), "questions")?,
            answers: count(self.answers.len(), "answers")?,
            authorities: count(self.authorities.len(), "authorities")?,
            additionals: count(self.additionals.len(), "additionals")?,
        })
    }

    /// Number of bytes this message occupies on the wire.
    pub fn byte_len(&self) -> usize {
        HEADER_LEN
            + self.questions.iter().map(Question::byte_len).sum::<usize>()
            + self
                .answers
                .iter()
                .chain(&self.authorities)
                .chain(&self.additionals)
                .map(Record::byte_len)
                .sum::<usize>()
    }

    /// Returns this DNS Message as a Vec<u8> ready to be sent, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    ///
    /// Question names are encoded fresh and uncompressed; records are written
    /// with the name and rdata bytes they were parsed with.
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        let len = self.byte_len();
        let mut buf = Vec::<u8>::with_capacity(len);

        self.header.write(&mut buf, &self.counts()?);

        for question in &self.questions {
            question.write(&mut buf)?;
        }

        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            record.write(&mut buf)?;
        }

        debug_assert_eq!(buf.len(), len);
        Ok(buf)
    }

    /// Returns the lower case hex encoding of this message.
    pub fn to_hex(&self) -> Result<String, Error> {
        Ok(hex::encode(self.to_vec()?))
    }

    /// Decodes an encoded name (a record's name field, or the rdata of a
    /// NS, CNAME or PTR record) into a dotted domain ending in `.`.
    ///
    /// Compression pointers are resolved against the datagram this message
    /// was parsed from, or for a message built locally, its own encoding.
    pub fn domain(&self, bytes: &[u8]) -> Result<String, Error> {
        let result = match &self.wire {
            Some(wire) => name::decompress(wire, bytes),
            None => name::decompress(&self.to_vec()?, bytes),
        };

        result.map_err(Error::MalformedMessage)
    }

    /// Classifies a final response the way a client should report it.
    pub fn check_response(&self) -> Result<(), Error> {
        let name = self
            .questions
            .first()
            .map(|q| q.name.clone())
            .unwrap_or_default();

        match self.header.rcode {
            Rcode::NoError if self.answers.is_empty() => Err(Error::NoAnswerFound(name)),
            Rcode::NoError => Ok(()),
            Rcode::NXDomain => Err(Error::NameNotFound(name)),
            rcode => Err(Error::ProtocolError(rcode)),
        }
    }
}
